use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use conciliar_core::{StatementPeriod, FIRST_YEAR};

/// Asks for the month and year to reconcile. Blank answers (or end of input)
/// take the current month and year.
pub fn ask_period<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    today: NaiveDate,
) -> anyhow::Result<StatementPeriod> {
    let month = ask(
        input,
        output,
        &format!("Mes (1-12) [{:02}]: ", today.month()),
    )?;
    let year = ask(
        input,
        output,
        &format!("Año ({FIRST_YEAR}-{}) [{}]: ", today.year(), today.year()),
    )?;

    StatementPeriod::from_inputs(&month, &year, today).context("Invalid period")
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> anyhow::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;
    Ok(line.trim().to_string())
}
