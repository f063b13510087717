use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use conciliar_core::Transaction;
use serde::Serialize;

use crate::ReportError;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// One CSV line, same columns as the payments sheet.
#[derive(Debug, Serialize)]
struct PaymentRecord<'a> {
    referencia: &'a str,
    monto: String,
    fecha: String,
    banco: &'a str,
    numero_cuenta: &'a str,
    descripcion: &'a str,
    codigo_liquidacion: &'a str,
    fecha_liquidacion: String,
}

impl<'a> From<&'a Transaction> for PaymentRecord<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            referencia: &tx.reference,
            monto: format!("{:.2}", tx.amount.as_decimal()),
            fecha: format_date(tx.date),
            banco: &tx.bank,
            numero_cuenta: &tx.account_number,
            descripcion: &tx.description,
            codigo_liquidacion: tx.settlement_code(),
            fecha_liquidacion: format_date(tx.settlement_date()),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Writes every unsettled transaction as CSV. Returns how many were written.
pub fn write_unsettled<W: Write>(writer: W, transactions: &[Transaction]) -> Result<usize, ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;
    for tx in transactions.iter().filter(|t| !t.is_settled()) {
        wtr.serialize(PaymentRecord::from(tx))?;
        written += 1;
    }
    // An empty export still gets its header line.
    if written == 0 {
        wtr.write_record(crate::PAYMENT_COLUMNS)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(written)
}

pub fn export_unsettled(path: &Path, transactions: &[Transaction]) -> Result<usize, ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_unsettled(file, transactions)?;
    tracing::info!(rows = written, path = %path.display(), "Unsettled export written");
    Ok(written)
}
