use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Oldest year with statements on file.
pub const FIRST_YEAR: i32 = 2020;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("Month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("Year must be between {min} and {max}, got {year}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
    #[error("Not a number: '{0}'")]
    NotANumber(String),
}

/// The month/year a reconciliation run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    month: u32,
    year: i32,
}

impl fmt::Display for StatementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl StatementPeriod {
    /// Validates against `today`: the year may not be in the future.
    pub fn new(month: u32, year: i32, today: NaiveDate) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        let max = today.year();
        if !(FIRST_YEAR..=max).contains(&year) {
            return Err(PeriodError::YearOutOfRange {
                year,
                min: FIRST_YEAR,
                max,
            });
        }
        Ok(Self { month, year })
    }

    pub fn current(today: NaiveDate) -> Self {
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// Builds a period from raw prompt answers. Blank answers fall back to
    /// the month and year of `today`.
    pub fn from_inputs(month: &str, year: &str, today: NaiveDate) -> Result<Self, PeriodError> {
        let month = match month.trim() {
            "" => today.month(),
            s => s
                .parse::<u32>()
                .map_err(|_| PeriodError::NotANumber(s.to_string()))?,
        };
        let year = match year.trim() {
            "" => today.year(),
            s => s
                .parse::<i32>()
                .map_err(|_| PeriodError::NotANumber(s.to_string()))?,
        };
        Self::new(month, year, today)
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Two-digit month, `03`.
    pub fn mm(self) -> String {
        format!("{:02}", self.month)
    }

    /// Last two digits of the year, `25`.
    pub fn yy(self) -> String {
        format!("{:02}", self.year.rem_euclid(100))
    }

    /// `MM-YY`, as used in input file names.
    pub fn input_tag(self) -> String {
        format!("{}-{}", self.mm(), self.yy())
    }

    /// `MM_YY`, as used in output file names.
    pub fn output_tag(self) -> String {
        format!("{}_{}", self.mm(), self.yy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 16).unwrap()
    }

    #[test]
    fn valid_period() {
        let p = StatementPeriod::new(3, 2025, today()).unwrap();
        assert_eq!(p.month(), 3);
        assert_eq!(p.year(), 2025);
    }

    #[test]
    fn month_out_of_range() {
        assert_eq!(
            StatementPeriod::new(0, 2024, today()),
            Err(PeriodError::MonthOutOfRange(0))
        );
        assert_eq!(
            StatementPeriod::new(13, 2024, today()),
            Err(PeriodError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn year_out_of_range() {
        assert!(matches!(
            StatementPeriod::new(1, 2019, today()),
            Err(PeriodError::YearOutOfRange { year: 2019, min: 2020, max: 2025 })
        ));
        assert!(StatementPeriod::new(1, 2026, today()).is_err());
        assert!(StatementPeriod::new(1, FIRST_YEAR, today()).is_ok());
    }

    #[test]
    fn blank_inputs_default_to_today() {
        let p = StatementPeriod::from_inputs("", "  ", today()).unwrap();
        assert_eq!(p, StatementPeriod::current(today()));
    }

    #[test]
    fn inputs_are_trimmed_and_parsed() {
        let p = StatementPeriod::from_inputs(" 7\n", "2024\n", today()).unwrap();
        assert_eq!((p.month(), p.year()), (7, 2024));
    }

    #[test]
    fn non_numeric_input() {
        assert_eq!(
            StatementPeriod::from_inputs("marzo", "", today()),
            Err(PeriodError::NotANumber("marzo".to_string()))
        );
    }

    #[test]
    fn file_tags() {
        let p = StatementPeriod::new(3, 2025, today()).unwrap();
        assert_eq!(p.input_tag(), "03-25");
        assert_eq!(p.output_tag(), "03_25");
        assert_eq!(p.to_string(), "03/2025");
    }
}
