use std::path::PathBuf;

use thiserror::Error;

pub mod unsettled;
pub mod xlsx;

pub use unsettled::{export_unsettled, write_unsettled};
pub use xlsx::{write_payments, RowStatus, PAYMENT_COLUMNS, SHEET_NAME};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
