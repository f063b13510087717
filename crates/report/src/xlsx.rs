use std::path::Path;

use chrono::NaiveDate;
use conciliar_core::Transaction;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};

use crate::ReportError;

/// Header of the payments sheet, one column per transaction field.
pub const PAYMENT_COLUMNS: [&str; 8] = [
    "referencia",
    "monto",
    "fecha",
    "banco",
    "numero_cuenta",
    "descripcion",
    "codigo_liquidacion",
    "fecha_liquidacion",
];

pub const SHEET_NAME: &str = "payments";

const DATE_FORMAT: &str = "dd/mm/yyyy";
const AMOUNT_FORMAT: &str = "#,##0.00";

/// Reconciliation status a row is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Unsettled,
    Settled,
    /// Settled and paid through the card processor.
    CardProcessor,
}

impl RowStatus {
    pub fn of(tx: &Transaction) -> Self {
        match (tx.is_settled(), tx.is_card_processor()) {
            (false, _) => RowStatus::Unsettled,
            (true, false) => RowStatus::Settled,
            (true, true) => RowStatus::CardProcessor,
        }
    }

    pub fn color(self) -> Color {
        match self {
            RowStatus::Unsettled => Color::RGB(0xFFC7CE),
            RowStatus::Settled => Color::RGB(0xC6EFCE),
            RowStatus::CardProcessor => Color::RGB(0xFFEB9C),
        }
    }
}

struct RowFormats {
    text: Format,
    amount: Format,
    date: Format,
}

impl RowFormats {
    fn new(status: RowStatus) -> Self {
        let text = Format::new().set_background_color(status.color());
        Self {
            amount: text.clone().set_num_format(AMOUNT_FORMAT),
            date: text.clone().set_num_format(DATE_FORMAT),
            text,
        }
    }
}

/// Writes the reconciled transactions to a single-sheet workbook, colouring
/// each row by its [`RowStatus`].
pub fn write_payments(path: &Path, transactions: &[Transaction]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (col, name) in PAYMENT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    let unsettled = RowFormats::new(RowStatus::Unsettled);
    let settled = RowFormats::new(RowStatus::Settled);
    let card = RowFormats::new(RowStatus::CardProcessor);

    for (i, tx) in transactions.iter().enumerate() {
        let formats = match RowStatus::of(tx) {
            RowStatus::Unsettled => &unsettled,
            RowStatus::Settled => &settled,
            RowStatus::CardProcessor => &card,
        };
        write_row(sheet, (i + 1) as u32, tx, formats)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();

    workbook.save(path)?;
    tracing::info!(rows = transactions.len(), path = %path.display(), "Payments workbook written");
    Ok(())
}

fn write_row(
    sheet: &mut Worksheet,
    row: u32,
    tx: &Transaction,
    formats: &RowFormats,
) -> Result<(), XlsxError> {
    write_text(sheet, row, 0, &tx.reference, &formats.text)?;
    sheet.write_number_with_format(row, 1, tx.amount.to_f64(), &formats.amount)?;
    write_date(sheet, row, 2, tx.date, &formats.date)?;
    write_text(sheet, row, 3, &tx.bank, &formats.text)?;
    write_text(sheet, row, 4, &tx.account_number, &formats.text)?;
    write_text(sheet, row, 5, &tx.description, &formats.text)?;
    write_text(sheet, row, 6, tx.settlement_code(), &formats.text)?;
    write_date(sheet, row, 7, tx.settlement_date(), &formats.date)?;
    Ok(())
}

// Blank cells still carry the fill so the whole row is coloured.
fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    if value.is_empty() {
        sheet.write_blank(row, col, format)?;
    } else {
        sheet.write_string_with_format(row, col, value, format)?;
    }
    Ok(())
}

fn write_date(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<NaiveDate>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        Some(date) => sheet.write_datetime_with_format(row, col, &date, format)?,
        None => sheet.write_blank(row, col, format)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
    use conciliar_core::{Money, SettlementLink};

    fn make_tx(reference: &str, bank: &str, cents: i64) -> Transaction {
        Transaction {
            reference: reference.to_string(),
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(2025, 3, 3),
            bank: bank.to_string(),
            account_number: "9290".to_string(),
            description: "PAGO".to_string(),
            settlement: None,
        }
    }

    fn settled(tx: Transaction, code: &str) -> Transaction {
        tx.with_settlement(SettlementLink {
            code: code.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        })
    }

    // ── row status ───────────────────────────────────────────────────────────

    #[test]
    fn unsettled_row_is_red() {
        let tx = make_tx("1", "BDV", 100);
        assert_eq!(RowStatus::of(&tx), RowStatus::Unsettled);
        assert_eq!(RowStatus::of(&tx).color(), Color::RGB(0xFFC7CE));
    }

    #[test]
    fn settled_row_is_green() {
        let tx = settled(make_tx("1", "BDV", 100), "100");
        assert_eq!(RowStatus::of(&tx), RowStatus::Settled);
    }

    #[test]
    fn settled_card_processor_row_is_yellow() {
        let tx = settled(make_tx("1", "BIOPAGO", 100), "100");
        assert_eq!(RowStatus::of(&tx), RowStatus::CardProcessor);
        assert_eq!(RowStatus::of(&tx).color(), Color::RGB(0xFFEB9C));
    }

    #[test]
    fn unsettled_card_processor_row_stays_red() {
        let tx = make_tx("1", "BIOPAGO", 100);
        assert_eq!(RowStatus::of(&tx), RowStatus::Unsettled);
    }

    // ── workbook output ──────────────────────────────────────────────────────

    #[test]
    fn written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("payments_03_25.xlsx");
        let rows = vec![
            settled(make_tx("TRX.654321", "BDV", 10050), "100"),
            make_tx("000111", "BANCO DE VENEZUELA", -4000),
        ];

        write_payments(&path, &rows).unwrap();

        let mut wb: Xlsx<_> = open_workbook(&path).unwrap();
        let range = wb.worksheet_range(SHEET_NAME).unwrap();
        let data: Vec<&[Data]> = range.rows().collect();
        assert_eq!(data.len(), 3);

        let headers: Vec<String> = data[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(headers, PAYMENT_COLUMNS);

        assert_eq!(data[1][0], Data::String("TRX.654321".to_string()));
        assert_eq!(data[1][1], Data::Float(100.5));
        assert_eq!(data[1][2].as_date(), NaiveDate::from_ymd_opt(2025, 3, 3));
        assert_eq!(data[1][6], Data::String("100".to_string()));
        assert_eq!(data[1][7].as_date(), NaiveDate::from_ymd_opt(2025, 3, 4));

        assert_eq!(data[2][1], Data::Float(-40.0));
        assert!(data[2][6].is_empty());
        assert!(data[2][7].is_empty());
    }

    #[test]
    fn empty_run_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments_01_25.xlsx");
        write_payments(&path, &[]).unwrap();

        let mut wb: Xlsx<_> = open_workbook(&path).unwrap();
        let range = wb.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.rows().count(), 1);
    }
}
