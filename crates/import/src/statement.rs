use std::path::Path;

use conciliar_core::{Money, NumberFormat, Transaction, CARD_PROCESSOR_BANK};

use crate::workbook::{self, Cell, ImportError, Layout, Row, SheetSelector, Table};

/// How a statement expresses the signed amount of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column.
    Signed(&'static str),
    /// Separate columns; amount = credit − debit, blanks count as zero.
    CreditDebit {
        credit: &'static str,
        debit: &'static str,
    },
}

/// Column mapping from one bank export into the common transaction shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementProfile {
    pub name: &'static str,
    pub bank: &'static str,
    pub account_number: &'static str,
    pub sheet: SheetSelector<'static>,
    pub layout: Layout<'static>,
    pub reference_column: &'static str,
    pub description_column: &'static str,
    pub date_column: &'static str,
    pub date_formats: &'static [&'static str],
    pub amount: AmountColumns,
}

const BIOPAGO_COLUMNS: &[&str] = &[
    "number",
    "date",
    "instrument",
    "issuer",
    "amount",
    "equipment",
    "lot",
    "payer_id",
    "result",
    "authorization",
];

impl StatementProfile {
    /// Account 9290 statement, sheet "Table 2".
    pub fn bdv_9290() -> Self {
        Self {
            name: "9290",
            bank: "BDV",
            account_number: "9290",
            sheet: SheetSelector::Named("Table 2"),
            layout: Layout::Headered,
            reference_column: "Referencia",
            description_column: "Descripción",
            date_column: "Fecha",
            date_formats: &["%d-%m-%Y"],
            amount: AmountColumns::CreditDebit {
                credit: "Crédito",
                debit: "Débito",
            },
        }
    }

    /// Account 1892 statement, sheet "data".
    pub fn bdv_1892() -> Self {
        Self {
            name: "1892",
            bank: "BANCO DE VENEZUELA",
            account_number: "1892",
            sheet: SheetSelector::Named("data"),
            layout: Layout::Headered,
            reference_column: "referencia",
            description_column: "concepto",
            date_column: "fecha",
            date_formats: &["%d/%m/%Y"],
            amount: AmountColumns::Signed("monto"),
        }
    }

    /// Card-processor export. Headerless; the terminal ("equipment") column
    /// is what ends up in the description.
    pub fn biopago() -> Self {
        Self {
            name: "biopago",
            bank: CARD_PROCESSOR_BANK,
            account_number: "",
            sheet: SheetSelector::First,
            layout: Layout::Positional(BIOPAGO_COLUMNS),
            reference_column: "authorization",
            description_column: "equipment",
            date_column: "date",
            date_formats: &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y", "%Y-%m-%d %H:%M:%S"],
            amount: AmountColumns::Signed("amount"),
        }
    }

    pub fn load(&self, path: &Path) -> Result<Table, ImportError> {
        workbook::load_table(path, self.sheet, self.layout)
    }
}

/// Resolved column indices for one table.
struct Columns {
    reference: usize,
    description: usize,
    date: usize,
    amount: ResolvedAmount,
}

enum ResolvedAmount {
    Signed(usize),
    CreditDebit { credit: usize, debit: usize },
}

/// Projects statement tables into [`Transaction`]s. Amount text is parsed
/// with the configured [`NumberFormat`] and stored on the transaction itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    format: NumberFormat,
}

impl Normalizer {
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }

    pub fn normalize(
        &self,
        table: &Table,
        profile: &StatementProfile,
    ) -> Result<Vec<Transaction>, ImportError> {
        let columns = Columns {
            reference: table.column(profile.reference_column)?,
            description: table.column(profile.description_column)?,
            date: table.column(profile.date_column)?,
            amount: match profile.amount {
                AmountColumns::Signed(col) => ResolvedAmount::Signed(table.column(col)?),
                AmountColumns::CreditDebit { credit, debit } => ResolvedAmount::CreditDebit {
                    credit: table.column(credit)?,
                    debit: table.column(debit)?,
                },
            },
        };

        let skip_header = matches!(profile.layout, Layout::Positional(_))
            && table
                .rows()
                .first()
                .is_some_and(|row| self.looks_like_header(row, &columns));

        table
            .rows()
            .iter()
            .skip(usize::from(skip_header))
            .map(|row| self.normalize_row(row, &columns, profile))
            .collect()
    }

    fn normalize_row(
        &self,
        row: &Row,
        columns: &Columns,
        profile: &StatementProfile,
    ) -> Result<Transaction, ImportError> {
        let amount = match columns.amount {
            ResolvedAmount::Signed(col) => self.amount(row, col, profile)?,
            ResolvedAmount::CreditDebit { credit, debit } => {
                self.amount(row, credit, profile)? - self.amount(row, debit, profile)?
            }
        };

        Ok(Transaction {
            reference: row.get(columns.reference).as_text(),
            amount,
            date: row.get(columns.date).to_date(profile.date_formats),
            bank: profile.bank.to_string(),
            account_number: profile.account_number.to_string(),
            description: row.get(columns.description).as_text(),
            settlement: None,
        })
    }

    fn amount(&self, row: &Row, col: usize, profile: &StatementProfile) -> Result<Money, ImportError> {
        let invalid = |value: String| ImportError::InvalidAmount {
            statement: profile.name.to_string(),
            row: row.number,
            value,
        };

        match row.get(col) {
            Cell::Empty => Ok(Money::zero()),
            Cell::Number(n) => Money::from_f64(*n).ok_or_else(|| invalid(n.to_string())),
            Cell::Text(s) => self.format.parse(s).map_err(|_| invalid(s.clone())),
            other => Err(invalid(other.as_text())),
        }
    }

    /// A leading row whose first cell is text and whose amount cell is not a
    /// number is the export's own caption row ("Nro.", "Fecha", ...).
    fn looks_like_header(&self, row: &Row, columns: &Columns) -> bool {
        let amount_col = match columns.amount {
            ResolvedAmount::Signed(col) => col,
            ResolvedAmount::CreditDebit { credit, .. } => credit,
        };
        let amount_is_number = match row.get(amount_col) {
            Cell::Number(_) => true,
            Cell::Text(s) => self.format.parse(s).is_ok(),
            _ => false,
        };
        matches!(row.get(0), Cell::Text(_)) && !amount_is_number
    }
}
