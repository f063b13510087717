use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, DataType, Range, Reader, Xlsx, XlsxError};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
    #[error("Sheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },
    #[error("Failed to read sheet '{sheet}' in {}: {source}", .path.display())]
    ReadSheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: XlsxError,
    },
    #[error("No data rows in {}", .path.display())]
    EmptySheet { path: PathBuf },
    #[error("Missing required column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("Invalid amount '{value}' in {statement} row {row}")]
    InvalidAmount {
        statement: String,
        row: usize,
        value: String,
    },
}

/// A spreadsheet cell reduced to the types the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Formula error such as `#N/A` or `#VALUE!`.
    Error(String),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(_) | Data::DateTimeIso(_) => {
                data.as_datetime().map_or(Cell::Empty, Cell::DateTime)
            }
            Data::Error(e) => Cell::Error(e.to_string()),
            _ => Cell::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Renders the cell as trimmed text. Whole numbers lose their fraction so
    /// a reference stored as `123456.0` reads `123456`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Error(e) => e.clone(),
        }
    }

    /// Native date cells are taken as-is; text is tried against `formats` in
    /// order. Anything else yields `None`.
    pub fn to_datetime(&self, formats: &[&str]) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => {
                let s = s.trim();
                formats.iter().find_map(|fmt| {
                    NaiveDateTime::parse_from_str(s, fmt).ok().or_else(|| {
                        NaiveDate::parse_from_str(s, fmt)
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
                })
            }
            _ => None,
        }
    }

    pub fn to_date(&self, formats: &[&str]) -> Option<NaiveDate> {
        self.to_datetime(formats).map(|dt| dt.date())
    }
}

static EMPTY: Cell = Cell::Empty;

/// One data row together with its 1-based row number in the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cell at `col`, or `Empty` when the row is shorter.
    pub fn get(&self, col: usize) -> &Cell {
        self.cells.get(col).unwrap_or(&EMPTY)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSelector<'a> {
    Named(&'a str),
    First,
}

/// How the column names of a table are established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout<'a> {
    /// The first non-empty row holds the column names.
    Headered,
    /// No header; columns are named by position.
    Positional(&'a [&'a str]),
}

/// A loaded sheet: column names plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(path: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            path: path.into(),
            headers,
            rows,
        }
    }

    /// Splits raw rows into header and data according to `layout`. Fully
    /// empty rows are dropped.
    pub fn from_rows(
        path: impl Into<PathBuf>,
        rows: Vec<Row>,
        layout: Layout<'_>,
    ) -> Result<Self, ImportError> {
        let path = path.into();
        let mut rows = rows.into_iter().filter(|r| !r.is_empty());

        let headers = match layout {
            Layout::Headered => rows
                .next()
                .ok_or_else(|| ImportError::EmptySheet { path: path.clone() })?
                .cells
                .iter()
                .map(Cell::as_text)
                .collect(),
            Layout::Positional(names) => names.iter().map(|n| n.to_string()).collect(),
        };

        Ok(Self::new(path, headers, rows.collect()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named `name`; header cells are compared trimmed.
    pub fn column(&self, name: &str) -> Result<usize, ImportError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ImportError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

fn range_rows(range: &Range<Data>) -> Vec<Row> {
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    range
        .rows()
        .enumerate()
        .map(|(i, cells)| Row {
            number: first_row + i + 1,
            cells: cells.iter().map(Cell::from_data).collect(),
        })
        .collect()
}

/// Reads every row of one sheet of an `.xlsx` workbook.
pub fn read_sheet(path: &Path, sheet: SheetSelector<'_>) -> Result<Vec<Row>, ImportError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let (name, range) = match sheet {
        SheetSelector::Named(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(ImportError::SheetNotFound {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            (name.to_string(), workbook.worksheet_range(name))
        }
        SheetSelector::First => {
            let name = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::EmptySheet {
                    path: path.to_path_buf(),
                })?;
            let range = workbook.worksheet_range(&name);
            (name, range)
        }
    };

    let range = range.map_err(|source| ImportError::ReadSheet {
        path: path.to_path_buf(),
        sheet: name,
        source,
    })?;

    Ok(range_rows(&range))
}

pub fn load_table(
    path: &Path,
    sheet: SheetSelector<'_>,
    layout: Layout<'_>,
) -> Result<Table, ImportError> {
    let rows = read_sheet(path, sheet)?;
    Table::from_rows(path, rows, layout)
}
