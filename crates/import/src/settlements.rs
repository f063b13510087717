use std::path::Path;

use conciliar_core::{Money, NumberFormat, Settlement};

use crate::workbook::{self, Cell, ImportError, Layout, SheetSelector, Table};

/// Columns every settlements table must carry, in their usual order.
pub const SETTLEMENT_COLUMNS: [&str; 10] = [
    "razon_social",
    "rif_cedula",
    "num_comprobante",
    "pago_por",
    "fecha_pago",
    "fecha",
    "cuenta",
    "banco",
    "referencia",
    "monto",
];

const FECHA_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

pub fn load_settlements(path: &Path, format: NumberFormat) -> Result<Vec<Settlement>, ImportError> {
    let table = workbook::load_table(path, SheetSelector::First, Layout::Headered)?;
    settlements_from_table(&table, format)
}

/// Reads settlement rows. `monto` is informational only, so an amount that
/// does not parse (e.g. "EXONERADO") is kept as `None` instead of failing.
pub fn settlements_from_table(
    table: &Table,
    format: NumberFormat,
) -> Result<Vec<Settlement>, ImportError> {
    let mut idx = [0usize; SETTLEMENT_COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(SETTLEMENT_COLUMNS) {
        *slot = table.column(name)?;
    }
    let [razon_social, rif_cedula, num_comprobante, pago_por, fecha_pago, fecha, cuenta, banco, referencia, monto] =
        idx;

    let settlements = table
        .rows()
        .iter()
        .map(|row| Settlement {
            razon_social: row.get(razon_social).as_text(),
            rif_cedula: row.get(rif_cedula).as_text(),
            num_comprobante: row.get(num_comprobante).as_text(),
            pago_por: row.get(pago_por).as_text(),
            fecha_pago: row.get(fecha_pago).as_text(),
            fecha: row.get(fecha).to_datetime(FECHA_FORMATS),
            cuenta: row.get(cuenta).as_text(),
            banco: row.get(banco).as_text(),
            referencia: row.get(referencia).as_text(),
            monto: match row.get(monto) {
                Cell::Number(n) => Money::from_f64(*n),
                Cell::Text(s) => format.parse(s).ok(),
                _ => None,
            },
        })
        .collect();

    Ok(settlements)
}
