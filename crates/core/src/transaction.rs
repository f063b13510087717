use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Bank label carried by card-processor rows.
pub const CARD_PROCESSOR_BANK: &str = "BIOPAGO";

/// The settlement a transaction was reconciled against. Code and date always
/// travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLink {
    pub code: String,
    pub date: NaiveDate,
}

/// A bank-side movement in the common shape shared by every statement source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub reference: String,
    pub amount: Money,
    pub date: Option<NaiveDate>,
    pub bank: String,
    pub account_number: String,
    pub description: String,
    pub settlement: Option<SettlementLink>,
}

impl Transaction {
    pub fn with_settlement(self, link: SettlementLink) -> Self {
        Transaction {
            settlement: Some(link),
            ..self
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// Empty when unsettled.
    pub fn settlement_code(&self) -> &str {
        self.settlement.as_ref().map_or("", |s| s.code.as_str())
    }

    pub fn settlement_date(&self) -> Option<NaiveDate> {
        self.settlement.as_ref().map(|s| s.date)
    }

    pub fn is_card_processor(&self) -> bool {
        self.bank == CARD_PROCESSOR_BANK
    }

    /// Trimmed reference without the `.0` tail left by float-typed cells:
    /// `"00123456.0"` → `"00123456"`. A period followed by anything other
    /// than zeros is part of the reference and is kept.
    pub fn comparison_key(&self) -> &str {
        let trimmed = self.reference.trim();
        match trimmed.rsplit_once('.') {
            Some((head, tail)) if tail.chars().all(|c| c == '0') => head,
            _ => trimmed,
        }
    }
}

/// One row of the settlements table (cuadro de liquidaciones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub razon_social: String,
    pub rif_cedula: String,
    pub num_comprobante: String,
    pub pago_por: String,
    pub fecha_pago: String,
    pub fecha: Option<NaiveDateTime>,
    pub cuenta: String,
    pub banco: String,
    pub referencia: String,
    pub monto: Option<Money>,
}

impl Settlement {
    /// Non-empty, trimmed dash-delimited pieces of `referencia`.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.referencia
            .split('-')
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Whether any fragment is a suffix of `key`. An empty key never matches.
    pub fn matches_key(&self, key: &str) -> bool {
        !key.is_empty() && self.fragments().any(|f| key.ends_with(f))
    }

    /// The link this settlement stamps on a matched transaction. `None` unless
    /// both a receipt code and a usable date are present.
    pub fn link(&self) -> Option<SettlementLink> {
        let code = self.num_comprobante.trim();
        if code.is_empty() {
            return None;
        }
        self.fecha.map(|fecha| SettlementLink {
            code: code.to_string(),
            date: fecha.date(),
        })
    }
}
