pub mod match_engine;
pub mod rules;
pub mod settlements;
pub mod statement;
pub(crate) mod util;
pub mod workbook;

pub use match_engine::{MatchResult, MatchSummary, Reconciliation, SuffixMatchEngine};
pub use rules::{ExclusionFilter, FilterOutcome};
pub use settlements::{load_settlements, settlements_from_table, SETTLEMENT_COLUMNS};
pub use statement::{AmountColumns, Normalizer, StatementProfile};
pub use workbook::{Cell, ImportError, Layout, Row, SheetSelector, Table};

pub mod import {
    use std::path::Path;

    use conciliar_core::{NumberFormat, RunPaths, Settlement, Transaction};

    use crate::*;

    /// Loads and normalizes one statement file.
    pub fn import_statement(
        path: &Path,
        profile: &StatementProfile,
        format: NumberFormat,
    ) -> Result<Vec<Transaction>, ImportError> {
        let table = profile.load(path)?;
        tracing::info!(
            statement = profile.name,
            rows = table.len(),
            path = %path.display(),
            "Statement loaded"
        );
        Normalizer::new(format).normalize(&table, profile)
    }

    /// Loads the three bank-side sources of a run and concatenates them in
    /// order: 9290, 1892, biopago. Fails on the first unreadable input.
    pub fn import_all_statements(
        paths: &RunPaths,
        format: NumberFormat,
    ) -> Result<Vec<Transaction>, ImportError> {
        let sources = [
            (&paths.statement_9290, StatementProfile::bdv_9290()),
            (&paths.statement_1892, StatementProfile::bdv_1892()),
            (&paths.biopago, StatementProfile::biopago()),
        ];

        let mut transactions = Vec::new();
        for (path, profile) in &sources {
            transactions.extend(import_statement(path, profile, format)?);
        }
        Ok(transactions)
    }

    pub fn import_settlements(
        path: &Path,
        format: NumberFormat,
    ) -> Result<Vec<Settlement>, ImportError> {
        let settlements = load_settlements(path, format)?;
        tracing::info!(
            rows = settlements.len(),
            path = %path.display(),
            "Settlements loaded"
        );
        Ok(settlements)
    }

    pub fn create_matcher(settlements: Vec<Settlement>) -> SuffixMatchEngine {
        SuffixMatchEngine::new(settlements)
    }

    pub fn create_exclusion_filter(
        config: &conciliar_core::FilterConfig,
    ) -> Result<ExclusionFilter, regex::Error> {
        ExclusionFilter::from_config(config)
    }
}
