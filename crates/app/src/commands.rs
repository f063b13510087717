use std::path::PathBuf;

use anyhow::Context;
use conciliar_core::{ReconcileConfig, StatementPeriod};
use conciliar_import::import::{
    create_exclusion_filter, create_matcher, import_all_statements, import_settlements,
};
use conciliar_import::MatchSummary;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: MatchSummary,
    /// Settlements ignored for lacking a receipt code or a date.
    pub skipped_settlements: usize,
    pub dropped: usize,
    pub kept: usize,
    pub output: PathBuf,
    pub unsettled_csv: Option<PathBuf>,
}

impl RunReport {
    /// One-line console summary. Match counts cover every loaded row; the
    /// filter then splits them into excluded and reported.
    pub fn summary_line(&self, period: StatementPeriod) -> String {
        format!(
            "{}: {} movimientos ({} liquidados, {} sin liquidar), {} excluidos, {} en reporte -> {}",
            period,
            self.summary.total,
            self.summary.settled,
            self.summary.unsettled,
            self.dropped,
            self.kept,
            self.output.display()
        )
    }
}

/// Runs the whole batch for one period: load, normalize, match, filter,
/// write. The first failure aborts the run and nothing is written.
pub fn reconcile_period(
    config: &ReconcileConfig,
    period: StatementPeriod,
) -> anyhow::Result<RunReport> {
    let paths = config.paths(period);
    let format = config.number_format;

    let transactions =
        import_all_statements(&paths, format).context("Failed to load bank statements")?;
    let settlements = import_settlements(&paths.settlements, format).with_context(|| {
        format!("Failed to load settlements {}", paths.settlements.display())
    })?;

    let matcher = create_matcher(settlements);
    let reconciliation = matcher.reconcile(transactions);
    let summary = reconciliation.summary;

    let filter =
        create_exclusion_filter(&config.filter).context("Failed to compile filter keywords")?;
    let outcome = filter.apply(reconciliation.transactions);

    conciliar_report::write_payments(&paths.output, &outcome.kept)
        .with_context(|| format!("Failed to write {}", paths.output.display()))?;

    let unsettled_csv = if config.report.export_unsettled {
        conciliar_report::export_unsettled(&paths.unsettled_csv, &outcome.kept)
            .with_context(|| format!("Failed to write {}", paths.unsettled_csv.display()))?;
        Some(paths.unsettled_csv.clone())
    } else {
        None
    };

    tracing::info!(
        total = summary.total,
        settled = summary.settled,
        unsettled = summary.unsettled,
        ambiguous = summary.ambiguous,
        dropped = outcome.dropped,
        kept = outcome.kept.len(),
        output = %paths.output.display(),
        "Reconciliation finished"
    );

    Ok(RunReport {
        summary,
        skipped_settlements: matcher.skipped(),
        dropped: outcome.dropped,
        kept: outcome.kept.len(),
        output: paths.output,
        unsettled_csv,
    })
}
