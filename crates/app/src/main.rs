use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use conciliar_core::config::CONFIG_ENV;
use conciliar_core::ReconcileConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let today = Local::now().date_naive();

    let stdin = std::io::stdin();
    let period = prompt::ask_period(&mut stdin.lock(), &mut std::io::stdout(), today)?;
    tracing::info!(%period, "Reconciling");

    let report = commands::reconcile_period(&config, period)?;
    if report.skipped_settlements > 0 {
        tracing::warn!(
            count = report.skipped_settlements,
            "Settlements without a receipt code or usable fecha were ignored"
        );
    }
    if let Some(csv) = &report.unsettled_csv {
        println!("Sin liquidar exportados a {}", csv.display());
    }
    println!("{}", report.summary_line(period));
    Ok(())
}

fn load_config() -> anyhow::Result<ReconcileConfig> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let cwd = std::env::current_dir().context("Cannot determine working directory")?;

    match ReconcileConfig::locate(explicit, &cwd) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading config");
            ReconcileConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => {
            tracing::debug!("No config file found; using defaults");
            Ok(ReconcileConfig::default())
        }
    }
}
