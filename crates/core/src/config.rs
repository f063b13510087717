use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::money::NumberFormat;
use super::period::StatementPeriod;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CONCILIAR_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "conciliar.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where the settlements table for a run comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementsSource {
    /// `settlements/cuadro-{MM}-{YY}.xlsx` under the data directory.
    #[default]
    PerMonth,
    /// One file holding every month, at `pooled_path`.
    Pooled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementsConfig {
    pub source: SettlementsSource,
    pub pooled_path: PathBuf,
}

impl Default for SettlementsConfig {
    fn default() -> Self {
        Self {
            source: SettlementsSource::PerMonth,
            pooled_path: PathBuf::from("./datos/settlements/cuadro.xlsx"),
        }
    }
}

/// Description keywords marking bank-side events that are not payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "saldo inicial",
                "mantenimiento",
                "comision",
                "emision",
                "cargo",
                "servicio",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Also write unsettled rows to `no_liquidados_{MM}_{YY}.csv`.
    pub export_unsettled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub settlements: SettlementsConfig,
    pub number_format: NumberFormat,
    pub filter: FilterConfig,
    pub report: ReportConfig,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./datos"),
            output_dir: PathBuf::from("./datos"),
            settlements: SettlementsConfig::default(),
            number_format: NumberFormat::default(),
            filter: FilterConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl ReconcileConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Resolves which config file applies: the explicit path if given, else
    /// `conciliar.toml` in `cwd` if it exists. `None` means built-in defaults.
    pub fn locate(explicit: Option<PathBuf>, cwd: &Path) -> Option<PathBuf> {
        if explicit.is_some() {
            return explicit;
        }
        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    pub fn paths(&self, period: StatementPeriod) -> RunPaths {
        let tag = period.input_tag();
        let statements = self.data_dir.join("account_statements");
        let settlements = match self.settlements.source {
            SettlementsSource::PerMonth => self
                .data_dir
                .join("settlements")
                .join(format!("cuadro-{tag}.xlsx")),
            SettlementsSource::Pooled => self.settlements.pooled_path.clone(),
        };
        let out = period.output_tag();

        RunPaths {
            statement_9290: statements.join(format!("{tag}-9290.xlsx")),
            statement_1892: statements.join(format!("{tag}-1892.xlsx")),
            biopago: statements.join(format!("{tag}-biopago.xlsx")),
            settlements,
            output: self.output_dir.join(format!("payments_{out}.xlsx")),
            unsettled_csv: self.output_dir.join(format!("no_liquidados_{out}.csv")),
        }
    }
}

/// Every file a run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub statement_9290: PathBuf,
    pub statement_1892: PathBuf,
    pub biopago: PathBuf,
    pub settlements: PathBuf,
    pub output: PathBuf,
    pub unsettled_csv: PathBuf,
}
