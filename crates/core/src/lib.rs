pub mod config;
pub mod money;
pub mod period;
pub mod transaction;

pub use config::{
    ConfigError, FilterConfig, ReconcileConfig, ReportConfig, RunPaths, SettlementsConfig,
    SettlementsSource,
};
pub use money::{AmountError, Money, NumberFormat};
pub use period::{PeriodError, StatementPeriod, FIRST_YEAR};
pub use transaction::{Settlement, SettlementLink, Transaction, CARD_PROCESSOR_BANK};
