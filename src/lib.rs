pub mod config;
pub mod error;
pub mod ledger;
pub mod report;

pub use config::{Config, PlanEntry, Practice};
pub use error::{PlanError, Result};
pub use ledger::{
    JsonFileStore, LedgerStore, MemoryStore, PaymentPlan, PeriodView, PlanKind, PlanSummary,
    Reconciler, ToggleOutcome, WeeklyRule,
};
pub use report::{build_report, ReportData};
