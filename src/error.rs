use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Config directory not found at {0}. Run 'planos init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Plan '{0}' not found in plans.toml")]
    PlanNotFound(String),

    #[error("Invalid plan index '{0}'. Use 'planos plans' to see available plans.")]
    InvalidPlanIndex(String),

    #[error("Plan '{plan}' has an invalid period value {value} (must be zero or more)")]
    InvalidPeriodValue { plan: String, value: f64 },

    #[error("Plan '{plan}' has an invalid start date '{value}'. Expected YYYY-MM-DD.")]
    InvalidStartDate { plan: String, value: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid weekday '{0}'")]
    InvalidWeekday(String),

    #[error("weekly_rule = \"snap\" needs snap_weekday in [schedule] (e.g., snap_weekday = \"monday\")")]
    MissingSnapWeekday,

    #[error("Failed to write ledger {path}: {source}")]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
