mod plan;
mod practice;

pub use plan::PlanEntry;
pub use practice::{Config, LedgerSettings, Practice, ReminderSettings, ScheduleSettings};

use crate::error::{PlanError, Result};
use crate::ledger::{JsonFileStore, PaymentPlan};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.planos/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "planos") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.planos/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        PlanError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".planos"))
}

/// Fail with a hint to run `init` when the directory is missing
pub fn ensure_config_dir(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(PlanError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

fn load_toml<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(PlanError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| PlanError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    load_toml(cfg_dir.join("config.toml"))
}

/// Load plans.toml keyed by analysis id
pub fn load_plans(cfg_dir: &Path) -> Result<BTreeMap<String, PlanEntry>> {
    load_toml(cfg_dir.join("plans.toml"))
}

/// All plans in analysis id order
pub fn load_payment_plans(cfg_dir: &Path) -> Result<Vec<PaymentPlan>> {
    Ok(load_plans(cfg_dir)?
        .iter()
        .map(|(id, entry)| entry.to_plan(id))
        .collect())
}

/// Resolve a plan reference to a plan.
/// Accepts either an index (1-based) from 'plans' or the analysis id.
pub fn resolve_plan(plans: &[PaymentPlan], reference: &str) -> Result<PaymentPlan> {
    if let Some(plan) = plans.iter().find(|p| p.analysis_id == reference) {
        return Ok(plan.clone());
    }

    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 || idx > plans.len() {
            return Err(PlanError::InvalidPlanIndex(reference.to_string()));
        }
        return Ok(plans[idx - 1].clone());
    }

    Err(PlanError::PlanNotFound(reference.to_string()))
}

/// Ledger store configured for this directory
pub fn ledger_store(cfg_dir: &Path, config: &Config) -> JsonFileStore {
    JsonFileStore::new(cfg_dir.join(&config.ledger.file))
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[practice]
name = "Your Practice"
email = "contato@example.com"
# phone = "+55 11 99999-0000"   # optional

[ledger]
file = "planos.json"             # payment records, relative to this directory
currency_symbol = "R$ "

[schedule]
# "cadence": weekly dues fall exactly 7 days apart from the start date
# "snap":    step 7 days, then move forward to snap_weekday
weekly_rule = "cadence"
# snap_weekday = "monday"

[reminders]
days_ahead = 3                   # remind about pending periods due within N days
include_overdue = false
"#;

/// Template content for plans.toml
pub const PLANS_TEMPLATE: &str = r#"# One table per appointment or analysis that carries a payment plan.
# The table name is the analysis id used in the ledger.
#
# Example:
#   planos periods example-analysis
#   planos toggle example-analysis 1

[example-analysis]
client_name = "Example Client"
kind = "monthly"                 # monthly or weekly
period_count = 6                 # number of months or weeks
period_value = 150.00            # amount due per period
start_date = "2024-01-15"
"#;
