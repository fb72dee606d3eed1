use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::ledger::{parse_weekday, ReminderWindow, WeeklyRule};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub practice: Practice,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub reminders: ReminderSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Practice {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LedgerSettings {
    /// Ledger file name, relative to the config directory
    #[serde(default = "default_ledger_file")]
    pub file: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            file: default_ledger_file(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_ledger_file() -> String {
    "planos.json".to_string()
}

fn default_currency_symbol() -> String {
    "R$ ".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyRuleName {
    #[default]
    Cadence,
    Snap,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ScheduleSettings {
    #[serde(default)]
    pub weekly_rule: WeeklyRuleName,
    /// Target weekday for the "snap" rule
    #[serde(default)]
    pub snap_weekday: Option<String>,
}

impl ScheduleSettings {
    pub fn weekly_rule(&self) -> Result<WeeklyRule> {
        match self.weekly_rule {
            WeeklyRuleName::Cadence => Ok(WeeklyRule::Cadence),
            WeeklyRuleName::Snap => {
                let day = self
                    .snap_weekday
                    .as_deref()
                    .ok_or(PlanError::MissingSnapWeekday)?;
                Ok(WeeklyRule::SnapTo(parse_weekday(day)?))
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReminderSettings {
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    #[serde(default)]
    pub include_overdue: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            days_ahead: default_days_ahead(),
            include_overdue: false,
        }
    }
}

fn default_days_ahead() -> u32 {
    ReminderWindow::default().days_ahead
}

impl ReminderSettings {
    pub fn window(&self) -> ReminderWindow {
        ReminderWindow {
            days_ahead: self.days_ahead,
            include_overdue: self.include_overdue,
        }
    }
}
