use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use super::schedule::PlanKind;
use crate::error::{PlanError, Result};

/// A payment plan as seen by the reconciler.
///
/// Plans are never stored on their own. They are rebuilt from the owning
/// appointment or analysis record each time they are needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPlan {
    pub analysis_id: String,
    pub client_name: String,
    pub kind: PlanKind,
    pub period_count: u32,
    pub period_value: f64,
    /// Raw start date as provided by the owning record
    pub start_date: String,
}

impl PaymentPlan {
    /// Parsed start date, or `None` when the raw value is not a date.
    /// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
    pub fn start(&self) -> Option<NaiveDate> {
        let raw = self.start_date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    /// Check the fields a schedule depends on
    pub fn validate(&self) -> Result<()> {
        if self.start().is_none() {
            return Err(PlanError::InvalidStartDate {
                plan: self.analysis_id.clone(),
                value: self.start_date.clone(),
            });
        }
        if !self.period_value.is_finite() || self.period_value < 0.0 {
            return Err(PlanError::InvalidPeriodValue {
                plan: self.analysis_id.clone(),
                value: self.period_value,
            });
        }
        Ok(())
    }
}
