use serde::{Deserialize, Deserializer, Serialize};

use crate::ledger::{PaymentPlan, PlanKind};

/// Owning appointment/analysis record as written in plans.toml
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlanEntry {
    pub client_name: String,
    pub kind: PlanKind,
    /// Total months or weeks. Non-numeric or non-positive values count as zero.
    #[serde(default, deserialize_with = "lenient_count")]
    pub period_count: u32,
    pub period_value: f64,
    pub start_date: String,
}

impl PlanEntry {
    pub fn to_plan(&self, analysis_id: &str) -> PaymentPlan {
        PaymentPlan {
            analysis_id: analysis_id.to_string(),
            client_name: self.client_name.clone(),
            kind: self.kind,
            period_count: self.period_count,
            period_value: self.period_value,
            start_date: self.start_date.clone(),
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let count = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => u32::try_from(n).unwrap_or(0),
        Raw::Float(f) if f.is_finite() && f >= 1.0 && f <= f64::from(u32::MAX) => f as u32,
        Raw::Float(_) => 0,
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
    };
    Ok(count)
}
