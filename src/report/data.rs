use serde::Serialize;

use crate::config::Practice;
use crate::ledger::{PlanKind, PlanSummary};

/// A single row in the period table
#[derive(Debug, Serialize)]
pub struct ReportPeriodRow {
    pub index: u32,
    pub due_date: String,
    pub amount: f64,
    pub status: String,
    pub ledger_id: Option<String>,
}

/// Plan header shown above the period table
#[derive(Debug, Serialize)]
pub struct ReportPlan {
    pub analysis_id: String,
    pub client_name: String,
    pub kind: PlanKind,
    pub period_count: u32,
    pub period_value: f64,
    pub start_date: String,
}

/// Complete data for rendering or exporting a plan report
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub practice: Practice,
    pub plan: ReportPlan,
    pub rows: Vec<ReportPeriodRow>,
    pub summary: PlanSummary,
    pub currency_symbol: String,
    pub generated_date: String,
}
