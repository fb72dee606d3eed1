use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use super::data::{ReportData, ReportPeriodRow, ReportPlan};
use crate::config::Practice;
use crate::error::Result;
use crate::ledger::{summarize, PaymentPlan, PeriodView};

/// Status label used in tables and reports
pub fn status_label(is_paid: bool) -> &'static str {
    if is_paid {
        "PAID"
    } else {
        "PENDING"
    }
}

/// Assemble report data from a reconciled period list
pub fn build_report(
    plan: &PaymentPlan,
    periods: &[PeriodView],
    practice: &Practice,
    currency_symbol: &str,
    today: NaiveDate,
) -> ReportData {
    let rows = periods
        .iter()
        .map(|p| ReportPeriodRow {
            index: p.period_index,
            due_date: p.due_date.format("%B %d, %Y").to_string(),
            amount: plan.period_value,
            status: status_label(p.is_paid).to_string(),
            ledger_id: p.ledger_id.clone(),
        })
        .collect();

    ReportData {
        practice: practice.clone(),
        plan: ReportPlan {
            analysis_id: plan.analysis_id.clone(),
            client_name: plan.client_name.clone(),
            kind: plan.kind,
            period_count: plan.period_count,
            period_value: plan.period_value,
            start_date: plan.start_date.clone(),
        },
        rows,
        summary: summarize(periods, plan.period_count, plan.period_value),
        currency_symbol: currency_symbol.to_string(),
        generated_date: today.format("%B %d, %Y").to_string(),
    }
}

/// Write report data as pretty JSON for downstream renderers
pub fn write_report_json(report: &ReportData, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, json)?;
    info!(path = %output_path.display(), "report written");
    Ok(())
}
