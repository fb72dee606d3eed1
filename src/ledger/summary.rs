use serde::Serialize;

use super::reconcile::PeriodView;

/// Aggregates over a reconciled period list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanSummary {
    pub period_count: u32,
    pub paid_count: u32,
    pub pending_count: u32,
    pub total_value: f64,
    pub paid_value: f64,
    pub outstanding_value: f64,
    pub percent_complete: f64,
}

pub fn summarize(periods: &[PeriodView], period_count: u32, period_value: f64) -> PlanSummary {
    let paid_count = periods.iter().filter(|p| p.is_paid).count() as u32;
    let paid_count = paid_count.min(period_count);
    let total_value = f64::from(period_count) * period_value;
    let paid_value = f64::from(paid_count) * period_value;

    let percent_complete = if period_count == 0 {
        0.0
    } else {
        f64::from(paid_count) / f64::from(period_count) * 100.0
    };

    PlanSummary {
        period_count,
        paid_count,
        pending_count: period_count - paid_count,
        total_value,
        paid_value,
        outstanding_value: total_value - paid_value,
        percent_complete,
    }
}

/// Group an integer with thousands separators
pub fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = format_grouped_int((cents / 100) as i64);
    format!("{sign}{currency_symbol}{whole}.{:02}", cents % 100)
}
