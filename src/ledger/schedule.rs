use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Plan cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Monthly,
    Weekly,
}

impl PlanKind {
    /// Word used inside ledger ids and as the period field name
    pub fn period_word(self) -> &'static str {
        match self {
            PlanKind::Monthly => "month",
            PlanKind::Weekly => "week",
        }
    }
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanKind::Monthly => write!(f, "monthly"),
            PlanKind::Weekly => write!(f, "weekly"),
        }
    }
}

/// How weekly due dates are placed on the calendar.
///
/// `Cadence` is a plain seven-day step from the start date. `SnapTo` takes the
/// same step and then moves forward to the next occurrence of the weekday when
/// the stepped date does not already fall on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeeklyRule {
    #[default]
    Cadence,
    SnapTo(Weekday),
}

/// One entry of a generated schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPeriod {
    pub index: u32,
    pub due_date: NaiveDate,
}

/// Build the ordered due dates for a plan.
///
/// Monthly periods add `index` calendar months to the start date. Chrono clamps
/// to the last valid day of the target month, so Jan 31 + 1 month lands on the
/// last day of February. Every period is computed from the start date rather
/// than from the previous period, so the clamp never carries forward.
pub fn generate(
    start: NaiveDate,
    period_count: u32,
    kind: PlanKind,
    rule: WeeklyRule,
) -> Vec<ScheduledPeriod> {
    (1..=period_count)
        .map_while(|index| {
            due_date(start, index, kind, rule).map(|due_date| ScheduledPeriod { index, due_date })
        })
        .collect()
}

/// Due date for a single 1-based period index
pub fn due_date(
    start: NaiveDate,
    index: u32,
    kind: PlanKind,
    rule: WeeklyRule,
) -> Option<NaiveDate> {
    match kind {
        PlanKind::Monthly => start.checked_add_months(Months::new(index)),
        PlanKind::Weekly => {
            let base = start.checked_add_signed(Duration::weeks(i64::from(index)))?;
            match rule {
                WeeklyRule::Cadence => Some(base),
                WeeklyRule::SnapTo(target) => snap_forward(base, target),
            }
        }
    }
}

fn snap_forward(date: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let offset = (7 + wanted - current) % 7;
    date.checked_add_signed(Duration::days(i64::from(offset)))
}

/// Parse a weekday name as written in config.toml ("monday", "fri", ...)
pub fn parse_weekday(value: &str) -> Result<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| PlanError::InvalidWeekday(value.to_string()))
}
