use chrono::NaiveDate;
use serde::Serialize;

use super::plan::PaymentPlan;
use super::reconcile::PeriodView;

/// Which pending periods should raise a reminder relative to "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    /// Days after today still inside the window (0 = due today only)
    pub days_ahead: u32,
    /// Also remind about pending periods already past due
    pub include_overdue: bool,
}

impl Default for ReminderWindow {
    fn default() -> Self {
        Self {
            days_ahead: 3,
            include_overdue: false,
        }
    }
}

impl ReminderWindow {
    pub fn contains(&self, today: NaiveDate, due_date: NaiveDate) -> bool {
        let days_until = (due_date - today).num_days();
        if days_until < 0 {
            self.include_overdue
        } else {
            days_until <= i64::from(self.days_ahead)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub analysis_id: String,
    pub client_name: String,
    pub period_index: u32,
    pub due_date: NaiveDate,
    pub amount: f64,
    /// Negative when overdue
    pub days_until: i64,
}

/// Pending periods of `plan` that fall inside `window`
pub fn due_reminders(
    plan: &PaymentPlan,
    periods: &[PeriodView],
    today: NaiveDate,
    window: ReminderWindow,
) -> Vec<Reminder> {
    periods
        .iter()
        .filter(|p| !p.is_paid && window.contains(today, p.due_date))
        .map(|p| Reminder {
            analysis_id: plan.analysis_id.clone(),
            client_name: plan.client_name.clone(),
            period_index: p.period_index,
            due_date: p.due_date,
            amount: plan.period_value,
            days_until: (p.due_date - today).num_days(),
        })
        .collect()
}
