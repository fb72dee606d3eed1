mod plan;
mod reconcile;
mod record;
mod reminder;
mod schedule;
mod store;
mod summary;

pub use plan::PaymentPlan;
pub use reconcile::{PeriodView, Reconciler, ToggleOutcome};
pub use record::{LedgerKey, LedgerRecord, StoredRecord};
pub use reminder::{due_reminders, Reminder, ReminderWindow};
pub use schedule::{due_date, generate, parse_weekday, PlanKind, ScheduledPeriod, WeeklyRule};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use summary::{format_grouped_int, format_money, summarize, PlanSummary};
