use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::plan::PaymentPlan;
use super::record::{LedgerKey, LedgerRecord, StoredRecord};
use super::schedule::{self, ScheduledPeriod, WeeklyRule};
use super::store::LedgerStore;
use crate::error::{PlanError, Result};

/// Status of one period, derived on read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodView {
    pub period_index: u32,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub ledger_id: Option<String>,
}

/// Result of a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub is_paid: bool,
    pub ledger_id: Option<String>,
    /// A new record was appended
    pub created: bool,
    /// The ledger was written
    pub changed: bool,
}

/// Matches plan schedules against the ledger and applies status changes
pub struct Reconciler<S> {
    store: S,
    weekly_rule: WeeklyRule,
}

impl<S: LedgerStore> Reconciler<S> {
    pub fn new(store: S, weekly_rule: WeeklyRule) -> Self {
        Self { store, weekly_rule }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn weekly_rule(&self) -> WeeklyRule {
        self.weekly_rule
    }

    /// Due dates for a plan. An unparseable start date yields no periods.
    pub fn schedule(&self, plan: &PaymentPlan) -> Vec<ScheduledPeriod> {
        match plan.start() {
            Some(start) => {
                schedule::generate(start, plan.period_count, plan.kind, self.weekly_rule)
            }
            None => {
                warn!(
                    plan = %plan.analysis_id,
                    start_date = %plan.start_date,
                    "invalid start date, empty schedule"
                );
                Vec::new()
            }
        }
    }

    /// Reconciled periods for a plan, in ascending index order
    pub fn build_periods(&self, plan: &PaymentPlan) -> Vec<PeriodView> {
        let records = self.store.load_all();
        self.build_periods_from(plan, &records)
    }

    /// Same as [`build_periods`](Self::build_periods) over an already loaded ledger
    pub fn build_periods_from(
        &self,
        plan: &PaymentPlan,
        records: &[StoredRecord],
    ) -> Vec<PeriodView> {
        self.schedule(plan)
            .into_iter()
            .map(|period| {
                let id = LedgerKey::new(&plan.analysis_id, plan.kind, period.index).to_string();
                let found = find_record(records, &id).map(|pos| &records[pos]);
                PeriodView {
                    period_index: period.index,
                    due_date: period.due_date,
                    is_paid: found.is_some_and(StoredRecord::is_paid),
                    ledger_id: found.map(|_| id),
                }
            })
            .collect()
    }

    /// Flip a period between paid and pending
    pub fn toggle_period(&self, plan: &PaymentPlan, period_index: u32) -> Result<ToggleOutcome> {
        self.apply(plan, period_index, |currently_paid| !currently_paid)
    }

    /// Move a period to an explicit state. Requests that match the current
    /// state leave the ledger untouched.
    pub fn set_period_status(
        &self,
        plan: &PaymentPlan,
        period_index: u32,
        paid: bool,
    ) -> Result<ToggleOutcome> {
        self.apply(plan, period_index, |_| paid)
    }

    fn apply(
        &self,
        plan: &PaymentPlan,
        period_index: u32,
        target: impl FnOnce(bool) -> bool,
    ) -> Result<ToggleOutcome> {
        if period_index == 0 || period_index > plan.period_count {
            return Err(PlanError::InvalidArgument(format!(
                "period {} is outside 1..={} for plan '{}'",
                period_index, plan.period_count, plan.analysis_id
            )));
        }
        plan.validate()?;

        let key = LedgerKey::new(&plan.analysis_id, plan.kind, period_index);
        let id = key.to_string();
        let mut records = self.store.load_all();

        match find_record(&records, &id) {
            Some(pos) => {
                let currently_paid = records[pos].is_paid();
                let paid = target(currently_paid);
                if paid == currently_paid {
                    debug!(%id, paid, "status unchanged");
                    return Ok(ToggleOutcome {
                        is_paid: paid,
                        ledger_id: Some(id),
                        created: false,
                        changed: false,
                    });
                }

                if !records[pos].set_pending(!paid) {
                    return Err(PlanError::InvalidArgument(format!(
                        "ledger entry '{id}' cannot hold a payment status"
                    )));
                }
                self.store.save_all(&records)?;
                info!(%id, paid, "period status updated");

                Ok(ToggleOutcome {
                    is_paid: paid,
                    ledger_id: Some(id),
                    created: false,
                    changed: true,
                })
            }
            None => {
                // No record means the period was never paid
                if !target(false) {
                    debug!(%id, "already pending, nothing to write");
                    return Ok(ToggleOutcome {
                        is_paid: false,
                        ledger_id: None,
                        created: false,
                        changed: false,
                    });
                }

                let due_date = plan
                    .start()
                    .and_then(|start| {
                        schedule::due_date(start, period_index, plan.kind, self.weekly_rule)
                    })
                    .ok_or_else(|| {
                        PlanError::InvalidArgument(format!(
                            "period {period_index} of plan '{}' has no due date",
                            plan.analysis_id
                        ))
                    })?;

                let record = LedgerRecord::paid(
                    &key,
                    &plan.client_name,
                    plan.period_value,
                    due_date,
                    plan.period_count,
                    Utc::now(),
                );
                records.push(record.into());
                self.store.save_all(&records)?;
                info!(%id, "period marked paid, record created");

                Ok(ToggleOutcome {
                    is_paid: true,
                    ledger_id: Some(id),
                    created: true,
                    changed: true,
                })
            }
        }
    }
}

/// First element whose id equals `id` exactly
fn find_record(records: &[StoredRecord], id: &str) -> Option<usize> {
    records.iter().position(|r| r.id() == Some(id))
}
