use chrono::{NaiveDate, Weekday};
use planos::ledger::{
    summarize, LedgerStore, MemoryStore, PaymentPlan, PlanKind, Reconciler, StoredRecord,
    WeeklyRule,
};
use planos::PlanError;
use serde_json::json;

fn monthly_plan(id: &str, count: u32) -> PaymentPlan {
    PaymentPlan {
        analysis_id: id.to_string(),
        client_name: "Ana Souza".to_string(),
        kind: PlanKind::Monthly,
        period_count: count,
        period_value: 100.0,
        start_date: "2024-01-15".to_string(),
    }
}

fn weekly_plan(id: &str, count: u32) -> PaymentPlan {
    PaymentPlan {
        analysis_id: id.to_string(),
        client_name: "Bruno Lima".to_string(),
        kind: PlanKind::Weekly,
        period_count: count,
        period_value: 80.0,
        start_date: "2024-06-03".to_string(),
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn records_with_id(store: &MemoryStore, id: &str) -> usize {
    store
        .snapshot()
        .iter()
        .filter(|r| r.id() == Some(id))
        .count()
}

#[test]
fn test_monthly_example() {
    let reconciler = Reconciler::new(MemoryStore::new(), WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 3);

    let periods = reconciler.build_periods(&plan);
    let due: Vec<NaiveDate> = periods.iter().map(|p| p.due_date).collect();
    assert_eq!(due, [date("2024-02-15"), date("2024-03-15"), date("2024-04-15")]);
    assert!(periods.iter().all(|p| !p.is_paid && p.ledger_id.is_none()));

    let outcome = reconciler.toggle_period(&plan, 2).unwrap();
    assert!(outcome.is_paid);
    assert!(outcome.created);
    assert_eq!(outcome.ledger_id.as_deref(), Some("a1-month-2"));

    let periods = reconciler.build_periods(&plan);
    let paid: Vec<bool> = periods.iter().map(|p| p.is_paid).collect();
    assert_eq!(paid, [false, true, false]);

    let summary = summarize(&periods, plan.period_count, plan.period_value);
    assert_eq!(summary.paid_count, 1);
    assert_eq!(summary.paid_value, 100.0);
    assert_eq!(summary.total_value, 300.0);
}

#[test]
fn test_created_record_snapshots_plan() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    reconciler.toggle_period(&monthly_plan("a1", 3), 2).unwrap();

    let records = store.snapshot();
    assert_eq!(records.len(), 1);
    let record = records[0].as_ledger().unwrap();
    assert_eq!(record.id, "a1-month-2");
    assert_eq!(record.client_name, "Ana Souza");
    assert_eq!(record.kind, PlanKind::Monthly);
    assert_eq!(record.amount, 100.0);
    assert_eq!(record.due_date, "2024-03-15");
    assert_eq!(record.month, Some(2));
    assert_eq!(record.total_months, Some(3));
    assert_eq!(record.week, None);
    assert!(!record.pending);
    assert!(chrono::DateTime::parse_from_rfc3339(&record.created).is_ok());
}

#[test]
fn test_weekly_cadence_example() {
    let reconciler = Reconciler::new(MemoryStore::new(), WeeklyRule::Cadence);
    let periods = reconciler.build_periods(&weekly_plan("w1", 4));
    let due: Vec<NaiveDate> = periods.iter().map(|p| p.due_date).collect();
    assert_eq!(
        due,
        [
            date("2024-06-10"),
            date("2024-06-17"),
            date("2024-06-24"),
            date("2024-07-01")
        ]
    );
}

#[test]
fn test_weekly_snap_rule_is_applied() {
    let reconciler = Reconciler::new(MemoryStore::new(), WeeklyRule::SnapTo(Weekday::Fri));
    let periods = reconciler.build_periods(&weekly_plan("w1", 2));
    assert_eq!(periods[0].due_date, date("2024-06-14"));
    assert_eq!(periods[1].due_date, date("2024-06-21"));

    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::SnapTo(Weekday::Fri));
    reconciler.toggle_period(&weekly_plan("w1", 2), 1).unwrap();
    let record = store.snapshot()[0].as_ledger().unwrap().clone();
    assert_eq!(record.id, "w1-week-1");
    assert_eq!(record.due_date, "2024-06-14");
    assert_eq!(record.week, Some(1));
    assert_eq!(record.total_weeks, Some(2));
}

#[test]
fn test_build_periods_is_idempotent() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 6);
    reconciler.toggle_period(&plan, 4).unwrap();

    let saves = store.save_count();
    let first = reconciler.build_periods(&plan);
    let second = reconciler.build_periods(&plan);
    assert_eq!(first, second);
    assert_eq!(store.save_count(), saves);
}

#[test]
fn test_toggle_round_trip_keeps_one_record() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 3);

    let first = reconciler.toggle_period(&plan, 1).unwrap();
    let second = reconciler.toggle_period(&plan, 1).unwrap();
    assert!(first.is_paid);
    assert!(!second.is_paid);
    assert!(!second.created);
    assert!(!reconciler.build_periods(&plan)[0].is_paid);

    for _ in 0..5 {
        reconciler.toggle_period(&plan, 1).unwrap();
        assert_eq!(records_with_id(&store, "a1-month-1"), 1);
    }
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn test_exact_id_matching() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 12);

    reconciler.toggle_period(&plan, 10).unwrap();
    reconciler.toggle_period(&plan, 1).unwrap();
    let periods = reconciler.build_periods(&plan);
    assert!(periods[0].is_paid);
    assert!(periods[9].is_paid);

    // Period 1 back to pending must not touch 10, 11 or 12
    let outcome = reconciler.toggle_period(&plan, 1).unwrap();
    assert!(!outcome.is_paid);
    let periods = reconciler.build_periods(&plan);
    assert!(!periods[0].is_paid);
    assert!(periods[9].is_paid);
    assert!(!periods[10].is_paid);
    assert_eq!(periods[9].ledger_id.as_deref(), Some("a1-month-10"));
    assert_eq!(periods[10].ledger_id, None);
}

#[test]
fn test_only_period_ten_paid_leaves_period_one_pending() {
    let store = MemoryStore::with_records(vec![StoredRecord::Opaque(json!({
        "id": "a1-month-10",
        "active": false
    }))]);
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let periods = reconciler.build_periods(&monthly_plan("a1", 10));
    assert!(!periods[0].is_paid);
    assert_eq!(periods[0].ledger_id, None);
    assert!(periods[9].is_paid);
}

#[test]
fn test_plans_do_not_share_records() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    reconciler.toggle_period(&monthly_plan("a1", 3), 1).unwrap();

    let other = reconciler.build_periods(&monthly_plan("a", 3));
    assert!(other.iter().all(|p| !p.is_paid));
    let weekly_same_id = reconciler.build_periods(&PaymentPlan {
        kind: PlanKind::Weekly,
        ..monthly_plan("a1", 3)
    });
    assert!(weekly_same_id.iter().all(|p| !p.is_paid));
}

#[test]
fn test_mark_pending_without_record_is_noop() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let outcome = reconciler
        .set_period_status(&monthly_plan("a1", 3), 2, false)
        .unwrap();
    assert!(!outcome.is_paid);
    assert!(!outcome.changed);
    assert!(!outcome.created);
    assert_eq!(store.save_count(), 0);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_set_status_matching_current_state_does_not_write() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 3);

    reconciler.set_period_status(&plan, 3, true).unwrap();
    assert_eq!(store.save_count(), 1);

    let again = reconciler.set_period_status(&plan, 3, true).unwrap();
    assert!(again.is_paid);
    assert!(!again.changed);
    assert_eq!(store.save_count(), 1);

    let pending = reconciler.set_period_status(&plan, 3, false).unwrap();
    assert!(!pending.is_paid);
    assert!(pending.changed);
    assert_eq!(store.save_count(), 2);
    assert_eq!(store.snapshot()[0].pending(), Some(true));
}

#[test]
fn test_out_of_range_period_is_invalid_argument() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 3);

    for index in [0, 4, 100] {
        let err = reconciler.toggle_period(&plan, index).unwrap_err();
        assert!(matches!(err, PlanError::InvalidArgument(_)), "{index}: {err}");
    }
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_zero_period_plan() {
    let reconciler = Reconciler::new(MemoryStore::new(), WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 0);
    let periods = reconciler.build_periods(&plan);
    assert!(periods.is_empty());

    let summary = summarize(&periods, plan.period_count, plan.period_value);
    assert_eq!(summary.percent_complete, 0.0);
    assert_eq!(summary.paid_count, 0);
    assert!(reconciler.toggle_period(&plan, 1).is_err());
}

#[test]
fn test_invalid_start_date_fails_closed() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = PaymentPlan {
        start_date: "next tuesday".to_string(),
        ..monthly_plan("a1", 3)
    };

    assert!(reconciler.build_periods(&plan).is_empty());
    let err = reconciler.toggle_period(&plan, 1).unwrap_err();
    assert!(matches!(err, PlanError::InvalidStartDate { .. }));
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_legacy_records_are_flipped_in_place() {
    let store = MemoryStore::with_records(vec![
        StoredRecord::Opaque(json!({
            "id": "a1-month-2",
            "clientName": "Ana Souza",
            "type": "mensal",
            "amount": 100,
            "dueDate": "2024-03-15T00:00:00.000Z",
            "month": 2,
            "active": false
        })),
        StoredRecord::Opaque(json!("garbage")),
    ]);
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 3);
    assert!(reconciler.build_periods(&plan)[1].is_paid);

    let outcome = reconciler.toggle_period(&plan, 2).unwrap();
    assert!(!outcome.is_paid);
    assert!(!outcome.created);

    let records = store.snapshot();
    assert_eq!(records.len(), 2);
    match &records[0] {
        StoredRecord::Opaque(value) => {
            assert_eq!(value["active"], json!(true));
            assert_eq!(value["type"], json!("mensal"));
        }
        other => panic!("expected opaque record, got {other:?}"),
    }
    assert_eq!(records[1], StoredRecord::Opaque(json!("garbage")));
}

#[test]
fn test_unknown_keys_on_other_plans_survive_toggle() {
    let stored: StoredRecord = serde_json::from_value(json!({
        "id": "other-month-1",
        "clientName": "Bia",
        "type": "monthly",
        "amount": 50.0,
        "dueDate": "2024-02-10",
        "month": 1,
        "totalMonths": 2,
        "created": "2024-01-10T09:00:00.000Z",
        "active": true,
        "analysisId": "other",
        "notes": "pago em dinheiro"
    }))
    .unwrap();
    assert!(stored.as_ledger().is_some());

    let store = MemoryStore::with_records(vec![stored]);
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    reconciler.toggle_period(&monthly_plan("a1", 3), 1).unwrap();

    let out = serde_json::to_value(store.snapshot()).unwrap();
    assert_eq!(out.as_array().unwrap().len(), 2);
    assert_eq!(out[0]["notes"], json!("pago em dinheiro"));
    assert_eq!(out[0]["analysisId"], json!("other"));
    assert_eq!(out[0]["active"], json!(true));
    assert!(out[1].get("notes").is_none());
}

#[test]
fn test_duplicate_legacy_records_use_first() {
    let store = MemoryStore::with_records(vec![
        StoredRecord::Opaque(json!({"id": "a1-month-1", "active": true})),
        StoredRecord::Opaque(json!({"id": "a1-month-1", "active": false})),
    ]);
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = monthly_plan("a1", 1);
    assert!(!reconciler.build_periods(&plan)[0].is_paid);

    reconciler.toggle_period(&plan, 1).unwrap();
    let records = store.snapshot();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pending(), Some(false));
    assert_eq!(records[1].pending(), Some(false));
}

struct FailingStore;

impl LedgerStore for FailingStore {
    fn load_all(&self) -> Vec<StoredRecord> {
        Vec::new()
    }

    fn save_all(&self, _records: &[StoredRecord]) -> planos::Result<()> {
        Err(PlanError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "quota exceeded",
        )))
    }
}

#[test]
fn test_write_failure_is_reported() {
    let reconciler = Reconciler::new(FailingStore, WeeklyRule::Cadence);
    let err = reconciler.toggle_period(&monthly_plan("a1", 3), 1).unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
}

#[test]
fn test_aggregate_consistency() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, WeeklyRule::Cadence);
    let plan = PaymentPlan {
        period_value: 37.5,
        ..monthly_plan("a1", 8)
    };

    for index in [1, 3, 3, 5, 8, 2, 5] {
        reconciler.toggle_period(&plan, index).unwrap();
        let periods = reconciler.build_periods(&plan);
        let summary = summarize(&periods, plan.period_count, plan.period_value);
        assert!(summary.paid_count <= plan.period_count);
        assert_eq!(
            summary.paid_value,
            f64::from(summary.paid_count) * plan.period_value
        );
        assert_eq!(summary.paid_count + summary.pending_count, plan.period_count);
    }
    // 1, 8 and 2 remain paid
    let periods = reconciler.build_periods(&plan);
    let paid: Vec<u32> = periods
        .iter()
        .filter(|p| p.is_paid)
        .map(|p| p.period_index)
        .collect();
    assert_eq!(paid, [1, 2, 8]);
}
