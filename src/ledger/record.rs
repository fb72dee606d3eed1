use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::schedule::PlanKind;

/// Typed form of the composite ledger id `{analysis_id}-{month|week}-{index}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub analysis_id: String,
    pub kind: PlanKind,
    pub index: u32,
}

impl LedgerKey {
    pub fn new(analysis_id: impl Into<String>, kind: PlanKind, index: u32) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            kind,
            index,
        }
    }

    /// Split a stored id back into its parts.
    /// Analysis ids may themselves contain dashes, so the split runs from the right.
    pub fn parse(id: &str) -> Option<Self> {
        let mut parts = id.rsplitn(3, '-');
        let index = parts.next()?.parse::<u32>().ok()?;
        let kind = match parts.next()? {
            "month" => PlanKind::Monthly,
            "week" => PlanKind::Weekly,
            _ => return None,
        };
        let analysis_id = parts.next().filter(|s| !s.is_empty())?;
        Some(Self::new(analysis_id, kind, index))
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.analysis_id,
            self.kind.period_word(),
            self.index
        )
    }
}

/// A persisted payment record.
///
/// Field names match the existing `planos` blob exactly. The wire flag
/// `active` means "not yet paid"; it is exposed here as `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: String,
    pub client_name: String,
    #[serde(rename = "type")]
    pub kind: PlanKind,
    pub amount: f64,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weeks: Option<u32>,
    pub created: String,
    #[serde(rename = "active")]
    pub pending: bool,
    /// Keys this crate does not model, written back unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LedgerRecord {
    /// New record for a period that is being marked paid
    pub fn paid(
        key: &LedgerKey,
        client_name: &str,
        amount: f64,
        due_date: NaiveDate,
        total_periods: u32,
        created: DateTime<Utc>,
    ) -> Self {
        let (month, week, total_months, total_weeks) = match key.kind {
            PlanKind::Monthly => (Some(key.index), None, Some(total_periods), None),
            PlanKind::Weekly => (None, Some(key.index), None, Some(total_periods)),
        };

        Self {
            id: key.to_string(),
            client_name: client_name.to_string(),
            kind: key.kind,
            amount,
            due_date: due_date.format("%Y-%m-%d").to_string(),
            month,
            week,
            total_months,
            total_weeks,
            created: created.to_rfc3339_opts(SecondsFormat::Millis, true),
            pending: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn period_index(&self) -> Option<u32> {
        self.month.or(self.week)
    }
}

/// One element of the persisted list.
///
/// Elements that do not have the record shape are carried as raw JSON so a
/// save never drops data this crate does not understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Ledger(LedgerRecord),
    Opaque(serde_json::Value),
}

impl StoredRecord {
    pub fn id(&self) -> Option<&str> {
        match self {
            StoredRecord::Ledger(record) => Some(&record.id),
            StoredRecord::Opaque(value) => value.get("id").and_then(|v| v.as_str()),
        }
    }

    /// Pending flag, if the element carries one
    pub fn pending(&self) -> Option<bool> {
        match self {
            StoredRecord::Ledger(record) => Some(record.pending),
            StoredRecord::Opaque(value) => value.get("active").and_then(|v| v.as_bool()),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.pending() == Some(false)
    }

    /// Returns false when the element is not an object and cannot hold the flag
    pub fn set_pending(&mut self, pending: bool) -> bool {
        match self {
            StoredRecord::Ledger(record) => {
                record.pending = pending;
                true
            }
            StoredRecord::Opaque(serde_json::Value::Object(map)) => {
                map.insert("active".to_string(), serde_json::Value::Bool(pending));
                true
            }
            StoredRecord::Opaque(_) => false,
        }
    }

    pub fn as_ledger(&self) -> Option<&LedgerRecord> {
        match self {
            StoredRecord::Ledger(record) => Some(record),
            StoredRecord::Opaque(_) => None,
        }
    }
}

impl From<LedgerRecord> for StoredRecord {
    fn from(record: LedgerRecord) -> Self {
        StoredRecord::Ledger(record)
    }
}
