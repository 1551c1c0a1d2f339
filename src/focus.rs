//! Focus-time ledger.
//!
//! Accumulated focus minutes keyed by calendar day, stored as one map in
//! the `focus` document. Writes are additive: recording more minutes for a
//! day sums onto what is already there. Range queries compare calendar
//! days only, so an entry keyed `2024-03-01T18:30:00Z` still counts for
//! March 1st.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use crate::document::{DocumentHandle, VERSION_FIELD};
use crate::error::Result;

/// Storage key of the backing document.
pub const FOCUS_KEY: &str = "focus";

/// Field holding the ledger map.
const FOCUS_FIELD: &str = "focus";

/// Current schema version of the focus document.
const FOCUS_SCHEMA_VERSION: u64 = 1;

/// Day key → accumulated minutes.
pub type FocusLedger = BTreeMap<String, u64>;

/// Keyed accumulation of per-day focus minutes.
#[derive(Debug, Clone)]
pub struct FocusStore {
    doc: DocumentHandle,
}

impl FocusStore {
    /// Wrap an opened `focus` document. Call [`FocusStore::init`] before
    /// any other operation.
    pub fn new(doc: DocumentHandle) -> Self {
        Self { doc }
    }

    /// Seed the schema version and an empty ledger on first run.
    /// Idempotent.
    pub async fn init(&self) -> Result<()> {
        if self.doc.is_initialized().await {
            return Ok(());
        }
        self.doc
            .set(VERSION_FIELD, FOCUS_SCHEMA_VERSION.into())
            .await;
        self.doc.set_as(FOCUS_FIELD, &FocusLedger::new()).await?;
        self.doc.persist().await
    }

    /// The whole ledger. Unreadable data yields an empty ledger.
    pub async fn get_all(&self) -> FocusLedger {
        self.doc.get_as(FOCUS_FIELD).await.unwrap_or_default()
    }

    /// Overwrite the whole ledger.
    pub async fn replace_all(&self, ledger: &FocusLedger) -> Result<()> {
        self.save(ledger).await
    }

    /// Add `minutes` onto the entry for `day`, creating it when absent.
    pub async fn add_minutes(&self, day: &str, minutes: u64) -> Result<()> {
        let mut ledger = self.get_all().await;
        let entry = ledger.entry(day.to_string()).or_insert(0);
        *entry = entry.saturating_add(minutes);
        self.save(&ledger).await
    }

    /// Minutes recorded for `day`, 0 when absent.
    pub async fn get_minutes(&self, day: &str) -> u64 {
        self.get_all().await.get(day).copied().unwrap_or(0)
    }

    /// Entries whose calendar day falls within `[start_day, end_day]`
    /// inclusive. Comparison strips any time-of-day in both the bounds and
    /// the stored keys; keys that do not parse as a date are left out.
    pub async fn get_range(&self, start_day: &str, end_day: &str) -> FocusLedger {
        let (Some(start), Some(end)) = (parse_day(start_day), parse_day(end_day)) else {
            return FocusLedger::new();
        };

        self.get_all()
            .await
            .into_iter()
            .filter(|(day, _)| {
                parse_day(day)
                    .map(|date| date >= start && date <= end)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Sum over every entry in the ledger.
    pub async fn total_minutes(&self) -> u64 {
        self.get_all().await.values().sum()
    }

    /// Drop every entry and persist the empty ledger.
    pub async fn clear(&self) -> Result<()> {
        self.save(&FocusLedger::new()).await
    }

    async fn save(&self, ledger: &FocusLedger) -> Result<()> {
        self.doc.set_as(FOCUS_FIELD, ledger).await?;
        self.doc.persist().await
    }
}

/// Calendar day of a caller-supplied key: a bare `YYYY-MM-DD`, or the date
/// part of an RFC 3339 instant.
fn parse_day(key: &str) -> Option<NaiveDate> {
    let trimmed = key.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
