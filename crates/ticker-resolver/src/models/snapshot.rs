use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::record::{InstrumentRecord, Market};
use super::types::Identifier;

/// An immutable, fully built listing index plus its build time.
///
/// Records are keyed by identifier and keep their insertion order, which
/// is the order providers returned them in. Matching relies on that order
/// for tie-breaks.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    records: IndexMap<Identifier, InstrumentRecord>,
    built_at: DateTime<Utc>,
}

impl ListingSnapshot {
    /// Builds a snapshot from records in provider order.
    ///
    /// A duplicate identifier replaces the earlier record's value but keeps
    /// its original position (last write wins).
    pub fn build<I>(records: I, built_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = InstrumentRecord>,
    {
        let mut map = IndexMap::new();
        for record in records {
            map.insert(record.identifier.clone(), record);
        }
        Self {
            records: map,
            built_at,
        }
    }

    /// Wraps an identifier-keyed map loaded from storage.
    pub(crate) fn from_parts(
        records: IndexMap<Identifier, InstrumentRecord>,
        built_at: DateTime<Utc>,
    ) -> Self {
        Self { records, built_at }
    }

    pub(crate) fn records_map(&self) -> &IndexMap<Identifier, InstrumentRecord> {
        &self.records
    }

    pub fn get(&self, identifier: &str) -> Option<&InstrumentRecord> {
        self.records.get(identifier)
    }

    /// All records in index order.
    pub fn records(&self) -> impl Iterator<Item = &InstrumentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of records listed in `market`.
    pub fn count_for(&self, market: Market) -> usize {
        self.records().filter(|r| r.market == market).count()
    }

    /// Whether more than `threshold` has elapsed between `built_at` and `now`.
    ///
    /// A build time in the future (clock skew) never counts as stale.
    pub fn is_older_than(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.built_at).to_std() {
            Ok(age) => age > threshold,
            Err(_) => false,
        }
    }
}
