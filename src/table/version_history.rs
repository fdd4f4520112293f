use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::clock::next_after;

/// Bounded, time-ordered history of the values written to one property.
///
/// Versions are keyed by their write timestamp and iterate oldest first.
/// Writes go through [`VersionHistory::record`], which keeps the history at
/// or below the table's `max_versions` by evicting the oldest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionHistory {
    versions: BTreeMap<DateTime<Utc>, String>,
}

impl VersionHistory {
    pub fn new() -> Self {
        VersionHistory::default()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Value at exactly `ts`, if that version is still retained.
    pub fn get(&self, ts: &DateTime<Utc>) -> Option<&str> {
        self.versions.get(ts).map(String::as_str)
    }

    /// Most recent version.
    pub fn latest(&self) -> Option<(DateTime<Utc>, &str)> {
        self.versions
            .last_key_value()
            .map(|(ts, value)| (*ts, value.as_str()))
    }

    /// Oldest retained version.
    pub fn oldest(&self) -> Option<(DateTime<Utc>, &str)> {
        self.versions
            .first_key_value()
            .map(|(ts, value)| (*ts, value.as_str()))
    }

    /// Iterate versions oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (DateTime<Utc>, &str)> {
        self.versions.iter().map(|(ts, value)| (*ts, value.as_str()))
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.versions.keys().copied().collect()
    }

    /// Record `value` as the newest version and return the number of evicted
    /// versions.
    ///
    /// The stamp is `now`, moved forward past the newest retained stamp when
    /// the clock has not advanced, so every write produces a new version.
    /// While the history holds `max_versions` or more entries the oldest is
    /// removed before the insert.
    pub(crate) fn record(
        &mut self,
        now: DateTime<Utc>,
        value: impl Into<String>,
        max_versions: usize,
    ) -> (DateTime<Utc>, usize) {
        let ts = next_after(now, self.versions.last_key_value().map(|(ts, _)| *ts));

        let mut evicted = 0;
        while !self.versions.is_empty() && self.versions.len() >= max_versions {
            self.versions.pop_first();
            evicted += 1;
        }

        self.versions.insert(ts, value.into());
        (ts, evicted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_record_first_version() {
        let mut history = VersionHistory::new();
        let (ts, evicted) = history.record(base(), "alice", 3);

        assert_eq!(ts, base());
        assert_eq!(evicted, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest(), Some((base(), "alice")));
    }

    #[test]
    fn test_record_evicts_oldest_at_cap() {
        let mut history = VersionHistory::new();
        for i in 0..3 {
            history.record(base() + Duration::seconds(i), format!("v{i}"), 3);
        }
        assert_eq!(history.len(), 3);

        let (_, evicted) = history.record(base() + Duration::seconds(3), "v3", 3);
        assert_eq!(evicted, 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.oldest(), Some((base() + Duration::seconds(1), "v1")));
        assert_eq!(history.latest(), Some((base() + Duration::seconds(3), "v3")));
        assert!(history.get(&base()).is_none());
    }

    #[test]
    fn test_record_with_cap_of_one_keeps_only_latest() {
        let mut history = VersionHistory::new();
        history.record(base(), "a", 1);
        history.record(base() + Duration::seconds(1), "b", 1);

        let values: Vec<&str> = history.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["b"]);
    }

    #[test]
    fn test_record_same_instant_creates_distinct_versions() {
        let mut history = VersionHistory::new();
        let (first, _) = history.record(base(), "a", 5);
        let (second, _) = history.record(base(), "b", 5);
        let (third, _) = history.record(base() - Duration::seconds(10), "c", 5);

        assert!(first < second && second < third);
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().map(|(_, v)| v), Some("c"));
    }

    #[test]
    fn test_record_trims_overfull_history() {
        let mut history = VersionHistory::new();
        for i in 0..5 {
            history.record(base() + Duration::seconds(i), format!("v{i}"), 5);
        }

        let (_, evicted) = history.record(base() + Duration::seconds(5), "v5", 2);
        assert_eq!(evicted, 4);
        assert_eq!(history.len(), 2);
        assert_eq!(history.oldest().map(|(_, v)| v), Some("v4"));
    }

    #[test]
    fn test_serialized_as_timestamp_map() {
        let mut history = VersionHistory::new();
        history.record(base(), "alice", 3);

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json, serde_json::json!({ "2024-05-20T10:00:00Z": "alice" }));

        let decoded: VersionHistory = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, history);
    }
}
