use chrono::{DateTime, Utc};

use crate::models::{GroundTruthLabel, Snapshot};
use crate::sensing::AdapterState;

/// Append-only, creation-ordered sequence of snapshots.
///
/// Entries are only handed out by shared reference; the only ways to remove
/// anything are [`SnapshotLog::clear`] and wholesale replacement on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotLog {
    entries: Vec<Snapshot>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the adapter's current values under `label` and appends them.
    pub fn record(&mut self, readings: &AdapterState, label: &GroundTruthLabel) -> &Snapshot {
        self.record_at(readings, label, Utc::now())
    }

    pub fn record_at(
        &mut self,
        readings: &AdapterState,
        label: &GroundTruthLabel,
        timestamp: DateTime<Utc>,
    ) -> &Snapshot {
        // Keep timestamps non-decreasing even if the wall clock steps back.
        let timestamp = match self.entries.last() {
            Some(last) if last.timestamp > timestamp => last.timestamp,
            _ => timestamp,
        };
        let index = self.entries.len();
        self.entries.push(Snapshot::capture(readings, label.clone(), timestamp));
        &self.entries[index]
    }

    pub fn replace_all(&mut self, entries: Vec<Snapshot>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a SnapshotLog {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
