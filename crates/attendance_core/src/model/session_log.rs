//! Append-only session ledger of check-in/out attempts.
//!
//! # Responsibility
//! - Record every accepted check-in/out as an immutable entry.
//! - Track the advisory outcome of the matching remote sync call.
//!
//! # Invariants
//! - Entries are never mutated or deleted after append.
//! - A remote outcome is recorded at most once per entry; later reports for
//!   the same entry are ignored.
//! - Recording a remote outcome never touches presence state.

use crate::model::identity::{identity_key, IdentityKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stable identifier for one ledger entry.
pub type EntryId = Uuid;

/// Check-in direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

impl AttendanceAction {
    /// Label written to the remote attendance sheet.
    pub fn remote_label(self) -> &'static str {
        match self {
            Self::CheckIn => "Aanwezig",
            Self::CheckOut => "Afgemeld",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::CheckOut => "check_out",
        }
    }
}

/// Outcome flag shown in the audit view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Ok,
    Failed,
}

/// Immutable record of one accepted check-in/out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLogEntry {
    id: EntryId,
    display_name: String,
    at: OffsetDateTime,
    action: AttendanceAction,
}

impl SessionLogEntry {
    pub fn new(display_name: &str, at: OffsetDateTime, action: AttendanceAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.trim().to_string(),
            at,
            action,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn key(&self) -> IdentityKey {
        identity_key(&self.display_name)
    }

    pub fn at(&self) -> OffsetDateTime {
        self.at
    }

    pub fn action(&self) -> AttendanceAction {
        self.action
    }
}

/// Audit row: an entry plus its remote sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub entry: SessionLogEntry,
    /// `Ok` until the remote call reports a failure.
    pub outcome: SyncOutcome,
    /// Whether the remote call has reported back at all.
    pub settled: bool,
}

/// Append-only ledger for one process session.
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    entries: Vec<SessionLogEntry>,
    remote_outcomes: HashMap<EntryId, SyncOutcome>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: SessionLogEntry) -> EntryId {
        let id = entry.id();
        self.entries.push(entry);
        id
    }

    /// Records the remote outcome for an entry.
    ///
    /// Returns `false` when the entry is unknown or already settled.
    pub fn record_remote_outcome(&mut self, id: EntryId, outcome: SyncOutcome) -> bool {
        if !self.entries.iter().any(|entry| entry.id() == id) {
            return false;
        }
        if self.remote_outcomes.contains_key(&id) {
            return false;
        }
        self.remote_outcomes.insert(id, outcome);
        true
    }

    pub fn remote_outcome(&self, id: EntryId) -> Option<SyncOutcome> {
        self.remote_outcomes.get(&id).copied()
    }

    /// Entries in append order.
    pub fn entries(&self) -> &[SessionLogEntry] {
        &self.entries
    }

    /// Audit rows, most recent first.
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.entries
            .iter()
            .rev()
            .map(|entry| {
                let remote = self.remote_outcome(entry.id());
                AuditRecord {
                    entry: entry.clone(),
                    outcome: remote.unwrap_or(SyncOutcome::Ok),
                    settled: remote.is_some(),
                }
            })
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.remote_outcomes
            .values()
            .filter(|outcome| **outcome == SyncOutcome::Failed)
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.remote_outcomes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceAction, SessionLedger, SessionLogEntry, SyncOutcome};
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn audit_records_are_most_recent_first() {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionLogEntry::new(
            "Eva Blom",
            datetime!(2026-01-05 8:00 UTC),
            AttendanceAction::CheckIn,
        ));
        ledger.append(SessionLogEntry::new(
            "Eva Blom",
            datetime!(2026-01-05 17:00 UTC),
            AttendanceAction::CheckOut,
        ));

        let records = ledger.audit_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entry.action(), AttendanceAction::CheckOut);
        assert_eq!(records[1].entry.action(), AttendanceAction::CheckIn);
        assert!(records.iter().all(|r| r.outcome == SyncOutcome::Ok && !r.settled));
    }

    #[test]
    fn remote_outcome_is_recorded_once() {
        let mut ledger = SessionLedger::new();
        let id = ledger.append(SessionLogEntry::new(
            "Eva Blom",
            datetime!(2026-01-05 8:00 UTC),
            AttendanceAction::CheckIn,
        ));

        assert!(ledger.record_remote_outcome(id, SyncOutcome::Failed));
        assert!(!ledger.record_remote_outcome(id, SyncOutcome::Ok));
        assert_eq!(ledger.remote_outcome(id), Some(SyncOutcome::Failed));
        assert_eq!(ledger.failed_count(), 1);
        assert_eq!(ledger.pending_count(), 0);

        let record = &ledger.audit_records()[0];
        assert_eq!(record.outcome, SyncOutcome::Failed);
        assert!(record.settled);
    }

    #[test]
    fn unknown_entry_outcome_is_ignored() {
        let mut ledger = SessionLedger::new();
        assert!(!ledger.record_remote_outcome(Uuid::new_v4(), SyncOutcome::Ok));
        assert_eq!(ledger.failed_count(), 0);
    }

    #[test]
    fn remote_labels_match_sheet_vocabulary() {
        assert_eq!(AttendanceAction::CheckIn.remote_label(), "Aanwezig");
        assert_eq!(AttendanceAction::CheckOut.remote_label(), "Afgemeld");
    }
}
