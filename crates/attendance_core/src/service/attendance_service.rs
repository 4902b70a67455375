//! Check-in/out coordinator.
//!
//! # Responsibility
//! - Own the roster, presence map, session ledger and sync dispatcher for
//!   one process, and expose the kiosk use-cases over them.
//! - Apply the local effect of a check-in/out synchronously, then hand the
//!   remote notification to the dispatcher.
//!
//! # Invariants
//! - `check_in` on a present key and `check_out` on an absent key are
//!   rejected with no state change.
//! - A remote outcome is recorded into the ledger only; it never changes
//!   presence state.
//! - All mutation goes through `&mut self`, so two mutations for the same
//!   key cannot interleave. Callers sharing a service across threads wrap
//!   it in a `Mutex`.
//! - Removing a person from the roster also removes their presence entry.

use crate::model::person::Person;
use crate::model::presence::{PresenceEntry, PresenceMap};
use crate::model::roster::Roster;
use crate::model::session_log::{
    AttendanceAction, AuditRecord, EntryId, SessionLedger, SessionLogEntry, SyncOutcome,
};
use crate::reconcile::{build_presence_view, PresenceView};
use crate::repo::roster_repo::RosterRepository;
use crate::service::roster_service::{RosterService, RosterServiceError};
use crate::sync::{
    CheckInPayload, RemoteAttendee, RemoteSync, SyncDispatcher, SyncJob, SyncReport,
};
use crate::time_fmt::{format_instant, now_utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use time::OffsetDateTime;

/// Rejection of a check-in/out request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    EmptyName,
    AlreadyPresent(String),
    NotPresent(String),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::AlreadyPresent(name) => write!(f, "`{name}` is already checked in"),
            Self::NotPresent(name) => write!(f, "`{name}` is not checked in"),
        }
    }
}

impl Error for WorkflowError {}

/// Result of an accepted check-in/out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReceipt {
    pub entry_id: EntryId,
    pub display_name: String,
    pub action: AttendanceAction,
    pub at: OffsetDateTime,
}

/// Single in-process coordinator for kiosk attendance.
pub struct AttendanceService<R: RosterRepository> {
    roster: RosterService<R>,
    presence: PresenceMap,
    ledger: SessionLedger,
    remote: Arc<dyn RemoteSync>,
    dispatcher: SyncDispatcher,
}

impl<R: RosterRepository> AttendanceService<R> {
    /// Creates the coordinator and starts its sync worker.
    ///
    /// Presence and ledger start empty; they live for this session only.
    pub fn new(roster: RosterService<R>, remote: Arc<dyn RemoteSync>) -> std::io::Result<Self> {
        let dispatcher = SyncDispatcher::spawn(Arc::clone(&remote))?;
        info!(
            "event=attendance_start module=attendance status=ok adapter={} roster_size={}",
            remote.adapter_id(),
            roster.roster().len()
        );
        Ok(Self {
            roster,
            presence: PresenceMap::new(),
            ledger: SessionLedger::new(),
            remote,
            dispatcher,
        })
    }

    pub fn roster(&self) -> &Roster {
        self.roster.roster()
    }

    pub fn roster_service(&self) -> &RosterService<R> {
        &self.roster
    }

    pub fn presence(&self) -> &PresenceMap {
        &self.presence
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Shared handle to the remote adapter.
    ///
    /// Lets a caller that keeps this service behind a lock fetch the remote
    /// snapshot with the lock released, then reconcile via
    /// `presence_view_with`.
    pub fn remote_sync(&self) -> Arc<dyn RemoteSync> {
        Arc::clone(&self.remote)
    }

    /// Checks a person in.
    ///
    /// # Errors
    /// - `EmptyName` for blank input.
    /// - `AlreadyPresent` when the key already has a presence entry; the
    ///   existing entry and its timestamp are kept.
    pub fn check_in(&mut self, display_name: &str) -> Result<CheckReceipt, WorkflowError> {
        let name = non_empty(display_name)?;
        let at = now_utc();
        if self.presence.set(name, at).is_err() {
            debug!("event=check_in module=attendance status=rejected reason=already_present");
            return Err(WorkflowError::AlreadyPresent(name.to_string()));
        }
        Ok(self.record(name, at, AttendanceAction::CheckIn))
    }

    /// Checks a person out.
    ///
    /// # Errors
    /// - `EmptyName` for blank input.
    /// - `NotPresent` when the key has no presence entry.
    pub fn check_out(&mut self, display_name: &str) -> Result<CheckReceipt, WorkflowError> {
        let name = non_empty(display_name)?;
        if self.presence.remove(name).is_none() {
            debug!("event=check_out module=attendance status=rejected reason=not_present");
            return Err(WorkflowError::NotPresent(name.to_string()));
        }
        Ok(self.record(name, now_utc(), AttendanceAction::CheckOut))
    }

    pub fn is_present(&self, display_name: &str) -> bool {
        self.presence.contains(display_name)
    }

    /// Locally checked-in people, oldest check-in first.
    pub fn local_attendees(&self) -> Vec<&PresenceEntry> {
        self.presence.entries()
    }

    /// Adds a person to the roster.
    pub fn add_person(&mut self, raw_name: &str) -> Result<Person, RosterServiceError> {
        self.roster.add(raw_name)
    }

    /// Removes a person from the roster and from presence.
    ///
    /// Idempotent: removing an unknown name returns `Ok(None)`.
    pub fn remove_person(
        &mut self,
        display_name: &str,
    ) -> Result<Option<Person>, RosterServiceError> {
        let removed = self.roster.remove(display_name)?;
        if self.presence.remove(display_name).is_some() {
            info!("event=presence_cascade module=attendance status=ok reason=roster_remove");
        }
        Ok(removed)
    }

    pub fn search_roster(&self, query: &str) -> Vec<&Person> {
        self.roster.search(query)
    }

    /// Fetches a fresh remote snapshot and reconciles it with local state.
    ///
    /// Blocks on the remote fetch; an unreachable remote yields a view
    /// built from local presence only.
    pub fn presence_view(&self) -> Vec<PresenceView> {
        let snapshot = self.remote.fetch_today();
        self.presence_view_with(&snapshot)
    }

    /// Reconciles local state with a caller-provided snapshot.
    pub fn presence_view_with(&self, snapshot: &[RemoteAttendee]) -> Vec<PresenceView> {
        build_presence_view(self.roster.roster(), &self.presence, snapshot)
    }

    /// Records every remote outcome that has arrived, without blocking.
    ///
    /// Returns how many outcomes were recorded.
    pub fn settle_remote_outcomes(&mut self) -> usize {
        let reports = self.dispatcher.try_collect();
        self.apply_reports(reports)
    }

    /// Blocks until every outstanding remote call has reported.
    pub fn wait_for_remote_outcomes(&mut self) -> usize {
        let reports = self.dispatcher.wait_all();
        self.apply_reports(reports)
    }

    /// Audit rows, most recent first.
    pub fn audit_log(&self) -> Vec<AuditRecord> {
        self.ledger.audit_records()
    }

    fn record(&mut self, name: &str, at: OffsetDateTime, action: AttendanceAction) -> CheckReceipt {
        let entry_id = self.ledger.append(SessionLogEntry::new(name, at, action));
        info!(
            "event={} module=attendance status=ok entry_id={} present={}",
            action.as_str(),
            entry_id,
            self.presence.len()
        );

        let job = SyncJob {
            entry_id,
            payload: CheckInPayload {
                display_name: name.to_string(),
                at: format_instant(at),
                action: action.remote_label().to_string(),
            },
        };
        if let Err(err) = self.dispatcher.submit(job) {
            warn!(
                "event=sync_dispatch module=attendance status=error entry_id={} error={}",
                entry_id, err
            );
            self.ledger
                .record_remote_outcome(entry_id, SyncOutcome::Failed);
        }

        CheckReceipt {
            entry_id,
            display_name: name.to_string(),
            action,
            at,
        }
    }

    fn apply_reports(&mut self, reports: Vec<SyncReport>) -> usize {
        reports
            .into_iter()
            .filter(|report| {
                self.ledger
                    .record_remote_outcome(report.entry_id, report.outcome)
            })
            .count()
    }
}

fn non_empty(display_name: &str) -> Result<&str, WorkflowError> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::EmptyName);
    }
    Ok(trimmed)
}
