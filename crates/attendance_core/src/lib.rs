//! Core attendance engine for the check-in kiosk.
//! This crate is the single source of truth for roster, presence and
//! reconciliation invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod sync;
pub mod time_fmt;

pub use config::{AttendanceConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{identity_key, IdentityKey};
pub use model::person::{Person, ValidationError};
pub use model::presence::{PresenceEntry, PresenceMap};
pub use model::roster::{Roster, DEFAULT_ROSTER};
pub use model::session_log::{
    AttendanceAction, AuditRecord, EntryId, SessionLedger, SessionLogEntry, SyncOutcome,
};
pub use reconcile::{
    build_presence_view, filter_presence_view, PresenceSource, PresenceSummary, PresenceView,
};
pub use repo::roster_repo::{RepoError, RepoResult, RosterRepository, SqliteRosterRepository};
pub use service::attendance_service::{AttendanceService, CheckReceipt, WorkflowError};
pub use service::roster_service::{RosterService, RosterServiceError, RosterSource};
pub use sync::{
    decode_snapshot, CheckInPayload, OfflineRemoteSync, RemoteAttendee, RemoteSync,
    RemoteSyncError, WebhookRemoteSync,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
