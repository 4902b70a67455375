//! Remote sync adapter boundary.
//!
//! # Responsibility
//! - Define the outbound check-in event and inbound snapshot shapes.
//! - Translate every transport fault into a value at this boundary.
//! - Run outbound sends off the caller's path.
//!
//! # Invariants
//! - `RemoteSync::fetch_today` never fails; any fault yields an empty list.
//! - A send failure is advisory only and never reaches presence state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dispatcher;
pub mod offline;
pub mod snapshot;
pub mod webhook;

pub use dispatcher::{SyncDispatcher, SyncJob, SyncReport};
pub use offline::OfflineRemoteSync;
pub use snapshot::decode_snapshot;
pub use webhook::WebhookRemoteSync;

/// Outbound event posted to the attendance sheet webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInPayload {
    #[serde(rename = "naam")]
    pub display_name: String,
    /// RFC 3339 instant of the local action.
    #[serde(rename = "tijdstip")]
    pub at: String,
    /// `Aanwezig` or `Afgemeld`.
    #[serde(rename = "actie")]
    pub action: String,
}

/// One attendee from the remote "today" snapshot. Untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttendee {
    #[serde(rename = "naam")]
    pub display_name: String,
    #[serde(rename = "tijdstip")]
    pub since: String,
}

/// Failure of one outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSyncError {
    /// Request never completed (dns, connect, tls, timeout, io).
    Transport { kind: &'static str, detail: String },
    /// Payload could not be serialized.
    Encode(String),
    /// Background worker is gone; the event was never handed to transport.
    WorkerUnavailable,
}

impl Display for RemoteSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { kind, detail } => write!(f, "remote transport {kind}: {detail}"),
            Self::Encode(detail) => write!(f, "failed to encode payload: {detail}"),
            Self::WorkerUnavailable => write!(f, "remote sync worker unavailable"),
        }
    }
}

impl Error for RemoteSyncError {}

/// Best-effort remote attendance collaborator.
pub trait RemoteSync: Send + Sync {
    /// Short stable adapter name for logs.
    fn adapter_id(&self) -> &str;

    /// Sends one check-in/out event. Only transport faults are errors.
    fn send(&self, payload: &CheckInPayload) -> Result<(), RemoteSyncError>;

    /// Fetches today's remote attendees, or an empty list on any fault.
    fn fetch_today(&self) -> Vec<RemoteAttendee>;
}
