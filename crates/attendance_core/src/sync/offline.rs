//! Remote sync used when no webhook is configured.
//!
//! The kiosk then works purely from local state: sends succeed without
//! leaving the process and the remote snapshot is always empty.

use super::{CheckInPayload, RemoteAttendee, RemoteSync, RemoteSyncError};
use log::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemoteSync;

impl OfflineRemoteSync {
    pub fn new() -> Self {
        Self
    }
}

impl RemoteSync for OfflineRemoteSync {
    fn adapter_id(&self) -> &str {
        "offline"
    }

    fn send(&self, payload: &CheckInPayload) -> Result<(), RemoteSyncError> {
        info!(
            "event=remote_send module=sync status=skipped mode=offline action={}",
            payload.action
        );
        Ok(())
    }

    fn fetch_today(&self) -> Vec<RemoteAttendee> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::OfflineRemoteSync;
    use crate::sync::{CheckInPayload, RemoteSync};

    #[test]
    fn offline_send_succeeds_and_snapshot_is_empty() {
        let adapter = OfflineRemoteSync::new();
        let payload = CheckInPayload {
            display_name: "Eva Blom".to_string(),
            at: "2026-03-02T08:00:00Z".to_string(),
            action: "Afgemeld".to_string(),
        };
        assert!(adapter.send(&payload).is_ok());
        assert!(adapter.fetch_today().is_empty());
    }
}
