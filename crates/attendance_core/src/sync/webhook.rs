//! HTTP webhook adapter for the shared attendance sheet.
//!
//! # Responsibility
//! - POST check-in/out events as JSON to the configured webhook.
//! - GET today's attendees from the same webhook (`?action=getToday`).
//!
//! # Invariants
//! - HTTP status codes on send are not a failure signal; the sheet endpoint
//!   may answer with anything once the request is delivered.
//! - Every fetch fault collapses to an empty snapshot.

use super::{decode_snapshot, CheckInPayload, RemoteAttendee, RemoteSync, RemoteSyncError};
use log::{info, warn};
use std::time::{Duration, Instant};

const ADAPTER_ID: &str = "webhook";
const MIN_TIMEOUT_MS: u64 = 100;
const USER_AGENT: &str = concat!("attendance-kiosk/", env!("CARGO_PKG_VERSION"));

/// Webhook-backed remote sync.
pub struct WebhookRemoteSync {
    agent: ureq::Agent,
    url: String,
}

impl WebhookRemoteSync {
    /// Builds an adapter with connect/read/write timeouts.
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        let timeout = Duration::from_millis(timeout_ms.max(MIN_TIMEOUT_MS));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteSync for WebhookRemoteSync {
    fn adapter_id(&self) -> &str {
        ADAPTER_ID
    }

    fn send(&self, payload: &CheckInPayload) -> Result<(), RemoteSyncError> {
        let started_at = Instant::now();
        let body =
            serde_json::to_string(payload).map_err(|err| RemoteSyncError::Encode(err.to_string()))?;

        match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(_) => {
                info!(
                    "event=remote_send module=sync status=ok action={} duration_ms={}",
                    payload.action,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => {
                warn!(
                    "event=remote_send module=sync status=ok action={} http_status={} duration_ms={}",
                    payload.action,
                    code,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(ureq::Error::Transport(transport)) => {
                let err = transport_error(&transport);
                warn!(
                    "event=remote_send module=sync status=error action={} duration_ms={} error={}",
                    payload.action,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn fetch_today(&self) -> Vec<RemoteAttendee> {
        let started_at = Instant::now();
        let response = match self
            .agent
            .get(&self.url)
            .query("action", "getToday")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                warn!(
                    "event=remote_fetch module=sync status=error error_code=http_non_success http_status={} duration_ms={}",
                    code,
                    started_at.elapsed().as_millis()
                );
                return Vec::new();
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(
                    "event=remote_fetch module=sync status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    transport_error(&transport)
                );
                return Vec::new();
            }
        };

        let body = match response.into_string() {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    "event=remote_fetch module=sync status=error error_code=body_read_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        let attendees = decode_snapshot(&body);
        info!(
            "event=remote_fetch module=sync status=ok attendees={} duration_ms={}",
            attendees.len(),
            started_at.elapsed().as_millis()
        );
        attendees
    }
}

fn transport_error(transport: &ureq::Transport) -> RemoteSyncError {
    let combined = format!("{:?} {}", transport.kind(), transport);
    RemoteSyncError::Transport {
        kind: classify_transport_error_kind(&combined),
        detail: transport.to_string(),
    }
}

fn classify_transport_error_kind(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}
