//! Fail-open decoding of the remote attendee snapshot.

use super::RemoteAttendee;
use log::warn;
use serde_json::Value;

/// Decodes a snapshot body.
///
/// Malformed JSON or a non-array payload yields an empty list. Inside an
/// array, elements that do not match the attendee shape or carry a blank
/// name are skipped individually.
pub fn decode_snapshot(body: &str) -> Vec<RemoteAttendee> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=snapshot_decode module=sync status=error error_code=malformed_json error={}",
                err
            );
            return Vec::new();
        }
    };

    let Value::Array(items) = value else {
        warn!("event=snapshot_decode module=sync status=error error_code=not_an_array");
        return Vec::new();
    };

    let total = items.len();
    let attendees: Vec<RemoteAttendee> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RemoteAttendee>(item).ok())
        .filter(|attendee| !attendee.display_name.trim().is_empty())
        .collect();
    if attendees.len() != total {
        warn!(
            "event=snapshot_decode module=sync status=partial skipped={} kept={}",
            total - attendees.len(),
            attendees.len()
        );
    }
    attendees
}
