//! Instant formatting helpers for wire and display use.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00Z";

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Formats an instant as RFC 3339, the wire form used for `tijdstip`.
pub fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| EPOCH_RFC3339.to_string())
}

/// Parses an RFC 3339 string. Remote values are untrusted, so failures
/// return `None`.
pub fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).ok()
}

/// `HH:MM` wall-clock form of an RFC 3339 value, in the value's own offset.
pub fn clock_label(value: &str) -> Option<String> {
    let instant = parse_instant(value)?;
    instant
        .format(format_description!("[hour]:[minute]"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{clock_label, format_instant, parse_instant};
    use time::macros::datetime;

    #[test]
    fn format_uses_rfc3339_with_utc_designator() {
        assert_eq!(
            format_instant(datetime!(2026-03-02 8:15 UTC)),
            "2026-03-02T08:15:00Z"
        );
    }

    #[test]
    fn parse_rejects_garbage_and_accepts_offsets() {
        assert!(parse_instant("yesterday").is_none());
        let parsed = parse_instant("2026-03-02T09:15:00+01:00").expect("valid rfc3339");
        assert_eq!(parsed, datetime!(2026-03-02 8:15 UTC));
    }

    #[test]
    fn clock_label_keeps_value_offset() {
        assert_eq!(
            clock_label("2026-03-02T09:05:00+01:00").as_deref(),
            Some("09:05")
        );
        assert_eq!(clock_label("not a time"), None);
    }
}
