//! Flutter-facing bindings for the attendance kiosk core.

pub mod api;
