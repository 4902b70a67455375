//! Domain model for kiosk attendance.
//!
//! # Responsibility
//! - Define roster, presence and ledger structures used by core services.
//! - Centralize identity-key derivation so no caller re-derives keys.
//!
//! # Invariants
//! - The identity key is the sole join key across roster, presence, ledger
//!   and remote data.

pub mod identity;
pub mod person;
pub mod presence;
pub mod roster;
pub mod session_log;
