//! Presence reconciliation.
//!
//! # Responsibility
//! - Merge local presence, roster and a remote snapshot into one
//!   display-ready list.
//!
//! # Invariants
//! - Reconciliation is pure: it reads its inputs and never mutates state.
//! - Local presence always wins over remote data for the same key.
//! - Output is present-first, roster order within each group.

pub mod presence_view;

pub use presence_view::{
    build_presence_view, filter_presence_view, PresenceSource, PresenceSummary, PresenceView,
};
