//! Repository contracts and SQLite persistence.
//!
//! # Responsibility
//! - Define the roster persistence contract used by services.
//! - Keep SQL and slot encoding inside the persistence boundary.
//!
//! # Invariants
//! - Repositories return semantic errors (`InvalidData`) separately from
//!   transport errors (`Db`), so callers can choose a fallback.

pub mod roster_repo;
