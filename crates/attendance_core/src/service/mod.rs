//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model, repository and sync calls into kiosk use-cases.
//! - Keep FFI/CLI layers decoupled from storage and transport details.

pub mod attendance_service;
pub mod roster_service;
