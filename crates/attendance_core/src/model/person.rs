//! Roster entry model and add-time validation.
//!
//! # Responsibility
//! - Define the `Person` record stored in the roster.
//! - Validate raw admin input before it can reach the roster.
//!
//! # Invariants
//! - A validated `Person` has at least two name tokens.
//! - Validated display names are title-cased per token.

use crate::model::identity::{identity_key, name_tokens, title_case, IdentityKey};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for roster additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input was empty after trimming.
    EmptyName,
    /// Input has fewer than two whitespace-separated tokens.
    MissingSurname(String),
    /// A person with the same identity key already exists.
    DuplicateEntry(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::MissingSurname(value) => {
                write!(f, "name `{value}` needs both a first and a last name")
            }
            Self::DuplicateEntry(value) => write!(f, "`{value}` is already on the roster"),
        }
    }
}

impl Error for ValidationError {}

/// One known person eligible to check in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    display_name: String,
}

impl Person {
    /// Validates and formats raw admin input.
    ///
    /// Duplicate detection needs the roster and happens in `Roster::insert`.
    pub fn parse(raw_name: &str) -> Result<Self, ValidationError> {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if name_tokens(trimmed).len() < 2 {
            return Err(ValidationError::MissingSurname(trimmed.to_string()));
        }
        Ok(Self {
            display_name: title_case(trimmed),
        })
    }

    /// Rebuilds a person from persisted roster data, keeping its stored casing.
    ///
    /// Inner whitespace runs collapse to single spaces, matching the form
    /// `parse` produces. Returns `None` for entries that would fail add-time
    /// validation.
    pub fn from_stored(display_name: &str) -> Option<Self> {
        let tokens = name_tokens(display_name);
        if tokens.len() < 2 {
            return None;
        }
        Some(Self {
            display_name: tokens.join(" "),
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn key(&self) -> IdentityKey {
        identity_key(&self.display_name)
    }

    /// First token, used for greetings.
    pub fn first_name(&self) -> &str {
        name_tokens(&self.display_name)
            .first()
            .copied()
            .unwrap_or_default()
    }
}
