//! Identity key derivation and display-name normalization.
//!
//! # Responsibility
//! - Derive the one join key shared by roster, presence, ledger and remote data.
//! - Provide title-casing and surname extraction for roster entries.
//! - Provide Unicode Collation Algorithm ordering for surnames.
//!
//! # Invariants
//! - `identity_key` is the only place a key is derived from a display name.
//! - Two display names denote the same person iff their keys are equal.
//!
//! # See also
//! - model::roster

use feruca::Collator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

thread_local! {
    // CLDR root tailoring; the collator keeps per-instance caches.
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Normalized (trimmed, lowercased) form of a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the identity key for a display name.
///
/// Inner whitespace is left as-is; only the outer edges are trimmed.
pub fn identity_key(display_name: &str) -> IdentityKey {
    IdentityKey(display_name.trim().to_lowercase())
}

/// Splits a display name into whitespace-separated tokens.
pub fn name_tokens(display_name: &str) -> Vec<&str> {
    WHITESPACE_RE
        .split(display_name.trim())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Title-cases every token (first letter upper, rest lower) and joins with
/// single spaces.
pub fn title_case(display_name: &str) -> String {
    name_tokens(display_name)
        .into_iter()
        .map(title_case_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_token(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the last whitespace-separated token, used as the sort surname.
pub fn surname_token(display_name: &str) -> &str {
    name_tokens(display_name).last().copied().unwrap_or("")
}

/// Compares two strings under the Unicode Collation Algorithm, falling back
/// to the raw value so the ordering stays total.
///
/// `Ærts` sorts with `Aerts` and `Øvergaard` next to `Overgaard`, rather
/// than after `z`.
pub fn collate(left: &str, right: &str) -> Ordering {
    COLLATOR
        .with(|collator| collator.borrow_mut().collate(left, right))
        .then_with(|| left.cmp(right))
}

/// Roster ordering: surname first, then the full display name.
pub fn compare_by_surname(left: &str, right: &str) -> Ordering {
    collate(surname_token(left), surname_token(right)).then_with(|| collate(left, right))
}
