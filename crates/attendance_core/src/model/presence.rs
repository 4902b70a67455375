//! Session-scoped presence store.
//!
//! # Responsibility
//! - Hold who is checked in on this device, keyed by identity key.
//!
//! # Invariants
//! - At most one entry per identity key.
//! - Every public operation normalizes its name argument; callers never pass
//!   pre-derived keys.

use crate::model::identity::{identity_key, IdentityKey};
use std::collections::HashMap;
use time::OffsetDateTime;

/// One checked-in person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub key: IdentityKey,
    /// Name as submitted at check-in, trimmed.
    pub display_name: String,
    pub since: OffsetDateTime,
}

/// Authoritative local presence map.
#[derive(Debug, Clone, Default)]
pub struct PresenceMap {
    entries: HashMap<IdentityKey, PresenceEntry>,
}

impl PresenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.entries.contains_key(&identity_key(display_name))
    }

    pub fn get(&self, display_name: &str) -> Option<&PresenceEntry> {
        self.entries.get(&identity_key(display_name))
    }

    pub(crate) fn get_by_key(&self, key: &IdentityKey) -> Option<&PresenceEntry> {
        self.entries.get(key)
    }

    /// Inserts an entry unless the key is already present.
    ///
    /// Returns the existing entry untouched on conflict.
    pub fn set(
        &mut self,
        display_name: &str,
        since: OffsetDateTime,
    ) -> Result<&PresenceEntry, &PresenceEntry> {
        let key = identity_key(display_name);
        if self.entries.contains_key(&key) {
            return Err(&self.entries[&key]);
        }
        let entry = PresenceEntry {
            key: key.clone(),
            display_name: display_name.trim().to_string(),
            since,
        };
        Ok(self.entries.entry(key).or_insert(entry))
    }

    pub fn remove(&mut self, display_name: &str) -> Option<PresenceEntry> {
        self.entries.remove(&identity_key(display_name))
    }

    /// Entries ordered by check-in instant, oldest first.
    pub fn entries(&self) -> Vec<&PresenceEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|left, right| {
            left.since
                .cmp(&right.since)
                .then_with(|| left.key.cmp(&right.key))
        });
        entries
    }
}
