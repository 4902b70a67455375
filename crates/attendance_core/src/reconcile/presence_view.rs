//! Presence view construction.

use crate::model::identity::{identity_key, IdentityKey};
use crate::model::presence::PresenceMap;
use crate::model::roster::Roster;
use crate::sync::RemoteAttendee;
use crate::time_fmt::format_instant;
use std::collections::HashMap;

/// Where a present person's `since` value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSource {
    Local,
    Remote,
}

/// One display row of the presence screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceView {
    pub display_name: String,
    pub is_present: bool,
    /// RFC 3339 instant; set only when present.
    pub since: Option<String>,
    pub source: Option<PresenceSource>,
}

/// Counts shown in the presence screen header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSummary {
    pub present: usize,
    pub total: usize,
}

impl PresenceSummary {
    pub fn from_views(views: &[PresenceView]) -> Self {
        Self {
            present: views.iter().filter(|view| view.is_present).count(),
            total: views.len(),
        }
    }
}

/// Merges roster, local presence and a remote snapshot.
///
/// 1. Seed the merge map with local entries; remote entries only fill keys
///    that are still missing.
/// 2. Map every roster person to a row.
/// 3. Stable-sort present rows before absent rows.
pub fn build_presence_view(
    roster: &Roster,
    presence: &PresenceMap,
    remote_snapshot: &[RemoteAttendee],
) -> Vec<PresenceView> {
    let mut merged: HashMap<IdentityKey, (String, PresenceSource)> = HashMap::new();
    for entry in presence.entries() {
        merged.insert(
            entry.key.clone(),
            (format_instant(entry.since), PresenceSource::Local),
        );
    }
    for attendee in remote_snapshot {
        let key = identity_key(&attendee.display_name);
        if key.is_empty() {
            continue;
        }
        merged
            .entry(key)
            .or_insert_with(|| (attendee.since.clone(), PresenceSource::Remote));
    }

    let mut views: Vec<PresenceView> = roster
        .iter()
        .map(|person| match merged.get(&person.key()) {
            Some((since, source)) => PresenceView {
                display_name: person.display_name().to_string(),
                is_present: true,
                since: Some(since.clone()),
                source: Some(*source),
            },
            None => PresenceView {
                display_name: person.display_name().to_string(),
                is_present: false,
                since: None,
                source: None,
            },
        })
        .collect();

    // `sort_by_key` is stable, so roster order survives inside each group.
    views.sort_by_key(|view| !view.is_present);
    views
}

/// Case-insensitive substring filter over a built view.
pub fn filter_presence_view<'a>(views: &'a [PresenceView], query: &str) -> Vec<&'a PresenceView> {
    let needle = query.trim().to_lowercase();
    views
        .iter()
        .filter(|view| view.display_name.to_lowercase().contains(&needle))
        .collect()
}
