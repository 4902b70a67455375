//! Roster use-case service.
//!
//! # Responsibility
//! - Load the roster once from its repository, falling back to defaults.
//! - Validate additions, apply removals and persist after every change.
//!
//! # Invariants
//! - In-memory roster changes only after the repository write succeeded, so
//!   memory and storage never diverge on a failed save.
//! - Loading never writes.

use crate::model::person::{Person, ValidationError};
use crate::model::roster::Roster;
use crate::repo::roster_repo::{RepoError, RepoResult, RosterRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for roster mutations.
#[derive(Debug)]
pub enum RosterServiceError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "failed to save roster: {err}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RosterServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Where the startup roster came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSource {
    Stored,
    /// No roster had been saved yet.
    DefaultMissing,
    /// A saved roster existed but could not be parsed.
    DefaultCorrupt,
}

/// Roster store backed by a repository.
pub struct RosterService<R: RosterRepository> {
    repo: R,
    roster: Roster,
    source: RosterSource,
}

impl<R: RosterRepository> RosterService<R> {
    /// Loads the roster once.
    ///
    /// # Errors
    /// - Storage transport failures. Corrupt slot content is not an error; it
    ///   falls back to the default roster.
    pub fn load(repo: R) -> RepoResult<Self> {
        let (roster, source) = match repo.load_roster() {
            Ok(Some(names)) => {
                let (roster, dropped) = Roster::from_names(names.iter().map(String::as_str));
                if !dropped.is_empty() {
                    warn!(
                        "event=roster_load module=roster status=partial dropped={} kept={}",
                        dropped.len(),
                        roster.len()
                    );
                }
                (roster, RosterSource::Stored)
            }
            Ok(None) => (Roster::default_roster(), RosterSource::DefaultMissing),
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=roster_load module=roster status=fallback error_code=invalid_slot error={}",
                    message
                );
                (Roster::default_roster(), RosterSource::DefaultCorrupt)
            }
            Err(err) => return Err(err),
        };

        info!(
            "event=roster_load module=roster status=ok source={:?} size={}",
            source,
            roster.len()
        );
        Ok(Self {
            repo,
            roster,
            source,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn source(&self) -> RosterSource {
        self.source
    }

    /// Validates, title-cases and inserts one person, then persists.
    ///
    /// # Errors
    /// - `MissingSurname`/`EmptyName` for malformed input.
    /// - `DuplicateEntry` when the identity key is already on the roster.
    /// - `Repo` when the save fails; the roster is left unchanged.
    pub fn add(&mut self, raw_name: &str) -> Result<Person, RosterServiceError> {
        let person = Person::parse(raw_name)?;
        let mut next = self.roster.clone();
        let created = next.insert(person)?.clone();
        self.commit(next)?;

        info!(
            "event=roster_add module=roster status=ok size={}",
            self.roster.len()
        );
        Ok(created)
    }

    /// Removes one person by identity key, then persists.
    ///
    /// Removing an absent name is a no-op that returns `Ok(None)` and skips
    /// the write.
    pub fn remove(&mut self, display_name: &str) -> Result<Option<Person>, RosterServiceError> {
        let mut next = self.roster.clone();
        let Some(removed) = next.remove(display_name) else {
            return Ok(None);
        };
        self.commit(next)?;

        info!(
            "event=roster_remove module=roster status=ok size={}",
            self.roster.len()
        );
        Ok(Some(removed))
    }

    /// Case-insensitive substring search in roster order.
    pub fn search(&self, query: &str) -> Vec<&Person> {
        self.roster.search(query)
    }

    fn commit(&mut self, next: Roster) -> Result<(), RosterServiceError> {
        if let Err(err) = self.repo.save_roster(&next.display_names()) {
            warn!(
                "event=roster_save module=roster status=error error={}",
                err
            );
            return Err(err.into());
        }
        self.roster = next;
        self.source = RosterSource::Stored;
        Ok(())
    }
}
