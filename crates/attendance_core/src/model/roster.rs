//! Ordered roster of known people.
//!
//! # Responsibility
//! - Keep people unique by identity key.
//! - Keep people ordered by surname under collation, at all times.
//!
//! # Invariants
//! - No two entries share an identity key.
//! - `people` is always sorted by `compare_by_surname`; every mutation
//!   inserts at the sorted position instead of re-sorting afterwards.

use crate::model::identity::{compare_by_surname, identity_key, IdentityKey};
use crate::model::person::{Person, ValidationError};
use std::cmp::Ordering;

/// Default employees loaded when no roster has been saved yet.
pub const DEFAULT_ROSTER: &[&str] = &[
    "Lotte van den Berg",
    "Thomas Bakker",
    "Sanne Bakker",
    "Luuk Beekman",
    "Milan Bijl",
    "Eva Blom",
    "Daan Boer",
    "Julia Bos",
    "Liam Bosman",
    "Emma Bouwman",
    "James Brouwer",
    "Tess de Bruin",
    "Finn de Bruijn",
    "Sara Claassen",
    "Noah Dekker",
    "Zoë Dijkman",
    "Lucas van Dijk",
    "Mila Driessen",
    "Sem Evers",
    "Olivia Gerritsen",
    "Levi Groen",
    "Yara de Groot",
    "Bram de Haan",
    "Sophie Hendriks",
    "Mason Hermans",
    "Nora Hoekstra",
    "Mees Hofman",
    "Saar Huisman",
    "Max Jacobs",
    "Lieke Janssen",
    "Mats Jansen",
    "Noor de Jong",
    "Jens Klein",
    "Anna Kok",
    "Adam Koopman",
    "Fenno Koster",
    "Evi Kramer",
    "Sam Kuipers",
    "Lina van Leeuwen",
    "Guus van der Linden",
    "Elias Meijer",
    "Isa Mulder",
    "Julian Peters",
    "Roos Prins",
    "Thijs Sanders",
    "Fleur Schouten",
    "Jesse Smit",
    "Lisa Timmermans",
    "Vince Visser",
    "Maud Vos",
    "Floris de Vries",
    "Gijs van der Wal",
    "Bo Willems",
    "Stijn Wolters",
    "Juna Zwart",
];

/// Ordered, key-unique collection of people.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default roster.
    pub fn default_roster() -> Self {
        Self::from_names(DEFAULT_ROSTER.iter().copied()).0
    }

    /// Builds a roster from stored names.
    ///
    /// Entries failing validation and later duplicates are dropped; their
    /// raw values are returned alongside so the caller can report them.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> (Self, Vec<String>) {
        let mut roster = Self::new();
        let mut rejected = Vec::new();
        for name in names {
            match Person::from_stored(name) {
                Some(person) if !roster.contains(person.display_name()) => {
                    roster.insert_sorted(person);
                }
                _ => rejected.push(name.to_string()),
            }
        }
        (roster, rejected)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    /// Display names in roster order.
    pub fn display_names(&self) -> Vec<String> {
        self.people
            .iter()
            .map(|person| person.display_name().to_string())
            .collect()
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.position_of(&identity_key(display_name)).is_some()
    }

    pub fn get(&self, display_name: &str) -> Option<&Person> {
        self.position_of(&identity_key(display_name))
            .map(|index| &self.people[index])
    }

    /// Inserts a validated person at its sorted position.
    ///
    /// # Errors
    /// - `DuplicateEntry` when the identity key already exists.
    pub fn insert(&mut self, person: Person) -> Result<&Person, ValidationError> {
        if self.contains(person.display_name()) {
            return Err(ValidationError::DuplicateEntry(
                person.display_name().to_string(),
            ));
        }
        let index = self.insert_sorted(person);
        Ok(&self.people[index])
    }

    /// Removes by identity key. Returns the removed person, `None` if absent.
    pub fn remove(&mut self, display_name: &str) -> Option<Person> {
        let index = self.position_of(&identity_key(display_name))?;
        Some(self.people.remove(index))
    }

    /// Case-insensitive substring filter, keeping roster order.
    pub fn search(&self, query: &str) -> Vec<&Person> {
        let needle = query.trim().to_lowercase();
        self.people
            .iter()
            .filter(|person| person.display_name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Returns whether the current order matches the surname rule.
    pub fn is_sorted(&self) -> bool {
        self.people.windows(2).all(|pair| {
            compare_by_surname(pair[0].display_name(), pair[1].display_name())
                != Ordering::Greater
        })
    }

    fn insert_sorted(&mut self, person: Person) -> usize {
        let index = self.people.partition_point(|existing| {
            compare_by_surname(existing.display_name(), person.display_name()) != Ordering::Greater
        });
        self.people.insert(index, person);
        index
    }

    fn position_of(&self, key: &IdentityKey) -> Option<usize> {
        self.people.iter().position(|person| &person.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Roster, DEFAULT_ROSTER};
    use crate::model::person::{Person, ValidationError};

    #[test]
    fn default_roster_is_sorted_and_complete() {
        let roster = Roster::default_roster();
        assert_eq!(roster.len(), DEFAULT_ROSTER.len());
        assert!(roster.is_sorted());
        assert_eq!(roster.people()[0].display_name(), "Sanne Bakker");
        assert_eq!(
            roster.people().last().map(|p| p.display_name()),
            Some("Juna Zwart")
        );
    }

    #[test]
    fn insert_keeps_surname_order_and_rejects_duplicates() {
        let (mut roster, _) = Roster::from_names(["Bram Jansen", "Eva Blom"]);
        let inserted = roster
            .insert(Person::parse("anna de vries").expect("valid"))
            .expect("insert");
        assert_eq!(inserted.display_name(), "Anna De Vries");
        assert_eq!(
            roster.display_names(),
            vec!["Eva Blom", "Bram Jansen", "Anna De Vries"]
        );

        let err = roster
            .insert(Person::parse("EVA BLOM").expect("valid"))
            .expect_err("duplicate");
        assert!(matches!(err, ValidationError::DuplicateEntry(_)));
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn surnames_outside_ascii_sort_among_their_base_letters() {
        let (roster, _) =
            Roster::from_names(["Juna Zwart", "Olaf Øvergaard", "Eva Blom", "Anna Ærts"]);
        assert_eq!(
            roster.display_names(),
            vec!["Anna Ærts", "Eva Blom", "Olaf Øvergaard", "Juna Zwart"]
        );
        assert!(roster.is_sorted());
    }

    #[test]
    fn from_names_drops_duplicates_and_invalid_entries() {
        let (roster, rejected) = Roster::from_names(["Eva Blom", "eva blom", "Solo"]);
        assert_eq!(roster.display_names(), vec!["Eva Blom"]);
        assert_eq!(rejected, vec!["eva blom".to_string(), "Solo".to_string()]);
    }

    #[test]
    fn stored_spacing_variants_are_one_person() {
        let (mut roster, rejected) = Roster::from_names(["Anna  de Vries", "anna de vries"]);
        assert_eq!(roster.display_names(), vec!["Anna de Vries"]);
        assert_eq!(rejected, vec!["anna de vries".to_string()]);

        let err = roster
            .insert(Person::parse("Anna de Vries").expect("valid"))
            .expect_err("same person");
        assert!(matches!(err, ValidationError::DuplicateEntry(_)));
    }

    #[test]
    fn remove_is_by_key_and_idempotent() {
        let (mut roster, _) = Roster::from_names(["Eva Blom", "Bram Jansen"]);
        assert!(roster.remove("  EVA blom").is_some());
        assert!(roster.remove("Eva Blom").is_none());
        assert_eq!(roster.display_names(), vec!["Bram Jansen"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let roster = Roster::default_roster();
        let hits = roster.search("BAKK");
        let names: Vec<_> = hits.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Sanne Bakker", "Thomas Bakker"]);
        assert_eq!(roster.search("").len(), roster.len());
    }
}
