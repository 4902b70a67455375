use attendance_core::db::{open_db, open_db_in_memory};
use attendance_core::repo::roster_repo::ROSTER_SLOT;
use attendance_core::{
    Roster, RosterService, RosterServiceError, RosterSource, SqliteRosterRepository,
    ValidationError, DEFAULT_ROSTER,
};

fn in_memory_service() -> RosterService<SqliteRosterRepository> {
    let repo = SqliteRosterRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    RosterService::load(repo).unwrap()
}

#[test]
fn fresh_store_loads_default_roster_sorted_by_surname() {
    let service = in_memory_service();
    assert_eq!(service.source(), RosterSource::DefaultMissing);
    assert_eq!(service.roster().len(), DEFAULT_ROSTER.len());
    assert!(service.roster().is_sorted());
}

#[test]
fn add_succeeds_once_per_identity_key() {
    let mut service = in_memory_service();
    let before = service.roster().len();

    for name in ["Anna de Vries", "Kees van Rijn", "Ümit Özdemir"] {
        service.add(name).unwrap();
        for casing in [name.to_uppercase(), name.to_lowercase(), format!("  {name}  ")] {
            let err = service.add(&casing).unwrap_err();
            assert!(
                matches!(
                    err,
                    RosterServiceError::Validation(ValidationError::DuplicateEntry(_))
                ),
                "`{casing}` should be a duplicate"
            );
        }
        assert!(service.roster().is_sorted());
    }
    assert_eq!(service.roster().len(), before + 3);
}

#[test]
fn single_token_name_is_missing_surname() {
    let mut service = in_memory_service();
    let err = service.add("Solo").unwrap_err();
    assert!(matches!(
        err,
        RosterServiceError::Validation(ValidationError::MissingSurname(_))
    ));
}

#[test]
fn added_names_are_title_cased_and_placed_by_surname() {
    let mut service = in_memory_service();
    let person = service.add("  jan   AALBERS ").unwrap();
    assert_eq!(person.display_name(), "Jan Aalbers");
    assert_eq!(service.roster().people()[0].display_name(), "Jan Aalbers");
}

#[test]
fn roster_round_trips_through_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    let saved = {
        let repo = SqliteRosterRepository::try_new(open_db(&path).unwrap()).unwrap();
        let mut service = RosterService::load(repo).unwrap();
        service.add("Anna de Vries").unwrap();
        service.remove("Eva Blom").unwrap();
        service.roster().display_names()
    };

    let repo = SqliteRosterRepository::try_new(open_db(&path).unwrap()).unwrap();
    let reloaded = RosterService::load(repo).unwrap();
    assert_eq!(reloaded.source(), RosterSource::Stored);
    assert_eq!(reloaded.roster().display_names(), saved);
    assert!(!reloaded.roster().contains("eva blom"));
}

#[test]
fn corrupt_slot_falls_back_to_default_roster() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO storage_slots (name, value) VALUES (?1, ?2);",
        [ROSTER_SLOT, "{\"oops\": true}"],
    )
    .unwrap();

    let service = RosterService::load(SqliteRosterRepository::try_new(conn).unwrap()).unwrap();
    assert_eq!(service.source(), RosterSource::DefaultCorrupt);
    assert_eq!(service.roster(), &Roster::default_roster());
}

#[test]
fn hand_edited_slot_is_deduplicated_and_resorted_on_load() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO storage_slots (name, value) VALUES (?1, ?2);",
        [
            ROSTER_SLOT,
            r#"["Bram Jansen", "Eva Blom", "EVA BLOM", "Prince"]"#,
        ],
    )
    .unwrap();

    let service = RosterService::load(SqliteRosterRepository::try_new(conn).unwrap()).unwrap();
    assert_eq!(
        service.roster().display_names(),
        vec!["Eva Blom", "Bram Jansen"]
    );
}
