//! FFI use-case API for the Flutter kiosk screens.
//!
//! # Responsibility
//! - Expose welcome, presence and admin use-cases to Dart via FRB.
//! - Own the one process-wide `AttendanceService` behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call serializes on the engine mutex, so roster, presence and
//!   ledger mutations never interleave.
//! - The engine mutex is never held across network I/O; the remote
//!   snapshot is fetched with the lock released.
//! - A remote sync failure is never reported to the submitter; it shows up
//!   only in `audit_log`.

use attendance_core::db::open_db;
use attendance_core::time_fmt::{clock_label, format_instant};
use attendance_core::{
    core_version as core_version_inner, filter_presence_view, init_logging as init_logging_inner,
    ping as ping_inner, AttendanceConfig, AttendanceService, PresenceSource,
    PresenceSummary, RosterService, RosterServiceError, SqliteRosterRepository, SyncOutcome,
    ValidationError, WorkflowError,
};
use log::error;
use std::sync::{Mutex, MutexGuard};

type Engine = AttendanceService<SqliteRosterRepository>;

static ENGINE: Mutex<Option<Engine>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Response for check-in/out and roster mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the local state change was applied.
    pub ok: bool,
    /// Stable machine code on failure (`already_present`, `not_present`,
    /// `empty_name`, `missing_surname`, `duplicate_entry`, `storage`,
    /// `engine_unavailable`).
    pub error_code: Option<String>,
    /// Display name as stored/submitted on success.
    pub display_name: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(display_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            display_name: Some(display_name.into()),
            message: message.into(),
        }
    }

    fn failure(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(error_code.to_string()),
            display_name: None,
            message: message.into(),
        }
    }
}

/// One row of the presence screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceItem {
    pub display_name: String,
    pub is_present: bool,
    /// RFC 3339 instant when present.
    pub since: Option<String>,
    /// `HH:MM` label when `since` is parseable.
    pub since_label: Option<String>,
    /// `local` or `remote` when present.
    pub source: Option<String>,
}

/// Presence screen payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceListResponse {
    pub items: Vec<PresenceItem>,
    /// Present count over the unfiltered view.
    pub present_count: u32,
    /// Roster size.
    pub total: u32,
    pub message: String,
}

/// One row of the admin audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditItem {
    pub entry_id: String,
    pub display_name: String,
    /// RFC 3339 instant of the local action.
    pub at: String,
    /// `check_in` or `check_out`.
    pub action: String,
    /// `ok` or `failed`.
    pub outcome: String,
    pub settled: bool,
}

/// Roster in display order, optionally filtered by substring.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_list(query: Option<String>) -> Vec<String> {
    with_engine(|engine| match query.as_deref() {
        Some(query) => engine
            .search_roster(query)
            .iter()
            .map(|person| person.display_name().to_string())
            .collect(),
        None => engine.roster().display_names(),
    })
    .unwrap_or_default()
}

/// Adds one person to the roster (admin).
#[flutter_rust_bridge::frb(sync)]
pub fn roster_add(name: String) -> ActionResponse {
    with_engine(|engine| match engine.add_person(&name) {
        Ok(person) => ActionResponse::success(person.display_name(), "Person added."),
        Err(err) => roster_failure(&err),
    })
    .unwrap_or_else(engine_unavailable)
}

/// Removes one person from the roster and from presence (admin).
///
/// Removing an unknown name succeeds with `display_name = None`.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_remove(name: String) -> ActionResponse {
    with_engine(|engine| match engine.remove_person(&name) {
        Ok(Some(person)) => ActionResponse::success(person.display_name(), "Person removed."),
        Ok(None) => ActionResponse {
            ok: true,
            error_code: None,
            display_name: None,
            message: "Person was not on the roster.".to_string(),
        },
        Err(err) => roster_failure(&err),
    })
    .unwrap_or_else(engine_unavailable)
}

/// Checks a person in.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_check_in(name: String) -> ActionResponse {
    with_engine(|engine| match engine.check_in(&name) {
        Ok(receipt) => ActionResponse::success(receipt.display_name, "Checked in."),
        Err(err) => workflow_failure(&err),
    })
    .unwrap_or_else(engine_unavailable)
}

/// Checks a person out.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_check_out(name: String) -> ActionResponse {
    with_engine(|engine| match engine.check_out(&name) {
        Ok(receipt) => ActionResponse::success(receipt.display_name, "Checked out."),
        Err(err) => workflow_failure(&err),
    })
    .unwrap_or_else(engine_unavailable)
}

/// Whether the name currently has a local presence entry.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_is_present(name: String) -> bool {
    with_engine(|engine| engine.is_present(&name)).unwrap_or(false)
}

/// Builds the presence screen, fetching today's remote snapshot.
///
/// Not `sync`: the remote fetch may block on the network. Check-in/out
/// calls made meanwhile are not held up by it.
pub fn presence_list(query: Option<String>) -> PresenceListResponse {
    presence_list_in(&ENGINE, build_engine, query.as_deref())
}

fn presence_list_in(
    slot: &Mutex<Option<Engine>>,
    build: EngineBuilder,
    query: Option<&str>,
) -> PresenceListResponse {
    let remote = match with_engine_in(slot, build, |engine| engine.remote_sync()) {
        Ok(remote) => remote,
        Err(message) => return presence_unavailable(message),
    };
    let snapshot = remote.fetch_today();

    let result = with_engine_in(slot, build, |engine| {
        let views = engine.presence_view_with(&snapshot);
        let summary = PresenceSummary::from_views(&views);
        let visible = match query {
            Some(query) => filter_presence_view(&views, query)
                .into_iter()
                .cloned()
                .collect(),
            None => views,
        };
        (visible, summary)
    });

    match result {
        Ok((views, summary)) => PresenceListResponse {
            items: views
                .into_iter()
                .map(|view| PresenceItem {
                    since_label: view.since.as_deref().and_then(clock_label),
                    display_name: view.display_name,
                    is_present: view.is_present,
                    since: view.since,
                    source: view.source.map(source_label),
                })
                .collect(),
            present_count: saturating_u32(summary.present),
            total: saturating_u32(summary.total),
            message: format!("{} of {} present.", summary.present, summary.total),
        },
        Err(message) => presence_unavailable(message),
    }
}

fn presence_unavailable(message: String) -> PresenceListResponse {
    PresenceListResponse {
        items: Vec::new(),
        present_count: 0,
        total: 0,
        message,
    }
}

/// Audit log for the admin dashboard, most recent first.
#[flutter_rust_bridge::frb(sync)]
pub fn audit_log() -> Vec<AuditItem> {
    with_engine(|engine| {
        engine.settle_remote_outcomes();
        engine
            .audit_log()
            .into_iter()
            .map(|record| AuditItem {
                entry_id: record.entry.id().to_string(),
                display_name: record.entry.display_name().to_string(),
                at: format_instant(record.entry.at()),
                action: record.entry.action().as_str().to_string(),
                outcome: outcome_label(record.outcome).to_string(),
                settled: record.settled,
            })
            .collect()
    })
    .unwrap_or_default()
}

type EngineBuilder = fn() -> Result<Engine, String>;

fn with_engine<T>(f: impl FnOnce(&mut Engine) -> T) -> Result<T, String> {
    with_engine_in(&ENGINE, build_engine, f)
}

fn with_engine_in<T>(
    slot: &Mutex<Option<Engine>>,
    build: EngineBuilder,
    f: impl FnOnce(&mut Engine) -> T,
) -> Result<T, String> {
    let mut guard = lock_engine(slot);
    if guard.is_none() {
        *guard = Some(build()?);
    }
    match guard.as_mut() {
        Some(engine) => Ok(f(engine)),
        None => Err("attendance engine unavailable".to_string()),
    }
}

fn lock_engine(slot: &Mutex<Option<Engine>>) -> MutexGuard<'_, Option<Engine>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn build_engine() -> Result<Engine, String> {
    let config = AttendanceConfig::from_env().map_err(|err| {
        error!("event=engine_init module=ffi status=error error_code=config error={err}");
        format!("attendance config invalid: {err}")
    })?;
    let conn = open_db(&config.db_path).map_err(|err| format!("store open failed: {err}"))?;
    let repo = SqliteRosterRepository::try_new(conn)
        .map_err(|err| format!("roster repo init failed: {err}"))?;
    let roster = RosterService::load(repo).map_err(|err| format!("roster load failed: {err}"))?;
    AttendanceService::new(roster, config.remote_sync())
        .map_err(|err| format!("sync worker start failed: {err}"))
}

fn engine_unavailable(message: String) -> ActionResponse {
    ActionResponse::failure("engine_unavailable", message)
}

fn roster_failure(err: &RosterServiceError) -> ActionResponse {
    let code = match err {
        RosterServiceError::Validation(ValidationError::EmptyName) => "empty_name",
        RosterServiceError::Validation(ValidationError::MissingSurname(_)) => "missing_surname",
        RosterServiceError::Validation(ValidationError::DuplicateEntry(_)) => "duplicate_entry",
        RosterServiceError::Repo(_) => "storage",
    };
    ActionResponse::failure(code, err.to_string())
}

fn workflow_failure(err: &WorkflowError) -> ActionResponse {
    let code = match err {
        WorkflowError::EmptyName => "empty_name",
        WorkflowError::AlreadyPresent(_) => "already_present",
        WorkflowError::NotPresent(_) => "not_present",
    };
    ActionResponse::failure(code, err.to_string())
}

fn outcome_label(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Ok => "ok",
        SyncOutcome::Failed => "failed",
    }
}

fn source_label(source: PresenceSource) -> String {
    match source {
        PresenceSource::Local => "local".to_string(),
        PresenceSource::Remote => "remote".to_string(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        attendance_check_in, attendance_check_out, attendance_is_present, audit_log,
        core_version, init_logging, ping, presence_list, presence_list_in, roster_add,
        roster_list, roster_remove, with_engine_in, Engine,
    };
    use attendance_core::db::open_db_in_memory;
    use attendance_core::{
        AttendanceService, RosterService, SqliteRosterRepository, WebhookRemoteSync,
    };
    use once_cell::sync::Lazy;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    // The global engine reads its config from the environment on first use.
    static TEST_STORE: Lazy<TempDir> = Lazy::new(|| {
        let dir = tempfile::tempdir().expect("temp store dir");
        std::env::set_var("ATTENDANCE_DB_PATH", dir.path().join("attendance.sqlite3"));
        std::env::remove_var("ATTENDANCE_WEBHOOK_URL");
        std::env::remove_var("ATTENDANCE_HTTP_TIMEOUT_MS");
        dir
    });

    fn isolated_store() {
        Lazy::force(&TEST_STORE);
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir_and_unknown_level() {
        assert!(!init_logging("info".to_string(), "tmp/logs".to_string()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn check_in_out_cycle_reports_codes() {
        isolated_store();
        let name = unique_name("Cycle");
        let first = attendance_check_in(name.clone());
        assert!(first.ok, "{}", first.message);
        assert!(attendance_is_present(name.to_lowercase()));

        let again = attendance_check_in(name.clone());
        assert!(!again.ok);
        assert_eq!(again.error_code.as_deref(), Some("already_present"));

        let out = attendance_check_out(name.clone());
        assert!(out.ok, "{}", out.message);
        let out_again = attendance_check_out(name.clone());
        assert_eq!(out_again.error_code.as_deref(), Some("not_present"));

        let audit = audit_log();
        let mine: Vec<_> = audit.iter().filter(|item| item.display_name == name).collect();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].action, "check_out");
        assert_eq!(mine[1].action, "check_in");
    }

    #[test]
    fn roster_add_lists_presents_and_removes() {
        isolated_store();
        let name = unique_name("Roster");
        let added = roster_add(name.to_lowercase());
        assert!(added.ok, "{}", added.message);
        let stored = added.display_name.expect("stored display name");
        assert!(roster_list(None).contains(&stored));

        let duplicate = roster_add(name.to_uppercase());
        assert_eq!(duplicate.error_code.as_deref(), Some("duplicate_entry"));
        assert_eq!(
            roster_add("Solo".to_string()).error_code.as_deref(),
            Some("missing_surname")
        );

        assert!(attendance_check_in(stored.clone()).ok);
        let view = presence_list(Some(stored.clone()));
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].is_present);
        assert_eq!(view.items[0].source.as_deref(), Some("local"));
        assert!(view.present_count >= 1);

        let removed = roster_remove(stored.clone());
        assert!(removed.ok);
        assert!(!attendance_is_present(stored.clone()));
        let removed_again = roster_remove(stored.clone());
        assert!(removed_again.ok);
        assert!(removed_again.display_name.is_none());
    }

    #[test]
    fn check_in_is_not_blocked_by_a_slow_presence_fetch() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let url = format!("http://{}/hook", listener.local_addr().expect("local addr"));
        // Accepts connections and never answers.
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });

        let slot = Arc::new(Mutex::new(Some(silent_webhook_engine(&url))));
        let fetching = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || presence_list_in(&slot, no_engine, None))
        };
        thread::sleep(Duration::from_millis(300));

        let started = Instant::now();
        let checked_in = with_engine_in(&slot, no_engine, |engine| {
            engine.check_in("Eva Blom").is_ok()
        })
        .expect("engine present");
        let waited = started.elapsed();
        assert!(checked_in);
        assert!(
            waited < Duration::from_millis(1_000),
            "check-in waited {waited:?} behind the presence fetch"
        );

        let view = fetching.join().expect("presence thread");
        assert!(view
            .items
            .iter()
            .any(|item| item.display_name == "Eva Blom" && item.is_present));
    }

    #[test]
    fn presence_list_reports_missing_engine() {
        let slot = Mutex::new(None);
        let view = presence_list_in(&slot, no_engine, None);
        assert!(view.items.is_empty());
        assert_eq!(view.total, 0);
        assert_eq!(view.message, "no engine configured");
    }

    fn silent_webhook_engine(url: &str) -> Engine {
        let repo = SqliteRosterRepository::try_new(open_db_in_memory().expect("open db"))
            .expect("roster repo");
        let roster = RosterService::load(repo).expect("load roster");
        AttendanceService::new(roster, Arc::new(WebhookRemoteSync::new(url, 2_000)))
            .expect("attendance service")
    }

    fn no_engine() -> Result<Engine, String> {
        Err("no engine configured".to_string())
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix} Tester{nanos}")
    }
}
