//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `attendance_core` linkage.
//! - Print the stored roster or the reconciled presence view on request.
//!
//! Usage: `attendance_cli [roster|presence]`

use attendance_core::db::open_db;
use attendance_core::{
    AttendanceConfig, AttendanceService, PresenceSummary, RosterService, SqliteRosterRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("attendance_core ping={}", attendance_core::ping());
    println!("attendance_core version={}", attendance_core::core_version());

    let command = std::env::args().nth(1);
    let result = match command.as_deref() {
        None => Ok(()),
        Some("roster") => print_roster(),
        Some("presence") => print_presence(),
        Some(other) => Err(format!("unknown command `{other}`; expected roster|presence")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_service() -> Result<AttendanceService<SqliteRosterRepository>, String> {
    let config = AttendanceConfig::from_env().map_err(|err| err.to_string())?;
    println!(
        "store={} mode={}",
        config.db_path.display(),
        if config.is_offline() { "offline" } else { "webhook" }
    );
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let repo = SqliteRosterRepository::try_new(conn).map_err(|err| err.to_string())?;
    let roster = RosterService::load(repo).map_err(|err| err.to_string())?;
    AttendanceService::new(roster, config.remote_sync()).map_err(|err| err.to_string())
}

fn print_roster() -> Result<(), String> {
    let service = load_service()?;
    for name in service.roster().display_names() {
        println!("{name}");
    }
    Ok(())
}

fn print_presence() -> Result<(), String> {
    let service = load_service()?;
    let views = service.presence_view();
    for view in &views {
        let marker = if view.is_present { "x" } else { " " };
        let since = view
            .since
            .as_deref()
            .and_then(attendance_core::time_fmt::clock_label)
            .unwrap_or_default();
        println!("[{marker}] {:<32} {since}", view.display_name);
    }
    let summary = PresenceSummary::from_views(&views);
    println!("{} of {} present", summary.present, summary.total);
    Ok(())
}
