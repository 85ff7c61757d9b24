//! CLI entry point for inspecting a reminder store.
//!
//! # Responsibility
//! - Verify `remindkit_core` linkage (no arguments).
//! - Print the trigger plan of every stored reminder (`plan [db]`).
//! - Run one reconciliation pass against an in-memory scheduler (`dry-run [db]`).
//!
//! Without a `db` argument the store path comes from `REMINDKIT_DB_PATH`.

use remindkit_core::db::{default_db_path, open_db};
use remindkit_core::{
    plan, EngineConfig, InMemoryNotifier, Plan, Reconciler, Reminder, ReminderService,
    SqliteReminderRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: remindkit_cli [plan|dry-run] [db_path]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = || {
        args.get(1)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path)
    };

    let result = match args.first().map(String::as_str) {
        None => {
            println!("remindkit_core ping={}", remindkit_core::ping());
            println!("remindkit_core version={}", remindkit_core::core_version());
            Ok(())
        }
        Some("plan") => load_reminders(db_path()).map(|reminders| print_plans(&reminders)),
        Some("dry-run") => dry_run(db_path()).await,
        Some(_) => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_reminders(path: PathBuf) -> Result<Vec<Reminder>, String> {
    let conn = open_db(&path)
        .map_err(|err| format!("cannot open reminder store `{}`: {err}", path.display()))?;
    ReminderService::new(SqliteReminderRepository::new(&conn))
        .list_reminders()
        .map_err(|err| err.to_string())
}

fn print_plans(reminders: &[Reminder]) {
    for reminder in reminders {
        match plan(reminder) {
            Ok(Plan::Ongoing) => println!("{} ongoing", reminder.id),
            Ok(Plan::Triggers(triggers)) => {
                for trigger in &triggers {
                    println!(
                        "{} trigger={} fire_at_ms={} repeat={:?}",
                        reminder.id, trigger.id, trigger.fire_at_ms, trigger.repeat
                    );
                }
            }
            Err(err) => println!("{} invalid: {err}", reminder.id),
        }
    }
}

async fn dry_run(path: PathBuf) -> Result<(), String> {
    let reminders = load_reminders(path)?;
    let config = EngineConfig::from_env().map_err(|err| err.to_string())?;
    let reconciler = Reconciler::with_config(InMemoryNotifier::new(), config);

    let report = reconciler
        .reconcile(&reminders)
        .await
        .map_err(|err| err.to_string())?;

    println!("{report:?}");
    for trigger_id in reconciler.notifier().trigger_ids() {
        println!("trigger={trigger_id}");
    }
    Ok(())
}
