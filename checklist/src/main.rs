//! `checklist` — change-request checklist on the command line.
//!
//! Each invocation restores the checklist from the configured backend,
//! runs one command, and prints the table.
//!
//! ```bash
//! # Local storage (default: <data dir>/checklist/storage.json)
//! cargo run --bin checklist -- complete
//!
//! # Against a state server
//! cargo run --bin checklist -- --server-url http://127.0.0.1:3000 status
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use checklist::config::{BackendConfig, CliArgs, ClientConfig, Command};
use checklist::confirm::{AutoConfirm, Confirm, PromptConfirm};
use checklist::lifecycle::{CompletionOutcome, LifecycleError, LifecycleManager};
use checklist::store::kv::FileStorage;
use checklist::store::local::LocalStore;
use checklist::store::remote::RemoteStore;
use checklist::store::{AnyStore, ChecklistStore};
use checklist::view;

type Manager = LifecycleManager<AnyStore, Box<dyn Confirm>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = match &config.backend {
        BackendConfig::Local { storage_file } => {
            AnyStore::Local(LocalStore::new(FileStorage::new(storage_file.clone())))
        }
        BackendConfig::Remote { server_url } => AnyStore::Remote(RemoteStore::new(server_url.clone())),
    };
    let confirm: Box<dyn Confirm> = if config.assume_yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm::terminal())
    };

    let mut manager = match LifecycleManager::new(config.tasks.clone(), store, confirm) {
        Ok(m) => m
            .with_completion_delay(config.completion_delay)
            .with_bulk_delay(config.bulk_delay),
        Err(e) => {
            eprintln!("error: invalid task catalog: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(backend = %manager.store().kind(), tasks = manager.tasks().len(), "checklist starting");
    manager.load().await;

    let command = cli.command.unwrap_or(Command::Status);
    match run(&mut manager, &command).await {
        Ok(()) => {
            if command == Command::Summary {
                println!("{}", view::render_summary(&manager.summary()));
            } else {
                print!("{}", view::render_table(manager.tasks(), manager.selection()));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one command against the manager, reporting outcomes on stderr.
async fn run(manager: &mut Manager, command: &Command) -> Result<(), LifecycleError> {
    match command {
        Command::Status | Command::Summary => {}
        Command::Complete => match manager.complete_active().await {
            Some(advance) => {
                match &advance.next {
                    Some(next) => eprintln!("Task {} complete. Task {next} is now active.", advance.completed),
                    None => eprintln!("Task {} complete. No pending tasks remain.", advance.completed),
                }
                warn_unsaved(advance.persisted);
            }
            None => eprintln!("No active task."),
        },
        Command::CompleteTask { id } => {
            let outcome = manager.complete_specific(id).await?;
            report(&outcome);
        }
        Command::CompleteSelected => {
            let outcome = manager.complete_selected().await;
            report(&outcome);
        }
        Command::Select { ids } => {
            for id in ids {
                manager.select_task(id)?;
            }
            save_selection(manager).await;
        }
        Command::Deselect { ids } => {
            for id in ids {
                manager.deselect_task(id)?;
            }
            save_selection(manager).await;
        }
        Command::Toggle { id } => {
            manager.toggle_task(id)?;
            save_selection(manager).await;
        }
        Command::SelectAll => {
            manager.select_all(true);
            save_selection(manager).await;
        }
        Command::DeselectAll => {
            manager.select_all(false);
            save_selection(manager).await;
        }
        Command::Reset => {
            let persisted = manager.reset().await;
            eprintln!("Task state reset.");
            warn_unsaved(persisted);
        }
    }
    Ok(())
}

fn report(outcome: &CompletionOutcome) {
    match outcome {
        CompletionOutcome::Completed { tasks, persisted } => {
            eprintln!("Completed {} task(s).", tasks.len());
            warn_unsaved(*persisted);
        }
        CompletionOutcome::AlreadyComplete => eprintln!("Nothing to do: already complete."),
        CompletionOutcome::Declined => eprintln!("Cancelled."),
        CompletionOutcome::NothingSelected => eprintln!("No tasks selected."),
    }
}

async fn save_selection(manager: &Manager) {
    warn_unsaved(manager.save().await);
}

fn warn_unsaved(persisted: bool) {
    if !persisted {
        eprintln!("warning: checklist state could not be saved");
    }
}

/// Initialize logging.
///
/// Logs go to stderr unless `file_path` is given, in which case they are
/// written through a non-blocking file appender. A log file that cannot be
/// opened falls back to stderr with a warning. The returned [`WorkerGuard`]
/// must be held until shutdown to flush buffered entries.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let opened = file_path.map(open_log_file);
    if let Some(Ok(file_appender)) = opened {
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(env_filter)
            .with_ansi(false)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
    if let Some(Err(e)) = opened {
        tracing::warn!(error = %e, "cannot open log file, logging to stderr");
    }
    None
}

/// Opens `path` for appending, creating its directory if needed.
fn open_log_file(path: &Path) -> Result<RollingFileAppender, String> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| format!("{} does not name a file", path.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|e| format!("{}: {e}", path.display()))
}
