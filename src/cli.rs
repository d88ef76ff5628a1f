//! CLI interface for sitelog.
//!
//! Each subcommand is non-interactive apart from the one-time permission
//! prompt: arguments in, structured output out. JSON goes to stdout, human
//! summaries go to stderr.

mod format;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use crate::builder::{ObservationBuilder, RetryError};
use crate::config::Config;
use crate::controller::CollectionController;
use crate::model::{PermissionState, PersistedObservation};
use crate::permission::{self, ConsentGate, TerminalPrompt};
use crate::provider::{fixed::FixedPosition, nmcli::Nmcli};
use crate::storage::Storage;

use format::{format_nearby, format_permission, format_record, format_session};

/// sitelog — record where you were and which network you could hear.
#[derive(Debug, Parser)]
#[command(name = "sitelog", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow:
  1. sitelog permission grant        (or answer the prompt on first collect)
  2. sitelog collect --retries 2     → prints the saved record
  3. sitelog list

Configuration lives in ~/.sitelog/config.toml (override with SITELOG_HOME):
  interface = "wlan0"
  [position]
  lat = 37.0
  lon = -122.0"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect one observation and save it.
    ///
    /// Runs permission, network, and position stages in order. Failed
    /// device stages are retried on their own, up to `--retries` times.
    /// The saved record is printed as JSON on stdout.
    Collect {
        /// Extra attempts for each failed stage.
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Print the session instead of saving it.
        #[arg(long)]
        no_save: bool,
    },

    /// List saved observations, oldest first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List Wi-Fi networks visible from here.
    Nearby,

    /// Inspect or change the recorded location permission.
    Permission {
        #[arg(value_enum)]
        action: PermissionAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PermissionAction {
    /// Show the recorded permission.
    Status,
    /// Allow location and Wi-Fi queries.
    Grant,
    /// Refuse location and Wi-Fi queries.
    Revoke,
    /// Forget the answer; the next collection asks again.
    Reset,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Collect { retries, no_save } => {
            cmd_collect(&mut controller(config, storage), retries, no_save)
        }
        Command::List { json } => cmd_list(&mut controller(config, storage), json),
        Command::Nearby => cmd_nearby(&mut controller(config, storage)),
        Command::Permission { action } => cmd_permission(&storage, action),
    }
}

/// Wire the shipped collaborators into a controller.
fn controller(config: &Config, storage: Storage) -> CollectionController {
    let consent = storage.permission_path();
    let builder = ObservationBuilder::new(
        Box::new(ConsentGate::new(&consent, TerminalPrompt)),
        Box::new(Nmcli::new(config.interface.clone())),
        Box::new(FixedPosition::new(config.position, &consent)),
    );
    CollectionController::new(builder, Box::new(storage))
}

fn cmd_collect(
    controller: &mut CollectionController,
    retries: u32,
    no_save: bool,
) -> Result<(), String> {
    controller.start();

    'attempts: for attempt in 1..=retries {
        let Some(session) = controller.session() else {
            break;
        };
        let failed: Vec<_> = session.failed.iter().map(|e| e.stage).collect();
        if failed.is_empty() || session.permission != PermissionState::Granted {
            break;
        }
        for stage in failed {
            debug!("retry {attempt}/{retries}: {stage:?}");
            match controller.retry(stage) {
                Ok(_) => {}
                Err(RetryError::PermissionDenied) => break 'attempts,
                Err(e) => debug!("not retried: {e}"),
            }
        }
    }

    let session = controller
        .session()
        .ok_or("collection produced no session")?;
    eprintln!("{}", format_session(session));

    if no_save {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| format!("failed to serialize session: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let saved = controller
        .save()
        .map_err(|e| format!("failed to save observation: {e}"))?;
    let json = serde_json::to_string_pretty(&saved)
        .map_err(|e| format!("failed to serialize observation: {e}"))?;
    println!("{json}");
    Ok(())
}

fn cmd_list(controller: &mut CollectionController, json: bool) -> Result<(), String> {
    controller
        .refresh()
        .map_err(|e| format!("failed to list observations: {e}"))?;

    // The store promises no order; sort a copy for display.
    let mut records: Vec<PersistedObservation> = controller.history().to_vec();
    records.sort_by(|a, b| a.record.captured_at.cmp(&b.record.captured_at));

    if json {
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| format!("failed to serialize observations: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if records.is_empty() {
        println!("No observations");
        return Ok(());
    }
    for p in &records {
        println!("{}", format_record(p));
    }
    Ok(())
}

fn cmd_nearby(controller: &mut CollectionController) -> Result<(), String> {
    let mut networks = controller
        .nearby()
        .map_err(|e| format!("failed to list nearby networks: {e}"))?;

    if networks.is_empty() {
        println!("No networks in range");
        return Ok(());
    }
    networks.sort_by(|a, b| b.level.cmp(&a.level));
    for n in &networks {
        println!("{}", format_nearby(n));
    }
    Ok(())
}

fn cmd_permission(storage: &Storage, action: PermissionAction) -> Result<(), String> {
    let path = storage.permission_path();
    let state = match action {
        PermissionAction::Status => permission::read_state(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        PermissionAction::Grant => PermissionState::Granted,
        PermissionAction::Revoke => PermissionState::Denied,
        PermissionAction::Reset => PermissionState::Unknown,
    };
    if !matches!(action, PermissionAction::Status) {
        permission::write_state(&path, state)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }
    println!("{}", format_permission(state));
    Ok(())
}
