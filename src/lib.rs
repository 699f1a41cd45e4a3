pub mod cli;
pub mod db;
pub mod entries;
pub mod metrics;
pub mod models;
pub mod render;
pub mod settings;
mod utils;

use std::{io, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use cli::{Cli, Outcome};
use entries::DashboardSession;
use settings::SettingsStore;

const DB_FILE_NAME: &str = "stresslog.sqlite3";
const SETTINGS_FILE_NAME: &str = "settings.json";

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    utils::logging::init(cli.verbosity());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_cli(cli)) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: Cli) -> Result<Outcome> {
    let data_dir = cli.resolve_data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings_store = SettingsStore::new(data_dir.join(SETTINGS_FILE_NAME))?;
    let policy = settings_store.validation_policy();

    let mut session = DashboardSession::open_at(data_dir.join(DB_FILE_NAME), policy).await;
    info!(
        "Session ready with {} entries from {}",
        session.entries().len(),
        data_dir.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::execute(
        &cli.command,
        cli.json,
        &mut session,
        &settings_store,
        &mut out,
    )
    .await
}
