//! Command-line front end over a [`DashboardSession`].

use std::{io::Write, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use crate::{
    entries::{store::export_json, DashboardSession, ValidationPolicy},
    render,
    settings::{SettingsStore, UserSettings},
};

/// Log storage-media stress-test sessions and summarize how much good data they produced.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Where the entry database and settings live.
    #[arg(long, env = "STRESSLOG_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn verbosity(&self) -> i8 {
        let verbose = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let quiet = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        verbose.saturating_sub(quiet)
    }

    /// `--data-dir`, then `STRESSLOG_DATA_DIR` (both via clap), then the
    /// platform data directory, then `./.stresslog`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("stresslog"))
                .unwrap_or_else(|| PathBuf::from(".stresslog"))
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a finished test session.
    Add(AddArgs),
    /// Show every entry, newest first.
    List,
    /// Delete one entry by id. Unknown ids are ignored.
    Remove {
        id: String,
    },
    /// Delete every entry.
    Clear,
    /// Totals, average efficiency and the good/bad split.
    Summary,
    /// Efficiency over time, oldest first.
    Trend,
    /// Entries, summary, split and trend together.
    Dashboard,
    /// Dump the saved entry list as JSON.
    Export,
    /// Show the effective settings, optionally changing them first.
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Hours the test ran.
    #[arg(allow_hyphen_values = true)]
    pub total: String,
    /// Hours of valid data captured.
    #[arg(allow_hyphen_values = true)]
    pub good: String,
    /// Hours of corrupted or lost data.
    #[arg(allow_hyphen_values = true)]
    pub bad: String,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Largest accepted gap in hours between total and good + bad.
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Decimal places kept in each entry's efficiency.
    #[arg(long)]
    pub decimals: Option<u32>,
}

/// Exit status for input the validator rejected.
pub const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The command ran but the validator rejected the user's input.
    InvalidInput,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::InvalidInput => ExitCode::from(EXIT_INVALID_INPUT),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveOutcome<'a> {
    id: &'a str,
    removed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearOutcome {
    removed: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView<'a> {
    path: &'a str,
    settings: &'a UserSettings,
    /// Policy this run validated with; saved changes apply from the next run.
    active: ValidationPolicy,
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode output")?;
    writeln!(out)?;
    Ok(())
}

/// Runs one command against `session`, writing user-facing output to `out`.
pub async fn execute<W: Write>(
    command: &Command,
    json: bool,
    session: &mut DashboardSession,
    settings: &SettingsStore,
    out: &mut W,
) -> Result<Outcome> {
    match command {
        Command::Add(args) => match session.add_entry(&args.total, &args.good, &args.bad).await {
            Ok(entry) => {
                if json {
                    print_json(out, &entry)?;
                } else {
                    writeln!(out, "Added entry ({:.2}% efficient)", entry.efficiency)?;
                    writeln!(out, "{}", render::entry_table(&entry))?;
                }
            }
            Err(err) => {
                if json {
                    print_json(out, &err.report())?;
                } else {
                    writeln!(out, "Entry not added: {err}")?;
                }
                return Ok(Outcome::InvalidInput);
            }
        },
        Command::List => {
            if json {
                print_json(out, session.entries())?;
            } else {
                writeln!(out, "{}", render::entries_table(session.entries()))?;
            }
        }
        Command::Remove { id } => {
            let removed = session.remove_entry(id).await.is_some();
            if json {
                print_json(out, &RemoveOutcome { id, removed })?;
            } else if removed {
                writeln!(out, "Removed entry {id}")?;
            } else {
                writeln!(out, "No entry with id {id}; nothing removed")?;
            }
        }
        Command::Clear => {
            let removed = session.clear().await;
            if json {
                print_json(out, &ClearOutcome { removed })?;
            } else {
                writeln!(out, "Removed {removed} entries")?;
            }
        }
        Command::Summary => {
            if json {
                print_json(out, &session.summary())?;
            } else {
                writeln!(
                    out,
                    "{}",
                    render::summary_table(&session.summary(), &session.composition())
                )?;
            }
        }
        Command::Trend => {
            if json {
                print_json(out, &session.trend())?;
            } else {
                writeln!(out, "{}", render::trend_table(&session.trend()))?;
            }
        }
        Command::Dashboard => {
            let snapshot = session.dashboard();
            if json {
                print_json(out, &snapshot)?;
            } else {
                writeln!(
                    out,
                    "{}",
                    render::summary_table(&snapshot.summary, &snapshot.composition)
                )?;
                writeln!(out, "{}", render::trend_table(&snapshot.trend))?;
                writeln!(out, "{}", render::entries_table(session.entries()))?;
            }
        }
        Command::Export => {
            writeln!(out, "{}", export_json(session.entries())?)?;
        }
        Command::Settings(args) => {
            if args.tolerance.is_some() || args.decimals.is_some() {
                let mut policy = settings.validation_policy();
                if let Some(tolerance) = args.tolerance {
                    policy.tolerance_hours = tolerance;
                }
                if let Some(decimals) = args.decimals {
                    policy.efficiency_decimals = decimals;
                }
                settings.update_validation(policy)?;
            }
            let current = &settings.current();
            let path = settings.path().display().to_string();
            if json {
                print_json(
                    out,
                    &SettingsView {
                        path: &path,
                        settings: current,
                        active: session.policy(),
                    },
                )?;
            } else {
                writeln!(out, "Settings file: {path}")?;
                writeln!(
                    out,
                    "Tolerance: {} h, efficiency rounded to {} decimals",
                    current.validation.tolerance_hours, current.validation.efficiency_decimals
                )?;
                let active = session.policy();
                if active != current.validation {
                    writeln!(
                        out,
                        "This run still used {} h and {} decimals",
                        active.tolerance_hours, active.efficiency_decimals
                    )?;
                }
            }
        }
    }

    Ok(Outcome::Done)
}
