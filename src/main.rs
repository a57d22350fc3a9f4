//! memberlog CLI
//!
//! Loads the member file, runs one command or the interactive menu, and
//! rewrites the member file when anything changed.

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use memberlog::{
    config::{AppConfig, Backend},
    core::registry::MemberRegistry,
    member::MemberDraft,
    persist,
    shell::Shell,
    types::MemberId,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Gym membership registry.
#[derive(Parser)]
#[command(name = "memberlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Member file read at startup
    #[arg(global = true, short, long)]
    data: Option<PathBuf>,

    /// Member file written on exit (defaults to the data file)
    #[arg(global = true, short, long)]
    output: Option<PathBuf>,

    /// Field delimiter of the member file
    #[arg(global = true, long)]
    delimiter: Option<char>,

    /// Storage backend
    #[arg(global = true, long, value_enum)]
    backend: Option<BackendArg>,

    /// Enable verbose logging
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Delimited,
    Sqlite,
}

impl From<BackendArg> for Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Delimited => Backend::Delimited,
            BackendArg::Sqlite => Backend::Sqlite,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Shell,

    /// Register a new member
    Add {
        /// First name
        first: String,
        /// Last name
        last: String,
        /// Email address
        email: String,
    },

    /// Remove a member by ID
    Remove {
        /// Member ID
        id: MemberId,
    },

    /// Find a member by name, or by email with --email
    Search {
        /// First name
        #[arg(required_unless_present = "email")]
        first: Option<String>,
        /// Last name
        #[arg(required_unless_present = "email")]
        last: Option<String>,
        /// Search by email address instead
        #[arg(short, long, conflicts_with_all = ["first", "last"])]
        email: Option<String>,
    },

    /// Change a member's email address
    SetEmail {
        /// First name
        first: String,
        /// Last name
        last: String,
        /// New email address
        email: String,
    },

    /// List all members in ID order
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(data) = cli.data {
        config.storage.data_path = data;
    }
    if let Some(output) = cli.output {
        config.storage.output_path = Some(output);
    }
    if let Some(delimiter) = cli.delimiter {
        config.storage.delimiter = delimiter;
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    debug!(?config, "resolved configuration");

    let mut registry = persist::load(&config.storage, &config.registry).inspect_err(|err| {
        error!(path = ?config.storage.data_path, %err, "failed to load members");
    })?;

    let command = cli.command.unwrap_or(Commands::Shell);
    let outcome = run_command(command, &mut registry)?;

    if outcome.changed {
        persist::save(&config.storage, &registry)?;
    }
    if let Some(confirmation) = outcome.confirmation {
        println!("{confirmation}");
    }
    Ok(outcome.status)
}

/// Result of one command, reported once the registry has been saved.
struct Outcome {
    changed: bool,
    status: ExitCode,
    confirmation: Option<String>,
}

impl Outcome {
    fn saved(confirmation: String) -> Self {
        Self {
            changed: true,
            status: ExitCode::SUCCESS,
            confirmation: Some(confirmation),
        }
    }

    fn unchanged(status: ExitCode) -> Self {
        Self {
            changed: false,
            status,
            confirmation: None,
        }
    }

    fn failed(err: impl std::fmt::Display) -> Self {
        eprintln!("{err}");
        Self::unchanged(ExitCode::FAILURE)
    }
}

fn run_command(
    command: Commands,
    registry: &mut MemberRegistry,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    match command {
        Commands::Shell => {
            let stdin = io::stdin();
            Shell::new(registry, stdin.lock(), io::stdout()).run()?;
            Ok(Outcome {
                changed: true,
                status: ExitCode::SUCCESS,
                confirmation: None,
            })
        }
        Commands::Add { first, last, email } => {
            match registry.insert(MemberDraft::new(&first, &last, &email)) {
                Ok(id) => Ok(Outcome::saved(format!("✓ Added {first} {last} as {id:06}"))),
                Err(err) => Ok(Outcome::failed(format!("Cannot add {first} {last}: {err}"))),
            }
        }
        Commands::Remove { id } => match registry.remove(id) {
            Ok(rec) => Ok(Outcome::saved(format!(
                "✓ Removed {:06} {}",
                rec.id,
                rec.full_name()
            ))),
            Err(err) => Ok(Outcome::failed(err)),
        },
        Commands::Search { first, last, email } => {
            let found = match (email, first, last) {
                (Some(email), _, _) => registry.find_by_email(&email),
                (None, Some(first), Some(last)) => {
                    registry.find_by_name(&first, &last).map(|rec| vec![rec])
                }
                _ => return Err("either a full name or --email is required".into()),
            };
            match found {
                Ok(found) => {
                    for rec in found {
                        println!("{rec}");
                    }
                    Ok(Outcome::unchanged(ExitCode::SUCCESS))
                }
                Err(err) => Ok(Outcome::failed(err)),
            }
        }
        Commands::SetEmail { first, last, email } => {
            let id = match registry.find_by_name(&first, &last) {
                Ok(rec) => rec.id,
                Err(err) => return Ok(Outcome::failed(err)),
            };
            match registry.update_email(id, &email) {
                Ok(rec) => Ok(Outcome::saved(format!("✓ Email changed\n{rec}"))),
                Err(err) => Ok(Outcome::failed(err)),
            }
        }
        Commands::List { format } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&registry.export_snapshot())?);
            } else {
                println!("Members:");
                for rec in registry.iter() {
                    println!("{rec}");
                }
            }
            Ok(Outcome::unchanged(ExitCode::SUCCESS))
        }
    }
}
