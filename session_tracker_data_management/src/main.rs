use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use session_tracker_data_management::{
    projection::{ConsoleList, ConsoleMap},
    storage::FileStore,
    SessionManager, SessionManagerError,
};
use session_tracker_lib::SessionSpec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "SessionCLI")]
#[command(about = "A CLI to log, list and remove runs and rides", long_about = None)]
struct Cli {
    /// Where sessions are stored. Defaults to data/sessions.json in the project root
    #[arg(long)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrder {
    Asc,
    Desc,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sessions, in logging order unless sorted by distance
    List {
        #[arg(long, value_enum)]
        sort: Option<SortOrder>,
    },
    /// Log a run
    AddRun {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// km
        #[arg(long)]
        distance: f64,
        /// min
        #[arg(long)]
        duration: f64,
        /// steps/min
        #[arg(long)]
        cadence: f64,
    },
    /// Log a ride
    AddRide {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// km
        #[arg(long)]
        distance: f64,
        /// min
        #[arg(long)]
        duration: f64,
        /// m
        #[arg(long)]
        elevation: f64,
    },
    /// Delete a session
    Delete { id: String },
    /// Center the map on a session
    Focus { id: String },
    /// Fit the map to all sessions
    ShowAll,
    /// Delete all sessions. BE CAREFUL
    Reset,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info,session_tracker_lib=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SessionManagerError> {
    let store = match cli.data_file {
        Some(path) => FileStore::new(path),
        None => FileStore::in_project_root()?,
    };
    tracing::debug!("Using {:?}", store.path());

    let mut manager = SessionManager::start(store, ConsoleMap::new(), ConsoleList::new());

    match cli.command {
        Commands::List { sort } => {
            let sessions = match sort {
                Some(order) => manager.sort_by_distance(matches!(order, SortOrder::Asc)),
                None => manager.sessions().to_vec(),
            };
            for session in sessions {
                println!("{}\t{}\t{}", session.id, session.description, session.summary());
            }
        }
        Commands::AddRun { lat, lng, distance, duration, cadence } => {
            let session = manager.create_session(SessionSpec::run(lat, lng, distance, duration, cadence))?;
            println!("{}\t{}", session.id, session.popup_text());
        }
        Commands::AddRide { lat, lng, distance, duration, elevation } => {
            let session = manager.create_session(SessionSpec::ride(lat, lng, distance, duration, elevation))?;
            println!("{}\t{}", session.id, session.popup_text());
        }
        Commands::Delete { id } => {
            let session = manager.delete_session(&id)?;
            println!("Deleted {}", session.description);
        }
        Commands::Focus { id } => manager.focus_session(&id)?,
        Commands::ShowAll => {
            if manager.has_sessions() {
                manager.show_all();
            } else {
                println!("No sessions yet");
            }
        }
        Commands::Reset => manager.reset(),
    }

    if manager.persistence_degraded() {
        tracing::warn!("Changes could not be saved");
    }

    Ok(())
}
