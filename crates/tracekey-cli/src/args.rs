use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracekey_core::DEFAULT_DISCLOSURE_DAYS;

/// Tracekey day-key sessions
#[derive(Parser, Debug)]
#[command(name = "tracekey")]
#[command(about = "Rotating day keys, broadcast identifiers, and disclosure replay")]
#[command(version)]
pub struct Args {
    /// Directory holding persisted sessions
    #[arg(long, default_value = ".tracekey")]
    pub state_dir: PathBuf,

    /// Name of the session inside the state directory
    #[arg(long, default_value = "default")]
    pub session: String,

    /// Storage backend for persisted sessions
    #[arg(long, value_enum, default_value_t = Backend::File)]
    pub backend: Backend,

    /// Identifiers per day
    #[arg(long, default_value_t = tracekey_core::ScheduleConfig::default().periods_per_day)]
    pub periods_per_day: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Persisted session backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One file per session in the state directory
    File,
    /// A single redb database in the state directory
    Redb,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Subcommands that operate on the persisted session
    #[command(flatten)]
    Session(SessionCommand),

    /// Regenerate the identifiers of a disclosed day key
    Replay {
        /// Julian day of the disclosed key
        #[arg(long)]
        day: u32,

        /// Disclosed day secret, 64 hex characters
        #[arg(long)]
        secret: String,

        /// Identifiers per day (defaults to the periods per day)
        #[arg(long)]
        count: Option<u32>,

        /// Consecutive days to replay, ratcheting the key locally
        #[arg(long, default_value_t = 1)]
        days: u32,
    },

    /// Measure replay throughput
    Bench {
        /// Number of disclosed keys to replay
        #[arg(long, default_value_t = 1000)]
        keys: u32,

        /// Days replayed per key
        #[arg(long, default_value_t = DEFAULT_DISCLOSURE_DAYS)]
        days: u32,

        /// Identifiers per day
        #[arg(long, default_value_t = 8)]
        count: u32,
    },
}

/// Subcommands that load or save the named session
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Create a fresh session and save it
    Init {
        /// Julian day to start at (defaults to today)
        #[arg(long)]
        day: Option<u32>,

        /// Replace an existing session
        #[arg(long)]
        force: bool,
    },

    /// Print the identifiers of a day, creating the session if needed
    Identifiers {
        /// Number of identifiers (defaults to the periods per day)
        #[arg(long, conflicts_with = "now")]
        count: Option<u32>,

        /// Julian day to advance to first (defaults to today)
        #[arg(long, conflicts_with = "now")]
        day: Option<u32>,

        /// Print only the identifier of the period active right now
        #[arg(long)]
        now: bool,
    },

    /// Print the current day key for disclosure
    DayKey,
}
