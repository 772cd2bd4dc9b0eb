//! Tracekey binary.
//!
//! # Usage
//!
//! ```bash
//! # Start a session and print today's identifiers
//! tracekey init
//! tracekey identifiers
//!
//! # Disclose today's key, then verify it from another machine
//! tracekey day-key
//! tracekey replay --day 2459000 --secret <64 hex chars> --days 14
//!
//! # Replay throughput
//! tracekey bench --keys 1000
//! ```

use std::io::Write;

use clap::Parser;
use tracekey_cli::{Args, run};
use tracekey_core::SystemEnv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!(
        state_dir = %args.state_dir.display(),
        session = %args.session,
        "Tracekey starting"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&args, &SystemEnv::new(), &mut out)?;
    out.flush()?;

    Ok(())
}
