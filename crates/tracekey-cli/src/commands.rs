//! Subcommand implementations.

use std::{fs, io::Write, time::Duration};

use tracekey_core::{
    DayIndex, DayKey, DaySecret, Environment, MAX_PERIODS_PER_DAY, Replay, ReplayWindow,
    ScheduleConfig, Session, SessionStore, StorageError, restore_or_create, restore_session,
    save_session,
};
use tracekey_store::{FileStore, RedbStore};
use zeroize::Zeroizing;

use crate::{
    args::{Args, Backend, Command, SessionCommand},
    error::CliError,
};

/// File name of the redb database inside the state directory
const REDB_FILE: &str = "sessions.redb";

/// Result of a replay throughput run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    /// Keys replayed
    pub keys: u32,
    /// Identifiers regenerated across all keys
    pub identifiers: u64,
    /// Wall time spent replaying
    pub elapsed: Duration,
}

impl BenchReport {
    /// Identifiers per second, or 0 when the run took no measurable time.
    pub fn rate(&self) -> u64 {
        let micros = self.elapsed.as_micros();
        if micros == 0 {
            return 0;
        }
        u64::try_from(u128::from(self.identifiers) * 1_000_000 / micros).unwrap_or(u64::MAX)
    }
}

/// Run the subcommand in `args`, writing its output to `out`.
///
/// # Errors
///
/// Any failure of the session engine, the storage backend, argument
/// validation, or `out`.
pub fn run<E: Environment, W: Write>(args: &Args, env: &E, out: &mut W) -> Result<(), CliError> {
    let schedule = ScheduleConfig::new(args.periods_per_day)?;

    match &args.command {
        Command::Replay { day, secret, count, days } => {
            let key = parse_day_key(*day, secret)?;
            replay(&key, count.unwrap_or(schedule.periods_per_day), *days, out)
        },
        Command::Bench { keys, days, count } => {
            let report = bench(env.today(), *keys, *days, *count);
            writeln!(
                out,
                "{} identifiers from {} keys in {} ms ({} identifiers/s)",
                report.identifiers,
                report.keys,
                report.elapsed.as_millis(),
                report.rate()
            )?;
            Ok(())
        },
        Command::Session(command) => match args.backend {
            Backend::File => {
                let store = FileStore::open(&args.state_dir)?;
                session_command(&store, &args.session, command, schedule, env, out)
            },
            Backend::Redb => {
                fs::create_dir_all(&args.state_dir).map_err(StorageError::from)?;
                let store = RedbStore::open(args.state_dir.join(REDB_FILE))?;
                session_command(&store, &args.session, command, schedule, env, out)
            },
        },
    }
}

/// Subcommands that operate on a persisted session.
fn session_command<S: SessionStore, E: Environment, W: Write>(
    store: &S,
    name: &str,
    command: &SessionCommand,
    schedule: ScheduleConfig,
    env: &E,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        SessionCommand::Init { day, force } => {
            if !force && store.load(name)?.is_some() {
                return Err(CliError::SessionExists { name: name.to_string() });
            }

            let day = day.map_or_else(|| env.today(), DayIndex::new);
            let session = Session::create(env, day)?;
            save_session(store, name, &session)?;

            writeln!(out, "{name} {}", session.day())?;
        },
        SessionCommand::Identifiers { count, day, now } => {
            let count = count.unwrap_or(schedule.periods_per_day);
            if count > MAX_PERIODS_PER_DAY {
                return Err(CliError::CountTooLarge { count, max: MAX_PERIODS_PER_DAY });
            }
            if count > schedule.periods_per_day {
                tracing::debug!(
                    count,
                    periods_per_day = schedule.periods_per_day,
                    "Printing more identifiers than the schedule publishes"
                );
            }

            let mut session = restore_or_create(store, name, env)?;
            if let Some(day) = day {
                session.advance(DayIndex::new(*day))?;
                save_session(store, name, &session)?;
            }

            if *now {
                let period = schedule.period_at(env.wall_clock_secs());
                writeln!(out, "{period} {} {}", session.day(), session.identifier(period))?;
                return Ok(());
            }

            for (period, id) in session.identifiers(count).iter().enumerate() {
                writeln!(out, "{period} {} {id}", session.day())?;
            }
        },
        SessionCommand::DayKey => {
            let session = restore_session(store, name)?
                .ok_or_else(|| CliError::NoSession { name: name.to_string() })?;
            let key = session.export_day_key();

            let secret = Zeroizing::new(hex::encode(key.secret().as_bytes()));
            writeln!(out, "{} {}", key.day(), secret.as_str())?;
        },
    }

    Ok(())
}

/// Build a day key from a hex-encoded secret.
fn parse_day_key(day: u32, secret_hex: &str) -> Result<DayKey, CliError> {
    let bytes = Zeroizing::new(
        hex::decode(secret_hex.trim()).map_err(|e| CliError::InvalidSecret(e.to_string()))?,
    );
    let secret = DaySecret::from_slice(&bytes).map_err(|e| CliError::InvalidSecret(e.to_string()))?;

    Ok(DayKey::new(DayIndex::new(day), secret))
}

/// Print `period day identifier` for every replayed identifier.
fn replay<W: Write>(key: &DayKey, count: u32, days: u32, out: &mut W) -> Result<(), CliError> {
    if days <= 1 {
        for (period, (day, id)) in Replay::open(key, count).enumerate() {
            writeln!(out, "{period} {day} {id}")?;
        }
        return Ok(());
    }

    for (i, (day, id)) in ReplayWindow::open(key, days, count).enumerate() {
        let period = i % count as usize;
        writeln!(out, "{period} {day} {id}")?;
    }
    Ok(())
}

/// Replay `days` days of `count` identifiers for each of `keys` disclosed
/// keys and time it.
///
/// Key `i` is 28 zero bytes followed by `i` big-endian, so runs are
/// comparable across machines.
pub(crate) fn bench(start: DayIndex, keys: u32, days: u32, count: u32) -> BenchReport {
    #[allow(clippy::disallowed_methods, reason = "Benchmark measures wall time")]
    let started = std::time::Instant::now();

    let mut identifiers = 0u64;
    for i in 0..keys {
        let mut bytes = [0u8; 32];
        bytes[28..].copy_from_slice(&i.to_be_bytes());
        let key = DayKey::new(start, DaySecret::from_bytes(bytes));

        identifiers += ReplayWindow::open(&key, days, count).fold(0u64, |n, _| n + 1);
    }

    let elapsed = started.elapsed();
    tracing::info!(keys, days, count, identifiers, ?elapsed, "Replay benchmark finished");

    BenchReport { keys, identifiers, elapsed }
}
