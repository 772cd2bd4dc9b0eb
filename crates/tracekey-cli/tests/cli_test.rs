//! Command surface tests.
//!
//! Drives `run` the way the binary does, with a seeded environment and a
//! temporary state directory, and checks what lands on the output.

use clap::Parser;
use tempfile::{TempDir, tempdir};
use tracekey_cli::{Args, CliError, run};
use tracekey_core::{DayIndex, Environment, MAX_PERIODS_PER_DAY, SeededEnv, SessionError};

const START_DAY: u32 = 2_459_000;

fn env() -> SeededEnv {
    SeededEnv::with_seed(99).at_day(DayIndex::new(START_DAY))
}

/// Run one command line against `dir` and return its output.
fn tracekey(dir: &TempDir, env: &SeededEnv, argv: &[&str]) -> Result<String, CliError> {
    let state_dir = dir.path().to_str().unwrap().to_string();
    let mut full = vec!["tracekey", "--state-dir", state_dir.as_str()];
    full.extend_from_slice(argv);

    let args = Args::try_parse_from(full).unwrap();
    let mut out = Vec::new();
    run(&args, env, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_init_then_day_key() {
    let dir = tempdir().unwrap();
    let env = env();

    let out = tracekey(&dir, &env, &["init"]).unwrap();
    assert_eq!(out.trim(), format!("default {START_DAY}"));

    let out = tracekey(&dir, &env, &["day-key"]).unwrap();
    let fields: Vec<_> = out.split_whitespace().collect();
    assert_eq!(fields[0], START_DAY.to_string());
    assert_eq!(fields[1].len(), 64);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    let env = env();

    tracekey(&dir, &env, &["init"]).unwrap();

    let err = tracekey(&dir, &env, &["init"]).unwrap_err();
    assert!(matches!(err, CliError::SessionExists { .. }));

    tracekey(&dir, &env, &["init", "--force"]).unwrap();
}

#[test]
fn test_day_key_without_session() {
    let dir = tempdir().unwrap();

    let err = tracekey(&dir, &env(), &["day-key"]).unwrap_err();
    assert!(matches!(err, CliError::NoSession { .. }));
}

#[test]
fn test_disclosed_key_replays_printed_identifiers() {
    let dir = tempdir().unwrap();
    let env = env();

    let broadcast = tracekey(&dir, &env, &["identifiers", "--count", "8"]).unwrap();
    assert_eq!(broadcast.lines().count(), 8);

    let day_key = tracekey(&dir, &env, &["day-key"]).unwrap();
    let fields: Vec<_> = day_key.split_whitespace().collect();

    let replayed = tracekey(
        &dir,
        &env,
        &["replay", "--day", fields[0], "--secret", fields[1], "--count", "8"],
    )
    .unwrap();

    assert_eq!(replayed, broadcast);
}

#[test]
fn test_identifiers_follow_the_clock() {
    let dir = tempdir().unwrap();
    let env = env();

    tracekey(&dir, &env, &["init"]).unwrap();
    env.advance_days(2);

    let out = tracekey(&dir, &env, &["identifiers", "--count", "1"]).unwrap();
    assert!(out.starts_with(&format!("0 {} ", START_DAY + 2)));
}

#[test]
fn test_identifiers_now_prints_active_period() {
    let dir = tempdir().unwrap();
    let env = env();

    let full = tracekey(&dir, &env, &["identifiers"]).unwrap();

    // 15-minute periods: 5 h 10 min past midnight is period 20
    env.set_clock_secs(env.wall_clock_secs() + 5 * 3600 + 600);
    let now = tracekey(&dir, &env, &["identifiers", "--now"]).unwrap();

    assert_eq!(now.lines().count(), 1);
    assert!(now.starts_with(&format!("20 {START_DAY} ")));
    assert_eq!(now.lines().next(), full.lines().nth(20));
}

#[test]
fn test_identifiers_now_follows_schedule() {
    let dir = tempdir().unwrap();
    let env = env();

    // Hourly periods: 23:59 is the last one
    env.set_clock_secs(env.wall_clock_secs() + 24 * 3600 - 60);
    let now = tracekey(&dir, &env, &["--periods-per-day", "24", "identifiers", "--now"]).unwrap();

    assert!(now.starts_with(&format!("23 {START_DAY} ")));
}

#[test]
fn test_identifiers_count_is_capped() {
    let dir = tempdir().unwrap();
    let env = env();

    let too_many = (MAX_PERIODS_PER_DAY + 1).to_string();
    let err = tracekey(&dir, &env, &["identifiers", "--count", too_many.as_str()]).unwrap_err();
    assert!(matches!(err, CliError::CountTooLarge { max: MAX_PERIODS_PER_DAY, .. }));

    let err = tracekey(&dir, &env, &["identifiers", "--count", "4000000000"]).unwrap_err();
    assert!(matches!(err, CliError::CountTooLarge { count: 4_000_000_000, .. }));

    let max = MAX_PERIODS_PER_DAY.to_string();
    let out = tracekey(&dir, &env, &["identifiers", "--count", max.as_str()]).unwrap();
    assert_eq!(out.lines().count(), MAX_PERIODS_PER_DAY as usize);
}

#[test]
fn test_identifiers_beyond_configured_schedule() {
    let dir = tempdir().unwrap();

    let out =
        tracekey(&dir, &env(), &["--periods-per-day", "24", "identifiers", "--count", "50"]).unwrap();

    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 50);
    assert!(lines[49].starts_with(&format!("49 {START_DAY} ")));
}

#[test]
fn test_identifiers_reject_past_day() {
    let dir = tempdir().unwrap();
    let env = env();

    tracekey(&dir, &env, &["init"]).unwrap();

    let past = (START_DAY - 1).to_string();
    let err = tracekey(&dir, &env, &["identifiers", "--day", past.as_str()]).unwrap_err();
    assert!(matches!(err, CliError::Session(SessionError::InvalidTransition { .. })));
}

#[test]
fn test_periods_per_day_sets_default_count() {
    let dir = tempdir().unwrap();

    let out = tracekey(&dir, &env(), &["--periods-per-day", "24", "identifiers"]).unwrap();
    assert_eq!(out.lines().count(), 24);

    let err = tracekey(&dir, &env(), &["--periods-per-day", "0", "identifiers"]).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

#[test]
fn test_redb_backend() {
    let dir = tempdir().unwrap();
    let env = env();

    tracekey(&dir, &env, &["--backend", "redb", "init"]).unwrap();
    assert!(dir.path().join("sessions.redb").exists());

    let out = tracekey(&dir, &env, &["--backend", "redb", "day-key"]).unwrap();
    assert!(out.starts_with(&START_DAY.to_string()));
}

#[test]
fn test_replay_window_spans_days() {
    let dir = tempdir().unwrap();
    let secret = "11".repeat(32);

    let out = tracekey(
        &dir,
        &env(),
        &["replay", "--day", "100", "--secret", secret.as_str(), "--count", "3", "--days", "4"],
    )
    .unwrap();

    let days: Vec<_> = out.lines().map(|l| l.split(' ').nth(1).unwrap().to_string()).collect();
    assert_eq!(days.len(), 12);
    assert_eq!(days[0], "100");
    assert_eq!(days[11], "103");
}

#[test]
fn test_bench_reports_count() {
    let dir = tempdir().unwrap();

    let out = tracekey(&dir, &env(), &["bench", "--keys", "5", "--days", "2", "--count", "4"])
        .unwrap();

    assert!(out.starts_with("40 identifiers from 5 keys"));
}
