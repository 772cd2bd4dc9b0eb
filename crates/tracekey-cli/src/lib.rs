//! Tracekey command-line front end.
//!
//! The binary is a thin wrapper: argument parsing lives in [`Args`], every
//! subcommand is a function of an [`Environment`], a [`SessionStore`], and an
//! output sink, so the whole command surface can be driven from tests with a
//! seeded environment and a temp directory.
//!
//! [`Environment`]: tracekey_core::Environment
//! [`SessionStore`]: tracekey_core::SessionStore

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod args;
mod commands;
mod error;

pub use args::{Args, Backend, Command, SessionCommand};
pub use commands::{BenchReport, run};
pub use error::CliError;
