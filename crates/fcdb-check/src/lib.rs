//! Command line front end for the fibre channel fabric database.
//!
//! - `ingest`: replays a capture file into a project dump
//! - `analyze`: cross references a dump, runs zone analysis and reports alerts
//! - `query`: prints the entities of one kind matching a JSON test tree
//!
//! Every command exits with the project exit status; unreadable input
//! exits with `INPUT_ERROR` (7).

mod cli;
mod commands;
mod error;
mod report;

pub use cli::{AnalyzeArgs, Cli, Command, IngestArgs, QueryArgs};
pub use commands::{analyze, ingest, query, run, Context};
pub use error::{CliError, CliResult};
pub use report::{AlertReport, ReportEntry};
