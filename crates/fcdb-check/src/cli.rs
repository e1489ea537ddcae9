//! Command line definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fibre channel fabric capture ingestion and zoning analysis
#[derive(Parser, Debug)]
#[command(name = "fcdbchk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults apply when absent
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(short = 'l', long, global = true)]
    pub log_level: Option<String>,

    /// Emit JSON formatted log lines
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a capture file into a project dump
    Ingest(IngestArgs),
    /// Cross reference a dump and run zone analysis
    Analyze(AnalyzeArgs),
    /// Print the keys of the entities matching a test tree
    Query(QueryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Capture file with recorded responses per scope
    #[arg(short = 'i', long)]
    pub capture: PathBuf,

    /// Dump file to write
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Project name
    #[arg(short = 'n', long, default_value = "fcdb")]
    pub name: String,

    /// Project description
    #[arg(short = 'd', long, default_value = "")]
    pub description: String,

    /// Keep IP addresses unmasked
    #[arg(long)]
    pub no_mask: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Dump file to analyze
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Write the analyzed project to this dump file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Write every alert to this JSON report
    #[arg(short = 'r', long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Dump file to query
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Entity kind to filter (switch, port, zone, alias, login, ...)
    #[arg(short = 'k', long)]
    pub kind: String,

    /// JSON test tree: a single test or a list of tests
    #[arg(short = 't', long)]
    pub tests: PathBuf,

    /// Logic combining the top level tests (and, or, nand, nor)
    #[arg(long, default_value = "and")]
    pub logic: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "fcdbchk",
            "analyze",
            "-i",
            "dump.json",
            "--report",
            "alerts.json",
            "--json-log",
            "-c",
            "fcdb.toml",
        ]);
        assert!(cli.json_log);
        assert_eq!(cli.config, Some(PathBuf::from("fcdb.toml")));
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.input, PathBuf::from("dump.json"));
                assert_eq!(args.report, Some(PathBuf::from("alerts.json")));
                assert_eq!(args.output, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ingest_defaults() {
        let cli = Cli::parse_from(["fcdbchk", "ingest", "-i", "cap.json", "-o", "dump.json"]);
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.name, "fcdb");
                assert!(!args.no_mask);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
