//! Subcommand implementations.
//!
//! Each command returns the project exit status on success. Failing to read
//! an input maps to [`ExitStatus::InputError`] through [`CliError`].

use crate::cli::{AnalyzeArgs, Cli, Command, IngestArgs, QueryArgs};
use crate::error::{CliError, CliResult};
use crate::report::AlertReport;
use fcdb_core::{
    analyze_project, build_cross_references, entities_of_kind, match_test, parse_tests, plain,
    AlertTable, CaptureSource, Entity, EntityKind, ExitStatus, FcdbConfig, FcdbError, Ingestor,
    Logic, Project, Severity,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: FcdbConfig,
    pub alert_table: Arc<AlertTable>,
}

impl Context {
    pub fn new(config: FcdbConfig) -> CliResult<Self> {
        let alert_table = config
            .alert_table()
            .map_err(|e| CliError::input("configuration", e))?;
        Ok(Self {
            config,
            alert_table: Arc::new(alert_table),
        })
    }

    /// Loads the configuration file, or the defaults when none is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config = match path {
            Some(path) => FcdbConfig::load(path).map_err(|e| CliError::input("configuration", e))?,
            None => FcdbConfig::default(),
        };
        Self::new(config)
    }
}

/// Runs the selected subcommand.
pub fn run(ctx: &Context, cli: &Cli, out: &mut dyn Write) -> CliResult<ExitStatus> {
    match &cli.command {
        Command::Ingest(args) => ingest(ctx, args),
        Command::Analyze(args) => analyze(ctx, args),
        Command::Query(args) => query(ctx, args, out),
    }
}

/// Replays a capture file and writes the resulting dump.
pub fn ingest(ctx: &Context, args: &IngestArgs) -> CliResult<ExitStatus> {
    let capture =
        CaptureSource::load(&args.capture).map_err(|e| CliError::input("capture file", e))?;

    let mut project = Project::new(&args.name, &args.description, Arc::clone(&ctx.alert_table));
    let ingestor = if args.no_mask {
        Ingestor::new().without_ip_masking()
    } else {
        Ingestor::new()
    };
    let summary = capture.ingest(&ingestor, &mut project);
    info!(
        scopes = capture.scopes.len(),
        applied = summary.applied,
        failed = summary.failed,
        conflicts = summary.conflicts,
        "capture ingested"
    );

    let xref = build_cross_references(&mut project);
    info!(
        fabrics = xref.fabrics,
        logins = xref.logins_mapped,
        base_logins = xref.base_logins,
        "cross references built"
    );

    plain::write_file(&project, &args.output).map_err(|e| CliError::output("dump", e))?;
    Ok(project.exit_status())
}

/// Cross references and analyzes a dump, logging every alert.
pub fn analyze(ctx: &Context, args: &AnalyzeArgs) -> CliResult<ExitStatus> {
    let mut project = load_dump(ctx, &args.input)?;

    build_cross_references(&mut project);
    let summary = analyze_project(&mut project, &ctx.config.zone_check);
    info!(
        fabrics = summary.fabrics,
        alerts_added = summary.alerts_added,
        "zone analysis complete"
    );

    for (id, alert) in project.all_alerts() {
        match alert.severity {
            Severity::Error => error!(entity = %id, code = %alert.code, "{}", alert.message),
            Severity::Warn => warn!(entity = %id, code = %alert.code, "{}", alert.message),
            Severity::Info => info!(entity = %id, code = %alert.code, "{}", alert.message),
        }
    }

    if let Some(output) = &args.output {
        plain::write_file(&project, output).map_err(|e| CliError::output("dump", e))?;
    }
    if let Some(path) = &args.report {
        write_report(&AlertReport::from_project(&project), path)?;
    }

    let status = project.exit_status();
    info!(code = status.code(), "{}", status.message());
    Ok(status)
}

/// Prints the key of every entity of the requested kind matching the tests.
pub fn query(ctx: &Context, args: &QueryArgs, out: &mut dyn Write) -> CliResult<ExitStatus> {
    let kind: EntityKind = args
        .kind
        .parse()
        .map_err(|e: String| CliError::invalid_argument("kind", e))?;
    let logic: Logic = serde_json::from_value(serde_json::Value::String(args.logic.to_lowercase()))
        .map_err(|_| {
            CliError::invalid_argument("logic", format!("unknown logic '{}'", args.logic))
        })?;
    let tests = fs::read_to_string(&args.tests)
        .map_err(|e| FcdbError::io(&args.tests, e))
        .and_then(|content| parse_tests(&content))
        .map_err(|e| CliError::input("test file", e))?;

    let project = load_dump(ctx, &args.input)?;
    let objects = entities_of_kind(&project, kind);
    let matched =
        match_test(&objects, &tests, logic).map_err(|e| CliError::input("test file", e))?;
    info!(kind = %kind, candidates = objects.len(), matched = matched.len(), "query evaluated");

    for entity in matched {
        writeln!(out, "{}", entity.id())
            .map_err(|e| CliError::output("query result", FcdbError::io("stdout", e)))?;
    }
    Ok(project.exit_status())
}

fn load_dump(ctx: &Context, path: &Path) -> CliResult<Project> {
    plain::read_file(path, Arc::clone(&ctx.alert_table)).map_err(|e| CliError::input("dump", e))
}

fn write_report(report: &AlertReport, path: &Path) -> CliResult<()> {
    let content = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::output("report", FcdbError::from(e)))?;
    fs::write(path, content).map_err(|e| CliError::output("report", FcdbError::io(path, e)))?;
    info!(path = %path.display(), alerts = report.alerts.len(), "report written");
    Ok(())
}
