//! Fibre-channel fabric database.
//!
//! This crate merges management API telemetry into a typed topology graph
//! and checks the zoning configuration it describes:
//!
//! - [`AttributeStore`]: path addressed attribute tree with merge policies
//! - [`Project`]: root of the graph, owning chassis, switches, fabrics and IOCPs
//! - [`AlertRecord`]: diagnostic attached to an entity, with project status flags
//! - [`build_cross_references`]: WWN to port map, fabric membership, NPIV base logins
//! - [`match_test`]: declarative filtering of entities and payload fragments
//! - [`analyze_project`]: zoning analysis
//! - [`Ingestor`]: merges payloads from a [`TelemetrySource`]
//!
//! # Pipeline
//!
//! 1. Payloads are applied with [`Ingestor::apply`] or collected from a source
//! 2. [`build_cross_references`] derives the indices analysis relies on
//! 3. [`analyze_project`] attaches alerts and raises status flags
//! 4. [`Project::exit_status`] summarizes the run
//!
//! A project can be dumped with [`plain::write_file`] and reloaded at any point.

mod alert;
mod config;
mod entity;
mod error;
mod fabric;
mod ingest;
mod node;
pub mod paths;
pub mod plain;
mod project;
mod query;
mod reserved;
mod store;
mod xref;
mod zone_check;

pub use alert::{
    format_message, AlertCode, AlertOverride, AlertParams, AlertRecord, AlertSpec, AlertTable,
    ExitStatus, Severity, StatusFlag, StatusFlags,
};
pub use config::{AlertsConfig, FcdbConfig, LoggingConfig, ZoneCheckConfig};
pub use entity::{
    AliasObj, ChassisObj, Entity, EntityKind, EntityRef, FdmiNodeObj, FdmiPortObj, IocpObj,
    LoginObj, PortObj, Record, SwitchObj, ZoneCfgObj, ZoneObj,
};
pub use error::{ErrorOrigin, FcdbError, FcdbResult};
pub use fabric::{FabricObj, ZonedRole};
pub use ingest::{
    mask_ip, mask_ip_addresses, CaptureScope, CaptureSource, FetchError, IngestSummary, Ingestor,
    Scope, TelemetrySource, UriKind,
};
pub use node::{node_map, split_path, Node, NodeMap, Scalar};
pub use project::{PortRef, Project};
pub use query::{
    entities_of_kind, match_objects, match_test, parse_tests, threshold_test, KeySpec, Logic,
    MatchKind, Queryable, Term, TestKind, TestNode, TestValue, Threshold, ThresholdOp,
};
pub use reserved::{ReservedKey, RESERVED_KEYS_VERSION};
pub use store::{policy_for, AttributeStore, Conflict, ConflictReason, MergePolicy};
pub use xref::{build_cross_references, XrefSummary};
pub use zone_check::{analyze_fabric, analyze_project, AnalysisSummary};
