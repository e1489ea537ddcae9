//! Telemetry ingestion.
//!
//! The core never talks to a switch. A [`TelemetrySource`] returns one
//! payload tree per URI and the [`Ingestor`] merges it into the project:
//!
//! - [`UriKind`] - which entities a URI populates
//! - [`Ingestor::apply`] - merge one payload
//! - [`Ingestor::collect`] - fetch and merge a list of URIs for one scope
//! - [`CaptureSource`] - source backed by a JSON capture file
//!
//! Replaying a payload that was already applied changes nothing.

use crate::alert::{AlertCode, AlertParams};
use crate::entity::EntityRef;
use crate::error::{FcdbError, FcdbResult};
use crate::node::Node;
use crate::paths;
use crate::project::Project;
use fcdb_types::{Wwn, ZoneType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Chassis and logical switch a request was made against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Chassis WWN.
    #[serde(default)]
    pub chassis: Option<String>,
    /// Logical switch WWN. Absent for chassis level requests.
    #[serde(default)]
    pub switch: Option<String>,
}

impl Scope {
    pub fn chassis(wwn: impl Into<String>) -> Self {
        Self {
            chassis: Some(wwn.into()),
            switch: None,
        }
    }

    pub fn switch(chassis: impl Into<String>, switch: impl Into<String>) -> Self {
        Self {
            chassis: Some(chassis.into()),
            switch: Some(switch.into()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.chassis, &self.switch) {
            (_, Some(sw)) => write!(f, "switch {}", sw),
            (Some(ch), None) => write!(f, "chassis {}", ch),
            (None, None) => f.write_str("project"),
        }
    }
}

/// Failure reported by a telemetry source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The source has nothing for this URI.
    #[error("{uri} is not available for {scope}")]
    NotAvailable { uri: String, scope: String },

    /// The management API answered with an error status.
    #[error("{uri} returned status {status}: {message}")]
    Status {
        uri: String,
        status: u16,
        message: String,
    },

    /// The request never reached the management API.
    #[error("{uri}: {message}")]
    Transport { uri: String, message: String },
}

/// Anything that can answer a management API request.
pub trait TelemetrySource {
    fn fetch(&self, uri: &str, scope: &Scope) -> Result<Node, FetchError>;
}

/// Which entities a URI populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriKind {
    Chassis,
    LogicalSwitchList,
    FabricSwitchList,
    Switch,
    FcPorts,
    GePorts,
    MediaPorts,
    NameServer,
    FdmiHba,
    FdmiPort,
    DefinedZoning,
    EffectiveZoning,
    MapsRules,
    MapsGroups,
    Fabric,
    Generic,
}

impl UriKind {
    /// Classifies a URI. Operational prefixes are ignored.
    pub fn classify(uri: &str) -> Self {
        let (key, leaf) = split_uri(uri);
        match key.as_str() {
            "brocade-chassis/chassis" => UriKind::Chassis,
            "brocade-fibrechannel-logical-switch/fibrechannel-logical-switch" => {
                UriKind::LogicalSwitchList
            }
            "brocade-fabric/fabric-switch" => UriKind::FabricSwitchList,
            "brocade-fibrechannel-switch/fibrechannel-switch" => UriKind::Switch,
            "brocade-name-server/fibrechannel-name-server" => UriKind::NameServer,
            "brocade-fdmi/hba" => UriKind::FdmiHba,
            "brocade-fdmi/port" => UriKind::FdmiPort,
            "brocade-zone/defined-configuration" => UriKind::DefinedZoning,
            "brocade-zone/effective-configuration" => UriKind::EffectiveZoning,
            "brocade-maps/rule" => UriKind::MapsRules,
            "brocade-maps/group" => UriKind::MapsGroups,
            "brocade-media/media-rdp" => UriKind::MediaPorts,
            "brocade-fibrechannel-configuration/fabric" | "brocade-zone/fabric-lock" => {
                UriKind::Fabric
            }
            _ => match leaf {
                "fibrechannel" | "fibrechannel-statistics" => UriKind::FcPorts,
                "gigabitethernet" | "gigabitethernet-statistics" | "extension-ip-interface" => {
                    UriKind::GePorts
                }
                _ => UriKind::Generic,
            },
        }
    }

    /// Position in a collection pass. Topology is built before the fabric
    /// level data that depends on it.
    pub const fn order(&self) -> u8 {
        match self {
            UriKind::Chassis => 0,
            UriKind::LogicalSwitchList => 1,
            UriKind::FabricSwitchList => 2,
            UriKind::Switch => 3,
            UriKind::FcPorts | UriKind::GePorts => 4,
            UriKind::MediaPorts => 5,
            UriKind::MapsRules | UriKind::MapsGroups | UriKind::Generic => 6,
            UriKind::NameServer => 7,
            UriKind::FdmiHba | UriKind::FdmiPort => 8,
            UriKind::Fabric => 9,
            UriKind::DefinedZoning | UriKind::EffectiveZoning => 10,
        }
    }
}

/// Splits a URI into its storage key and its last segment, dropping the
/// `running` and `operations` prefixes.
fn split_uri(uri: &str) -> (String, &str) {
    let segments: Vec<&str> = uri
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| matches!(*s, "rest" | "running" | "operations"))
        .collect();
    let leaf = segments.last().copied().unwrap_or("");
    (segments.join("/"), leaf)
}

/// Masks all but the last part of an IP address.
pub fn mask_ip(addr: &str) -> String {
    if let Some((_, last)) = addr.rsplit_once('.').filter(|_| addr.split('.').count() == 4) {
        return format!("xxx.xxx.xxx.{}", last);
    }
    match addr.rsplit_once(':') {
        Some((head, last)) => {
            let groups = head.split(':').count();
            format!("{}:{}", vec!["xxxx"; groups].join(":"), last)
        }
        None => addr.to_string(),
    }
}

/// Replaces every IP address below an IP address key.
pub fn mask_ip_addresses(node: Node) -> Node {
    fn mask_all(node: Node) -> Node {
        match node {
            Node::List(l) => Node::List(l.into_iter().map(mask_all).collect()),
            Node::Map(m) => Node::Map(m.into_iter().map(|(k, v)| (k, mask_all(v))).collect()),
            n => match n.as_str() {
                Some(s) => Node::str(mask_ip(s)),
                None => n,
            },
        }
    }

    match node {
        Node::List(l) => Node::List(l.into_iter().map(mask_ip_addresses).collect()),
        Node::Map(m) => Node::Map(
            m.into_iter()
                .map(|(k, v)| {
                    let v = if paths::IP_ADDRESS_KEYS.contains(&k.as_str()) {
                        mask_all(v)
                    } else {
                        mask_ip_addresses(v)
                    };
                    (k, v)
                })
                .collect(),
        ),
        n => n,
    }
}

fn truthy(node: Option<&Node>) -> bool {
    match node {
        Some(n) => n.as_bool().unwrap_or_else(|| n.as_i64().map_or(false, |i| i != 0)),
        None => false,
    }
}

/// Counts reported by [`Ingestor::collect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub applied: usize,
    pub failed: usize,
    pub conflicts: usize,
}

/// Merges management API payloads into a project.
#[derive(Debug, Clone)]
pub struct Ingestor {
    mask_ip_addresses: bool,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub fn new() -> Self {
        Self {
            mask_ip_addresses: true,
        }
    }

    /// Keeps IP addresses as reported.
    pub fn without_ip_masking(mut self) -> Self {
        self.mask_ip_addresses = false;
        self
    }

    /// Merges one payload. Returns the number of attribute conflicts.
    ///
    /// A payload with an unexpected shape is abandoned at the first bad
    /// entry. Whatever was merged before it stays, and the error is recorded
    /// on the project before it is returned.
    #[instrument(skip(self, project, payload), fields(scope = %scope))]
    pub fn apply(
        &self,
        project: &mut Project,
        scope: &Scope,
        uri: &str,
        payload: Node,
    ) -> FcdbResult<usize> {
        let payload = if self.mask_ip_addresses {
            mask_ip_addresses(payload)
        } else {
            payload
        };
        let kind = UriKind::classify(uri);
        debug!(?kind, "applying payload");
        match self.dispatch(project, scope, uri, kind, payload) {
            Ok(conflicts) => Ok(conflicts),
            Err(e) => {
                warn!("{}", e);
                project.record_error(&e);
                Err(e)
            }
        }
    }

    /// Fetches and merges every URI for one scope.
    ///
    /// URIs are applied in [`UriKind::order`]. A failed fetch raises the API
    /// warning flag and the pass continues.
    #[instrument(skip(self, project, source, uris), fields(scope = %scope))]
    pub fn collect<S: TelemetrySource + ?Sized>(
        &self,
        project: &mut Project,
        source: &S,
        scope: &Scope,
        uris: &[String],
    ) -> IngestSummary {
        let mut ordered: Vec<&String> = uris.iter().collect();
        ordered.sort_by_key(|u| UriKind::classify(u).order());

        let mut summary = IngestSummary::default();
        for uri in ordered {
            let payload = match source.fetch(uri, scope) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("fetch failed: {}", e);
                    project.record_error(&FcdbError::api(uri.as_str(), e.to_string()));
                    summary.failed += 1;
                    continue;
                }
            };
            match self.apply(project, scope, uri, payload) {
                Ok(conflicts) => {
                    summary.applied += 1;
                    summary.conflicts += conflicts;
                }
                Err(_) => summary.failed += 1,
            }
        }
        info!(
            applied = summary.applied,
            failed = summary.failed,
            conflicts = summary.conflicts,
            "collection complete"
        );
        summary
    }

    fn dispatch(
        &self,
        project: &mut Project,
        scope: &Scope,
        uri: &str,
        kind: UriKind,
        payload: Node,
    ) -> FcdbResult<usize> {
        let (key, leaf) = split_uri(uri);
        let container = match payload {
            Node::Map(mut m) => m.remove(leaf).unwrap_or(Node::Map(m)),
            other => {
                return Err(FcdbError::api(
                    uri,
                    format!("expected an object, got {}", other.type_name()),
                ))
            }
        };

        match kind {
            UriKind::Chassis => {
                let chassis = require_chassis(scope, uri)?;
                project.add_chassis(chassis);
                store_fields(project, &EntityRef::Chassis(chassis.to_string()), &key, container)
            }
            UriKind::LogicalSwitchList => self.logical_switches(project, scope, uri, &key, container),
            UriKind::FabricSwitchList => self.fabric_switches(project, uri, &key, container),
            UriKind::Switch => {
                let switch = self.scope_switch(project, scope, uri)?;
                let first = container
                    .as_items()
                    .first()
                    .cloned()
                    .ok_or_else(|| FcdbError::api(uri, "empty switch list"))?;
                let conflicts = store_fields(project, &EntityRef::Switch(switch.clone()), &key, first)?;
                if project.switch(&switch).map_or(false, |s| s.is_principal()) {
                    project.link_switch_to_fabric(&switch, &switch);
                }
                Ok(conflicts)
            }
            UriKind::FcPorts | UriKind::GePorts | UriKind::MediaPorts => {
                self.ports(project, scope, uri, kind, leaf, container)
            }
            UriKind::NameServer => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                let mut conflicts = 0;
                for (i, entry) in container.as_items().iter().enumerate() {
                    let wwn = entry_key(entry, "port-name", uri, i)?;
                    project.add_fabric(&fabric).add_login(&wwn);
                    conflicts +=
                        store_fields(project, &EntityRef::login(&fabric, wwn), &key, entry.clone())?;
                }
                Ok(conflicts)
            }
            UriKind::FdmiHba => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                let mut conflicts = 0;
                for (i, entry) in container.as_items().iter().enumerate() {
                    let id = entry_key(entry, "hba-id", uri, i)?;
                    let fab = project.add_fabric(&fabric);
                    fab.add_fdmi_node(&id);
                    for port in entry
                        .lookup("hba-port-list/wwn")
                        .map(Node::string_list)
                        .unwrap_or_default()
                    {
                        fab.add_fdmi_port(&port);
                    }
                    let target = EntityRef::FdmiNode {
                        fabric: fabric.clone(),
                        wwn: id,
                    };
                    conflicts += store_fields(project, &target, &key, entry.clone())?;
                }
                Ok(conflicts)
            }
            UriKind::FdmiPort => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                let mut conflicts = 0;
                for (i, entry) in container.as_items().iter().enumerate() {
                    let wwn = entry_key(entry, "port-name", uri, i)?;
                    project.add_fabric(&fabric).add_fdmi_port(&wwn);
                    let target = EntityRef::FdmiPort {
                        fabric: fabric.clone(),
                        wwn,
                    };
                    conflicts += store_fields(project, &target, &key, entry.clone())?;
                }
                Ok(conflicts)
            }
            UriKind::DefinedZoning => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                defined_zoning(project, &fabric, uri, &container)
            }
            UriKind::EffectiveZoning => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                effective_zoning(project, &fabric, uri, &key, container)
            }
            UriKind::MapsRules | UriKind::MapsGroups => {
                let switch = self.scope_switch(project, scope, uri)?;
                maps_tables(project, &switch, uri, kind, &container)
            }
            UriKind::Fabric => {
                let fabric = self.scope_fabric(project, scope, uri)?;
                store_fields(project, &EntityRef::Fabric(fabric), &key, container)
            }
            UriKind::Generic => {
                let target = match (&scope.switch, &scope.chassis) {
                    (Some(sw), _) => {
                        project.add_switch(sw, scope.chassis.as_deref());
                        EntityRef::Switch(sw.clone())
                    }
                    (None, Some(ch)) => {
                        project.add_chassis(ch);
                        EntityRef::Chassis(ch.clone())
                    }
                    (None, None) => EntityRef::Project,
                };
                store_fields(project, &target, &key, container)
            }
        }
    }

    fn scope_switch(&self, project: &mut Project, scope: &Scope, uri: &str) -> FcdbResult<String> {
        let switch = scope
            .switch
            .clone()
            .ok_or_else(|| FcdbError::api(uri, "request needs a logical switch scope"))?;
        project.add_switch(&switch, scope.chassis.as_deref());
        Ok(switch)
    }

    /// Fabric of the scope switch. A principal switch that has not been
    /// linked yet owns its fabric.
    fn scope_fabric(&self, project: &mut Project, scope: &Scope, uri: &str) -> FcdbResult<String> {
        let switch = self.scope_switch(project, scope, uri)?;
        let sw = project
            .switch(&switch)
            .ok_or_else(|| FcdbError::entity_not_found("switch", switch.as_str()))?;
        match (&sw.fabric_key, sw.is_principal()) {
            (Some(fabric), _) => Ok(fabric.clone()),
            (None, true) => {
                project.link_switch_to_fabric(&switch, &switch);
                Ok(switch)
            }
            (None, false) => Err(FcdbError::api(
                uri,
                format!("fabric of switch {} is not known yet", switch),
            )),
        }
    }

    fn logical_switches(
        &self,
        project: &mut Project,
        scope: &Scope,
        uri: &str,
        key: &str,
        container: Node,
    ) -> FcdbResult<usize> {
        let chassis = require_chassis(scope, uri)?.to_string();
        let mut conflicts = 0;
        for (i, entry) in container.as_items().iter().enumerate() {
            let wwn = entry_key(entry, "switch-wwn", uri, i)?;
            let switch = project.add_switch(&wwn, Some(&chassis));
            for port in entry
                .lookup("port-member-list/port-member")
                .map(Node::string_list)
                .unwrap_or_default()
            {
                switch.add_port(&port);
            }
            for port in entry
                .lookup("ge-port-member-list/port-member")
                .map(Node::string_list)
                .unwrap_or_default()
            {
                switch.add_ge_port(&port);
            }
            conflicts += store_fields(project, &EntityRef::Switch(wwn), key, entry.clone())?;
        }
        Ok(conflicts)
    }

    /// Every switch in the fabric as seen by the polled switch. The entry
    /// flagged principal names the fabric.
    fn fabric_switches(
        &self,
        project: &mut Project,
        uri: &str,
        key: &str,
        container: Node,
    ) -> FcdbResult<usize> {
        let mut conflicts = 0;
        let mut members = Vec::new();
        let mut principal = None;
        for (i, entry) in container.as_items().iter().enumerate() {
            let wwn = entry_key(entry, "name", uri, i)?;
            if !Wwn::is_wwn(&wwn, true) {
                return Err(FcdbError::api(uri, format!("bad switch WWN '{}'", wwn)));
            }
            let chassis = entry.child("chassis-wwn").and_then(Node::as_str);
            project.add_switch(&wwn, chassis);
            if truthy(entry.child("principal")) || truthy(entry.child("is-principal")) {
                principal = Some(wwn.clone());
            }
            conflicts += store_fields(project, &EntityRef::Switch(wwn.clone()), key, entry.clone())?;
            members.push(wwn);
        }
        match principal {
            Some(fabric) => {
                for switch in &members {
                    project.link_switch_to_fabric(switch, &fabric);
                }
            }
            None => warn!(uri, "fabric switch list has no principal switch"),
        }
        Ok(conflicts)
    }

    fn ports(
        &self,
        project: &mut Project,
        scope: &Scope,
        uri: &str,
        kind: UriKind,
        leaf: &str,
        container: Node,
    ) -> FcdbResult<usize> {
        let switch = self.scope_switch(project, scope, uri)?;
        let mut conflicts = 0;
        for (i, entry) in container.as_items().iter().enumerate() {
            let name = entry_key(entry, "name", uri, i)?;
            let target = match kind {
                UriKind::GePorts => {
                    project.add_switch(&switch, None).add_ge_port(&name);
                    EntityRef::GePort {
                        switch: switch.clone(),
                        port: name,
                    }
                }
                _ => {
                    // Media entries are named `<media type>/<slot>/<port>`.
                    let port = match kind {
                        UriKind::MediaPorts => name.split_once('/').map_or(name.as_str(), |(_, p)| p),
                        _ => name.as_str(),
                    };
                    project.add_switch(&switch, None).add_port(port);
                    EntityRef::port(switch.as_str(), port)
                }
            };
            conflicts += store_fields(project, &target, leaf, entry.clone())?;
        }
        Ok(conflicts)
    }
}

fn require_chassis<'a>(scope: &'a Scope, uri: &str) -> FcdbResult<&'a str> {
    scope
        .chassis
        .as_deref()
        .ok_or_else(|| FcdbError::api(uri, "request needs a chassis scope"))
}

/// Key field of the `index`th entry of a list container.
fn entry_key(entry: &Node, field: &str, uri: &str, index: usize) -> FcdbResult<String> {
    entry
        .child(field)
        .and_then(Node::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FcdbError::api(uri, format!("entry {} has no '{}'", index, field)))
}

/// Stores each field of a container below `base`. A scalar container is
/// stored at `base` itself.
fn store_fields(
    project: &mut Project,
    target: &EntityRef,
    base: &str,
    container: Node,
) -> FcdbResult<usize> {
    match container {
        Node::Map(fields) => {
            let mut conflicts = 0;
            for (k, v) in fields {
                conflicts += project.set_attr(target, &format!("{}/{}", base, k), v, false)?;
            }
            Ok(conflicts)
        }
        other => project.set_attr(target, base, other, false),
    }
}

fn zone_type(entry: &Node, uri: &str) -> FcdbResult<ZoneType> {
    match entry.child("zone-type").and_then(Node::as_i64) {
        None => Ok(ZoneType::Standard),
        Some(t) => u8::try_from(t)
            .ok()
            .and_then(|t| ZoneType::try_from(t).ok())
            .ok_or_else(|| FcdbError::api(uri, format!("unknown zone type {}", t))),
    }
}

fn zone_members(entry: &Node) -> (Vec<String>, Vec<String>) {
    let list = |path: &str| entry.lookup(path).map(Node::string_list).unwrap_or_default();
    (
        list("member-entry/entry-name"),
        list("member-entry/principal-entry-name"),
    )
}

fn defined_zoning(project: &mut Project, fabric: &str, uri: &str, defined: &Node) -> FcdbResult<usize> {
    let fab = project.add_fabric(fabric);
    let name = |entry: &Node, field: &str, i| entry_key(entry, field, uri, i);

    for (i, cfg) in defined.child("cfg").map(Node::as_items).unwrap_or(&[]).iter().enumerate() {
        let members = cfg
            .lookup("member-zone/zone-name")
            .map(Node::string_list)
            .unwrap_or_default();
        fab.add_zonecfg(&name(cfg, "cfg-name", i)?).add_members(members);
    }
    for (i, entry) in defined.child("zone").map(Node::as_items).unwrap_or(&[]).iter().enumerate() {
        let zone = fab.add_zone(&name(entry, "zone-name", i)?);
        zone.zone_type = zone_type(entry, uri)?;
        let (members, pmembers) = zone_members(entry);
        zone.add_members(members);
        zone.add_pmembers(pmembers);
    }
    for (i, entry) in defined.child("alias").map(Node::as_items).unwrap_or(&[]).iter().enumerate() {
        let members = entry
            .lookup("member-entry/alias-entry-name")
            .map(Node::string_list)
            .unwrap_or_default();
        fab.add_alias(&name(entry, "alias-name", i)?).add_members(members);
    }
    Ok(0)
}

fn effective_zoning(
    project: &mut Project,
    fabric: &str,
    uri: &str,
    key: &str,
    effective: Node,
) -> FcdbResult<usize> {
    let Node::Map(mut fields) = effective else {
        // No configuration is enabled.
        return Ok(0);
    };
    let enabled = fields.remove("enabled-zone").unwrap_or_default();
    let fab = project.add_fabric(fabric);
    if let Some(cfg) = fields.get("cfg-name").and_then(Node::as_str) {
        fab.eff_zonecfg = Some(cfg.to_string());
    }
    for (i, entry) in enabled.as_items().iter().enumerate() {
        let zone = fab.add_eff_zone(&entry_key(entry, "zone-name", uri, i)?);
        zone.zone_type = zone_type(entry, uri)?;
        let (members, pmembers) = zone_members(entry);
        zone.add_members(members);
        zone.add_pmembers(pmembers);
    }
    store_fields(project, &EntityRef::Fabric(fabric.to_string()), key, Node::Map(fields))
}

fn maps_tables(
    project: &mut Project,
    switch: &str,
    uri: &str,
    kind: UriKind,
    container: &Node,
) -> FcdbResult<usize> {
    let mut conflicts = Vec::new();
    for (i, entry) in container.as_items().iter().enumerate() {
        let name = entry_key(entry, "name", uri, i)?;
        let sw = project.add_switch(switch, None);
        let result = match kind {
            UriKind::MapsGroups => sw.set_maps_group(&name, entry.clone()),
            _ => sw.set_maps_rule(&name, entry.clone()),
        };
        if let Err(c) = result {
            conflicts.extend(c);
        }
    }
    let target = EntityRef::Switch(switch.to_string());
    for conflict in &conflicts {
        warn!(switch, "{}", conflict);
        project.add_alert(
            &target,
            AlertCode::AttrConflict,
            AlertParams::new()
                .p0(conflict.path.as_str())
                .p1(format!("kept {}, ignored {}", conflict.existing, conflict.incoming)),
        )?;
    }
    Ok(conflicts.len())
}

/// One scope of a capture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureScope {
    #[serde(flatten)]
    pub scope: Scope,
    /// Response payload per URI.
    #[serde(default)]
    pub responses: BTreeMap<String, Node>,
}

/// Telemetry recorded from earlier API sessions.
///
/// ```json
/// { "scopes": [ { "chassis": "...", "switch": "...", "responses": { "uri": {} } } ] }
/// ```
///
/// A response of the form `{"errors": {"status": 404, "message": "..."}}`
/// replays a failed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureSource {
    #[serde(default)]
    pub scopes: Vec<CaptureScope>,
}

impl CaptureSource {
    pub fn from_json(content: &str) -> FcdbResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> FcdbResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FcdbError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Applies every recorded response, scope by scope.
    pub fn ingest(&self, ingestor: &Ingestor, project: &mut Project) -> IngestSummary {
        let mut total = IngestSummary::default();
        for capture in &self.scopes {
            let uris: Vec<String> = capture.responses.keys().cloned().collect();
            let summary = ingestor.collect(project, self, &capture.scope, &uris);
            total.applied += summary.applied;
            total.failed += summary.failed;
            total.conflicts += summary.conflicts;
        }
        total
    }
}

impl TelemetrySource for CaptureSource {
    fn fetch(&self, uri: &str, scope: &Scope) -> Result<Node, FetchError> {
        let payload = self
            .scopes
            .iter()
            .filter(|c| &c.scope == scope)
            .find_map(|c| c.responses.get(uri))
            .ok_or_else(|| FetchError::NotAvailable {
                uri: uri.to_string(),
                scope: scope.to_string(),
            })?;
        match payload.child("errors") {
            Some(errors) => Err(FetchError::Status {
                uri: uri.to_string(),
                status: errors
                    .child("status")
                    .and_then(Node::as_i64)
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or(400),
                message: errors
                    .child("message")
                    .and_then(Node::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            None => Ok(payload.clone()),
        }
    }
}
