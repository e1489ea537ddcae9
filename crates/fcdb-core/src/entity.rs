//! Entity records.
//!
//! - [`EntityKind`] - closed set of entity kinds and the reserved keys each answers
//! - [`EntityRef`] - typed natural key of an entity, including its owner's key
//! - [`Record`] - identity, attribute store and alerts shared by every entity
//! - [`Entity`] - accessor trait implemented by every typed record
//!
//! Entities never hold pointers to their owners. An [`EntityRef`] carries the
//! owner's key and the [`crate::Project`] resolves it.

use crate::alert::AlertRecord;
use crate::node::{split_path, Node};
use crate::paths;
use crate::reserved::ReservedKey;
use crate::store::{AttributeStore, Conflict};
use fcdb_types::{SpeedGen, ZoneType};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Project,
    Chassis,
    Switch,
    Port,
    Fabric,
    Zone,
    ZoneCfg,
    Alias,
    Login,
    FdmiNode,
    FdmiPort,
    Iocp,
}

use crate::reserved::ReservedKey as R;

const COMMON: [ReservedKey; 4] = [R::ObjKey, R::Kind, R::ProjectKey, R::Alerts];

const PROJECT_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::Flags,
    R::Date,
    R::Description,
    R::ChassisKeys,
    R::SwitchKeys,
    R::FabricKeys,
    R::IocpKeys,
];
const CHASSIS_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::SwitchKeys,
];
const SWITCH_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::ChassisKey,
    R::FabricKey,
    R::PortKeys,
    R::GePortKeys,
    R::MapsRules,
    R::MapsGroups,
];
const PORT_KEYS: &[ReservedKey] = &[R::ObjKey, R::Kind, R::ProjectKey, R::Alerts, R::ParentKey];
const FABRIC_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::SwitchKeys,
    R::ZoneKeys,
    R::EffZoneKeys,
    R::ZoneCfgKeys,
    R::EffZoneCfg,
    R::AliasKeys,
    R::LoginKeys,
    R::FdmiNodeKeys,
    R::FdmiPortKeys,
    R::BaseLogins,
];
const ZONE_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::FabricKey,
    R::Members,
    R::PrincipalMembers,
    R::ZoneType,
];
const MEMBER_LIST_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::FabricKey,
    R::Members,
];
const FABRIC_CHILD_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::FabricKey,
];
const IOCP_KEYS: &[ReservedKey] = &[
    R::ObjKey,
    R::Kind,
    R::ProjectKey,
    R::Alerts,
    R::ParentKey,
    R::ControlUnits,
    R::Paths,
];

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Chassis => "chassis",
            EntityKind::Switch => "switch",
            EntityKind::Port => "port",
            EntityKind::Fabric => "fabric",
            EntityKind::Zone => "zone",
            EntityKind::ZoneCfg => "zonecfg",
            EntityKind::Alias => "alias",
            EntityKind::Login => "login",
            EntityKind::FdmiNode => "fdmi-node",
            EntityKind::FdmiPort => "fdmi-port",
            EntityKind::Iocp => "iocp",
        }
    }

    /// Reserved keys answered by entities of this kind.
    pub const fn reserved_keys(&self) -> &'static [ReservedKey] {
        match self {
            EntityKind::Project => PROJECT_KEYS,
            EntityKind::Chassis => CHASSIS_KEYS,
            EntityKind::Switch => SWITCH_KEYS,
            EntityKind::Port => PORT_KEYS,
            EntityKind::Fabric => FABRIC_KEYS,
            EntityKind::Zone => ZONE_KEYS,
            EntityKind::ZoneCfg | EntityKind::Alias => MEMBER_LIST_KEYS,
            EntityKind::Login | EntityKind::FdmiNode | EntityKind::FdmiPort => FABRIC_CHILD_KEYS,
            EntityKind::Iocp => IOCP_KEYS,
        }
    }

    pub fn answers(&self, key: ReservedKey) -> bool {
        COMMON.contains(&key) || self.reserved_keys().contains(&key)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(EntityKind::Project),
            "chassis" => Ok(EntityKind::Chassis),
            "switch" => Ok(EntityKind::Switch),
            "port" => Ok(EntityKind::Port),
            "fabric" => Ok(EntityKind::Fabric),
            "zone" => Ok(EntityKind::Zone),
            "zonecfg" | "zone-cfg" => Ok(EntityKind::ZoneCfg),
            "alias" => Ok(EntityKind::Alias),
            "login" => Ok(EntityKind::Login),
            "fdmi-node" | "fdmi_node" => Ok(EntityKind::FdmiNode),
            "fdmi-port" | "fdmi_port" => Ok(EntityKind::FdmiPort),
            "iocp" => Ok(EntityKind::Iocp),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Typed natural key of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Project,
    Chassis(String),
    Switch(String),
    Port { switch: String, port: String },
    GePort { switch: String, port: String },
    Fabric(String),
    Zone { fabric: String, name: String },
    EffZone { fabric: String, name: String },
    ZoneCfg { fabric: String, name: String },
    Alias { fabric: String, name: String },
    Login { fabric: String, wwn: String },
    FdmiNode { fabric: String, wwn: String },
    FdmiPort { fabric: String, wwn: String },
    Iocp(String),
}

impl EntityRef {
    pub fn port(switch: impl Into<String>, port: impl Into<String>) -> Self {
        EntityRef::Port {
            switch: switch.into(),
            port: port.into(),
        }
    }

    pub fn zone(fabric: impl Into<String>, name: impl Into<String>) -> Self {
        EntityRef::Zone {
            fabric: fabric.into(),
            name: name.into(),
        }
    }

    pub fn alias(fabric: impl Into<String>, name: impl Into<String>) -> Self {
        EntityRef::Alias {
            fabric: fabric.into(),
            name: name.into(),
        }
    }

    pub fn zonecfg(fabric: impl Into<String>, name: impl Into<String>) -> Self {
        EntityRef::ZoneCfg {
            fabric: fabric.into(),
            name: name.into(),
        }
    }

    pub fn login(fabric: impl Into<String>, wwn: impl Into<String>) -> Self {
        EntityRef::Login {
            fabric: fabric.into(),
            wwn: wwn.into(),
        }
    }

    pub const fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Project => EntityKind::Project,
            EntityRef::Chassis(_) => EntityKind::Chassis,
            EntityRef::Switch(_) => EntityKind::Switch,
            EntityRef::Port { .. } | EntityRef::GePort { .. } => EntityKind::Port,
            EntityRef::Fabric(_) => EntityKind::Fabric,
            EntityRef::Zone { .. } | EntityRef::EffZone { .. } => EntityKind::Zone,
            EntityRef::ZoneCfg { .. } => EntityKind::ZoneCfg,
            EntityRef::Alias { .. } => EntityKind::Alias,
            EntityRef::Login { .. } => EntityKind::Login,
            EntityRef::FdmiNode { .. } => EntityKind::FdmiNode,
            EntityRef::FdmiPort { .. } => EntityKind::FdmiPort,
            EntityRef::Iocp(_) => EntityKind::Iocp,
        }
    }

    /// Key within the owning collection. The project's key is empty.
    pub fn key(&self) -> &str {
        match self {
            EntityRef::Project => "",
            EntityRef::Chassis(k)
            | EntityRef::Switch(k)
            | EntityRef::Fabric(k)
            | EntityRef::Iocp(k) => k,
            EntityRef::Port { port, .. } | EntityRef::GePort { port, .. } => port,
            EntityRef::Zone { name, .. }
            | EntityRef::EffZone { name, .. }
            | EntityRef::ZoneCfg { name, .. }
            | EntityRef::Alias { name, .. } => name,
            EntityRef::Login { wwn, .. }
            | EntityRef::FdmiNode { wwn, .. }
            | EntityRef::FdmiPort { wwn, .. } => wwn,
        }
    }

    /// Key of the owning fabric for fabric scoped entities.
    pub fn fabric_key(&self) -> Option<&str> {
        match self {
            EntityRef::Zone { fabric, .. }
            | EntityRef::EffZone { fabric, .. }
            | EntityRef::ZoneCfg { fabric, .. }
            | EntityRef::Alias { fabric, .. }
            | EntityRef::Login { fabric, .. }
            | EntityRef::FdmiNode { fabric, .. }
            | EntityRef::FdmiPort { fabric, .. } => Some(fabric),
            EntityRef::Fabric(k) => Some(k),
            _ => None,
        }
    }

    /// Reference to the owning entity.
    pub fn parent(&self) -> Option<EntityRef> {
        match self {
            EntityRef::Project => None,
            EntityRef::Chassis(_)
            | EntityRef::Switch(_)
            | EntityRef::Fabric(_)
            | EntityRef::Iocp(_) => Some(EntityRef::Project),
            EntityRef::Port { switch, .. } | EntityRef::GePort { switch, .. } => {
                Some(EntityRef::Switch(switch.clone()))
            }
            EntityRef::Zone { fabric, .. }
            | EntityRef::EffZone { fabric, .. }
            | EntityRef::ZoneCfg { fabric, .. }
            | EntityRef::Alias { fabric, .. }
            | EntityRef::Login { fabric, .. }
            | EntityRef::FdmiNode { fabric, .. }
            | EntityRef::FdmiPort { fabric, .. } => Some(EntityRef::Fabric(fabric.clone())),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Project => write!(f, "project"),
            EntityRef::Port { switch, port } => write!(f, "port {} {}", switch, port),
            EntityRef::GePort { switch, port } => write!(f, "ge-port {} {}", switch, port),
            EntityRef::EffZone { fabric, name } => {
                write!(f, "effective zone {} in fabric {}", name, fabric)
            }
            other => match other.fabric_key() {
                Some(fab) if other.kind() != EntityKind::Fabric => {
                    write!(f, "{} {} in fabric {}", other.kind(), other.key(), fab)
                }
                _ => write!(f, "{} {}", other.kind(), other.key()),
            },
        }
    }
}

/// State common to every entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: EntityRef,
    /// Name of the owning project.
    pub project: String,
    pub store: AttributeStore,
    pub alerts: Vec<AlertRecord>,
}

impl Record {
    pub fn new(id: EntityRef, project: impl Into<String>) -> Self {
        Self {
            id,
            project: project.into(),
            store: AttributeStore::new(),
            alerts: Vec::new(),
        }
    }

    /// Appends an alert. Returns false if an identical alert is already attached.
    pub fn add_alert(&mut self, alert: AlertRecord) -> bool {
        if self.alerts.contains(&alert) {
            return false;
        }
        self.alerts.push(alert);
        true
    }
}

/// Accessors shared by every entity.
pub trait Entity {
    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// Value of a kind specific reserved key.
    fn reserved_value(&self, _key: ReservedKey) -> Option<Node> {
        None
    }

    fn id(&self) -> &EntityRef {
        &self.record().id
    }

    fn kind(&self) -> EntityKind {
        self.id().kind()
    }

    fn key(&self) -> &str {
        self.id().key()
    }

    fn attrs(&self) -> &AttributeStore {
        &self.record().store
    }

    fn alerts(&self) -> &[AlertRecord] {
        &self.record().alerts
    }

    /// Dynamic (non-reserved) top level keys.
    fn keys(&self) -> Vec<&str> {
        self.attrs().keys().collect()
    }

    /// Value of a reserved key, or `None` if this kind does not answer it.
    fn reserved(&self, key: ReservedKey) -> Option<Node> {
        if !self.kind().answers(key) {
            return None;
        }
        let rec = self.record();
        match key {
            ReservedKey::ObjKey => Some(Node::str(self.key())),
            ReservedKey::Kind => Some(Node::str(rec.id.kind().as_str())),
            ReservedKey::ProjectKey => Some(Node::str(rec.project.as_str())),
            ReservedKey::ParentKey => rec.id.parent().map(|p| Node::str(p.key())),
            ReservedKey::Alerts => Some(Node::List(
                rec.alerts.iter().map(|a| Node::str(a.message.as_str())).collect(),
            )),
            ReservedKey::FabricKey => match rec.id {
                EntityRef::Fabric(_) => self.reserved_value(key),
                ref id => id
                    .fabric_key()
                    .map(Node::str)
                    .or_else(|| self.reserved_value(key)),
            },
            _ => self.reserved_value(key),
        }
    }

    /// Value at `path`. A reserved first segment is answered by [`Entity::reserved`].
    fn get(&self, path: &str) -> Option<Cow<'_, Node>> {
        let mut segments = split_path(path);
        let first = segments.next()?;
        match ReservedKey::lookup(first) {
            Some(key) => {
                let node = self.reserved(key)?;
                let rest: Vec<&str> = segments.collect();
                if rest.is_empty() {
                    Some(Cow::Owned(node))
                } else {
                    node.lookup(&rest.join("/")).cloned().map(Cow::Owned)
                }
            }
            None => self.attrs().get(path).map(Cow::Borrowed),
        }
    }

    /// String value at `path`.
    fn get_str(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|n| n.as_str().map(str::to_string))
    }
}

pub(crate) fn key_list<'a>(keys: impl Iterator<Item = &'a String>) -> Node {
    Node::List(keys.map(|k| Node::str(k.as_str())).collect())
}

fn member_list(members: &[String]) -> Node {
    key_list(members.iter())
}

/// Appends the members not already present. Returns the number added.
fn append_unique(list: &mut Vec<String>, members: impl IntoIterator<Item = String>) -> usize {
    let before = list.len();
    for m in members {
        if !list.contains(&m) {
            list.push(m);
        }
    }
    list.len() - before
}

/// A chassis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChassisObj {
    pub rec: Record,
    pub switch_keys: Vec<String>,
}

impl ChassisObj {
    pub fn new(wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::Chassis(wwn.into()), project),
            switch_keys: Vec::new(),
        }
    }

    pub fn add_switch_key(&mut self, wwn: impl Into<String>) {
        append_unique(&mut self.switch_keys, [wwn.into()]);
    }
}

impl Entity for ChassisObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::SwitchKeys => Some(member_list(&self.switch_keys)),
            _ => None,
        }
    }
}

/// A logical switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchObj {
    pub rec: Record,
    pub chassis_key: Option<String>,
    pub fabric_key: Option<String>,
    pub ports: BTreeMap<String, PortObj>,
    pub ge_ports: BTreeMap<String, PortObj>,
    /// MAPS rules by rule name.
    pub maps_rules: AttributeStore,
    /// MAPS groups by group name.
    pub maps_groups: AttributeStore,
}

impl SwitchObj {
    pub fn new(wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::Switch(wwn.into()), project),
            chassis_key: None,
            fabric_key: None,
            ports: BTreeMap::new(),
            ge_ports: BTreeMap::new(),
            maps_rules: AttributeStore::new(),
            maps_groups: AttributeStore::new(),
        }
    }

    /// Gets or creates an FC port.
    pub fn add_port(&mut self, port: &str) -> &mut PortObj {
        let switch = self.rec.id.key().to_string();
        let project = self.rec.project.clone();
        self.ports
            .entry(port.to_string())
            .or_insert_with(|| PortObj::new(EntityRef::port(switch, port), project))
    }

    /// Gets or creates a GE port.
    pub fn add_ge_port(&mut self, port: &str) -> &mut PortObj {
        let switch = self.rec.id.key().to_string();
        let project = self.rec.project.clone();
        self.ge_ports.entry(port.to_string()).or_insert_with(|| {
            PortObj::new(
                EntityRef::GePort {
                    switch,
                    port: port.to_string(),
                },
                project,
            )
        })
    }

    pub fn set_maps_rule(&mut self, name: &str, rule: Node) -> Result<(), Vec<Conflict>> {
        self.maps_rules.set(name, rule, false)
    }

    pub fn set_maps_group(&mut self, name: &str, group: Node) -> Result<(), Vec<Conflict>> {
        self.maps_groups.set(name, group, false)
    }

    /// Fabric domain ID.
    pub fn did(&self) -> Option<i64> {
        self.rec
            .store
            .get(paths::SWITCH_DID)
            .or_else(|| self.rec.store.get(paths::FABRIC_SWITCH_DID))
            .and_then(Node::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.rec
            .store
            .get(paths::SWITCH_NAME)
            .or_else(|| self.rec.store.get(paths::FABRIC_SWITCH_NAME))
            .and_then(Node::as_str)
    }

    /// True if the switch reported itself as the fabric principal.
    pub fn is_principal(&self) -> bool {
        match self.rec.store.get(paths::SWITCH_PRINCIPAL) {
            Some(n) => n.as_bool().unwrap_or_else(|| n.as_i64() == Some(1)),
            None => false,
        }
    }

    /// Port whose `fibrechannel/index` equals `index`.
    pub fn port_for_index(&self, index: i64) -> Option<&PortObj> {
        self.ports.values().find(|p| p.index() == Some(index))
    }
}

impl Entity for SwitchObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::ChassisKey => self.chassis_key.as_deref().map(Node::str),
            ReservedKey::FabricKey => self.fabric_key.as_deref().map(Node::str),
            ReservedKey::PortKeys => Some(key_list(self.ports.keys())),
            ReservedKey::GePortKeys => Some(key_list(self.ge_ports.keys())),
            ReservedKey::MapsRules => Some(Node::Map(self.maps_rules.as_map().clone())),
            ReservedKey::MapsGroups => Some(Node::Map(self.maps_groups.as_map().clone())),
            _ => None,
        }
    }
}

/// A switch port (FC or GE).
#[derive(Debug, Clone, PartialEq)]
pub struct PortObj {
    pub rec: Record,
}

impl PortObj {
    pub fn new(id: EntityRef, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(id, project),
        }
    }

    pub fn index(&self) -> Option<i64> {
        self.rec.store.get(paths::FC_INDEX).and_then(Node::as_i64)
    }

    /// Login speed generation, from `fibrechannel/speed` in bits per second.
    pub fn speed(&self) -> Option<SpeedGen> {
        self.rec
            .store
            .get(paths::FC_SPEED)
            .and_then(Node::as_i64)
            .and_then(|bps| u64::try_from(bps).ok())
            .and_then(SpeedGen::from_bps)
    }

    /// WWNs logged in on this port, base login first.
    pub fn login_wwns(&self) -> Vec<String> {
        self.rec
            .store
            .get(paths::FC_NEIGHBOR_WWN)
            .map(Node::string_list)
            .unwrap_or_default()
    }
}

impl Entity for PortObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }
}

/// A defined or effective zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneObj {
    pub rec: Record,
    pub zone_type: ZoneType,
    /// Non-principal members as entered: WWNs, d,i or alias names.
    pub members: Vec<String>,
    /// Principal members of a peer zone.
    pub pmembers: Vec<String>,
}

impl ZoneObj {
    pub fn new(id: EntityRef, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(id, project),
            zone_type: ZoneType::Standard,
            members: Vec::new(),
            pmembers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.rec.id.key()
    }

    pub fn is_peer(&self) -> bool {
        self.zone_type.is_peer()
    }

    pub fn is_effective(&self) -> bool {
        matches!(self.rec.id, EntityRef::EffZone { .. })
    }

    pub fn add_members(&mut self, members: impl IntoIterator<Item = String>) -> usize {
        append_unique(&mut self.members, members)
    }

    pub fn add_pmembers(&mut self, members: impl IntoIterator<Item = String>) -> usize {
        append_unique(&mut self.pmembers, members)
    }

    /// Principal members followed by non-principal members.
    pub fn all_members(&self) -> impl Iterator<Item = &String> {
        self.pmembers.iter().chain(self.members.iter())
    }

    pub fn has_member(&self, mem: &str) -> bool {
        self.all_members().any(|m| m == mem)
    }
}

impl Entity for ZoneObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::Members => Some(member_list(&self.members)),
            ReservedKey::PrincipalMembers => Some(member_list(&self.pmembers)),
            ReservedKey::ZoneType => Some(Node::from(i64::from(self.zone_type.as_u8()))),
            _ => None,
        }
    }
}

/// A zone configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCfgObj {
    pub rec: Record,
    /// Zone names.
    pub members: Vec<String>,
}

impl ZoneCfgObj {
    pub fn new(fabric: impl Into<String>, name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::zonecfg(fabric, name), project),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.rec.id.key()
    }

    pub fn add_members(&mut self, members: impl IntoIterator<Item = String>) -> usize {
        append_unique(&mut self.members, members)
    }
}

impl Entity for ZoneCfgObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::Members => Some(member_list(&self.members)),
            _ => None,
        }
    }
}

/// A zone alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasObj {
    pub rec: Record,
    /// WWN or d,i members.
    pub members: Vec<String>,
}

impl AliasObj {
    pub fn new(fabric: impl Into<String>, name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::alias(fabric, name), project),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.rec.id.key()
    }

    pub fn add_members(&mut self, members: impl IntoIterator<Item = String>) -> usize {
        append_unique(&mut self.members, members)
    }
}

impl Entity for AliasObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::Members => Some(member_list(&self.members)),
            _ => None,
        }
    }
}

/// A name server login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginObj {
    pub rec: Record,
}

impl LoginObj {
    pub fn new(fabric: impl Into<String>, wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::login(fabric, wwn), project),
        }
    }

    pub fn wwn(&self) -> &str {
        self.rec.id.key()
    }

    pub fn fc4_features(&self) -> Option<&str> {
        self.rec.store.get(paths::NS_FC4_FEATURES).and_then(Node::as_str)
    }

    pub fn port_properties(&self) -> Option<&str> {
        self.rec
            .store
            .get(paths::NS_PORT_PROPERTIES)
            .and_then(Node::as_str)
    }

    /// Initiator only device.
    pub fn is_initiator(&self) -> bool {
        self.fc4_features().map_or(false, |f| {
            let f = f.to_lowercase();
            f.contains("initiator") && !f.contains("target")
        })
    }

    /// Device advertising the target role.
    pub fn is_target(&self) -> bool {
        self.fc4_features()
            .map_or(false, |f| f.to_lowercase().contains("target"))
    }
}

impl Entity for LoginObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }
}

/// An FDMI HBA (node) entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmiNodeObj {
    pub rec: Record,
}

impl FdmiNodeObj {
    pub fn new(fabric: impl Into<String>, wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(
                EntityRef::FdmiNode {
                    fabric: fabric.into(),
                    wwn: wwn.into(),
                },
                project,
            ),
        }
    }
}

impl Entity for FdmiNodeObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }
}

/// An FDMI port entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmiPortObj {
    pub rec: Record,
}

impl FdmiPortObj {
    pub fn new(fabric: impl Into<String>, wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(
                EntityRef::FdmiPort {
                    fabric: fabric.into(),
                    wwn: wwn.into(),
                },
                project,
            ),
        }
    }
}

impl Entity for FdmiPortObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }
}

/// Mainframe I/O configuration of one CEC.
#[derive(Debug, Clone, PartialEq)]
pub struct IocpObj {
    pub rec: Record,
    /// Control unit definitions by control unit number.
    pub control_units: AttributeStore,
    /// CHPID paths by CHPID tag.
    pub paths: AttributeStore,
}

impl IocpObj {
    pub fn new(serial: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::Iocp(serial.into()), project),
            control_units: AttributeStore::new(),
            paths: AttributeStore::new(),
        }
    }

    pub fn set_control_unit(&mut self, cu: &str, value: Node) -> Result<(), Vec<Conflict>> {
        self.control_units.set(cu, value, false)
    }

    pub fn set_path(&mut self, chpid: &str, value: Node) -> Result<(), Vec<Conflict>> {
        self.paths.set(chpid, value, false)
    }
}

impl Entity for IocpObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::ControlUnits => Some(Node::Map(self.control_units.as_map().clone())),
            ReservedKey::Paths => Some(Node::Map(self.paths.as_map().clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SW: &str = "10:00:00:05:1e:00:00:01";
    const FAB: &str = "10:00:00:05:1e:00:00:99";

    #[test]
    fn test_reserved_dispatch() {
        let mut zone = ZoneObj::new(EntityRef::zone(FAB, "z1"), "p");
        zone.zone_type = ZoneType::UserPeer;
        zone.add_members(["a".to_string(), "b".to_string(), "a".to_string()]);
        zone.add_pmembers(["p1".to_string()]);

        assert_eq!(zone.get("_obj_key").unwrap().as_str(), Some("z1"));
        assert_eq!(zone.get("_fabric_key").unwrap().as_str(), Some(FAB));
        assert_eq!(zone.get("_parent_key").unwrap().as_str(), Some(FAB));
        assert_eq!(zone.get("_members").unwrap().string_list(), vec!["a", "b"]);
        assert_eq!(zone.get("_pmembers").unwrap().string_list(), vec!["p1"]);
        assert_eq!(zone.get("_zone_type").unwrap().as_i64(), Some(1));
        // Switch only keys are not answered by zones.
        assert!(zone.get("_port_keys").is_none());
    }

    #[test]
    fn test_get_dynamic_path() {
        let mut sw = SwitchObj::new(SW, "p");
        let port = sw.add_port("0/1");
        port.rec
            .store
            .set(
                "fibrechannel",
                Node::from(json!({"index": 1, "speed": 16_000_000_000_i64})),
                false,
            )
            .unwrap();
        assert_eq!(port.index(), Some(1));
        assert_eq!(port.speed(), Some(SpeedGen::G16));
        assert!(port.get("fibrechannel/missing").is_none());
        assert!(sw.port_for_index(1).is_some());
        assert_eq!(
            sw.get("_port_keys").unwrap().string_list(),
            vec!["0/1".to_string()]
        );
        assert_eq!(sw.ports["0/1"].get("_parent_key").unwrap().as_str(), Some(SW));
    }

    #[test]
    fn test_add_port_is_idempotent() {
        let mut sw = SwitchObj::new(SW, "p");
        sw.add_port("0/1").rec.store.set("x", Node::from(1_i64), false).unwrap();
        sw.add_port("0/1");
        assert_eq!(sw.ports.len(), 1);
        assert!(sw.ports["0/1"].attrs().contains("x"));
    }

    #[test]
    fn test_switch_did_fallback_and_principal() {
        let mut sw = SwitchObj::new(SW, "p");
        assert_eq!(sw.did(), None);
        sw.rec
            .store
            .set(paths::FABRIC_SWITCH_DID, Node::from(3_i64), false)
            .unwrap();
        assert_eq!(sw.did(), Some(3));
        assert!(!sw.is_principal());
        sw.rec
            .store
            .set(paths::SWITCH_PRINCIPAL, Node::from(1_i64), false)
            .unwrap();
        assert!(sw.is_principal());
    }

    #[test]
    fn test_login_roles() {
        let mut login = LoginObj::new(FAB, "10:00:00:00:c9:00:00:01", "p");
        login
            .rec
            .store
            .set(paths::NS_FC4_FEATURES, Node::str("FCP-Initiator"), false)
            .unwrap();
        assert!(login.is_initiator());
        assert!(!login.is_target());

        let mut both = LoginObj::new(FAB, "10:00:00:00:c9:00:00:02", "p");
        both.rec
            .store
            .set(paths::NS_FC4_FEATURES, Node::str("FCP-Target FCP-Initiator"), false)
            .unwrap();
        assert!(!both.is_initiator());
        assert!(both.is_target());
    }

    #[test]
    fn test_entity_ref_parent_and_display() {
        let port = EntityRef::port(SW, "0/1");
        assert_eq!(port.parent(), Some(EntityRef::Switch(SW.to_string())));
        assert_eq!(port.kind(), EntityKind::Port);
        assert_eq!(EntityRef::Project.parent(), None);
        assert_eq!(
            EntityRef::alias(FAB, "host_a").to_string(),
            format!("alias host_a in fabric {}", FAB)
        );
        assert_eq!(EntityRef::Fabric(FAB.into()).to_string(), format!("fabric {}", FAB));
    }

    #[test]
    fn test_duplicate_alert_not_added() {
        use crate::alert::{AlertCode, AlertParams, AlertTable};
        let table = AlertTable::builtin();
        let mut rec = Record::new(EntityRef::Chassis("c".into()), "p");
        let alert = AlertRecord::new(&table, AlertCode::ZoneNotUsed, AlertParams::new());
        assert!(rec.add_alert(alert.clone()));
        assert!(!rec.add_alert(alert));
        assert_eq!(rec.alerts.len(), 1);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("ZoneCfg".parse::<EntityKind>().unwrap(), EntityKind::ZoneCfg);
        assert!("nonsense".parse::<EntityKind>().is_err());
    }
}
