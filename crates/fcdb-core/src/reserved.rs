//! Reserved key partition.
//!
//! Reserved keys name identity, parent links, owned collections and status
//! fields. They never live in an entity's attribute tree; `get` on a path
//! whose first segment is reserved is answered by the entity's typed
//! accessor, and `set` on one is rejected. Plain serialization only walks
//! the tree, so structural fields are never copied.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Version of the reserved key set. Bumped whenever a key is added or removed.
pub const RESERVED_KEYS_VERSION: u32 = 1;

/// A key answered by a typed accessor rather than the attribute tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReservedKey {
    ObjKey,
    Kind,
    ProjectKey,
    ParentKey,
    ChassisKey,
    FabricKey,
    Alerts,
    Flags,
    Date,
    Description,
    ChassisKeys,
    SwitchKeys,
    FabricKeys,
    IocpKeys,
    PortKeys,
    GePortKeys,
    MapsRules,
    MapsGroups,
    ZoneKeys,
    EffZoneKeys,
    ZoneCfgKeys,
    EffZoneCfg,
    AliasKeys,
    LoginKeys,
    FdmiNodeKeys,
    FdmiPortKeys,
    BaseLogins,
    Members,
    PrincipalMembers,
    ZoneType,
    ControlUnits,
    Paths,
}

const ALL: [ReservedKey; 32] = [
    ReservedKey::ObjKey,
    ReservedKey::Kind,
    ReservedKey::ProjectKey,
    ReservedKey::ParentKey,
    ReservedKey::ChassisKey,
    ReservedKey::FabricKey,
    ReservedKey::Alerts,
    ReservedKey::Flags,
    ReservedKey::Date,
    ReservedKey::Description,
    ReservedKey::ChassisKeys,
    ReservedKey::SwitchKeys,
    ReservedKey::FabricKeys,
    ReservedKey::IocpKeys,
    ReservedKey::PortKeys,
    ReservedKey::GePortKeys,
    ReservedKey::MapsRules,
    ReservedKey::MapsGroups,
    ReservedKey::ZoneKeys,
    ReservedKey::EffZoneKeys,
    ReservedKey::ZoneCfgKeys,
    ReservedKey::EffZoneCfg,
    ReservedKey::AliasKeys,
    ReservedKey::LoginKeys,
    ReservedKey::FdmiNodeKeys,
    ReservedKey::FdmiPortKeys,
    ReservedKey::BaseLogins,
    ReservedKey::Members,
    ReservedKey::PrincipalMembers,
    ReservedKey::ZoneType,
    ReservedKey::ControlUnits,
    ReservedKey::Paths,
];

static BY_NAME: Lazy<HashMap<&'static str, ReservedKey>> =
    Lazy::new(|| ALL.iter().map(|k| (k.as_str(), *k)).collect());

impl ReservedKey {
    /// Every reserved key.
    pub const fn all() -> &'static [ReservedKey] {
        &ALL
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservedKey::ObjKey => "_obj_key",
            ReservedKey::Kind => "_kind",
            ReservedKey::ProjectKey => "_project_key",
            ReservedKey::ParentKey => "_parent_key",
            ReservedKey::ChassisKey => "_chassis_key",
            ReservedKey::FabricKey => "_fabric_key",
            ReservedKey::Alerts => "_alerts",
            ReservedKey::Flags => "_flags",
            ReservedKey::Date => "_date",
            ReservedKey::Description => "_description",
            ReservedKey::ChassisKeys => "_chassis_keys",
            ReservedKey::SwitchKeys => "_switch_keys",
            ReservedKey::FabricKeys => "_fabric_keys",
            ReservedKey::IocpKeys => "_iocp_keys",
            ReservedKey::PortKeys => "_port_keys",
            ReservedKey::GePortKeys => "_ge_port_keys",
            ReservedKey::MapsRules => "_maps_rules",
            ReservedKey::MapsGroups => "_maps_groups",
            ReservedKey::ZoneKeys => "_zone_keys",
            ReservedKey::EffZoneKeys => "_eff_zone_keys",
            ReservedKey::ZoneCfgKeys => "_zonecfg_keys",
            ReservedKey::EffZoneCfg => "_eff_zonecfg",
            ReservedKey::AliasKeys => "_alias_keys",
            ReservedKey::LoginKeys => "_login_keys",
            ReservedKey::FdmiNodeKeys => "_fdmi_node_keys",
            ReservedKey::FdmiPortKeys => "_fdmi_port_keys",
            ReservedKey::BaseLogins => "_base_logins",
            ReservedKey::Members => "_members",
            ReservedKey::PrincipalMembers => "_pmembers",
            ReservedKey::ZoneType => "_zone_type",
            ReservedKey::ControlUnits => "_control_units",
            ReservedKey::Paths => "_paths",
        }
    }

    /// Returns the reserved key named by `segment`, if any.
    pub fn lookup(segment: &str) -> Option<ReservedKey> {
        BY_NAME.get(segment).copied()
    }

    /// Returns true if `segment` is a reserved key.
    pub fn is_reserved(segment: &str) -> bool {
        Self::lookup(segment).is_some()
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservedKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("not a reserved key: {}", s))
    }
}
