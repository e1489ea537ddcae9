//! Fabric entity and zoning database lookups.

use crate::entity::{
    key_list, AliasObj, Entity, EntityRef, FdmiNodeObj, FdmiPortObj, LoginObj, Record, ZoneCfgObj, ZoneObj,
};
use crate::node::Node;
use crate::paths;
use crate::reserved::ReservedKey;
use fcdb_types::{DomainIndex, Wwn};
use std::collections::{BTreeMap, BTreeSet};

/// Role filter for [`FabricObj::eff_zoned_to_wwn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonedRole {
    /// Every zoned member.
    Any,
    /// Logins whose FC-4 features name the initiator role.
    Initiator,
    /// Logins whose FC-4 features name the target role.
    Target,
}

/// A fabric, keyed by the WWN of its principal switch.
#[derive(Debug, Clone, PartialEq)]
pub struct FabricObj {
    pub rec: Record,
    pub switch_keys: Vec<String>,
    /// Defined zones.
    pub zones: BTreeMap<String, ZoneObj>,
    /// Zones of the effective configuration.
    pub eff_zones: BTreeMap<String, ZoneObj>,
    pub zonecfgs: BTreeMap<String, ZoneCfgObj>,
    /// Name of the enabled zone configuration.
    pub eff_zonecfg: Option<String>,
    pub aliases: BTreeMap<String, AliasObj>,
    pub logins: BTreeMap<String, LoginObj>,
    pub fdmi_nodes: BTreeMap<String, FdmiNodeObj>,
    pub fdmi_ports: BTreeMap<String, FdmiPortObj>,
    /// WWNs of base (physical port) logins.
    pub base_logins: BTreeSet<String>,
}

impl FabricObj {
    pub fn new(wwn: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            rec: Record::new(EntityRef::Fabric(wwn.into()), project),
            switch_keys: Vec::new(),
            zones: BTreeMap::new(),
            eff_zones: BTreeMap::new(),
            zonecfgs: BTreeMap::new(),
            eff_zonecfg: None,
            aliases: BTreeMap::new(),
            logins: BTreeMap::new(),
            fdmi_nodes: BTreeMap::new(),
            fdmi_ports: BTreeMap::new(),
            base_logins: BTreeSet::new(),
        }
    }

    pub fn wwn(&self) -> &str {
        self.rec.id.key()
    }

    fn project(&self) -> String {
        self.rec.project.clone()
    }

    pub fn add_switch_key(&mut self, wwn: impl Into<String>) {
        let wwn = wwn.into();
        if !self.switch_keys.contains(&wwn) {
            self.switch_keys.push(wwn);
        }
    }

    pub fn add_zone(&mut self, name: &str) -> &mut ZoneObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.zones
            .entry(name.to_string())
            .or_insert_with(|| ZoneObj::new(EntityRef::zone(fabric, name), project))
    }

    pub fn add_eff_zone(&mut self, name: &str) -> &mut ZoneObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.eff_zones.entry(name.to_string()).or_insert_with(|| {
            ZoneObj::new(
                EntityRef::EffZone {
                    fabric,
                    name: name.to_string(),
                },
                project,
            )
        })
    }

    pub fn add_zonecfg(&mut self, name: &str) -> &mut ZoneCfgObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.zonecfgs
            .entry(name.to_string())
            .or_insert_with(|| ZoneCfgObj::new(fabric, name, project))
    }

    pub fn add_alias(&mut self, name: &str) -> &mut AliasObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.aliases
            .entry(name.to_string())
            .or_insert_with(|| AliasObj::new(fabric, name, project))
    }

    pub fn add_login(&mut self, wwn: &str) -> &mut LoginObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.logins
            .entry(wwn.to_string())
            .or_insert_with(|| LoginObj::new(fabric, wwn, project))
    }

    pub fn add_fdmi_node(&mut self, wwn: &str) -> &mut FdmiNodeObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.fdmi_nodes
            .entry(wwn.to_string())
            .or_insert_with(|| FdmiNodeObj::new(fabric, wwn, project))
    }

    pub fn add_fdmi_port(&mut self, wwn: &str) -> &mut FdmiPortObj {
        let (fabric, project) = (self.wwn().to_string(), self.project());
        self.fdmi_ports
            .entry(wwn.to_string())
            .or_insert_with(|| FdmiPortObj::new(fabric, wwn, project))
    }

    /// Name of the enabled zone configuration.
    pub fn eff_zonecfg_name(&self) -> Option<&str> {
        self.eff_zonecfg.as_deref().or_else(|| {
            self.rec
                .store
                .get(paths::EFF_CFG_NAME)
                .and_then(Node::as_str)
        })
    }

    /// User friendly fabric name, if one was reported.
    pub fn name(&self) -> Option<&str> {
        [paths::FABRIC_NAME, paths::LS_FABRIC_NAME]
            .iter()
            .find_map(|p| self.rec.store.get(p).and_then(Node::as_str))
            .filter(|s| !s.is_empty())
    }

    pub fn is_base_login(&self, wwn: &str) -> bool {
        self.base_logins.contains(wwn)
    }

    /// Aliases whose members include `wwn`.
    pub fn aliases_for_wwn(&self, wwn: &str) -> Vec<&str> {
        self.aliases
            .values()
            .filter(|a| a.members.iter().any(|m| m == wwn))
            .map(AliasObj::name)
            .collect()
    }

    /// Defined zones that name `alias` as a member.
    pub fn zones_for_alias(&self, alias: &str) -> Vec<&str> {
        self.zones
            .values()
            .filter(|z| z.has_member(alias))
            .map(ZoneObj::name)
            .collect()
    }

    /// Defined zones containing `wwn` directly or through an alias.
    pub fn zones_for_wwn(&self, wwn: &str) -> Vec<&str> {
        let aliases = self.aliases_for_wwn(wwn);
        self.zones
            .values()
            .filter(|z| z.all_members().any(|m| m == wwn || aliases.contains(&m.as_str())))
            .map(ZoneObj::name)
            .collect()
    }

    /// Defined zones containing the d,i member `domain,index` directly or
    /// through an alias.
    pub fn zones_for_di(&self, domain: u32, index: u32) -> Vec<&str> {
        let target = DomainIndex::new(domain, index);
        let is_target = |m: &String| m.parse::<DomainIndex>().map_or(false, |di| di == target);
        let aliases: Vec<&str> = self
            .aliases
            .values()
            .filter(|a| a.members.iter().any(is_target))
            .map(AliasObj::name)
            .collect();
        self.zones
            .values()
            .filter(|z| {
                z.all_members()
                    .any(|m| is_target(m) || aliases.contains(&m.as_str()))
            })
            .map(ZoneObj::name)
            .collect()
    }

    /// Effective zones containing `wwn`.
    pub fn eff_zones_for_wwn(&self, wwn: &str) -> Vec<&str> {
        self.eff_zones
            .values()
            .filter(|z| z.has_member(wwn))
            .map(ZoneObj::name)
            .collect()
    }

    /// Zone configurations that include `zone`.
    pub fn zonecfgs_for_zone(&self, zone: &str) -> Vec<&str> {
        self.zonecfgs
            .values()
            .filter(|c| c.members.iter().any(|m| m == zone))
            .map(ZoneCfgObj::name)
            .collect()
    }

    /// Members of `zone_members` with aliases replaced by their members.
    /// Undefined aliases are dropped.
    pub fn expand_aliases<'a>(&'a self, zone_members: &'a [String]) -> Vec<&'a str> {
        let mut out: Vec<&str> = Vec::new();
        for mem in zone_members {
            if Wwn::is_wwn(mem, false) || DomainIndex::is_di(mem) {
                out.push(mem);
            } else if let Some(alias) = self.aliases.get(mem) {
                out.extend(alias.members.iter().map(String::as_str));
            }
        }
        out
    }

    /// WWNs the effective zoning allows `wwn` to communicate with.
    ///
    /// A standard zone contributes all its members. In a peer zone a principal
    /// member sees the non-principal members and vice versa. `wwn` itself is
    /// excluded and each WWN is returned once, in first seen order.
    pub fn eff_zoned_to_wwn(&self, wwn: &str, role: ZonedRole) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for zone in self.eff_zones.values() {
            let candidates: Vec<&String> = if zone.is_peer() {
                if zone.pmembers.iter().any(|m| m == wwn) {
                    zone.members.iter().collect()
                } else if zone.members.iter().any(|m| m == wwn) {
                    zone.pmembers.iter().collect()
                } else {
                    continue;
                }
            } else if zone.members.iter().any(|m| m == wwn) {
                zone.members.iter().collect()
            } else {
                continue;
            };

            for mem in candidates {
                if mem == wwn || out.contains(mem) {
                    continue;
                }
                let keep = match role {
                    ZonedRole::Any => true,
                    ZonedRole::Initiator => self
                        .logins
                        .get(mem)
                        .map_or(false, LoginObj::is_initiator),
                    ZonedRole::Target => self.logins.get(mem).map_or(false, LoginObj::is_target),
                };
                if keep {
                    out.push(mem.clone());
                }
            }
        }
        out
    }
}

impl Entity for FabricObj {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::SwitchKeys => Some(key_list(self.switch_keys.iter())),
            ReservedKey::ZoneKeys => Some(key_list(self.zones.keys())),
            ReservedKey::EffZoneKeys => Some(key_list(self.eff_zones.keys())),
            ReservedKey::ZoneCfgKeys => Some(key_list(self.zonecfgs.keys())),
            ReservedKey::EffZoneCfg => self.eff_zonecfg_name().map(Node::str),
            ReservedKey::AliasKeys => Some(key_list(self.aliases.keys())),
            ReservedKey::LoginKeys => Some(key_list(self.logins.keys())),
            ReservedKey::FdmiNodeKeys => Some(key_list(self.fdmi_nodes.keys())),
            ReservedKey::FdmiPortKeys => Some(key_list(self.fdmi_ports.keys())),
            ReservedKey::BaseLogins => Some(key_list(self.base_logins.iter())),
            _ => None,
        }
    }
}
