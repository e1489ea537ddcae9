//! Test fixtures for common fabric scenarios
//!
//! [`FabricBuilder`] assembles a project through the typed API: one
//! principal switch per fabric, one port per login. The [`payloads`] module
//! produces capture files shaped like management API responses for
//! ingestion tests.

use fcdb_core::{
    node_map, paths, AlertTable, EntityRef, FabricObj, FcdbError, FcdbResult, Node, Project,
};
use fcdb_types::ZoneType;
use std::sync::Arc;
use tracing::debug;

/// WWNs used across the scenarios.
pub mod wwns {
    pub const FABRIC_A: &str = "10:00:00:05:1e:00:00:0a";
    pub const FABRIC_B: &str = "10:00:00:05:1e:00:00:0b";
    pub const CHASSIS: &str = "10:00:00:05:1e:00:00:c0";
    pub const HOST_1: &str = "10:00:00:00:c9:00:00:01";
    pub const HOST_2: &str = "10:00:00:00:c9:00:00:02";
    pub const HOST_3: &str = "10:00:00:00:c9:00:00:03";
    pub const TARGET_1: &str = "50:05:07:68:00:00:00:01";
    pub const TARGET_2: &str = "50:05:07:68:00:00:00:02";
}

pub const INITIATOR: &str = "FCP-Initiator";
pub const TARGET: &str = "FCP-Target";
pub const FICON: &str = "FC-SB-2";

/// Project with the built-in alert table.
pub fn empty_project(name: &str) -> Project {
    Project::new(name, "fixture", Arc::new(AlertTable::builtin()))
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Builds a project one fabric at a time.
pub struct FabricBuilder {
    project: Project,
    fabric: String,
    next_port: i64,
    error: Option<FcdbError>,
}

impl FabricBuilder {
    /// New project containing `fabric` and its principal switch.
    pub fn new(fabric: &str) -> Self {
        Self::with_project(empty_project("fixture"), fabric)
    }

    pub fn with_project(mut project: Project, fabric: &str) -> Self {
        project.add_switch(fabric, None);
        project.link_switch_to_fabric(fabric, fabric);
        project.add_fabric(fabric);
        let next_port = project
            .switch(fabric)
            .map_or(0, |s| i64::try_from(s.ports.len()).unwrap_or(i64::MAX));
        Self {
            project,
            fabric: fabric.to_string(),
            next_port,
            error: None,
        }
    }

    /// Continues with another fabric in the same project.
    pub fn fabric(self, fabric: &str) -> Self {
        let error = self.error;
        let mut next = Self::with_project(self.project, fabric);
        next.error = error;
        next
    }

    fn set(&mut self, id: &EntityRef, path: &str, value: Node) {
        if let Err(e) = self.project.set_attr(id, path, value, false) {
            self.error.get_or_insert(e);
        }
    }

    /// Logs `wwn` in on the next free port of the principal switch.
    pub fn login(mut self, wwn: &str, fc4: &str, gbps: Option<i64>) -> Self {
        let index = self.next_port;
        self.next_port += 1;
        let port = format!("0/{}", index);
        self.project.add_switch(&self.fabric, None).add_port(&port);

        let port_id = EntityRef::port(self.fabric.as_str(), port.as_str());
        self.set(&port_id, paths::FC_INDEX, Node::from(index));
        self.set(&port_id, paths::FC_NEIGHBOR_WWN, Node::List(vec![Node::str(wwn)]));
        if let Some(gbps) = gbps {
            self.set(&port_id, paths::FC_SPEED, Node::from(gbps * 1_000_000_000));
        }

        if let Some(f) = self.fabric_obj() {
            f.add_login(wwn);
        }
        let login_id = EntityRef::login(self.fabric.as_str(), wwn);
        self.set(&login_id, paths::NS_FC4_FEATURES, Node::str(fc4));
        debug!(wwn, port = %port, "fixture login");
        self
    }

    /// Sets the domain ID of the principal switch.
    pub fn domain(mut self, did: i64) -> Self {
        let switch_id = EntityRef::Switch(self.fabric.clone());
        self.set(&switch_id, paths::SWITCH_DID, Node::from(did));
        self
    }

    /// Logs in a FICON channel: CHPID `tag` of CEC `serial`, identified by
    /// the RNID on its port.
    pub fn channel(self, wwn: &str, serial: &str, tag: &str) -> Self {
        let mut next = self.login(wwn, FICON, None);
        let port = format!("0/{}", next.next_port - 1);
        let port_id = EntityRef::port(next.fabric.as_str(), port.as_str());
        next.set(&port_id, paths::RNID_SEQUENCE, Node::str(serial));
        next.set(&port_id, paths::RNID_TAG, Node::str(format!("0x{}", tag)));
        next.set(&port_id, paths::RNID_FLAGS, Node::str(paths::RNID_FLAGS_CHANNEL));
        next
    }

    /// Defines the path of CHPID `tag` in the IOCP of CEC `serial`.
    pub fn iocp_path(mut self, serial: &str, tag: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|l| Node::str(*l)).collect::<Vec<_>>();
        let path = node_map([(paths::IOCP_LINK, Node::List(links))]);
        if let Err(conflicts) = self.project.add_iocp(serial).set_path(tag, path) {
            self.error.get_or_insert(FcdbError::programming(
                "fixture",
                format!("{} conflicting values for CHPID {}", conflicts.len(), tag),
            ));
        }
        self
    }

    pub fn initiator(self, wwn: &str) -> Self {
        self.login(wwn, INITIATOR, None)
    }

    pub fn target(self, wwn: &str) -> Self {
        self.login(wwn, TARGET, None)
    }

    pub fn alias(mut self, name: &str, members: &[&str]) -> Self {
        if let Some(f) = self.fabric_obj() {
            f.add_alias(name).add_members(strings(members));
        }
        self
    }

    pub fn zone(mut self, name: &str, members: &[&str]) -> Self {
        if let Some(f) = self.fabric_obj() {
            f.add_zone(name).add_members(strings(members));
        }
        self
    }

    pub fn peer_zone(mut self, name: &str, principal: &[&str], members: &[&str]) -> Self {
        if let Some(f) = self.fabric_obj() {
            let zone = f.add_zone(name);
            zone.zone_type = ZoneType::UserPeer;
            zone.add_pmembers(strings(principal));
            zone.add_members(strings(members));
        }
        self
    }

    pub fn zonecfg(mut self, name: &str, zones: &[&str]) -> Self {
        if let Some(f) = self.fabric_obj() {
            f.add_zonecfg(name).add_members(strings(zones));
        }
        self
    }

    /// Enables `cfg`: its zones are copied into the effective zone set.
    pub fn enable(mut self, cfg: &str) -> Self {
        let Some(f) = self.fabric_obj() else {
            return self;
        };
        let zones: Vec<String> = f
            .zonecfgs
            .get(cfg)
            .map(|c| c.members.clone())
            .unwrap_or_default();
        for name in &zones {
            let Some(defined) = f.zones.get(name).cloned() else {
                continue;
            };
            let eff = f.add_eff_zone(name);
            eff.zone_type = defined.zone_type;
            eff.add_members(defined.members);
            eff.add_pmembers(defined.pmembers);
        }
        f.eff_zonecfg = Some(cfg.to_string());
        self
    }

    /// Adds an effective zone with no defined counterpart.
    pub fn eff_zone(mut self, name: &str, members: &[&str]) -> Self {
        if let Some(f) = self.fabric_obj() {
            f.add_eff_zone(name).add_members(strings(members));
        }
        self
    }

    fn fabric_obj(&mut self) -> Option<&mut FabricObj> {
        self.project.fabrics.get_mut(&self.fabric)
    }

    pub fn build(self) -> FcdbResult<Project> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.project),
        }
    }
}

/// Capture payloads shaped like management API responses.
pub mod payloads {
    use serde_json::{json, Value};

    pub const SWITCH_URI: &str = "running/brocade-fibrechannel-switch/fibrechannel-switch";
    pub const PORT_URI: &str = "running/brocade-interface/fibrechannel";
    pub const NAME_SERVER_URI: &str = "running/brocade-name-server/fibrechannel-name-server";
    pub const DEFINED_ZONING_URI: &str = "running/brocade-zone/defined-configuration";
    pub const EFFECTIVE_ZONING_URI: &str = "running/brocade-zone/effective-configuration";

    pub fn switch(wwn: &str, did: i64, name: &str) -> Value {
        json!({"fibrechannel-switch": [{
            "name": wwn,
            "domain-id": did,
            "principal": 1,
            "user-friendly-name": name,
            "ip-address": {"ip-address": ["10.10.0.1"]}
        }]})
    }

    /// One port per `(name, index, gbps, wwn)`.
    pub fn ports(ports: &[(&str, i64, i64, &str)]) -> Value {
        let entries: Vec<Value> = ports
            .iter()
            .map(|(name, index, gbps, wwn)| {
                json!({
                    "name": name,
                    "index": index,
                    "speed": gbps * 1_000_000_000,
                    "neighbor": {"wwn": [wwn]}
                })
            })
            .collect();
        json!({ "fibrechannel": entries })
    }

    /// One name server entry per `(wwn, fc4)`.
    pub fn name_server(logins: &[(&str, &str)]) -> Value {
        let entries: Vec<Value> = logins
            .iter()
            .map(|(wwn, fc4)| json!({"port-name": wwn, "fc4-features": fc4}))
            .collect();
        json!({ "fibrechannel-name-server": entries })
    }

    /// Defined configuration with a single zone configuration.
    pub fn defined_zoning(
        cfg: &str,
        zones: &[(&str, &[&str])],
        aliases: &[(&str, &[&str])],
    ) -> Value {
        let zone_entries: Vec<Value> = zones
            .iter()
            .map(|(name, members)| {
                json!({"zone-name": name, "zone-type": 0, "member-entry": {"entry-name": members}})
            })
            .collect();
        let alias_entries: Vec<Value> = aliases
            .iter()
            .map(|(name, members)| {
                json!({"alias-name": name, "member-entry": {"alias-entry-name": members}})
            })
            .collect();
        let zone_names: Vec<&str> = zones.iter().map(|(name, _)| *name).collect();
        json!({"defined-configuration": {
            "cfg": [{"cfg-name": cfg, "member-zone": {"zone-name": zone_names}}],
            "zone": zone_entries,
            "alias": alias_entries
        }})
    }

    pub fn effective_zoning(cfg: &str, zones: &[(&str, &[&str])]) -> Value {
        let enabled: Vec<Value> = zones
            .iter()
            .map(|(name, members)| {
                json!({"zone-name": name, "zone-type": 0, "member-entry": {"entry-name": members}})
            })
            .collect();
        json!({"effective-configuration": {"cfg-name": cfg, "enabled-zone": enabled}})
    }

    pub fn fetch_error(status: u16, message: &str) -> Value {
        json!({"errors": {"status": status, "message": message}})
    }

    /// Capture file with one switch scope.
    pub fn capture(chassis: &str, switch: &str, responses: &[(&str, Value)]) -> String {
        let responses: serde_json::Map<String, Value> = responses
            .iter()
            .map(|(uri, payload)| (uri.to_string(), payload.clone()))
            .collect();
        json!({"scopes": [{"chassis": chassis, "switch": switch, "responses": responses}]})
            .to_string()
    }
}
