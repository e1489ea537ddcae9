//! Project root arena.
//!
//! The [`Project`] owns every chassis, switch, fabric and IOCP and resolves
//! [`EntityRef`]s to entities. All mutation of entity attributes from outside
//! the crate goes through [`Project::set_attr`] so that merge conflicts are
//! turned into alerts in one place.

use crate::alert::{AlertCode, AlertParams, AlertRecord, AlertTable, ExitStatus, StatusFlag, StatusFlags};
use crate::entity::{key_list, ChassisObj, Entity, EntityRef, IocpObj, PortObj, Record, SwitchObj};
use crate::error::{FcdbError, FcdbResult};
use crate::fabric::FabricObj;
use crate::node::{split_path, Node};
use crate::paths;
use crate::reserved::ReservedKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Location of a port in the project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    /// Switch WWN.
    pub switch: String,
    /// Port name, e.g. `0/1`.
    pub port: String,
}

impl PortRef {
    pub fn new(switch: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            switch: switch.into(),
            port: port.into(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::port(self.switch.as_str(), self.port.as_str())
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.switch, self.port)
    }
}

/// Root of the object graph.
#[derive(Debug, Clone)]
pub struct Project {
    pub rec: Record,
    pub description: String,
    pub date: DateTime<Utc>,
    flags: StatusFlags,
    alert_table: Arc<AlertTable>,
    pub chassis: BTreeMap<String, ChassisObj>,
    pub switches: BTreeMap<String, SwitchObj>,
    pub fabrics: BTreeMap<String, FabricObj>,
    pub iocps: BTreeMap<String, IocpObj>,
    /// Logged in WWN to the ports it was seen on. Built by the cross-reference pass.
    pub port_map: BTreeMap<String, Vec<PortRef>>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: impl Into<String>, alert_table: Arc<AlertTable>) -> Self {
        Self::with_date(name, description, Utc::now(), alert_table)
    }

    pub fn with_date(
        name: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        alert_table: Arc<AlertTable>,
    ) -> Self {
        Self {
            rec: Record::new(EntityRef::Project, name),
            description: description.into(),
            date,
            flags: StatusFlags::new(),
            alert_table,
            chassis: BTreeMap::new(),
            switches: BTreeMap::new(),
            fabrics: BTreeMap::new(),
            iocps: BTreeMap::new(),
            port_map: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.rec.project
    }

    pub fn alert_table(&self) -> &AlertTable {
        &self.alert_table
    }

    pub fn shared_alert_table(&self) -> Arc<AlertTable> {
        Arc::clone(&self.alert_table)
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    pub fn set_flag(&mut self, flag: StatusFlag) {
        self.flags.set(flag);
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.flags.exit_status()
    }

    pub fn add_chassis(&mut self, wwn: &str) -> &mut ChassisObj {
        let project = self.rec.project.clone();
        self.chassis
            .entry(wwn.to_string())
            .or_insert_with(|| ChassisObj::new(wwn, project))
    }

    /// Gets or creates a switch, linking it to `chassis` when given.
    pub fn add_switch(&mut self, wwn: &str, chassis: Option<&str>) -> &mut SwitchObj {
        if let Some(chassis_wwn) = chassis {
            self.add_chassis(chassis_wwn).add_switch_key(wwn);
        }
        let project = self.rec.project.clone();
        let switch = self
            .switches
            .entry(wwn.to_string())
            .or_insert_with(|| SwitchObj::new(wwn, project));
        if let Some(chassis_wwn) = chassis {
            switch.chassis_key = Some(chassis_wwn.to_string());
        }
        switch
    }

    pub fn add_fabric(&mut self, wwn: &str) -> &mut FabricObj {
        let project = self.rec.project.clone();
        self.fabrics
            .entry(wwn.to_string())
            .or_insert_with(|| FabricObj::new(wwn, project))
    }

    pub fn add_iocp(&mut self, serial: &str) -> &mut IocpObj {
        let project = self.rec.project.clone();
        self.iocps
            .entry(serial.to_string())
            .or_insert_with(|| IocpObj::new(serial, project))
    }

    /// Makes `switch` a member of `fabric`, creating both if needed.
    pub fn link_switch_to_fabric(&mut self, switch: &str, fabric: &str) {
        let previous = self.add_switch(switch, None).fabric_key.replace(fabric.to_string());
        if let Some(old) = previous.filter(|old| old != fabric) {
            debug!(switch, from = %old, to = fabric, "switch moved to a new fabric");
            if let Some(old_fab) = self.fabrics.get_mut(&old) {
                old_fab.switch_keys.retain(|k| k != switch);
            }
        }
        self.add_fabric(fabric).add_switch_key(switch);
    }

    pub fn chassis_obj(&self, wwn: &str) -> Option<&ChassisObj> {
        self.chassis.get(wwn)
    }

    pub fn switch(&self, wwn: &str) -> Option<&SwitchObj> {
        self.switches.get(wwn)
    }

    pub fn fabric(&self, wwn: &str) -> Option<&FabricObj> {
        self.fabrics.get(wwn)
    }

    pub fn iocp(&self, serial: &str) -> Option<&IocpObj> {
        self.iocps.get(serial)
    }

    pub fn port(&self, port: &PortRef) -> Option<&PortObj> {
        self.switches.get(&port.switch)?.ports.get(&port.port)
    }

    /// Resolves a reference to its entity.
    pub fn entity(&self, id: &EntityRef) -> Option<&dyn Entity> {
        let entity: &dyn Entity = match id {
            EntityRef::Project => self,
            EntityRef::Chassis(k) => self.chassis.get(k)?,
            EntityRef::Switch(k) => self.switches.get(k)?,
            EntityRef::Port { switch, port } => self.switches.get(switch)?.ports.get(port)?,
            EntityRef::GePort { switch, port } => self.switches.get(switch)?.ge_ports.get(port)?,
            EntityRef::Fabric(k) => self.fabrics.get(k)?,
            EntityRef::Zone { fabric, name } => self.fabrics.get(fabric)?.zones.get(name)?,
            EntityRef::EffZone { fabric, name } => self.fabrics.get(fabric)?.eff_zones.get(name)?,
            EntityRef::ZoneCfg { fabric, name } => self.fabrics.get(fabric)?.zonecfgs.get(name)?,
            EntityRef::Alias { fabric, name } => self.fabrics.get(fabric)?.aliases.get(name)?,
            EntityRef::Login { fabric, wwn } => self.fabrics.get(fabric)?.logins.get(wwn)?,
            EntityRef::FdmiNode { fabric, wwn } => self.fabrics.get(fabric)?.fdmi_nodes.get(wwn)?,
            EntityRef::FdmiPort { fabric, wwn } => self.fabrics.get(fabric)?.fdmi_ports.get(wwn)?,
            EntityRef::Iocp(k) => self.iocps.get(k)?,
        };
        Some(entity)
    }

    /// Resolves a reference to its entity for mutation.
    pub fn entity_mut(&mut self, id: &EntityRef) -> Option<&mut dyn Entity> {
        let entity: &mut dyn Entity = match id {
            EntityRef::Project => self,
            EntityRef::Chassis(k) => self.chassis.get_mut(k)?,
            EntityRef::Switch(k) => self.switches.get_mut(k)?,
            EntityRef::Port { switch, port } => {
                self.switches.get_mut(switch)?.ports.get_mut(port)?
            }
            EntityRef::GePort { switch, port } => {
                self.switches.get_mut(switch)?.ge_ports.get_mut(port)?
            }
            EntityRef::Fabric(k) => self.fabrics.get_mut(k)?,
            EntityRef::Zone { fabric, name } => self.fabrics.get_mut(fabric)?.zones.get_mut(name)?,
            EntityRef::EffZone { fabric, name } => {
                self.fabrics.get_mut(fabric)?.eff_zones.get_mut(name)?
            }
            EntityRef::ZoneCfg { fabric, name } => {
                self.fabrics.get_mut(fabric)?.zonecfgs.get_mut(name)?
            }
            EntityRef::Alias { fabric, name } => {
                self.fabrics.get_mut(fabric)?.aliases.get_mut(name)?
            }
            EntityRef::Login { fabric, wwn } => self.fabrics.get_mut(fabric)?.logins.get_mut(wwn)?,
            EntityRef::FdmiNode { fabric, wwn } => {
                self.fabrics.get_mut(fabric)?.fdmi_nodes.get_mut(wwn)?
            }
            EntityRef::FdmiPort { fabric, wwn } => {
                self.fabrics.get_mut(fabric)?.fdmi_ports.get_mut(wwn)?
            }
            EntityRef::Iocp(k) => self.iocps.get_mut(k)?,
        };
        Some(entity)
    }

    /// Sets `path` on the entity `target`.
    ///
    /// Merge conflicts are not errors: each one becomes an `ATTR_CONFLICT`
    /// alert on the target and the conflicting leaf keeps its value. Returns
    /// the number of conflicts.
    pub fn set_attr(
        &mut self,
        target: &EntityRef,
        path: &str,
        value: Node,
        force: bool,
    ) -> FcdbResult<usize> {
        if let Some(key) = split_path(path).next().and_then(ReservedKey::lookup) {
            return Err(FcdbError::ReservedKey {
                key: key.as_str().to_string(),
            });
        }
        let table = Arc::clone(&self.alert_table);
        let entity = self
            .entity_mut(target)
            .ok_or_else(|| FcdbError::entity_not_found(target.kind().as_str(), target.key()))?;

        let conflicts = match entity.record_mut().store.set(path, value, force) {
            Ok(()) => return Ok(0),
            Err(conflicts) => conflicts,
        };
        for conflict in &conflicts {
            warn!(entity = %target, "{}", conflict);
            let alert = AlertRecord::new(
                &table,
                AlertCode::AttrConflict,
                AlertParams::new()
                    .p0(conflict.path.as_str())
                    .p1(format!(
                        "kept {}, ignored {} ({})",
                        conflict.existing, conflict.incoming, conflict.reason
                    )),
            );
            entity.record_mut().add_alert(alert);
        }
        self.flags.set(StatusFlag::Warn);
        Ok(conflicts.len())
    }

    /// Attaches an alert to `target` and raises the code's status flag.
    ///
    /// Returns false if an identical alert was already attached.
    pub fn add_alert(
        &mut self,
        target: &EntityRef,
        code: AlertCode,
        params: AlertParams,
    ) -> FcdbResult<bool> {
        let alert = AlertRecord::new(&self.alert_table, code, params);
        let flag = self.alert_table.spec(code).flag;
        let entity = self
            .entity_mut(target)
            .ok_or_else(|| FcdbError::entity_not_found(target.kind().as_str(), target.key()))?;
        let added = entity.record_mut().add_alert(alert);
        if let Some(flag) = flag {
            self.flags.set(flag);
        }
        Ok(added)
    }

    /// Records a non-fatal error: raises the flag for its origin and adds a
    /// project alert.
    pub fn record_error(&mut self, err: &FcdbError) {
        let origin = err.origin();
        self.flags.set(StatusFlag::for_origin(origin, false));
        let (code, p0) = match err {
            FcdbError::Api { uri, .. } if is_chassis_uri(uri) => {
                (AlertCode::ProjChassisApiError, uri.clone())
            }
            FcdbError::Api { uri, .. } => (AlertCode::ProjSwitchApiError, uri.clone()),
            FcdbError::User { parameter, .. } => (AlertCode::ProjUserError, parameter.clone()),
            _ => (AlertCode::ProjProgramError, String::new()),
        };
        let alert = AlertRecord::new(
            &self.alert_table,
            code,
            AlertParams::new().p0(p0).p1(err.to_string()),
        );
        self.rec.add_alert(alert);
    }

    /// Every alert in the project with the entity it is attached to.
    pub fn all_alerts(&self) -> Vec<(EntityRef, &AlertRecord)> {
        fn push<'a, E: Entity>(out: &mut Vec<(EntityRef, &'a AlertRecord)>, e: &'a E) {
            out.extend(e.alerts().iter().map(|a| (e.id().clone(), a)));
        }

        let mut out = Vec::new();
        push(&mut out, self);
        for c in self.chassis.values() {
            push(&mut out, c);
        }
        for s in self.switches.values() {
            push(&mut out, s);
            for p in s.ports.values().chain(s.ge_ports.values()) {
                push(&mut out, p);
            }
        }
        for f in self.fabrics.values() {
            push(&mut out, f);
            for z in f.zones.values().chain(f.eff_zones.values()) {
                push(&mut out, z);
            }
            for c in f.zonecfgs.values() {
                push(&mut out, c);
            }
            for a in f.aliases.values() {
                push(&mut out, a);
            }
            for l in f.logins.values() {
                push(&mut out, l);
            }
            for n in f.fdmi_nodes.values() {
                push(&mut out, n);
            }
            for p in f.fdmi_ports.values() {
                push(&mut out, p);
            }
        }
        for i in self.iocps.values() {
            push(&mut out, i);
        }
        out
    }

    /// Ports `wwn` is logged in on.
    pub fn ports_for_wwn(&self, wwn: &str) -> &[PortRef] {
        self.port_map.get(wwn).map_or(&[], Vec::as_slice)
    }

    /// First port `wwn` is logged in on.
    pub fn login_port(&self, wwn: &str) -> Option<&PortObj> {
        self.ports_for_wwn(wwn).first().and_then(|p| self.port(p))
    }

    /// Switch in `fabric` with domain ID `did`.
    pub fn switch_for_did(&self, fabric: &str, did: i64) -> Option<&SwitchObj> {
        self.fabrics
            .get(fabric)?
            .switch_keys
            .iter()
            .filter_map(|k| self.switches.get(k))
            .find(|s| s.did() == Some(did))
    }

    /// User friendly fabric name, falling back to the principal WWN.
    pub fn fabric_name(&self, fabric: &str) -> String {
        self.fabrics
            .get(fabric)
            .and_then(FabricObj::name)
            .map(str::to_string)
            .or_else(|| {
                self.switches
                    .get(fabric)
                    .and_then(|s| s.get_str(paths::FABRIC_NAME))
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(|| fabric.to_string())
    }

    /// User friendly switch name, falling back to the WWN.
    pub fn switch_name(&self, switch: &str) -> String {
        self.switches
            .get(switch)
            .and_then(SwitchObj::name)
            .filter(|n| !n.is_empty())
            .map_or_else(|| switch.to_string(), str::to_string)
    }
}

fn is_chassis_uri(uri: &str) -> bool {
    ["brocade-chassis/", "brocade-fibrechannel-logical-switch/"]
        .iter()
        .any(|prefix| uri.trim_start_matches("running/").starts_with(prefix))
}

impl Entity for Project {
    fn record(&self) -> &Record {
        &self.rec
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.rec
    }

    fn key(&self) -> &str {
        &self.rec.project
    }

    fn reserved_value(&self, key: ReservedKey) -> Option<Node> {
        match key {
            ReservedKey::Flags => Some(Node::from(i64::from(self.flags.bits()))),
            ReservedKey::Date => Some(Node::str(self.date.to_rfc3339())),
            ReservedKey::Description => Some(Node::str(self.description.as_str())),
            ReservedKey::ChassisKeys => Some(key_list(self.chassis.keys())),
            ReservedKey::SwitchKeys => Some(key_list(self.switches.keys())),
            ReservedKey::FabricKeys => Some(key_list(self.fabrics.keys())),
            ReservedKey::IocpKeys => Some(key_list(self.iocps.keys())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CH: &str = "10:00:00:05:1e:00:00:00";
    const SW: &str = "10:00:00:05:1e:00:00:01";
    const SW2: &str = "10:00:00:05:1e:00:00:02";

    fn project() -> Project {
        Project::new("test", "unit test", Arc::new(AlertTable::builtin()))
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut proj = project();
        proj.add_switch(SW, Some(CH)).add_port("0/1");
        proj.add_switch(SW, Some(CH)).add_port("0/1");
        assert_eq!(proj.switches.len(), 1);
        assert_eq!(proj.chassis.len(), 1);
        assert_eq!(proj.chassis[CH].switch_keys, vec![SW.to_string()]);
        assert_eq!(proj.switches[SW].chassis_key.as_deref(), Some(CH));
        assert_eq!(proj.switches[SW].ports.len(), 1);
    }

    #[test]
    fn test_set_attr_conflict_keeps_old_value() {
        let mut proj = project();
        proj.add_switch(SW, None);
        let id = EntityRef::Switch(SW.to_string());

        assert_eq!(proj.set_attr(&id, "a/b", Node::str("A"), false).unwrap(), 0);
        assert_eq!(proj.set_attr(&id, "a/b", Node::str("A"), false).unwrap(), 0);
        assert!(proj.flags().is_clear());

        assert_eq!(proj.set_attr(&id, "a/b", Node::str("B"), false).unwrap(), 1);
        let sw = proj.switch(SW).unwrap();
        assert_eq!(sw.get("a/b").unwrap().as_str(), Some("A"));
        assert_eq!(sw.alerts().len(), 1);
        assert_eq!(sw.alerts()[0].code, AlertCode::AttrConflict);
        assert_eq!(sw.alerts()[0].severity, Severity::Warn);
        assert!(proj.flags().is_set(StatusFlag::Warn));
        assert_eq!(proj.exit_status(), ExitStatus::Warn);
    }

    #[test]
    fn test_set_attr_force_overwrites() {
        let mut proj = project();
        proj.add_switch(SW, None);
        let id = EntityRef::Switch(SW.to_string());
        proj.set_attr(&id, "a", Node::from(json!({"b": 1})), false).unwrap();
        proj.set_attr(&id, "a/b", Node::from(2_i64), true).unwrap();
        assert_eq!(proj.switch(SW).unwrap().get("a/b").unwrap().as_i64(), Some(2));
    }

    #[test]
    fn test_set_attr_rejects_reserved_and_missing() {
        let mut proj = project();
        proj.add_switch(SW, None);
        let id = EntityRef::Switch(SW.to_string());
        assert!(matches!(
            proj.set_attr(&id, "_fabric_key", Node::str("x"), false),
            Err(FcdbError::ReservedKey { .. })
        ));
        assert!(matches!(
            proj.set_attr(&EntityRef::Switch(SW2.into()), "a", Node::str("x"), false),
            Err(FcdbError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn test_link_switch_to_fabric_moves_switch() {
        let mut proj = project();
        proj.link_switch_to_fabric(SW, SW);
        proj.link_switch_to_fabric(SW2, SW);
        assert_eq!(proj.fabric(SW).unwrap().switch_keys.len(), 2);

        proj.link_switch_to_fabric(SW2, SW2);
        assert_eq!(proj.fabric(SW).unwrap().switch_keys, vec![SW.to_string()]);
        assert_eq!(proj.switch(SW2).unwrap().fabric_key.as_deref(), Some(SW2));
    }

    #[test]
    fn test_add_alert_raises_flag() {
        let mut proj = project();
        let params = AlertParams::new().p0("x").p1("bad");
        assert!(proj.add_alert(&EntityRef::Project, AlertCode::ProjUserError, params.clone()).unwrap());
        assert!(!proj.add_alert(&EntityRef::Project, AlertCode::ProjUserError, params).unwrap());
        assert!(proj.flags().is_set(StatusFlag::UserWarn));
        assert_eq!(proj.all_alerts().len(), 1);
    }

    #[test]
    fn test_record_error() {
        let mut proj = project();
        proj.record_error(&FcdbError::api("brocade-zone/defined-configuration", "not a list"));
        assert!(proj.flags().is_set(StatusFlag::ApiWarn));
        assert_eq!(proj.alerts()[0].code, AlertCode::ProjSwitchApiError);

        proj.record_error(&FcdbError::api("running/brocade-chassis/chassis", "timeout"));
        assert_eq!(proj.alerts()[1].code, AlertCode::ProjChassisApiError);
    }

    #[test]
    fn test_reserved_project_keys() {
        let mut proj = project();
        proj.add_switch(SW, Some(CH));
        assert_eq!(proj.get("_obj_key").unwrap().as_str(), Some("test"));
        assert_eq!(proj.get("_description").unwrap().as_str(), Some("unit test"));
        assert_eq!(proj.get("_switch_keys").unwrap().string_list(), vec![SW.to_string()]);
        assert!(proj.get("_parent_key").is_none());
    }

    #[test]
    fn test_switch_for_did_and_names() {
        let mut proj = project();
        proj.link_switch_to_fabric(SW, SW);
        let id = EntityRef::Switch(SW.to_string());
        proj.set_attr(&id, paths::SWITCH_DID, Node::from(7_i64), false).unwrap();
        proj.set_attr(&id, paths::SWITCH_NAME, Node::str("core_a"), false).unwrap();
        assert_eq!(proj.switch_for_did(SW, 7).map(|s| s.key()), Some(SW));
        assert!(proj.switch_for_did(SW, 8).is_none());
        assert_eq!(proj.switch_name(SW), "core_a");
        assert_eq!(proj.switch_name(SW2), SW2);
        assert_eq!(proj.fabric_name(SW), SW);
    }
}
