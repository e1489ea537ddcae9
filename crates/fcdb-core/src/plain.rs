//! Plain serialization of a project.
//!
//! The dump holds each entity's attribute tree and alerts, nested by
//! ownership. Links between entities are written as keys. Reloading replays
//! the same get-or-create and merge calls used by ingestion.

use crate::alert::{AlertRecord, AlertTable};
use crate::entity::{Entity, EntityRef, PortObj, Record, ZoneObj};
use crate::error::{FcdbError, FcdbResult};
use crate::node::NodeMap;
use crate::project::Project;
use crate::store::AttributeStore;
use chrono::{DateTime, Utc};
use fcdb_types::ZoneType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Version written to the dump header.
pub const PLAIN_FORMAT_VERSION: u32 = 1;

/// Attributes and alerts of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainEntity {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: NodeMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<AlertRecord>,
}

impl PlainEntity {
    fn of(rec: &Record) -> Self {
        Self {
            attrs: rec.store.as_map().clone(),
            alerts: rec.alerts.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainSwitch {
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<String>,
    #[serde(default)]
    pub ports: BTreeMap<String, PlainEntity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ge_ports: BTreeMap<String, PlainEntity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub maps_rules: NodeMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub maps_groups: NodeMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainZone {
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default)]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pmembers: Vec<String>,
}

impl PlainZone {
    fn of(zone: &ZoneObj) -> Self {
        Self {
            entity: PlainEntity::of(&zone.rec),
            zone_type: zone.zone_type,
            members: zone.members.clone(),
            pmembers: zone.pmembers.clone(),
        }
    }
}

/// Zone configuration or alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainMembers {
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainFabric {
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default)]
    pub switches: Vec<String>,
    #[serde(default)]
    pub zones: BTreeMap<String, PlainZone>,
    #[serde(default)]
    pub eff_zones: BTreeMap<String, PlainZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eff_zonecfg: Option<String>,
    #[serde(default)]
    pub zonecfgs: BTreeMap<String, PlainMembers>,
    #[serde(default)]
    pub aliases: BTreeMap<String, PlainMembers>,
    #[serde(default)]
    pub logins: BTreeMap<String, PlainEntity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fdmi_nodes: BTreeMap<String, PlainEntity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fdmi_ports: BTreeMap<String, PlainEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainIocp {
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default)]
    pub control_units: NodeMap,
    #[serde(default)]
    pub paths: NodeMap,
}

/// Dump of a whole project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainProject {
    pub format_version: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub entity: PlainEntity,
    #[serde(default)]
    pub chassis: BTreeMap<String, PlainEntity>,
    #[serde(default)]
    pub switches: BTreeMap<String, PlainSwitch>,
    #[serde(default)]
    pub fabrics: BTreeMap<String, PlainFabric>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub iocps: BTreeMap<String, PlainIocp>,
}

fn plain_ports(ports: &BTreeMap<String, PortObj>) -> BTreeMap<String, PlainEntity> {
    ports
        .iter()
        .map(|(k, p)| (k.clone(), PlainEntity::of(&p.rec)))
        .collect()
}

fn plain_records<'a, E: Entity + 'a>(
    entities: impl Iterator<Item = (&'a String, &'a E)>,
) -> BTreeMap<String, PlainEntity> {
    entities
        .map(|(k, e)| (k.clone(), PlainEntity::of(e.record())))
        .collect()
}

/// Flattens `project` to its dump form.
pub fn to_plain(project: &Project) -> PlainProject {
    PlainProject {
        format_version: PLAIN_FORMAT_VERSION,
        name: project.name().to_string(),
        description: project.description.clone(),
        date: project.date,
        entity: PlainEntity::of(&project.rec),
        chassis: plain_records(project.chassis.iter()),
        switches: project
            .switches
            .iter()
            .map(|(k, s)| {
                let plain = PlainSwitch {
                    entity: PlainEntity::of(&s.rec),
                    chassis: s.chassis_key.clone(),
                    fabric: s.fabric_key.clone(),
                    ports: plain_ports(&s.ports),
                    ge_ports: plain_ports(&s.ge_ports),
                    maps_rules: s.maps_rules.as_map().clone(),
                    maps_groups: s.maps_groups.as_map().clone(),
                };
                (k.clone(), plain)
            })
            .collect(),
        fabrics: project
            .fabrics
            .iter()
            .map(|(k, f)| {
                let members = |rec: &Record, members: &[String]| PlainMembers {
                    entity: PlainEntity::of(rec),
                    members: members.to_vec(),
                };
                let plain = PlainFabric {
                    entity: PlainEntity::of(&f.rec),
                    switches: f.switch_keys.clone(),
                    zones: f.zones.iter().map(|(n, z)| (n.clone(), PlainZone::of(z))).collect(),
                    eff_zones: f
                        .eff_zones
                        .iter()
                        .map(|(n, z)| (n.clone(), PlainZone::of(z)))
                        .collect(),
                    eff_zonecfg: f.eff_zonecfg.clone(),
                    zonecfgs: f
                        .zonecfgs
                        .iter()
                        .map(|(n, c)| (n.clone(), members(&c.rec, &c.members)))
                        .collect(),
                    aliases: f
                        .aliases
                        .iter()
                        .map(|(n, a)| (n.clone(), members(&a.rec, &a.members)))
                        .collect(),
                    logins: plain_records(f.logins.iter()),
                    fdmi_nodes: plain_records(f.fdmi_nodes.iter()),
                    fdmi_ports: plain_records(f.fdmi_ports.iter()),
                };
                (k.clone(), plain)
            })
            .collect(),
        iocps: project
            .iocps
            .iter()
            .map(|(k, i)| {
                let plain = PlainIocp {
                    entity: PlainEntity::of(&i.rec),
                    control_units: i.control_units.as_map().clone(),
                    paths: i.paths.as_map().clone(),
                };
                (k.clone(), plain)
            })
            .collect(),
    }
}

/// Replays one entity's attributes and alerts onto `target`.
fn restore(project: &mut Project, target: &EntityRef, plain: PlainEntity) -> FcdbResult<()> {
    for (key, value) in plain.attrs {
        project.set_attr(target, &key, value, false)?;
    }
    for alert in plain.alerts {
        if let Some(flag) = project.alert_table().spec(alert.code).flag {
            project.set_flag(flag);
        }
        let entity = project
            .entity_mut(target)
            .ok_or_else(|| FcdbError::entity_not_found(target.kind().as_str(), target.key()))?;
        entity.record_mut().add_alert(alert);
    }
    Ok(())
}

fn restore_zone(
    project: &mut Project,
    fabric: &str,
    name: &str,
    effective: bool,
    plain: PlainZone,
) -> FcdbResult<()> {
    let fab = project.add_fabric(fabric);
    let zone = if effective {
        fab.add_eff_zone(name)
    } else {
        fab.add_zone(name)
    };
    zone.zone_type = plain.zone_type;
    zone.add_members(plain.members);
    zone.add_pmembers(plain.pmembers);
    let id = zone.rec.id.clone();
    restore(project, &id, plain.entity)
}

/// Rebuilds a project from its dump form.
pub fn from_plain(plain: PlainProject, alert_table: Arc<AlertTable>) -> FcdbResult<Project> {
    if plain.format_version > PLAIN_FORMAT_VERSION {
        return Err(FcdbError::user(
            "format_version",
            format!(
                "dump version {} is newer than supported version {}",
                plain.format_version, PLAIN_FORMAT_VERSION
            ),
        ));
    }

    let mut project = Project::with_date(plain.name, plain.description, plain.date, alert_table);
    restore(&mut project, &EntityRef::Project, plain.entity)?;

    for (wwn, chassis) in plain.chassis {
        project.add_chassis(&wwn);
        restore(&mut project, &EntityRef::Chassis(wwn), chassis)?;
    }

    for (wwn, switch) in plain.switches {
        let sw = project.add_switch(&wwn, switch.chassis.as_deref());
        for port in switch.ports.keys() {
            sw.add_port(port);
        }
        for port in switch.ge_ports.keys() {
            sw.add_ge_port(port);
        }
        // Both tables were conflict free when they were dumped.
        sw.maps_rules = AttributeStore::from_map(switch.maps_rules);
        sw.maps_groups = AttributeStore::from_map(switch.maps_groups);
        if let Some(fabric) = &switch.fabric {
            project.link_switch_to_fabric(&wwn, fabric);
        }
        restore(&mut project, &EntityRef::Switch(wwn.clone()), switch.entity)?;
        for (port, p) in switch.ports {
            restore(&mut project, &EntityRef::port(wwn.as_str(), port), p)?;
        }
        for (port, p) in switch.ge_ports {
            let id = EntityRef::GePort {
                switch: wwn.clone(),
                port,
            };
            restore(&mut project, &id, p)?;
        }
    }

    for (wwn, fabric) in plain.fabrics {
        let fab = project.add_fabric(&wwn);
        for switch in fabric.switches {
            fab.add_switch_key(switch);
        }
        fab.eff_zonecfg = fabric.eff_zonecfg;
        restore(&mut project, &EntityRef::Fabric(wwn.clone()), fabric.entity)?;

        for (name, zone) in fabric.zones {
            restore_zone(&mut project, &wwn, &name, false, zone)?;
        }
        for (name, zone) in fabric.eff_zones {
            restore_zone(&mut project, &wwn, &name, true, zone)?;
        }
        for (name, cfg) in fabric.zonecfgs {
            project.add_fabric(&wwn).add_zonecfg(&name).add_members(cfg.members);
            restore(&mut project, &EntityRef::zonecfg(wwn.as_str(), name), cfg.entity)?;
        }
        for (name, alias) in fabric.aliases {
            project.add_fabric(&wwn).add_alias(&name).add_members(alias.members);
            restore(&mut project, &EntityRef::alias(wwn.as_str(), name), alias.entity)?;
        }
        for (login, l) in fabric.logins {
            project.add_fabric(&wwn).add_login(&login);
            restore(&mut project, &EntityRef::login(wwn.as_str(), login), l)?;
        }
        for (node, n) in fabric.fdmi_nodes {
            project.add_fabric(&wwn).add_fdmi_node(&node);
            let id = EntityRef::FdmiNode {
                fabric: wwn.clone(),
                wwn: node,
            };
            restore(&mut project, &id, n)?;
        }
        for (port, p) in fabric.fdmi_ports {
            project.add_fabric(&wwn).add_fdmi_port(&port);
            let id = EntityRef::FdmiPort {
                fabric: wwn.clone(),
                wwn: port,
            };
            restore(&mut project, &id, p)?;
        }
    }

    for (serial, iocp) in plain.iocps {
        let obj = project.add_iocp(&serial);
        obj.control_units = AttributeStore::from_map(iocp.control_units);
        obj.paths = AttributeStore::from_map(iocp.paths);
        restore(&mut project, &EntityRef::Iocp(serial), iocp.entity)?;
    }

    debug!(
        switches = project.switches.len(),
        fabrics = project.fabrics.len(),
        "project restored"
    );
    Ok(project)
}

/// Writes the dump of `project` as pretty printed JSON.
pub fn write_file(project: &Project, path: impl AsRef<Path>) -> FcdbResult<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(&to_plain(project))?;
    std::fs::write(path, content).map_err(|e| FcdbError::io(path, e))?;
    info!(path = %path.display(), "project written");
    Ok(())
}

/// Reads a dump written by [`write_file`].
pub fn read_file(path: impl AsRef<Path>, alert_table: Arc<AlertTable>) -> FcdbResult<Project> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| FcdbError::io(path, e))?;
    let plain: PlainProject = serde_json::from_str(&content)?;
    from_plain(plain, alert_table)
}
