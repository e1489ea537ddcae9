//! Cross-reference builder.
//!
//! Derives indices that raw telemetry does not carry directly: fabric
//! membership of each switch, the global WWN to port map and the NPIV base
//! login of each port. Safe to run any number of times.

use crate::alert::{AlertCode, AlertParams};
use crate::entity::{EntityRef, LoginObj};
use crate::project::{PortRef, Project};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// Counts reported by [`build_cross_references`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XrefSummary {
    pub fabrics: usize,
    pub logins_mapped: usize,
    pub duplicate_logins: usize,
    pub base_logins: usize,
}

/// Rebuilds every derived index in `project`.
#[instrument(skip(project), fields(project = project.name()))]
pub fn build_cross_references(project: &mut Project) -> XrefSummary {
    propagate_fabric_membership(project);
    let duplicate_logins = build_port_map(project);
    let base_logins = classify_base_logins(project);

    let summary = XrefSummary {
        fabrics: project.fabrics.len(),
        logins_mapped: project.port_map.len(),
        duplicate_logins,
        base_logins,
    };
    info!(
        fabrics = summary.fabrics,
        logins = summary.logins_mapped,
        duplicates = summary.duplicate_logins,
        base = summary.base_logins,
        "cross references built"
    );
    summary
}

/// Principal switches own their fabric. Every switch listed by a fabric
/// points back at it, and every switch pointing at a fabric is listed by it.
fn propagate_fabric_membership(project: &mut Project) {
    let principals: Vec<String> = project
        .switches
        .values()
        .filter(|s| s.is_principal())
        .map(|s| s.rec.id.key().to_string())
        .collect();
    for wwn in principals {
        project.link_switch_to_fabric(&wwn, &wwn);
    }

    let listed: Vec<(String, String)> = project
        .fabrics
        .values()
        .flat_map(|f| {
            f.switch_keys
                .iter()
                .map(move |s| (s.clone(), f.wwn().to_string()))
        })
        .collect();
    for (switch, fabric) in listed {
        let current = project.switch(&switch).and_then(|s| s.fabric_key.clone());
        match current {
            // A principal stays in its own fabric even if another list names it.
            Some(f) if f == fabric || f == switch => {}
            _ => project.link_switch_to_fabric(&switch, &fabric),
        }
    }

    let claimed: Vec<(String, String)> = project
        .switches
        .values()
        .filter_map(|s| s.fabric_key.clone().map(|f| (s.rec.id.key().to_string(), f)))
        .collect();
    for (switch, fabric) in claimed {
        project.add_fabric(&fabric).add_switch_key(switch);
    }
}

/// Rebuilds the WWN to port map. Returns the number of WWNs seen on more
/// than one port.
fn build_port_map(project: &mut Project) -> usize {
    let mut map: BTreeMap<String, Vec<PortRef>> = BTreeMap::new();
    for switch in project.switches.values() {
        for port in switch.ports.values() {
            for wwn in port.login_wwns() {
                let port_ref = PortRef::new(switch.rec.id.key(), port.rec.id.key());
                let ports = map.entry(wwn).or_default();
                if !ports.contains(&port_ref) {
                    ports.push(port_ref);
                }
            }
        }
    }

    let dups: Vec<(String, String)> = map
        .iter()
        .filter(|(_, ports)| ports.len() > 1)
        .map(|(wwn, ports)| (wwn.clone(), ports.iter().join(", ")))
        .collect();
    for (wwn, ports) in &dups {
        warn!(wwn = %wwn, ports = %ports, "WWN logged in on more than one port");
        let params = AlertParams::new().p0(wwn.as_str()).p1(ports.as_str());
        if let Err(e) = project.add_alert(&EntityRef::Project, AlertCode::ProjDupLogin, params) {
            warn!(wwn = %wwn, error = %e, "failed to record duplicate login");
        }
    }

    project.port_map = map;
    dups.len()
}

fn has_port_marker(login: Option<&LoginObj>) -> bool {
    login
        .and_then(LoginObj::port_properties)
        .map_or(false, |p| !p.trim().is_empty())
}

/// A port with more than one login is an NPIV port. Its base login is the
/// first login without a `port-properties` marker. Returns the number of
/// base logins found.
fn classify_base_logins(project: &mut Project) -> usize {
    let mut found: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for switch in project.switches.values() {
        let Some(fabric_key) = switch.fabric_key.as_deref() else {
            continue;
        };
        let fabric = project.fabrics.get(fabric_key);
        for port in switch.ports.values() {
            let wwns = port.login_wwns();
            if wwns.len() < 2 {
                continue;
            }
            let logins = fabric.map(|f| &f.logins);
            let base = wwns
                .iter()
                .find(|w| !has_port_marker(logins.and_then(|l| l.get(*w))))
                .unwrap_or(&wwns[0]);
            debug!(port = %port.rec.id, base = %base, "NPIV base login");
            found
                .entry(fabric_key.to_string())
                .or_default()
                .insert(base.clone());
        }
    }

    let mut total = 0;
    for fabric in project.fabrics.values_mut() {
        fabric.base_logins = found.remove(fabric.wwn()).unwrap_or_default();
        total += fabric.base_logins.len();
    }
    total
}
