//! Zoning analysis.
//!
//! Each fabric is checked independently. Other fabrics are only read, to
//! report members that are logged in somewhere else. Analysis never changes
//! ingested data: checks run against a shared borrow of the [`Project`] and
//! produce pending alerts that are attached afterwards.

use crate::alert::{AlertCode, AlertParams};
use crate::config::ZoneCheckConfig;
use crate::entity::{EntityRef, LoginObj, PortObj, SwitchObj, ZoneObj};
use crate::error::{FcdbError, FcdbResult};
use crate::fabric::{FabricObj, ZonedRole};
use crate::paths;
use crate::node::Node;
use crate::project::Project;
use crate::query::{match_test, Logic, MatchKind, TestKind, TestNode, TestValue};
use fcdb_types::{DomainIndex, SpeedGen, Wwn};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, error, info, instrument};

/// Counts reported by [`analyze_project`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub fabrics: usize,
    pub alerts_added: usize,
}

#[derive(Debug, Clone)]
struct PendingAlert {
    target: EntityRef,
    code: AlertCode,
    params: AlertParams,
}

#[derive(Debug, Default)]
struct Pending(Vec<PendingAlert>);

impl Pending {
    fn push(&mut self, target: EntityRef, code: AlertCode, params: AlertParams) {
        self.0.push(PendingAlert {
            target,
            code,
            params,
        });
    }
}

/// Runs zone analysis on every fabric in the project.
#[instrument(skip_all, fields(project = project.name()))]
pub fn analyze_project(project: &mut Project, config: &ZoneCheckConfig) -> AnalysisSummary {
    let fabrics: Vec<String> = project.fabrics.keys().cloned().collect();
    let mut summary = AnalysisSummary::default();
    for fabric in &fabrics {
        match analyze_fabric(project, fabric, config) {
            Ok(added) => {
                summary.fabrics += 1;
                summary.alerts_added += added;
            }
            Err(e) => {
                error!(fabric = %fabric, "zone analysis failed: {}", e);
                project.record_error(&e);
            }
        }
    }
    info!(
        fabrics = summary.fabrics,
        alerts = summary.alerts_added,
        "zone analysis complete"
    );
    summary
}

/// Runs zone analysis on one fabric. Returns the number of alerts added.
#[instrument(skip(project, config))]
pub fn analyze_fabric(
    project: &mut Project,
    fabric: &str,
    config: &ZoneCheckConfig,
) -> FcdbResult<usize> {
    let pending = {
        let fab = project
            .fabric(fabric)
            .ok_or_else(|| FcdbError::entity_not_found("fabric", fabric))?;
        let mut pending = Pending::default();
        check_aliases(fab, &mut pending);
        check_zones(project, fab, config, &mut pending);
        check_logins(project, fab, &mut pending);
        check_targets(project, fab, config, &mut pending);
        if config.ficon_zoning {
            check_ficon_zoning(project, fab, &mut pending)?;
        }
        pending
    };

    let mut added = 0;
    for alert in pending.0 {
        match project.add_alert(&alert.target, alert.code, alert.params) {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(e) => {
                error!(entity = %alert.target, code = %alert.code, "cannot attach alert: {}", e);
                project.record_error(&FcdbError::programming("zone analysis", e.to_string()));
            }
        }
    }
    debug!(added, "fabric analyzed");
    Ok(added)
}

/// Unused aliases, aliases without members and single member aliases that
/// duplicate an earlier alias.
fn check_aliases(fab: &FabricObj, out: &mut Pending) {
    for alias in fab.aliases.values() {
        let id = alias.rec.id.clone();
        let used_in = fab.zones_for_alias(alias.name());
        if used_in.is_empty() {
            out.push(id.clone(), AlertCode::ZoneAliasNotUsed, AlertParams::new());
        }
        match alias.members.as_slice() {
            [] if used_in.is_empty() => {
                out.push(id, AlertCode::ZoneNullAlias, AlertParams::new());
            }
            [] => {
                out.push(
                    id,
                    AlertCode::ZoneNullAliasUsed,
                    AlertParams::new().p0(used_in.join(", ")),
                );
            }
            [member] => {
                // Only the later alias of a duplicate pair is flagged.
                let earlier: Vec<&str> = fab
                    .aliases
                    .range::<str, _>((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(alias.name())))
                    .filter(|(_, other)| other.members.as_slice() == std::slice::from_ref(member))
                    .map(|(name, _)| name.as_str())
                    .collect();
                if !earlier.is_empty() {
                    out.push(
                        id,
                        AlertCode::ZoneDupAlias,
                        AlertParams::new().p0(earlier.join(", ")).p1(member.as_str()),
                    );
                }
            }
            _ => {}
        }
    }
}

/// Where a WWN is logged in within one fabric, as user facing text.
fn locations_in_fabric(project: &Project, fabric: &FabricObj, wwn: &str) -> Vec<String> {
    let fab_name = project.fabric_name(fabric.wwn());
    let mut out: Vec<String> = project
        .ports_for_wwn(wwn)
        .iter()
        .filter(|p| {
            project
                .switch(&p.switch)
                .and_then(|s| s.fabric_key.as_deref())
                == Some(fabric.wwn())
        })
        .map(|p| {
            format!(
                "fabric {}, switch {}, port {}",
                fab_name,
                project.switch_name(&p.switch),
                p.port
            )
        })
        .collect();
    if out.is_empty() && fabric.logins.contains_key(wwn) {
        out.push(format!("fabric {}", fab_name));
    }
    out
}

/// Members of one side of a zone with aliases resolved.
#[derive(Debug, Default)]
struct ResolvedSide {
    members: Vec<String>,
    wwn_entered: bool,
    alias_used: bool,
}

fn resolve_side(
    fab: &FabricObj,
    zone: &ZoneObj,
    entered: &[String],
    config: &ZoneCheckConfig,
    out: &mut Pending,
) -> ResolvedSide {
    fn push(side: &mut ResolvedSide, mem: &str) {
        if !side.members.iter().any(|m| m == mem) {
            side.members.push(mem.to_string());
        }
    }

    let mut side = ResolvedSide::default();
    for mem in entered {
        if Wwn::is_wwn(mem, false) {
            side.wwn_entered = true;
            push(&mut side, mem);
            if config.zone_alias_use {
                let aliases = fab.aliases_for_wwn(mem);
                if !aliases.is_empty() {
                    out.push(
                        zone.rec.id.clone(),
                        AlertCode::ZoneAliasUse,
                        AlertParams::member(mem.as_str()).p1(aliases.join(", ")),
                    );
                }
            }
        } else if DomainIndex::is_di(mem) {
            push(&mut side, mem);
        } else {
            side.alias_used = true;
            match fab.aliases.get(mem) {
                Some(alias) => {
                    for m in &alias.members {
                        push(&mut side, m);
                    }
                }
                None => out.push(
                    zone.rec.id.clone(),
                    AlertCode::ZoneUndefinedAlias,
                    AlertParams::new().p0(mem.as_str()).p1(zone.name()),
                ),
            }
        }
    }
    side
}

/// Checks that a resolved member exists. Returns true for d,i members.
fn check_member(
    project: &Project,
    fab: &FabricObj,
    zone: &ZoneObj,
    mem: &str,
    config: &ZoneCheckConfig,
    out: &mut Pending,
) -> bool {
    let zone_id = || zone.rec.id.clone();

    if let Ok(di) = mem.parse::<DomainIndex>() {
        let found = project
            .switch_for_did(fab.wwn(), i64::from(di.domain()))
            .and_then(|s| s.port_for_index(i64::from(di.index())))
            .is_some();
        if !found {
            out.push(zone_id(), AlertCode::ZoneNotFound, AlertParams::member(mem));
        }
        return true;
    }

    if !Wwn::is_wwn(mem, true) {
        if config.peer_property && Wwn::is_wwn(mem, false) {
            out.push(zone_id(), AlertCode::ZonePeerProperty, AlertParams::new().p0(mem));
        }
        return false;
    }

    if !locations_in_fabric(project, fab, mem).is_empty() {
        if fab.is_base_login(mem) {
            out.push(zone_id(), AlertCode::ZoneBaseZoned, AlertParams::member(mem));
        }
        return false;
    }

    let elsewhere: Vec<String> = project
        .fabrics
        .values()
        .filter(|f| f.wwn() != fab.wwn())
        .flat_map(|f| locations_in_fabric(project, f, mem))
        .collect();
    if elsewhere.is_empty() {
        out.push(zone_id(), AlertCode::ZoneNotFound, AlertParams::member(mem));
    }
    for location in elsewhere {
        out.push(
            zone_id(),
            AlertCode::ZoneDiffFabric,
            AlertParams::member(mem).p1(location),
        );
    }
    false
}

fn first_initiator<'a>(fab: &FabricObj, members: &'a [String]) -> Option<&'a str> {
    members
        .iter()
        .find(|m| fab.logins.get(m.as_str()).map_or(false, LoginObj::is_initiator))
        .map(String::as_str)
}

fn as_set(members: &[String]) -> HashSet<&str> {
    members.iter().map(String::as_str).collect()
}

/// Membership, resolution, mixing, initiator and consistency checks for
/// every defined zone.
fn check_zones(project: &Project, fab: &FabricObj, config: &ZoneCheckConfig, out: &mut Pending) {
    let mut mismatch = false;

    for zone in fab.zones.values() {
        let id = zone.rec.id.clone();

        if fab.zonecfgs_for_zone(zone.name()).is_empty() {
            out.push(id.clone(), AlertCode::ZoneNotUsed, AlertParams::new());
        }

        let nmem = resolve_side(fab, zone, &zone.members, config, out);
        let pmem = resolve_side(fab, zone, &zone.pmembers, config, out);

        let mut has_di = false;
        let mut has_wwn = false;
        for mem in pmem.members.iter().chain(nmem.members.iter()).unique() {
            if check_member(project, fab, zone, mem, config, out) {
                has_di = true;
            } else if Wwn::is_wwn(mem, false) {
                has_wwn = true;
            }
        }

        if zone.is_peer() {
            if pmem.members.is_empty() {
                out.push(id.clone(), AlertCode::ZonePeerNoPmem, AlertParams::new());
            }
            if nmem.members.is_empty() {
                out.push(id.clone(), AlertCode::ZonePeerNoNmem, AlertParams::new());
            }
        } else {
            match nmem.members.len() {
                0 => out.push(id.clone(), AlertCode::ZoneNoMembers, AlertParams::new()),
                1 => out.push(id.clone(), AlertCode::ZoneOneMember, AlertParams::new()),
                _ => {}
            }
        }

        if config.multi_initiator {
            let initiators: Vec<&str> = if zone.is_peer() {
                [&pmem.members, &nmem.members]
                    .into_iter()
                    .filter_map(|side| first_initiator(fab, side))
                    .collect()
            } else {
                nmem.members
                    .iter()
                    .filter(|m| fab.logins.get(m.as_str()).map_or(false, LoginObj::is_initiator))
                    .map(String::as_str)
                    .collect()
            };
            if initiators.len() > 1 {
                out.push(
                    id.clone(),
                    AlertCode::ZoneMultiInitiator,
                    AlertParams::new().p0(initiators.join(", ")),
                );
            }
        }

        if has_di && has_wwn {
            out.push(id.clone(), AlertCode::ZoneMixed, AlertParams::new());
        }
        if config.wwn_alias_zone
            && (nmem.wwn_entered || pmem.wwn_entered)
            && (nmem.alias_used || pmem.alias_used)
        {
            out.push(id.clone(), AlertCode::ZoneWwnAlias, AlertParams::new());
        }

        if config.zone_mismatch {
            if let Some(eff) = fab.eff_zones.get(zone.name()) {
                if as_set(&eff.pmembers) != as_set(&pmem.members)
                    || as_set(&eff.members) != as_set(&nmem.members)
                {
                    debug!(zone = zone.name(), "effective zone differs from defined zone");
                    out.push(id.clone(), AlertCode::ZoneMismatch, AlertParams::new());
                    mismatch = true;
                }
            }
        }
    }

    if mismatch {
        if let Some(cfg) = fab.eff_zonecfg_name().filter(|n| fab.zonecfgs.contains_key(*n)) {
            out.push(
                EntityRef::zonecfg(fab.wwn(), cfg),
                AlertCode::ZoneMismatch,
                AlertParams::new(),
            );
        }
    }
}

/// Zoned state and special port types of every login with a known port.
fn check_logins(project: &Project, fab: &FabricObj, out: &mut Pending) {
    for login in fab.logins.values() {
        let wwn = login.wwn();
        let Some(port_ref) = project.ports_for_wwn(wwn).first() else {
            continue;
        };
        let did = project.switch(&port_ref.switch).and_then(|s| s.did());
        let index = project.port(port_ref).and_then(PortObj::index);
        let di_zones = match (did, index) {
            (Some(d), Some(i)) => match (u32::try_from(d), u32::try_from(i)) {
                (Ok(d), Ok(i)) => fab.zones_for_di(d, i).len(),
                _ => 0,
            },
            _ => 0,
        };

        let zoned = fab.zones_for_wwn(wwn).len() + di_zones > 0;
        let base = fab.is_base_login(wwn);
        if zoned && base {
            out.push(login.rec.id.clone(), AlertCode::LoginBaseZoned, AlertParams::new());
        } else if !zoned && !base {
            out.push(login.rec.id.clone(), AlertCode::LoginNotZoned, AlertParams::new());
        }

        match login.port_properties() {
            Some(paths::SIM_PORT) => {
                out.push(login.rec.id.clone(), AlertCode::LoginSim, AlertParams::new())
            }
            Some(paths::AMP_PORT) => {
                out.push(login.rec.id.clone(), AlertCode::LoginAmp, AlertParams::new())
            }
            _ => {}
        }
    }
}

fn login_speed(project: &Project, wwn: &str) -> Option<SpeedGen> {
    project.login_port(wwn).and_then(PortObj::speed)
}

/// Accumulated speed mismatch between two logins zoned to common targets.
#[derive(Debug, Default)]
struct SpeedPair {
    error: bool,
    targets: BTreeSet<String>,
}

/// Zone fan-out and speed mismatch checks for every target login.
///
/// Every initiator effectively zoned to a target has its speed generation
/// capped at the target's. For each pair of initiators at different capped
/// generations, a gap of two or more generations is an error and a gap of one
/// is a warning. The alert goes on the slower login and names the faster
/// login and every target the two share. Generations are counted from the
/// speed ladder, so 4G against 16G (4G, 8G, 16G) is a gap of two and an
/// error.
fn check_targets(project: &Project, fab: &FabricObj, config: &ZoneCheckConfig, out: &mut Pending) {
    let mut pairs: BTreeMap<(String, String), SpeedPair> = BTreeMap::new();

    for target in fab.logins.values().filter(|l| l.is_target()) {
        let servers = fab.eff_zoned_to_wwn(target.wwn(), ZonedRole::Initiator);
        if servers.len() > config.max_zone_participation {
            out.push(
                target.rec.id.clone(),
                AlertCode::LoginMaxZoneParticipation,
                AlertParams::new()
                    .p0(config.max_zone_participation.to_string())
                    .p1(servers.len().to_string()),
            );
        }
        if !config.speed_check {
            continue;
        }

        let cap = login_speed(project, target.wwn());
        let gens: Vec<(&String, SpeedGen)> = servers
            .iter()
            .filter_map(|s| {
                let speed = login_speed(project, s)?;
                Some((s, cap.map_or(speed, |c| speed.min(c))))
            })
            .collect();

        for (slow, slow_gen) in &gens {
            for (fast, fast_gen) in &gens {
                if slow_gen >= fast_gen {
                    continue;
                }
                let pair = pairs
                    .entry(((*slow).clone(), (*fast).clone()))
                    .or_default();
                pair.error |= fast_gen.gap(*slow_gen) >= 2;
                pair.targets.insert(target.wwn().to_string());
            }
        }
    }

    for ((slow, fast), pair) in pairs {
        let code = if pair.error {
            AlertCode::LoginSpeedDiffE
        } else {
            AlertCode::LoginSpeedDiffW
        };
        out.push(
            EntityRef::login(fab.wwn(), slow),
            code,
            AlertParams::new().p0(fast).p1(pair.targets.iter().join(", ")),
        );
    }
}

/// Port byte of the control unit port (CUP), a virtual port with no zoning.
const CUP_PORT: i64 = 0xfe;

type FabricPort<'a> = (&'a SwitchObj, &'a PortObj);

/// Port the channel `tag` of CEC `serial` is attached to, found by its RNID.
fn chpid_port<'a>(
    ports: &[FabricPort<'a>],
    serial: &str,
    tag: &str,
) -> FcdbResult<Option<FabricPort<'a>>> {
    let tag = if tag.starts_with("0x") {
        tag.to_string()
    } else {
        format!("0x{}", tag)
    };
    let exact = |path: &str, value: String, ignore_case: bool| TestNode {
        ignore_case,
        ..TestNode::leaf(path, TestKind::Match(MatchKind::Exact), TestValue::Str(value))
    };
    let tests = [
        exact(paths::RNID_SEQUENCE, serial.to_string(), true),
        exact(paths::RNID_TAG, tag, true),
        exact(paths::RNID_FLAGS, paths::RNID_FLAGS_CHANNEL.to_string(), false),
    ];
    let candidates: Vec<&PortObj> = ports.iter().map(|(_, port)| *port).collect();
    let found = match_test(&candidates, &tests, Logic::And)?;
    Ok(found
        .first()
        .and_then(|hit| ports.iter().find(|(_, port)| std::ptr::eq(*port, *hit)))
        .copied())
}

/// Domain and port index addressed by a link address. A one byte address is
/// a port on the channel's own switch; a two byte address leads with the
/// domain.
fn parse_link_addr(link: &str, own_domain: Option<i64>) -> Option<(i64, i64)> {
    let hex = link.trim_start_matches("0x");
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        2 => Some((own_domain?, i64::from_str_radix(hex, 16).ok()?)),
        4 => Some((
            i64::from_str_radix(&hex[..2], 16).ok()?,
            i64::from_str_radix(&hex[2..], 16).ok()?,
        )),
        _ => None,
    }
}

/// Effective zones naming the port by d,i or by one of its logins.
fn eff_zones_for_port<'a>(fab: &'a FabricObj, switch: &SwitchObj, port: &PortObj) -> BTreeSet<&'a str> {
    let di = switch
        .did()
        .zip(port.index())
        .and_then(|(d, i)| Some(DomainIndex::new(u32::try_from(d).ok()?, u32::try_from(i).ok()?)));
    let wwns = port.login_wwns();
    fab.eff_zones
        .values()
        .filter(|zone| {
            zone.all_members().any(|m| {
                wwns.contains(m) || di.map_or(false, |di| m.parse::<DomainIndex>().map_or(false, |d| d == di))
            })
        })
        .map(ZoneObj::name)
        .collect()
}

/// Every link address of every CHPID path in the project's IOCPs must reach a
/// port in the fabric that shares an effective zone with the channel. Paths
/// whose channel is not attached to this fabric are skipped, as are CUP
/// addresses. A fabric whose default zone grants all access has no zoning
/// requirement.
fn check_ficon_zoning(project: &Project, fab: &FabricObj, out: &mut Pending) -> FcdbResult<()> {
    if project.iocps.is_empty() {
        return Ok(());
    }
    let fabric = fab.rec.id.key();
    let ports: Vec<FabricPort<'_>> = fab
        .switch_keys
        .iter()
        .filter_map(|k| project.switch(k))
        .flat_map(|s| s.ports.values().map(move |p| (s, p)))
        .collect();
    let all_access = fab.rec.store.get(paths::EFF_DEFAULT_ZONE).and_then(Node::as_i64)
        == Some(paths::DEFAULT_ZONE_ALL_ACCESS);

    for (serial, iocp) in &project.iocps {
        for (tag, path) in iocp.paths.iter() {
            let Some((chpid_switch, chpid)) = chpid_port(&ports, serial, tag)? else {
                continue;
            };
            let chpid_zones = eff_zones_for_port(fab, chpid_switch, chpid);
            let links = path.lookup(paths::IOCP_LINK).map(Node::string_list).unwrap_or_default();
            for link in &links {
                let resolved = parse_link_addr(link, chpid_switch.did());
                if resolved.map_or(false, |(_, index)| index == CUP_PORT) {
                    continue;
                }
                let found = resolved.and_then(|(domain, index)| {
                    let switch = project.switch_for_did(fabric, domain)?;
                    let port = switch.ports.values().find(|p| p.index() == Some(index))?;
                    Some((switch, port))
                });
                let Some((link_switch, link_port)) = found else {
                    debug!(serial = %serial, chpid = tag, link = %link, "link address not in fabric");
                    out.push(
                        chpid.rec.id.clone(),
                        AlertCode::ZoneLinkNoAddr,
                        AlertParams::new()
                            .p0(link.as_str())
                            .p1(format!("{} CHPID {}", serial, tag)),
                    );
                    continue;
                };
                if all_access {
                    continue;
                }
                let shared = eff_zones_for_port(fab, link_switch, link_port)
                    .iter()
                    .any(|z| chpid_zones.contains(z));
                if !shared {
                    out.push(
                        link_port.rec.id.clone(),
                        AlertCode::ZoneLinkAddr,
                        AlertParams::new().p0(serial.as_str()).p1(tag),
                    );
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertTable;
    use crate::entity::Entity;
    use crate::node::Node;
    use crate::xref::build_cross_references;
    use fcdb_types::ZoneType;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const FAB: &str = "10:00:00:05:1e:00:00:aa";
    const FAB_B: &str = "10:00:00:05:1e:00:00:bb";
    const H1: &str = "10:00:00:00:c9:00:00:01";
    const H2: &str = "10:00:00:00:c9:00:00:02";
    const T1: &str = "50:00:00:00:00:00:00:01";

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn project() -> Project {
        let mut proj = Project::new("zc", "", Arc::new(AlertTable::builtin()));
        proj.link_switch_to_fabric(FAB, FAB);
        proj
    }

    /// Logs `wwn` in on its own port of the fabric's principal switch.
    fn login(proj: &mut Project, fabric: &str, port: &str, wwn: &str, fc4: &str) {
        proj.add_switch(fabric, None).add_port(port);
        proj.set_attr(
            &EntityRef::port(fabric, port),
            paths::FC_NEIGHBOR_WWN,
            Node::List(vec![Node::str(wwn)]),
            false,
        )
        .unwrap();
        proj.add_fabric(fabric).add_login(wwn);
        proj.set_attr(
            &EntityRef::login(fabric, wwn),
            paths::NS_FC4_FEATURES,
            Node::str(fc4),
            false,
        )
        .unwrap();
    }

    fn codes(proj: &Project, id: &EntityRef) -> Vec<AlertCode> {
        proj.entity(id)
            .map(|e| e.alerts().iter().map(|a| a.code).collect())
            .unwrap_or_default()
    }

    fn analyze(proj: &mut Project) {
        build_cross_references(proj);
        analyze_fabric(proj, FAB, &ZoneCheckConfig::default()).unwrap();
    }

    #[test]
    fn test_zone_member_counts() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_zone("empty");
        fab.add_zone("single").add_members(strings(&[H1]));
        let peer = fab.add_zone("peer");
        peer.zone_type = ZoneType::UserPeer;
        peer.add_members(strings(&[H1]));
        fab.add_zonecfg("cfg")
            .add_members(strings(&["empty", "single", "peer"]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        analyze(&mut proj);

        assert_eq!(codes(&proj, &EntityRef::zone(FAB, "empty")), vec![AlertCode::ZoneNoMembers]);
        assert_eq!(codes(&proj, &EntityRef::zone(FAB, "single")), vec![AlertCode::ZoneOneMember]);
        assert_eq!(codes(&proj, &EntityRef::zone(FAB, "peer")), vec![AlertCode::ZonePeerNoPmem]);
    }

    #[test]
    fn test_alias_checks() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_alias("A1").add_members(strings(&[H1]));
        fab.add_alias("A2").add_members(strings(&[H1]));
        fab.add_alias("empty_used");
        fab.add_alias("empty_unused");
        fab.add_zone("z").add_members(strings(&["A1", "A2", "empty_used"]));
        fab.add_zonecfg("cfg").add_members(strings(&["z"]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        analyze(&mut proj);

        assert!(codes(&proj, &EntityRef::alias(FAB, "A1")).is_empty());
        assert_eq!(codes(&proj, &EntityRef::alias(FAB, "A2")), vec![AlertCode::ZoneDupAlias]);
        assert_eq!(
            codes(&proj, &EntityRef::alias(FAB, "empty_used")),
            vec![AlertCode::ZoneNullAliasUsed]
        );
        assert_eq!(
            codes(&proj, &EntityRef::alias(FAB, "empty_unused")),
            vec![AlertCode::ZoneAliasNotUsed, AlertCode::ZoneNullAlias]
        );
    }

    #[test]
    fn test_member_resolution_and_mixing() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_alias("host1").add_members(strings(&[H1]));
        fab.add_zone("z").add_members(strings(&[H1, "host1", "missing_alias", "5,5", T1]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        analyze(&mut proj);

        let zone = proj.entity(&EntityRef::zone(FAB, "z")).unwrap();
        let alerts: Vec<(AlertCode, Option<&str>)> =
            zone.alerts().iter().map(|a| (a.code, a.member())).collect();
        assert!(alerts.contains(&(AlertCode::ZoneNotUsed, None)));
        assert!(alerts.contains(&(AlertCode::ZoneAliasUse, Some(H1))));
        assert!(alerts.contains(&(AlertCode::ZoneUndefinedAlias, None)));
        assert!(alerts.contains(&(AlertCode::ZoneNotFound, Some("5,5"))));
        assert!(alerts.contains(&(AlertCode::ZoneNotFound, Some(T1))));
        assert!(alerts.contains(&(AlertCode::ZoneMixed, None)));
        assert!(alerts.contains(&(AlertCode::ZoneWwnAlias, None)));
    }

    #[test]
    fn test_member_found_in_other_fabric() {
        let mut proj = project();
        proj.link_switch_to_fabric(FAB_B, FAB_B);
        proj.add_fabric(FAB)
            .add_zone("z")
            .add_members(strings(&[H1, H2]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        login(&mut proj, FAB_B, "0/9", H2, "FCP-Target");
        analyze(&mut proj);

        let zone = proj.entity(&EntityRef::zone(FAB, "z")).unwrap();
        let diff: Vec<_> = zone
            .alerts()
            .iter()
            .filter(|a| a.code == AlertCode::ZoneDiffFabric)
            .collect();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].member(), Some(H2));
        assert_eq!(
            diff[0].p1.as_deref(),
            Some(format!("fabric {}, switch {}, port 0/9", FAB_B, FAB_B).as_str())
        );
        assert!(!codes(&proj, &EntityRef::zone(FAB, "z")).contains(&AlertCode::ZoneNotFound));
    }

    #[test]
    fn test_multi_initiator_and_peer_property() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_zone("z").add_members(strings(&[H1, H2, "00:02:00:00:00:00:00:01"]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        login(&mut proj, FAB, "0/2", H2, "FCP-Initiator");
        analyze(&mut proj);

        let zone = proj.entity(&EntityRef::zone(FAB, "z")).unwrap();
        let multi = zone
            .alerts()
            .iter()
            .find(|a| a.code == AlertCode::ZoneMultiInitiator)
            .unwrap();
        assert_eq!(multi.p0.as_deref(), Some(format!("{}, {}", H1, H2).as_str()));
        assert!(codes(&proj, &EntityRef::zone(FAB, "z")).contains(&AlertCode::ZonePeerProperty));
    }

    #[test]
    fn test_mismatch_flags_zone_and_cfg() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_zone("z").add_members(strings(&[H1, T1]));
        fab.add_zonecfg("prod").add_members(strings(&["z"]));
        fab.add_eff_zone("z").add_members(strings(&[H1]));
        fab.eff_zonecfg = Some("prod".to_string());
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        login(&mut proj, FAB, "0/2", T1, "FCP-Target");
        analyze(&mut proj);

        assert!(codes(&proj, &EntityRef::zone(FAB, "z")).contains(&AlertCode::ZoneMismatch));
        assert_eq!(
            codes(&proj, &EntityRef::zonecfg(FAB, "prod")),
            vec![AlertCode::ZoneMismatch]
        );
    }

    #[test]
    fn test_login_zoned_state() {
        let mut proj = project();
        proj.add_fabric(FAB).add_zone("z").add_members(strings(&[H1, T1]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        login(&mut proj, FAB, "0/2", T1, "FCP-Target");
        login(&mut proj, FAB, "0/3", H2, "FCP-Initiator");
        proj.set_attr(
            &EntityRef::login(FAB, H2),
            paths::NS_PORT_PROPERTIES,
            Node::str(paths::SIM_PORT),
            false,
        )
        .unwrap();
        analyze(&mut proj);

        assert!(codes(&proj, &EntityRef::login(FAB, H1)).is_empty());
        assert_eq!(
            codes(&proj, &EntityRef::login(FAB, H2)),
            vec![AlertCode::LoginNotZoned, AlertCode::LoginSim]
        );
    }

    const H3: &str = "10:00:00:00:c9:00:00:03";

    fn speed(proj: &mut Project, port: &str, gbps: i64) {
        proj.set_attr(
            &EntityRef::port(FAB, port),
            paths::FC_SPEED,
            Node::from(gbps * 1_000_000_000),
            false,
        )
        .unwrap();
    }

    fn speed_fabric(target_gbps: i64) -> Project {
        let mut proj = project();
        proj.add_fabric(FAB)
            .add_eff_zone("z")
            .add_members(strings(&[T1, H1, H2, H3]));
        login(&mut proj, FAB, "0/0", T1, "FCP-Target");
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        login(&mut proj, FAB, "0/2", H2, "FCP-Initiator");
        login(&mut proj, FAB, "0/3", H3, "FCP-Initiator");
        speed(&mut proj, "0/0", target_gbps);
        speed(&mut proj, "0/1", 32);
        speed(&mut proj, "0/2", 16);
        speed(&mut proj, "0/3", 4);
        proj
    }

    fn speed_alerts(proj: &Project, wwn: &str) -> Vec<(AlertCode, String, String)> {
        proj.entity(&EntityRef::login(FAB, wwn))
            .unwrap()
            .alerts()
            .iter()
            .filter(|a| {
                matches!(a.code, AlertCode::LoginSpeedDiffW | AlertCode::LoginSpeedDiffE)
            })
            .map(|a| {
                (
                    a.code,
                    a.p0.clone().unwrap_or_default(),
                    a.p1.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_speed_pairs_graded_by_generation_gap() {
        let mut proj = speed_fabric(32);
        analyze(&mut proj);

        assert!(speed_alerts(&proj, H1).is_empty());
        assert_eq!(
            speed_alerts(&proj, H2),
            vec![(AlertCode::LoginSpeedDiffW, H1.to_string(), T1.to_string())]
        );
        // 4G is three generations below 32G and two below 16G.
        assert_eq!(
            speed_alerts(&proj, H3),
            vec![
                (AlertCode::LoginSpeedDiffE, H1.to_string(), T1.to_string()),
                (AlertCode::LoginSpeedDiffE, H2.to_string(), T1.to_string()),
            ]
        );
    }

    #[test]
    fn test_speed_capped_at_target() {
        let mut proj = speed_fabric(8);
        analyze(&mut proj);

        assert!(speed_alerts(&proj, H1).is_empty());
        assert!(speed_alerts(&proj, H2).is_empty());
        assert_eq!(
            speed_alerts(&proj, H3),
            vec![
                (AlertCode::LoginSpeedDiffW, H1.to_string(), T1.to_string()),
                (AlertCode::LoginSpeedDiffW, H2.to_string(), T1.to_string()),
            ]
        );
    }

    #[test]
    fn test_zone_participation_limit() {
        let mut proj = speed_fabric(32);
        build_cross_references(&mut proj);
        let config = ZoneCheckConfig {
            max_zone_participation: 2,
            speed_check: false,
            ..ZoneCheckConfig::default()
        };
        analyze_fabric(&mut proj, FAB, &config).unwrap();

        let target = proj.entity(&EntityRef::login(FAB, T1)).unwrap();
        let alert = target
            .alerts()
            .iter()
            .find(|a| a.code == AlertCode::LoginMaxZoneParticipation)
            .unwrap();
        assert_eq!(alert.p0.as_deref(), Some("2"));
        assert_eq!(alert.p1.as_deref(), Some("3"));
        assert!(speed_alerts(&proj, H3).is_empty());
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let mut proj = project();
        proj.add_fabric(FAB).add_zone("z");
        analyze(&mut proj);
        let first = proj.all_alerts().len();
        assert_eq!(analyze_fabric(&mut proj, FAB, &ZoneCheckConfig::default()).unwrap(), 0);
        assert_eq!(proj.all_alerts().len(), first);
    }

    #[test]
    fn test_checks_can_be_disabled() {
        let mut proj = project();
        let fab = proj.add_fabric(FAB);
        fab.add_alias("host1").add_members(strings(&[H1]));
        fab.add_zone("z").add_members(strings(&[H1, "host1"]));
        login(&mut proj, FAB, "0/1", H1, "FCP-Initiator");
        build_cross_references(&mut proj);
        let config = ZoneCheckConfig {
            zone_alias_use: false,
            wwn_alias_zone: false,
            ..ZoneCheckConfig::default()
        };
        analyze_fabric(&mut proj, FAB, &config).unwrap();
        let zone_codes = codes(&proj, &EntityRef::zone(FAB, "z"));
        assert!(!zone_codes.contains(&AlertCode::ZoneAliasUse));
        assert!(!zone_codes.contains(&AlertCode::ZoneWwnAlias));
    }

    #[test]
    fn test_link_address_parsing() {
        assert_eq!(parse_link_addr("2104", None), Some((0x21, 0x04)));
        assert_eq!(parse_link_addr("0x2104", Some(1)), Some((0x21, 0x04)));
        assert_eq!(parse_link_addr("0a", Some(0x21)), Some((0x21, 0x0a)));
        assert_eq!(parse_link_addr("0a", None), None);
        assert_eq!(parse_link_addr("zz04", None), None);
        assert_eq!(parse_link_addr("210", None), None);
    }

    #[test]
    fn test_ficon_check_can_be_disabled() {
        let mut proj = project();
        proj.set_attr(&EntityRef::Switch(FAB.to_string()), paths::SWITCH_DID, Node::from(1i64), false)
            .unwrap();
        login(&mut proj, FAB, "0/0", H1, "FC-SB-2");
        for (path, value) in [
            (paths::RNID_SEQUENCE, "CEC1"),
            (paths::RNID_TAG, "0x80"),
            (paths::RNID_FLAGS, paths::RNID_FLAGS_CHANNEL),
        ] {
            proj.set_attr(&EntityRef::port(FAB, "0/0"), path, Node::str(value), false)
                .unwrap();
        }
        proj.add_iocp("CEC1")
            .set_path("80", crate::node::node_map([(paths::IOCP_LINK, Node::str("0109"))]))
            .unwrap();
        build_cross_references(&mut proj);

        let config = ZoneCheckConfig {
            ficon_zoning: false,
            ..ZoneCheckConfig::default()
        };
        analyze_fabric(&mut proj, FAB, &config).unwrap();
        assert!(!codes(&proj, &EntityRef::port(FAB, "0/0")).contains(&AlertCode::ZoneLinkNoAddr));

        analyze_fabric(&mut proj, FAB, &ZoneCheckConfig::default()).unwrap();
        assert!(codes(&proj, &EntityRef::port(FAB, "0/0")).contains(&AlertCode::ZoneLinkNoAddr));
    }

    #[test]
    fn test_unknown_fabric() {
        let mut proj = project();
        assert!(analyze_fabric(&mut proj, "nope", &ZoneCheckConfig::default()).is_err());
    }
}
