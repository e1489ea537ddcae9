//! Zone analysis scenarios
//!
//! Each scenario builds a fabric, cross references it and runs the full
//! analysis before checking the alerts that land on each entity.

use fcdb_core::{
    analyze_project, build_cross_references, paths, plain, AlertCode, AlertTable, EntityRef,
    ExitStatus, Node, Project, ZoneCheckConfig,
};
use fcdb_test::{wwns::*, AlertVerifier, FabricBuilder, TARGET};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn analyze(project: &mut Project) {
    build_cross_references(project);
    analyze_project(project, &ZoneCheckConfig::default());
}

fn speed_alerts(project: &Project, wwn: &str) -> Vec<(AlertCode, String, String)> {
    let verifier = AlertVerifier::new(project);
    let id = EntityRef::login(FABRIC_A, wwn);
    let mut out: Vec<_> = verifier
        .alerts(&id)
        .unwrap()
        .iter()
        .filter(|a| matches!(a.code, AlertCode::LoginSpeedDiffW | AlertCode::LoginSpeedDiffE))
        .map(|a| {
            (
                a.code,
                a.p0.clone().unwrap_or_default(),
                a.p1.clone().unwrap_or_default(),
            )
        })
        .collect();
    out.sort();
    out
}

/// Scenario: a zone with no members and one with a single member
#[test]
fn test_zone_member_count_alerts() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .zone("z_empty", &[])
        .zone("z_single", &[HOST_1])
        .zonecfg("prod", &["z_empty", "z_single"])
        .build()
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    let empty = EntityRef::zone(FABRIC_A, "z_empty");
    verifier.assert_alert(&empty, AlertCode::ZoneNoMembers).unwrap();
    verifier.assert_no_alert(&empty, AlertCode::ZoneNotUsed).unwrap();
    verifier
        .assert_alert(&EntityRef::zone(FABRIC_A, "z_single"), AlertCode::ZoneOneMember)
        .unwrap();
    // Member count alerts are analysis findings, not processing errors.
    verifier.assert_status(ExitStatus::Ok).unwrap();
}

/// Scenario: two aliases resolving to the same WWN
#[test]
fn test_duplicate_alias_flagged_once() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .target(TARGET_1)
        .alias("host1_a", &[HOST_1])
        .alias("host1_b", &[HOST_1])
        .zone("z1", &["host1_a", TARGET_1])
        .zone("z2", &["host1_b", TARGET_1])
        .zonecfg("prod", &["z1", "z2"])
        .build()
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    assert_eq!(verifier.count_in_project(AlertCode::ZoneDupAlias), 1);
    verifier
        .assert_no_alert(&EntityRef::alias(FABRIC_A, "host1_a"), AlertCode::ZoneDupAlias)
        .unwrap();
    let dup = verifier
        .assert_alert(&EntityRef::alias(FABRIC_A, "host1_b"), AlertCode::ZoneDupAlias)
        .unwrap();
    assert_eq!(dup.p0.as_deref(), Some("host1_a"));
}

/// Scenario: running the analysis twice adds nothing the second time
#[test]
fn test_analysis_idempotent() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .initiator(HOST_2)
        .target(TARGET_1)
        .alias("host1", &[HOST_1])
        .zone("z1", &["host1", HOST_2, TARGET_1, "undefined_alias"])
        .zonecfg("prod", &["z1"])
        .enable("prod")
        .build()
        .unwrap();

    analyze(&mut project);
    let first: Vec<String> = project
        .all_alerts()
        .iter()
        .map(|(id, a)| format!("{} {}", id, a.code))
        .collect();
    assert!(!first.is_empty());

    build_cross_references(&mut project);
    let summary = analyze_project(&mut project, &ZoneCheckConfig::default());
    assert_eq!(summary.alerts_added, 0);
    let second: Vec<String> = project
        .all_alerts()
        .iter()
        .map(|(id, a)| format!("{} {}", id, a.code))
        .collect();
    assert_eq!(first, second);
}

/// Scenario: graded speed differences among initiators sharing a target
///
/// The target is reachable through two effective zones but is listed once
/// per pair.
#[test]
fn test_speed_differences_against_shared_target() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .login(TARGET_1, TARGET, Some(32))
        .login(HOST_1, fcdb_test::INITIATOR, Some(32))
        .login(HOST_2, fcdb_test::INITIATOR, Some(16))
        .login(HOST_3, fcdb_test::INITIATOR, Some(4))
        .eff_zone("z1", &[TARGET_1, HOST_1, HOST_2, HOST_3])
        .eff_zone("z2", &[TARGET_1, HOST_3])
        .build()
        .unwrap();
    analyze(&mut project);

    assert!(speed_alerts(&project, HOST_1).is_empty());
    assert_eq!(
        speed_alerts(&project, HOST_2),
        vec![(AlertCode::LoginSpeedDiffW, HOST_1.to_string(), TARGET_1.to_string())]
    );
    assert_eq!(
        speed_alerts(&project, HOST_3),
        vec![
            (AlertCode::LoginSpeedDiffE, HOST_1.to_string(), TARGET_1.to_string()),
            (AlertCode::LoginSpeedDiffE, HOST_2.to_string(), TARGET_1.to_string()),
        ]
    );
}

/// Scenario: 4G against 16G is two generations apart and graded as an error
#[test]
fn test_two_generation_gap_is_error() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .login(TARGET_1, TARGET, Some(16))
        .login(HOST_1, fcdb_test::INITIATOR, Some(16))
        .login(HOST_2, fcdb_test::INITIATOR, Some(4))
        .eff_zone("z1", &[TARGET_1, HOST_1, HOST_2])
        .build()
        .unwrap();
    analyze(&mut project);

    assert_eq!(
        speed_alerts(&project, HOST_2),
        vec![(AlertCode::LoginSpeedDiffE, HOST_1.to_string(), TARGET_1.to_string())]
    );
    assert!(speed_alerts(&project, HOST_1).is_empty());
}

/// Scenario: the slower login lists every target it shares with the faster one
#[test]
fn test_speed_difference_lists_each_target() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .login(TARGET_1, TARGET, Some(32))
        .login(TARGET_2, TARGET, Some(32))
        .login(HOST_1, fcdb_test::INITIATOR, Some(32))
        .login(HOST_2, fcdb_test::INITIATOR, Some(16))
        .eff_zone("z1", &[TARGET_1, HOST_1, HOST_2])
        .eff_zone("z2", &[TARGET_2, HOST_1, HOST_2])
        .build()
        .unwrap();
    analyze(&mut project);

    assert_eq!(
        speed_alerts(&project, HOST_2),
        vec![(
            AlertCode::LoginSpeedDiffW,
            HOST_1.to_string(),
            format!("{}, {}", TARGET_1, TARGET_2)
        )]
    );
}

/// Scenario: a zone member logged into a different fabric
#[test]
fn test_member_in_other_fabric() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .zone("z1", &[HOST_1, TARGET_1])
        .zonecfg("prod", &["z1"])
        .fabric(FABRIC_B)
        .target(TARGET_1)
        .build()
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    let zone = EntityRef::zone(FABRIC_A, "z1");
    let alert = verifier
        .assert_member_alert(&zone, AlertCode::ZoneDiffFabric, TARGET_1)
        .unwrap();
    assert_eq!(
        alert.p1.as_deref(),
        Some(format!("fabric {}, switch {}, port 0/0", FABRIC_B, FABRIC_B).as_str())
    );
    verifier.assert_no_alert(&zone, AlertCode::ZoneNotFound).unwrap();
}

/// Scenario: a member logged in nowhere
#[test]
fn test_member_not_found() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .zone("z1", &[HOST_1, TARGET_1])
        .zonecfg("prod", &["z1"])
        .build()
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    let zone = EntityRef::zone(FABRIC_A, "z1");
    verifier
        .assert_member_alert(&zone, AlertCode::ZoneNotFound, TARGET_1)
        .unwrap();
    verifier.assert_alert_count(&zone, AlertCode::ZoneNotFound, 1).unwrap();
}

/// Scenario: an effective zone that differs from its definition
#[test]
fn test_effective_zone_mismatch() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .initiator(HOST_2)
        .target(TARGET_1)
        .zone("z1", &[HOST_1, TARGET_1])
        .zonecfg("prod", &["z1"])
        .enable("prod")
        .build()
        .unwrap();
    project
        .fabrics
        .get_mut(FABRIC_A)
        .unwrap()
        .zones
        .get_mut("z1")
        .unwrap()
        .add_members([HOST_2.to_string()]);
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    verifier
        .assert_alert(&EntityRef::zone(FABRIC_A, "z1"), AlertCode::ZoneMismatch)
        .unwrap();
    verifier
        .assert_alert(&EntityRef::zonecfg(FABRIC_A, "prod"), AlertCode::ZoneMismatch)
        .unwrap();
}

/// Scenario: analysis results survive a dump and reload
#[test]
fn test_analyzed_project_round_trips() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .initiator(HOST_1)
        .zone("z_empty", &[])
        .zonecfg("prod", &["z_empty"])
        .build()
        .unwrap();
    analyze(&mut project);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("analyzed.json");
    plain::write_file(&project, &path).unwrap();
    let reloaded = plain::read_file(&path, Arc::new(AlertTable::builtin())).unwrap();

    assert_eq!(reloaded.all_alerts().len(), project.all_alerts().len());
    assert_eq!(reloaded.exit_status(), project.exit_status());
    AlertVerifier::new(&reloaded)
        .assert_alert(&EntityRef::zone(FABRIC_A, "z_empty"), AlertCode::ZoneNoMembers)
        .unwrap();
}

const CEC: &str = "CEC0000001";

/// Domain 0x21 with a channel on port 0/0 and two control units on 0/1 and
/// 0/2. Only the channel and 0/1 share the enabled zone.
fn ficon_fabric() -> FabricBuilder {
    FabricBuilder::new(FABRIC_A)
        .domain(0x21)
        .channel(HOST_1, CEC, "c0")
        .target(TARGET_1)
        .target(TARGET_2)
        .iocp_path(CEC, "c0", &["2101", "2102", "2105", "21fe"])
        .zone("ficon", &["33,0", TARGET_1])
        .zonecfg("prod", &["ficon"])
        .enable("prod")
}

/// Scenario: channel paths checked against the effective zoning
#[test]
fn test_ficon_link_addresses() {
    let mut project = ficon_fabric().build().unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    verifier
        .assert_no_alert(&EntityRef::port(FABRIC_A, "0/1"), AlertCode::ZoneLinkAddr)
        .unwrap();
    let unzoned = verifier
        .assert_alert(&EntityRef::port(FABRIC_A, "0/2"), AlertCode::ZoneLinkAddr)
        .unwrap();
    assert_eq!(unzoned.p0.as_deref(), Some(CEC));
    assert_eq!(unzoned.p1.as_deref(), Some("c0"));

    // 0x05 has no port and the CUP address 0xfe is never checked.
    let channel = EntityRef::port(FABRIC_A, "0/0");
    verifier
        .assert_alert_count(&channel, AlertCode::ZoneLinkNoAddr, 1)
        .unwrap();
    let missing = verifier
        .assert_alert(&channel, AlertCode::ZoneLinkNoAddr)
        .unwrap();
    assert_eq!(missing.p0.as_deref(), Some("2105"));
    assert_eq!(missing.p1.as_deref(), Some(format!("{} CHPID c0", CEC).as_str()));
}

/// Scenario: a default zone with all access lifts the zoning requirement
#[test]
fn test_ficon_all_access_default_zone() {
    let mut project = ficon_fabric().build().unwrap();
    project
        .set_attr(
            &EntityRef::Fabric(FABRIC_A.to_string()),
            paths::EFF_DEFAULT_ZONE,
            Node::from(paths::DEFAULT_ZONE_ALL_ACCESS),
            false,
        )
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    assert_eq!(verifier.count_in_project(AlertCode::ZoneLinkAddr), 0);
    assert_eq!(verifier.count_in_project(AlertCode::ZoneLinkNoAddr), 1);
}

/// Scenario: a channel attached to another fabric is not checked here
#[test]
fn test_ficon_channel_outside_fabric_skipped() {
    let mut project = FabricBuilder::new(FABRIC_A)
        .domain(0x21)
        .target(TARGET_1)
        .iocp_path(CEC, "c0", &["2100"])
        .build()
        .unwrap();
    analyze(&mut project);

    let verifier = AlertVerifier::new(&project);
    assert_eq!(verifier.count_in_project(AlertCode::ZoneLinkAddr), 0);
    assert_eq!(verifier.count_in_project(AlertCode::ZoneLinkNoAddr), 0);
}
