//! Capture ingestion through analysis
//!
//! Tests the path from recorded management API responses to alerts.

use fcdb_core::{
    analyze_project, build_cross_references, AlertCode, CaptureSource, EntityRef, ExitStatus,
    FcdbError, Ingestor, Node, Project, Scope, ZoneCheckConfig,
};
use fcdb_test::{empty_project, payloads, wwns::*, AlertVerifier, INITIATOR, TARGET};
use pretty_assertions::assert_eq;
use serde_json::json;

fn capture() -> CaptureSource {
    let content = payloads::capture(
        CHASSIS,
        FABRIC_A,
        &[
            (payloads::SWITCH_URI, payloads::switch(FABRIC_A, 1, "core1")),
            (
                payloads::PORT_URI,
                payloads::ports(&[
                    ("0/1", 1, 32, HOST_1),
                    ("0/2", 2, 32, TARGET_1),
                    ("0/3", 3, 16, HOST_2),
                ]),
            ),
            (
                payloads::NAME_SERVER_URI,
                payloads::name_server(&[
                    (HOST_1, INITIATOR),
                    (TARGET_1, TARGET),
                    (HOST_2, INITIATOR),
                ]),
            ),
            (
                payloads::DEFINED_ZONING_URI,
                payloads::defined_zoning(
                    "prod",
                    &[("z1", &["host1", TARGET_1]), ("z_unused", &[HOST_1])],
                    &[("host1", &[HOST_1])],
                ),
            ),
            (
                payloads::EFFECTIVE_ZONING_URI,
                payloads::effective_zoning("prod", &[("z1", &[HOST_1, TARGET_1])]),
            ),
        ],
    );
    CaptureSource::from_json(&content).unwrap()
}

fn ingest_and_analyze(source: &CaptureSource) -> Project {
    let mut project = empty_project("pipeline");
    let summary = source.ingest(&Ingestor::new(), &mut project);
    assert_eq!(summary.failed, 0);
    build_cross_references(&mut project);
    analyze_project(&mut project, &ZoneCheckConfig::default());
    project
}

#[test]
fn test_capture_to_alerts() {
    let project = ingest_and_analyze(&capture());
    let verifier = AlertVerifier::new(&project);

    let switch = project.switch(FABRIC_A).unwrap();
    assert_eq!(switch.did(), Some(1));
    assert_eq!(switch.chassis_key.as_deref(), Some(CHASSIS));

    let fabric = project.fabric(FABRIC_A).unwrap();
    assert_eq!(fabric.eff_zonecfg.as_deref(), Some("prod"));
    assert!(fabric.logins[TARGET_1].is_target());

    verifier
        .assert_alert(&EntityRef::zone(FABRIC_A, "z_unused"), AlertCode::ZoneNotUsed)
        .unwrap();
    verifier
        .assert_alert(&EntityRef::login(FABRIC_A, HOST_2), AlertCode::LoginNotZoned)
        .unwrap();
    verifier
        .assert_no_alert(&EntityRef::login(FABRIC_A, HOST_1), AlertCode::LoginNotZoned)
        .unwrap();
    verifier
        .assert_no_alert(&EntityRef::zone(FABRIC_A, "z1"), AlertCode::ZoneMismatch)
        .unwrap();
    verifier.assert_status(ExitStatus::Ok).unwrap();
}

#[test]
fn test_replaying_capture_is_idempotent() {
    let source = capture();
    let mut project = ingest_and_analyze(&source);
    let alerts = project.all_alerts().len();

    let summary = source.ingest(&Ingestor::new(), &mut project);
    assert_eq!(summary.conflicts, 0);
    build_cross_references(&mut project);
    let analysis = analyze_project(&mut project, &ZoneCheckConfig::default());

    assert_eq!(analysis.alerts_added, 0);
    assert_eq!(project.all_alerts().len(), alerts);
    AlertVerifier::new(&project)
        .assert_status(ExitStatus::Ok)
        .unwrap();
}

#[test]
fn test_switch_ip_addresses_masked() {
    let project = ingest_and_analyze(&capture());
    let switch = project.switch(FABRIC_A).unwrap();
    let ip = switch
        .rec
        .store
        .get("brocade-fibrechannel-switch/fibrechannel-switch/ip-address/ip-address")
        .map(Node::string_list);
    assert_eq!(ip, Some(vec!["xxx.xxx.xxx.1".to_string()]));
}

#[test]
fn test_fetch_error_recorded_and_ingestion_continues() {
    let content = payloads::capture(
        CHASSIS,
        FABRIC_A,
        &[
            (payloads::SWITCH_URI, payloads::switch(FABRIC_A, 1, "core1")),
            (payloads::PORT_URI, payloads::fetch_error(503, "service unavailable")),
        ],
    );
    let source = CaptureSource::from_json(&content).unwrap();
    let mut project = empty_project("pipeline");
    let summary = source.ingest(&Ingestor::new(), &mut project);

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.failed, 1);
    assert!(project.switch(FABRIC_A).is_some());
    AlertVerifier::new(&project)
        .assert_status(ExitStatus::ApiWarn)
        .unwrap();
}

#[test]
fn test_conflicting_payload_raises_attr_conflict() {
    let mut project = empty_project("merge");
    let ingestor = Ingestor::new();
    let scope = Scope::switch(CHASSIS, FABRIC_A);
    let first = Node::from(json!({"fibrechannel": [{"name": "0/1", "index": 1, "port-type": "F_Port"}]}));
    let second = Node::from(json!({"fibrechannel": [{"name": "0/1", "index": 1, "port-type": "E_Port"}]}));

    ingestor
        .apply(&mut project, &scope, payloads::PORT_URI, first)
        .unwrap();
    ingestor
        .apply(&mut project, &scope, payloads::PORT_URI, second)
        .unwrap();

    let port_id = EntityRef::port(FABRIC_A, "0/1");
    let verifier = AlertVerifier::new(&project);
    verifier
        .assert_alert_count(&port_id, AlertCode::AttrConflict, 1)
        .unwrap();
    let port = &project.switch(FABRIC_A).unwrap().ports["0/1"];
    assert_eq!(
        port.rec.store.get("fibrechannel/port-type"),
        Some(&Node::str("F_Port"))
    );
    verifier.assert_status(ExitStatus::Warn).unwrap();
}

#[test]
fn test_name_server_without_fabric_is_api_error() {
    let mut project = empty_project("ns");
    let err = Ingestor::new()
        .apply(
            &mut project,
            &Scope::chassis(CHASSIS),
            payloads::NAME_SERVER_URI,
            Node::from(payloads::name_server(&[(HOST_1, INITIATOR)])),
        )
        .unwrap_err();
    assert!(matches!(err, FcdbError::Api { .. }));
    assert_eq!(project.exit_status(), ExitStatus::ApiWarn);
}
