//! Well known attribute paths.
//!
//! Attribute paths mirror the management API: the first segments name the
//! module and container the value was read from.

/// Prefix under which name server entries are stored on a login.
pub const NS: &str = "brocade-name-server/fibrechannel-name-server";
pub const NS_FC4_FEATURES: &str = "brocade-name-server/fibrechannel-name-server/fc4-features";
pub const NS_PORT_PROPERTIES: &str =
    "brocade-name-server/fibrechannel-name-server/port-properties";
pub const NS_PORT_SYMB: &str = "brocade-name-server/fibrechannel-name-server/port-symbolic-name";

pub const FC_NEIGHBOR_WWN: &str = "fibrechannel/neighbor/wwn";
pub const FC_SPEED: &str = "fibrechannel/speed";
pub const FC_INDEX: &str = "fibrechannel/index";
pub const FC_NAME: &str = "fibrechannel/name";

pub const SWITCH_DID: &str = "brocade-fibrechannel-switch/fibrechannel-switch/domain-id";
pub const FABRIC_SWITCH_DID: &str = "brocade-fabric/fabric-switch/domain-id";
pub const SWITCH_PRINCIPAL: &str = "brocade-fibrechannel-switch/fibrechannel-switch/principal";
pub const SWITCH_NAME: &str = "brocade-fibrechannel-switch/fibrechannel-switch/user-friendly-name";
pub const FABRIC_SWITCH_NAME: &str = "brocade-fabric/fabric-switch/switch-user-friendly-name";
pub const FABRIC_NAME: &str = "brocade-fibrechannel-switch/fibrechannel-switch/fabric-user-friendly-name";
pub const LS_FABRIC_NAME: &str =
    "brocade-fibrechannel-logical-switch/fibrechannel-logical-switch/fabric-user-friendly-name";

pub const EFF_CFG_NAME: &str = "brocade-zone/effective-configuration/cfg-name";
pub const EFF_DEFAULT_ZONE: &str = "brocade-zone/effective-configuration/default-zone-access";
/// `default-zone-access` value granting every device access to every other.
pub const DEFAULT_ZONE_ALL_ACCESS: i64 = 1;

pub const RNID_SEQUENCE: &str = "rnid/sequence-number";
pub const RNID_TAG: &str = "rnid/tag";
pub const RNID_FLAGS: &str = "rnid/flags";
/// `rnid/flags` value of a valid channel (CHPID) node descriptor.
pub const RNID_FLAGS_CHANNEL: &str = "0x10";

/// Link addresses of a CHPID path in an IOCP.
pub const IOCP_LINK: &str = "link";

/// `port-properties` marker of a SIM port.
pub const SIM_PORT: &str = "SIM Port";
/// `port-properties` marker of an analytics (AMP) port.
pub const AMP_PORT: &str = "I/O Analytics Port";

/// Keys whose values are IP addresses and are masked before storage.
pub const IP_ADDRESS_KEYS: [&str; 5] = [
    "ip-address",
    "ip-static-gateway",
    "ip-static-gateway-list",
    "dns-servers",
    "ip-address-list",
];
