//! Alerts, severities and project status flags.
//!
//! An alert is a structured diagnostic attached to the entity it describes.
//! The built-in [`AlertTable`] maps each [`AlertCode`] to a message template,
//! a severity and, for some codes, a project status bit. The table can be
//! adjusted from configuration once, before the project is created, and is
//! shared read-only afterwards.

use crate::error::{ErrorOrigin, FcdbError, FcdbResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Alert severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Severity {
    type Err = FcdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "general" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(FcdbError::user("severity", format!("unknown severity '{}'", s))),
        }
    }
}

/// One of the six project status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFlag {
    Warn,
    ApiWarn,
    UserWarn,
    Error,
    ApiError,
    UserError,
}

impl StatusFlag {
    pub const fn bit(&self) -> u8 {
        match self {
            StatusFlag::Warn => 0x01,
            StatusFlag::ApiWarn => 0x02,
            StatusFlag::UserWarn => 0x04,
            StatusFlag::Error => 0x08,
            StatusFlag::ApiError => 0x10,
            StatusFlag::UserError => 0x20,
        }
    }

    /// Flag raised by an error of the given origin.
    pub const fn for_origin(origin: ErrorOrigin, fatal: bool) -> Self {
        match (origin, fatal) {
            (ErrorOrigin::Internal, false) => StatusFlag::Warn,
            (ErrorOrigin::Api, false) => StatusFlag::ApiWarn,
            (ErrorOrigin::User, false) => StatusFlag::UserWarn,
            (ErrorOrigin::Internal, true) => StatusFlag::Error,
            (ErrorOrigin::Api, true) => StatusFlag::ApiError,
            (ErrorOrigin::User, true) => StatusFlag::UserError,
        }
    }

    const fn exit_status(&self) -> ExitStatus {
        match self {
            StatusFlag::Warn => ExitStatus::Warn,
            StatusFlag::ApiWarn => ExitStatus::ApiWarn,
            StatusFlag::UserWarn => ExitStatus::UserWarn,
            StatusFlag::Error => ExitStatus::Error,
            StatusFlag::ApiError => ExitStatus::ApiError,
            StatusFlag::UserError => ExitStatus::UserError,
        }
    }
}

/// Scan order for [`StatusFlags::exit_status`], highest priority first.
const EXIT_PRIORITY: [StatusFlag; 6] = [
    StatusFlag::UserError,
    StatusFlag::ApiError,
    StatusFlag::Error,
    StatusFlag::UserWarn,
    StatusFlag::ApiWarn,
    StatusFlag::Warn,
];

/// Project status flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const fn new() -> Self {
        StatusFlags(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        StatusFlags(bits & 0x3f)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn set(&mut self, flag: StatusFlag) {
        self.0 |= flag.bit();
    }

    pub const fn is_set(&self, flag: StatusFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub const fn is_clear(&self) -> bool {
        self.0 == 0
    }

    /// Returns the process exit status for the highest priority bit set.
    pub fn exit_status(&self) -> ExitStatus {
        EXIT_PRIORITY
            .iter()
            .find(|flag| self.is_set(**flag))
            .map_or(ExitStatus::Ok, StatusFlag::exit_status)
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitStatus {
    Ok,
    Warn,
    ApiWarn,
    UserWarn,
    Error,
    ApiError,
    UserError,
    InputError,
}

impl ExitStatus {
    pub const fn code(&self) -> u8 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Warn => 1,
            ExitStatus::ApiWarn => 2,
            ExitStatus::UserWarn => 3,
            ExitStatus::Error => 4,
            ExitStatus::ApiError => 5,
            ExitStatus::UserError => 6,
            ExitStatus::InputError => 7,
        }
    }

    /// User facing description of the status.
    pub const fn message(&self) -> &'static str {
        match self {
            ExitStatus::Ok => "OK",
            ExitStatus::Warn => "Recoverable internal error encountered. Results may be incomplete.",
            ExitStatus::ApiWarn => "Recoverable error in the API encountered. Results may be incomplete.",
            ExitStatus::UserWarn => {
                "Recoverable error in caller supplied data encountered. Results may be incomplete."
            }
            ExitStatus::Error => "Non-recoverable internal error encountered. Processing aborted.",
            ExitStatus::ApiError => "Non-recoverable error in the API encountered. Processing aborted.",
            ExitStatus::UserError => {
                "Non-recoverable error in the application encountered. Processing aborted."
            }
            ExitStatus::InputError => "User input error to application.",
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

/// Alert identifiers.
///
/// Numeric ids are stable: project alerts in the 100s, login alerts in the
/// 500s and zoning alerts in the 600s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCode {
    FreeTextInfo,
    FreeTextWarn,
    FreeTextError,
    ProjDupLogin,
    ProjChassisApiError,
    ProjSwitchApiError,
    ProjProgramError,
    ProjUserError,
    AttrConflict,
    LoginNotZoned,
    LoginBaseZoned,
    LoginMaxZoneParticipation,
    LoginSim,
    LoginAmp,
    LoginSpeedDiffW,
    LoginSpeedDiffE,
    ZoneNoMembers,
    ZoneOneMember,
    ZonePeerNoPmem,
    ZonePeerNoNmem,
    ZoneAliasUse,
    ZoneDiffFabric,
    ZoneNotFound,
    ZoneNotUsed,
    ZoneMismatch,
    ZoneMixed,
    ZoneWwnAlias,
    ZoneBaseZoned,
    ZoneDupAlias,
    ZoneNullAlias,
    ZoneNullAliasUsed,
    ZoneAliasNotUsed,
    ZoneMultiInitiator,
    ZoneUndefinedAlias,
    ZonePeerProperty,
    ZoneLinkAddr,
    ZoneLinkNoAddr,
}

const ALL_CODES: [AlertCode; 37] = [
    AlertCode::FreeTextInfo,
    AlertCode::FreeTextWarn,
    AlertCode::FreeTextError,
    AlertCode::ProjDupLogin,
    AlertCode::ProjChassisApiError,
    AlertCode::ProjSwitchApiError,
    AlertCode::ProjProgramError,
    AlertCode::ProjUserError,
    AlertCode::AttrConflict,
    AlertCode::LoginNotZoned,
    AlertCode::LoginBaseZoned,
    AlertCode::LoginMaxZoneParticipation,
    AlertCode::LoginSim,
    AlertCode::LoginAmp,
    AlertCode::LoginSpeedDiffW,
    AlertCode::LoginSpeedDiffE,
    AlertCode::ZoneNoMembers,
    AlertCode::ZoneOneMember,
    AlertCode::ZonePeerNoPmem,
    AlertCode::ZonePeerNoNmem,
    AlertCode::ZoneAliasUse,
    AlertCode::ZoneDiffFabric,
    AlertCode::ZoneNotFound,
    AlertCode::ZoneNotUsed,
    AlertCode::ZoneMismatch,
    AlertCode::ZoneMixed,
    AlertCode::ZoneWwnAlias,
    AlertCode::ZoneBaseZoned,
    AlertCode::ZoneDupAlias,
    AlertCode::ZoneNullAlias,
    AlertCode::ZoneNullAliasUsed,
    AlertCode::ZoneAliasNotUsed,
    AlertCode::ZoneMultiInitiator,
    AlertCode::ZoneUndefinedAlias,
    AlertCode::ZonePeerProperty,
    AlertCode::ZoneLinkAddr,
    AlertCode::ZoneLinkNoAddr,
];

impl AlertCode {
    pub const fn all() -> &'static [AlertCode] {
        &ALL_CODES
    }

    /// Stable numeric id.
    pub const fn num(&self) -> u16 {
        match self {
            AlertCode::FreeTextInfo => 1,
            AlertCode::FreeTextWarn => 2,
            AlertCode::FreeTextError => 3,
            AlertCode::ProjDupLogin => 101,
            AlertCode::ProjChassisApiError => 103,
            AlertCode::ProjSwitchApiError => 104,
            AlertCode::ProjProgramError => 105,
            AlertCode::ProjUserError => 106,
            AlertCode::AttrConflict => 107,
            AlertCode::LoginNotZoned => 502,
            AlertCode::LoginBaseZoned => 503,
            AlertCode::LoginMaxZoneParticipation => 504,
            AlertCode::LoginSim => 505,
            AlertCode::LoginAmp => 506,
            AlertCode::LoginSpeedDiffW => 509,
            AlertCode::LoginSpeedDiffE => 510,
            AlertCode::ZoneNoMembers => 601,
            AlertCode::ZoneOneMember => 602,
            AlertCode::ZonePeerNoPmem => 603,
            AlertCode::ZonePeerNoNmem => 604,
            AlertCode::ZoneAliasUse => 605,
            AlertCode::ZoneDiffFabric => 607,
            AlertCode::ZoneNotFound => 608,
            AlertCode::ZoneNotUsed => 609,
            AlertCode::ZoneMismatch => 610,
            AlertCode::ZoneMixed => 611,
            AlertCode::ZoneWwnAlias => 612,
            AlertCode::ZoneBaseZoned => 614,
            AlertCode::ZoneDupAlias => 616,
            AlertCode::ZoneNullAlias => 617,
            AlertCode::ZoneNullAliasUsed => 618,
            AlertCode::ZoneAliasNotUsed => 619,
            AlertCode::ZoneMultiInitiator => 620,
            AlertCode::ZoneUndefinedAlias => 621,
            AlertCode::ZonePeerProperty => 622,
            AlertCode::ZoneLinkAddr => 623,
            AlertCode::ZoneLinkNoAddr => 624,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            AlertCode::FreeTextInfo => "FREE_TEXT_INFO",
            AlertCode::FreeTextWarn => "FREE_TEXT_WARN",
            AlertCode::FreeTextError => "FREE_TEXT_ERROR",
            AlertCode::ProjDupLogin => "PROJ_DUP_LOGIN",
            AlertCode::ProjChassisApiError => "PROJ_CHASSIS_API_ERROR",
            AlertCode::ProjSwitchApiError => "PROJ_SWITCH_API_ERROR",
            AlertCode::ProjProgramError => "PROJ_PROGRAM_ERROR",
            AlertCode::ProjUserError => "PROJ_USER_ERROR",
            AlertCode::AttrConflict => "ATTR_CONFLICT",
            AlertCode::LoginNotZoned => "LOGIN_NOT_ZONED",
            AlertCode::LoginBaseZoned => "LOGIN_BASE_ZONED",
            AlertCode::LoginMaxZoneParticipation => "LOGIN_MAX_ZONE_PARTICIPATION",
            AlertCode::LoginSim => "LOGIN_SIM",
            AlertCode::LoginAmp => "LOGIN_AMP",
            AlertCode::LoginSpeedDiffW => "LOGIN_SPEED_DIFF_W",
            AlertCode::LoginSpeedDiffE => "LOGIN_SPEED_DIFF_E",
            AlertCode::ZoneNoMembers => "ZONE_NO_MEMBERS",
            AlertCode::ZoneOneMember => "ZONE_ONE_MEMBER",
            AlertCode::ZonePeerNoPmem => "ZONE_PEER_NO_PMEM",
            AlertCode::ZonePeerNoNmem => "ZONE_PEER_NO_NMEM",
            AlertCode::ZoneAliasUse => "ZONE_ALIAS_USE",
            AlertCode::ZoneDiffFabric => "ZONE_DIFF_FABRIC",
            AlertCode::ZoneNotFound => "ZONE_NOT_FOUND",
            AlertCode::ZoneNotUsed => "ZONE_NOT_USED",
            AlertCode::ZoneMismatch => "ZONE_MISMATCH",
            AlertCode::ZoneMixed => "ZONE_MIXED",
            AlertCode::ZoneWwnAlias => "ZONE_WWN_ALIAS",
            AlertCode::ZoneBaseZoned => "ZONE_BASE_ZONED",
            AlertCode::ZoneDupAlias => "ZONE_DUP_ALIAS",
            AlertCode::ZoneNullAlias => "ZONE_NULL_ALIAS",
            AlertCode::ZoneNullAliasUsed => "ZONE_NULL_ALIAS_USED",
            AlertCode::ZoneAliasNotUsed => "ZONE_ALIAS_NOT_USED",
            AlertCode::ZoneMultiInitiator => "ZONE_MULTI_INITIATOR",
            AlertCode::ZoneUndefinedAlias => "ZONE_UNDEFINED_ALIAS",
            AlertCode::ZonePeerProperty => "ZONE_PEER_PROPERTY",
            AlertCode::ZoneLinkAddr => "ZONE_LINK_ADDR",
            AlertCode::ZoneLinkNoAddr => "ZONE_LINK_NO_ADDR",
        }
    }

    /// Built-in table entry for this code.
    fn builtin_spec(&self) -> AlertSpec {
        use Severity::{Error, Info, Warn};

        let (message, severity, member, flag) = match self {
            AlertCode::FreeTextInfo => ("$p0", Info, false, None),
            AlertCode::FreeTextWarn => ("$p0", Warn, false, None),
            AlertCode::FreeTextError => ("$p0", Error, false, None),
            AlertCode::ProjDupLogin => ("Duplicate WWN: $p0. Found on $p1", Error, false, None),
            AlertCode::ProjChassisApiError => (
                "API error to chassis $p0. $p1",
                Error,
                false,
                Some(StatusFlag::ApiWarn),
            ),
            AlertCode::ProjSwitchApiError => (
                "API error to switch $p0. $p1",
                Error,
                false,
                Some(StatusFlag::ApiWarn),
            ),
            AlertCode::ProjProgramError => (
                "Programming error encountered. Check the log for details. $p0 $p1",
                Error,
                false,
                Some(StatusFlag::Warn),
            ),
            AlertCode::ProjUserError => (
                "Invalid user supplied data. $p0 $p1",
                Error,
                false,
                Some(StatusFlag::UserWarn),
            ),
            AlertCode::AttrConflict => (
                "Conflicting value for $p0: $p1",
                Warn,
                false,
                Some(StatusFlag::Warn),
            ),
            AlertCode::LoginNotZoned => ("Inaccessible. Not in any zone.", Warn, false, None),
            AlertCode::LoginBaseZoned => ("Base NPIV login address in zone", Warn, false, None),
            AlertCode::LoginMaxZoneParticipation => (
                "$p1 devices zoned to this target. Maximum allowed is $p0.",
                Warn,
                false,
                None,
            ),
            AlertCode::LoginSim => ("SIM port", Info, false, None),
            AlertCode::LoginAmp => ("AMP", Info, false, None),
            AlertCode::LoginSpeedDiffW => (
                "Logged in one speed generation slower than $p0, also zoned to target(s): $p1.",
                Warn,
                false,
                None,
            ),
            AlertCode::LoginSpeedDiffE => (
                "Logged in two or more speed generations slower than $p0, also zoned to target(s): $p1.",
                Error,
                false,
                None,
            ),
            AlertCode::ZoneNoMembers => ("No members", Error, false, None),
            AlertCode::ZoneOneMember => ("Single member", Warn, false, None),
            AlertCode::ZonePeerNoPmem => ("Peer zone with no principal members", Error, false, None),
            AlertCode::ZonePeerNoNmem => ("Peer zone with no members", Error, false, None),
            AlertCode::ZoneAliasUse => ("Consider using alias $p1", Warn, true, None),
            AlertCode::ZoneDiffFabric => ("Zone member $p0 found in $p1.", Error, true, None),
            AlertCode::ZoneNotFound => ("Not found", Info, true, None),
            AlertCode::ZoneNotUsed => ("Not used", Info, false, None),
            AlertCode::ZoneMismatch => (
                "Effective zone does not match defined zone",
                Warn,
                false,
                None,
            ),
            AlertCode::ZoneMixed => ("Mixed WWN and d,i zone", Error, false, None),
            AlertCode::ZoneWwnAlias => ("Mixed use of WWN and alias in zone", Error, false, None),
            AlertCode::ZoneBaseZoned => ("Base NPIV zoned", Warn, true, None),
            AlertCode::ZoneDupAlias => ("Duplicate alias for $p1. Same as $p0", Warn, false, None),
            AlertCode::ZoneNullAlias => ("Alias has no member", Warn, false, None),
            AlertCode::ZoneNullAliasUsed => ("Null alias used in $p0", Error, false, None),
            AlertCode::ZoneAliasNotUsed => ("Not used", Info, false, None),
            AlertCode::ZoneMultiInitiator => ("Multiple initiators: $p0", Warn, false, None),
            AlertCode::ZoneUndefinedAlias => (
                "Alias $p0 used in zone $p1 does not exist.",
                Error,
                false,
                None,
            ),
            AlertCode::ZonePeerProperty => (
                "Peer property WWN, $p0, should not be included in the zone definition",
                Info,
                false,
                None,
            ),
            AlertCode::ZoneLinkAddr => ("Not in same zone for CPC $p0 CHPID $p1", Error, false, None),
            AlertCode::ZoneLinkNoAddr => (
                "Matching link address $p0 in path CPC $p1 not in fabric",
                Error,
                false,
                None,
            ),
        };
        AlertSpec {
            message: message.to_string(),
            severity,
            member,
            flag,
        }
    }
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlertCode {
    type Err = FcdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        ALL_CODES
            .iter()
            .find(|c| c.name() == upper || c.num().to_string() == s)
            .copied()
            .ok_or_else(|| FcdbError::user("alert code", format!("unknown alert code '{}'", s)))
    }
}

/// Table entry for one alert code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSpec {
    /// Message template. `$p0`, `$p1` and `$key` are substituted.
    pub message: String,
    pub severity: Severity,
    /// The alert describes a single zone member; the member is the alert key.
    pub member: bool,
    /// Project status bit raised when the alert is added.
    pub flag: Option<StatusFlag>,
}

/// Override for one built-in table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertOverride {
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub message: Option<String>,
}

static BUILTIN: Lazy<AlertTable> = Lazy::new(|| AlertTable {
    specs: ALL_CODES.iter().map(|c| (*c, c.builtin_spec())).collect(),
});

/// Alert code to message/severity table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertTable {
    specs: HashMap<AlertCode, AlertSpec>,
}

impl Default for AlertTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AlertTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// The built-in table with overrides applied. Keys are code names or ids.
    pub fn with_overrides(overrides: &HashMap<String, AlertOverride>) -> FcdbResult<Self> {
        let mut table = Self::builtin();
        for (name, o) in overrides {
            let code: AlertCode = name.parse()?;
            let spec = table
                .specs
                .entry(code)
                .or_insert_with(|| code.builtin_spec());
            if let Some(severity) = o.severity {
                spec.severity = severity;
            }
            if let Some(message) = &o.message {
                spec.message = message.clone();
            }
        }
        Ok(table)
    }

    pub fn spec(&self, code: AlertCode) -> AlertSpec {
        self.specs
            .get(&code)
            .cloned()
            .unwrap_or_else(|| code.builtin_spec())
    }
}

/// Optional alert parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertParams {
    /// Sub-part the alert is about, e.g. a zone member WWN.
    pub key: Option<String>,
    pub p0: Option<String>,
    pub p1: Option<String>,
}

impl AlertParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alert about a single zone member.
    pub fn member(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            p0: Some(key.clone()),
            key: Some(key),
            p1: None,
        }
    }

    pub fn p0(mut self, p0: impl Into<String>) -> Self {
        self.p0 = Some(p0.into());
        self
    }

    pub fn p1(mut self, p1: impl Into<String>) -> Self {
        self.p1 = Some(p1.into());
        self
    }
}

/// An alert attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub code: AlertCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1: Option<String>,
}

impl AlertRecord {
    /// Resolves `code` against `table` and formats the message.
    pub fn new(table: &AlertTable, code: AlertCode, params: AlertParams) -> Self {
        let spec = table.spec(code);
        let key = match params.key {
            None if spec.member => params.p0.clone(),
            key => key,
        };
        let message = format_message(&spec.message, key.as_deref(), &params.p0, &params.p1);
        Self {
            code,
            severity: spec.severity,
            message,
            key,
            p0: params.p0,
            p1: params.p1,
        }
    }

    /// The zone member this alert is about, if any.
    pub fn member(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// Substitutes `$key`, `$p0` and `$p1`. Absent parameters become empty.
pub fn format_message(
    template: &str,
    key: Option<&str>,
    p0: &Option<String>,
    p1: &Option<String>,
) -> String {
    template
        .replace("$key", key.unwrap_or(""))
        .replace("$p0", p0.as_deref().unwrap_or(""))
        .replace("$p1", p1.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_substitution() {
        let table = AlertTable::builtin();
        let alert = AlertRecord::new(
            &table,
            AlertCode::ZoneUndefinedAlias,
            AlertParams::new().p0("host_a").p1("z1"),
        );
        assert_eq!(alert.message, "Alias host_a used in zone z1 does not exist.");
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.member(), None);
    }

    #[test]
    fn test_absent_parameter_is_empty() {
        let table = AlertTable::builtin();
        let alert = AlertRecord::new(&table, AlertCode::ZoneMultiInitiator, AlertParams::new());
        assert_eq!(alert.message, "Multiple initiators: ");
    }

    #[test]
    fn test_member_alert_key_defaults_to_p0() {
        let table = AlertTable::builtin();
        let wwn = "10:00:00:05:1e:aa:bb:cc";
        let alert = AlertRecord::new(&table, AlertCode::ZoneNotFound, AlertParams::new().p0(wwn));
        assert_eq!(alert.member(), Some(wwn));
        let alert = AlertRecord::new(&table, AlertCode::ZoneMixed, AlertParams::new().p0(wwn));
        assert_eq!(alert.member(), None);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "ZONE_NOT_FOUND".to_string(),
            AlertOverride {
                severity: Some(Severity::Warn),
                message: Some("Member $p0 is offline".to_string()),
            },
        );
        let table = AlertTable::with_overrides(&overrides).unwrap();
        let spec = table.spec(AlertCode::ZoneNotFound);
        assert_eq!(spec.severity, Severity::Warn);
        assert!(spec.member);
        assert_eq!(
            AlertTable::builtin().spec(AlertCode::ZoneNotFound).severity,
            Severity::Info
        );

        overrides.insert("NOT_A_CODE".to_string(), AlertOverride::default());
        assert!(AlertTable::with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_code_parse() {
        assert_eq!("zone_dup_alias".parse::<AlertCode>().unwrap(), AlertCode::ZoneDupAlias);
        assert_eq!("616".parse::<AlertCode>().unwrap(), AlertCode::ZoneDupAlias);
        let mut nums: Vec<u16> = AlertCode::all().iter().map(AlertCode::num).collect();
        nums.sort_unstable();
        nums.dedup();
        assert_eq!(nums.len(), AlertCode::all().len());
    }

    #[test]
    fn test_exit_status_priority() {
        let mut flags = StatusFlags::new();
        assert_eq!(flags.exit_status(), ExitStatus::Ok);
        flags.set(StatusFlag::Warn);
        assert_eq!(flags.exit_status(), ExitStatus::Warn);
        flags.set(StatusFlag::ApiWarn);
        assert_eq!(flags.exit_status(), ExitStatus::ApiWarn);
        flags.set(StatusFlag::Error);
        assert_eq!(flags.exit_status(), ExitStatus::Error);
        flags.set(StatusFlag::UserError);
        assert_eq!(flags.exit_status(), ExitStatus::UserError);
        assert_eq!(flags.exit_status().code(), 6);
        assert_eq!(flags.bits(), 0x01 | 0x02 | 0x08 | 0x20);
    }

    #[test]
    fn test_flag_for_origin() {
        assert_eq!(
            StatusFlag::for_origin(ErrorOrigin::Api, false),
            StatusFlag::ApiWarn
        );
        assert_eq!(
            StatusFlag::for_origin(ErrorOrigin::User, true),
            StatusFlag::UserError
        );
    }
}
