//! Zone type classification.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zone type as reported by the zoning database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneType {
    /// Traditional zone: every member talks to every other member.
    #[default]
    Standard,
    /// Peer zone created by an administrator.
    UserPeer,
    /// Peer zone created by a target (target-driven zoning).
    TargetPeer,
}

impl ZoneType {
    /// Returns true for both kinds of peer zone.
    pub const fn is_peer(&self) -> bool {
        matches!(self, ZoneType::UserPeer | ZoneType::TargetPeer)
    }

    /// Returns the zoning database encoding.
    pub const fn as_u8(&self) -> u8 {
        match self {
            ZoneType::Standard => 0,
            ZoneType::UserPeer => 1,
            ZoneType::TargetPeer => 2,
        }
    }
}

impl TryFrom<u8> for ZoneType {
    type Error = ParseError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ZoneType::Standard),
            1 => Ok(ZoneType::UserPeer),
            2 => Ok(ZoneType::TargetPeer),
            _ => Err(ParseError::InvalidZoneType(v.to_string())),
        }
    }
}

impl From<ZoneType> for u8 {
    fn from(t: ZoneType) -> u8 {
        t.as_u8()
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ZoneType::Standard => "standard",
            ZoneType::UserPeer => "user-peer",
            ZoneType::TargetPeer => "target-peer",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ZoneType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "standard" => Ok(ZoneType::Standard),
            "1" | "user-peer" | "peer" => Ok(ZoneType::UserPeer),
            "2" | "target-peer" => Ok(ZoneType::TargetPeer),
            _ => Err(ParseError::InvalidZoneType(s.to_string())),
        }
    }
}
