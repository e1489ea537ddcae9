//! Fibre-channel speed generations.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fibre-channel link speed generation.
///
/// Ordinals run 0 (1G) through 7 (128G) so that the distance between two
/// generations is the difference of their ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeedGen {
    #[serde(rename = "1G")]
    G1,
    #[serde(rename = "2G")]
    G2,
    #[serde(rename = "4G")]
    G4,
    #[serde(rename = "8G")]
    G8,
    #[serde(rename = "16G")]
    G16,
    #[serde(rename = "32G")]
    G32,
    #[serde(rename = "64G")]
    G64,
    #[serde(rename = "128G")]
    G128,
}

const ALL: [SpeedGen; 8] = [
    SpeedGen::G1,
    SpeedGen::G2,
    SpeedGen::G4,
    SpeedGen::G8,
    SpeedGen::G16,
    SpeedGen::G32,
    SpeedGen::G64,
    SpeedGen::G128,
];

impl SpeedGen {
    /// Returns the generation ordinal (1G = 0 ... 128G = 7).
    pub const fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Returns the generation for an ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        ALL.get(ordinal as usize).copied()
    }

    /// Nominal speed in Gbps.
    pub const fn gbps(&self) -> u32 {
        1 << self.ordinal()
    }

    /// Maps a link speed in bits per second to its generation.
    ///
    /// Telemetry reports nominal speeds (e.g. 16000000000), so anything that
    /// is not an exact generation is rejected.
    pub fn from_bps(bps: u64) -> Option<Self> {
        ALL.into_iter()
            .find(|g| u64::from(g.gbps()) * 1_000_000_000 == bps)
    }

    /// Number of generations between `self` and `other`.
    pub const fn gap(&self, other: SpeedGen) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }
}

impl fmt::Display for SpeedGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}G", self.gbps())
    }
}

impl FromStr for SpeedGen {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches(['G', 'g']);
        let gbps: u32 = digits
            .parse()
            .map_err(|_| ParseError::InvalidSpeed(s.to_string()))?;
        ALL.into_iter()
            .find(|g| g.gbps() == gbps)
            .ok_or_else(|| ParseError::InvalidSpeed(s.to_string()))
    }
}
