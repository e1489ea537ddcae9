//! Fibre-channel value types shared by the fabric database crates.
//!
//! This crate provides type-safe representations of the identifiers and
//! enumerations that appear in fabric telemetry and zoning data:
//!
//! - [`Wwn`]: 64-bit World Wide Name
//! - [`DomainIndex`]: `domain,index` zone member
//! - [`SpeedGen`]: fibre-channel speed generation (1G through 128G)
//! - [`ZoneType`]: standard or peer zone classification

mod di;
mod speed;
mod wwn;
mod zone;

pub use di::DomainIndex;
pub use speed::SpeedGen;
pub use wwn::Wwn;
pub use zone::ZoneType;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid WWN format: {0}")]
    InvalidWwn(String),

    #[error("invalid d,i member: {0}")]
    InvalidDomainIndex(String),

    #[error("invalid speed: {0}")]
    InvalidSpeed(String),

    #[error("invalid zone type: {0}")]
    InvalidZoneType(String),
}
