//! World Wide Name type with safe parsing and formatting.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 64-bit fibre-channel World Wide Name.
///
/// # Examples
///
/// ```
/// use fcdb_types::Wwn;
///
/// let wwn: Wwn = "10:00:00:05:1E:AA:BB:CC".parse().unwrap();
/// assert_eq!(wwn.to_string(), "10:00:00:05:1e:aa:bb:cc");
/// assert_eq!(wwn.naa(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wwn([u8; 8]);

impl Wwn {
    /// Creates a new WWN from raw bytes.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Wwn(bytes)
    }

    /// Returns the raw bytes of the WWN.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Returns the Network Address Authority (high nibble of the first byte).
    pub const fn naa(&self) -> u8 {
        self.0[0] >> 4
    }

    /// Returns true if `s` has the shape of a WWN.
    ///
    /// With `full_check` the leading byte must also be non-zero. Peer zone
    /// property members are WWN shaped but always start with `00`.
    pub fn is_wwn(s: &str, full_check: bool) -> bool {
        match s.parse::<Wwn>() {
            Ok(wwn) => !full_check || wwn.0[0] != 0,
            Err(_) => false,
        }
    }
}

impl fmt::Display for Wwn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5], self.0[6], self.0[7]
        )
    }
}

impl FromStr for Wwn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 8 {
            return Err(ParseError::InvalidWwn(s.to_string()));
        }

        let mut bytes = [0u8; 8];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(ParseError::InvalidWwn(s.to_string()));
            }
            bytes[i] =
                u8::from_str_radix(part, 16).map_err(|_| ParseError::InvalidWwn(s.to_string()))?;
        }

        Ok(Wwn(bytes))
    }
}

impl TryFrom<String> for Wwn {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Wwn> for String {
    fn from(wwn: Wwn) -> String {
        wwn.to_string()
    }
}

impl From<[u8; 8]> for Wwn {
    fn from(bytes: [u8; 8]) -> Self {
        Wwn(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_display() {
        let wwn: Wwn = "50:0A:09:81:00:00:00:01".parse().unwrap();
        assert_eq!(
            wwn.as_bytes(),
            &[0x50, 0x0a, 0x09, 0x81, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(wwn.to_string(), "50:0a:09:81:00:00:00:01");
        assert_eq!(wwn.naa(), 5);
    }

    #[test]
    fn test_invalid_format() {
        assert!("invalid".parse::<Wwn>().is_err());
        assert!("10:00:00:05:1e:aa:bb".parse::<Wwn>().is_err());
        assert!("10:00:00:05:1e:aa:bb:cc:dd".parse::<Wwn>().is_err());
        assert!("10:00:00:05:1e:aa:bb:zz".parse::<Wwn>().is_err());
        assert!("1:00:00:05:1e:aa:bb:cc".parse::<Wwn>().is_err());
    }

    #[test]
    fn test_is_wwn_full_check() {
        assert!(Wwn::is_wwn("10:00:00:05:1e:aa:bb:cc", true));
        assert!(Wwn::is_wwn("00:02:00:00:00:03:01:02", false));
        assert!(!Wwn::is_wwn("00:02:00:00:00:03:01:02", true));
        assert!(!Wwn::is_wwn("host_alias", false));
        assert!(!Wwn::is_wwn("1,12", false));
    }

    #[test]
    fn test_serde_as_string() {
        let wwn: Wwn = "10:00:00:05:1e:aa:bb:cc".parse().unwrap();
        let s: String = wwn.into();
        assert_eq!(Wwn::try_from(s).unwrap(), wwn);
    }
}
