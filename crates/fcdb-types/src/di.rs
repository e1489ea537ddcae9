//! `domain,index` zone members.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A zone member addressed by switch domain ID and port index.
///
/// # Examples
///
/// ```
/// use fcdb_types::DomainIndex;
///
/// let di: DomainIndex = "12, 34".parse().unwrap();
/// assert_eq!(di.domain(), 12);
/// assert_eq!(di.index(), 34);
/// assert_eq!(di.to_string(), "12,34");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainIndex {
    domain: u32,
    index: u32,
}

impl DomainIndex {
    /// Creates a new d,i member.
    pub const fn new(domain: u32, index: u32) -> Self {
        DomainIndex { domain, index }
    }

    /// Returns the domain ID.
    pub const fn domain(&self) -> u32 {
        self.domain
    }

    /// Returns the port index.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Returns true if `s` is a d,i member.
    pub fn is_di(s: &str) -> bool {
        s.parse::<DomainIndex>().is_ok()
    }
}

impl fmt::Display for DomainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.domain, self.index)
    }
}

impl FromStr for DomainIndex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (d, i) = s
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidDomainIndex(s.to_string()))?;
        let parse = |part: &str| {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::InvalidDomainIndex(s.to_string()));
            }
            part.parse::<u32>()
                .map_err(|_| ParseError::InvalidDomainIndex(s.to_string()))
        };
        Ok(DomainIndex {
            domain: parse(d)?,
            index: parse(i)?,
        })
    }
}

impl TryFrom<String> for DomainIndex {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DomainIndex> for String {
    fn from(di: DomainIndex) -> String {
        di.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let di: DomainIndex = "1,15".parse().unwrap();
        assert_eq!(di, DomainIndex::new(1, 15));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(!DomainIndex::is_di("1,a"));
        assert!(!DomainIndex::is_di("alias_1"));
        assert!(!DomainIndex::is_di("-1,2"));
        assert!(!DomainIndex::is_di("1,2,3"));
        assert!(!DomainIndex::is_di("10:00:00:05:1e:aa:bb:cc"));
    }
}
