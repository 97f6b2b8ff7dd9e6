//! `RINEX` revision description
use crate::error::ParsingError;

/// Most recent NAV revision this crate produces by default
pub const DEFAULT_VERSION: Version = Version { major: 3, minor: 4 };

/// Version is used to describe RINEX standards revisions.
/// Major < 3 selects the legacy (V2) line layouts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

impl Default for Version {
    fn default() -> Self {
        DEFAULT_VERSION
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        let major = major
            .parse::<u8>()
            .map_err(|_| ParsingError::Version(s.to_string()))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| ParsingError::Version(s.to_string()))?;
        if !(2..=4).contains(&major) {
            return Err(ParsingError::Version(s.to_string()));
        }
        Ok(Self { major, minor })
    }
}

impl Version {
    /// Builds a new `Version` object
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    /// True when this revision uses the V2 record layout
    pub fn is_legacy(&self) -> bool {
        self.major < 3
    }
    /// Indentation of continuation lines
    pub(crate) fn indent(&self) -> usize {
        if self.is_legacy() {
            3
        } else {
            4
        }
    }
}
