//! Generation algorithms and their fixed properties.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A generation algorithm supported by this crate.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Version {
    /// Gregorian timestamp, clock sequence, and node.
    V1 = 1,
    /// MD5 hash of a namespace and a name.
    V3 = 3,
    /// Random.
    V4 = 4,
    /// SHA-1 hash of a namespace and a name.
    V5 = 5,
    /// V1 fields reordered for lexicographic sorting.
    V6 = 6,
    /// Unix millisecond timestamp and random bits.
    V7 = 7,
}

/// How a version derives its bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMethod {
    Random,
    TimeBased,
    NameBased,
}

impl Version {
    pub const ALL: [Self; 6] = [Self::V1, Self::V3, Self::V4, Self::V5, Self::V6, Self::V7];

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::V1 => "Time-based",
            Self::V3 => "Name-based (MD5)",
            Self::V4 => "Random",
            Self::V5 => "Name-based (SHA-1)",
            Self::V6 => "Reordered time",
            Self::V7 => "Unix timestamp",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::V1 => "Based on timestamp and MAC address",
            Self::V3 => "Based on namespace and name using MD5",
            Self::V4 => "Based on random or pseudo-random numbers",
            Self::V5 => "Based on namespace and name using SHA-1",
            Self::V6 => "Time-based with better lexicographic sorting",
            Self::V7 => "Based on Unix timestamp with random data",
        }
    }

    pub const fn method(self) -> GenerationMethod {
        match self {
            Self::V1 | Self::V6 | Self::V7 => GenerationMethod::TimeBased,
            Self::V3 | Self::V5 => GenerationMethod::NameBased,
            Self::V4 => GenerationMethod::Random,
        }
    }

    pub const fn is_name_based(self) -> bool {
        matches!(self, Self::V3 | Self::V5)
    }
}

impl TryFrom<u8> for Version {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::V1),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            6 => Ok(Self::V6),
            7 => Ok(Self::V7),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl From<Version> for u8 {
    fn from(src: Version) -> Self {
        src.number()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}
