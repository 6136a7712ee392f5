use std::fmt;
use std::num::NonZeroU64;

use bytes::Bytes;

/// Version of an entry as observed or expected by a caller.
///
/// On the wire a version is a plain `u64` where `0` means "no entry"; inside
/// the crate the two cases are kept apart so that an absent entry can never be
/// mistaken for a real version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// No entry exists (wire value `0`)
    #[default]
    Absent,
    /// An existing entry's version
    At(NonZeroU64),
}

impl Version {
    pub fn from_raw(raw: u64) -> Self {
        NonZeroU64::new(raw).map_or(Version::Absent, Version::At)
    }

    /// Wire representation, `0` for [`Version::Absent`].
    pub fn raw(self) -> u64 {
        match self {
            Version::Absent => 0,
            Version::At(v) => v.get(),
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Version::Absent)
    }

    pub fn exists(self) -> bool {
        !self.is_absent()
    }
}

impl From<u64> for Version {
    fn from(raw: u64) -> Self {
        Version::from_raw(raw)
    }
}

impl From<NonZeroU64> for Version {
    fn from(v: NonZeroU64) -> Self {
        Version::At(v)
    }
}

impl From<Version> for u64 {
    fn from(v: Version) -> Self {
        v.raw()
    }
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Version::Absent => f.write_str("absent"),
            Version::At(v) => write!(f, "{v}"),
        }
    }
}

/// Condition under which `erase` removes an entry.
///
/// The wire value `0` is [`VersionMatch::Any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionMatch {
    /// Remove whatever version is current
    #[default]
    Any,
    /// Remove only if the current version equals this one
    Exactly(NonZeroU64),
}

impl VersionMatch {
    pub fn from_raw(raw: u64) -> Self {
        NonZeroU64::new(raw).map_or(VersionMatch::Any, VersionMatch::Exactly)
    }

    pub fn raw(self) -> u64 {
        match self {
            VersionMatch::Any => 0,
            VersionMatch::Exactly(v) => v.get(),
        }
    }

    pub fn matches(
        self,
        current: NonZeroU64,
    ) -> bool {
        match self {
            VersionMatch::Any => true,
            VersionMatch::Exactly(expected) => expected == current,
        }
    }
}

impl From<u64> for VersionMatch {
    fn from(raw: u64) -> Self {
        VersionMatch::from_raw(raw)
    }
}

impl From<Version> for VersionMatch {
    fn from(v: Version) -> Self {
        match v {
            Version::Absent => VersionMatch::Any,
            Version::At(v) => VersionMatch::Exactly(v),
        }
    }
}

/// An existing entry as returned by `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub version: Version,
    pub value: Bytes,
}
