//! Shading language version numbers and API-tagged version ranges
//!
//! A [`VersionRange`] is parameterized by a zero-sized API marker ([`Es`] or
//! [`Full`]), so an ES range and a desktop range are different types and can
//! never be compared with each other.

use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use core::str::FromStr;

use crate::error::{ParseVersionError, RangeError};

/// A shading language version, ordered by major, then minor, then micro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber {
    major: u32,
    minor: u32,
    micro: u32,
}

impl VersionNumber {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    pub const fn major(&self) -> u32 {
        self.major
    }

    pub const fn minor(&self) -> u32 {
        self.minor
    }

    pub const fn micro(&self) -> u32 {
        self.micro
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for VersionNumber {
    type Err = ParseVersionError;

    /// Parses `major.minor` or `major.minor.micro`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());

        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> Result<u32, ParseVersionError> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| err()),
                None if required => Err(err()),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(true)?;
        let micro = next(false)?;

        if parts.next().is_some() {
            return Err(err());
        }

        Ok(Self::new(major, minor, micro))
    }
}

/// Shading language API family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    /// Embedded profile (GLSL ES)
    Es,
    /// Desktop profile (GLSL)
    Full,
}

impl ApiKind {
    /// Human-readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ApiKind::Es => "GLSL ES",
            ApiKind::Full => "GLSL",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Es {}
    impl Sealed for super::Full {}
}

/// Compile-time API marker carried by [`VersionRange`]
pub trait ApiKindTag: sealed::Sealed + fmt::Debug + Clone + Copy + PartialEq + Eq + Hash {
    const KIND: ApiKind;
}

/// Marker for embedded-profile ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Es;

/// Marker for desktop-profile ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Full;

impl ApiKindTag for Es {
    const KIND: ApiKind = ApiKind::Es;
}

impl ApiKindTag for Full {
    const KIND: ApiKind = ApiKind::Full;
}

/// Inclusive range `[lower, upper]` of versions for one API kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange<K: ApiKindTag> {
    lower: VersionNumber,
    upper: VersionNumber,
    _kind: PhantomData<K>,
}

/// Range of GLSL ES versions
pub type EsRange = VersionRange<Es>;

/// Range of desktop GLSL versions
pub type FullRange = VersionRange<Full>;

impl<K: ApiKindTag> VersionRange<K> {
    /// Create a range; fails if `lower > upper`
    pub fn new(lower: VersionNumber, upper: VersionNumber) -> Result<Self, RangeError> {
        if lower > upper {
            return Err(RangeError::Inverted { lower, upper });
        }
        Ok(Self {
            lower,
            upper,
            _kind: PhantomData,
        })
    }

    pub fn lower(&self) -> VersionNumber {
        self.lower
    }

    pub fn upper(&self) -> VersionNumber {
        self.upper
    }

    /// API kind this range applies to
    pub fn api(&self) -> ApiKind {
        K::KIND
    }

    /// True if `lower <= version <= upper`
    pub fn includes(&self, version: VersionNumber) -> bool {
        self.lower <= version && version <= self.upper
    }

    /// True if both bounds of `other` lie inside this range
    pub fn covers(&self, other: &Self) -> bool {
        self.includes(other.lower) && self.includes(other.upper)
    }
}

impl<K: ApiKindTag> fmt::Display for VersionRange<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
