//! Three-component versions with an optional comparator prefix.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(>=|>|<=|<|~|\^)?(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)$")
        .expect("version pattern is valid")
});

/// Comparator written in front of a version requirement, e.g. the `^` in `^1.2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Prefix {
    #[default]
    None,
    GreaterEq,
    Greater,
    LessEq,
    Less,
    Tilde,
    Caret,
}

impl Prefix {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::None => "",
            Prefix::GreaterEq => ">=",
            Prefix::Greater => ">",
            Prefix::LessEq => "<=",
            Prefix::Less => "<",
            Prefix::Tilde => "~",
            Prefix::Caret => "^",
        }
    }

    fn from_match(s: &str) -> Self {
        match s {
            ">=" => Prefix::GreaterEq,
            ">" => Prefix::Greater,
            "<=" => Prefix::LessEq,
            "<" => Prefix::Less,
            "~" => Prefix::Tilde,
            "^" => Prefix::Caret,
            _ => Prefix::None,
        }
    }
}

/// Which component of a version changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpLevel {
    /// Patch bump (1.0.0 -> 1.0.1).
    Patch,
    /// Minor bump (1.0.0 -> 1.1.0).
    Minor,
    /// Major bump (1.0.0 -> 2.0.0).
    Major,
}

impl BumpLevel {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        }
    }

    /// Parses one of the keywords `major`, `minor` or `patch`.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "major" => Some(BumpLevel::Major),
            "minor" => Some(BumpLevel::Minor),
            "patch" => Some(BumpLevel::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`Version::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDiff {
    Equal,
    Greater(BumpLevel),
    Less(BumpLevel),
}

/// What a package's version should become.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTarget {
    /// Replace the version with this one.
    Explicit(Version),
    /// Increment the given component.
    Level(BumpLevel),
}

impl VersionTarget {
    /// Parses a bump keyword or an explicit version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the text is neither, or if the
    /// version carries a comparator prefix.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(level) = BumpLevel::from_keyword(s) {
            return Ok(VersionTarget::Level(level));
        }
        Version::parse(s)
            .filter(|version| version.prefix == Prefix::None)
            .map(VersionTarget::Explicit)
            .ok_or_else(|| Error::InvalidVersion(s.to_string()))
    }
}

impl From<BumpLevel> for VersionTarget {
    fn from(level: BumpLevel) -> Self {
        VersionTarget::Level(level)
    }
}

impl From<Version> for VersionTarget {
    fn from(version: Version) -> Self {
        VersionTarget::Explicit(version)
    }
}

/// An immutable `major.minor.patch` version.
///
/// Pre-release tags, build metadata and wildcard ranges are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub prefix: Prefix,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            prefix: Prefix::None,
            major,
            minor,
            patch,
        }
    }

    /// Parses `(prefix)?major.minor.patch`, returning `None` for any other shape.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(s)?;
        let prefix = caps
            .get(1)
            .map(|m| Prefix::from_match(m.as_str()))
            .unwrap_or_default();
        let component = |idx: usize| caps.get(idx)?.as_str().parse::<u64>().ok();

        Some(Self {
            prefix,
            major: component(2)?,
            minor: component(3)?,
            patch: component(4)?,
        })
    }

    /// Compares the numeric components, most significant first.
    ///
    /// Prefixes are ignored: `^1.0.0` and `1.0.0` compare equal.
    pub fn compare(&self, other: &Version) -> VersionDiff {
        let pairs = [
            (self.major, other.major, BumpLevel::Major),
            (self.minor, other.minor, BumpLevel::Minor),
            (self.patch, other.patch, BumpLevel::Patch),
        ];
        for (ours, theirs, level) in pairs {
            if ours > theirs {
                return VersionDiff::Greater(level);
            }
            if ours < theirs {
                return VersionDiff::Less(level);
            }
        }
        VersionDiff::Equal
    }

    /// Returns the version this one becomes under `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionOverflow`] if the bumped component does not fit
    /// in a `u64`.
    pub fn bump(&self, target: &VersionTarget) -> Result<Version> {
        match target {
            VersionTarget::Explicit(version) => Ok(*version),
            VersionTarget::Level(level) => self.bump_level(*level),
        }
    }

    pub fn bump_level(&self, level: BumpLevel) -> Result<Version> {
        let overflow = || Error::VersionOverflow {
            version: self.to_string(),
            level,
        };
        let prefix = self.prefix;
        let bumped = match level {
            BumpLevel::Major => Version {
                prefix,
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            BumpLevel::Minor => Version {
                prefix,
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            BumpLevel::Patch => Version {
                prefix,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
                ..*self
            },
        };
        Ok(bumped)
    }

    #[inline]
    pub fn with_prefix(&self, prefix: Prefix) -> Version {
        Version { prefix, ..*self }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}.{}",
            self.prefix.as_str(),
            self.major,
            self.minor,
            self.patch
        )
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s).ok_or_else(|| Error::InvalidVersion(s.to_string()))
    }
}
