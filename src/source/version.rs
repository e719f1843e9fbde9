//! Provider versions and version constraints.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{Result, SourceError};

static VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z.-]+))?(?:\+[0-9A-Za-z.-]+)?$").expect("version pattern")
});
static REQUIREMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(=|!=|>=|<=|>|<|~>)?\s*(\S+)$").expect("requirement pattern"));

/// `major.minor.patch[-pre]`; build metadata is accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, pre: None }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with_precision(input).map(|(version, _)| version)
    }

    /// Also returns how many numeric segments were written, which `~>` needs.
    fn parse_with_precision(input: &str) -> Result<(Self, usize)> {
        let invalid = || SourceError::InvalidVersion { input: input.to_string() };
        let caps = VERSION.captures(input.trim()).ok_or_else(invalid)?;
        let segment = |i: usize| -> Result<Option<u64>> {
            caps.get(i).map(|m| m.as_str().parse::<u64>().map_err(|_| invalid())).transpose()
        };
        let major = segment(1)?.unwrap_or(0);
        let minor = segment(2)?;
        let patch = segment(3)?;
        let precision = 1 + usize::from(minor.is_some()) + usize::from(patch.is_some());
        let version = Self {
            major,
            minor: minor.unwrap_or(0),
            patch: patch.unwrap_or(0),
            pre: caps.get(4).map(|m| m.as_str().to_string()),
        };
        Ok((version, precision))
    }

    fn release(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release().cmp(&other.release()).then_with(|| match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRAINTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// Allows only the rightmost written segment to increase.
    Pessimistic,
}

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Pessimistic => "~>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Requirement {
    op: Operator,
    version: Version,
    precision: usize,
}

impl Requirement {
    fn allows(&self, candidate: &Version) -> bool {
        let v = &self.version;
        match self.op {
            Operator::Eq => candidate == v,
            Operator::Ne => candidate != v,
            Operator::Gt => candidate > v,
            Operator::Ge => candidate >= v,
            Operator::Lt => candidate < v,
            Operator::Le => candidate <= v,
            Operator::Pessimistic => {
                if candidate < v {
                    return false;
                }
                match self.precision {
                    1 => true,
                    2 => candidate.major == v.major,
                    _ => candidate.major == v.major && candidate.minor == v.minor,
                }
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.version)
    }
}

/// Comma-separated requirements, all of which must hold. The empty constraint allows anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraint(Vec<Requirement>);

impl VersionConstraint {
    /// Exactly `version`.
    pub fn exact(version: &Version) -> Self {
        Self(vec![Requirement { op: Operator::Eq, version: version.clone(), precision: 3 }])
    }

    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || SourceError::InvalidConstraint { input: input.to_string() };
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        input
            .split(',')
            .map(|part| {
                let caps = REQUIREMENT.captures(part.trim()).ok_or_else(invalid)?;
                let op = match caps.get(1).map(|m| m.as_str()) {
                    None | Some("=") => Operator::Eq,
                    Some("!=") => Operator::Ne,
                    Some(">") => Operator::Gt,
                    Some(">=") => Operator::Ge,
                    Some("<") => Operator::Lt,
                    Some("<=") => Operator::Le,
                    Some("~>") => Operator::Pessimistic,
                    Some(_) => return Err(invalid()),
                };
                let (version, precision) = Version::parse_with_precision(&caps[2]).map_err(|_| invalid())?;
                Ok(Requirement { op, version, precision })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn check(&self, version: &Version) -> bool {
        self.0.iter().all(|requirement| requirement.allows(version))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{requirement}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VersionConstraint {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
