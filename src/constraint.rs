//! Semantic version constraint evaluation
//!
//! Handles range expressions like:
//! - Exact: `1.2.3`, `=1.2.3`
//! - Comparisons: `!=1.2.3`, `>1.2.3`, `<1.2.3`, `>=1.2.3`, `<=1.2.3`
//! - Tilde and caret ranges: `~1.2.0`, `^1.2.0`
//! - Hyphen ranges: `1.0.0 - 2.0.0`
//! - Wildcards and partial versions: `1.2.x`, `1.2`, `*`
//! - Conjunctions separated by spaces or commas: `>=1.0.0 <2.0.0`
//! - Alternatives separated by `||`

use regex::Regex;
use semver::{Prerelease, Version};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Partial version inside a constraint (missing or `x` components are wildcards)
static PARTIAL_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(?P<major>\d+|[xX*])(?:\.(?P<minor>\d+|[xX*]))?(?:\.(?P<patch>\d+|[xX*]))?(?:-(?P<pre>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("partial version pattern is valid")
});

/// Operators recognised in front of a version, longest first
const OPERATORS: &[(&str, Op)] = &[
    ("!=", Op::NotEq),
    (">=", Op::GreaterEq),
    ("=>", Op::GreaterEq),
    ("<=", Op::LessEq),
    ("=<", Op::LessEq),
    ("~>", Op::Tilde),
    (">", Op::Greater),
    ("<", Op::Less),
    ("=", Op::Eq),
    ("~", Op::Tilde),
    ("^", Op::Caret),
];

/// Errors raised while parsing a constraint expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// Constraint string is blank
    #[error("version constraint cannot be empty")]
    Empty,

    /// A comparator could not be parsed
    #[error("invalid comparator '{token}' in constraint '{constraint}'")]
    InvalidComparator { constraint: String, token: String },

    /// Hyphen range without an upper bound
    #[error("incomplete hyphen range in constraint '{constraint}'")]
    IncompleteRange { constraint: String },

    /// `||` with nothing on one side
    #[error("empty alternative in constraint '{constraint}'")]
    EmptyAlternative { constraint: String },
}

/// Errors raised while answering a satisfaction query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The deployed version is not a semantic version
    #[error("invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// The constraint is not a valid range expression
    #[error(transparent)]
    InvalidConstraint(#[from] ConstraintError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    NotEq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Tilde,
    Caret,
}

/// A single primitive comparison after desugaring ranges
#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparator {
    Eq(Version),
    NotEq(Version),
    Greater(Version),
    GreaterEq(Version),
    Less(Version),
    LessEq(Version),
    /// Matches versions below `low` or at/above `high`
    Outside { low: Version, high: Version },
    Unsatisfiable,
}

impl Comparator {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Comparator::Eq(v) => precedence(version, v) == Ordering::Equal,
            Comparator::NotEq(v) => precedence(version, v) != Ordering::Equal,
            Comparator::Greater(v) => precedence(version, v) == Ordering::Greater,
            Comparator::GreaterEq(v) => precedence(version, v) != Ordering::Less,
            Comparator::Less(v) => precedence(version, v) == Ordering::Less,
            Comparator::LessEq(v) => precedence(version, v) != Ordering::Greater,
            Comparator::Outside { low, high } => {
                precedence(version, low) == Ordering::Less
                    || precedence(version, high) != Ordering::Less
            }
            Comparator::Unsatisfiable => false,
        }
    }
}

/// One comparator as written, with the primitive comparisons it desugars to
///
/// A pre-release version only passes a term whose own version names a
/// pre-release. Plain `!=1.2.3` places no restriction on pre-releases.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    comparators: Vec<Comparator>,
    admits_prerelease: bool,
}

impl Term {
    fn matches(&self, version: &Version) -> bool {
        (version.pre.is_empty() || self.admits_prerelease)
            && self.comparators.iter().all(|c| c.matches(version))
    }
}

/// Version with wildcard components, as written inside a constraint
#[derive(Debug, Clone)]
struct PartialVersion {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl PartialVersion {
    fn parse(text: &str) -> Option<Self> {
        let caps = PARTIAL_VERSION.captures(text)?;
        let component = |name: &str| -> Option<Option<u64>> {
            match caps.name(name).map(|m| m.as_str()) {
                None | Some("x") | Some("X") | Some("*") => Some(None),
                Some(digits) => digits.parse().ok().map(Some),
            }
        };

        let major = component("major")?;
        let mut minor = component("minor")?;
        let mut patch = component("patch")?;
        // Anything after a wildcard is a wildcard too (`1.x.3` reads as `1.x`)
        if major.is_none() {
            minor = None;
        }
        if minor.is_none() {
            patch = None;
        }

        let pre = match caps.name("pre") {
            Some(m) => Prerelease::new(m.as_str()).ok()?,
            None => Prerelease::EMPTY,
        };
        // A pre-release tag only makes sense on a complete version
        if !pre.is_empty() && patch.is_none() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn is_complete(&self) -> bool {
        self.patch.is_some()
    }

    fn is_any(&self) -> bool {
        self.major.is_none()
    }

    /// Smallest version matched by this partial
    fn floor(&self) -> Version {
        let mut version = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        version.pre = self.pre.clone();
        version
    }

    /// First version past the range of an incomplete partial
    ///
    /// `None` for `*` or when the next component would overflow.
    fn ceiling(&self) -> Option<Version> {
        match (self.major?, self.minor) {
            (major, None) => Some(Version::new(major.checked_add(1)?, 0, 0)),
            (major, Some(minor)) => Some(Version::new(major, minor.checked_add(1)?, 0)),
        }
    }

    fn caret_ceiling(&self) -> Option<Version> {
        Some(match (self.major?, self.minor, self.patch) {
            (0, None, _) => Version::new(1, 0, 0),
            (0, Some(0), None) => Version::new(0, 1, 0),
            (0, Some(0), Some(patch)) => Version::new(0, 0, patch.checked_add(1)?),
            (0, Some(minor), _) => Version::new(0, minor.checked_add(1)?, 0),
            (major, _, _) => Version::new(major.checked_add(1)?, 0, 0),
        })
    }
}

/// Exclusive upper bound that also keeps out pre-releases of `ceiling`
fn below(mut ceiling: Version) -> Comparator {
    ceiling.pre = Prerelease::new("0").unwrap_or(Prerelease::EMPTY);
    Comparator::Less(ceiling)
}

/// Expand one operator/version pair into primitive comparators
///
/// `None` when a range bound does not fit in a version component.
fn expand(op: Op, partial: &PartialVersion) -> Option<Term> {
    let floor = partial.floor();
    let comparators = if partial.is_any() {
        match op {
            Op::NotEq | Op::Greater | Op::Less => vec![Comparator::Unsatisfiable],
            _ => Vec::new(),
        }
    } else {
        match op {
            Op::Eq if partial.is_complete() => vec![Comparator::Eq(floor)],
            Op::Eq => vec![Comparator::GreaterEq(floor), below(partial.ceiling()?)],
            Op::NotEq if partial.is_complete() => vec![Comparator::NotEq(floor)],
            Op::NotEq => vec![Comparator::Outside {
                low: floor,
                high: partial.ceiling()?,
            }],
            Op::Greater if partial.is_complete() => vec![Comparator::Greater(floor)],
            Op::Greater => vec![Comparator::GreaterEq(partial.ceiling()?)],
            Op::GreaterEq => vec![Comparator::GreaterEq(floor)],
            Op::Less => vec![Comparator::Less(floor)],
            Op::LessEq if partial.is_complete() => vec![Comparator::LessEq(floor)],
            Op::LessEq => vec![below(partial.ceiling()?)],
            Op::Tilde => vec![Comparator::GreaterEq(floor), below(partial.ceiling()?)],
            Op::Caret => vec![Comparator::GreaterEq(floor), below(partial.caret_ceiling()?)],
        }
    };

    Some(Term {
        comparators,
        admits_prerelease: !partial.pre.is_empty() || (op == Op::NotEq && partial.is_complete()),
    })
}

/// Compare two versions by SemVer precedence, ignoring build metadata
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.pre.cmp(&b.pre),
        })
}

fn split_operator(token: &str) -> (Op, &str) {
    for (symbol, op) in OPERATORS {
        if let Some(rest) = token.strip_prefix(symbol) {
            return (*op, rest);
        }
    }
    (Op::Eq, token)
}

fn invalid(raw: &str, token: &str) -> ConstraintError {
    ConstraintError::InvalidComparator {
        constraint: raw.to_string(),
        token: token.to_string(),
    }
}

fn is_bare_operator(token: &str) -> bool {
    OPERATORS.iter().any(|(symbol, _)| *symbol == token)
}

/// A parsed semantic version range expression
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    raw: String,
    /// Disjunction of conjunctions
    alternatives: Vec<Vec<Term>>,
}

impl VersionConstraint {
    /// Parse a constraint expression
    pub fn parse(raw: &str) -> Result<Self, ConstraintError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConstraintError::Empty);
        }

        let alternatives = trimmed
            .split("||")
            .map(|group| Self::parse_conjunction(group, trimmed))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    fn parse_conjunction(group: &str, raw: &str) -> Result<Vec<Term>, ConstraintError> {
        let tokens: Vec<&str> = group
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(ConstraintError::EmptyAlternative {
                constraint: raw.to_string(),
            });
        }

        let mut terms = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            if is_bare_operator(token) {
                // `>= 1.2.3`: operator separated from its version
                let version = tokens
                    .get(i + 1)
                    .copied()
                    .ok_or_else(|| invalid(raw, token))?;
                let joined = format!("{}{}", token, version);
                let parsed = Self::parse_comparator(&joined).ok_or_else(|| invalid(raw, &joined))?;
                terms.push(parsed);
                i += 2;
            } else if tokens.get(i + 1).copied() == Some("-") {
                let upper = tokens.get(i + 2).copied().ok_or_else(|| {
                    ConstraintError::IncompleteRange {
                        constraint: raw.to_string(),
                    }
                })?;
                let low = PartialVersion::parse(token).ok_or_else(|| invalid(raw, token))?;
                let high = PartialVersion::parse(upper).ok_or_else(|| invalid(raw, upper))?;
                terms.push(expand(Op::GreaterEq, &low).ok_or_else(|| invalid(raw, token))?);
                terms.push(expand(Op::LessEq, &high).ok_or_else(|| invalid(raw, upper))?);
                i += 3;
            } else {
                let parsed = Self::parse_comparator(token).ok_or_else(|| invalid(raw, token))?;
                terms.push(parsed);
                i += 1;
            }
        }

        Ok(terms)
    }

    fn parse_comparator(token: &str) -> Option<Term> {
        let (op, version) = split_operator(token);
        let partial = PartialVersion::parse(version)?;
        expand(op, &partial)
    }

    /// The constraint as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether a parsed version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|terms| terms.iter().all(|term| term.matches(version)))
    }

    /// Check whether a version string satisfies this constraint
    pub fn is_satisfied_by(&self, version: &str) -> Result<bool, EvaluationError> {
        let version = parse_version(version)?;
        Ok(self.matches(&version))
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for VersionConstraint {}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Parse a deployed version (`MAJOR.MINOR.PATCH[-pre][+build]`, optional leading `v`)
pub fn parse_version(version: &str) -> Result<Version, EvaluationError> {
    let trimmed = version.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare).map_err(|e| EvaluationError::InvalidVersion {
        version: version.to_string(),
        message: e.to_string(),
    })
}

/// Check whether `version` satisfies `constraint`
///
/// Distinguishes "incompatible" (`Ok(false)`) from "unevaluable" (`Err`).
pub fn is_satisfied(version: &str, constraint: &str) -> Result<bool, EvaluationError> {
    let constraint = VersionConstraint::parse(constraint)?;
    constraint.is_satisfied_by(version)
}
