//! Version constraint parsing and version resolution.
//!
//! Supported ranges follow the common semver constraint syntax used by
//! plugin publishers:
//!
//! - optional `v` prefixes (`v1.2.0`, `>=v1.0`)
//! - comparators `=`, `!=`, `>`, `>=`, `<`, `<=`, `~`, `^`
//! - wildcards `1.x`, `1.2.*`, `*`
//! - comma or whitespace separated conjunctions (`>=1.2, <2.0`, `>= 1.2 < 2.0`)
//! - hyphen ranges (`1.2 - 1.4.5`)
//! - `||` alternatives (`1.x || >=3.0`)
//!
//! A bare version without an operator means an exact match.
//!
//! # Examples
//!
//! ```
//! use plugin_meta::version::{VersionConstraints, resolve};
//!
//! let constraints = VersionConstraints::new("v1.2.0", ["v1.x"]);
//! assert_eq!(resolve(&constraints, "").unwrap(), "v1.2.0");
//! assert_eq!(resolve(&constraints, "v1.3.1").unwrap(), "v1.3.1");
//! assert!(resolve(&constraints, "v2.0.0").is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationErrors};

/// Literal version accepted regardless of constraints (local builds).
pub const DEV_VERSION: &str = "dev";

static HYPHEN_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+-\s+(\S+)\s*$").expect("hyphen range regex is valid")
});

static OPERATOR_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(>=|<=|!=|[<>=~^])\s+").expect("operator regex is valid")
});

/// Operators, two-character forms first so that `>=` is not read as `>`.
const OPERATORS: [&str; 8] = [">=", "<=", "!=", ">", "<", "=", "~", "^"];

#[derive(Debug, Clone)]
enum Specifier {
    Any,
    Compare(semver::Comparator),
    Exclude(semver::Version),
}

impl Specifier {
    fn matches(&self, candidate: &semver::Version) -> bool {
        match self {
            Self::Any => true,
            Self::Compare(c) => c.matches(candidate),
            Self::Exclude(v) => candidate != v,
        }
    }
}

/// A parsed version range: a disjunction of conjunctions of specifiers.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<Vec<Specifier>>,
    /// The range as written, for display.
    raw: String,
}

impl VersionRange {
    /// Parse a range expression.
    pub fn parse(range: &str) -> Result<Self> {
        let raw = range.trim().to_string();
        let invalid = |reason: String| Error::InvalidRange {
            range: raw.clone(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("empty range".to_string()));
        }

        let mut alternatives = Vec::new();
        for alternative in raw.split("||") {
            let alternative = alternative.trim();
            if alternative.is_empty() {
                return Err(invalid("empty alternative around '||'".to_string()));
            }
            alternatives.push(parse_alternative(alternative).map_err(invalid)?);
        }

        Ok(Self { alternatives, raw })
    }

    /// Check a parsed version against the range.
    pub fn matches(&self, version: &semver::Version) -> bool {
        self.alternatives
            .iter()
            .any(|specs| specs.iter().all(|s| s.matches(version)))
    }

    /// Check a version string; unparseable versions never match.
    pub fn matches_str(&self, version: &str) -> bool {
        parse_version(version).is_some_and(|v| self.matches(&v))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_alternative(alternative: &str) -> std::result::Result<Vec<Specifier>, String> {
    if let Some(caps) = HYPHEN_RANGE.captures(alternative) {
        return Ok(vec![
            comparator(">=", &caps[1])?,
            comparator("<=", &caps[2])?,
        ]);
    }

    let compact = OPERATOR_SPACE.replace_all(alternative, "$1");
    compact
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_specifier)
        .collect()
}

fn parse_specifier(token: &str) -> std::result::Result<Specifier, String> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token));
    comparator(op, rest)
}

fn comparator(op: &str, version: &str) -> std::result::Result<Specifier, String> {
    let version = strip_v(version.trim());
    if version.is_empty() {
        return Err(format!("missing version after '{op}'"));
    }
    if op.is_empty() && matches!(version, "*" | "x" | "X") {
        return Ok(Specifier::Any);
    }
    if op == "!=" {
        return parse_version(version)
            .map(Specifier::Exclude)
            .ok_or_else(|| format!("invalid version: {version}"));
    }

    let wildcard = version.split('.').any(|p| matches!(p, "*" | "x" | "X"));
    let op = if op.is_empty() && !wildcard { "=" } else { op };
    semver::Comparator::parse(&format!("{op}{version}"))
        .map(Specifier::Compare)
        .map_err(|e| format!("'{op}{version}': {e}"))
}

fn strip_v(s: &str) -> &str {
    s.strip_prefix(['v', 'V']).unwrap_or(s)
}

/// Parse a version, tolerating a `v` prefix and missing minor/patch parts.
///
/// - `"v1.2.3"` -> `1.2.3`
/// - `"1.2"` -> `1.2.0`
/// - `"v1"` -> `1.0.0`
pub fn parse_version(s: &str) -> Option<semver::Version> {
    let mut candidate = strip_v(s.trim()).to_string();
    if candidate.is_empty() {
        return None;
    }
    for _ in 0..3 {
        if let Ok(v) = semver::Version::parse(&candidate) {
            return Some(v);
        }
        if candidate.contains(['-', '+']) {
            return None;
        }
        candidate.push_str(".0");
    }
    None
}

/// Version constraints advertised for a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConstraints {
    /// Version installed when no version is requested.
    #[serde(default)]
    pub recommended_version: String,
    /// Range expressions a requested version must satisfy (any of them).
    ///
    /// An empty list means only the recommended version is supported.
    #[serde(default)]
    pub supported_versions: Vec<String>,
}

impl VersionConstraints {
    pub fn new<I, S>(recommended: impl Into<String>, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recommended_version: recommended.into(),
            supported_versions: supported.into_iter().map(Into::into).collect(),
        }
    }

    /// The ranges a requested version is checked against, for reporting.
    pub fn allowed(&self) -> Vec<String> {
        if self.supported_versions.is_empty() && !self.recommended_version.is_empty() {
            vec![self.recommended_version.clone()]
        } else {
            self.supported_versions.clone()
        }
    }

    /// Whether `requested` equals or satisfies any supported range.
    pub fn allows(&self, requested: &str) -> Result<bool> {
        if self.supported_versions.is_empty() {
            return Ok(!self.recommended_version.is_empty()
                && same_version(requested, &self.recommended_version));
        }

        for range in &self.supported_versions {
            if range.trim() == requested {
                return Ok(true);
            }
            if VersionRange::parse(range)?.matches_str(requested) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Check that every range parses and that the recommended version is
    /// itself supported. All problems are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut report = ValidationErrors::new("version constraints");

        let mut ranges = Vec::with_capacity(self.supported_versions.len());
        for range in &self.supported_versions {
            match VersionRange::parse(range) {
                Ok(parsed) => ranges.push(parsed),
                Err(e) => report.push(e.to_string()),
            }
        }

        let recommended = self.recommended_version.trim();
        if !recommended.is_empty() && recommended != DEV_VERSION {
            match parse_version(recommended) {
                None => report.push(format!(
                    "recommended version '{recommended}' is not a valid semantic version"
                )),
                Some(version) => {
                    let supported = self.supported_versions.is_empty()
                        || self.supported_versions.iter().any(|r| r.trim() == recommended)
                        || ranges.iter().any(|r| r.matches(&version));
                    if !supported {
                        report.push(format!(
                            "recommended version '{recommended}' does not satisfy any supported range ({})",
                            self.supported_versions.join(", ")
                        ));
                    }
                }
            }
        }

        report.into_result()
    }
}

fn same_version(a: &str, b: &str) -> bool {
    a == b
        || matches!((parse_version(a), parse_version(b)), (Some(x), Some(y)) if x == y)
}

/// Pick the concrete version to install.
///
/// - empty `requested` -> the recommended version
/// - [`DEV_VERSION`] -> accepted as-is
/// - otherwise `requested` must equal or satisfy a supported range
///
/// # Errors
///
/// [`Error::VersionConstraint`] naming the request and the allowed ranges,
/// [`Error::NoRecommendedVersion`] when nothing was requested and nothing is
/// recommended, or [`Error::InvalidRange`] for a malformed range.
pub fn resolve(constraints: &VersionConstraints, requested: &str) -> Result<String> {
    let requested = requested.trim();

    if requested.is_empty() {
        let recommended = constraints.recommended_version.trim();
        if recommended.is_empty() {
            return Err(Error::NoRecommendedVersion);
        }
        return Ok(recommended.to_string());
    }

    if requested == DEV_VERSION {
        return Ok(requested.to_string());
    }

    if constraints.allows(requested)? {
        Ok(requested.to_string())
    } else {
        Err(Error::VersionConstraint {
            requested: requested.to_string(),
            allowed: constraints.allowed(),
        })
    }
}

/// Whether `candidate` is a strictly newer semantic version than `current`.
///
/// [`DEV_VERSION`] and unparseable versions are never considered older or
/// newer.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    match (parse_version(candidate), parse_version(current)) {
        (Some(c), Some(i)) => c > i,
        _ => false,
    }
}
