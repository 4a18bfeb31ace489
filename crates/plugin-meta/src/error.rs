//! Error types for plugin-meta

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more validation rules failed; every violation is listed.
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("version '{requested}' is not supported; allowed versions: {}", .allowed.join(", "))]
    VersionConstraint {
        requested: String,
        allowed: Vec<String>,
    },

    #[error("no version was requested and no recommended version is declared")]
    NoRecommendedVersion,

    #[error("invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("invalid distribution config: {reason}")]
    InvalidDistribution { reason: String },

    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("failed to parse plugin descriptor: {0}")]
    DescriptorParse(#[from] serde_json::Error),

    #[error(transparent)]
    Fs(#[from] plugin_fs::Error),
}

/// Aggregated rule violations for a single subject.
///
/// Validation collects every failure instead of stopping at the first one,
/// so a single report tells the caller everything that is wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    subject: String,
    issues: Vec<String>,
}

impl ValidationErrors {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            issues: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    /// Fold another report into this one, prefixing its issues with its subject.
    pub fn absorb(&mut self, other: ValidationErrors) {
        for issue in other.issues {
            self.issues.push(format!("{}: {}", other.subject, issue));
        }
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise [`Error::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed validation: {}",
            self.subject,
            self.issues.join("; ")
        )
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_ok() {
        assert!(ValidationErrors::new("x").into_result().is_ok());
    }

    #[test]
    fn display_lists_every_issue() {
        let mut report = ValidationErrors::new("plugin \"\"");
        report.push("name cannot be empty");
        report.push("version cannot be empty");

        let rendered = report.to_string();
        assert!(rendered.contains("name cannot be empty"));
        assert!(rendered.contains("version cannot be empty"));
    }

    #[test]
    fn absorb_prefixes_subject() {
        let mut outer = ValidationErrors::new("manifest");
        let mut inner = ValidationErrors::new("plugin 'a'");
        inner.push("bad range");
        outer.absorb(inner);
        assert_eq!(outer.issues(), &["plugin 'a': bad range".to_string()]);
    }
}
