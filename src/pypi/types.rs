use crate::core::error::{PpvError, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// PyPI project name grammar (PEP 508): alphanumeric start and end,
/// dots, hyphens and underscores in between.
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap());

/// A validated package lookup request. Created once per package per
/// invocation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageQuery {
    name: String,
}

impl PackageQuery {
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PpvError::InvalidArgument(
                "package name must not be empty".into(),
            ));
        }
        if !NAME_RE.is_match(trimmed) {
            return Err(PpvError::InvalidArgument(format!(
                "'{trimmed}' is not a valid package name"
            )));
        }
        Ok(Self {
            name: trimmed.to_string(),
        })
    }

    /// Name as the user wrote it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// PEP 503 normalized form used in index URLs: lowercase, runs of
    /// `.`/`_`/`-` collapsed to a single hyphen.
    pub fn normalized(&self) -> String {
        self.name
            .to_lowercase()
            .replace(['_', '.'], "-")
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl TryFrom<String> for PackageQuery {
    type Error = PpvError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<PackageQuery> for String {
    fn from(query: PackageQuery) -> Self {
        query.name
    }
}

/// One resolved release. `release_date` is the earliest non-yanked file
/// upload time; `summary` is only present on the release the index
/// reports as latest, since PyPI serves summaries at package level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Outcome of a successful version lookup. Versions are strictly
/// descending by precedence with no duplicate version strings; an empty
/// list is a real "package has no releases" state, never a failure in
/// disguise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "package")]
    pub query: PackageQuery,
    pub versions: Vec<VersionRecord>,
    pub fetched_at: DateTime<Utc>,
    /// Malformed release entries dropped during parsing.
    #[serde(default)]
    pub skipped: usize,
}

/// Package-level metadata for the `metadata` command.
#[derive(Debug, Clone, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Dependencies of one resolved package version.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    pub package: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

// Wire format of https://pypi.org/pypi/{package}/json and
// .../{package}/{version}/json.

#[derive(Debug, Deserialize)]
pub(crate) struct IndexResponse {
    pub info: IndexInfo,
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseFile {
    #[serde(default)]
    pub upload_time_iso_8601: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub yanked: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_empty_and_invalid_names() {
        assert!(PackageQuery::new("").is_err());
        assert!(PackageQuery::new("   ").is_err());
        assert!(PackageQuery::new("-leading-hyphen").is_err());
        assert!(PackageQuery::new("trailing-").is_err());
        assert!(PackageQuery::new("has space").is_err());
        assert!(PackageQuery::new("bad/name").is_err());
    }

    #[test]
    fn query_accepts_real_names() {
        for name in ["requests", "Flask", "ruamel.yaml", "typing_extensions", "a"] {
            assert!(PackageQuery::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn normalization_follows_pep503() {
        assert_eq!(PackageQuery::new("Flask").unwrap().normalized(), "flask");
        assert_eq!(
            PackageQuery::new("django_rest_framework").unwrap().normalized(),
            "django-rest-framework"
        );
        assert_eq!(
            PackageQuery::new("ruamel.yaml").unwrap().normalized(),
            "ruamel-yaml"
        );
        assert_eq!(
            PackageQuery::new("my__package").unwrap().normalized(),
            "my-package"
        );
    }

    #[test]
    fn query_serializes_as_plain_string() {
        let q = PackageQuery::new("requests").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), r#""requests""#);
        let back: PackageQuery = serde_json::from_str(r#""requests""#).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn wire_format_tolerates_missing_fields() {
        let resp: IndexResponse =
            serde_json::from_str(r#"{"info": {"version": "1.0.0"}}"#).unwrap();
        assert_eq!(resp.info.version.as_deref(), Some("1.0.0"));
        assert!(resp.releases.is_empty());
    }
}
