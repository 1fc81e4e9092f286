use crate::core::error::{PpvError, Result};
use crate::core::http::{HttpClient, Transport, TransportError};
use crate::core::retry::RetryPolicy;
use crate::pypi::types::{
    DependencyReport, IndexResponse, PackageMetadata, PackageQuery, QueryResult, ReleaseFile,
    VersionRecord,
};
use crate::pypi::version::{SemverFirst, VersionOrder};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// PyPI version resolver. Owns the retry loop; individual attempts are
/// delegated to the transport.
pub struct PypiClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    base_url: String,
    order: Arc<dyn VersionOrder>,
}

impl PypiClient {
    /// Client against the live index, honoring `PPV_INDEX_URL` and
    /// `PPV_TIMEOUT_SECS` overrides.
    pub fn new() -> Result<Self> {
        let timeout = env::var("PPV_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let base_url =
            env::var("PPV_INDEX_URL").unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string());

        Self::with_config(base_url, Duration::from_secs(timeout), RetryPolicy::default())
    }

    pub fn with_config(
        base_url: impl Into<String>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self::with_transport(
            Arc::new(HttpClient::new(timeout)?),
            base_url,
            policy,
        ))
    }

    /// Seam for tests: any transport, any policy.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            policy,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            order: Arc::new(SemverFirst),
        }
    }

    /// Swaps the version ordering strategy.
    pub fn with_order(mut self, order: Arc<dyn VersionOrder>) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> &dyn VersionOrder {
        self.order.as_ref()
    }

    fn package_url(&self, query: &PackageQuery) -> String {
        format!(
            "{}/{}/json",
            self.base_url,
            urlencoding::encode(&query.normalized())
        )
    }

    fn release_url(&self, query: &PackageQuery, version: &str) -> String {
        format!(
            "{}/{}/{}/json",
            self.base_url,
            urlencoding::encode(&query.normalized()),
            urlencoding::encode(version)
        )
    }

    /// Fetches all known versions of a package, newest first, with no
    /// duplicate version strings.
    pub async fn resolve(&self, query: &PackageQuery) -> Result<QueryResult> {
        let url = self.package_url(query);
        let body = self.fetch(query.name(), &url).await?;

        let parsed: IndexResponse =
            serde_json::from_str(&body).map_err(|e| PpvError::Parse {
                package: query.name().to_string(),
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let latest = parsed.info.version.as_deref().map(str::trim);
        let summary = parsed.info.summary.filter(|s| !s.trim().is_empty());

        let total_entries = parsed.releases.len();
        let mut skipped = 0usize;
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (token, files) in parsed.releases {
            let version = token.trim();
            if version.is_empty() {
                skipped += 1;
                continue;
            }
            // Releases with every file yanked are hidden by the index
            // UI as well; they parsed fine, so they don't count as
            // malformed.
            if !files.is_empty() && files.iter().all(|f| f.yanked.unwrap_or(false)) {
                continue;
            }
            if !seen.insert(version.to_string()) {
                continue;
            }

            records.push(VersionRecord {
                version: version.to_string(),
                release_date: earliest_upload(&files),
                summary: if latest == Some(version) {
                    summary.clone()
                } else {
                    None
                },
            });
        }

        if total_entries > 0 && records.is_empty() && skipped > 0 {
            return Err(PpvError::Parse {
                package: query.name().to_string(),
                endpoint: url,
                reason: format!("no parseable release entries (skipped {skipped})"),
            });
        }

        records.sort_by(|a, b| self.order.compare(&b.version, &a.version));

        debug!(
            "resolved {} version(s) for {} ({} skipped)",
            records.len(),
            query.name(),
            skipped
        );

        Ok(QueryResult {
            query: query.clone(),
            versions: records,
            fetched_at: Utc::now(),
            skipped,
        })
    }

    /// Package-level metadata as reported for the latest release.
    pub async fn metadata(&self, query: &PackageQuery) -> Result<PackageMetadata> {
        let url = self.package_url(query);
        let body = self.fetch(query.name(), &url).await?;

        let parsed: IndexResponse =
            serde_json::from_str(&body).map_err(|e| PpvError::Parse {
                package: query.name().to_string(),
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let info = parsed.info;
        let version = non_empty(info.version).ok_or_else(|| PpvError::Parse {
            package: query.name().to_string(),
            endpoint: url,
            reason: "index reported no latest version".into(),
        })?;

        Ok(PackageMetadata {
            name: non_empty(info.name).unwrap_or_else(|| query.name().to_string()),
            version,
            summary: non_empty(info.summary),
            author: non_empty(info.author),
            author_email: non_empty(info.author_email),
            license: non_empty(info.license),
            home_page: non_empty(info.home_page),
            project_url: non_empty(info.project_url),
            description: non_empty(info.description),
        })
    }

    /// Latest version string as reported by the index.
    pub async fn latest_version(&self, query: &PackageQuery) -> Result<String> {
        Ok(self.metadata(query).await?.version)
    }

    /// `requires_dist` entries for one specific version.
    pub async fn dependencies(
        &self,
        query: &PackageQuery,
        version: &str,
    ) -> Result<DependencyReport> {
        let url = self.release_url(query, version);
        let body = self.fetch(query.name(), &url).await?;

        let parsed: IndexResponse =
            serde_json::from_str(&body).map_err(|e| PpvError::Parse {
                package: query.name().to_string(),
                endpoint: url,
                reason: e.to_string(),
            })?;

        Ok(DependencyReport {
            package: query.name().to_string(),
            version: non_empty(parsed.info.version).unwrap_or_else(|| version.to_string()),
            dependencies: parsed.info.requires_dist.unwrap_or_default(),
        })
    }

    /// Retry loop: transient failures back off per the policy; 404 maps
    /// to NotFound immediately and is never retried.
    async fn fetch(&self, package: &str, url: &str) -> Result<String> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.transport.get(url).await {
                Ok(resp) => return Ok(resp.body),
                Err(TransportError::ClientError(404)) => {
                    return Err(PpvError::NotFound {
                        package: package.to_string(),
                        endpoint: url.to_string(),
                    });
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    debug!("attempt {attempt} for {url} failed ({e}); retrying in {delay:?}");
                    sleep(delay).await;
                }
                Err(e) => {
                    return Err(PpvError::Network {
                        package: package.to_string(),
                        endpoint: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Earliest non-yanked file upload time of a release.
fn earliest_upload(files: &[ReleaseFile]) -> Option<DateTime<Utc>> {
    let mut best: Option<DateTime<Utc>> = None;
    for f in files {
        if f.yanked.unwrap_or(false) {
            continue;
        }
        let dt_str = f.upload_time_iso_8601.as_deref().or(f.upload_time.as_deref());
        let Some(dt_str) = dt_str else {
            continue;
        };
        let dt = match DateTime::parse_from_rfc3339(dt_str) {
            Ok(v) => v.with_timezone(&Utc),
            // upload_time comes without an offset.
            Err(_) => match NaiveDateTime::parse_from_str(dt_str, "%Y-%m-%dT%H:%M:%S") {
                Ok(naive) => naive.and_utc(),
                Err(_) => continue,
            },
        };
        best = match best {
            Some(current) if current <= dt => Some(current),
            _ => Some(dt),
        };
    }
    best
}
