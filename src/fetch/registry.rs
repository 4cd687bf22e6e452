//! libraries.io registry client.
//!
//! One project lookup serves several signal fetchers: it carries the
//! repository URL (for the scorecard run) and the version list with
//! publication dates (for cadence and compatibility). Responses are
//! cached on disk so concurrent fetchers and repeated runs don't spend
//! the API quota on identical queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::Cache;
use crate::error::FetchError;
use crate::model::MavenCoordinate;

const LIBRARIES_IO_BASE: &str = "https://libraries.io/api";

/// One released version of the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Project metadata returned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_release_number: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

impl ProjectMetadata {
    /// Released versions, pre-releases excluded, ordered by publication
    /// date (undated entries keep their registry position at the front).
    pub fn stable_versions(&self) -> Vec<VersionEntry> {
        let mut versions: Vec<VersionEntry> = self
            .versions
            .iter()
            .filter(|v| !v.number.contains('-'))
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.published_at.unwrap_or(DateTime::<Utc>::MIN_UTC));
        versions
    }

    /// The repository URL when the project is hosted on GitHub; the
    /// scorecard tool only supports GitHub repositories.
    pub fn github_repository_url(&self) -> Option<&str> {
        self.repository_url
            .as_deref()
            .filter(|url| url.contains("github.com"))
    }
}

pub struct RegistryClient {
    client: reqwest::Client,
    cache: Cache,
    base_url: String,
    api_key: String,
}

impl RegistryClient {
    pub fn new(api_key: String, cache: Cache, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            cache,
            base_url: LIBRARIES_IO_BASE.to_string(),
            api_key,
        }
    }

    /// Fetches project metadata for a Maven coordinate, cache first.
    pub async fn project(&self, coordinate: &MavenCoordinate) -> Result<ProjectMetadata, FetchError> {
        let cache_key = format!("registry_maven_{}", coordinate);

        if let Some(metadata) = self.cache.get::<ProjectMetadata>(&cache_key) {
            debug!(%coordinate, "registry cache hit");
            return Ok(metadata);
        }

        let url = format!("{}/Maven/{}", self.base_url, coordinate);
        debug!(%url, "querying registry");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 => {}
            401 | 403 => {
                return Err(FetchError::Auth(
                    "libraries.io rejected the API key".to_string(),
                ))
            }
            404 => return Err(FetchError::NotFound(coordinate.to_string())),
            429 => return Err(FetchError::RateLimited("libraries.io".to_string())),
            code => {
                return Err(FetchError::Status {
                    status: code,
                    url: url.clone(),
                })
            }
        }

        let metadata: ProjectMetadata = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("registry response: {}", e)))?;

        let _ = self.cache.set(&cache_key, &metadata);

        Ok(metadata)
    }
}
