//! Release-cadence signal.
//!
//! Builds the publication history of an artifact from registry metadata.
//! The cadence statistic is the mean number of days between consecutive
//! releases, `span_days / (n - 1)` over the dated releases.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::FetchError;
use crate::fetch::registry::{ProjectMetadata, RegistryClient};
use crate::fetch::SignalFetcher;
use crate::model::{MavenCoordinate, RawSignal, ReleaseHistory, SignalKind, SignalPayload};

/// Fetches the release-frequency signal for a coordinate.
pub struct ReleaseFrequencyFetcher {
    registry: Arc<RegistryClient>,
    coordinate: MavenCoordinate,
    timeout_secs: u64,
}

impl ReleaseFrequencyFetcher {
    pub fn new(registry: Arc<RegistryClient>, coordinate: MavenCoordinate, timeout_secs: u64) -> Self {
        Self {
            registry,
            coordinate,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SignalFetcher for ReleaseFrequencyFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::ReleaseFrequency
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    async fn fetch(&self) -> Result<RawSignal, FetchError> {
        let metadata = self.registry.project(&self.coordinate).await?;
        let history = build_history(&metadata);
        Ok(RawSignal::new(SignalPayload::Releases(history)))
    }
}

/// Derives the release history from registry metadata.
pub fn build_history(metadata: &ProjectMetadata) -> ReleaseHistory {
    let versions = metadata.stable_versions();

    let mut dated: Vec<chrono::DateTime<chrono::Utc>> =
        versions.iter().filter_map(|v| v.published_at).collect();
    dated.sort();

    let (first, latest) = match (dated.first(), dated.last()) {
        (Some(first), Some(latest)) => (Some(*first), Some(*latest)),
        _ => (None, None),
    };

    let mean_interval_days = if dated.len() >= 2 {
        let span_days = (dated[dated.len() - 1] - dated[0]).num_days();
        Some(span_days as f64 / (dated.len() - 1) as f64)
    } else {
        None
    };

    let latest_version = metadata
        .latest_release_number
        .clone()
        .or_else(|| versions.last().map(|v| v.number.clone()));

    ReleaseHistory {
        release_count: versions.len(),
        first_release: first,
        latest_release: latest,
        mean_interval_days,
        latest_version,
    }
}
