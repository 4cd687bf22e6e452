//! Version-compatibility signal.
//!
//! Two inputs feed this signal: the gap between a declared dependency
//! version and the latest release, and the project's update history
//! (how often past releases bumped major vs. minor vs. patch). Maven
//! artifacts frequently use two-segment or otherwise loose version
//! numbers, so parsing is lenient: missing components are padded with
//! zeros before semver comparison.

use async_trait::async_trait;
use semver::Version;
use std::sync::Arc;

use crate::error::FetchError;
use crate::fetch::registry::RegistryClient;
use crate::fetch::SignalFetcher;
use crate::model::{
    CompatibilityReport, MavenCoordinate, RawSignal, SignalKind, SignalPayload, UpdateHistory,
    UpdateKind,
};

/// Parses a version string, padding missing minor/patch components.
///
/// Returns `None` for anything that is not 1-3 dot-separated numeric
/// segments (after stripping a leading `v`).
pub fn parse_lenient_version(input: &str) -> Option<Version> {
    let trimmed = input.trim().trim_start_matches('v');

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut numbers = [0u64; 3];
    for (i, part) in parts.iter().enumerate() {
        numbers[i] = part.parse().ok()?;
    }

    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Classifies the update from one release to the next.
///
/// Versions that do not follow `major.minor.patch` on both sides are
/// irregular; otherwise the highest differing component wins.
pub fn classify_update(old: &str, new: &str) -> UpdateKind {
    let old_parts = strict_parts(old);
    let new_parts = strict_parts(new);

    match (old_parts, new_parts) {
        (Some(old), Some(new)) => {
            if old[0] != new[0] {
                UpdateKind::Major
            } else if old[1] != new[1] {
                UpdateKind::Minor
            } else {
                UpdateKind::Patch
            }
        }
        _ => UpdateKind::Irregular,
    }
}

fn strict_parts(version: &str) -> Option<[u64; 3]> {
    let parts: Vec<&str> = version.trim().trim_start_matches('v').split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    Some([
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    ])
}

/// Builds the update history over consecutive release pairs.
pub fn build_update_history(versions: &[String]) -> UpdateHistory {
    let mut history = UpdateHistory::default();
    for pair in versions.windows(2) {
        history.record(classify_update(&pair[0], &pair[1]));
    }
    history
}

/// Fetches the version-compatibility signal for a coordinate.
pub struct CompatibilityFetcher {
    registry: Arc<RegistryClient>,
    coordinate: MavenCoordinate,
    declared_version: Option<String>,
    timeout_secs: u64,
}

impl CompatibilityFetcher {
    pub fn new(
        registry: Arc<RegistryClient>,
        coordinate: MavenCoordinate,
        declared_version: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            registry,
            coordinate,
            declared_version,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SignalFetcher for CompatibilityFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::VersionCompatibility
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    async fn fetch(&self) -> Result<RawSignal, FetchError> {
        let metadata = self.registry.project(&self.coordinate).await?;

        let versions: Vec<String> = metadata
            .stable_versions()
            .into_iter()
            .map(|v| v.number)
            .collect();

        let latest_version = metadata
            .latest_release_number
            .clone()
            .or_else(|| versions.last().cloned());

        let report = CompatibilityReport {
            declared_version: self.declared_version.clone(),
            latest_version,
            history: build_update_history(&versions),
        };

        Ok(RawSignal::new(SignalPayload::Compatibility(report)))
    }
}
