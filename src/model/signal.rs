use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::MavenCoordinate;

/// The measured dimensions feeding into the trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    SecurityScorecard,
    ReleaseFrequency,
    VersionCompatibility,
}

impl SignalKind {
    /// All kinds, in the order they appear in reports.
    pub const ALL: [SignalKind; 3] = [
        SignalKind::SecurityScorecard,
        SignalKind::ReleaseFrequency,
        SignalKind::VersionCompatibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::SecurityScorecard => "security-scorecard",
            SignalKind::ReleaseFrequency => "release-frequency",
            SignalKind::VersionCompatibility => "version-compatibility",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SignalKind::SecurityScorecard => "Security Scorecard",
            SignalKind::ReleaseFrequency => "Release Frequency",
            SignalKind::VersionCompatibility => "Version Compatibility",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One check row from a scorecard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardCheck {
    pub name: String,
    /// 0-10, or negative when the check did not apply.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Parsed output of a scorecard run against a source repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardReport {
    pub repo_url: String,
    /// Overall score on the tool's 0-10 scale.
    pub score: f64,
    #[serde(default)]
    pub checks: Vec<ScorecardCheck>,
}

/// Release publication history of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseHistory {
    pub release_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_release: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<DateTime<Utc>>,
    /// Mean days between consecutive releases; `None` with fewer
    /// than two dated releases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_interval_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
}

/// Classification of one version-to-version update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Major,
    Minor,
    Patch,
    /// Either side does not follow `major.minor.patch`.
    Irregular,
}

/// Counts of consecutive update pairs by classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHistory {
    pub total: usize,
    pub major: usize,
    pub minor: usize,
    pub patch: usize,
    pub irregular: usize,
}

impl UpdateHistory {
    pub fn record(&mut self, kind: UpdateKind) {
        self.total += 1;
        match kind {
            UpdateKind::Major => self.major += 1,
            UpdateKind::Minor => self.minor += 1,
            UpdateKind::Patch => self.patch += 1,
            UpdateKind::Irregular => self.irregular += 1,
        }
    }
}

/// Version-compatibility data for an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub history: UpdateHistory,
}

/// The payload of a fetched signal, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalPayload {
    Scorecard(ScorecardReport),
    Releases(ReleaseHistory),
    Compatibility(CompatibilityReport),
}

impl SignalPayload {
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalPayload::Scorecard(_) => SignalKind::SecurityScorecard,
            SignalPayload::Releases(_) => SignalKind::ReleaseFrequency,
            SignalPayload::Compatibility(_) => SignalKind::VersionCompatibility,
        }
    }
}

/// One fetcher result. Created fresh per run and discarded after
/// normalization; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    pub kind: SignalKind,
    pub payload: SignalPayload,
    pub fetched_at: DateTime<Utc>,
}

impl RawSignal {
    pub fn new(payload: SignalPayload) -> Self {
        Self {
            kind: payload.kind(),
            payload,
            fetched_at: Utc::now(),
        }
    }
}

/// A signal mapped onto the common [0,1] scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignal {
    pub kind: SignalKind,
    pub score: f64,
}

/// A normalized signal together with the weight actually applied to it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightedSignal {
    #[serde(flatten)]
    pub signal: NormalizedSignal,
    pub weight: f64,
}

/// The aggregate result.
///
/// Invariant: `value` is the weighted sum of the breakdown scores and the
/// applied weights sum to 1, so `value` stays in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    pub value: f64,
    pub breakdown: Vec<WeightedSignal>,
}

/// A signal that could not be fetched, with the reason it is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSignal {
    pub kind: SignalKind,
    pub reason: String,
}

/// Retained per-signal detail for full-report mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorecard: Option<ScorecardReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releases: Option<ReleaseHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityReport>,
}

impl SignalDetails {
    /// Records the payload of a fetched signal for later rendering.
    pub fn record(&mut self, signal: &RawSignal) {
        match &signal.payload {
            SignalPayload::Scorecard(s) => self.scorecard = Some(s.clone()),
            SignalPayload::Releases(r) => self.releases = Some(r.clone()),
            SignalPayload::Compatibility(c) => self.compatibility = Some(c.clone()),
        }
    }
}

/// Everything the reporter needs for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustReport {
    pub coordinate: MavenCoordinate,
    pub generated_at: DateTime<Utc>,
    pub score: TrustScore,
    pub missing: Vec<MissingSignal>,
    pub details: SignalDetails,
}

impl TrustReport {
    pub fn new(
        coordinate: MavenCoordinate,
        score: TrustScore,
        missing: Vec<MissingSignal>,
        details: SignalDetails,
    ) -> Self {
        Self {
            coordinate,
            generated_at: Utc::now(),
            score,
            missing,
            details,
        }
    }
}
