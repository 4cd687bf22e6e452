//! Signal normalization.
//!
//! Maps each heterogeneous raw signal onto the common [0,1] scale with
//! an explicit formula per signal kind. Pure and deterministic; the only
//! failure path is malformed input.
//!
//! # Formulas
//!
//! - **Security scorecard**: the tool scores repositories on 0-10, so
//!   the normalized value is `score / 10`.
//! - **Release cadence**: with a mean interval of `d` days between
//!   releases, `releases_per_year = 365.25 / d` and the score is
//!   `min(1, releases_per_year / 12)`, saturating at a monthly cadence
//!   or better. Fewer than two dated releases score 0.
//! - **Version compatibility**: with a declared version, the semver
//!   distance to the latest release (identical 1.0, patch lag floors at
//!   0.9, minor lag floors at 0.5, one major behind 0.2 with further
//!   majors decaying). Without one, the share of historical updates
//!   that were backward-compatible by semver convention (minor and
//!   patch count fully, irregular half; no history is neutral 0.5).

use crate::error::TrustError;
use crate::fetch::compatibility::parse_lenient_version;
use crate::model::{
    CompatibilityReport, NormalizedSignal, RawSignal, ReleaseHistory, ScorecardReport,
    SignalPayload,
};
use semver::Version;

/// Release cadence at which the score saturates: one release a month.
const SATURATION_RELEASES_PER_YEAR: f64 = 12.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Normalizes one raw signal.
///
/// # Errors
///
/// Returns [`TrustError::Normalization`] when the payload violates the
/// fetcher contract (out-of-range scorecard score, negative interval,
/// unparseable version numbers).
pub fn normalize(signal: &RawSignal) -> Result<NormalizedSignal, TrustError> {
    let score = match &signal.payload {
        SignalPayload::Scorecard(report) => scorecard_score(report),
        SignalPayload::Releases(history) => release_cadence_score(history),
        SignalPayload::Compatibility(report) => compatibility_score(report),
    }
    .map_err(|reason| TrustError::Normalization {
        kind: signal.kind,
        reason,
    })?;

    debug_assert!((0.0..=1.0).contains(&score));
    Ok(NormalizedSignal {
        kind: signal.kind,
        score,
    })
}

fn scorecard_score(report: &ScorecardReport) -> Result<f64, String> {
    if !report.score.is_finite() || !(0.0..=10.0).contains(&report.score) {
        return Err(format!(
            "scorecard score {} outside the 0-10 scale",
            report.score
        ));
    }
    Ok(report.score / 10.0)
}

fn release_cadence_score(history: &ReleaseHistory) -> Result<f64, String> {
    let interval = match history.mean_interval_days {
        None => return Ok(0.0),
        Some(days) => days,
    };

    if !interval.is_finite() || interval < 0.0 {
        return Err(format!("mean release interval {} is invalid", interval));
    }
    if interval == 0.0 {
        // All releases on the same day; cadence cannot be faster.
        return Ok(1.0);
    }

    let releases_per_year = DAYS_PER_YEAR / interval;
    Ok((releases_per_year / SATURATION_RELEASES_PER_YEAR).min(1.0))
}

fn compatibility_score(report: &CompatibilityReport) -> Result<f64, String> {
    if let Some(declared) = &report.declared_version {
        let latest = report
            .latest_version
            .as_deref()
            .ok_or_else(|| "no latest version to compare against".to_string())?;

        let declared = parse_lenient_version(declared)
            .ok_or_else(|| format!("cannot parse declared version '{}'", declared))?;
        let latest = parse_lenient_version(latest)
            .ok_or_else(|| format!("cannot parse latest version '{}'", latest))?;

        return Ok(version_distance_score(&declared, &latest));
    }

    let history = &report.history;
    if history.total == 0 {
        // A single release has no update history to judge.
        return Ok(0.5);
    }

    let compatible = history.minor as f64 + history.patch as f64 + 0.5 * history.irregular as f64;
    Ok(compatible / history.total as f64)
}

/// Scores the semver gap between a declared version and the latest
/// release. Being up to date (or ahead) scores 1.0; a patch-level lag
/// stays near 1.0 and a major-level lag lands near the minimum.
pub fn version_distance_score(current: &Version, latest: &Version) -> f64 {
    if current >= latest {
        return 1.0;
    }

    let major_gap = latest.major.saturating_sub(current.major);
    if major_gap > 0 {
        return 0.2 / major_gap as f64;
    }

    let minor_gap = latest.minor.saturating_sub(current.minor);
    if minor_gap > 0 {
        return (0.9 - 0.05 * minor_gap as f64).max(0.5);
    }

    let patch_gap = latest.patch.saturating_sub(current.patch);
    (1.0 - 0.01 * patch_gap as f64).max(0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SignalKind, UpdateHistory};

    fn scorecard_signal(score: f64) -> RawSignal {
        RawSignal::new(SignalPayload::Scorecard(ScorecardReport {
            repo_url: "https://github.com/example/sample-lib".to_string(),
            score,
            checks: vec![],
        }))
    }

    fn release_signal(mean_interval_days: Option<f64>, count: usize) -> RawSignal {
        RawSignal::new(SignalPayload::Releases(ReleaseHistory {
            release_count: count,
            first_release: None,
            latest_release: None,
            mean_interval_days,
            latest_version: None,
        }))
    }

    #[test]
    fn test_scorecard_normalization() {
        let normalized = normalize(&scorecard_signal(8.0)).unwrap();
        assert_eq!(normalized.kind, SignalKind::SecurityScorecard);
        assert!((normalized.score - 0.8).abs() < 1e-9);

        assert!((normalize(&scorecard_signal(0.0)).unwrap().score).abs() < 1e-9);
        assert!((normalize(&scorecard_signal(10.0)).unwrap().score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scorecard_out_of_range_is_malformed() {
        assert!(normalize(&scorecard_signal(10.5)).is_err());
        assert!(normalize(&scorecard_signal(-1.0)).is_err());
        assert!(normalize(&scorecard_signal(f64::NAN)).is_err());
    }

    #[test]
    fn test_release_cadence_monthly_saturates() {
        let normalized = normalize(&release_signal(Some(30.0), 24)).unwrap();
        assert!((normalized.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_cadence_quarterly() {
        // ~91.3 days between releases: 4 releases/year out of 12 -> 1/3.
        let normalized = normalize(&release_signal(Some(DAYS_PER_YEAR / 4.0), 8)).unwrap();
        assert!((normalized.score - 4.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_cadence_unknown_scores_zero() {
        let normalized = normalize(&release_signal(None, 1)).unwrap();
        assert!(normalized.score.abs() < 1e-9);
    }

    #[test]
    fn test_release_cadence_same_day_releases() {
        let normalized = normalize(&release_signal(Some(0.0), 3)).unwrap();
        assert!((normalized.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_cadence_negative_interval_is_malformed() {
        assert!(normalize(&release_signal(Some(-3.0), 4)).is_err());
    }

    fn compat_signal(declared: Option<&str>, latest: Option<&str>, history: UpdateHistory) -> RawSignal {
        RawSignal::new(SignalPayload::Compatibility(CompatibilityReport {
            declared_version: declared.map(String::from),
            latest_version: latest.map(String::from),
            history,
        }))
    }

    #[test]
    fn test_version_distance_identical_is_max() {
        let signal = compat_signal(Some("2.1.0"), Some("2.1.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_version_distance_major_jump_near_minimum() {
        let signal = compat_signal(Some("1.0.0"), Some("2.0.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 0.2).abs() < 1e-9);

        let signal = compat_signal(Some("1.0.0"), Some("3.0.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_version_distance_patch_lag_near_max() {
        let signal = compat_signal(Some("1.0.0"), Some("1.0.3"), UpdateHistory::default());
        let score = normalize(&signal).unwrap().score;
        assert!((score - 0.97).abs() < 1e-9);
        assert!(score >= 0.9);
    }

    #[test]
    fn test_version_distance_minor_lag() {
        let signal = compat_signal(Some("1.2.0"), Some("1.4.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 0.8).abs() < 1e-9);

        // Deep minor lag floors at 0.5.
        let signal = compat_signal(Some("1.0.0"), Some("1.20.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_version_distance_two_segment_versions() {
        let signal = compat_signal(Some("2.1"), Some("2.1.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_version_distance_unparseable_is_malformed() {
        let signal = compat_signal(Some("final"), Some("1.0.0"), UpdateHistory::default());
        assert!(normalize(&signal).is_err());
    }

    #[test]
    fn test_history_compatibility_score() {
        let mut history = UpdateHistory::default();
        history.minor = 3;
        history.patch = 5;
        history.major = 1;
        history.irregular = 1;
        history.total = 10;

        let signal = compat_signal(None, Some("1.0.0"), history);
        // (3 + 5 + 0.5) / 10
        assert!((normalize(&signal).unwrap().score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_history_compatibility_no_updates_is_neutral() {
        let signal = compat_signal(None, Some("1.0.0"), UpdateHistory::default());
        assert!((normalize(&signal).unwrap().score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let signal = scorecard_signal(7.3);
        let first = normalize(&signal).unwrap();
        let second = normalize(&signal).unwrap();
        assert_eq!(first, second);
    }
}
