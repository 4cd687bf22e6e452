//! Score aggregation.
//!
//! Combines normalized signals into the final trust score using the
//! configured weights. When a signal is missing, its weight is
//! redistributed proportionally across the signals that are present,
//! so the result always stays on the same [0,1] scale instead of
//! silently shrinking. With no signals at all there is nothing to
//! aggregate and the run fails.

use crate::config::Weights;
use crate::error::TrustError;
use crate::model::{NormalizedSignal, SignalKind, TrustScore, WeightedSignal};

/// Aggregates normalized signals into a trust score.
///
/// The breakdown is ordered by [`SignalKind::ALL`] and carries the
/// weight actually applied to each signal after redistribution.
///
/// # Errors
///
/// Returns [`TrustError::Aggregation`] when no signals are present or
/// the present signals carry zero total weight.
pub fn aggregate(signals: &[NormalizedSignal], weights: &Weights) -> Result<TrustScore, TrustError> {
    weights.validate()?;

    if signals.is_empty() {
        return Err(TrustError::Aggregation(
            "no signals available".to_string(),
        ));
    }

    let mut ordered: Vec<NormalizedSignal> = signals.to_vec();
    ordered.sort_by_key(|s| kind_rank(s.kind));

    let present_weight: f64 = ordered.iter().map(|s| weights.for_kind(s.kind)).sum();
    if present_weight <= 0.0 {
        return Err(TrustError::Aggregation(
            "all available signals are weighted zero".to_string(),
        ));
    }

    let breakdown: Vec<WeightedSignal> = ordered
        .iter()
        .map(|signal| WeightedSignal {
            signal: *signal,
            weight: weights.for_kind(signal.kind) / present_weight,
        })
        .collect();

    let value: f64 = breakdown
        .iter()
        .map(|w| w.weight * w.signal.score)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    Ok(TrustScore { value, breakdown })
}

fn kind_rank(kind: SignalKind) -> usize {
    SignalKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(SignalKind::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(kind: SignalKind, score: f64) -> NormalizedSignal {
        NormalizedSignal { kind, score }
    }

    fn all_three() -> Vec<NormalizedSignal> {
        vec![
            signal(SignalKind::SecurityScorecard, 0.8),
            signal(SignalKind::ReleaseFrequency, 0.6),
            signal(SignalKind::VersionCompatibility, 0.9),
        ]
    }

    #[test]
    fn test_equal_weights_documented_example() {
        // scorecard 8/10, cadence 0.6, compatibility 0.9 at equal
        // weights: (0.8 + 0.6 + 0.9) / 3.
        let score = aggregate(&all_three(), &Weights::default()).unwrap();

        assert!((score.value - 0.7667).abs() < 1e-4);
        assert_eq!(score.breakdown.len(), 3);

        let weight_sum: f64 = score.breakdown.iter().map(|w| w.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_is_weighted_sum_of_breakdown() {
        let weights = Weights {
            security: 0.5,
            release_cadence: 0.3,
            compatibility: 0.2,
        };
        let score = aggregate(&all_three(), &weights).unwrap();

        let expected: f64 = score
            .breakdown
            .iter()
            .map(|w| w.weight * w.signal.score)
            .sum();
        assert!((score.value - expected).abs() < 1e-9);
        assert!((score.value - (0.5 * 0.8 + 0.3 * 0.6 + 0.2 * 0.9)).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&score.value));
    }

    #[test]
    fn test_missing_signal_renormalizes_weights() {
        // Scorecard missing under lenient policy: the remaining two
        // equal weights renormalize to 1/2 each.
        let signals = vec![
            signal(SignalKind::ReleaseFrequency, 0.6),
            signal(SignalKind::VersionCompatibility, 0.9),
        ];
        let score = aggregate(&signals, &Weights::default()).unwrap();

        assert!((score.value - (0.6 + 0.9) / 2.0).abs() < 1e-9);
        for entry in &score.breakdown {
            assert!((entry.weight - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_signal_takes_full_weight() {
        let signals = vec![signal(SignalKind::ReleaseFrequency, 0.6)];
        let score = aggregate(&signals, &Weights::default()).unwrap();

        assert!((score.value - 0.6).abs() < 1e-9);
        assert!((score.breakdown[0].weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_signals_is_an_error() {
        let err = aggregate(&[], &Weights::default()).unwrap_err();
        assert!(matches!(err, TrustError::Aggregation(_)));
    }

    #[test]
    fn test_zero_weighted_survivors_is_an_error() {
        let weights = Weights {
            security: 1.0,
            release_cadence: 0.0,
            compatibility: 0.0,
        };
        let signals = vec![signal(SignalKind::ReleaseFrequency, 0.6)];
        assert!(matches!(
            aggregate(&signals, &weights),
            Err(TrustError::Aggregation(_))
        ));
    }

    #[test]
    fn test_breakdown_order_is_stable() {
        let signals = vec![
            signal(SignalKind::VersionCompatibility, 0.9),
            signal(SignalKind::SecurityScorecard, 0.8),
        ];
        let score = aggregate(&signals, &Weights::default()).unwrap();

        assert_eq!(score.breakdown[0].signal.kind, SignalKind::SecurityScorecard);
        assert_eq!(
            score.breakdown[1].signal.kind,
            SignalKind::VersionCompatibility
        );
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let first = aggregate(&all_three(), &Weights::default()).unwrap();
        let second = aggregate(&all_three(), &Weights::default()).unwrap();
        assert_eq!(first.value, second.value);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = Weights {
            security: 0.9,
            release_cadence: 0.9,
            compatibility: 0.9,
        };
        assert!(aggregate(&all_three(), &weights).is_err());
    }
}
