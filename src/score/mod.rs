//! Normalization and aggregation of fetched signals.
//!
//! [`evaluate`] is the pure tail of the pipeline: given the outcome of
//! one fetch round it applies the fetch-failure policy, normalizes
//! whatever arrived and aggregates it into a [`TrustReport`]. Running
//! it twice over identical outcomes yields identical scores.

mod aggregate;
mod normalize;

pub use aggregate::aggregate;
pub use normalize::{normalize, version_distance_score};

use tracing::warn;

use crate::config::{FetchPolicy, Weights};
use crate::error::{FetchError, TrustError};
use crate::fetch::FetchOutcome;
use crate::model::{MavenCoordinate, MissingSignal, SignalDetails, TrustReport};

/// Turns fetch outcomes into a trust report under the given policy.
///
/// Policy handling:
/// - an authentication rejection is fatal regardless of policy;
/// - a signal marked unavailable (no GitHub repository, scorecard
///   disabled) is recorded as missing under both policies; nothing
///   was attempted, so there is no fetch failure to be strict about;
/// - any other fetch or normalization failure aborts a strict run and
///   marks the signal missing under a lenient one.
///
/// # Errors
///
/// See policy handling above; additionally fails with
/// [`TrustError::Aggregation`] when no signal survives.
pub fn evaluate(
    coordinate: MavenCoordinate,
    outcomes: Vec<FetchOutcome>,
    policy: FetchPolicy,
    weights: &Weights,
) -> Result<TrustReport, TrustError> {
    let mut normalized = Vec::new();
    let mut missing = Vec::new();
    let mut details = SignalDetails::default();

    for (kind, outcome) in outcomes {
        match outcome {
            Ok(raw) => match normalize(&raw) {
                Ok(signal) => {
                    details.record(&raw);
                    normalized.push(signal);
                }
                Err(err) => {
                    if policy == FetchPolicy::Strict {
                        return Err(err);
                    }
                    warn!(signal = %kind, %err, "dropping signal");
                    missing.push(MissingSignal {
                        kind,
                        reason: err.to_string(),
                    });
                }
            },
            Err(FetchError::Auth(reason)) => return Err(TrustError::Auth(reason)),
            Err(FetchError::Unavailable(reason)) => {
                missing.push(MissingSignal { kind, reason });
            }
            Err(err) => {
                if policy == FetchPolicy::Strict {
                    return Err(TrustError::fetch(kind, err));
                }
                warn!(signal = %kind, %err, "signal fetch failed");
                missing.push(MissingSignal {
                    kind,
                    reason: err.to_string(),
                });
            }
        }
    }

    let score = aggregate(&normalized, weights)?;
    Ok(TrustReport::new(coordinate, score, missing, details))
}
