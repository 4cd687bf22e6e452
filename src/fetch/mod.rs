//! Signal fetchers.
//!
//! This module provides the [`SignalFetcher`] trait and implementations
//! for retrieving the raw inputs of the trust score.
//!
//! # Available Fetchers
//!
//! | Fetcher | Signal | Source |
//! |---------|--------|--------|
//! | [`ScorecardFetcher`] | Security scorecard | containerized scorecard tool |
//! | [`ReleaseFrequencyFetcher`] | Release cadence | libraries.io version dates |
//! | [`CompatibilityFetcher`] | Version compatibility | libraries.io version list |
//!
//! Fetchers are independent of each other and run concurrently; each
//! call is bounded by its own timeout so a hung external service cannot
//! stall the run indefinitely.

pub mod compatibility;
pub mod registry;
pub mod release;
pub mod scorecard;

pub use compatibility::CompatibilityFetcher;
pub use registry::{ProjectMetadata, RegistryClient, VersionEntry};
pub use release::ReleaseFrequencyFetcher;
pub use scorecard::{DockerScorecardRunner, ScorecardFetcher, ScorecardRunner};

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;

use crate::error::FetchError;
use crate::model::{RawSignal, SignalKind};

/// Trait for fetching one raw signal for a dependency.
///
/// Implementors perform an isolated network or tool call and never
/// share mutable state with other fetchers.
#[async_trait]
pub trait SignalFetcher: Send + Sync {
    /// The signal this fetcher produces.
    fn kind(&self) -> SignalKind;

    /// Timeout budget for one fetch, in seconds.
    fn timeout_secs(&self) -> u64;

    /// Fetches the raw signal.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on network failure, missing tooling,
    /// authentication rejection or a malformed upstream response.
    async fn fetch(&self) -> Result<RawSignal, FetchError>;
}

/// The per-signal result of one fetch round.
pub type FetchOutcome = (SignalKind, Result<RawSignal, FetchError>);

/// Runs all fetchers concurrently, each under its own timeout.
///
/// Results come back in the same order as the input fetchers; a timeout
/// is reported as [`FetchError::Timeout`] for that signal only.
pub async fn fetch_all(fetchers: &[Box<dyn SignalFetcher>]) -> Vec<FetchOutcome> {
    let futures: Vec<_> = fetchers
        .iter()
        .map(|fetcher| async move {
            let kind = fetcher.kind();
            let budget = fetcher.timeout_secs();
            let result = match tokio::time::timeout(Duration::from_secs(budget), fetcher.fetch())
                .await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(budget)),
            };
            (kind, result)
        })
        .collect();

    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReleaseHistory, SignalPayload};

    struct StubFetcher {
        kind: SignalKind,
        delay_ms: u64,
        timeout_secs: u64,
    }

    #[async_trait]
    impl SignalFetcher for StubFetcher {
        fn kind(&self) -> SignalKind {
            self.kind
        }

        fn timeout_secs(&self) -> u64 {
            self.timeout_secs
        }

        async fn fetch(&self) -> Result<RawSignal, FetchError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(RawSignal::new(SignalPayload::Releases(ReleaseHistory {
                release_count: 1,
                first_release: None,
                latest_release: None,
                mean_interval_days: None,
                latest_version: None,
            })))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_order() {
        let fetchers: Vec<Box<dyn SignalFetcher>> = vec![
            Box::new(StubFetcher {
                kind: SignalKind::SecurityScorecard,
                delay_ms: 30,
                timeout_secs: 5,
            }),
            Box::new(StubFetcher {
                kind: SignalKind::ReleaseFrequency,
                delay_ms: 0,
                timeout_secs: 5,
            }),
        ];

        let outcomes = fetch_all(&fetchers).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, SignalKind::SecurityScorecard);
        assert_eq!(outcomes[1].0, SignalKind::ReleaseFrequency);
        assert!(outcomes.iter().all(|(_, r)| r.is_ok()));
    }

    #[tokio::test]
    async fn test_fetch_all_times_out_slow_fetcher() {
        let fetchers: Vec<Box<dyn SignalFetcher>> = vec![
            Box::new(StubFetcher {
                kind: SignalKind::ReleaseFrequency,
                delay_ms: 10_000,
                timeout_secs: 1,
            }),
            Box::new(StubFetcher {
                kind: SignalKind::VersionCompatibility,
                delay_ms: 0,
                timeout_secs: 5,
            }),
        ];

        let outcomes = fetch_all(&fetchers).await;
        assert!(matches!(
            outcomes[0].1,
            Err(FetchError::Timeout(1))
        ));
        assert!(outcomes[1].1.is_ok());
    }
}
