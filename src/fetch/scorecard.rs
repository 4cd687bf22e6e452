//! Security scorecard signal.
//!
//! The scorecard itself is produced by an external containerized tool;
//! this module only resolves the repository to analyze, invokes the tool
//! through the [`ScorecardRunner`] seam and parses its JSON output. The
//! concrete invocation mechanism lives behind the trait so a subprocess,
//! a sidecar HTTP call or a test stub are interchangeable without
//! touching normalization or aggregation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::registry::RegistryClient;
use crate::fetch::SignalFetcher;
use crate::model::{
    MavenCoordinate, RawSignal, ScorecardCheck, ScorecardReport, SignalKind, SignalPayload,
};

const SCORECARD_IMAGE: &str = "gcr.io/openssf/scorecard:stable";

/// Produces a scorecard report for a source repository.
#[async_trait]
pub trait ScorecardRunner: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, repo_url: &str) -> Result<ScorecardReport, FetchError>;
}

/// Runs the scorecard container image through Docker.
pub struct DockerScorecardRunner {
    image: String,
    github_token: Option<String>,
}

impl DockerScorecardRunner {
    pub fn new(github_token: Option<String>) -> Self {
        Self {
            image: SCORECARD_IMAGE.to_string(),
            github_token,
        }
    }

    /// Maps a spawn failure to the right error class: a missing binary
    /// means the host cannot invoke the tool at all.
    fn spawn_error(err: std::io::Error) -> FetchError {
        if err.kind() == std::io::ErrorKind::NotFound {
            FetchError::ToolMissing(
                "docker not found on PATH; install Docker to enable the scorecard signal"
                    .to_string(),
            )
        } else {
            FetchError::ToolFailed(format!("could not start docker: {}", err))
        }
    }

    async fn image_present(&self) -> Result<bool, FetchError> {
        let output = Command::new("docker")
            .args(["image", "ls", "--format", "{{.Repository}}:{{.Tag}}"])
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            return Err(FetchError::ToolFailed(format!(
                "docker image ls failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing.lines().any(|line| line.trim() == self.image))
    }

    async fn pull_image(&self) -> Result<(), FetchError> {
        info!(image = %self.image, "pulling scorecard image");
        let output = Command::new("docker")
            .args(["pull", &self.image])
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            return Err(FetchError::ToolFailed(format!(
                "could not pull {}: {}",
                self.image,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ScorecardRunner for DockerScorecardRunner {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn run(&self, repo_url: &str) -> Result<ScorecardReport, FetchError> {
        let token = self.github_token.as_ref().ok_or_else(|| {
            FetchError::Unavailable(
                "GITHUB_AUTH_TOKEN is not set; the scorecard tool requires one".to_string(),
            )
        })?;

        if !self.image_present().await? {
            self.pull_image().await?;
        } else {
            debug!(image = %self.image, "scorecard image already present");
        }

        let output = Command::new("docker")
            .args(["run", "--rm", "-e"])
            .arg(format!("GITHUB_AUTH_TOKEN={}", token))
            .arg(&self.image)
            .arg(format!("--repo={}", repo_url))
            .arg("--format=json")
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if output.stdout.is_empty() {
            return Err(FetchError::ToolFailed(format!(
                "scorecard produced no output: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_scorecard_json(&String::from_utf8_lossy(&output.stdout), repo_url)
    }
}

#[derive(Deserialize)]
struct ScorecardOutput {
    score: f64,
    #[serde(default)]
    checks: Vec<ScorecardOutputCheck>,
}

#[derive(Deserialize)]
struct ScorecardOutputCheck {
    name: String,
    score: Option<f64>,
    reason: Option<String>,
}

/// Parses the JSON emitted by the scorecard tool.
pub fn parse_scorecard_json(raw: &str, repo_url: &str) -> Result<ScorecardReport, FetchError> {
    let parsed: ScorecardOutput = serde_json::from_str(raw)
        .map_err(|e| FetchError::Malformed(format!("scorecard output: {}", e)))?;

    let checks = parsed
        .checks
        .into_iter()
        .map(|c| ScorecardCheck {
            name: c.name,
            // The tool reports -1 for checks that did not apply.
            score: c.score.unwrap_or(-1.0),
            reason: c.reason,
        })
        .collect();

    Ok(ScorecardReport {
        repo_url: repo_url.to_string(),
        score: parsed.score,
        checks,
    })
}

/// Fetches the security-scorecard signal for a coordinate.
pub struct ScorecardFetcher {
    registry: Arc<RegistryClient>,
    coordinate: MavenCoordinate,
    runner: Arc<dyn ScorecardRunner>,
    timeout_secs: u64,
}

impl ScorecardFetcher {
    pub fn new(
        registry: Arc<RegistryClient>,
        coordinate: MavenCoordinate,
        runner: Arc<dyn ScorecardRunner>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            registry,
            coordinate,
            runner,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SignalFetcher for ScorecardFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::SecurityScorecard
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    async fn fetch(&self) -> Result<RawSignal, FetchError> {
        let metadata = self.registry.project(&self.coordinate).await?;

        let repo_url = match metadata.github_repository_url() {
            Some(url) => url.to_string(),
            None => {
                warn!(coordinate = %self.coordinate, "no GitHub repository for artifact");
                return Err(FetchError::Unavailable(
                    "no GitHub repository found for this artifact".to_string(),
                ));
            }
        };

        let report = self.runner.run(&repo_url).await?;
        Ok(RawSignal::new(SignalPayload::Scorecard(report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORECARD_FIXTURE: &str = r#"{
        "date": "2026-08-01",
        "repo": {"name": "github.com/example/sample-lib", "commit": "abc123"},
        "score": 8.6,
        "checks": [
            {"name": "Maintained", "score": 10, "reason": "30 commits in the last 90 days"},
            {"name": "Branch-Protection", "score": -1, "reason": "internal error"},
            {"name": "Vulnerabilities", "score": 9, "reason": "no known vulnerabilities"}
        ]
    }"#;

    #[test]
    fn test_parse_scorecard_json() {
        let report =
            parse_scorecard_json(SCORECARD_FIXTURE, "https://github.com/example/sample-lib")
                .unwrap();

        assert!((report.score - 8.6).abs() < 1e-9);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.checks[0].name, "Maintained");
        assert!((report.checks[1].score - -1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_scorecard_json_without_checks() {
        let report = parse_scorecard_json(r#"{"score": 5.0}"#, "https://github.com/x/y").unwrap();
        assert!((report.score - 5.0).abs() < 1e-9);
        assert!(report.checks.is_empty());
    }

    #[test]
    fn test_parse_scorecard_json_malformed() {
        let err = parse_scorecard_json("not json", "https://github.com/x/y").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_runner_without_token_is_unavailable() {
        let runner = DockerScorecardRunner::new(None);
        let err = futures::executor::block_on(runner.run("https://github.com/x/y")).unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }
}
