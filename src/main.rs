use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mvntrust::{
    cache::Cache,
    config::{Config, FetchPolicy, GITHUB_TOKEN_ENV, LIBRARIES_IO_KEY_ENV},
    error::{FetchError, TrustError},
    fetch::{
        fetch_all, CompatibilityFetcher, DockerScorecardRunner, RegistryClient,
        ReleaseFrequencyFetcher, ScorecardFetcher, SignalFetcher,
    },
    model::{MavenCoordinate, SignalKind},
    output::{describe_signal_source, format_report_to_string, print_report, OutputFormat},
    score::evaluate,
};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const BAD_INPUT: u8 = 2;
    pub const AUTH: u8 = 3;
    pub const FETCH: u8 = 4;
    pub const TOOL_MISSING: u8 = 5;
}

#[derive(Parser)]
#[command(name = "mvntrust")]
#[command(
    author,
    version,
    about = "Aggregate security and maintenance signals for a Maven dependency into a trust score"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the trust score for a Maven dependency
    Score {
        /// Group ID of the Maven artifact
        #[arg(short, long)]
        group_id: String,

        /// Artifact ID of the Maven artifact
        #[arg(short, long)]
        artifact_id: String,

        /// Declared dependency version, compared against the latest release
        #[arg(long)]
        version: Option<String>,

        /// Show the full scorecard and per-signal detail
        #[arg(long)]
        full: bool,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Fetch-failure policy (strict, lenient)
        #[arg(long)]
        policy: Option<String>,

        /// Skip the containerized scorecard signal
        #[arg(long)]
        no_scorecard: bool,

        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<String>,

        /// Clear cached registry responses before fetching
        #[arg(long)]
        clear_cache: bool,
    },

    /// List signal sources and whether their prerequisites are met
    Sources,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the cache
    ClearCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Maps the error taxonomy onto distinct exit codes so callers can tell
/// bad input, auth failures, network failures and missing tooling apart.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TrustError>() {
        Some(TrustError::Input(_)) | Some(TrustError::Config(_)) => exit_codes::BAD_INPUT,
        Some(TrustError::Auth(_)) => exit_codes::AUTH,
        Some(TrustError::Fetch { source, .. }) if source.is_tool_missing() => {
            exit_codes::TOOL_MISSING
        }
        Some(TrustError::Fetch { .. }) | Some(TrustError::Normalization { .. }) => {
            exit_codes::FETCH
        }
        _ => exit_codes::ERROR,
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Score {
            group_id,
            artifact_id,
            version,
            full,
            format,
            policy,
            no_scorecard,
            output,
            clear_cache,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            run_score(
                &config,
                group_id,
                artifact_id,
                version,
                full,
                format_str,
                policy,
                no_scorecard,
                output,
                clear_cache,
            )
            .await
        }
        Commands::Sources => {
            list_sources(&config);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let cache = Cache::new();
            cache.clear()?;
            println!("Cache cleared.");
            Ok(exit_codes::SUCCESS)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_score(
    config: &Config,
    group_id: String,
    artifact_id: String,
    declared_version: Option<String>,
    full: bool,
    format: String,
    policy: Option<String>,
    no_scorecard: bool,
    output_file: Option<String>,
    clear_cache: bool,
) -> Result<u8> {
    let coordinate = MavenCoordinate::new(group_id, artifact_id)?;
    let format = OutputFormat::from_str(&format).map_err(TrustError::Input)?;
    let policy = match policy {
        Some(s) => FetchPolicy::from_str(&s).map_err(TrustError::Input)?,
        None => config.policy,
    };
    config.weights.validate()?;

    let api_key = config.libraries_io_api_key().ok_or_else(|| {
        TrustError::Auth(format!(
            "no libraries.io API key; set {} or add libraries_io_api_key to {}",
            LIBRARIES_IO_KEY_ENV,
            Config::config_path().display()
        ))
    })?;

    let cache = Cache::with_ttl_hours(config.cache_ttl_hours);
    if clear_cache {
        cache.clear()?;
    }

    let registry = Arc::new(RegistryClient::new(api_key, cache, config.http_timeout_secs));
    // A little headroom over the HTTP client's own timeout.
    let http_budget = config.http_timeout_secs + 5;

    let scorecard_enabled = config.run_scorecard && !no_scorecard;
    let mut fetchers: Vec<Box<dyn SignalFetcher>> = Vec::new();
    if scorecard_enabled {
        let runner = Arc::new(DockerScorecardRunner::new(config.github_token()));
        fetchers.push(Box::new(ScorecardFetcher::new(
            registry.clone(),
            coordinate.clone(),
            runner,
            config.scorecard_timeout_secs,
        )));
    }
    fetchers.push(Box::new(ReleaseFrequencyFetcher::new(
        registry.clone(),
        coordinate.clone(),
        http_budget,
    )));
    fetchers.push(Box::new(CompatibilityFetcher::new(
        registry.clone(),
        coordinate.clone(),
        declared_version,
        http_budget,
    )));

    let is_interactive = format == OutputFormat::Table && output_file.is_none();
    let spinner = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Fetching signals for {}...", coordinate));
        Some(pb)
    } else {
        None
    };

    let mut outcomes = fetch_all(&fetchers).await;
    if !scorecard_enabled {
        outcomes.insert(
            0,
            (
                SignalKind::SecurityScorecard,
                Err(FetchError::Unavailable(
                    "scorecard signal disabled".to_string(),
                )),
            ),
        );
    }

    if let Some(pb) = spinner {
        let fetched = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        pb.finish_with_message(format!("Fetched {}/{} signals", fetched, outcomes.len()));
    }

    let report = evaluate(coordinate, outcomes, policy, &config.weights)?;

    if let Some(path) = output_file {
        let json = format_report_to_string(&report, OutputFormat::Json)?;
        std::fs::write(&path, json)?;
        println!("Report written to: {}", path);
    } else {
        print_report(&report, format, full)?;
    }

    Ok(exit_codes::SUCCESS)
}

fn list_sources(config: &Config) {
    println!("Signal sources:");
    println!();

    for kind in SignalKind::ALL {
        println!("  {:<24} {}", kind.as_str(), describe_signal_source(kind));
    }

    println!();
    println!("Prerequisites:");
    println!(
        "  {:<24} {}",
        LIBRARIES_IO_KEY_ENV,
        if config.libraries_io_api_key().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!(
        "  {:<24} {}",
        GITHUB_TOKEN_ENV,
        if config.github_token().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!(
        "  {:<24} {}",
        "docker",
        if docker_available() {
            "available"
        } else {
            "not found"
        }
    );
}

fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'mvntrust config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_anyhow(err: TrustError) -> anyhow::Error {
        err.into()
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            exit_code_for(&as_anyhow(TrustError::Input("bad".into()))),
            exit_codes::BAD_INPUT
        );
        assert_eq!(
            exit_code_for(&as_anyhow(TrustError::Auth("no key".into()))),
            exit_codes::AUTH
        );
        assert_eq!(
            exit_code_for(&as_anyhow(TrustError::fetch(
                SignalKind::SecurityScorecard,
                FetchError::ToolMissing("docker".into()),
            ))),
            exit_codes::TOOL_MISSING
        );
        assert_eq!(
            exit_code_for(&as_anyhow(TrustError::fetch(
                SignalKind::ReleaseFrequency,
                FetchError::Timeout(10),
            ))),
            exit_codes::FETCH
        );
        assert_eq!(
            exit_code_for(&as_anyhow(TrustError::Aggregation("none".into()))),
            exit_codes::ERROR
        );
    }

    #[test]
    fn test_cli_parses_score_command() {
        let cli = Cli::try_parse_from([
            "mvntrust",
            "score",
            "-g",
            "org.example",
            "-a",
            "sample-lib",
            "--version",
            "1.2.3",
            "--full",
            "--policy",
            "strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Score {
                group_id,
                artifact_id,
                version,
                full,
                policy,
                ..
            } => {
                assert_eq!(group_id, "org.example");
                assert_eq!(artifact_id, "sample-lib");
                assert_eq!(version.as_deref(), Some("1.2.3"));
                assert!(full);
                assert_eq!(policy.as_deref(), Some("strict"));
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_cli_requires_coordinates() {
        assert!(Cli::try_parse_from(["mvntrust", "score", "-g", "org.example"]).is_err());
    }
}
