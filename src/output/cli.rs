use crate::model::{SignalKind, TrustReport, UpdateHistory};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct SignalRow {
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

#[derive(Tabled)]
struct MissingRow {
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Check")]
    name: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

pub fn print_cli_table(report: &TrustReport, full: bool) -> Result<()> {
    println!();
    println!("Trust report for {}", report.coordinate);
    println!(
        "Generated at: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    // Signal breakdown
    let rows: Vec<SignalRow> = report
        .score
        .breakdown
        .iter()
        .map(|entry| SignalRow {
            signal: entry.signal.kind.display_name().to_string(),
            score: format!("{:.2}", entry.signal.score),
            weight: format!("{:.0}%", entry.weight * 100.0),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    // Missing signals
    if !report.missing.is_empty() {
        println!();
        println!("{} signal(s) could not be evaluated:", report.missing.len());
        println!();

        let rows: Vec<MissingRow> = report
            .missing
            .iter()
            .map(|m| MissingRow {
                signal: m.kind.display_name().to_string(),
                reason: truncate(&m.reason, 70),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if full {
        print_full_details(report);
    }

    println!();
    println!(
        "Trust Score: {:.2} / 1.00 {}",
        report.score.value,
        score_indicator(report.score.value)
    );

    Ok(())
}

fn print_full_details(report: &TrustReport) {
    if let Some(scorecard) = &report.details.scorecard {
        println!();
        println!(
            "Scorecard for {} (overall {:.1}/10):",
            scorecard.repo_url, scorecard.score
        );

        if !scorecard.checks.is_empty() {
            println!();
            let rows: Vec<CheckRow> = scorecard
                .checks
                .iter()
                .map(|check| CheckRow {
                    name: check.name.clone(),
                    score: if check.score < 0.0 {
                        "-".to_string()
                    } else {
                        format!("{:.0}", check.score)
                    },
                    reason: truncate(check.reason.as_deref().unwrap_or("-"), 60),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }

    if let Some(releases) = &report.details.releases {
        println!();
        println!("Release history:");
        println!("  Releases: {}", releases.release_count);
        if let Some(latest) = &releases.latest_version {
            println!("  Latest version: {}", latest);
        }
        if let (Some(first), Some(last)) = (releases.first_release, releases.latest_release) {
            println!(
                "  First release: {}   Latest release: {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            );
        }
        if let Some(interval) = releases.mean_interval_days {
            println!(
                "  A new version is released every {} days on average.",
                interval.round() as i64
            );
        }
    }

    if let Some(compat) = &report.details.compatibility {
        println!();
        println!("Version compatibility:");
        if let (Some(declared), Some(latest)) =
            (&compat.declared_version, &compat.latest_version)
        {
            println!("  Declared version: {}   Latest: {}", declared, latest);
        }
        print_update_history(&compat.history);
    }
}

fn print_update_history(history: &UpdateHistory) {
    if history.total == 0 {
        println!("  No update history to report.");
        return;
    }

    let share = |count: usize| 100.0 * count as f64 / history.total as f64;
    println!(
        "  {} past updates: {:.0}% patch, {:.0}% minor, {:.0}% major, {:.0}% irregular",
        history.total,
        share(history.patch),
        share(history.minor),
        share(history.major),
        share(history.irregular)
    );
}

fn score_indicator(value: f64) -> &'static str {
    match value {
        v if v >= 0.9 => "[Excellent]",
        v if v >= 0.7 => "[Good]",
        v if v >= 0.5 => "[Fair]",
        v if v >= 0.25 => "[Poor]",
        _ => "[Critical]",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

/// Human-readable sources listing for the `sources` subcommand.
pub fn describe_signal_source(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::SecurityScorecard => "containerized scorecard tool (requires Docker + GITHUB_AUTH_TOKEN)",
        SignalKind::ReleaseFrequency => "libraries.io release dates (requires LIBRARIES_IO_API_KEY)",
        SignalKind::VersionCompatibility => "libraries.io version list (requires LIBRARIES_IO_API_KEY)",
    }
}
