use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use check_dirvish_lib::freshness::{self, FreshnessMetrics};
use check_dirvish_lib::humanize::humanize;
use check_dirvish_lib::paths;
use check_dirvish_lib::vault::Vault;
use clap::Parser;
use serde_json::json;
use tracing::debug;

mod thresholds;
use thresholds::Range;

/// Monitoring check for the freshness of dirvish backup vaults.
///
/// Scans the vault's history newest-first, derives the age of the last
/// attempt, the age of the last success, and the duration of the last run,
/// and maps them onto the usual OK/WARNING/CRITICAL/UNKNOWN exit codes.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the vault to check
    vault: String,

    /// Path to the bank of the vault (default /srv/backup/, or
    /// CHECK_DIRVISH_BASE_PATH)
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Warning if a metric is outside RANGE in seconds
    #[arg(short = 'w', long, value_name = "RANGE")]
    warning: Option<Range>,

    /// Critical if a metric is outside RANGE in seconds
    #[arg(short = 'c', long, value_name = "RANGE")]
    critical: Option<Range>,

    /// Increase output verbosity (use up to 3 times)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Abort execution after TIMEOUT seconds
    #[arg(short = 't', long, default_value_t = 10, value_name = "TIMEOUT")]
    timeout: u64,

    /// Max time in hours to take a backup; evaluated through -w/-c against
    /// the duration metric
    #[arg(long, default_value_t = 12.0, value_name = "HOURS")]
    max_duration: f64,

    /// Show the result as JSON instead of a plugin status line
    #[arg(long)]
    json: bool,
}

/// Standard monitoring-plugin states. The derived order ranks severity,
/// with UNKNOWN dominating so a missing metric is never masked by healthy
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    fn code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        }
    }
}

/// One metric evaluated against the thresholds.
struct MetricReport {
    name: &'static str,
    value: Option<i64>,
    state: ServiceState,
    text: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let check_name = check_name(&cli.vault);
    arm_watchdog(cli.timeout, check_name.clone());

    match run(&cli, &check_name) {
        Ok(state) => std::process::exit(state.code()),
        Err(err) => {
            println!("{check_name} UNKNOWN - {err:#}");
            std::process::exit(ServiceState::Unknown.code());
        }
    }
}

fn run(cli: &Cli, check_name: &str) -> anyhow::Result<ServiceState> {
    let base_path = paths::active_base_path(cli.base_path.clone());
    debug!("Checking vault {:?} under {:?}", cli.vault, base_path);
    debug!("Tolerated backup duration: {}h", cli.max_duration);
    let vault = Vault::new(cli.vault.clone(), base_path);

    let metrics = match freshness::evaluate(&vault) {
        Ok(metrics) => metrics,
        Err(err) => {
            // Vault-level failure: a single clear line naming the path.
            if cli.json {
                let report = json!({
                    "check": check_name,
                    "vault": cli.vault,
                    "state": ServiceState::Unknown.label(),
                    "exit_code": ServiceState::Unknown.code(),
                    "error": err.to_string(),
                });
                print_json(&report)?;
            } else {
                println!("{check_name} UNKNOWN - {err}");
            }
            return Ok(ServiceState::Unknown);
        }
    };

    let reports = build_reports(cli, &metrics);
    let state = reports
        .iter()
        .map(|report| report.state)
        .max()
        .unwrap_or(ServiceState::Unknown);

    if cli.json {
        let report = json!({
            "check": check_name,
            "vault": cli.vault,
            "state": state.label(),
            "exit_code": state.code(),
            "metrics": metrics,
        });
        print_json(&report)?;
    } else {
        println!(
            "{check_name} {} - {} | {}",
            state.label(),
            summary_text(&reports),
            perfdata(cli, &reports)
        );
    }
    Ok(state)
}

/// Check name shown on the status line: `BACKUP <VAULT>` with the vault
/// name truncated at the first dot and uppercased.
fn check_name(vault: &str) -> String {
    let prefix = vault.split('.').next().unwrap_or(vault);
    format!("BACKUP {}", prefix.to_uppercase())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    // Diagnostics go to stderr; stdout carries only the status line.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Ends the process once the wall-clock budget is spent. Monitoring
/// schedulers expect a plugin to exit UNKNOWN rather than hang.
fn arm_watchdog(timeout_secs: u64, check_name: String) {
    if timeout_secs == 0 {
        return;
    }
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(timeout_secs));
        println!("{check_name} UNKNOWN - check aborted after {timeout_secs}s");
        std::process::exit(ServiceState::Unknown.code());
    });
}

fn build_reports(cli: &Cli, metrics: &FreshnessMetrics) -> Vec<MetricReport> {
    vec![
        metric_report(cli, "last_success", metrics.last_success, |age| {
            format!("Last successful backup is {age} old")
        }),
        metric_report(cli, "last_try", metrics.last_try, |age| {
            format!("Last backup tried {age} ago")
        }),
        metric_report(cli, "duration", metrics.duration, |took| {
            format!("Last backuprun took {took}")
        }),
    ]
}

fn metric_report(
    cli: &Cli,
    name: &'static str,
    value: Option<i64>,
    describe: impl Fn(&str) -> String,
) -> MetricReport {
    let Some(seconds) = value else {
        return MetricReport {
            name,
            value: None,
            state: ServiceState::Unknown,
            text: format!("{name} could not be determined"),
        };
    };
    let state = if threshold_alerts(&cli.critical, seconds) {
        ServiceState::Critical
    } else if threshold_alerts(&cli.warning, seconds) {
        ServiceState::Warning
    } else {
        ServiceState::Ok
    };
    MetricReport {
        name,
        value,
        state,
        text: describe(&humanize(seconds)),
    }
}

fn threshold_alerts(range: &Option<Range>, seconds: i64) -> bool {
    range
        .as_ref()
        .is_some_and(|range| range.alerts(seconds as f64))
}

/// Human-readable half of the status line, most significant metric first.
fn summary_text(reports: &[MetricReport]) -> String {
    let mut ordered: Vec<&MetricReport> = reports.iter().collect();
    ordered.sort_by_key(|report| std::cmp::Reverse(report.state));
    ordered
        .iter()
        .map(|report| report.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Machine-readable perfdata tags: `name=VALUEs;warn;crit;0`, or `name=U`
/// for a metric with no determinable value.
fn perfdata(cli: &Cli, reports: &[MetricReport]) -> String {
    let warn = cli
        .warning
        .as_ref()
        .map(Range::to_string)
        .unwrap_or_default();
    let crit = cli
        .critical
        .as_ref()
        .map(Range::to_string)
        .unwrap_or_default();
    reports
        .iter()
        .map(|report| match report.value {
            Some(seconds) => format!("{}={}s;{};{};0", report.name, seconds, warn, crit),
            None => format!("{}=U", report.name),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json(report: &serde_json::Value) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("Failed to serialize JSON report")?
    );
    Ok(())
}
