//! TLD Sweep CLI Application
//!
//! Checks one name against every TLD (or a chosen few) and reports which
//! combinations are registered. A thin front end over tld-sweep-lib.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, Parser};
use futures_util::StreamExt;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};
use tld_sweep_lib::{
    build_candidates, default_tld_store_path, load_env_config, parse_timeout_string,
    resolve_tlds, update_tld_store, CheckResult, ConfigManager, DisplayFilter, DomainChecker,
    LookupMethod, Summary, SweepConfig,
};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for tld-sweep
#[derive(Parser, Debug)]
#[command(name = "tld-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check which TLDs are taken for a name using WHOIS with a ping fallback")]
#[command(
    long_about = "Check which TLDs are taken for a name.\n\nEach candidate is looked up with the system whois client under a deadline. \
Without whois, a single ping gives a best-effort guess."
)]
#[command(styles = STYLES)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Base name to check (e.g. "example")
    #[arg(value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Only check these TLDs instead of the whole TLD list
    #[arg(long = "tlds", value_name = "TLD", num_args = 1.., help_heading = "TLD Selection")]
    pub tlds: Option<Vec<String>>,

    /// TLD list location
    #[arg(long = "tld-file", value_name = "PATH", help_heading = "TLD Selection")]
    pub tld_file: Option<String>,

    /// Download the current TLD list from IANA
    #[arg(short = 'u', long = "update", help_heading = "TLD Selection")]
    pub update: bool,

    /// Do not keep a backup of the previous TLD list when updating
    #[arg(long = "no-backup-tlds", help_heading = "TLD Selection")]
    pub no_backup_tlds: bool,

    /// Only show taken domains
    #[arg(short = 't', long = "taken", help_heading = "Output")]
    pub taken: bool,

    /// Only show available domains
    #[arg(short = 'a', long = "available", help_heading = "Output")]
    pub available: bool,

    /// Output results in JSON format
    #[arg(long = "json", help_heading = "Output")]
    pub json: bool,

    /// Force WHOIS lookups
    #[arg(long = "whois", help_heading = "Lookup")]
    pub whois: bool,

    /// Force ping lookups
    #[arg(long = "ping", help_heading = "Lookup")]
    pub ping: bool,

    /// WHOIS deadline per domain (e.g. "10s", "1m")
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Lookup")]
    pub timeout: Option<String>,

    /// Domains checked at once (1-16, default 1)
    #[arg(long = "concurrency", value_name = "N", help_heading = "Lookup")]
    pub concurrency: Option<usize>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        if args.domain.is_none() {
            eprintln!();
            eprintln!("{}", Args::command().render_usage());
        }
        process::exit(1);
    }

    init_logging(args.debug);

    if let Err(e) = run_sweep(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn validate_args(args: &Args) -> Result<(), String> {
    if args.taken && args.available {
        return Err("Cannot specify both --taken and --available".to_string());
    }

    if args.whois && args.ping {
        return Err("Cannot specify both --whois and --ping".to_string());
    }

    // --update may run on its own
    if args.domain.is_none() && !args.update {
        return Err("You must specify a domain name to check".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 16 {
            return Err("Concurrency must be between 1 and 16".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run_sweep(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    let store = config
        .tld_file
        .clone()
        .or_else(default_tld_store_path)
        .ok_or("Cannot determine the TLD list location; pass --tld-file")?;

    if args.update {
        let count = update_tld_store(&store, config.backup_tlds).await?;
        eprintln!("Updated TLD list: {} TLDs in {}", count, store.display());
    }

    let Some(name) = args.domain.as_deref() else {
        return Ok(());
    };

    let tlds = resolve_tlds(config.tlds.as_deref(), &store)?;
    let checker = DomainChecker::from_environment(config)?;
    let candidates = build_candidates(name, &tlds);

    tracing::debug!(
        name,
        count = candidates.len(),
        method = %checker.method(),
        "starting sweep"
    );

    if args.json {
        let results: Vec<CheckResult> = checker.check_stream(&candidates).collect().await;
        let shown = checker.config().filter.apply(&results);
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let whois_timeout = checker.config().whois_timeout;
    let filter = checker.config().filter;

    ui::print_header(
        name,
        candidates.len(),
        checker.method(),
        checker.config().concurrency,
    );

    let start_time = Instant::now();
    let mut summary = Summary::default();
    let mut results = checker.check_stream(&candidates);

    while let Some(result) = results.next().await {
        summary.record(&result);
        if filter.allows(&result) {
            ui::print_result(&result, whois_timeout);
        }
    }

    ui::print_summary(&summary, start_time.elapsed());

    Ok(())
}

/// Resolve settings: defaults, then config files, then `TS_*` variables,
/// then command-line flags.
fn build_config(args: &Args) -> Result<SweepConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.debug);
    let env_config = load_env_config();

    // Step 1: config files
    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            tracing::debug!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };
    let config = file_config.apply_to(SweepConfig::default());

    // Step 2: environment variables (TS_*)
    let config = env_config.apply_to(config);

    // Step 3: CLI arguments (highest precedence)
    apply_cli_args_to_config(config, args)
}

/// Apply command-line flags on top of `config`. Flags that were not given
/// leave the existing value alone.
fn apply_cli_args_to_config(
    mut config: SweepConfig,
    args: &Args,
) -> Result<SweepConfig, Box<dyn std::error::Error>> {
    if let Some(timeout) = &args.timeout {
        let secs = parse_timeout_string(timeout)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout))?;
        config.whois_timeout = Duration::from_secs(secs);
    }

    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }

    if args.whois {
        config.method = LookupMethod::Whois;
    } else if args.ping {
        config.method = LookupMethod::Ping;
    }

    if args.taken {
        config.filter = DisplayFilter::TakenOnly;
    } else if args.available {
        config.filter = DisplayFilter::AvailableOnly;
    }

    if let Some(tlds) = &args.tlds {
        config = config.with_tlds(tlds.clone());
    }

    if let Some(path) = &args.tld_file {
        config.tld_file = Some(PathBuf::from(path));
    }

    if args.no_backup_tlds {
        config.backup_tlds = false;
    }

    Ok(config)
}
