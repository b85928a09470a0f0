//! # TLD Sweep Library
//!
//! Checks one name against many top-level domains and reports which
//! combinations are registered.
//!
//! Each candidate (`name.tld`) is looked up with the system `whois` client
//! under a hard deadline and the free-form registry answer is classified by
//! an ordered rule table. Hosts without a whois client fall back to a
//! single ping, which can only guess.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tld_sweep_lib::{build_candidates, DomainChecker, SweepConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::from_environment(SweepConfig::default())?;
//!     let tlds = vec!["com".to_string(), "org".to_string()];
//!
//!     for result in checker.check_all(&build_candidates("example", &tlds)).await {
//!         println!("{}: {:?}", result.domain, result.verdict);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bounded WHOIS**: every query is killed at its deadline
//! - **Rule-based classifier**: extendable patterns and date formats
//! - **Ping fallback**: best-effort verdicts when whois is absent
//! - **TLD store**: refreshable copy of the IANA TLD list

// Re-export main public API types and functions
pub use checker::DomainChecker;
pub use classifier::{
    classify, extract_expiry, ClassificationRule, DateFormat, DateNormalizer, RegistryClassifier,
    RuleOutcome,
};
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig,
};
pub use error::SweepError;
pub use report::{format_line, result_detail, result_label, Summary};
pub use strategy::{select_strategy, Strategy, ToolAvailability};
pub use tlds::{
    default_tld_store_path, parse_tld_store, read_tld_store, resolve_tlds, update_tld_store,
    write_tld_store, IANA_TLD_LIST_URL,
};
pub use types::{
    Candidate, CheckMethod, CheckResult, DisplayFilter, LookupMethod, NormalizedDate, SweepConfig,
    Verdict,
};
pub use utils::{build_candidates, find_executable};

// Public modules
pub mod protocols;

// Internal modules
mod checker;
mod classifier;
mod config;
mod error;
mod report;
mod strategy;
mod tlds;
mod types;
mod utils;

pub type Result<T> = std::result::Result<T, SweepError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
