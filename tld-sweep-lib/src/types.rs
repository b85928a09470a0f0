//! Core data types for TLD sweeps.
//!
//! This module defines the candidates being probed, the verdicts produced
//! for them, the user-facing method and filter choices, and the run
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SweepError;

/// A fully-qualified name to probe, `name.tld`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The base name as given by the user
    pub name: String,
    /// The TLD token appended to it
    pub tld: String,
}

impl Candidate {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, tld: T) -> Self {
        Self {
            name: name.into(),
            tld: tld.into(),
        }
    }

    /// The domain as passed to `whois` / `ping`.
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.name, self.tld)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.tld)
    }
}

/// Expiry date normalized to `YYYY-MM-DD`.
///
/// Derived from registry text, so it is informative rather than
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDate(String);

impl NormalizedDate {
    /// Build from already-split components.
    pub fn from_parts(year: &str, month: &str, day: &str) -> Self {
        Self(format!("{}-{}-{}", year, month, day))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Registry reports the name as free (or shows no registration evidence)
    Available,

    /// Registry shows registration evidence
    Taken {
        #[serde(skip_serializing_if = "Option::is_none")]
        expiry: Option<NormalizedDate>,
    },

    /// WHOIS did not answer before the deadline
    Timeout,

    /// Host answered an echo request
    LikelyTaken,

    /// Host did not answer an echo request
    LikelyAvailable,
}

impl Verdict {
    /// True for verdicts a "taken only" view keeps.
    pub fn is_taken(&self) -> bool {
        matches!(self, Verdict::Taken { .. } | Verdict::LikelyTaken)
    }

    /// True for verdicts an "available only" view keeps.
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available | Verdict::LikelyAvailable)
    }

    /// Short upper-case label used in text output.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Available => "AVAILABLE",
            Verdict::Taken { .. } => "TAKEN",
            Verdict::Timeout => "TIMEOUT",
            Verdict::LikelyTaken => "LIKELY TAKEN",
            Verdict::LikelyAvailable => "LIKELY AVAILABLE",
        }
    }
}

/// Lookup method requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMethod {
    /// WHOIS if installed, otherwise ping
    #[default]
    Auto,
    /// WHOIS only
    Whois,
    /// Ping only
    Ping,
}

impl FromStr for LookupMethod {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "whois" => Ok(Self::Whois),
            "ping" => Ok(Self::Ping),
            other => Err(SweepError::config(format!(
                "Unknown lookup method '{}', use auto, whois or ping",
                other
            ))),
        }
    }
}

/// Mechanism actually used for a run, after selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckMethod {
    #[serde(rename = "whois")]
    Whois,
    #[serde(rename = "ping")]
    Ping,
}

impl fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMethod::Whois => write!(f, "WHOIS"),
            CheckMethod::Ping => write!(f, "ping"),
        }
    }
}

/// Which verdicts to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFilter {
    #[default]
    All,
    #[serde(rename = "taken")]
    TakenOnly,
    #[serde(rename = "available")]
    AvailableOnly,
}

impl FromStr for DisplayFilter {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "taken" => Ok(Self::TakenOnly),
            "available" => Ok(Self::AvailableOnly),
            other => Err(SweepError::config(format!(
                "Unknown filter '{}', use all, taken or available",
                other
            ))),
        }
    }
}

/// Result of checking one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// The domain that was checked (e.g., "example.com")
    pub domain: String,

    /// Verdict, or `None` when the probe itself could not be run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,

    /// Which mechanism produced the verdict
    pub method_used: CheckMethod,

    /// How long the probe took
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// Why the probe could not be run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Settings for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Hard deadline for one WHOIS query
    /// Default: 10 seconds
    pub whois_timeout: Duration,

    /// Granularity at which a timed-out query is guaranteed to be abandoned
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Echo request timeout for the ping fallback
    /// Default: 2 seconds
    pub ping_timeout: Duration,

    /// Candidates probed at once. 1 keeps the sweep strictly sequential.
    /// Default: 1, Range: 1-16
    pub concurrency: usize,

    /// Requested lookup method
    pub method: LookupMethod,

    /// Which verdicts the reporter keeps
    pub filter: DisplayFilter,

    /// Explicit TLD list; `None` means read the TLD store
    pub tlds: Option<Vec<String>>,

    /// TLD store location; `None` means the default data directory
    pub tld_file: Option<PathBuf>,

    /// Keep a `.bak` copy of the store when refreshing it
    pub backup_tlds: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            whois_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(2),
            concurrency: 1,
            method: LookupMethod::Auto,
            filter: DisplayFilter::All,
            tlds: None,
            tld_file: None,
            backup_tlds: true,
        }
    }
}

impl SweepConfig {
    /// Set the WHOIS deadline.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set concurrency, capped at 16 to stay polite to registries.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 16);
        self
    }

    pub fn with_method(mut self, method: LookupMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_filter(mut self, filter: DisplayFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Use an explicit TLD list instead of the store.
    pub fn with_tlds(mut self, tlds: Vec<String>) -> Self {
        self.tlds = Some(tlds);
        self
    }

    pub fn with_tld_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.tld_file = Some(path.into());
        self
    }

    pub fn with_backup(mut self, enabled: bool) -> Self {
        self.backup_tlds = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_fqdn() {
        let c = Candidate::new("example", "co.uk");
        assert_eq!(c.fqdn(), "example.co.uk");
        assert_eq!(c.to_string(), "example.co.uk");
    }

    #[test]
    fn test_verdict_groups() {
        assert!(Verdict::Taken { expiry: None }.is_taken());
        assert!(Verdict::LikelyTaken.is_taken());
        assert!(Verdict::Available.is_available());
        assert!(Verdict::LikelyAvailable.is_available());
        assert!(!Verdict::Timeout.is_taken());
        assert!(!Verdict::Timeout.is_available());
    }

    #[test]
    fn test_verdict_json_shape() {
        let v = Verdict::Taken {
            expiry: Some(NormalizedDate::from_parts("2025", "03", "01")),
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"status":"taken","expiry":"2025-03-01"}"#);

        let json = serde_json::to_string(&Verdict::LikelyAvailable).unwrap();
        assert_eq!(json, r#"{"status":"likely_available"}"#);
    }

    #[test]
    fn test_method_and_filter_parsing() {
        assert_eq!("WHOIS".parse::<LookupMethod>().unwrap(), LookupMethod::Whois);
        assert_eq!(" ping ".parse::<LookupMethod>().unwrap(), LookupMethod::Ping);
        assert!("dig".parse::<LookupMethod>().is_err());

        assert_eq!(
            "taken".parse::<DisplayFilter>().unwrap(),
            DisplayFilter::TakenOnly
        );
        assert_eq!(
            "Available".parse::<DisplayFilter>().unwrap(),
            DisplayFilter::AvailableOnly
        );
        assert!("some".parse::<DisplayFilter>().is_err());
    }

    #[test]
    fn test_config_defaults_and_builders() {
        let config = SweepConfig::default();
        assert_eq!(config.whois_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.ping_timeout, Duration::from_secs(2));
        assert_eq!(config.concurrency, 1);
        assert!(config.backup_tlds);

        let config = SweepConfig::default()
            .with_concurrency(500)
            .with_method(LookupMethod::Ping)
            .with_tlds(vec!["com".to_string()]);
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.method, LookupMethod::Ping);
        assert_eq!(config.tlds, Some(vec!["com".to_string()]));

        let config = SweepConfig::default()
            .with_whois_timeout(Duration::from_secs(3))
            .with_filter(DisplayFilter::TakenOnly)
            .with_tld_file("/tmp/tlds.txt")
            .with_backup(false)
            .with_concurrency(0);
        assert_eq!(config.whois_timeout, Duration::from_secs(3));
        assert_eq!(config.filter, DisplayFilter::TakenOnly);
        assert_eq!(config.tld_file, Some(PathBuf::from("/tmp/tlds.txt")));
        assert!(!config.backup_tlds);
        assert_eq!(config.concurrency, 1);
    }
}
