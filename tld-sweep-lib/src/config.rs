//! Configuration file parsing and management.
//!
//! Settings come from TOML files and `TS_*` environment variables. Files are
//! discovered in the XDG config directory, the home directory and the
//! current directory, later ones overriding earlier ones.

use crate::error::SweepError;
use crate::types::{DisplayFilter, LookupMethod, SweepConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// WHOIS deadline (as string, e.g., "10s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Lookup method: "auto", "whois" or "ping"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Which verdicts to show: "all", "taken" or "available"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Candidates probed at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// TLD store location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tld_file: Option<String>,

    /// Keep a backup when refreshing the TLD store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_tlds: Option<bool>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were used
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, SweepError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SweepError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            SweepError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory, then the current
    /// directory. A file that fails to load is an error; absent files are
    /// skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, SweepError> {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            if self.verbose {
                tracing::debug!(path = %path.display(), "loaded config file");
            }
            merged_config = self.merge_configs(merged_config, config);
        }

        Ok(merged_config)
    }

    /// Look for a config file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./tld-sweep.toml", "./.tld-sweep.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Look for a config file in the home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".tld-sweep.toml", "tld-sweep.toml"]
            .iter()
            .map(|name| Path::new(&home).join(name))
            .find(|path| path.exists())
    }

    /// `$XDG_CONFIG_HOME/tld-sweep/config.toml`, or `~/.config/...`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("tld-sweep").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.method.is_some() {
                        lower_defaults.method = higher_defaults.method;
                    }
                    if higher_defaults.filter.is_some() {
                        lower_defaults.filter = higher_defaults.filter;
                    }
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    if higher_defaults.tld_file.is_some() {
                        lower_defaults.tld_file = higher_defaults.tld_file;
                    }
                    if higher_defaults.backup_tlds.is_some() {
                        lower_defaults.backup_tlds = higher_defaults.backup_tlds;
                    }
                    Some(lower_defaults)
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), SweepError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 16 {
                    return Err(SweepError::config("Concurrency must be between 1 and 16"));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(SweepError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(method) = &defaults.method {
                method.parse::<LookupMethod>()?;
            }

            if let Some(filter) = &defaults.filter {
                filter.parse::<DisplayFilter>()?;
            }
        }

        Ok(())
    }
}

impl FileConfig {
    /// Apply file defaults on top of `config`. Values were validated on load.
    pub fn apply_to(&self, mut config: SweepConfig) -> SweepConfig {
        let Some(defaults) = &self.defaults else {
            return config;
        };

        if let Some(secs) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            config.whois_timeout = Duration::from_secs(secs);
        }
        if let Some(method) = defaults.method.as_deref().and_then(|m| m.parse().ok()) {
            config.method = method;
        }
        if let Some(filter) = defaults.filter.as_deref().and_then(|f| f.parse().ok()) {
            config.filter = filter;
        }
        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(tld_file) = &defaults.tld_file {
            config.tld_file = Some(PathBuf::from(tld_file));
        }
        if let Some(backup) = defaults.backup_tlds {
            config.backup_tlds = backup;
        }

        config
    }
}

/// Configuration from `TS_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub timeout: Option<String>,
    pub method: Option<LookupMethod>,
    pub concurrency: Option<usize>,
    pub tld_file: Option<String>,
    pub backup_tlds: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply environment values on top of `config`.
    pub fn apply_to(&self, mut config: SweepConfig) -> SweepConfig {
        if let Some(secs) = self.timeout.as_deref().and_then(parse_timeout_string) {
            config.whois_timeout = Duration::from_secs(secs);
        }
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(tld_file) = &self.tld_file {
            config.tld_file = Some(PathBuf::from(tld_file));
        }
        if let Some(backup) = self.backup_tlds {
            config.backup_tlds = backup;
        }
        config
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load configuration from environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with an injectable variable source.
pub fn load_env_config_from<F>(get: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // TS_TIMEOUT - WHOIS deadline
    if let Some(timeout_str) = get("TS_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            env_config.timeout = Some(timeout_str);
        } else {
            tracing::warn!(
                value = %timeout_str,
                "invalid TS_TIMEOUT, use format like '5s', '30s', '2m'"
            );
        }
    }

    // TS_METHOD - auto / whois / ping
    if let Some(method) = get("TS_METHOD") {
        match method.parse::<LookupMethod>() {
            Ok(m) => env_config.method = Some(m),
            Err(e) => tracing::warn!(value = %method, error = %e, "invalid TS_METHOD"),
        }
    }

    // TS_CONCURRENCY - candidates in flight
    if let Some(val) = get("TS_CONCURRENCY") {
        match val.parse::<usize>() {
            Ok(concurrency) if (1..=16).contains(&concurrency) => {
                env_config.concurrency = Some(concurrency);
            }
            _ => tracing::warn!(value = %val, "invalid TS_CONCURRENCY, must be 1-16"),
        }
    }

    // TS_TLD_FILE - TLD store location
    if let Some(path) = get("TS_TLD_FILE") {
        if !path.trim().is_empty() {
            env_config.tld_file = Some(path);
        }
    }

    // TS_BACKUP_TLDS - keep a backup on refresh
    if let Some(val) = get("TS_BACKUP_TLDS") {
        match parse_bool(&val) {
            Some(b) => env_config.backup_tlds = Some(b),
            None => tracing::warn!(value = %val, "invalid TS_BACKUP_TLDS, use true/false"),
        }
    }

    // TS_CONFIG - explicit config file
    if let Some(path) = get("TS_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(path);
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number means seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (secs > 0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(5));
        assert_eq!(parse_timeout_string("30s"), Some(30));
        assert_eq!(parse_timeout_string("2m"), Some(120));
        assert_eq!(parse_timeout_string("10"), Some(10));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("999999999999999999m"), None);
    }

    #[test]
    fn test_overflowing_env_timeout_is_ignored() {
        let env_config = load_env_config_from(|k| {
            (k == "TS_TIMEOUT").then(|| "999999999999999999m".to_string())
        });
        assert_eq!(env_config.timeout, None);
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[defaults]
timeout = "20s"
method = "whois"
filter = "taken"
concurrency = 4
tld_file = "/tmp/tlds.txt"
backup_tlds = false
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(file.path()).unwrap();
        let sweep = config.apply_to(SweepConfig::default());

        assert_eq!(sweep.whois_timeout, Duration::from_secs(20));
        assert_eq!(sweep.method, LookupMethod::Whois);
        assert_eq!(sweep.filter, DisplayFilter::TakenOnly);
        assert_eq!(sweep.concurrency, 4);
        assert_eq!(sweep.tld_file, Some(PathBuf::from("/tmp/tlds.txt")));
        assert!(!sweep.backup_tlds);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let manager = ConfigManager::new(false);
        for body in [
            "[defaults]\nconcurrency = 0\n",
            "[defaults]\ntimeout = \"soon\"\n",
            "[defaults]\nmethod = \"dig\"\n",
            "[defaults]\nfilter = \"some\"\n",
            "not toml at all = = =",
        ] {
            let file = write_config(body);
            assert!(manager.load_file(file.path()).is_err(), "accepted: {}", body);
        }
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let manager = ConfigManager::new(false);
        let err = manager.load_file("/nonexistent/tld-sweep.toml").unwrap_err();
        assert!(matches!(err, SweepError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("5s".to_string()),
                method: Some("ping".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("15s".to_string()),
                backup_tlds: Some(false),
                ..Default::default()
            }),
        };

        let defaults = manager.merge_configs(lower, higher).defaults.unwrap();
        assert_eq!(defaults.timeout, Some("15s".to_string())); // Higher wins
        assert_eq!(defaults.method, Some("ping".to_string())); // Lower preserved
        assert_eq!(defaults.backup_tlds, Some(false));
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("TS_TIMEOUT", "3s"),
            ("TS_METHOD", "ping"),
            ("TS_CONCURRENCY", "99"),
            ("TS_BACKUP_TLDS", "no"),
            ("TS_TLD_FILE", "  "),
        ]
        .into_iter()
        .collect();

        let env_config = load_env_config_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env_config.timeout, Some("3s".to_string()));
        assert_eq!(env_config.method, Some(LookupMethod::Ping));
        assert_eq!(env_config.concurrency, None);
        assert_eq!(env_config.backup_tlds, Some(false));
        assert_eq!(env_config.tld_file, None);

        let sweep = env_config.apply_to(SweepConfig::default());
        assert_eq!(sweep.whois_timeout, Duration::from_secs(3));
        assert_eq!(sweep.method, LookupMethod::Ping);
        assert!(!sweep.backup_tlds);
    }

    #[test]
    fn test_env_overrides_file() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("20s".to_string()),
                method: Some("whois".to_string()),
                ..Default::default()
            }),
        };
        let env_config = EnvConfig {
            method: Some(LookupMethod::Ping),
            ..Default::default()
        };

        let sweep = env_config.apply_to(file_config.apply_to(SweepConfig::default()));
        assert_eq!(sweep.whois_timeout, Duration::from_secs(20));
        assert_eq!(sweep.method, LookupMethod::Ping);
    }
}
