//! Error handling for TLD sweeps.
//!
//! One error type covers every failure class. Configuration-class errors
//! abort a run before any probing starts; execution-class errors are
//! contained to the candidate they happened on.

use std::fmt;
use std::time::Duration;

/// Main error type for sweep operations.
#[derive(Debug, Clone)]
pub enum SweepError {
    /// Invalid settings, conflicting options or a bad config file
    ConfigError { message: String },

    /// TLD store or config file could not be read or written
    FileError { path: String, message: String },

    /// A lookup tool was explicitly requested but is not installed
    ToolMissing { tool: String },

    /// Neither `whois` nor `ping` is installed
    NoLookupTool,

    /// The `whois` process could not be run
    WhoisError { domain: String, message: String },

    /// The `ping` process could not be run
    PingError { domain: String, message: String },

    /// Operation exceeded its deadline
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Network failure while refreshing the TLD store
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Anything that does not fit the categories above
    Internal { message: String },
}

impl SweepError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new missing-tool error.
    pub fn tool_missing<T: Into<String>>(tool: T) -> Self {
        Self::ToolMissing { tool: tool.into() }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new ping error.
    pub fn ping<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::PingError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// Per-candidate failures (process spawn problems, timeouts) are
    /// reported on their own line and the sweep moves on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::WhoisError { .. } | Self::PingError { .. } | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ToolMissing { tool } => {
                write!(
                    f,
                    "'{}' was requested but is not installed or not on PATH",
                    tool
                )
            }
            Self::NoLookupTool => {
                write!(
                    f,
                    "Neither 'whois' nor 'ping' is installed; cannot check any domain"
                )
            }
            Self::WhoisError { domain, message } => {
                write!(f, "WHOIS error for '{}': {}", domain, message)
            }
            Self::PingError { domain, message } => {
                write!(f, "Ping error for '{}': {}", domain, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for SweepError {}

impl From<reqwest::Error> for SweepError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("TLD list download", Duration::from_secs(10))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<std::io::Error> for SweepError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<regex::Error> for SweepError {
    fn from(err: regex::Error) -> Self {
        Self::ConfigError {
            message: format!("Invalid classification pattern: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(SweepError::config("bad").is_fatal());
        assert!(SweepError::NoLookupTool.is_fatal());
        assert!(SweepError::tool_missing("whois").is_fatal());
        assert!(SweepError::file_error("/tmp/tlds.txt", "missing").is_fatal());

        assert!(!SweepError::whois("a.com", "spawn failed").is_fatal());
        assert!(!SweepError::ping("a.com", "spawn failed").is_fatal());
        assert!(!SweepError::timeout("whois", Duration::from_secs(10)).is_fatal());
        assert!(SweepError::internal("bad state").is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = SweepError::tool_missing("whois");
        assert!(err.to_string().contains("'whois' was requested"));

        let err = SweepError::file_error("/tmp/tlds.txt", "not found");
        assert_eq!(err.to_string(), "File error at '/tmp/tlds.txt': not found");

        let err = SweepError::internal("bad state");
        assert_eq!(err.to_string(), "Internal error: bad state");

        let err = SweepError::network_with_source("HTTP request failed", "reset");
        assert_eq!(
            err.to_string(),
            "Network error: HTTP request failed (source: reset)"
        );
    }

    #[test]
    fn test_regex_error_is_config_error() {
        let err: SweepError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, SweepError::ConfigError { .. }));
    }
}
