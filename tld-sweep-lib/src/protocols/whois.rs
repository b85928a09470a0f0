//! Bounded WHOIS queries.
//!
//! Registry servers for some TLDs accept a connection and never answer, so
//! every query runs the system `whois` binary as a child process under a
//! hard deadline. A query that misses the deadline is killed, its partial
//! output thrown away, and reported as [`QueryOutcome::TimedOut`].

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::SweepError;

/// Result of one bounded query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The process exited; its standard output
    Completed(String),
    /// The deadline passed first
    TimedOut,
}

/// Runs `whois <domain>` with a deadline.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Absolute path of the whois binary
    program: PathBuf,
    /// Arguments placed before the domain
    args: Vec<String>,
    /// Deadline for a single query
    timeout: Duration,
    /// Upper bound on how long a killed query may take to be reaped
    poll_interval: Duration,
}

impl WhoisClient {
    /// Create a client for the given binary with the default 10s deadline.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Extra arguments passed ahead of the domain (e.g. `-h server`).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query the registry for `domain`.
    ///
    /// Standard error is discarded and the exit status is ignored: many
    /// whois clients exit non-zero for "no match" answers that are still
    /// worth classifying.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::WhoisError` if the process cannot be started or
    /// its output cannot be read. A timeout is not an error.
    pub async fn query(&self, domain: &str) -> Result<QueryOutcome, SweepError> {
        let started = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(domain)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SweepError::whois(
                    domain,
                    format!(
                        "Failed to execute {}: {}",
                        self.program.display(),
                        e
                    ),
                )
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SweepError::whois(domain, "whois stdout was not captured"))?;

        let run = async {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await?;
            child.wait().await?;
            Ok::<_, std::io::Error>(buf)
        };

        let result = tokio::time::timeout(self.timeout, run).await;

        match result {
            Ok(Ok(buf)) => {
                tracing::debug!(
                    domain,
                    bytes = buf.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "whois completed"
                );
                Ok(QueryOutcome::Completed(
                    String::from_utf8_lossy(&buf).into_owned(),
                ))
            }
            Ok(Err(e)) => Err(SweepError::whois(
                domain,
                format!("Failed to read whois output: {}", e),
            )),
            Err(_) => {
                // Reaping is bounded too, so the caller never waits past
                // timeout + poll_interval.
                if tokio::time::timeout(self.poll_interval, child.kill())
                    .await
                    .is_err()
                {
                    tracing::warn!(domain, "whois process did not exit after kill");
                }
                tracing::debug!(domain, timeout = ?self.timeout, "whois timed out");
                Ok(QueryOutcome::TimedOut)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> WhoisClient {
        // The domain ends up as $0 of the script.
        WhoisClient::new("sh").with_args(["-c", script])
    }

    #[tokio::test]
    async fn test_completed_query_returns_stdout() {
        let client = shell(r#"printf 'Domain Name: %s\n' "$0""#);
        let outcome = client.query("a.org").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Completed("Domain Name: a.org\n".to_string()));
    }

    #[tokio::test]
    async fn test_stderr_and_exit_status_are_ignored() {
        let client = shell("echo noise >&2; echo 'No match'; exit 1");
        let outcome = client.query("a.com").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Completed("No match\n".to_string()));
    }

    #[tokio::test]
    async fn test_hanging_query_times_out_within_bound() {
        let client = shell("sleep 30")
            .with_timeout(Duration::from_millis(300))
            .with_poll_interval(Duration::from_millis(500));

        let started = Instant::now();
        let outcome = client.query("slow.example").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome, QueryOutcome::TimedOut);
        assert!(
            elapsed < Duration::from_millis(300 + 500 + 200),
            "query blocked for {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_partial_output_is_discarded_on_timeout() {
        let client = shell("echo 'Domain Name: partial'; sleep 30")
            .with_timeout(Duration::from_millis(300));
        assert_eq!(
            client.query("partial.example").await.unwrap(),
            QueryOutcome::TimedOut
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_whois_error() {
        let client = WhoisClient::new("/nonexistent/bin/whois");
        let err = client.query("a.com").await.unwrap_err();
        assert!(matches!(err, SweepError::WhoisError { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_client_defaults() {
        let client = WhoisClient::new("whois");
        assert_eq!(client.timeout(), Duration::from_secs(10));
        assert_eq!(client.poll_interval, Duration::from_secs(1));

        let client = client.with_timeout(Duration::from_secs(3));
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }
}
