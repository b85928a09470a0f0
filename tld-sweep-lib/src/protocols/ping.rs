//! Reachability fallback.
//!
//! When no whois client is installed the only signal left is whether the
//! name resolves to a host that answers an echo request. A reply means the
//! domain is almost certainly registered; silence proves nothing, so both
//! outcomes are reported as "likely".

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::SweepError;
use crate::types::Verdict;

/// Sends a single echo request per domain.
#[derive(Debug, Clone)]
pub struct PingProbe {
    /// Absolute path of the ping binary
    program: PathBuf,
    /// Per-request wait, passed to ping itself
    timeout: Duration,
}

impl PingProbe {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(2),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for one echo request with a reply deadline.
    fn args(&self, domain: &str) -> Vec<String> {
        let secs = self.timeout.as_secs().max(1).to_string();
        // BSD ping uses -W in milliseconds; -t is its overall deadline.
        let deadline_flag = if cfg!(any(
            target_os = "macos",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd"
        )) {
            "-t"
        } else {
            "-W"
        };
        vec![
            "-c".to_string(),
            "1".to_string(),
            deadline_flag.to_string(),
            secs,
            domain.to_string(),
        ]
    }

    /// Probe `domain`.
    ///
    /// Exit success is [`Verdict::LikelyTaken`], anything else
    /// [`Verdict::LikelyAvailable`]. A ping that outlives its own deadline
    /// by more than a second is killed and counted as no reply.
    pub async fn probe(&self, domain: &str) -> Result<Verdict, SweepError> {
        let mut child = Command::new(&self.program)
            .args(self.args(domain))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SweepError::ping(
                    domain,
                    format!("Failed to execute {}: {}", self.program.display(), e),
                )
            })?;

        let guard = self.timeout + Duration::from_secs(1);
        let result = tokio::time::timeout(guard, child.wait()).await;

        let verdict = match result {
            Ok(Ok(status)) if status.success() => Verdict::LikelyTaken,
            Ok(Ok(_)) => Verdict::LikelyAvailable,
            Ok(Err(e)) => {
                return Err(SweepError::ping(
                    domain,
                    format!("Failed to wait for ping: {}", e),
                ))
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(domain, error = %e, "ping process could not be killed");
                }
                Verdict::LikelyAvailable
            }
        };

        tracing::debug!(domain, verdict = verdict.label(), "ping finished");
        Ok(verdict)
    }
}
