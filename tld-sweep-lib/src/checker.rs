//! Sweep driver.
//!
//! `DomainChecker` owns the strategy chosen for the run and turns each
//! candidate into a [`CheckResult`]. Candidates are independent: a timeout
//! or a failed probe only affects its own result.

use std::pin::Pin;
use std::time::Instant;

use futures_util::stream::{self, Stream, StreamExt};

use crate::classifier::RegistryClassifier;
use crate::error::SweepError;
use crate::protocols::{PingProbe, QueryOutcome, WhoisClient};
use crate::strategy::{select_strategy, Strategy, ToolAvailability};
use crate::types::{Candidate, CheckMethod, CheckResult, SweepConfig, Verdict};

#[derive(Debug, Clone)]
enum Prober {
    Whois(WhoisClient),
    Ping(PingProbe),
}

/// Checks candidates with the strategy resolved for this run.
///
/// # Example
///
/// ```rust,no_run
/// use tld_sweep_lib::{build_candidates, DomainChecker, SweepConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::from_environment(SweepConfig::default())?;
///     let tlds = vec!["com".to_string(), "org".to_string()];
///     for result in checker.check_all(&build_candidates("example", &tlds)).await {
///         println!("{}: {:?}", result.domain, result.verdict);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DomainChecker {
    config: SweepConfig,
    prober: Prober,
    classifier: RegistryClassifier,
}

impl DomainChecker {
    /// Create a checker for an already-selected strategy.
    pub fn new(config: SweepConfig, strategy: Strategy) -> Self {
        let prober = match strategy {
            Strategy::Whois(path) => Prober::Whois(
                WhoisClient::new(path)
                    .with_timeout(config.whois_timeout)
                    .with_poll_interval(config.poll_interval),
            ),
            Strategy::Ping(path) => {
                Prober::Ping(PingProbe::new(path).with_timeout(config.ping_timeout))
            }
        };

        Self {
            config,
            prober,
            classifier: RegistryClassifier::default(),
        }
    }

    /// Detect installed tools and select the strategy for `config.method`.
    ///
    /// # Errors
    ///
    /// Fails when the requested tool (or, for `Auto`, any tool) is missing.
    pub fn from_environment(config: SweepConfig) -> Result<Self, SweepError> {
        let strategy = select_strategy(config.method, &ToolAvailability::detect())?;
        Ok(Self::new(config, strategy))
    }

    /// Replace the classification rules.
    pub fn with_classifier(mut self, classifier: RegistryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn method(&self) -> CheckMethod {
        match self.prober {
            Prober::Whois(_) => CheckMethod::Whois,
            Prober::Ping(_) => CheckMethod::Ping,
        }
    }

    /// Probe one candidate.
    ///
    /// Never fails: a probe that cannot run yields a result with no verdict
    /// and an error message, and the sweep continues.
    pub async fn check_candidate(&self, candidate: &Candidate) -> CheckResult {
        let domain = candidate.fqdn();
        let started = Instant::now();

        let verdict = match &self.prober {
            Prober::Whois(client) => client.query(&domain).await.map(|outcome| match outcome {
                QueryOutcome::Completed(text) => self.classifier.classify(&text),
                QueryOutcome::TimedOut => Verdict::Timeout,
            }),
            Prober::Ping(probe) => probe.probe(&domain).await,
        };

        let check_duration = Some(started.elapsed());

        match verdict {
            Ok(verdict) => {
                tracing::debug!(domain = %domain, verdict = verdict.label(), "checked");
                CheckResult {
                    domain,
                    verdict: Some(verdict),
                    method_used: self.method(),
                    check_duration,
                    error_message: None,
                }
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "probe failed");
                CheckResult {
                    domain,
                    verdict: None,
                    method_used: self.method(),
                    check_duration,
                    error_message: Some(e.to_string()),
                }
            }
        }
    }

    /// Check candidates one after another, in order.
    pub async fn check_all(&self, candidates: &[Candidate]) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            results.push(self.check_candidate(candidate).await);
        }
        results
    }

    /// Check candidates and yield results in input order as they finish.
    ///
    /// With the default concurrency of 1 this is strictly sequential; higher
    /// values keep up to that many queries in flight.
    pub fn check_stream(
        &self,
        candidates: &[Candidate],
    ) -> Pin<Box<dyn Stream<Item = CheckResult> + Send + '_>> {
        let candidates = candidates.to_vec();
        let stream = stream::iter(candidates)
            .map(move |candidate| async move { self.check_candidate(&candidate).await })
            .buffered(self.config.concurrency.max(1));

        Box::pin(stream)
    }
}
