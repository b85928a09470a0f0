//! Result filtering and plain-text rendering.
//!
//! The display filter is a pure post-filter over finished results; it never
//! influences how a candidate is probed.

use std::time::Duration;

use crate::types::{CheckResult, DisplayFilter, Verdict};

impl DisplayFilter {
    /// Whether a verdict is shown under this filter.
    ///
    /// `AvailableOnly` hides taken, likely-taken and timed-out names;
    /// `TakenOnly` hides available and likely-available ones. Timeouts stay
    /// visible under `TakenOnly` because the name might be registered.
    pub fn allows_verdict(&self, verdict: &Verdict) -> bool {
        match self {
            DisplayFilter::All => true,
            DisplayFilter::TakenOnly => !verdict.is_available(),
            DisplayFilter::AvailableOnly => verdict.is_available(),
        }
    }

    /// Whether a result is shown. Failed probes are treated like timeouts.
    pub fn allows(&self, result: &CheckResult) -> bool {
        match &result.verdict {
            Some(verdict) => self.allows_verdict(verdict),
            None => self.allows_verdict(&Verdict::Timeout),
        }
    }

    /// Keep the results this filter shows, in order.
    pub fn apply<'a>(&self, results: &'a [CheckResult]) -> Vec<&'a CheckResult> {
        results.iter().filter(|r| self.allows(r)).collect()
    }
}

/// Label for a result: the verdict label, or `ERROR` for a failed probe.
pub fn result_label(result: &CheckResult) -> &'static str {
    result
        .verdict
        .as_ref()
        .map(Verdict::label)
        .unwrap_or("ERROR")
}

/// Human-readable detail shown after the domain, if any.
pub fn result_detail(result: &CheckResult, whois_timeout: Duration) -> Option<String> {
    match &result.verdict {
        Some(Verdict::Taken { expiry: Some(date) }) => Some(format!("expires {}", date)),
        Some(Verdict::Taken { expiry: None }) => Some("no expiry date found".to_string()),
        Some(Verdict::Timeout) => Some(format!(
            "whois did not answer within {}s",
            whois_timeout.as_secs()
        )),
        Some(_) => None,
        None => result.error_message.clone(),
    }
}

/// One uncolored output line, e.g. `[TAKEN] a.org  expires 2025-03-01`.
pub fn format_line(result: &CheckResult, whois_timeout: Duration) -> String {
    let head = format!("[{}] {}", result_label(result), result.domain);
    match result_detail(result, whois_timeout) {
        Some(detail) => format!("{}  {}", head, detail),
        None => head,
    }
}

/// Counts per outcome for the closing summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub taken: usize,
    pub available: usize,
    pub timeouts: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result);
        }
        summary
    }

    pub fn record(&mut self, result: &CheckResult) {
        match &result.verdict {
            Some(v) if v.is_taken() => self.taken += 1,
            Some(v) if v.is_available() => self.available += 1,
            Some(_) => self.timeouts += 1,
            None => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.taken + self.available + self.timeouts + self.errors
    }
}
