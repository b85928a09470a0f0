//! Terminal display for tld-sweep.
//!
//! Colored result lines, the run header and the closing summary. Uses only
//! the `console` crate; colors switch off by themselves when stdout is not
//! a terminal.

use console::{pad_str, style, Alignment, StyledObject};
use std::time::Duration;
use tld_sweep_lib::{result_detail, result_label, CheckMethod, CheckResult, Summary, Verdict};

/// Width of the `[LABEL]` column; the longest labels overflow it.
const LABEL_WIDTH: usize = 12;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a dimmed header naming the sweep.
pub fn print_header(name: &str, tld_count: usize, method: CheckMethod, concurrency: usize) {
    println!(
        "{} {} {}",
        style("tld-sweep").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "| {} across {} TLD{} via {}",
            name,
            tld_count,
            if tld_count == 1 { "" } else { "s" },
            method
        ))
        .dim(),
    );
    if concurrency > 1 {
        println!("{}", style(format!("Concurrency: {}", concurrency)).dim());
    }
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

fn styled_label(result: &CheckResult) -> StyledObject<String> {
    let label = format!("[{}]", result_label(result));
    let padded = pad_str(&label, LABEL_WIDTH, Alignment::Left, None).into_owned();

    match &result.verdict {
        Some(Verdict::Available) => style(padded).green().bold(),
        Some(Verdict::LikelyAvailable) => style(padded).green(),
        Some(Verdict::Taken { .. }) => style(padded).red().bold(),
        Some(Verdict::LikelyTaken) => style(padded).red(),
        Some(Verdict::Timeout) | None => style(padded).yellow(),
    }
}

/// Render one result line, e.g. `[TAKEN]     a.org  expires 2025-03-01`.
pub fn render_result(result: &CheckResult, whois_timeout: Duration) -> String {
    let head = format!("{} {}", styled_label(result), result.domain);
    match result_detail(result, whois_timeout) {
        Some(detail) => format!("{}  {}", head, style(detail).dim()),
        None => head,
    }
}

pub fn print_result(result: &CheckResult, whois_timeout: Duration) {
    println!("{}", render_result(result, whois_timeout));
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Closing summary text. Counts cover every checked candidate, shown or not.
pub fn render_summary(summary: &Summary, duration: Duration) -> String {
    let total = summary.total();
    format!(
        "{} candidate{} in {:.1}s  {}  {}  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!("{} timed out", summary.timeouts)).yellow(),
        style("|").dim(),
        style(format!("{} failed", summary.errors)).yellow(),
    )
}

pub fn print_summary(summary: &Summary, duration: Duration) {
    println!();
    println!("{}", render_summary(summary, duration));
}

// ── Tests ────────────────────────────────────────────────────────────────────
