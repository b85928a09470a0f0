//! Probe mechanisms.
//!
//! A run uses exactly one of them: the bounded WHOIS query when a whois
//! client is installed, or the ping reachability fallback.

/// WHOIS queries under a hard deadline
pub mod whois;

/// Echo-request fallback
pub mod ping;

pub use ping::PingProbe;
pub use whois::{QueryOutcome, WhoisClient};
