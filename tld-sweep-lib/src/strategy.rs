//! Lookup strategy selection.
//!
//! Decided once per run, before any candidate is probed:
//!
//! | requested | whois | ping | result                       |
//! |-----------|-------|------|------------------------------|
//! | Whois     | no    | -    | error: requested tool missing |
//! | Whois     | yes   | -    | Whois                        |
//! | Ping      | -     | no   | error: requested tool missing |
//! | Ping      | -     | yes  | Ping                         |
//! | Auto      | yes   | -    | Whois                        |
//! | Auto      | no    | yes  | Ping, with a warning         |
//! | Auto      | no    | no   | error: no tool at all        |

use std::path::PathBuf;

use crate::error::SweepError;
use crate::types::{CheckMethod, LookupMethod};
use crate::utils::find_executable;

/// Which lookup tools this host has, by absolute path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolAvailability {
    pub whois: Option<PathBuf>,
    pub ping: Option<PathBuf>,
}

impl ToolAvailability {
    /// Scan `PATH` for `whois` and `ping`.
    pub fn detect() -> Self {
        let tools = Self {
            whois: find_executable("whois"),
            ping: find_executable("ping"),
        };
        tracing::debug!(whois = ?tools.whois, ping = ?tools.ping, "detected lookup tools");
        tools
    }
}

/// The mechanism a run will use, with the binary that implements it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Whois(PathBuf),
    Ping(PathBuf),
}

impl Strategy {
    pub fn method(&self) -> CheckMethod {
        match self {
            Strategy::Whois(_) => CheckMethod::Whois,
            Strategy::Ping(_) => CheckMethod::Ping,
        }
    }
}

/// Resolve the requested method against the available tools.
///
/// # Errors
///
/// `ToolMissing` when an explicitly requested tool is absent,
/// `NoLookupTool` when `Auto` finds neither.
pub fn select_strategy(
    requested: LookupMethod,
    tools: &ToolAvailability,
) -> Result<Strategy, SweepError> {
    match requested {
        LookupMethod::Whois => tools
            .whois
            .clone()
            .map(Strategy::Whois)
            .ok_or_else(|| SweepError::tool_missing("whois")),
        LookupMethod::Ping => tools
            .ping
            .clone()
            .map(Strategy::Ping)
            .ok_or_else(|| SweepError::tool_missing("ping")),
        LookupMethod::Auto => match (&tools.whois, &tools.ping) {
            (Some(whois), _) => Ok(Strategy::Whois(whois.clone())),
            (None, Some(ping)) => {
                tracing::warn!(
                    "whois is not installed; falling back to ping, results are only a guess"
                );
                Ok(Strategy::Ping(ping.clone()))
            }
            (None, None) => Err(SweepError::NoLookupTool),
        },
    }
}
