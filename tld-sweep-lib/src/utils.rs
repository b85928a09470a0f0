//! Helpers shared by the sweep stages.
//!
//! Candidate construction and executable discovery live here.

use std::env;
use std::path::{Path, PathBuf};

use crate::types::Candidate;

/// Combine a base name with every TLD.
///
/// One candidate per TLD, in TLD order. Duplicates are kept and neither
/// the name nor the TLDs are validated; whatever the user typed is what
/// gets probed.
///
/// # Example
///
/// ```rust
/// use tld_sweep_lib::build_candidates;
///
/// let tlds = vec!["com".to_string(), "co.uk".to_string()];
/// let candidates = build_candidates("example", &tlds);
/// assert_eq!(candidates[1].fqdn(), "example.co.uk");
/// ```
pub fn build_candidates(name: &str, tlds: &[String]) -> Vec<Candidate> {
    let candidates: Vec<Candidate> = tlds.iter().map(|tld| Candidate::new(name, tld)).collect();
    tracing::debug!(name, count = candidates.len(), "built candidates");
    candidates
}

/// Locate an executable on `PATH`.
///
/// Returns the absolute path so callers run the real binary rather than
/// whatever a shell alias or function of the same name would do.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
