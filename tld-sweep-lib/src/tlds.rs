//! TLD source and TLD store maintenance.
//!
//! The TLD store is the IANA `tlds-alpha-by-domain.txt` file kept on disk:
//! a comment header line followed by one TLD per line. A run either uses
//! the TLDs the user listed or reads the whole store.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SweepError;

/// Authoritative list of delegated TLDs.
pub const IANA_TLD_LIST_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";

/// Default store location: `$XDG_DATA_HOME/tld-sweep/tlds.txt`, falling back
/// to `~/.local/share/tld-sweep/tlds.txt`.
pub fn default_tld_store_path() -> Option<PathBuf> {
    let data_dir = env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".local/share")))?;

    Some(data_dir.join("tld-sweep").join("tlds.txt"))
}

/// Parse store contents: drop the header line, keep every non-empty line.
pub fn parse_tld_store(content: &str) -> Vec<String> {
    content
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Read and parse the store file.
///
/// # Errors
///
/// A missing or unreadable store is a `FileError`; callers treat it as a
/// fatal configuration problem.
pub fn read_tld_store(path: &Path) -> Result<Vec<String>, SweepError> {
    if !path.exists() {
        return Err(SweepError::file_error(
            path.to_string_lossy(),
            "TLD list not found; run with --update to download it",
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SweepError::file_error(
            path.to_string_lossy(),
            format!("Failed to read TLD list: {}", e),
        )
    })?;

    Ok(parse_tld_store(&content))
}

/// Produce the TLDs for a run.
///
/// An explicit list is returned verbatim, in order, without validation.
/// Otherwise the store at `store` is read.
pub fn resolve_tlds(explicit: Option<&[String]>, store: &Path) -> Result<Vec<String>, SweepError> {
    match explicit {
        Some(tlds) => Ok(tlds.to_vec()),
        None => {
            let tlds = read_tld_store(store)?;
            tracing::debug!(path = %store.display(), count = tlds.len(), "loaded TLD store");
            Ok(tlds)
        }
    }
}

/// Download the IANA list and write it to `path`.
///
/// Returns the number of TLDs in the new store.
pub async fn update_tld_store(path: &Path, backup: bool) -> Result<usize, SweepError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| SweepError::network_with_source("Failed to create HTTP client", e.to_string()))?;

    tracing::info!(url = IANA_TLD_LIST_URL, "downloading TLD list");

    let response = client.get(IANA_TLD_LIST_URL).send().await?;

    if !response.status().is_success() {
        return Err(SweepError::network(format!(
            "TLD list download returned HTTP {}",
            response.status()
        )));
    }

    let body = response.text().await?;
    write_tld_store(path, &body, backup)
}

/// Validate and persist downloaded store contents.
///
/// The body must start with the `#` header line the IANA file carries.
/// With `backup` set, an existing store is kept as `<file>.bak` and an
/// older `.bak` moves to `<file>.bak.1`.
pub fn write_tld_store(path: &Path, content: &str, backup: bool) -> Result<usize, SweepError> {
    if !content.trim_start().starts_with('#') {
        return Err(SweepError::network(
            "Downloaded TLD list is missing its header line",
        ));
    }

    let count = parse_tld_store(content).len();
    if count == 0 {
        return Err(SweepError::network("Downloaded TLD list is empty"));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                SweepError::file_error(
                    parent.to_string_lossy(),
                    format!("Failed to create directory: {}", e),
                )
            })?;
        }
    }

    if backup && path.exists() {
        rotate_backup(path)?;
    }

    fs::write(path, content).map_err(|e| {
        SweepError::file_error(
            path.to_string_lossy(),
            format!("Failed to write TLD list: {}", e),
        )
    })?;

    tracing::info!(path = %path.display(), count, "TLD list updated");
    Ok(count)
}

fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn rotate_backup(path: &Path) -> Result<(), SweepError> {
    let bak = backup_path(path, ".bak");
    let older = backup_path(path, ".bak.1");

    if bak.exists() {
        fs::rename(&bak, &older).map_err(|e| {
            SweepError::file_error(
                bak.to_string_lossy(),
                format!("Failed to rotate backup: {}", e),
            )
        })?;
    }

    fs::copy(path, &bak).map_err(|e| {
        SweepError::file_error(
            bak.to_string_lossy(),
            format!("Failed to back up TLD list: {}", e),
        )
    })?;

    tracing::debug!(backup = %bak.display(), "backed up previous TLD list");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "# Version 2024061000, Last Updated Mon Jun 10 07:07:01 2024 UTC\nAAA\nCOM\n\nORG\nXN--P1AI\n";

    #[test]
    fn test_parse_skips_header_and_blank_lines() {
        assert_eq!(
            parse_tld_store(SAMPLE),
            vec!["aaa", "com", "org", "xn--p1ai"]
        );
    }

    #[test]
    fn test_parse_skips_first_line_even_without_hash() {
        assert_eq!(parse_tld_store("COM\nNET\n"), vec!["net"]);
        assert!(parse_tld_store("").is_empty());
    }

    #[test]
    fn test_explicit_list_is_verbatim() {
        let explicit = vec!["Org".to_string(), "bogus".to_string(), "Org".to_string()];
        let tlds = resolve_tlds(Some(&explicit), Path::new("/does/not/exist")).unwrap();
        assert_eq!(tlds, explicit);
    }

    #[test]
    fn test_missing_store_is_file_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_tlds(None, &dir.path().join("tlds.txt")).unwrap_err();
        assert!(matches!(err, SweepError::FileError { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_store_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tlds.txt");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(resolve_tlds(None, &path).unwrap().len(), 4);
    }

    #[test]
    fn test_write_creates_parent_and_rotates_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tlds.txt");

        assert_eq!(write_tld_store(&path, SAMPLE, true).unwrap(), 4);
        assert!(!backup_path(&path, ".bak").exists());

        let second = "# v2\nCOM\n";
        write_tld_store(&path, second, true).unwrap();
        assert_eq!(
            fs::read_to_string(backup_path(&path, ".bak")).unwrap(),
            SAMPLE
        );

        write_tld_store(&path, "# v3\nNET\n", true).unwrap();
        assert_eq!(
            fs::read_to_string(backup_path(&path, ".bak")).unwrap(),
            second
        );
        assert_eq!(
            fs::read_to_string(backup_path(&path, ".bak.1")).unwrap(),
            SAMPLE
        );
        assert_eq!(read_tld_store(&path).unwrap(), vec!["net"]);
    }

    #[test]
    fn test_write_without_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tlds.txt");
        write_tld_store(&path, SAMPLE, false).unwrap();
        write_tld_store(&path, "# v2\nCOM\n", false).unwrap();
        assert!(!backup_path(&path, ".bak").exists());
    }

    #[test]
    fn test_write_rejects_bad_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tlds.txt");
        assert!(write_tld_store(&path, "<html>error</html>", true).is_err());
        assert!(write_tld_store(&path, "# header only\n", true).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_default_path_ends_with_store_name() {
        if let Some(path) = default_tld_store_path() {
            assert!(path.ends_with("tld-sweep/tlds.txt"));
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_from_iana() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tlds.txt");
        let count = update_tld_store(&path, true).await.unwrap();
        assert!(count > 1000, "expected >1000 TLDs, got {}", count);
    }
}
