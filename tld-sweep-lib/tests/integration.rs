// tld-sweep-lib/tests/integration.rs

//! Integration tests for tld-sweep-lib exports and core functionality

use std::fs;

use tld_sweep_lib::{
    build_candidates, classify, extract_expiry, resolve_tlds, select_strategy, write_tld_store,
    CheckMethod, CheckResult, DisplayFilter, LookupMethod, NormalizedDate, SweepError,
    ToolAvailability, Verdict,
};

fn tlds(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_registered_answer_with_expiry() {
    let text = "Domain Name: EXAMPLE.COM\nRegistry Expiry Date: 2025-03-01T00:00:00Z";
    assert_eq!(
        classify(text),
        Verdict::Taken {
            expiry: Some(NormalizedDate::from_parts("2025", "03", "01"))
        }
    );
}

#[test]
fn test_free_marker_beats_domain_name_line() {
    assert_eq!(
        classify("Domain Name: example.xyz\nStatus: free\n"),
        Verdict::Available
    );
}

#[test]
fn test_answer_without_fields_is_available() {
    assert_eq!(classify(""), Verdict::Available);
    assert_eq!(classify("% Rate limit exceeded\n"), Verdict::Available);
}

#[test]
fn test_registry_date_styles() {
    assert_eq!(
        extract_expiry("Expiry Date: 01-Mar-2025\n").unwrap().as_str(),
        "2025-03-01"
    );
    assert_eq!(
        extract_expiry("Expiration Date: 20250301\n").unwrap().as_str(),
        "2025-03-01"
    );
    assert_eq!(
        extract_expiry("paid-till: 2025-03-01T00:00:00Z\n").unwrap().as_str(),
        "2025-03-01"
    );
}

#[test]
fn test_candidates_follow_tld_order() {
    let candidates = build_candidates("a", &tlds(&["com", "org", "com"]));
    let domains: Vec<String> = candidates.iter().map(|c| c.fqdn()).collect();
    assert_eq!(domains, vec!["a.com", "a.org", "a.com"]);
}

#[test]
fn test_taken_only_sweep_shows_only_taken() {
    let candidates = build_candidates("a", &tlds(&["com", "org"]));
    let verdicts = [Verdict::Available, Verdict::Taken { expiry: None }];

    let results: Vec<CheckResult> = candidates
        .iter()
        .zip(verdicts)
        .map(|(candidate, verdict)| CheckResult {
            domain: candidate.fqdn(),
            verdict: Some(verdict),
            method_used: CheckMethod::Whois,
            check_duration: None,
            error_message: None,
        })
        .collect();

    let shown: Vec<&str> = DisplayFilter::TakenOnly
        .apply(&results)
        .into_iter()
        .map(|r| r.domain.as_str())
        .collect();
    assert_eq!(shown, vec!["a.org"]);
}

#[test]
fn test_store_roundtrip_through_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("nested").join("tlds.txt");

    let count = write_tld_store(
        &store,
        "# Version 2025010100, Last Updated Wed Jan  1 07:07:01 2025 UTC\nCOM\nORG\nXN--P1AI\n",
        true,
    )
    .unwrap();
    assert_eq!(count, 3);

    let resolved = resolve_tlds(None, &store).unwrap();
    assert_eq!(resolved, tlds(&["com", "org", "xn--p1ai"]));

    // An explicit list bypasses the store entirely.
    let explicit = tlds(&["Dev"]);
    let resolved = resolve_tlds(Some(&explicit), &dir.path().join("missing.txt")).unwrap();
    assert_eq!(resolved, explicit);
}

#[test]
fn test_store_refresh_keeps_backup() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("tlds.txt");

    write_tld_store(&store, "# v1\nCOM\n", true).unwrap();
    write_tld_store(&store, "# v2\nCOM\nORG\n", true).unwrap();

    let backup = fs::read_to_string(dir.path().join("tlds.txt.bak")).unwrap();
    assert!(backup.starts_with("# v1"));
    assert_eq!(resolve_tlds(None, &store).unwrap().len(), 2);
}

#[test]
fn test_missing_store_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = resolve_tlds(None, &dir.path().join("tlds.txt")).unwrap_err();
    assert!(matches!(err, SweepError::FileError { .. }));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("--update"));
}

#[test]
fn test_no_tools_stops_before_probing() {
    let err = select_strategy(LookupMethod::Auto, &ToolAvailability::default()).unwrap_err();
    assert!(err.is_fatal());
}

#[cfg(unix)]
#[test]
fn test_sweep_with_scripted_whois() {
    use std::os::unix::fs::PermissionsExt;
    use tld_sweep_lib::{DomainChecker, Strategy, SweepConfig};

    let dir = tempfile::tempdir().unwrap();
    let whois = dir.path().join("whois");
    fs::write(
        &whois,
        "#!/bin/sh\ncase \"$1\" in\n  a.org) printf 'Domain Name: A.ORG\\nExpiration Date: 01-Mar-2025\\n' ;;\n  *) echo 'NOT FOUND' ;;\nesac\n",
    )
    .unwrap();
    fs::set_permissions(&whois, fs::Permissions::from_mode(0o755)).unwrap();

    let checker = DomainChecker::new(SweepConfig::default(), Strategy::Whois(whois));
    let candidates = build_candidates("a", &tlds(&["com", "org"]));
    let results = tokio_test::block_on(checker.check_all(&candidates));

    assert_eq!(results[0].verdict, Some(Verdict::Available));
    assert_eq!(
        results[1].verdict,
        Some(Verdict::Taken {
            expiry: Some(NormalizedDate::from_parts("2025", "03", "01"))
        })
    );
}
