//! Collector adapter tests: domain filtering, service tagging, and
//! extraction-quality policy for malformed matches.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use shadowlink_infra::collect::{
    CSV_DUMP_SERVICE, CollectError, CollectorMetrics, PASTE_SERVICE, breach_records,
    extract_from_text, normalize_match, parse_csv_dump,
};

fn temp_csv_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "shadowlink_dump_{tag}_{}_{}.csv",
        std::process::id(),
        nanos
    ))
}

fn remove_if_exists(path: &Path) {
    let _ = std::fs::remove_file(path);
}

// --- normalize_match ----------------------------------------------------

#[test]
fn test_normalize_trims_trailing_punctuation() {
    assert_eq!(
        normalize_match("alice@corp.com,").as_deref(),
        Some("alice@corp.com")
    );
    assert_eq!(
        normalize_match("bob@corp.com.").as_deref(),
        Some("bob@corp.com")
    );
}

#[test]
fn test_normalize_rejects_multiple_at_signs() {
    assert_eq!(normalize_match("a@@corp.com"), None);
    assert_eq!(normalize_match("a@b@corp.com"), None);
}

#[test]
fn test_normalize_rejects_missing_parts() {
    assert_eq!(normalize_match("@corp.com"), None);
    assert_eq!(normalize_match("alice@"), None);
    assert_eq!(normalize_match("no-at-sign"), None);
    assert_eq!(normalize_match(""), None);
}

// --- free-text extraction -----------------------------------------------

#[test]
fn test_extract_filters_domain_and_dedupes() {
    let text = "\
leaked creds: alice@corp.com:hunter2
bob@other.org was here
alice@corp.com, again with punctuation
carol@corp.com!
";
    let mut metrics = CollectorMetrics::new();
    let records = extract_from_text(text, "@corp.com", &mut metrics);

    let emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, ["alice@corp.com", "carol@corp.com"]);
    assert!(records.iter().all(|r| r.service == PASTE_SERVICE));
    assert_eq!(metrics.extracted_total(), 2);
}

#[test]
fn test_extract_on_empty_text_is_empty() {
    let mut metrics = CollectorMetrics::new();
    assert!(extract_from_text("", "@corp.com", &mut metrics).is_empty());
    assert_eq!(metrics.extracted_total(), 0);
    assert_eq!(metrics.rejected_total(), 0);
}

// --- CSV dump -----------------------------------------------------------

#[test]
fn test_dump_keeps_target_domain_and_tags_service() {
    let path = temp_csv_path("basic");
    std::fs::write(
        &path,
        "email,password,source\n\
         alice@corp.com,hunter2,forum\n\
         eve@other.org,123456,forum\n\
         bob@corp.com,qwerty,paste\n",
    )
    .expect("write dump");

    let mut metrics = CollectorMetrics::new();
    let records = parse_csv_dump(&path, "@corp.com", &mut metrics).expect("parse");

    let emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, ["alice@corp.com", "bob@corp.com"]);
    assert!(records.iter().all(|r| r.service == CSV_DUMP_SERVICE));

    remove_if_exists(&path);
}

#[test]
fn test_dump_counts_malformed_emails_as_rejected() {
    let path = temp_csv_path("malformed");
    std::fs::write(
        &path,
        "email\na@@corp.com\nalice@corp.com\n",
    )
    .expect("write dump");

    let mut metrics = CollectorMetrics::new();
    let records = parse_csv_dump(&path, "@corp.com", &mut metrics).expect("parse");

    assert_eq!(records.len(), 1);
    assert_eq!(metrics.rejected_total(), 1);
    assert_eq!(metrics.extracted_total(), 1);

    remove_if_exists(&path);
}

#[test]
fn test_dump_without_email_column_fails() {
    let path = temp_csv_path("nocol");
    std::fs::write(&path, "account,password\nalice,hunter2\n").expect("write dump");

    let mut metrics = CollectorMetrics::new();
    match parse_csv_dump(&path, "@corp.com", &mut metrics).unwrap_err() {
        CollectError::MissingColumn { column } => assert_eq!(column, "email"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }

    remove_if_exists(&path);
}

// --- API result adapter -------------------------------------------------

#[test]
fn test_breach_records_tags_each_breach_name() {
    let records = breach_records("alice@corp.com", &["GitHub", "Adobe"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].email, "alice@corp.com");
    assert_eq!(records[0].service, "GitHub");
    assert_eq!(records[1].service, "Adobe");
}

#[test]
fn test_breach_records_skips_empty_names() {
    let records = breach_records("alice@corp.com", &["", "Dropbox"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].service, "Dropbox");
}
