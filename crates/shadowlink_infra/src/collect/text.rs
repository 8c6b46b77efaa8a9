//! Free-text email extraction for scraped paste dumps.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use shadowlink_core::ledger::ExposureRecord;

use super::CollectorMetrics;

/// Service tag for records mined from paste text.
pub const PASTE_SERVICE: &str = "Pastebin";

/// Email-shaped pattern. Deliberately loose; [`normalize_match`] filters
/// the worst of what it accepts. Tunable but unvalidated: kept as-is from
/// the production scraper rather than tightened on a guess.
const EMAIL_PATTERN: &str = r"[\w.-]+@[\w.-]+";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Clean one raw email-shaped match.
///
/// Trims trailing punctuation picked up from surrounding prose and rejects
/// candidates without exactly one `@`. Returns `None` for rejects.
pub fn normalize_match(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['.', ',', ';', ':', '!', '?']);
    if trimmed.is_empty() {
        return None;
    }
    let mut parts = trimmed.split('@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Extract exposure records for one target domain from free text.
///
/// Deduplicates within the text; ordering follows first occurrence.
/// Matches outside the target domain are ignored silently; malformed
/// matches count as rejected.
pub fn extract_from_text(
    text: &str,
    target_domain: &str,
    metrics: &mut CollectorMetrics,
) -> Vec<ExposureRecord> {
    let mut seen = BTreeSet::new();
    let mut records = Vec::new();

    for m in email_regex().find_iter(text) {
        let email = match normalize_match(m.as_str()) {
            Some(email) => email,
            None => {
                metrics.record_rejected();
                continue;
            }
        };
        if !email.contains(target_domain) {
            continue;
        }
        if !seen.insert(email.clone()) {
            continue;
        }
        if let Ok(record) = ExposureRecord::new(email, PASTE_SERVICE) {
            metrics.record_extracted();
            records.push(record);
        }
    }

    records
}
