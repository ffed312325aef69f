//! Human-readable and JSON formatting of validation results and certificate
//! identities.

use serde::Serialize;

use crate::fields::{CertificateIdentity, Extracted, IdentityString, SanEntry};
use crate::oid;
use crate::outcome::{IdentityField, ValidationOutcome};
use crate::validate::{validate_hostname_with_options, ValidateOptions};
use crate::CertmatchError;

/// The outcome of one hostname check together with what it was decided on.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Hostname that was checked.
    pub hostname: String,
    /// Subject of the certificate (one line).
    pub subject: String,
    /// Field that decided the outcome: the SAN extension when present,
    /// otherwise the subject CN.
    pub decided_by: IdentityField,
    /// Identity strings from the deciding field, escaped for display.
    pub candidates: Vec<String>,
    /// Result of the check.
    pub outcome: ValidationOutcome,
}

impl ValidationReport {
    /// Validate `hostname` against `identity` and record the result.
    pub fn new(hostname: &str, identity: &CertificateIdentity) -> Self {
        Self::with_options(hostname, identity, &ValidateOptions::default())
    }

    pub fn with_options(
        hostname: &str,
        identity: &CertificateIdentity,
        options: &ValidateOptions,
    ) -> Self {
        let outcome = validate_hostname_with_options(hostname, identity, options);
        let (decided_by, candidates) = if identity.has_subject_alt_names() {
            (
                IdentityField::SanDnsName,
                identity.dns_names().map(IdentityString::to_string).collect(),
            )
        } else {
            (
                IdentityField::CommonName,
                identity
                    .common_name
                    .present()
                    .map(IdentityString::to_string)
                    .into_iter()
                    .collect(),
            )
        };
        Self {
            hostname: hostname.to_string(),
            subject: identity.subject.clone(),
            decided_by,
            candidates,
            outcome,
        }
    }

    /// Whether the certificate may be trusted for the hostname.
    pub fn is_match(&self) -> bool {
        self.outcome.is_match()
    }

    /// One-word result with the reason for anything but a match, e.g.
    /// `PASS`, `FAIL (no match)` or `REJECT (malformed identity ...)`.
    pub fn verdict(&self) -> String {
        match &self.outcome {
            ValidationOutcome::MatchFound => "PASS".to_string(),
            ValidationOutcome::MalformedIdentity(_) => format!("REJECT ({})", self.outcome),
            other => format!("FAIL ({})", other),
        }
    }
}

/// Format a validation report as human-readable text.
pub fn display_text(report: &ValidationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Hostname: {}\n", report.hostname));
    out.push_str(&format!("  Subject: {}\n", report.subject));
    out.push_str(&format!("  Checked: {}\n", report.decided_by));
    if report.candidates.is_empty() {
        out.push_str("  Candidates: (none)\n");
    } else {
        out.push_str(&format!("  Candidates: {}\n", report.candidates.join(", ")));
    }
    out.push_str(&format!("  Result: {}\n", report.verdict()));
    out
}

/// Format the identity fields of a certificate as human-readable text.
///
/// Every identity string is listed with its declared and effective length;
/// strings where the two differ are flagged.
pub fn display_names(identity: &CertificateIdentity) -> String {
    let mut out = String::new();

    out.push_str(&format!("Subject: {}\n", identity.subject));

    out.push_str(&format!(
        "  Subject Alternative Name ({}):",
        oid::EXT_SUBJECT_ALT_NAME
    ));
    match &identity.subject_alt_names {
        Extracted::Absent => out.push_str(" (absent)\n"),
        Extracted::Unreadable(reason) => out.push_str(&format!(" (unreadable: {})\n", reason)),
        Extracted::Present(entries) if entries.is_empty() => out.push_str(" (empty)\n"),
        Extracted::Present(entries) => {
            out.push('\n');
            for entry in entries {
                match entry {
                    SanEntry::Dns(name) => {
                        out.push_str(&format!("    {}{}\n", entry, length_note(name)))
                    }
                    _ => out.push_str(&format!("    {}\n", entry)),
                }
            }
        }
    }

    out.push_str("  Common Name:");
    match &identity.common_name {
        Extracted::Absent => out.push_str(" (absent)\n"),
        Extracted::Unreadable(reason) => out.push_str(&format!(" (unreadable: {})\n", reason)),
        Extracted::Present(cn) => {
            out.push_str(&format!(" {}{}", cn, length_note(cn)));
            if identity.common_name_count > 1 {
                out.push_str(&format!(
                    " (last of {} CN attributes)",
                    identity.common_name_count
                ));
            }
            if identity.has_subject_alt_names() {
                out.push_str(" [ignored: SAN present]");
            }
            out.push('\n');
        }
    }
    out
}

fn length_note(name: &IdentityString) -> String {
    let candidate = name.as_candidate();
    if candidate.is_truncated() {
        format!(
            " [MALFORMED: declared {} bytes, NUL at {}]",
            candidate.declared_len(),
            candidate.effective_len()
        )
    } else {
        String::new()
    }
}

/// Serialize a validation report to a pretty-printed JSON string.
pub fn to_json(report: &ValidationReport) -> Result<String, CertmatchError> {
    serde_json::to_string_pretty(report).map_err(CertmatchError::Json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn report_records_san_candidates() {
        let identity = CertificateIdentity::new()
            .with_dns_names(&["a.com", "b.com"])
            .with_common_name("c.com");
        let report = ValidationReport::new("b.com", &identity);
        assert!(report.is_match());
        assert_eq!(report.decided_by, IdentityField::SanDnsName);
        assert_eq!(report.candidates, vec!["a.com", "b.com"]);
        let text = display_text(&report);
        assert!(text.contains("Candidates: a.com, b.com"));
        assert!(text.contains("Result: PASS"));
    }

    #[test]
    fn report_records_cn_fallback() {
        let identity = CertificateIdentity::new().with_common_name("c.com");
        let report = ValidationReport::new("b.com", &identity);
        assert_eq!(report.decided_by, IdentityField::CommonName);
        assert_eq!(report.candidates, vec!["c.com"]);
        assert!(display_text(&report).contains("Result: FAIL (no match)"));
    }

    #[test]
    fn malformed_report_is_a_rejection() {
        let identity = CertificateIdentity::new()
            .with_subject_alt_names(vec![SanEntry::Dns(IdentityString::new(&b"a\0b"[..]))]);
        let report = ValidationReport::new("a", &identity);
        assert_eq!(report.candidates, vec!["a\\0b"]);
        assert!(display_text(&report).contains("REJECT (malformed identity"));
    }

    #[test]
    fn json_report_has_outcome_tag() {
        let identity = CertificateIdentity::new().with_dns_names(&["a.com"]);
        let json = to_json(&ValidationReport::new("a.com", &identity)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"]["result"], "match_found");
        assert_eq!(value["decided_by"], "san_dns_name");
    }

    #[test]
    fn names_flag_truncated_entries_and_shadowed_cn() {
        let identity = CertificateIdentity::new()
            .with_subject_alt_names(vec![
                SanEntry::Dns("a.com".into()),
                SanEntry::Dns(IdentityString::new(&b"abc\0evil.c"[..])),
                SanEntry::Email("admin@a.com".into()),
            ])
            .with_common_name("a.com");
        let text = display_names(&identity);
        assert!(text.contains("DNS:a.com\n"));
        assert!(text.contains("DNS:abc\\0evil.c [MALFORMED: declared 10 bytes, NUL at 3]"));
        assert!(text.contains("email:admin@a.com"));
        assert!(text.contains("[ignored: SAN present]"));
    }

    #[test]
    fn names_show_absent_fields() {
        let text = display_names(&CertificateIdentity::new());
        assert!(text.contains("Subject Alternative Name (2.5.29.17): (absent)"));
        assert!(text.contains("Common Name: (absent)"));
    }
}
