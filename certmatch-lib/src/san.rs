//! Subject Alternative Name matching.

use tracing::{debug, trace, warn};

use crate::name::GeneralNameEntry;
use crate::outcome::{IdentityField, MalformedName, ValidationOutcome};
use crate::source::IdentitySource;

/// What the SAN extension says about a hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SanMatch {
    /// The extension is present (or unreadable) and decides the outcome alone.
    Decided(ValidationOutcome),
    /// The certificate has no SAN extension; the Common Name decides.
    NoSanPresent,
}

/// Look for `hostname` among the dNSName entries of the SAN extension.
///
/// A truncated entry stops the scan immediately; entries after it are never
/// compared.
pub(crate) fn match_subject_alt_names<C>(hostname: &str, cert: &C) -> SanMatch
where
    C: IdentitySource + ?Sized,
{
    let names = match cert.subject_alt_names() {
        Ok(Some(names)) => names,
        Ok(None) => return SanMatch::NoSanPresent,
        Err(err) => return SanMatch::Decided(err.into()),
    };
    SanMatch::Decided(scan_dns_names(hostname, &names))
}

fn scan_dns_names(hostname: &str, names: &[GeneralNameEntry<'_>]) -> ValidationOutcome {
    for (index, entry) in names.iter().enumerate() {
        let GeneralNameEntry::Dns(name) = entry else {
            continue;
        };

        if name.is_truncated() {
            let malformed = MalformedName {
                field: IdentityField::SanDnsName,
                index: Some(index),
                declared_len: name.declared_len(),
                effective_len: name.effective_len(),
            };
            warn!(
                index,
                declared_len = malformed.declared_len,
                effective_len = malformed.effective_len,
                name = %name,
                "SAN dNSName contains an embedded NUL, rejecting certificate identity"
            );
            return ValidationOutcome::MalformedIdentity(malformed);
        }

        trace!(index, name = %name, "comparing SAN dNSName");
        if name.matches(hostname) {
            debug!(index, hostname, "hostname matched SAN dNSName");
            return ValidationOutcome::MatchFound;
        }
    }

    debug!(hostname, entries = names.len(), "no SAN dNSName matched");
    ValidationOutcome::MatchNotFound
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::fields::{CertificateIdentity, Extracted, IdentityString, SanEntry};
    use crate::outcome::ValidationError;

    fn dns(bytes: &[u8]) -> SanEntry {
        SanEntry::Dns(IdentityString::new(bytes))
    }

    #[test]
    fn second_entry_matches() {
        let cert = CertificateIdentity::new().with_dns_names(&["a.com", "b.com"]);
        assert_eq!(
            match_subject_alt_names("b.com", &cert),
            SanMatch::Decided(ValidationOutcome::MatchFound)
        );
    }

    #[test]
    fn no_entry_matches() {
        let cert = CertificateIdentity::new().with_dns_names(&["a.com", "b.com"]);
        assert_eq!(
            match_subject_alt_names("c.com", &cert),
            SanMatch::Decided(ValidationOutcome::MatchNotFound)
        );
    }

    #[test]
    fn absent_extension_defers() {
        let cert = CertificateIdentity::new().with_common_name("a.com");
        assert_eq!(
            match_subject_alt_names("a.com", &cert),
            SanMatch::NoSanPresent
        );
    }

    #[test]
    fn empty_extension_is_not_absent() {
        let cert = CertificateIdentity::new().with_subject_alt_names(vec![]);
        assert_eq!(
            match_subject_alt_names("a.com", &cert),
            SanMatch::Decided(ValidationOutcome::MatchNotFound)
        );
    }

    #[test]
    fn case_insensitive_match() {
        let cert = CertificateIdentity::new().with_dns_names(&["example.com"]);
        assert_eq!(
            match_subject_alt_names("Example.COM", &cert),
            SanMatch::Decided(ValidationOutcome::MatchFound)
        );
    }

    #[test]
    fn truncated_entry_reports_lengths() {
        let cert = CertificateIdentity::new().with_subject_alt_names(vec![dns(b"abc\0evil.c")]);
        assert_eq!(
            match_subject_alt_names("abc", &cert),
            SanMatch::Decided(ValidationOutcome::MalformedIdentity(MalformedName {
                field: IdentityField::SanDnsName,
                index: Some(0),
                declared_len: 10,
                effective_len: 3,
            }))
        );
    }

    #[test]
    fn truncated_entry_stops_scan_before_later_match() {
        let cert = CertificateIdentity::new().with_subject_alt_names(vec![
            dns(b"a.com"),
            dns(b"paypal.com\0.evil.com"),
            dns(b"b.com"),
        ]);
        let SanMatch::Decided(outcome) = match_subject_alt_names("b.com", &cert) else {
            panic!("SAN extension is present");
        };
        assert!(outcome.is_malformed());
        assert!(matches!(
            outcome,
            ValidationOutcome::MalformedIdentity(MalformedName { index: Some(1), .. })
        ));
    }

    #[test]
    fn match_before_truncated_entry_wins() {
        let cert = CertificateIdentity::new()
            .with_subject_alt_names(vec![dns(b"a.com"), dns(b"bad\0.com")]);
        assert_eq!(
            match_subject_alt_names("a.com", &cert),
            SanMatch::Decided(ValidationOutcome::MatchFound)
        );
    }

    #[test]
    fn non_dns_entries_are_skipped() {
        let cert = CertificateIdentity::new().with_subject_alt_names(vec![
            SanEntry::Email("b.com".into()),
            SanEntry::Uri("b.com".into()),
            SanEntry::Ip("b.com".into()),
            SanEntry::Other("bad\0name".into()),
        ]);
        assert_eq!(
            match_subject_alt_names("b.com", &cert),
            SanMatch::Decided(ValidationOutcome::MatchNotFound)
        );
    }

    #[test]
    fn unreadable_extension_is_an_error() {
        let cert = CertificateIdentity {
            subject_alt_names: Extracted::Unreadable("bad encoding".into()),
            ..Default::default()
        };
        let SanMatch::Decided(ValidationOutcome::ValidationError(err)) =
            match_subject_alt_names("a.com", &cert)
        else {
            panic!("unreadable SAN must be a validation error");
        };
        assert!(matches!(err, ValidationError::Extraction { .. }));
    }
}
