//! Owned snapshot of the identity-bearing fields of a certificate.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::name::{CandidateName, GeneralNameEntry, GeneralNameKind};
use crate::outcome::{IdentityField, ValidationError};
use crate::source::IdentitySource;
use crate::util;

/// Raw identity string copied out of a certificate, embedded NULs included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityString(Vec<u8>);

impl IdentityString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_candidate(&self) -> CandidateName<'_> {
        CandidateName::new(&self.0)
    }
}

impl From<&str> for IdentityString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&[u8]> for IdentityString {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for IdentityString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_candidate(), f)
    }
}

impl Serialize for IdentityString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = self.as_candidate();
        let mut s = serializer.serialize_struct("IdentityString", 3)?;
        s.serialize_field("value", &util::escape_name(&self.0))?;
        s.serialize_field("declared_len", &name.declared_len())?;
        s.serialize_field("effective_len", &name.effective_len())?;
        s.end()
    }
}

/// Subject Alternative Name entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum SanEntry {
    Dns(IdentityString),
    Email(String),
    Ip(String),
    Uri(String),
    DirName(String),
    Other(String),
}

impl SanEntry {
    /// Build a non-DNS entry of the given kind holding its display form.
    pub(crate) fn from_kind(kind: GeneralNameKind, value: String) -> Self {
        match kind {
            GeneralNameKind::Email => SanEntry::Email(value),
            GeneralNameKind::Ip => SanEntry::Ip(value),
            GeneralNameKind::Uri => SanEntry::Uri(value),
            GeneralNameKind::DirectoryName => SanEntry::DirName(value),
            GeneralNameKind::Other => SanEntry::Other(value),
        }
    }

    fn as_general_name(&self) -> GeneralNameEntry<'_> {
        match self {
            SanEntry::Dns(name) => GeneralNameEntry::Dns(name.as_candidate()),
            SanEntry::Email(_) => GeneralNameEntry::Other(GeneralNameKind::Email),
            SanEntry::Ip(_) => GeneralNameEntry::Other(GeneralNameKind::Ip),
            SanEntry::Uri(_) => GeneralNameEntry::Other(GeneralNameKind::Uri),
            SanEntry::DirName(_) => GeneralNameEntry::Other(GeneralNameKind::DirectoryName),
            SanEntry::Other(_) => GeneralNameEntry::Other(GeneralNameKind::Other),
        }
    }
}

impl fmt::Display for SanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanEntry::Dns(v) => write!(f, "DNS:{}", v),
            SanEntry::Email(v) => write!(f, "email:{}", v),
            SanEntry::Ip(v) => write!(f, "IP Address:{}", v),
            SanEntry::Uri(v) => write!(f, "URI:{}", v),
            SanEntry::DirName(v) => write!(f, "DirName:{}", v),
            SanEntry::Other(v) => write!(f, "othername:{}", v),
        }
    }
}

/// A certificate field as seen by the extraction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Extracted<T> {
    /// The field is not in the certificate.
    Absent,
    /// The field was decoded.
    Present(T),
    /// The field exists but the certificate library could not decode it.
    Unreadable(String),
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Extracted::Absent
    }
}

impl<T> Extracted<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Extracted::Absent)
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            Extracted::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Identity-bearing fields of a certificate, detached from its DER buffer.
///
/// Built by [`crate::parse_cert`] and friends, or assembled directly with the
/// `with_*` methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertificateIdentity {
    /// Subject distinguished name on one line (e.g., "CN=example.com, O=Org").
    pub subject: String,
    /// The last Common Name attribute of the subject.
    pub common_name: Extracted<IdentityString>,
    /// Number of Common Name attributes in the subject.
    pub common_name_count: usize,
    /// The Subject Alternative Name extension.
    pub subject_alt_names: Extracted<Vec<SanEntry>>,
}

impl CertificateIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a Common Name attribute; the last one added is the one matched.
    pub fn with_common_name(mut self, cn: impl Into<IdentityString>) -> Self {
        self.common_name = Extracted::Present(cn.into());
        self.common_name_count += 1;
        self
    }

    /// Set the SAN extension to exactly `entries`.
    pub fn with_subject_alt_names(mut self, entries: Vec<SanEntry>) -> Self {
        self.subject_alt_names = Extracted::Present(entries);
        self
    }

    /// Set the SAN extension to the given dNSName entries.
    pub fn with_dns_names(self, names: &[&str]) -> Self {
        self.with_subject_alt_names(
            names
                .iter()
                .map(|n| SanEntry::Dns(IdentityString::from(*n)))
                .collect(),
        )
    }

    /// All dNSName entries of the SAN extension, in certificate order.
    pub fn dns_names(&self) -> impl Iterator<Item = &IdentityString> {
        self.subject_alt_names
            .present()
            .into_iter()
            .flatten()
            .filter_map(|entry| match entry {
                SanEntry::Dns(name) => Some(name),
                _ => None,
            })
    }

    /// Whether the certificate carries a SAN extension (readable or not).
    pub fn has_subject_alt_names(&self) -> bool {
        !self.subject_alt_names.is_absent()
    }
}

impl IdentitySource for CertificateIdentity {
    fn common_name(&self) -> Result<Option<CandidateName<'_>>, ValidationError> {
        match &self.common_name {
            Extracted::Absent => Ok(None),
            Extracted::Present(cn) => Ok(Some(cn.as_candidate())),
            Extracted::Unreadable(reason) => Err(ValidationError::Extraction {
                field: IdentityField::CommonName,
                reason: reason.clone(),
            }),
        }
    }

    fn subject_alt_names(&self) -> Result<Option<Vec<GeneralNameEntry<'_>>>, ValidationError> {
        match &self.subject_alt_names {
            Extracted::Absent => Ok(None),
            Extracted::Present(entries) => {
                Ok(Some(entries.iter().map(SanEntry::as_general_name).collect()))
            }
            Extracted::Unreadable(reason) => Err(ValidationError::Extraction {
                field: IdentityField::SanDnsName,
                reason: reason.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn last_common_name_wins() {
        let identity = CertificateIdentity::new()
            .with_common_name("first.example")
            .with_common_name("second.example");
        assert_eq!(identity.common_name_count, 2);
        let cn = identity.common_name().unwrap().unwrap();
        assert_eq!(cn.as_bytes(), b"second.example");
    }

    #[test]
    fn absent_fields_read_as_none() {
        let identity = CertificateIdentity::new();
        assert!(identity.common_name().unwrap().is_none());
        assert!(identity.subject_alt_names().unwrap().is_none());
        assert!(!identity.has_subject_alt_names());
    }

    #[test]
    fn unreadable_san_is_an_extraction_error() {
        let identity = CertificateIdentity {
            subject_alt_names: Extracted::Unreadable("duplicate extension".into()),
            ..Default::default()
        };
        assert!(identity.has_subject_alt_names());
        assert!(matches!(
            identity.subject_alt_names(),
            Err(ValidationError::Extraction {
                field: IdentityField::SanDnsName,
                ..
            })
        ));
    }

    #[test]
    fn san_entries_keep_order_and_kind() {
        let identity = CertificateIdentity::new().with_subject_alt_names(vec![
            SanEntry::Email("admin@example.com".into()),
            SanEntry::Dns("a.example".into()),
            SanEntry::Ip("10.0.0.1".into()),
        ]);
        let entries = identity.subject_alt_names().unwrap().unwrap();
        assert_eq!(
            entries,
            vec![
                GeneralNameEntry::Other(GeneralNameKind::Email),
                GeneralNameEntry::Dns(CandidateName::from("a.example")),
                GeneralNameEntry::Other(GeneralNameKind::Ip),
            ]
        );
        let dns: Vec<_> = identity.dns_names().collect();
        assert_eq!(dns.len(), 1);
    }

    #[test]
    fn entries_built_from_kind_classify_back_to_it() {
        for kind in [
            GeneralNameKind::Email,
            GeneralNameKind::Ip,
            GeneralNameKind::Uri,
            GeneralNameKind::DirectoryName,
            GeneralNameKind::Other,
        ] {
            let entry = SanEntry::from_kind(kind, "x".into());
            assert_eq!(entry.as_general_name(), GeneralNameEntry::Other(kind));
        }
    }

    #[test]
    fn identity_string_serializes_lengths() {
        let json = serde_json::to_value(IdentityString::new(&b"abc\0evil.c"[..])).unwrap();
        assert_eq!(json["value"], "abc\\0evil.c");
        assert_eq!(json["declared_len"], 10);
        assert_eq!(json["effective_len"], 3);
    }

    #[test]
    fn san_entry_display_uses_openssl_prefixes() {
        assert_eq!(SanEntry::Dns("a.example".into()).to_string(), "DNS:a.example");
        assert_eq!(SanEntry::Ip("10.0.0.1".into()).to_string(), "IP Address:10.0.0.1");
    }
}
