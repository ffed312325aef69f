//! Certificate parsing from PEM and DER formats into identity snapshots.
//!
//! All ASN.1 decoding is done by `x509-parser`; this module only copies out
//! the fields hostname matching reads.

use tracing::debug;
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

use crate::fields::{CertificateIdentity, Extracted, IdentityString, SanEntry};
use crate::name::GeneralNameEntry;
use crate::source::common_name_attrs;
use crate::util;
use crate::CertmatchError;

/// PEM labels accepted as certificates.
const CERTIFICATE_LABELS: [&str; 3] = ["CERTIFICATE", "TRUSTED CERTIFICATE", "X509 CERTIFICATE"];

/// Parse a certificate from PEM or DER (auto-detected).
///
/// If the input begins with `-----BEGIN` (after stripping whitespace), it is
/// treated as PEM. Otherwise it is treated as DER.
pub fn parse_cert(input: &[u8]) -> Result<CertificateIdentity, CertmatchError> {
    if input.is_empty() {
        return Err(CertmatchError::ParseError("empty input".into()));
    }

    if util::is_pem(input) {
        parse_pem(input)
    } else {
        parse_der(input)
    }
}

/// Parse the first certificate of a PEM document.
pub fn parse_pem(input: &[u8]) -> Result<CertificateIdentity, CertmatchError> {
    let (_, pem) = x509_parser::pem::parse_x509_pem(input)
        .map_err(|e| CertmatchError::PemError(format!("{}", e)))?;
    check_pem_label(&pem.label)?;
    parse_der(&pem.contents)
}

/// Parse every certificate of a PEM bundle, in order.
pub fn parse_pem_bundle(input: &[u8]) -> Result<Vec<CertificateIdentity>, CertmatchError> {
    let mut certs = Vec::new();
    for pem in Pem::iter_from_buffer(input) {
        let pem = pem.map_err(|e| CertmatchError::PemError(format!("{}", e)))?;
        check_pem_label(&pem.label)?;
        certs.push(parse_der(&pem.contents)?);
    }
    if certs.is_empty() {
        return Err(CertmatchError::PemError("no certificate found".into()));
    }
    Ok(certs)
}

/// Parse a certificate from DER format.
pub fn parse_der(input: &[u8]) -> Result<CertificateIdentity, CertmatchError> {
    let (_, x509) = X509Certificate::from_der(input)
        .map_err(|e| CertmatchError::DerError(format!("{}", e)))?;

    let raw_version = x509.tbs_certificate.version.0;
    if raw_version > 2 {
        return Err(CertmatchError::ParseError(format!(
            "unsupported X.509 version {} (expected v1, v2, or v3)",
            raw_version + 1
        )));
    }

    Ok(CertificateIdentity::from(&x509))
}

fn check_pem_label(label: &str) -> Result<(), CertmatchError> {
    if CERTIFICATE_LABELS.contains(&label) {
        Ok(())
    } else {
        Err(CertmatchError::PemError(format!(
            "expected CERTIFICATE, got {}",
            label
        )))
    }
}

impl From<&X509Certificate<'_>> for CertificateIdentity {
    fn from(x509: &X509Certificate<'_>) -> Self {
        let cn_attrs: Vec<_> = common_name_attrs(x509.subject()).collect();
        if cn_attrs.len() > 1 {
            debug!(
                count = cn_attrs.len(),
                "subject has several Common Names, the last one is used"
            );
        }
        let common_name = match cn_attrs.last() {
            None => Extracted::Absent,
            Some(attr) => Extracted::Present(IdentityString::new(attr.attr_value().as_bytes())),
        };

        let subject_alt_names = match x509.subject_alternative_name() {
            Ok(None) => Extracted::Absent,
            Ok(Some(san)) => Extracted::Present(
                san.value
                    .general_names
                    .iter()
                    .map(general_name_to_san_entry)
                    .collect(),
            ),
            Err(e) => Extracted::Unreadable(e.to_string()),
        };

        CertificateIdentity {
            subject: x509.subject().to_string(),
            common_name,
            common_name_count: cn_attrs.len(),
            subject_alt_names,
        }
    }
}

fn general_name_to_san_entry(gn: &GeneralName) -> SanEntry {
    match GeneralNameEntry::from(gn) {
        GeneralNameEntry::Dns(name) => SanEntry::Dns(IdentityString::new(name.as_bytes())),
        GeneralNameEntry::Other(kind) => SanEntry::from_kind(kind, render_general_name(gn)),
    }
}

fn render_general_name(gn: &GeneralName) -> String {
    match gn {
        GeneralName::RFC822Name(s) | GeneralName::URI(s) | GeneralName::DNSName(s) => {
            s.to_string()
        }
        GeneralName::IPAddress(ip_bytes) => format_ip_bytes(ip_bytes),
        GeneralName::DirectoryName(dn) => dn.to_string(),
        other => format!("{:?}", other),
    }
}

pub(crate) fn format_ip_bytes(bytes: &[u8]) -> String {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        std::net::Ipv4Addr::from(octets).to_string()
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        std::net::Ipv6Addr::from(octets).to_string()
    } else {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
