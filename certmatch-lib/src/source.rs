//! The query interface the matchers read certificates through.
//!
//! Matching never decodes ASN.1 itself. It asks an [`IdentitySource`] for the
//! Subject's Common Name and for the decoded Subject Alternative Name list.
//! This module implements the interface for certificates parsed by
//! `x509-parser`; [`crate::CertificateIdentity`] implements it for an owned
//! snapshot.

use x509_parser::prelude::*;

use crate::name::{CandidateName, GeneralNameEntry, GeneralNameKind};
use crate::oid;
use crate::outcome::{IdentityField, ValidationError};

/// Read access to the two certificate fields hostname matching depends on.
pub trait IdentitySource {
    /// The last Common Name attribute of the Subject, in encoded order.
    ///
    /// `Ok(None)` when the Subject has no Common Name.
    fn common_name(&self) -> Result<Option<CandidateName<'_>>, ValidationError>;

    /// Entries of the Subject Alternative Name extension, in certificate order.
    ///
    /// `Ok(None)` when the extension is absent. The returned list is owned by
    /// the caller and released when it goes out of scope.
    fn subject_alt_names(&self) -> Result<Option<Vec<GeneralNameEntry<'_>>>, ValidationError>;
}

impl IdentitySource for X509Certificate<'_> {
    fn common_name(&self) -> Result<Option<CandidateName<'_>>, ValidationError> {
        // Raw content bytes whatever the string type, so a TeletexString
        // compares as its octets and a BMPString trips the NUL check.
        Ok(common_name_attrs(self.subject())
            .last()
            .map(|attr| CandidateName::new(attr.attr_value().as_bytes())))
    }

    fn subject_alt_names(&self) -> Result<Option<Vec<GeneralNameEntry<'_>>>, ValidationError> {
        let san = self
            .subject_alternative_name()
            .map_err(|e| ValidationError::Extraction {
                field: IdentityField::SanDnsName,
                reason: e.to_string(),
            })?;
        Ok(san.map(|ext| {
            ext.value
                .general_names
                .iter()
                .map(GeneralNameEntry::from)
                .collect()
        }))
    }
}

/// Every Common Name attribute of `name`, in encoded RDN order.
pub(crate) fn common_name_attrs<'a, 'n>(
    name: &'n X509Name<'a>,
) -> impl Iterator<Item = &'n AttributeTypeAndValue<'a>> {
    name.iter()
        .flat_map(|rdn| rdn.iter())
        .filter(|attr| attr.attr_type().to_id_string() == oid::COMMON_NAME)
}

/// Classify a decoded General Name for hostname matching. The owned snapshot
/// builds its SAN entries from this classification as well.
impl<'a> From<&GeneralName<'a>> for GeneralNameEntry<'a> {
    fn from(gn: &GeneralName<'a>) -> Self {
        match gn {
            GeneralName::DNSName(name) => GeneralNameEntry::Dns(CandidateName::from(*name)),
            GeneralName::RFC822Name(_) => GeneralNameEntry::Other(GeneralNameKind::Email),
            GeneralName::IPAddress(_) => GeneralNameEntry::Other(GeneralNameKind::Ip),
            GeneralName::URI(_) => GeneralNameEntry::Other(GeneralNameKind::Uri),
            GeneralName::DirectoryName(_) => {
                GeneralNameEntry::Other(GeneralNameKind::DirectoryName)
            }
            _ => GeneralNameEntry::Other(GeneralNameKind::Other),
        }
    }
}
