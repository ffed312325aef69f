//! Result types shared by the SAN matcher, the CN matcher and the validator.

use serde::Serialize;
use std::fmt;

/// Certificate field a candidate identity was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    /// A dNSName entry of the Subject Alternative Name extension.
    SanDnsName,
    /// The Common Name attribute of the Subject.
    CommonName,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::SanDnsName => f.write_str("SAN dNSName"),
            IdentityField::CommonName => f.write_str("subject CN"),
        }
    }
}

/// An identity string whose declared length disagrees with the position of
/// its first NUL byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MalformedName {
    /// Field the string was found in.
    pub field: IdentityField,
    /// Position of the entry within the SAN extension (`None` for the CN).
    pub index: Option<usize>,
    /// Length carried by the ASN.1 string header.
    pub declared_len: usize,
    /// Number of bytes before the first NUL.
    pub effective_len: usize,
}

impl fmt::Display for MalformedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(index) = self.index {
            write!(f, " #{}", index)?;
        }
        write!(
            f,
            " declares {} bytes but a NUL terminates it after {}",
            self.declared_len, self.effective_len
        )
    }
}

/// Why a hostname could not be checked at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("hostname is empty")]
    EmptyHostname,

    #[error("hostname is {len} bytes long, maximum is {max}")]
    HostnameTooLong { len: usize, max: usize },

    #[error("hostname contains a NUL byte at offset {0}")]
    HostnameContainsNul(usize),

    #[error("certificate subject has no Common Name")]
    MissingCommonName,

    #[error("failed to extract {field} from certificate: {reason}")]
    Extraction { field: IdentityField, reason: String },
}

/// Result of matching a hostname against a certificate.
///
/// Only [`ValidationOutcome::MatchFound`] allows a connection to be treated as
/// authenticated for the hostname. `MalformedIdentity` additionally signals
/// possible tampering and should be surfaced, not retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// An identity in the deciding field equals the hostname.
    MatchFound,
    /// Every identity in the deciding field is well-formed and none matches.
    MatchNotFound,
    /// An identity string carries an embedded NUL.
    MalformedIdentity(MalformedName),
    /// The inputs were unusable or a required field could not be extracted.
    ValidationError(ValidationError),
}

impl ValidationOutcome {
    /// Whether the certificate may be trusted for the hostname.
    pub fn is_match(&self) -> bool {
        matches!(self, ValidationOutcome::MatchFound)
    }

    /// Whether an embedded-NUL identity was detected.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ValidationOutcome::MalformedIdentity(_))
    }
}

impl From<ValidationError> for ValidationOutcome {
    fn from(err: ValidationError) -> Self {
        ValidationOutcome::ValidationError(err)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::MatchFound => f.write_str("match found"),
            ValidationOutcome::MatchNotFound => f.write_str("no match"),
            ValidationOutcome::MalformedIdentity(name) => write!(f, "malformed identity: {}", name),
            ValidationOutcome::ValidationError(err) => write!(f, "validation error: {}", err),
        }
    }
}
