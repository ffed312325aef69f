//! certmatch-lib: check that an X.509 certificate legitimately represents a
//! hostname.
//!
//! Matching follows RFC 6125 §6.4.4 precedence: when a certificate carries a
//! Subject Alternative Name extension only its dNSName entries are compared,
//! and the subject Common Name is consulted only when the extension is absent.
//! Identity strings containing an embedded NUL are reported as
//! [`ValidationOutcome::MalformedIdentity`] rather than compared.
//!
//! ```no_run
//! use certmatch_lib::{parse_cert, validate_hostname};
//!
//! # fn example(der: &[u8]) -> Result<(), certmatch_lib::CertmatchError> {
//! let identity = parse_cert(der)?;
//! if !validate_hostname("www.example.com", &identity).is_match() {
//!     // do not treat the connection as authenticated
//! }
//! # Ok(())
//! # }
//! ```

mod cn;
mod display;
mod fields;
mod name;
mod oid;
mod outcome;
mod parser;
mod san;
mod source;
mod util;
mod validate;

pub use display::{display_names, display_text, to_json, ValidationReport};
pub use fields::{CertificateIdentity, Extracted, IdentityString, SanEntry};
pub use name::{CandidateName, GeneralNameEntry, GeneralNameKind};
pub use outcome::{IdentityField, MalformedName, ValidationError, ValidationOutcome};
pub use parser::{parse_cert, parse_der, parse_pem, parse_pem_bundle};
pub use source::IdentitySource;
pub use util::is_pem;
pub use validate::{
    validate_hostname, validate_hostname_with_options, ValidateOptions, HOSTNAME_MAX_SIZE,
};

/// Errors returned by certmatch-lib.
#[derive(Debug, thiserror::Error)]
pub enum CertmatchError {
    #[error("Failed to parse certificate: {0}")]
    ParseError(String),

    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Invalid DER format: {0}")]
    DerError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
