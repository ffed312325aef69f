//! Hostname validation with RFC 6125 §6.4.4 precedence between the Subject
//! Alternative Name extension and the subject Common Name.

use tracing::debug;

use crate::cn::match_common_name;
use crate::outcome::{ValidationError, ValidationOutcome};
use crate::san::{match_subject_alt_names, SanMatch};
use crate::source::IdentitySource;

/// Longest hostname accepted for matching, in bytes.
pub const HOSTNAME_MAX_SIZE: usize = 255;

/// Options for hostname validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Hostnames longer than this many bytes are rejected as a
    /// [`ValidationError::HostnameTooLong`].
    pub max_hostname_len: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            max_hostname_len: HOSTNAME_MAX_SIZE,
        }
    }
}

/// Check whether `cert` legitimately represents `hostname`.
///
/// 1. If the certificate has a SAN extension, only its dNSName entries are
///    considered. The Common Name is ignored even when no entry matches.
/// 2. If the extension is absent, the last subject Common Name is compared.
///
/// Comparison is exact and ASCII case-insensitive; wildcards are not
/// expanded. An identity with an embedded NUL yields
/// [`ValidationOutcome::MalformedIdentity`].
pub fn validate_hostname<C>(hostname: &str, cert: &C) -> ValidationOutcome
where
    C: IdentitySource + ?Sized,
{
    validate_hostname_with_options(hostname, cert, &ValidateOptions::default())
}

/// Check whether `cert` legitimately represents `hostname` with explicit options.
pub fn validate_hostname_with_options<C>(
    hostname: &str,
    cert: &C,
    options: &ValidateOptions,
) -> ValidationOutcome
where
    C: IdentitySource + ?Sized,
{
    if let Err(err) = check_hostname(hostname, options) {
        debug!(error = %err, "hostname rejected before matching");
        return err.into();
    }

    match match_subject_alt_names(hostname, cert) {
        SanMatch::Decided(outcome) => outcome,
        SanMatch::NoSanPresent => {
            debug!(hostname, "certificate has no SAN extension, falling back to subject CN");
            match_common_name(hostname, cert)
        }
    }
}

fn check_hostname(hostname: &str, options: &ValidateOptions) -> Result<(), ValidationError> {
    if hostname.is_empty() {
        return Err(ValidationError::EmptyHostname);
    }
    if hostname.len() > options.max_hostname_len {
        return Err(ValidationError::HostnameTooLong {
            len: hostname.len(),
            max: options.max_hostname_len,
        });
    }
    if let Some(pos) = hostname.bytes().position(|b| b == 0) {
        return Err(ValidationError::HostnameContainsNul(pos));
    }
    Ok(())
}
