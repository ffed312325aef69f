//! Subject Common Name matching, used only when a certificate has no SAN
//! extension.

use tracing::{debug, warn};

use crate::outcome::{IdentityField, MalformedName, ValidationError, ValidationOutcome};
use crate::source::IdentitySource;

/// Compare `hostname` with the last Common Name of the certificate subject.
///
/// A subject without any Common Name is a [`ValidationError`], not a
/// mismatch: such a certificate cannot name a host through this field.
pub(crate) fn match_common_name<C>(hostname: &str, cert: &C) -> ValidationOutcome
where
    C: IdentitySource + ?Sized,
{
    let name = match cert.common_name() {
        Ok(Some(name)) => name,
        Ok(None) => return ValidationError::MissingCommonName.into(),
        Err(err) => return err.into(),
    };

    if name.is_truncated() {
        let malformed = MalformedName {
            field: IdentityField::CommonName,
            index: None,
            declared_len: name.declared_len(),
            effective_len: name.effective_len(),
        };
        warn!(
            declared_len = malformed.declared_len,
            effective_len = malformed.effective_len,
            name = %name,
            "subject CN contains an embedded NUL, rejecting certificate identity"
        );
        return ValidationOutcome::MalformedIdentity(malformed);
    }

    if name.matches(hostname) {
        debug!(hostname, "hostname matched subject CN");
        ValidationOutcome::MatchFound
    } else {
        debug!(hostname, cn = %name, "subject CN did not match");
        ValidationOutcome::MatchNotFound
    }
}
