//! Candidate identity strings and the General Name entries they come in.

use std::fmt;

use crate::util;

/// Raw bytes of an identity string exactly as the certificate stores them.
///
/// The declared length is the byte length of the ASN.1 string value. The
/// effective length is what a NUL-terminated reading of the same bytes would
/// see. The two differ only when a NUL is embedded in the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateName<'a> {
    bytes: &'a [u8],
}

impl<'a> CandidateName<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn declared_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn effective_len(&self) -> usize {
        self.bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len())
    }

    /// True when a NUL byte cuts the string short of its declared length.
    pub fn is_truncated(&self) -> bool {
        self.effective_len() != self.declared_len()
    }

    /// ASCII case-insensitive, byte-for-byte equality with `hostname`.
    ///
    /// Bytes outside ASCII are compared exactly, as `strcasecmp` does in the
    /// C locale.
    pub fn matches(&self, hostname: &str) -> bool {
        self.bytes.eq_ignore_ascii_case(hostname.as_bytes())
    }
}

impl<'a> From<&'a str> for CandidateName<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for CandidateName<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for CandidateName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&util::escape_name(self.bytes))
    }
}

/// Kinds of SAN General Name that carry no hostname identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneralNameKind {
    Email,
    Ip,
    Uri,
    DirectoryName,
    Other,
}

/// One decoded entry of a Subject Alternative Name extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralNameEntry<'a> {
    /// A dNSName entry.
    Dns(CandidateName<'a>),
    /// Any other General Name; skipped by hostname matching.
    Other(GeneralNameKind),
}
