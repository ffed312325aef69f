//! OID string constants used by certificate field extraction.
//!
//! Attribute types come from RFC 4519 / X.520; extension identifiers from
//! RFC 5280 Section 4.2.

// ── X.509 Distinguished Name attributes ─────────────────────────────────

pub const COMMON_NAME: &str = "2.5.4.3";

// ── X.509v3 extensions ───────────────────────────────────────────────────

pub const EXT_SUBJECT_ALT_NAME: &str = "2.5.29.17";
