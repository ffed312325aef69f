//! Shared encoding utilities.

/// True if the input looks like PEM (begins with `-----BEGIN` after whitespace).
pub fn is_pem(input: &[u8]) -> bool {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    input
        .get(start..)
        .is_some_and(|rest| rest.starts_with(b"-----BEGIN"))
}

/// Render an identity string for display, escaping NUL and control bytes.
///
/// Valid UTF-8 is kept as text; other bytes are shown as `\xNN`.
pub fn escape_name(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => {
            let mut out = String::with_capacity(s.len());
            for ch in s.chars() {
                match ch {
                    '\0' => out.push_str("\\0"),
                    '\\' => out.push_str("\\\\"),
                    c if c.is_control() => out.extend(c.escape_default()),
                    c => out.push(c),
                }
            }
            out
        }
        Err(_) => {
            let mut out = String::with_capacity(bytes.len() * 2);
            for &b in bytes {
                match b {
                    0 => out.push_str("\\0"),
                    b'\\' => out.push_str("\\\\"),
                    b' ' => out.push(' '),
                    b if b.is_ascii_graphic() => out.push(char::from(b)),
                    b => out.push_str(&format!("\\x{:02x}", b)),
                }
            }
            out
        }
    }
}
