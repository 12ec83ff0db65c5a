//! DNS name normalization and validation
//!
//! Providers return fully qualified names with a trailing dot and may
//! escape special characters as `\DDD` octal sequences (`\052` is `*`).
//! Names are compared after decoding escapes, dropping the trailing dot
//! and lowercasing ASCII.

use crate::error::{Error, Result};

/// Normalize a DNS name for comparison
pub fn normalize(name: &str) -> String {
    let decoded = decode_escapes(name.trim());
    decoded
        .strip_suffix('.')
        .unwrap_or(&decoded)
        .to_ascii_lowercase()
}

/// Whether two names refer to the same DNS node
pub fn names_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn decode_escapes(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_triplet(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Some(c) = char::from_u32(value) {
                out.push(c);
                i += 4;
                continue;
            }
        }
        // `i` always sits on a char boundary.
        let c = name[i..].chars().next().unwrap_or('\u{fffd}');
        out.push(c);
        i += c.len_utf8();
    }

    out
}

fn is_octal_triplet(bytes: &[u8]) -> bool {
    bytes.len() == 3 && bytes.iter().all(|b| (b'0'..=b'7').contains(b))
}

/// Validate a record name supplied at startup
///
/// Accepts an optional trailing dot and a leading `*` wildcard label.
pub fn validate_record_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::config("Domain name cannot be empty"));
    }

    let body = name.strip_suffix('.').unwrap_or(name);

    if body.len() > 253 {
        return Err(Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            body.len(),
            name
        )));
    }

    for (index, label) in body.split('.').enumerate() {
        if label.is_empty() {
            return Err(Error::config(format!(
                "Domain name has empty label: '{}'",
                name
            )));
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                 Valid: alphanumeric, hyphen and underscore only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
