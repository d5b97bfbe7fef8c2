//! Extraction of values from decrypted `pass` entries.
//!
//! By convention the first line of an entry is the password and later lines
//! hold `key: value` metadata (`login: alice`, `url: ...`).

use keyhole_common::SecretValue;

/// Pick the requested value out of a decrypted entry.
///
/// Without a field this is the first line. With a field it is the value of the
/// first later line whose key matches case-insensitively. Returns `None` when
/// the selected value is empty or the field does not exist.
#[must_use]
pub fn extract(content: &[u8], field: Option<&str>) -> Option<SecretValue> {
    let mut lines = content.split(|b| *b == b'\n').map(strip_cr);
    let first = lines.next()?;

    let value = match field {
        None => first,
        Some(wanted) => lines.find_map(|line| field_value(line, wanted))?,
    };

    if value.is_empty() {
        None
    } else {
        Some(SecretValue::new(value.to_vec()))
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn field_value<'a>(line: &'a [u8], wanted: &str) -> Option<&'a [u8]> {
    let colon = line.iter().position(|b| *b == b':')?;
    let key = std::str::from_utf8(&line[..colon]).ok()?;
    if key.trim().eq_ignore_ascii_case(wanted) {
        Some(line[colon + 1..].trim_ascii())
    } else {
        None
    }
}
