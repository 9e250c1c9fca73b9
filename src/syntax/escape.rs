//! Text escaping for the `.ts` format.
//!
//! Besides the five XML entities, control characters other than tab, newline
//! and carriage return cannot appear in XML 1.0 text; the format stores them
//! as `<byte value="xNN"/>` elements. Attribute values cannot hold elements,
//! so there they become character references.

use std::fmt::Write as _;

/// Escapes text for element content.
#[must_use]
pub fn protect(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '\t' | '\n' | '\r' => result.push(ch),
            ch if u32::from(ch) < 0x20 => {
                let _ = write!(result, "<byte value=\"x{:x}\"/>", u32::from(ch));
            }
            ch => result.push(ch),
        }
    }
    result
}

/// Escapes an attribute value.
///
/// Whitespace other than the space is written as a character reference too,
/// since parsers normalize it to spaces inside attributes.
#[must_use]
pub fn protect_attribute(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            ch if u32::from(ch) < 0x20 => {
                let _ = write!(result, "&#x{:x};", u32::from(ch));
            }
            ch => result.push(ch),
        }
    }
    result
}

/// Decodes the `value` attribute of a `byte` element (`x1b` or `27`).
#[must_use]
pub fn decode_byte_value(value: &str) -> Option<char> {
    let code = match value.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
