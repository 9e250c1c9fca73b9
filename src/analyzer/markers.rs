//! Markers inside message text that must survive translation.

use std::collections::BTreeSet;

/// Numbered `QString::arg` placeholders (`%1`..`%99`, `%L1`).
#[must_use]
pub fn placeholders(text: &str) -> BTreeSet<u8> {
    let mut found = BTreeSet::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        if chars.peek() == Some(&'L') {
            chars.next();
        }
        let Some(first) = chars.peek().and_then(|c| c.to_digit(10)) else {
            continue;
        };
        if first == 0 {
            continue;
        }
        chars.next();
        let mut number = first;
        if let Some(second) = chars.peek().and_then(|c| c.to_digit(10)) {
            chars.next();
            number = number * 10 + second;
        }
        if let Ok(number) = u8::try_from(number) {
            found.insert(number);
        }
    }

    found
}

/// Keyboard accelerator: `&` before a character other than space or `&`.
/// `&&` is a literal ampersand.
#[must_use]
pub fn accelerator(text: &str) -> Option<char> {
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            continue;
        }
        match chars.next() {
            Some('&') | None => {}
            Some(next) if next.is_whitespace() => {}
            Some(next) => return Some(next),
        }
    }
    None
}

/// Sentence-ending punctuation, with full-width and script-specific forms
/// folded to their ASCII equivalent.
#[must_use]
pub fn ending_punctuation(text: &str, language: &str) -> Option<char> {
    let last = text.trim_end().chars().next_back()?;
    let folded = match last {
        '.' | '。' | '…' | '।' => '.',
        '?' | '？' | '؟' => '?',
        ';' if language.starts_with("el") => '?',
        '!' | '！' => '!',
        ':' | '：' => ':',
        _ => return None,
    };
    Some(folded)
}
