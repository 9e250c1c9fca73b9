//! Translation file input definitions

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::db::LinguistDatabase;
use crate::ir::{
    LocaleTag,
    PluralRule,
};

/// Language assigned to files whose locale cannot be determined.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Salsa input representing one `.ts` translation file.
#[salsa::input(debug)]
pub struct TranslationFile {
    /// Locale tag, e.g. `da` or `pt_BR`.
    pub language: String,

    /// Files sharing a project are locale variants of the same catalog.
    #[returns(ref)]
    pub project: String,

    #[returns(ref)]
    pub file_path: String,

    #[returns(ref)]
    pub text: String,
}

/// Returns true for text that looks like a Linguist document.
///
/// `.ts` is also the TypeScript extension, so files are sniffed before they
/// are parsed.
#[must_use]
pub fn looks_like_linguist(text: &str) -> bool {
    let head = text.trim_start_matches('\u{feff}').trim_start();
    if !head.starts_with('<') {
        return false;
    }
    let prefix: String = head.chars().take(1024).collect();
    ["<TS>", "<TS ", "<TS\n", "<!DOCTYPE TS>"].iter().any(|marker| prefix.contains(marker))
}

/// Value of the `language` attribute of the `TS` root element.
fn root_language(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event().ok()? {
            Event::Start(start) | Event::Empty(start) => {
                if start.name().as_ref() != b"TS" {
                    return None;
                }
                return start
                    .attributes()
                    .flatten()
                    .find(|attribute| attribute.key.as_ref() == b"language")
                    .and_then(|attribute| attribute.unescape_value().ok())
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty());
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Splits a file stem into project and locale suffix.
///
/// `bitcoin_pt_BR` → (`bitcoin`, `pt_BR`), `bitcoin_da` → (`bitcoin`, `da`).
/// A suffix counts as a locale when its language has a plural rule.
fn split_locale_suffix(stem: &str) -> (&str, Option<&str>) {
    let separators: Vec<usize> = stem.match_indices(['_', '-', '.']).map(|(i, _)| i).collect();

    // Longest candidate first so `pt_BR` wins over `BR`.
    for &index in &separators {
        let Some(candidate) = stem.get(index + 1..) else {
            continue;
        };
        if is_locale(candidate) {
            return (stem.get(..index).unwrap_or_default(), Some(candidate));
        }
    }

    if is_locale(stem) { ("", Some(stem)) } else { (stem, None) }
}

/// Looks like `sv`, `pt_BR` or `zh-Hant-TW` with a known plural rule.
fn is_locale(candidate: &str) -> bool {
    let parts = candidate.split(['_', '-']).count();
    parts <= 3
        && LocaleTag::parse(candidate).is_some()
        && PluralRule::for_locale(candidate).is_some()
}

/// Detects the locale of a translation file.
///
/// The `language` attribute wins; otherwise the file name suffix is used
/// (`bitcoin_pt_BR.ts` → `pt_BR`).
#[must_use]
pub fn detect_language(file_path: &Path, text: &str) -> String {
    if let Some(language) = root_language(text) {
        return language;
    }

    file_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .and_then(|stem| split_locale_suffix(&stem).1.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}

/// Detects the project a translation file belongs to.
///
/// # Examples
/// - `locale/bitcoin_da.ts` → `bitcoin`
/// - `i18n/app-pt_BR.ts` → `app`
/// - `translations/sv.ts` → `translations` (parent directory)
#[must_use]
pub fn detect_project(file_path: &Path) -> String {
    let stem = file_path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
    let (project, _) = split_locale_suffix(&stem);
    if !project.is_empty() {
        return project.to_string();
    }

    file_path
        .parent()
        .and_then(Path::file_name)
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}

/// Creates a `TranslationFile` input from text already in memory.
pub fn translation_file_from_text(
    db: &dyn LinguistDatabase,
    file_path: &Path,
    text: String,
) -> TranslationFile {
    let language = detect_language(file_path, &text);
    let project = detect_project(file_path);
    tracing::debug!(path = %file_path.display(), %language, %project, "Creating translation file");
    TranslationFile::new(db, language, project, file_path.to_string_lossy().to_string(), text)
}

/// Loads a translation file from disk.
///
/// Returns `Ok(None)` when the file is not a Linguist document (for example a
/// TypeScript source).
///
/// # Errors
/// Returns the I/O error if the file cannot be read.
pub fn load_translation_file(
    db: &dyn LinguistDatabase,
    file_path: &Path,
) -> std::io::Result<Option<TranslationFile>> {
    let text = std::fs::read_to_string(file_path)?;
    if !looks_like_linguist(&text) {
        tracing::debug!(path = %file_path.display(), "Skipping non-Linguist .ts file");
        return Ok(None);
    }
    Ok(Some(translation_file_from_text(db, file_path, text)))
}
