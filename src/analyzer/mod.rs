//! Validation of translation files.

pub mod checks;
pub mod markers;
pub mod types;

use std::collections::BTreeSet;

pub use checks::{
    analyze_catalog,
    malformed_issue,
    translation_stats,
};
pub use types::{
    AnalyzerOptions,
    Issue,
    IssueKind,
    Severity,
    TranslationStats,
};

use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::ir::{
    Message,
    MessageId,
    TranslationStatus,
};
use crate::syntax::{
    ParsedFile,
    parse_translation_file,
};

/// Issues of one file on its own. Memoized per file text and options.
#[salsa::tracked(returns(ref))]
#[allow(clippy::needless_pass_by_value)]
pub fn analyze_translation_file(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    options: AnalyzerOptions,
) -> Vec<Issue> {
    match parse_translation_file(db, file) {
        ParsedFile::Parsed(document) => analyze_catalog(document, &options),
        ParsedFile::Malformed(error) => vec![malformed_issue(error)],
    }
}

/// Keys of every message in a file, whatever its status.
#[salsa::tracked(returns(ref))]
pub fn message_ids(db: &dyn LinguistDatabase, file: TranslationFile) -> BTreeSet<MessageId> {
    parse_translation_file(db, file)
        .document()
        .map(|document| {
            document.catalog.messages().map(|(_, context, message)| message.id_in(context)).collect()
        })
        .unwrap_or_default()
}

/// Active messages of `file` that other locale files of the same project lack.
///
/// `translations` may contain `file` itself and files of other projects; both
/// are ignored. Malformed files are never reported as lacking a message.
pub fn missing_in_locale(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    translations: &[TranslationFile],
    options: &AnalyzerOptions,
) -> Vec<Issue> {
    let Some(document) = parse_translation_file(db, file).document() else {
        return Vec::new();
    };

    let siblings: Vec<(String, &BTreeSet<MessageId>)> = translations
        .iter()
        .filter(|other| **other != file && other.project(db) == file.project(db))
        .filter(|other| options.is_language_required(&other.language(db)))
        .filter(|other| parse_translation_file(db, **other).document().is_some())
        .map(|other| (other.language(db), message_ids(db, *other)))
        .collect();
    if siblings.is_empty() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    for (index, context, message) in document.catalog.messages() {
        if !message.translation.status.is_active() {
            continue;
        }
        let id = message.id_in(context);
        let mut languages: Vec<String> = siblings
            .iter()
            .filter(|(_, ids)| !ids.contains(&id))
            .map(|(language, _)| language.clone())
            .collect();
        if languages.is_empty() {
            continue;
        }
        languages.sort();
        languages.dedup();

        let Some(spans) = document.spans.message(index) else {
            continue;
        };
        let mut issue = Issue::new(
            IssueKind::MissingInLocale,
            spans.source,
            format!("'{}' is missing in: {}", message.source, languages.join(", ")),
        )
        .for_message(index);
        issue.languages = languages;
        issues.push(issue);
    }
    issues
}

/// Every issue of a file, including the cross-locale ones.
pub fn file_issues(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    translations: &[TranslationFile],
    options: &AnalyzerOptions,
) -> Vec<Issue> {
    let mut issues = analyze_translation_file(db, file, options.clone()).clone();
    issues.extend(missing_in_locale(db, file, translations, options));
    issues
}

/// Statistics of a stored file, `None` when it does not parse.
pub fn file_stats(db: &dyn LinguistDatabase, file: TranslationFile) -> Option<TranslationStats> {
    parse_translation_file(db, file).document().map(|document| translation_stats(&document.catalog))
}

/// An unfinished message with text can be marked finished.
#[must_use]
pub fn can_mark_finished(message: &Message) -> bool {
    message.translation.status == TranslationStatus::Unfinished && !message.translation.is_empty()
}
