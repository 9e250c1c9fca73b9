//! Hover implementation

use std::fmt::Write as _;

use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::interned::MessageKey;
use crate::ir::{
    FormText,
    Message,
    TranslationStatus,
    TranslationValue,
};
use crate::syntax::{
    locate_message,
    parse_translation_file,
};

/// Longest translation text shown before truncation.
const MAX_VALUE_LENGTH: usize = 80;

/// Generates hover content for a message.
///
/// Shows the message key and developer notes of the hovered file, then the
/// translation in every locale file of `project`.
///
/// # Sort order
/// 1. `current_language` (if set)
/// 2. `primary_languages` (configured order)
/// 3. the rest, alphabetically
pub fn generate_hover_content(
    db: &dyn LinguistDatabase,
    key: MessageKey<'_>,
    hovered: TranslationFile,
    translations: &[TranslationFile],
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) -> Option<String> {
    let context = key.context(db);
    let source = key.source(db);
    let comment = key.comment(db).as_deref();
    let project = hovered.project(db);

    let document = parse_translation_file(db, hovered).document()?;
    let hovered_message = locate_message(document, context, source, comment)?.message;

    let mut translations_found = Vec::new();
    for translation in translations.iter().filter(|t| t.project(db) == project) {
        let Some(document) = parse_translation_file(db, *translation).document() else {
            continue;
        };
        let display = locate_message(document, context, source, comment)
            .map_or_else(|| "_(missing)_".to_string(), |located| format_translation(located.message));
        translations_found.push((translation.language(db), display));
    }

    let mut content = format!("**Context:** `{context}`\n\n**Source:** {}\n", escape_markdown(source));
    if let Some(comment) = comment {
        let _ = write!(content, "\n**Disambiguation:** {}\n", escape_markdown(comment));
    }
    if let Some(note) = &hovered_message.extra_comment {
        let _ = write!(content, "\n**Developer comment:** {}\n", escape_markdown(note));
    }
    content.push('\n');

    sort_translations_by_priority(&mut translations_found, current_language, primary_languages);

    for (language, value) in translations_found {
        let _ = writeln!(content, "**{language}**: {value}");
    }

    Some(content)
}

/// One locale's translation with its status mark.
fn format_translation(message: &Message) -> String {
    let translation = &message.translation;
    let mark = match translation.status {
        _ if translation.is_empty() => return "_(untranslated)_".to_string(),
        TranslationStatus::Finished => "",
        TranslationStatus::Unfinished => " _(unfinished)_",
        TranslationStatus::Vanished | TranslationStatus::Obsolete => " _(obsolete)_",
    };

    match &translation.value {
        TranslationValue::Single(form) => format!("{}{mark}", format_form(form)),
        TranslationValue::Plural(forms) => {
            let mut result = format!("(plural){mark}");
            for (index, form) in forms.iter().enumerate() {
                let _ = write!(result, "\n  `[{index}]`: {}", format_form(form));
            }
            result
        }
    }
}

/// Primary text of a form, truncated and escaped.
fn format_form(form: &FormText) -> String {
    escape_markdown(&truncate_string(form.primary(), MAX_VALUE_LENGTH))
}

/// Keeps `*`, `_` and backticks in message text from turning into markup.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '*' | '_' | '`' | '[' | ']' | '<' | '>' | '\\') {
            escaped.push('\\');
        }
        if ch == '\n' {
            escaped.push(' ');
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

/// Truncates a string to `max_len` characters with an ellipsis.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Sorts `(language, text)` pairs by language priority.
fn sort_translations_by_priority(
    translations: &mut [(String, String)],
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) {
    translations.sort_by(|a, b| {
        let priority_a = get_language_priority(&a.0, current_language, primary_languages);
        let priority_b = get_language_priority(&b.0, current_language, primary_languages);
        priority_a.cmp(&priority_b)
    });
}

/// Language priority for sorting; variants are ordered highest first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum LanguagePriority<'a> {
    /// Current language (highest priority)
    Current,
    /// Primary language with its position index
    Primary(usize),
    /// Other language (sorted alphabetically)
    Other(&'a str),
}

/// Computes the priority of a language.
pub(crate) fn get_language_priority<'a>(
    lang: &'a str,
    current_language: Option<&str>,
    primary_languages: Option<&[String]>,
) -> LanguagePriority<'a> {
    if current_language.is_some_and(|c| c == lang) {
        return LanguagePriority::Current;
    }

    if let Some(primaries) = primary_languages
        && let Some(pos) = primaries.iter().position(|p| p == lang)
    {
        return LanguagePriority::Primary(pos);
    }

    LanguagePriority::Other(lang)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::db::LinguistDatabaseImpl;
    use crate::test_utils::{
        create_project,
        create_translation,
    };

    fn key<'db>(db: &'db LinguistDatabaseImpl, source: &str) -> MessageKey<'db> {
        MessageKey::new(db, "AddressBookPage".to_string(), source.to_string(), None)
    }

    #[googletest::test]
    fn test_hover_lists_every_locale() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);

        let content = generate_hover_content(
            &db,
            key(&db, "Create a new address"),
            files[0],
            &files,
            None,
            None,
        )
        .unwrap();

        expect_that!(content, contains_substring("**Context:** `AddressBookPage`"));
        expect_that!(content, contains_substring("**Source:** Create a new address"));
        expect_that!(
            content,
            contains_substring("**Developer comment:** Tooltip of the new address button")
        );
        expect_that!(
            content,
            ends_with("**da**: Opret en ny adresse\n**sv**: Skapa ny adress\n")
        );
    }

    #[googletest::test]
    fn test_hover_marks_status_and_plural_forms() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);

        let copy = generate_hover_content(&db, key(&db, "&Copy"), files[0], &files, None, None)
            .unwrap();
        let blocks =
            generate_hover_content(&db, key(&db, "%n block(s)"), files[0], &files, None, None)
                .unwrap();

        expect_that!(copy, contains_substring("**da**: &Kopiér _(unfinished)_"));
        expect_that!(blocks, contains_substring("**da**: (plural)\n  `[0]`: %n blok"));
        expect_that!(blocks, contains_substring("**sv**: _(missing)_"));
    }

    #[googletest::test]
    fn test_hover_ignores_other_projects() {
        let db = LinguistDatabaseImpl::default();
        let mut files = create_project(&db);
        files.push(create_translation(&db, "/ws/qt/qtbase_de.ts", crate::test_utils::DANISH));

        let content = generate_hover_content(
            &db,
            key(&db, "Create a new address"),
            files[0],
            &files,
            None,
            None,
        )
        .unwrap();

        expect_that!(content, not(contains_substring("**qtbase")));
        expect_that!(content.matches("**da**").count(), eq(1));
    }

    #[googletest::test]
    fn test_hover_none_for_unknown_message() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);

        let content =
            generate_hover_content(&db, key(&db, "Nonexistent"), files[0], &files, None, None);

        expect_that!(content, none());
    }

    #[rstest]
    #[case::current_first(Some("sv"), None, vec!["sv", "da", "pt_BR"])]
    #[case::primary_next(Some("sv"), Some(vec!["pt_BR".to_string()]), vec!["sv", "pt_BR", "da"])]
    #[case::alphabetical(None, None, vec!["da", "pt_BR", "sv"])]
    fn test_sort_translations_by_priority(
        #[case] current: Option<&str>,
        #[case] primary: Option<Vec<String>>,
        #[case] expected: Vec<&str>,
    ) {
        let mut translations: Vec<(String, String)> = ["pt_BR", "sv", "da"]
            .iter()
            .map(|lang| ((*lang).to_string(), String::new()))
            .collect();

        sort_translations_by_priority(&mut translations, current, primary.as_deref());

        let languages: Vec<&str> = translations.iter().map(|(lang, _)| lang.as_str()).collect();
        assert_eq!(languages, expected);
    }

    #[rstest]
    #[case::plain("Create a new address", "Create a new address")]
    #[case::markup("*bold* _x_", "\\*bold\\* \\_x\\_")]
    #[case::newline("a\nb", "a b")]
    fn test_escape_markdown(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape_markdown(text), expected);
    }
}
