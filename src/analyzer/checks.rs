//! Structural and quality checks over a parsed catalog.

use std::collections::{
    BTreeSet,
    HashSet,
};

use super::markers::{
    accelerator,
    ending_punctuation,
    placeholders,
};
use super::types::{
    AnalyzerOptions,
    Issue,
    IssueKind,
    TranslationStats,
};
use crate::input::translation::UNKNOWN_LANGUAGE;
use crate::ir::{
    Catalog,
    FormText,
    Message,
    MessageIndex,
    TranslationStatus,
    TranslationValue,
};
use crate::syntax::{
    MessageSpans,
    ParseError,
    ParsedDocument,
};
use crate::types::ByteSpan;

/// Validates a parsed document.
///
/// Issues come out in document order: the root first, then each context with
/// its messages.
#[must_use]
pub fn analyze_catalog(document: &ParsedDocument, options: &AnalyzerOptions) -> Vec<Issue> {
    let catalog = &document.catalog;
    let mut issues = Vec::new();

    let language = catalog.language.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let expected_forms = language.and_then(|language| options.expected_form_count(language));
    match language {
        None => issues.push(Issue::new(
            IssueKind::UnknownLanguage,
            document.spans.root,
            "The TS element has no language attribute",
        )),
        Some(language) if expected_forms.is_none() => issues.push(Issue::new(
            IssueKind::UnknownLanguage,
            document.spans.root,
            format!("No plural rule is known for language '{language}'"),
        )),
        Some(_) => {}
    }

    let checker = MessageChecker { language: language.unwrap_or(UNKNOWN_LANGUAGE), expected_forms };

    for (context_index, (context, context_spans)) in
        catalog.contexts.iter().zip(&document.spans.contexts).enumerate()
    {
        if context.name.trim().is_empty() {
            issues.push(Issue::new(
                IssueKind::EmptyContextName,
                context_spans.name,
                "Context name is empty",
            ));
        }

        let mut seen = HashSet::new();
        for (message_index, (message, spans)) in
            context.messages.iter().zip(&context_spans.messages).enumerate()
        {
            let index = MessageIndex { context: context_index, message: message_index };
            if !seen.insert((message.source.as_str(), message.comment.as_deref())) {
                issues.push(
                    Issue::new(
                        IssueKind::DuplicateMessage,
                        spans.source,
                        format!(
                            "Message '{}' appears more than once in context '{}'",
                            message.source, context.name
                        ),
                    )
                    .for_message(index),
                );
            }
            checker.check(message, spans, index, &mut issues);
        }
    }

    issues
}

/// Per-message checks for one catalog.
struct MessageChecker<'a> {
    /// Target language of the catalog.
    language: &'a str,
    /// Numerus form count of the language, if known.
    expected_forms: Option<usize>,
}

impl MessageChecker<'_> {
    /// Appends the issues of one message.
    fn check(
        &self,
        message: &Message,
        spans: &MessageSpans,
        index: MessageIndex,
        issues: &mut Vec<Issue>,
    ) {
        let translation_span = spans.translation.map_or(spans.element, |t| t.element);
        let mut push = |kind, span, text: String| {
            issues.push(Issue::new(kind, span, text).for_message(index));
        };

        if message.source.is_empty() {
            push(IssueKind::EmptySource, spans.source, "Source text is empty".to_string());
        }

        if !message.translation.status.is_active() {
            push(
                IssueKind::Obsolete,
                spans.element,
                format!("'{}' is no longer used by the application", message.source),
            );
            return;
        }

        if message.translation.is_empty() {
            push(
                IssueKind::MissingTranslation,
                translation_span,
                format!("'{}' has no translation", message.source),
            );
        } else if message.translation.status == TranslationStatus::Unfinished {
            push(
                IssueKind::Unfinished,
                spans.translation.map_or(spans.element, |t| t.start_tag),
                format!("Translation of '{}' is unfinished", message.source),
            );
        }

        if let Some(text) = self.plural_problem(message) {
            push(IssueKind::PluralForms, translation_span, text);
        }

        let forms: Vec<&str> = message
            .translation
            .forms()
            .into_iter()
            .flat_map(FormText::texts)
            .filter(|text| !text.is_empty())
            .collect();
        if forms.is_empty() {
            return;
        }

        let source_placeholders = placeholders(&message.source);
        if let Some(form) = forms.iter().find(|form| placeholders(form) != source_placeholders) {
            push(
                IssueKind::PlaceholderMismatch,
                translation_span,
                format!(
                    "Placeholders differ: source has {}, translation '{form}' has {}",
                    describe_placeholders(&source_placeholders),
                    describe_placeholders(&placeholders(form)),
                ),
            );
        }

        let source_has_accelerator = accelerator(&message.source).is_some();
        if forms.iter().any(|form| accelerator(form).is_some() != source_has_accelerator) {
            let text = if source_has_accelerator {
                "Source has a keyboard accelerator but the translation does not"
            } else {
                "Translation has a keyboard accelerator but the source does not"
            };
            push(IssueKind::AcceleratorMismatch, translation_span, text.to_string());
        }

        let source_ending = ending_punctuation(&message.source, "en");
        if forms.iter().any(|form| ending_punctuation(form, self.language) != source_ending) {
            push(
                IssueKind::PunctuationMismatch,
                translation_span,
                format!(
                    "Ending punctuation differs from the source ({})",
                    source_ending.map_or_else(|| "none".to_string(), |c| format!("'{c}'")),
                ),
            );
        }
    }

    /// Mismatch between the numerus flag, the form count and the language.
    fn plural_problem(&self, message: &Message) -> Option<String> {
        match (&message.translation.value, message.numerus) {
            (TranslationValue::Single(_), true) => {
                Some("Message is numerus but the translation has no numerusform elements".into())
            }
            (TranslationValue::Plural(_), false) => {
                Some("Translation has numerusform elements but the message is not numerus".into())
            }
            (TranslationValue::Plural(forms), true) => {
                let expected = self.expected_forms?;
                (!forms.is_empty() && forms.len() != expected).then(|| {
                    format!(
                        "Expected {expected} plural form{} for '{}', found {}",
                        if expected == 1 { "" } else { "s" },
                        self.language,
                        forms.len()
                    )
                })
            }
            (TranslationValue::Single(_), false) => None,
        }
    }
}

/// `%1, %2` or `none`.
fn describe_placeholders(set: &BTreeSet<u8>) -> String {
    if set.is_empty() {
        return "none".to_string();
    }
    set.iter().map(|n| format!("%{n}")).collect::<Vec<_>>().join(", ")
}

/// The single issue reported for a document that fails to parse.
#[must_use]
pub fn malformed_issue(error: &ParseError) -> Issue {
    let offset = error.offset();
    Issue::new(IssueKind::Malformed, ByteSpan::new(offset, offset), error.to_string())
}

/// Counts messages by status.
#[must_use]
pub fn translation_stats(catalog: &Catalog) -> TranslationStats {
    let mut stats = TranslationStats::default();
    for (_, _, message) in catalog.messages() {
        stats.total += 1;
        if message.numerus {
            stats.numerus += 1;
        }
        let translation = &message.translation;
        if !translation.status.is_active() {
            stats.obsolete += 1;
        } else if translation.is_empty() {
            stats.missing += 1;
        } else if translation.status == TranslationStatus::Unfinished {
            stats.unfinished += 1;
        } else {
            stats.finished += 1;
        }
    }
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::syntax::parse_catalog;

    fn document(language: &str, body: &str) -> ParsedDocument {
        let text = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"{language}\">\n<context>\n    <name>AddressBookPage</name>\n{body}</context>\n</TS>\n"
        );
        parse_catalog(&text).unwrap()
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|issue| issue.kind).collect()
    }

    #[googletest::test]
    fn test_finished_danish_message_has_no_issues() {
        let document = document(
            "da",
            "    <message>\n        <source>Create a new address</source>\n        <translation>Opret en ny adresse</translation>\n    </message>\n",
        );

        let issues = analyze_catalog(&document, &AnalyzerOptions::default());

        expect_that!(issues, is_empty());
        expect_that!(translation_stats(&document.catalog).finished, eq(1));
    }

    #[rstest]
    #[case::missing(
        "<message><source>Copy</source><translation type=\"unfinished\"></translation></message>",
        vec![IssueKind::MissingTranslation]
    )]
    #[case::unfinished(
        "<message><source>Copy</source><translation type=\"unfinished\">Kopiér</translation></message>",
        vec![IssueKind::Unfinished]
    )]
    #[case::empty_source(
        "<message><source></source><translation>x</translation></message>",
        vec![IssueKind::EmptySource]
    )]
    #[case::obsolete_skips_quality_checks(
        "<message><source>Copy %1.</source><translation type=\"vanished\"></translation></message>",
        vec![IssueKind::Obsolete]
    )]
    #[case::placeholder(
        "<message><source>Copy %1</source><translation>Kopiér</translation></message>",
        vec![IssueKind::PlaceholderMismatch]
    )]
    #[case::accelerator(
        "<message><source>&amp;Copy</source><translation>Kopiér</translation></message>",
        vec![IssueKind::AcceleratorMismatch]
    )]
    #[case::punctuation(
        "<message><source>Sign the message?</source><translation>Underskriv beskeden</translation></message>",
        vec![IssueKind::PunctuationMismatch]
    )]
    #[case::numerus_without_forms(
        "<message numerus=\"yes\"><source>%n block(s)</source><translation>%n blokke</translation></message>",
        vec![IssueKind::PluralForms]
    )]
    #[case::wrong_form_count(
        "<message numerus=\"yes\"><source>%n block(s)</source><translation><numerusform>%n blok</numerusform></translation></message>",
        vec![IssueKind::PluralForms]
    )]
    #[case::right_form_count(
        "<message numerus=\"yes\"><source>%n block(s)</source><translation><numerusform>%n blok</numerusform><numerusform>%n blokke</numerusform></translation></message>",
        vec![]
    )]
    #[case::empty_numerus_is_only_missing(
        "<message numerus=\"yes\"><source>%n block(s)</source><translation type=\"unfinished\"/></message>",
        vec![IssueKind::MissingTranslation]
    )]
    fn test_message_checks(#[case] body: &str, #[case] expected: Vec<IssueKind>) {
        let document = document("da", body);

        let issues = analyze_catalog(&document, &AnalyzerOptions::default());

        assert_eq!(kinds(&issues), expected);
    }

    #[googletest::test]
    fn test_duplicate_message_points_at_second_source() {
        let document = document(
            "da",
            "<message><source>Copy</source><translation>Kopiér</translation></message>\n<message><source>Copy</source><translation>Kopiér</translation></message>\n<message><source>Copy</source><comment>menu</comment><translation>Kopiér</translation></message>\n",
        );

        let issues = analyze_catalog(&document, &AnalyzerOptions::default());

        expect_that!(kinds(&issues), elements_are![eq(&IssueKind::DuplicateMessage)]);
        expect_that!(issues[0].span, eq(document.spans.contexts[0].messages[1].source));
        expect_that!(
            issues[0].message_index,
            some(eq(MessageIndex { context: 0, message: 1 }))
        );
    }

    #[googletest::test]
    fn test_plural_count_follows_overrides_and_locale() {
        let body = "<message numerus=\"yes\"><source>%n week(s)</source><translation><numerusform>%n tydzień</numerusform><numerusform>%n tygodnie</numerusform></translation></message>";
        let polish = document("pl", body);
        let overridden = AnalyzerOptions {
            plural_forms: std::collections::BTreeMap::from([("pl".to_string(), 2)]),
            ..AnalyzerOptions::default()
        };

        expect_that!(
            kinds(&analyze_catalog(&polish, &AnalyzerOptions::default())),
            elements_are![eq(&IssueKind::PluralForms)]
        );
        expect_that!(analyze_catalog(&polish, &overridden), is_empty());
    }

    #[googletest::test]
    fn test_unknown_language_skips_plural_count() {
        let document = document(
            "tlh",
            "<message numerus=\"yes\"><source>%n ship(s)</source><translation><numerusform>%n</numerusform></translation></message>",
        );

        let issues = analyze_catalog(&document, &AnalyzerOptions::default());

        expect_that!(kinds(&issues), elements_are![eq(&IssueKind::UnknownLanguage)]);
        expect_that!(issues[0].span, eq(document.spans.root));
    }

    #[googletest::test]
    fn test_full_width_punctuation_is_normalized() {
        let document = document(
            "ja",
            "<message><source>Done.</source><translation>完了。</translation></message>",
        );

        expect_that!(analyze_catalog(&document, &AnalyzerOptions::default()), is_empty());
    }

    #[googletest::test]
    fn test_malformed_issue_uses_error_offset() {
        let error = parse_catalog("<TS>\n<context>\n</TS>").unwrap_err();

        let issue = malformed_issue(&error);

        expect_that!(issue.kind, eq(IssueKind::Malformed));
        expect_that!(issue.span.start, eq(error.offset()));
    }

    #[googletest::test]
    fn test_translation_stats_counts_each_status() {
        let document = document(
            "da",
            "<message><source>A</source><translation>a</translation></message>\n<message><source>B</source><translation type=\"unfinished\">b</translation></message>\n<message><source>C</source><translation type=\"unfinished\"></translation></message>\n<message><source>D</source><translation type=\"obsolete\">d</translation></message>\n<message numerus=\"yes\"><source>%n E</source><translation><numerusform>%n e</numerusform><numerusform>%n es</numerusform></translation></message>\n",
        );

        let stats = translation_stats(&document.catalog);

        expect_that!(
            stats,
            eq(TranslationStats {
                total: 5,
                finished: 2,
                unfinished: 1,
                missing: 1,
                obsolete: 1,
                numerus: 1,
            })
        );
    }
}
