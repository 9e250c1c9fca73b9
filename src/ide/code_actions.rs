//! Quick fixes on translation messages.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction,
    CodeActionKind,
    CodeActionOrCommand,
    Diagnostic,
    NumberOrString,
    TextEdit,
    Url,
    WorkspaceEdit,
};

use crate::analyzer::{
    AnalyzerOptions,
    IssueKind,
    can_mark_finished,
};
use crate::ir::{
    FormText,
    Message,
    Translation,
    TranslationStatus,
    TranslationValue,
};
use crate::syntax::{
    MessageSpans,
    ParsedDocument,
    translation_element,
};
use crate::types::{
    ByteSpan,
    LineIndex,
};

/// Code actions for the message under `offset`.
///
/// `diagnostics` are the ones sent with the request; those fixed by an
/// action are attached to it.
#[must_use]
pub fn generate_code_actions(
    document: &ParsedDocument,
    text: &str,
    offset: usize,
    uri: &Url,
    options: &AnalyzerOptions,
    diagnostics: &[Diagnostic],
) -> Vec<CodeActionOrCommand> {
    let Some(index) = document.spans.message_at(offset) else {
        return Vec::new();
    };
    let (Some(message), Some(spans)) =
        (document.catalog.message(index), document.spans.message(index))
    else {
        return Vec::new();
    };
    let Some(translation_span) = spans.translation.map(|t| t.element) else {
        return Vec::new();
    };

    let line_index = LineIndex::new(text);
    let language = document.catalog.language.as_deref().unwrap_or_default();
    let mut actions = Vec::new();

    if can_mark_finished(message) {
        let translation =
            Translation { status: TranslationStatus::Finished, ..message.translation.clone() };
        actions.push(quick_fix(
            "Mark translation as finished".to_string(),
            uri,
            vec![replace_translation(&line_index, translation_span, &translation)],
            related_diagnostics(diagnostics, IssueKind::Unfinished, &line_index, spans),
            true,
        ));
    }

    if let Some(expected) = options.expected_form_count(language)
        && let Some(translation) = fixed_plural_forms(message, expected)
    {
        actions.push(quick_fix(
            format!(
                "Use {expected} plural form{} for '{language}'",
                if expected == 1 { "" } else { "s" }
            ),
            uri,
            vec![replace_translation(&line_index, translation_span, &translation)],
            related_diagnostics(diagnostics, IssueKind::PluralForms, &line_index, spans),
            false,
        ));
    }

    actions
}

/// Edits marking every unfinished, non-empty translation of a document as
/// finished.
#[must_use]
pub fn mark_all_finished_edits(document: &ParsedDocument, text: &str) -> Vec<TextEdit> {
    let line_index = LineIndex::new(text);

    document
        .catalog
        .messages()
        .filter(|(_, _, message)| can_mark_finished(message))
        .filter_map(|(index, _, message)| {
            let span = document.spans.message(index)?.translation?.element;
            let translation =
                Translation { status: TranslationStatus::Finished, ..message.translation.clone() };
            Some(replace_translation(&line_index, span, &translation))
        })
        .collect()
}

/// The translation with exactly `expected` numerus forms, or `None` when it
/// already has them (or has no text to keep).
///
/// Added forms are empty and leave the translation unfinished.
fn fixed_plural_forms(message: &Message, expected: usize) -> Option<Translation> {
    if !message.numerus || message.translation.is_empty() {
        return None;
    }

    let mut forms = match &message.translation.value {
        TranslationValue::Plural(forms) if forms.len() == expected => return None,
        TranslationValue::Plural(forms) => forms.clone(),
        TranslationValue::Single(form) => vec![form.clone()],
    };

    let mut status = message.translation.status;
    if forms.len() < expected {
        forms.resize(expected, FormText::default());
        status = TranslationStatus::Unfinished;
    } else {
        forms.truncate(expected);
    }

    Some(Translation { status, value: TranslationValue::Plural(forms) })
}

/// Replaces a whole `translation` element, keeping the indentation in front
/// of it.
fn replace_translation(
    line_index: &LineIndex<'_>,
    span: ByteSpan,
    translation: &Translation,
) -> TextEdit {
    TextEdit {
        range: line_index.range(span).into(),
        new_text: translation_element(translation).trim_start().to_string(),
    }
}

/// Diagnostics of `kind` reported inside the message.
fn related_diagnostics(
    diagnostics: &[Diagnostic],
    kind: IssueKind,
    line_index: &LineIndex<'_>,
    spans: &MessageSpans,
) -> Vec<Diagnostic> {
    let message_range = line_index.range(spans.element);

    diagnostics
        .iter()
        .filter(|d| matches!(&d.code, Some(NumberOrString::String(code)) if code == kind.code()))
        .filter(|d| {
            message_range.contains(d.range.start.into()) && message_range.contains(d.range.end.into())
        })
        .cloned()
        .collect()
}

/// Builds a quick fix applying `edits` to one document.
fn quick_fix(
    title: String,
    uri: &Url,
    edits: Vec<TextEdit>,
    diagnostics: Vec<Diagnostic>,
    is_preferred: bool,
) -> CodeActionOrCommand {
    let changes = HashMap::from([(uri.clone(), edits)]);

    CodeActionOrCommand::CodeAction(CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: (!diagnostics.is_empty()).then_some(diagnostics),
        edit: Some(WorkspaceEdit { changes: Some(changes), ..WorkspaceEdit::default() }),
        is_preferred: Some(is_preferred),
        ..CodeAction::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use tower_lsp::lsp_types::{
        Position,
        Range,
    };

    use super::*;
    use crate::syntax::parse_catalog;
    use crate::test_utils::DANISH;

    fn uri() -> Url {
        Url::parse("file:///ws/locale/bitcoin_da.ts").unwrap()
    }

    fn offset_of(needle: &str) -> usize {
        DANISH.find(needle).unwrap()
    }

    fn single_edit(action: &CodeActionOrCommand) -> &TextEdit {
        let CodeActionOrCommand::CodeAction(action) = action else {
            panic!("expected a code action");
        };
        let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = &changes[&uri()];
        assert_eq!(edits.len(), 1);
        &edits[0]
    }

    fn title(action: &CodeActionOrCommand) -> &str {
        match action {
            CodeActionOrCommand::CodeAction(action) => &action.title,
            CodeActionOrCommand::Command(command) => &command.title,
        }
    }

    #[googletest::test]
    fn test_mark_unfinished_translation_as_finished() {
        let document = parse_catalog(DANISH).unwrap();

        let actions = generate_code_actions(
            &document,
            DANISH,
            offset_of("&amp;Kopiér"),
            &uri(),
            &AnalyzerOptions::default(),
            &[],
        );

        expect_that!(actions.len(), eq(1));
        expect_that!(title(&actions[0]), eq("Mark translation as finished"));
        let edit = single_edit(&actions[0]);
        expect_that!(edit.new_text, eq("<translation>&amp;Kopiér</translation>"));
        expect_that!(
            edit.range,
            eq(Range {
                start: Position { line: 12, character: 8 },
                end: Position { line: 12, character: 64 },
            })
        );
    }

    #[googletest::test]
    fn test_fix_plural_forms_pads_and_unfinishes() {
        let document = parse_catalog(DANISH).unwrap();

        let actions = generate_code_actions(
            &document,
            DANISH,
            offset_of("%n blok"),
            &uri(),
            &AnalyzerOptions::default(),
            &[],
        );

        expect_that!(actions.len(), eq(1));
        expect_that!(title(&actions[0]), eq("Use 2 plural forms for 'da'"));
        expect_that!(
            single_edit(&actions[0]).new_text,
            eq("<translation type=\"unfinished\">\n            <numerusform>%n blok</numerusform>\n            <numerusform></numerusform>\n        </translation>")
        );
    }

    #[googletest::test]
    fn test_fix_plural_forms_attaches_diagnostic() {
        let document = parse_catalog(DANISH).unwrap();
        let diagnostic = Diagnostic {
            range: Range {
                start: Position { line: 16, character: 8 },
                end: Position { line: 16, character: 21 },
            },
            code: Some(NumberOrString::String("plural-forms".to_string())),
            ..Diagnostic::default()
        };
        let unrelated = Diagnostic {
            range: Range {
                start: Position { line: 8, character: 8 },
                end: Position { line: 8, character: 21 },
            },
            ..diagnostic.clone()
        };

        let actions = generate_code_actions(
            &document,
            DANISH,
            offset_of("%n blok"),
            &uri(),
            &AnalyzerOptions::default(),
            &[diagnostic.clone(), unrelated],
        );

        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("expected a code action");
        };
        expect_that!(action.diagnostics, some(elements_are![eq(&diagnostic)]));
    }

    #[googletest::test]
    fn test_no_actions_for_finished_message() {
        let document = parse_catalog(DANISH).unwrap();

        let actions = generate_code_actions(
            &document,
            DANISH,
            offset_of("Opret en ny adresse"),
            &uri(),
            &AnalyzerOptions::default(),
            &[],
        );

        expect_that!(actions, is_empty());
    }

    #[googletest::test]
    fn test_no_actions_outside_messages() {
        let document = parse_catalog(DANISH).unwrap();

        let actions = generate_code_actions(
            &document,
            DANISH,
            offset_of("<name>"),
            &uri(),
            &AnalyzerOptions::default(),
            &[],
        );

        expect_that!(actions, is_empty());
    }

    #[googletest::test]
    fn test_mark_all_finished_edits() {
        let document = parse_catalog(DANISH).unwrap();

        let edits = mark_all_finished_edits(&document, DANISH);

        expect_that!(edits.len(), eq(1));
        expect_that!(edits[0].range.start, eq(Position { line: 12, character: 8 }));
    }

    #[googletest::test]
    fn test_fixed_plural_forms_truncates_extra_forms() {
        let message = Message {
            numerus: true,
            translation: Translation {
                status: TranslationStatus::Finished,
                value: TranslationValue::Plural(vec![
                    FormText::Plain("%n fil".to_string()),
                    FormText::Plain("%n filer".to_string()),
                    FormText::Plain("%n filerne".to_string()),
                ]),
            },
            ..Message::default()
        };

        let fixed = fixed_plural_forms(&message, 2).unwrap();

        expect_that!(fixed.status, eq(TranslationStatus::Finished));
        expect_that!(fixed.forms().len(), eq(2));
        expect_that!(fixed_plural_forms(&message, 3), none());
    }
}
