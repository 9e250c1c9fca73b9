//! Converts validator issues into LSP diagnostics.

use serde_json::json;
use tower_lsp::lsp_types::{
    Diagnostic,
    DiagnosticSeverity,
    DiagnosticTag,
    NumberOrString,
};

use crate::analyzer::{
    Issue,
    Severity,
    file_issues,
};
use crate::config::LinguistSettings;
use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::types::LineIndex;

/// `source` of every diagnostic published by the server.
pub const DIAGNOSTIC_SOURCE: &str = "linguist";

/// Diagnostics of one translation file, honoring the `diagnostics` settings.
///
/// `translations` are the other files of the workspace, used for
/// `missing-in-locale`.
pub fn generate_diagnostics(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    translations: &[TranslationFile],
    settings: &LinguistSettings,
) -> Vec<Diagnostic> {
    tracing::debug!("Generating diagnostics for '{}'", file.file_path(db));

    let issues = file_issues(db, file, translations, &settings.analyzer_options());
    let line_index = LineIndex::new(file.text(db));

    issues
        .iter()
        .filter(|issue| settings.diagnostics.is_enabled(issue.kind))
        .map(|issue| to_diagnostic(issue, &line_index, settings.diagnostics.severity(issue.kind)))
        .collect()
}

/// Builds the diagnostic for one issue.
fn to_diagnostic(issue: &Issue, line_index: &LineIndex<'_>, severity: Severity) -> Diagnostic {
    let tags = issue.kind.is_unnecessary().then(|| vec![DiagnosticTag::UNNECESSARY]);
    let data = (!issue.languages.is_empty()).then(|| json!({ "languages": issue.languages }));

    Diagnostic {
        range: line_index.range(issue.span).into(),
        severity: Some(to_lsp_severity(severity)),
        code: Some(NumberOrString::String(issue.kind.code().to_string())),
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: issue.message.clone(),
        related_information: None,
        tags,
        data,
    }
}

/// Maps a configured severity onto the protocol's.
const fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}
