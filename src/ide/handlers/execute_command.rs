//! Execute Command handler
//!
//! Handles `workspace/executeCommand` for the `linguist.*` commands.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{
    Value,
    json,
};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    ExecuteCommandParams,
    MessageType,
    TextEdit,
    Url,
    WorkspaceEdit,
};

use super::super::backend::Backend;
use crate::analyzer::file_stats;
use crate::syntax::{
    parse_translation_file,
    write_catalog,
};
use crate::types::LineIndex;

/// Statistics of one file, or of every file when no URI is given.
pub const GET_STATISTICS: &str = "linguist.getStatistics";
/// Marks every unfinished, non-empty translation of a file as finished.
pub const MARK_ALL_FINISHED: &str = "linguist.markAllFinished";
/// Rewrites a file in the canonical layout.
pub const NORMALIZE_FILE: &str = "linguist.normalizeFile";
/// Language listed first in hovers, or `null`.
pub const GET_CURRENT_LANGUAGE: &str = "linguist.getCurrentLanguage";
/// Sets (or resets with `null`) the language listed first in hovers.
pub const SET_CURRENT_LANGUAGE: &str = "linguist.setCurrentLanguage";

/// Commands advertised in the server capabilities.
pub const COMMANDS: [&str; 5] =
    [GET_STATISTICS, MARK_ALL_FINISHED, NORMALIZE_FILE, GET_CURRENT_LANGUAGE, SET_CURRENT_LANGUAGE];

/// `workspace/executeCommand`
pub async fn handle_execute_command(
    backend: &Backend,
    params: ExecuteCommandParams,
) -> Result<Option<Value>> {
    tracing::debug!(command = %params.command, "Execute Command request");

    match params.command.as_str() {
        GET_STATISTICS => handle_get_statistics(backend, &params.arguments).await,
        MARK_ALL_FINISHED => handle_mark_all_finished(backend, &params.arguments).await,
        NORMALIZE_FILE => handle_normalize_file(backend, &params.arguments).await,
        GET_CURRENT_LANGUAGE => Ok(Some(json!(backend.state.current_language().await))),
        SET_CURRENT_LANGUAGE => handle_set_current_language(backend, &params.arguments).await,
        _ => {
            tracing::warn!("Unknown command: {}", params.command);
            Ok(None)
        }
    }
}

/// `{ "uri": ... }` argument shared by the file commands.
#[derive(Debug, Deserialize)]
struct FileArgs {
    /// Document URI
    uri: Url,
}

/// `linguist.setCurrentLanguage` arguments
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetCurrentLanguageArgs {
    /// Language code (`null` resets)
    language: Option<String>,
}

/// Parses `arguments[0]`, logging invalid input.
fn first_argument<T: for<'de> Deserialize<'de>>(command: &str, arguments: &[Value]) -> Option<T> {
    let first = arguments.first()?.clone();
    serde_json::from_value(first)
        .map_err(|e| tracing::warn!("Invalid arguments for {}: {}", command, e))
        .ok()
}

/// `linguist.getStatistics`
///
/// # Arguments
/// * `arguments[0]` - optional `{ "uri": ... }`
///
/// # Returns
/// An array of `{ uri, language, project, stats }`, ordered by path.
/// Malformed files have `stats: null`.
async fn handle_get_statistics(backend: &Backend, arguments: &[Value]) -> Result<Option<Value>> {
    let only = first_argument::<FileArgs>(GET_STATISTICS, arguments)
        .and_then(|args| Backend::uri_to_path(&args.uri))
        .map(|path| path.to_string_lossy().into_owned());

    let (db, translations) = backend.state.lock_db_and_translations().await;
    let mut files: Vec<_> = translations
        .iter()
        .copied()
        .filter(|file| only.as_ref().is_none_or(|path| file.file_path(&*db) == path))
        .collect();
    files.sort_by(|a, b| a.file_path(&*db).cmp(b.file_path(&*db)));

    let entries: Vec<Value> = files
        .into_iter()
        .filter_map(|file| {
            let uri = Url::from_file_path(file.file_path(&*db)).ok()?;
            Some(json!({
                "uri": uri,
                "language": file.language(&*db),
                "project": file.project(&*db),
                "stats": file_stats(&*db, file),
            }))
        })
        .collect();

    Ok(Some(Value::Array(entries)))
}

/// `linguist.markAllFinished`
///
/// # Arguments
/// * `arguments[0]` - `{ "uri": ... }`
///
/// # Returns
/// The number of translations marked finished.
async fn handle_mark_all_finished(backend: &Backend, arguments: &[Value]) -> Result<Option<Value>> {
    let Some(args) = first_argument::<FileArgs>(MARK_ALL_FINISHED, arguments) else {
        return Ok(None);
    };
    let Some(file) = backend.translation_for_uri(&args.uri).await else {
        tracing::warn!(uri = %args.uri, "Not a translation file");
        return Ok(None);
    };

    let edits = {
        let db = backend.state.db.lock().await;
        let Some(document) = parse_translation_file(&*db, file).document() else {
            return Ok(None);
        };
        crate::ide::code_actions::mark_all_finished_edits(document, file.text(&*db))
    };

    let count = edits.len();
    if count > 0 {
        apply_edits(backend, args.uri, edits).await;
    }

    Ok(Some(json!(count)))
}

/// `linguist.normalizeFile`
///
/// # Arguments
/// * `arguments[0]` - `{ "uri": ... }`
///
/// # Returns
/// `true` when the file changed.
async fn handle_normalize_file(backend: &Backend, arguments: &[Value]) -> Result<Option<Value>> {
    let Some(args) = first_argument::<FileArgs>(NORMALIZE_FILE, arguments) else {
        return Ok(None);
    };
    let Some(file) = backend.translation_for_uri(&args.uri).await else {
        tracing::warn!(uri = %args.uri, "Not a translation file");
        return Ok(None);
    };

    let edit = {
        let db = backend.state.db.lock().await;
        let text = file.text(&*db);
        parse_translation_file(&*db, file).document().map(|document| {
            let normalized = write_catalog(&document.catalog);
            (normalized != *text).then(|| TextEdit {
                range: LineIndex::new(text).full_range().into(),
                new_text: normalized,
            })
        })
    };

    let Some(edit) = edit else {
        backend
            .client
            .show_message(MessageType::WARNING, "Cannot normalize a malformed translation file")
            .await;
        return Ok(Some(json!(false)));
    };

    let changed = edit.is_some();
    if let Some(edit) = edit {
        apply_edits(backend, args.uri, vec![edit]).await;
    }

    Ok(Some(json!(changed)))
}

/// Sends `workspace/applyEdit` for one document.
async fn apply_edits(backend: &Backend, uri: Url, edits: Vec<TextEdit>) {
    let changes = HashMap::from([(uri, edits)]);
    let edit_result = backend
        .client
        .apply_edit(WorkspaceEdit { changes: Some(changes), ..WorkspaceEdit::default() })
        .await;

    if let Err(e) = edit_result {
        tracing::error!("Failed to apply workspace edit: {}", e);
    }
}

/// `linguist.setCurrentLanguage`
///
/// Changes the locale listed first in hovers.
///
/// # Arguments
/// * `arguments[0]` - `SetCurrentLanguageArgs`; omitted resets
async fn handle_set_current_language(
    backend: &Backend,
    arguments: &[Value],
) -> Result<Option<Value>> {
    let parsed_args = if arguments.is_empty() {
        SetCurrentLanguageArgs { language: None }
    } else {
        let Some(args) = first_argument(SET_CURRENT_LANGUAGE, arguments) else {
            return Ok(None);
        };
        args
    };

    tracing::debug!(language = ?parsed_args.language, "Executing linguist.setCurrentLanguage");

    backend.state.set_current_language(parsed_args.language.clone()).await;

    backend
        .client
        .log_message(
            MessageType::INFO,
            format!("Current language set to: {:?}", parsed_args.language),
        )
        .await;

    Ok(None)
}
