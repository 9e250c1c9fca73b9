//! Code Action handler
//!
//! Handles `textDocument/codeAction` with quick fixes on the message under
//! the cursor.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeActionParams,
    CodeActionResponse,
};

use super::super::backend::Backend;
use crate::syntax::parse_translation_file;
use crate::types::{
    LineIndex,
    SourcePosition,
};

/// `textDocument/codeAction`
pub async fn handle_code_action(
    backend: &Backend,
    params: CodeActionParams,
) -> Result<Option<CodeActionResponse>> {
    let uri = &params.text_document.uri;
    let position = params.range.start;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Code Action request");

    let Some(file) = backend.translation_for_uri(uri).await else {
        return Ok(Some(vec![]));
    };

    let options = backend.config_manager.lock().await.get_settings().analyzer_options();

    let actions = {
        let db = backend.state.db.lock().await;
        let text = file.text(&*db);
        let Some(document) = parse_translation_file(&*db, file).document() else {
            return Ok(Some(vec![]));
        };
        let Some(offset) = LineIndex::new(text).offset(SourcePosition::from(position)) else {
            return Ok(Some(vec![]));
        };

        crate::ide::code_actions::generate_code_actions(
            document,
            text,
            offset,
            uri,
            &options,
            &params.context.diagnostics,
        )
    };

    tracing::debug!("Generated {} code actions", actions.len());

    Ok(Some(actions))
}
