//! Feature handlers: `hover`, `goto_definition` and `references`.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    GotoDefinitionParams,
    GotoDefinitionResponse,
    Hover,
    HoverContents,
    HoverParams,
    Location,
    MarkupContent,
    MarkupKind,
    ReferenceParams,
};

use super::super::backend::Backend;
use crate::interned::MessageKey;
use crate::types::SourcePosition;

/// `textDocument/hover`
pub async fn handle_hover(backend: &Backend, params: HoverParams) -> Result<Option<Hover>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Hover request");

    if !backend.wait_for_translations().await {
        tracing::debug!("Hover request timeout - translations not indexed yet");
        return Ok(None);
    }

    let Some(file) = backend.translation_for_uri(&uri).await else {
        return Ok(None);
    };
    let Some(id) = backend.message_id_at(file, SourcePosition::from(position)).await else {
        tracing::debug!("No message found at position");
        return Ok(None);
    };

    let hover_text = {
        let primary_languages =
            backend.config_manager.lock().await.get_settings().primary_languages.clone();
        let current_language = backend.state.current_language().await;

        let (db, translations) = backend.state.lock_db_and_translations().await;
        let key = MessageKey::new(&*db, id.context.clone(), id.source.clone(), id.comment.clone());
        crate::ide::hover::generate_hover_content(
            &*db,
            key,
            file,
            &translations,
            current_language.as_deref(),
            primary_languages.as_deref(),
        )
    };

    let Some(hover_text) = hover_text else {
        tracing::debug!(context = %id.context, source = %id.source, "No hover content");
        return Ok(None);
    };

    Ok(Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover_text,
        }),
        range: None,
    }))
}

/// `textDocument/definition`: the message in the other locales.
pub async fn handle_goto_definition(
    backend: &Backend,
    params: GotoDefinitionParams,
) -> Result<Option<GotoDefinitionResponse>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Goto Definition request");

    if !backend.wait_for_translations().await {
        tracing::debug!("Goto Definition request - translations not indexed yet");
        return Ok(None);
    }

    let Some(file) = backend.translation_for_uri(&uri).await else {
        return Ok(None);
    };
    let Some(id) = backend.message_id_at(file, SourcePosition::from(position)).await else {
        tracing::debug!("No message found at position");
        return Ok(None);
    };

    let locations = {
        let (db, translations) = backend.state.lock_db_and_translations().await;
        let key = MessageKey::new(&*db, id.context, id.source, id.comment);
        crate::ide::goto_definition::find_definitions(&*db, key, file, &translations)
    };

    tracing::debug!("Found {} definitions", locations.len());

    if locations.is_empty() { Ok(None) } else { Ok(Some(GotoDefinitionResponse::Array(locations))) }
}

/// `textDocument/references`: every file holding the message.
pub async fn handle_references(
    backend: &Backend,
    params: ReferenceParams,
) -> Result<Option<Vec<Location>>> {
    let uri = params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "References request");

    if !backend.workspace_indexer.is_indexing_completed() {
        tracing::debug!("References request - indexing not completed, returning empty results");
        return Ok(Some(vec![]));
    }

    let Some(file) = backend.translation_for_uri(&uri).await else {
        return Ok(None);
    };
    let Some(id) = backend.message_id_at(file, SourcePosition::from(position)).await else {
        tracing::debug!("No message found at position");
        return Ok(None);
    };

    let mut locations = {
        let (db, translations) = backend.state.lock_db_and_translations().await;
        let key = MessageKey::new(&*db, id.context, id.source, id.comment);
        crate::ide::references::find_references(&*db, key, &translations)
    };

    if !params.context.include_declaration {
        locations.retain(|location| location.uri != uri);
    }

    tracing::debug!("Found {} references", locations.len());

    if locations.is_empty() { Ok(None) } else { Ok(Some(locations)) }
}
