//! Document synchronization handlers.

use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};

use super::super::backend::Backend;

/// `textDocument/didOpen`
pub async fn handle_did_open(backend: &Backend, params: DidOpenTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(uri = %uri, "didOpen");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.insert(uri.clone(), params.text_document.text.clone());
    }

    backend.update_and_diagnose(uri, params.text_document.text).await;
}

/// `textDocument/didChange` (full sync)
pub async fn handle_did_change(backend: &Backend, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;

    let Some(change) = params.content_changes.into_iter().next_back() else {
        return;
    };

    if let Some(buffer) = backend.state.opened_files.lock().await.get_mut(&uri) {
        buffer.clone_from(&change.text);
    }

    backend.update_and_diagnose(uri, change.text).await;
}

/// `textDocument/didSave`
#[allow(clippy::unused_async)]
pub async fn handle_did_save(_backend: &Backend, params: DidSaveTextDocumentParams) {
    tracing::debug!(uri = %params.text_document.uri, "didSave");
}

/// `textDocument/didClose`: the file on disk becomes authoritative again.
pub async fn handle_did_close(backend: &Backend, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(uri = %uri, "didClose");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.remove(&uri);
    }

    // The buffer may differ from the file on disk.
    if let Some(path) = Backend::uri_to_path(&uri) {
        backend.reload_translation_file(&path).await;
    }
    backend.client.publish_diagnostics(uri, Vec::new(), None).await;
    backend.send_diagnostics_to_opened_files().await;
}
