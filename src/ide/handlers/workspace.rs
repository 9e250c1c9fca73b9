//! Workspace-related handlers.

use std::path::PathBuf;

use tower_lsp::lsp_types::{
    DidChangeConfigurationParams,
    DidChangeWatchedFilesParams,
    FileChangeType,
    MessageType,
};

use super::super::backend::Backend;

/// `workspace/didChangeConfiguration`
///
/// Invalid settings are reported to the user and the previous ones stay in
/// effect.
pub async fn handle_did_change_configuration(
    backend: &Backend,
    params: DidChangeConfigurationParams,
) {
    tracing::info!(settings = %params.settings, "didChangeConfiguration received");

    let result = backend.config_manager.lock().await.update_from_value(params.settings);
    if let Err(error) = result {
        tracing::error!(%error, "Rejected linguist settings");
        backend.client.show_message(MessageType::ERROR, format!("linguist: {error}")).await;
        return;
    }

    tracing::info!("Settings updated, reindexing");
    backend.reindex_workspace().await;
}

/// `workspace/didChangeWatchedFiles`
///
/// A config file change reindexes the whole workspace, which already covers
/// the translation files changed in the same batch.
pub async fn handle_did_change_watched_files(
    backend: &Backend,
    params: DidChangeWatchedFilesParams,
) {
    let changes: Vec<(PathBuf, FileChangeType)> = params
        .changes
        .into_iter()
        .filter_map(|change| Some((Backend::uri_to_path(&change.uri)?, change.typ)))
        .collect();

    let (config_changes, file_changes): (Vec<_>, Vec<_>) =
        changes.into_iter().partition(|(path, _)| Backend::is_config_file(path));

    if let Some((path, typ)) = config_changes.last() {
        backend.handle_config_file_change(path, *typ).await;
        return;
    }

    let mut reloaded = 0usize;
    for (path, typ) in file_changes {
        if !backend.is_translation_file(&path).await {
            continue;
        }
        match typ {
            FileChangeType::CREATED | FileChangeType::CHANGED => {
                backend.reload_translation_file(&path).await;
            }
            FileChangeType::DELETED => backend.remove_translation_file(&path).await,
            _ => continue,
        }
        reloaded += 1;
    }

    if reloaded > 0 {
        tracing::debug!(files = reloaded, "Translation files changed on disk");
        backend.send_diagnostics_to_opened_files().await;
    }
}
