//! LSP backend: shared helpers and the `LanguageServer` implementation.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::time::Duration;

use salsa::Setter;
use serde_json::Value;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeActionParams,
    CodeActionResponse,
    DidChangeConfigurationParams,
    DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
    ExecuteCommandParams,
    FileChangeType,
    FileSystemWatcher,
    GlobPattern,
    GotoDefinitionParams,
    GotoDefinitionResponse,
    Hover,
    HoverParams,
    InitializeParams,
    InitializeResult,
    InitializedParams,
    Location,
    MessageType,
    NumberOrString,
    ProgressParams,
    ProgressParamsValue,
    ReferenceParams,
    Registration,
    Url,
    WorkDoneProgress,
    WorkDoneProgressBegin,
    WorkDoneProgressEnd,
    WorkDoneProgressReport,
    WorkspaceFolder,
    notification::Progress,
};
use tower_lsp::{
    Client,
    LanguageServer,
};

use super::handlers;
use super::state::ServerState;
use crate::config::{
    CONFIG_FILE_NAME,
    ConfigManager,
    FileMatcher,
};
use crate::db::LinguistDatabaseImpl;
use crate::indexer::WorkspaceIndexer;
use crate::input::translation::{
    TranslationFile,
    detect_language,
    detect_project,
    looks_like_linguist,
    translation_file_from_text,
};
use crate::ir::MessageId;
use crate::syntax::message_at_position;
use crate::types::SourcePosition;

/// How long requests wait for the initial indexing before giving up.
const INDEXING_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress token of workspace indexing.
const INDEXING_PROGRESS_TOKEN: &str = "workspace-indexing";

/// LSP Backend
#[derive(Clone)]
pub struct Backend {
    /// LSP client
    pub client: Client,
    /// Settings of the workspace
    pub config_manager: Arc<Mutex<ConfigManager>>,
    /// Tracks the indexing of the workspace
    pub workspace_indexer: Arc<WorkspaceIndexer>,
    /// Database and documents
    pub state: ServerState,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config_manager", &"<ConfigManager>")
            .field("workspace_indexer", &self.workspace_indexer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Creates a backend with empty state, for `LspService::new`.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config_manager: Arc::new(Mutex::new(ConfigManager::new())),
            workspace_indexer: Arc::new(WorkspaceIndexer::new()),
            state: ServerState::new(LinguistDatabaseImpl::default()),
        }
    }

    /// Workspace folders reported by the client (empty when none are open).
    ///
    /// # Errors
    /// Communication with the client failed.
    pub(crate) async fn get_workspace_folders(&self) -> Result<Vec<WorkspaceFolder>> {
        self.client.workspace_folders().await.map(Option::unwrap_or_default)
    }

    /// Local path of a `file://` URI.
    pub(crate) fn uri_to_path(uri: &Url) -> Option<PathBuf> {
        uri.to_file_path()
            .map_err(|()| tracing::warn!("Failed to convert URI to file path: {}", uri))
            .ok()
    }

    /// True for `.linguist-ls.json` in any directory.
    pub(crate) fn is_config_file(path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME)
    }

    /// Whether the path matches the configured translation file patterns.
    pub(crate) async fn is_translation_file(&self, path: &Path) -> bool {
        let config_manager = self.config_manager.lock().await;
        let Some(root) = config_manager.workspace_root().cloned() else {
            return path.extension().is_some_and(|ext| ext == "ts");
        };
        match FileMatcher::new(root, config_manager.get_settings()) {
            Ok(matcher) => matcher.is_translation_file(path),
            Err(error) => {
                tracing::warn!(%error, "Invalid translation file patterns");
                false
            }
        }
    }

    /// Waits for the initial indexing. Returns `false` on timeout.
    pub(crate) async fn wait_for_translations(&self) -> bool {
        self.workspace_indexer.wait_for_completion(INDEXING_WAIT_TIMEOUT).await
    }

    /// Stored translation file for a document URI.
    pub(crate) async fn translation_for_uri(&self, uri: &Url) -> Option<TranslationFile> {
        let path = Self::uri_to_path(uri)?;
        self.state.find_translation(&path.to_string_lossy()).await
    }

    /// Key of the message under the cursor.
    pub(crate) async fn message_id_at(
        &self,
        file: TranslationFile,
        position: SourcePosition,
    ) -> Option<MessageId> {
        let db = self.state.db.lock().await;
        let key = message_at_position(&*db, file, position)?;
        Some(MessageId {
            context: key.context(&*db).clone(),
            source: key.source(&*db).clone(),
            comment: key.comment(&*db).clone(),
        })
    }

    /// Indexes every workspace folder, reporting `$/progress` to the client.
    pub(crate) async fn index_workspace_folders(&self) {
        let workspace_folders = match self.get_workspace_folders().await {
            Ok(folders) => folders,
            Err(error) => {
                tracing::error!(%error, "Failed to get workspace folders");
                return;
            }
        };
        tracing::info!(count = workspace_folders.len(), "Indexing workspace folders");

        for folder in workspace_folders {
            if let Ok(workspace_path) = folder.uri.to_file_path() {
                self.index_folder(&workspace_path).await;
            }
        }
    }

    /// Indexes one folder with progress notifications.
    async fn index_folder(&self, workspace_path: &Path) {
        let token = NumberOrString::String(INDEXING_PROGRESS_TOKEN.to_string());
        self.send_progress(
            &token,
            WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: "Indexing translations".to_string(),
                cancellable: Some(false),
                message: Some("Starting...".to_string()),
                percentage: Some(0),
            }),
        )
        .await;

        let config_manager = self.config_manager.lock().await;
        let db = self.state.db.lock().await.clone();
        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<(u32, u32)>(100);

        let progress_task = {
            let backend = self.clone();
            let token = token.clone();
            tokio::spawn(async move {
                while let Some((current, total)) = progress_rx.recv().await {
                    let percentage = current.saturating_mul(100).checked_div(total).unwrap_or(0);
                    backend
                        .send_progress(
                            &token,
                            WorkDoneProgress::Report(WorkDoneProgressReport {
                                cancellable: Some(false),
                                message: Some(format!("Processing files: {current}/{total}")),
                                percentage: Some(percentage),
                            }),
                        )
                        .await;
                }
            })
        };

        let progress_callback = move |current: u32, total: u32| {
            let _ = progress_tx.try_send((current, total));
        };

        let index_result = self
            .workspace_indexer
            .index_workspace(
                db,
                workspace_path,
                &config_manager,
                self.state.translations.clone(),
                Some(progress_callback),
            )
            .await;

        drop(config_manager);
        let _ = progress_task.await;

        let message = match index_result {
            Ok(()) => "Translation indexing complete".to_string(),
            Err(error) => {
                self.client
                    .log_message(MessageType::ERROR, format!("error indexing workspace: {error}"))
                    .await;
                format!("Indexing failed: {error}")
            }
        };
        self.send_progress(
            &token,
            WorkDoneProgress::End(WorkDoneProgressEnd { message: Some(message) }),
        )
        .await;
    }

    /// Sends one `$/progress` notification.
    async fn send_progress(&self, token: &NumberOrString, progress: WorkDoneProgress) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(progress),
            })
            .await;
    }

    /// Drops every cached result and indexes the workspace again.
    pub(crate) async fn reindex_workspace(&self) {
        self.client.log_message(MessageType::INFO, "Reindexing workspace...").await;
        self.workspace_indexer.reset();

        {
            let (mut db, mut translations) = self.state.lock_db_and_translations().await;
            *db = LinguistDatabaseImpl::default();
            translations.clear();
        }

        self.index_workspace_folders().await;
        self.restore_open_buffers().await;
        self.workspace_indexer.mark_completed();
        self.send_diagnostics_to_opened_files().await;
    }

    /// Puts the editor text of open documents back over what indexing read
    /// from disk.
    async fn restore_open_buffers(&self) {
        for (uri, text) in self.state.open_buffers().await {
            let Some(path) = Self::uri_to_path(&uri) else {
                continue;
            };
            if looks_like_linguist(&text) && self.is_translation_file(&path).await {
                self.upsert_translation(&path, text).await;
            }
        }
    }

    /// Reloads settings after the config file changed, then reindexes.
    pub(crate) async fn handle_config_file_change(&self, path: &Path, change: FileChangeType) {
        tracing::info!(path = %path.display(), ?change, "Config file changed");

        let mut config_manager = self.config_manager.lock().await;
        let workspace_root = config_manager
            .workspace_root()
            .cloned()
            .or_else(|| path.parent().map(Path::to_path_buf));
        if let Err(error) = config_manager.load_settings(workspace_root) {
            drop(config_manager);
            self.client
                .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
                .await;
            return;
        }
        drop(config_manager);

        self.reindex_workspace().await;
    }

    /// Re-reads a translation file changed on disk.
    ///
    /// Files open in the editor are skipped: their buffer is authoritative.
    pub(crate) async fn reload_translation_file(&self, path: &Path) {
        if let Ok(uri) = Url::from_file_path(path)
            && self.state.opened_files.lock().await.contains_key(&uri)
        {
            return;
        }

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Failed to read translation file");
                return;
            }
        };

        if looks_like_linguist(&text) {
            self.upsert_translation(path, text).await;
        } else {
            self.remove_translation_file(path).await;
        }
    }

    /// Stops tracking a deleted (or no longer Linguist) file.
    pub(crate) async fn remove_translation_file(&self, path: &Path) {
        let file_path = path.to_string_lossy();
        let (db, mut translations) = self.state.lock_db_and_translations().await;
        translations.retain(|file| file.file_path(&*db) != &*file_path);
    }

    /// Updates the stored text of a file, or starts tracking it.
    ///
    /// Language and project are detected again on every update since the
    /// `language` attribute may have been edited.
    async fn upsert_translation(&self, path: &Path, text: String) {
        let file_path = path.to_string_lossy();
        let (mut db, mut translations) = self.state.lock_db_and_translations().await;

        if let Some(existing) =
            translations.iter().copied().find(|file| file.file_path(&*db) == &*file_path)
        {
            let language = detect_language(path, &text);
            if existing.language(&*db) != language {
                tracing::debug!(path = %file_path, %language, "Language changed");
                existing.set_language(&mut *db).to(language);
            }
            let project = detect_project(path);
            if existing.project(&*db) != &project {
                existing.set_project(&mut *db).to(project);
            }
            if existing.text(&*db) != &text {
                existing.set_text(&mut *db).to(text);
            }
            return;
        }

        let file = translation_file_from_text(&*db, path, text);
        translations.push(file);
    }

    /// Applies editor text and republishes diagnostics.
    pub(crate) async fn update_and_diagnose(&self, uri: Url, text: String) {
        let Some(path) = Self::uri_to_path(&uri) else {
            return;
        };
        if !looks_like_linguist(&text) || !self.is_translation_file(&path).await {
            tracing::debug!(uri = %uri, "Not a translation file");
            return;
        }

        self.upsert_translation(&path, text).await;
        self.send_diagnostics_to_opened_files().await;
    }

    /// Publishes diagnostics for every open translation file.
    ///
    /// All of them are refreshed since `missing-in-locale` depends on the
    /// sibling files.
    pub(crate) async fn send_diagnostics_to_opened_files(&self) {
        let settings = self.config_manager.lock().await.get_settings().clone();

        let published = {
            let db = self.state.db.lock().await;
            let translations = self.state.translations.lock().await;
            let opened_files = self.state.opened_files.lock().await;

            opened_files
                .keys()
                .filter_map(|uri| {
                    let path = Self::uri_to_path(uri)?;
                    let file_path = path.to_string_lossy();
                    let file =
                        translations.iter().copied().find(|t| t.file_path(&*db) == &*file_path)?;
                    let diagnostics = crate::ide::diagnostics::generate_diagnostics(
                        &*db,
                        file,
                        &translations,
                        &settings,
                    );
                    Some((uri.clone(), diagnostics))
                })
                .collect::<Vec<_>>()
        };

        for (uri, diagnostics) in published {
            tracing::debug!(uri = %uri, count = diagnostics.len(), "Publishing diagnostics");
            self.client.publish_diagnostics(uri, diagnostics, None).await;
        }
    }

    /// Asks the client to watch translation files and the config file.
    pub(crate) async fn register_file_watchers(&self) {
        let include_patterns =
            self.config_manager.lock().await.get_settings().translation_files.include_patterns.clone();

        let watchers = include_patterns
            .into_iter()
            .chain(std::iter::once(format!("**/{CONFIG_FILE_NAME}")))
            .map(|pattern| FileSystemWatcher { glob_pattern: GlobPattern::String(pattern), kind: None })
            .collect();

        let register_options = match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions {
            watchers,
        }) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(%error, "Failed to serialize file watcher options");
                return;
            }
        };

        let registration = Registration {
            id: "linguist-file-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };

        if let Err(error) = self.client.register_capability(vec![registration]).await {
            tracing::warn!(%error, "Failed to register file watchers");
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handlers::lifecycle::handle_initialize(self, params).await
    }

    async fn initialized(&self, params: InitializedParams) {
        handlers::lifecycle::handle_initialized(self, params).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handlers::lifecycle::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handlers::document_sync::handle_did_open(self, params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        handlers::document_sync::handle_did_change(self, params).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        handlers::document_sync::handle_did_save(self, params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handlers::document_sync::handle_did_close(self, params).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        handlers::workspace::handle_did_change_configuration(self, params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        handlers::workspace::handle_did_change_watched_files(self, params).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        handlers::features::handle_hover(self, params).await
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        handlers::features::handle_goto_definition(self, params).await
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        handlers::features::handle_references(self, params).await
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        handlers::code_action::handle_code_action(self, params).await
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        handlers::execute_command::handle_execute_command(self, params).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::config("/ws/.linguist-ls.json", true)]
    #[case::nested_config("/ws/sub/.linguist-ls.json", true)]
    #[case::translation("/ws/locale/bitcoin_da.ts", false)]
    #[case::similar_name("/ws/linguist-ls.json", false)]
    fn test_is_config_file(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(Backend::is_config_file(Path::new(path)), expected);
    }

    #[googletest::test]
    fn test_uri_to_path() {
        let uri = Url::parse("file:///ws/locale/bitcoin_da.ts").unwrap();

        expect_that!(Backend::uri_to_path(&uri), some(eq(&PathBuf::from("/ws/locale/bitcoin_da.ts"))));

        let remote = Url::parse("https://example.com/bitcoin_da.ts").unwrap();
        expect_that!(Backend::uri_to_path(&remote), none());
    }
}
