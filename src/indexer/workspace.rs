//! Finds and loads the translation files of a workspace.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::time::Duration;

use futures::StreamExt;
use ignore::WalkBuilder;
use tokio::sync::{
    Mutex,
    Notify,
};

use crate::config::{
    ConfigManager,
    FileMatcher,
    LinguistSettings,
};
use crate::db::LinguistDatabaseImpl;
use crate::indexer::types::IndexerError;
use crate::input::translation::{
    TranslationFile,
    looks_like_linguist,
    translation_file_from_text,
};

/// Walks a workspace and turns its `.ts` catalogs into salsa inputs.
///
/// Requests that need every translation file wait on
/// [`WorkspaceIndexer::wait_for_completion`].
#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndexer {
    /// Set once the first indexing run finished.
    indexing_completed: Arc<AtomicBool>,
    /// Wakes requests waiting for indexing.
    completion_notify: Arc<Notify>,
}

impl WorkspaceIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_indexing_completed(&self) -> bool {
        self.indexing_completed.load(Ordering::Acquire)
    }

    /// Marks indexing as in progress again (before a reindex).
    pub fn reset(&self) {
        self.indexing_completed.store(false, Ordering::Release);
    }

    /// Marks indexing as finished and wakes every waiter.
    pub fn mark_completed(&self) {
        self.indexing_completed.store(true, Ordering::Release);
        self.completion_notify.notify_waiters();
    }

    /// Waits until indexing finished. Returns `false` on timeout.
    pub async fn wait_for_completion(&self, timeout: Duration) -> bool {
        let notified = self.completion_notify.notified();
        if self.is_indexing_completed() {
            return true;
        }
        tokio::time::timeout(timeout, notified).await.is_ok()
    }

    /// Files read concurrently: `indexing.numThreads`, or 80% of the CPU
    /// cores (at least 1).
    #[must_use]
    pub fn concurrency(settings: &LinguistSettings) -> usize {
        settings.indexing.num_threads.unwrap_or_else(|| num_cpus::get() * 4 / 5).max(1)
    }

    /// Indexes every translation file under `workspace_path`.
    ///
    /// Loaded files are added to `translations`, replacing entries with the
    /// same path. `progress` receives `(current, total)` after each file.
    ///
    /// # Errors
    /// - The workspace path is not a directory
    /// - Invalid file patterns
    pub async fn index_workspace<F>(
        &self,
        db: LinguistDatabaseImpl,
        workspace_path: &Path,
        config_manager: &ConfigManager,
        translations: Arc<Mutex<Vec<TranslationFile>>>,
        progress: Option<F>,
    ) -> Result<(), IndexerError>
    where
        F: Fn(u32, u32) + Send + Sync,
    {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");

        if !workspace_path.is_dir() {
            return Err(IndexerError::InvalidPath(workspace_path.display().to_string()));
        }

        let settings = config_manager.get_settings();
        let matcher = FileMatcher::new(workspace_path.to_path_buf(), settings)?;
        let files = Self::find_translation_files(&matcher);
        let total = u32::try_from(files.len()).unwrap_or(u32::MAX);
        let concurrency = Self::concurrency(settings);
        tracing::debug!(files = files.len(), concurrency, "Found translation file candidates");

        let mut reads = futures::stream::iter(files)
            .map(|path| async move {
                let content = tokio::fs::read_to_string(&path).await;
                (path, content)
            })
            .buffer_unordered(concurrency);

        let mut loaded = Vec::new();
        let mut current: u32 = 0;
        while let Some((path, content)) = reads.next().await {
            current = current.saturating_add(1);
            if let Some(progress) = &progress {
                progress(current, total);
            }

            let content = match content {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to read file {:?}: {}", path, e);
                    continue;
                }
            };
            if !looks_like_linguist(&content) {
                tracing::debug!("Skipping non-Linguist file {:?}", path);
                continue;
            }
            loaded.push(translation_file_from_text(&db, &path, content));
        }
        drop(reads);

        let paths: Vec<String> = loaded.iter().map(|file| file.file_path(&db).clone()).collect();
        tracing::info!(count = loaded.len(), "Loaded translation files");

        let mut translations = translations.lock().await;
        translations.retain(|file| !paths.contains(file.file_path(&db)));
        translations.extend(loaded);
        drop(translations);

        Ok(())
    }

    /// Walks the workspace honoring `.gitignore` and keeps matching files.
    fn find_translation_files(matcher: &FileMatcher) -> Vec<PathBuf> {
        let workspace_path = matcher.workspace_root();
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(workspace_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if matcher.is_translation_file(entry.path()) {
                found_files.push(entry.path().to_path_buf());
            }
        }

        found_files.sort();
        found_files
    }
}
