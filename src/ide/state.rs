//! State shared by the request handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};
use tower_lsp::lsp_types::Url;

use crate::db::LinguistDatabaseImpl;
use crate::input::translation::TranslationFile;

/// Server state, cloned into every handler.
///
/// # Lock order
///
/// When several locks are held at once, take them in this order:
/// 1. `db`
/// 2. `translations`
/// 3. `opened_files`
/// 4. `current_language`
#[derive(Clone)]
pub struct ServerState {
    /// Salsa database
    pub db: Arc<Mutex<LinguistDatabaseImpl>>,
    /// Every indexed translation file of the workspace
    pub translations: Arc<Mutex<Vec<TranslationFile>>>,
    /// Documents open in the editor with their latest buffer text
    pub opened_files: Arc<Mutex<HashMap<Url, String>>>,
    /// Locale listed first in hovers (`linguist.setCurrentLanguage`)
    pub current_language: Arc<Mutex<Option<String>>>,
}

impl ServerState {
    /// Creates state around a database, with nothing indexed.
    pub fn new(db: LinguistDatabaseImpl) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            translations: Arc::new(Mutex::new(Vec::new())),
            opened_files: Arc::new(Mutex::new(HashMap::new())),
            current_language: Arc::new(Mutex::new(None)),
        }
    }

    /// Locks `db` then `translations`.
    pub async fn lock_db_and_translations(
        &self,
    ) -> (MutexGuard<'_, LinguistDatabaseImpl>, MutexGuard<'_, Vec<TranslationFile>>) {
        let db = self.db.lock().await;
        let translations = self.translations.lock().await;
        (db, translations)
    }

    /// Stored file for a path, if indexed.
    pub async fn find_translation(&self, file_path: &str) -> Option<TranslationFile> {
        let (db, translations) = self.lock_db_and_translations().await;
        translations.iter().copied().find(|file| file.file_path(&*db) == file_path)
    }

    /// Buffer text of every open document.
    pub async fn open_buffers(&self) -> Vec<(Url, String)> {
        self.opened_files
            .lock()
            .await
            .iter()
            .map(|(uri, text)| (uri.clone(), text.clone()))
            .collect()
    }

    /// Language chosen with `linguist.setCurrentLanguage`.
    pub async fn current_language(&self) -> Option<String> {
        self.current_language.lock().await.clone()
    }

    /// `None` clears the selection.
    pub async fn set_current_language(&self, language: Option<String>) {
        *self.current_language.lock().await = language;
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("db", &"<LinguistDatabaseImpl>")
            .field("translations", &"<Vec<TranslationFile>>")
            .field("opened_files", &"<HashMap<Url, String>>")
            .field("current_language", &"<Option<String>>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::test_utils::create_project;

    #[googletest::test]
    fn new_creates_empty_state() {
        let state = ServerState::new(LinguistDatabaseImpl::default());

        expect_that!(Arc::strong_count(&state.db), eq(1));
        expect_that!(Arc::strong_count(&state.translations), eq(1));
        expect_that!(Arc::strong_count(&state.opened_files), eq(1));
        expect_that!(Arc::strong_count(&state.current_language), eq(1));
    }

    #[googletest::test]
    fn clone_shares_state() {
        let state1 = ServerState::new(LinguistDatabaseImpl::default());
        let state2 = state1.clone();

        expect_that!(Arc::strong_count(&state1.db), eq(2));
        expect_that!(Arc::ptr_eq(&state1.db, &state2.db), eq(true));
        expect_that!(Arc::ptr_eq(&state1.translations, &state2.translations), eq(true));
    }

    #[googletest::test]
    fn debug_impl_works() {
        let state = ServerState::new(LinguistDatabaseImpl::default());

        let debug_str = format!("{state:?}");

        expect_that!(debug_str, contains_substring("ServerState"));
        expect_that!(debug_str, contains_substring("translations"));
        expect_that!(debug_str, contains_substring("current_language"));
    }

    #[tokio::test]
    async fn find_translation_by_path() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);
        let state = ServerState::new(db);
        state.translations.lock().await.extend(files.iter().copied());

        let found = state.find_translation("/ws/locale/bitcoin_sv.ts").await;
        let missing = state.find_translation("/ws/locale/bitcoin_de.ts").await;

        assert!(found == Some(files[1]));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn current_language_round_trip() {
        let state = ServerState::new(LinguistDatabaseImpl::default());
        assert_eq!(state.current_language().await, None);

        state.set_current_language(Some("sv".to_string())).await;

        assert_eq!(state.clone().current_language().await.as_deref(), Some("sv"));
    }

    #[tokio::test]
    async fn open_buffers_return_latest_text() {
        let state = ServerState::new(LinguistDatabaseImpl::default());
        let uri = Url::parse("file:///ws/locale/bitcoin_da.ts").unwrap();
        state.opened_files.lock().await.insert(uri.clone(), "<TS/>".to_string());

        let buffers = state.open_buffers().await;

        assert_eq!(buffers, vec![(uri, "<TS/>".to_string())]);
    }
}
