//! Salsa database definition.

/// Database trait for the language server queries.
#[salsa::db]
pub trait LinguistDatabase: salsa::Database {}

/// Database implementation.
#[salsa::db]
#[derive(Clone, Default)]
pub struct LinguistDatabaseImpl {
    /// Salsa storage.
    storage: salsa::Storage<Self>,
}

impl std::fmt::Debug for LinguistDatabaseImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinguistDatabaseImpl").finish_non_exhaustive()
    }
}

#[salsa::db]
impl salsa::Database for LinguistDatabaseImpl {}

#[salsa::db]
impl LinguistDatabase for LinguistDatabaseImpl {}
