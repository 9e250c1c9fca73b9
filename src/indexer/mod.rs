//! Workspace discovery of translation files.

pub mod types;
pub mod workspace;

pub use types::IndexerError;
pub use workspace::WorkspaceIndexer;
