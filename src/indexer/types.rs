//! Indexer type definitions.

use thiserror::Error;

use crate::config::MatcherError;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// The workspace root cannot be walked
    #[error("Invalid workspace path: {0}")]
    InvalidPath(String),
    /// Translation file patterns do not compile
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}
