//! linguist-language-server
//!
//! Language server and validator for Qt Linguist `.ts` translation files.

pub mod analyzer;
pub mod config;
pub mod db;
pub mod ide;
pub mod indexer;
pub mod input;
pub mod interned;
pub mod ir;
pub mod syntax;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use ide::backend::Backend;
