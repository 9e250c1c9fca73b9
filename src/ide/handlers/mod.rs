//! LSP handlers, split by feature.
//!
//! Used only by `ide::backend`.

#![allow(unreachable_pub)]

pub mod code_action;
pub mod document_sync;
pub mod execute_command;
pub mod features;
pub mod lifecycle;
pub mod workspace;
