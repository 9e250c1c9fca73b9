//! Salsa inputs.

pub mod translation;
