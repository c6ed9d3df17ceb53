//! Common types, traits, and utilities shared across the decoder.
//!
//! This module provides the error type, the warning buffer and the byte-level
//! helpers (BOM handling, text encodings, little-endian fields) used by both
//! the data-model and the report sides of the crate.

// Submodule declarations
pub mod binary;
pub mod bom;
pub mod encoding;
pub mod error;
pub mod naming;
pub mod warning;

// Re-exports for convenience
pub use error::{Error, Result};
pub use naming::NameScope;
pub use warning::{Partial, Warning, WarningKind, Warnings};
