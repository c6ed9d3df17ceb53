//! Unified error types for pbixkit.
//!
//! This module provides the single error type shared by the archive reader,
//! the fragment decoder and the normalizers.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
