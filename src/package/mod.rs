//! Archive Reader.
//!
//! Opens the report container as a random-access ZIP archive and exposes
//! read-by-path and read-by-prefix access to its entries. [`ContainerParts`]
//! materializes every entry the normalizers consume in one pass so that the
//! normalizers never touch the archive themselves.

pub mod archive;
pub mod parts;
pub mod paths;

pub use archive::Archive;
pub use parts::{ContainerParts, Entry};
