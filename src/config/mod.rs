//! Configuration document loading
//!
//! Reads a document from disk, decodes it and optionally merges command-line
//! overrides into it.

pub mod loader;

pub use loader::{load_and_merge, load_document};
