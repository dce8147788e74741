//! Document file loading

use crate::error::{Error, Result};
use crate::format::Decoder;
use crate::merge::Merger;
use crate::tree::Value;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Read and decode the document at `path`.
pub fn load_document(path: &Path, decoder: &Decoder) -> Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    if !matches!(ext.as_str(), "yaml" | "yml") {
        tracing::warn!("Reading {} as YAML despite its '.{}' extension", path.display(), ext);
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "decoding configuration");
    decoder.decode_str(&content)
}

/// Read the document at `path` and merge `argv` into it.
///
/// The merger's resolver is used for both decoding and overrides. Usage
/// errors are returned, not reported.
pub fn load_and_merge<I, T>(path: &Path, argv: I, merger: &Merger) -> Result<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tree = load_document(path, &Decoder::new(merger.resolver()))?;
    merger.try_merge(&tree, argv)
}
