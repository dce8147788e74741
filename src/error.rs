//! Error types for decoding, parser construction and merging.

use crate::args::UnsupportedType;
use crate::format::FormatError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the merge pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A leaf sits at the empty path: the document root is not a map.
    #[error("argument without name: the configuration root must be a mapping")]
    ArgumentWithoutName,

    /// A key cannot be addressed as part of an option name.
    #[error("invalid key {key:?} under '{parent}': {reason}")]
    InvalidKey { parent: String, key: String, reason: &'static str },

    /// Two flat paths disagree about whether a key holds a map or a leaf.
    #[error("conflicting paths at '{0}': key is both a mapping and a leaf")]
    PathConflict(String),

    /// A leaf has no override parser.
    #[error("option '--{option}': {source}")]
    UnsupportedType {
        option: String,
        #[source]
        source: UnsupportedType,
    },

    /// Unknown option or unparsable value on the command line.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
