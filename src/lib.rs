//! quickargs: a command-line interface derived from a configuration document
//!
//! Every leaf of a nested YAML configuration becomes a `--dotted.path` option
//! whose value must parse to the same kind as the document's default. Merging
//! the parsed overrides back yields a tree of the same shape.
//!
//! ```no_run
//! use quickargs::{Decoder, Merger};
//!
//! let tree = Decoder::default().decode_str("logging:\n  file: output.log\n  level: 4\n")?;
//! let resolved = Merger::default().merge_env(&tree)?;
//! println!("{resolved}");
//! # Ok::<(), quickargs::Error>(())
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod tree;

pub use args::{build_parser, select_parser, OptionSet, OverrideSpec, SEPARATOR};
pub use config::{load_and_merge, load_document};
pub use error::{Error, Result};
pub use format::{encode_document, DecodeHook, Decoder, FormatError, Registry, Resolver};
pub use merge::{merge, merge_env_args, merging_decoder, MergeArgsHook, Merger};
pub use tree::{flatten, unflatten, FlatMap, Symbol, SymbolKind, Value, ValueKind};
