//! Merging command-line overrides into a configuration tree.
//!
//! ```no_run
//! use quickargs::{Merger, Value};
//!
//! let defaults = Value::map([("a", Value::Int(1)), ("b", Value::Int(2))]);
//! let resolved = Merger::default().try_merge(&defaults, ["--b=20"])?;
//! assert_eq!(resolved.lookup("b"), Some(&Value::Int(20)));
//! # Ok::<(), quickargs::Error>(())
//! ```

use crate::args::build_parser;
use crate::error::{Error, Result};
use crate::format::{DecodeHook, Decoder, Registry, Resolver};
use crate::tree::{flatten, unflatten, Value};
use std::ffi::OsString;
use std::sync::Arc;

/// Merge settings: the resolver for `!name`/`!module` overrides and the
/// program name shown in usage messages.
#[derive(Clone)]
pub struct Merger {
    resolver: Arc<dyn Resolver>,
    bin_name: String,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new(Arc::new(Registry::default()))
    }
}

impl Merger {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        let bin_name = std::env::args_os()
            .next()
            .and_then(|arg0| {
                std::path::Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| clap::crate_name!().to_string());
        Self { resolver, bin_name }
    }

    pub fn with_resolver(resolver: impl Resolver + 'static) -> Self {
        Self::new(Arc::new(resolver))
    }

    pub fn bin_name(mut self, name: impl Into<String>) -> Self {
        self.bin_name = name.into();
        self
    }

    pub fn resolver(&self) -> Arc<dyn Resolver> {
        Arc::clone(&self.resolver)
    }

    /// Apply `argv` (program name excluded) to `tree`.
    ///
    /// Unknown options and values that do not parse to the default's kind
    /// come back as [`Error::Usage`].
    pub fn try_merge<I, T>(&self, tree: &Value, argv: I) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut flat = flatten(tree);
        let options = build_parser(&flat, self.resolver())?;
        let overrides = options.parse(&self.bin_name, argv)?;

        for (path, value) in overrides {
            tracing::debug!(option = %path.join("."), %value, "override applied");
            flat.insert(path, value);
        }
        unflatten(flat)
    }

    /// Like [`Merger::try_merge`], but usage errors are reported the way clap
    /// reports them: message on stderr and exit status 2. `--help` prints the
    /// generated help and exits successfully.
    pub fn merge<I, T>(&self, tree: &Value, argv: I) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match self.try_merge(tree, argv) {
            Err(Error::Usage(err)) => err.exit(),
            other => other,
        }
    }

    /// Merge with the current process arguments.
    pub fn merge_env(&self, tree: &Value) -> Result<Value> {
        self.merge(tree, process_args())
    }
}

fn process_args() -> Vec<OsString> {
    std::env::args_os().skip(1).collect()
}

/// Merge `argv` into `tree` with an empty resolver.
pub fn merge<I, T>(tree: &Value, argv: I) -> Result<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Merger::default().merge(tree, argv)
}

/// Merge the current process arguments into `tree` with an empty resolver.
pub fn merge_env_args(tree: &Value) -> Result<Value> {
    Merger::default().merge_env(tree)
}

/// Decode hook that merges command-line overrides into every decoded tree.
///
/// Without pinned arguments the process arguments are read each time a
/// document is decoded.
#[derive(Clone)]
pub struct MergeArgsHook {
    merger: Merger,
    argv: Option<Vec<OsString>>,
}

impl MergeArgsHook {
    pub fn new(merger: Merger) -> Self {
        Self { merger, argv: None }
    }

    pub fn with_args<I, T>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.argv = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Arguments for the next merge: the pinned ones, or the current process
    /// arguments.
    fn current_args(&self) -> Vec<OsString> {
        match &self.argv {
            Some(argv) => argv.clone(),
            None => process_args(),
        }
    }
}

impl DecodeHook for MergeArgsHook {
    fn after_decode(&self, tree: Value) -> Result<Value> {
        self.merger.try_merge(&tree, self.current_args())
    }
}

/// A decoder that shares the merger's resolver and merges overrides into
/// everything it decodes.
pub fn merging_decoder(merger: Merger) -> Decoder {
    Decoder::new(merger.resolver()).with_hook(MergeArgsHook::new(merger))
}
