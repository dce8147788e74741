//! Dotted-name resolution for `!name` and `!module` values.
//!
//! There is no reflection to fall back on, so every name a document (or a
//! command line) may refer to has to be known to a [`Resolver`] up front.

use super::FormatError;
use crate::tree::{Symbol, SymbolKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

static DOTTED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("valid dotted name regex")
});

/// Looks up the kind of symbol a fully-qualified name refers to.
pub trait Resolver: Send + Sync {
    fn lookup(&self, name: &str) -> Option<SymbolKind>;
}

/// Map-backed resolver.
///
/// Deserializes from a `name: kind` map:
///
/// ```yaml
/// yaml.load: function
/// yaml.loader.Loader: class
/// contextlib: module
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    symbols: BTreeMap<String, SymbolKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, kind: SymbolKind) -> &mut Self {
        self.symbols.insert(name.into(), kind);
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.register(name, SymbolKind::Function);
        self
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.register(name, SymbolKind::Class);
        self
    }

    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.register(name, SymbolKind::Module);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Resolver for Registry {
    fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).copied()
    }
}

fn checked_lookup(resolver: &dyn Resolver, name: &str) -> Result<SymbolKind, FormatError> {
    if !DOTTED_NAME_RE.is_match(name) {
        return Err(FormatError::InvalidName(name.to_string()));
    }
    resolver.lookup(name).ok_or_else(|| FormatError::Unresolved(name.to_string()))
}

/// Resolve a function or class. Modules are rejected.
pub fn resolve_callable(resolver: &dyn Resolver, name: &str) -> Result<Symbol, FormatError> {
    let name = name.trim();
    match checked_lookup(resolver, name)? {
        kind if kind.is_callable() => Ok(Symbol::new(name, kind)),
        _ => Err(FormatError::NotCallable(name.to_string())),
    }
}

/// Resolve a module. Functions and classes are rejected.
pub fn resolve_module(resolver: &dyn Resolver, name: &str) -> Result<Symbol, FormatError> {
    let name = name.trim();
    match checked_lookup(resolver, name)? {
        SymbolKind::Module => Ok(Symbol::new(name, SymbolKind::Module)),
        _ => Err(FormatError::NotModule(name.to_string())),
    }
}
