//! The configuration document format: YAML plus a handful of local tags.
//!
//! Untagged data follows the usual YAML resolution, so date-shaped strings
//! stay strings. Everything else is spelled with a tag:
//!
//! ```yaml
//! released: !timestamp 2016-12-11
//! a_complex: !complex 37-880j
//! a_tuple: !tuple [a, b]
//! raw: !bytes aGVsbG8=
//! handler: !name app.handlers.default
//! backend: !module app.backends.sqlite
//! ```
//!
//! The same literal rules parse command-line overrides (see [`crate::args`]).

use crate::error::Result;
use crate::tree::Value;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use thiserror::Error;

mod construct;
pub mod literal;
pub mod resolver;

pub use resolver::{resolve_callable, resolve_module, Registry, Resolver};

/// Local tags understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Null,
    List,
    Tuple,
    Pairs,
    Timestamp,
    Name,
    Module,
}

impl Tag {
    const ALL: [Tag; 13] = [
        Tag::Bool,
        Tag::Int,
        Tag::Float,
        Tag::Complex,
        Tag::Str,
        Tag::Bytes,
        Tag::Null,
        Tag::List,
        Tag::Tuple,
        Tag::Pairs,
        Tag::Timestamp,
        Tag::Name,
        Tag::Module,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::Float => "float",
            Tag::Complex => "complex",
            Tag::Str => "str",
            Tag::Bytes => "bytes",
            Tag::Null => "null",
            Tag::List => "list",
            Tag::Tuple => "tuple",
            Tag::Pairs => "pairs",
            Tag::Timestamp => "timestamp",
            Tag::Name => "name",
            Tag::Module => "module",
        }
    }

    pub fn from_name(name: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.name())
    }
}

/// Errors raised while decoding documents or parsing literals.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("mapping keys must be strings, found a {0}")]
    NonStringKey(&'static str),

    #[error("unknown tag '!{0}'")]
    UnknownTag(String),

    #[error("invalid {tag} literal '{text}'")]
    InvalidLiteral { tag: Tag, text: String },

    #[error("{tag} expects a sequence, found a {found}")]
    NotASequence { tag: Tag, found: &'static str },

    #[error("{tag} expects a scalar, found a {found}")]
    NotAScalar { tag: Tag, found: &'static str },

    #[error("!pairs entries must be single-key mappings or two-element sequences")]
    MalformedPairs,

    #[error("'{0}' is not a dotted name")]
    InvalidName(String),

    #[error("cannot resolve '{0}'")]
    Unresolved(String),

    #[error("'{0}' is a module, expected a function or class")]
    NotCallable(String),

    #[error("'{0}' is not a module")]
    NotModule(String),
}

/// Post-processing step run on every tree a [`Decoder`] produces.
pub trait DecodeHook: Send + Sync {
    fn after_decode(&self, tree: Value) -> Result<Value>;
}

/// Decodes documents into configuration trees.
#[derive(Clone)]
pub struct Decoder {
    resolver: Arc<dyn Resolver>,
    hooks: Vec<Arc<dyn DecodeHook>>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Arc::new(Registry::default()))
    }
}

impl Decoder {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver, hooks: Vec::new() }
    }

    /// Append a hook; hooks run in registration order.
    pub fn with_hook(mut self, hook: impl DecodeHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn resolver(&self) -> Arc<dyn Resolver> {
        Arc::clone(&self.resolver)
    }

    pub fn decode_str(&self, text: &str) -> Result<Value> {
        let node: serde_yaml::Value = serde_yaml::from_str(text).map_err(FormatError::from)?;
        self.finish(node)
    }

    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Value> {
        let node: serde_yaml::Value = serde_yaml::from_reader(reader).map_err(FormatError::from)?;
        self.finish(node)
    }

    fn finish(&self, node: serde_yaml::Value) -> Result<Value> {
        let mut tree = construct::construct(node, self.resolver.as_ref())?;
        for hook in &self.hooks {
            tree = hook.after_decode(tree)?;
        }
        Ok(tree)
    }
}

/// Parse a flow sequence literal such as `[2, 4]` or `[a, b, true]`.
///
/// Elements are decoded with the full document rules; their kinds are not
/// constrained.
pub fn parse_sequence(text: &str, resolver: &dyn Resolver) -> Result<Vec<Value>, FormatError> {
    let node: serde_yaml::Value = serde_yaml::from_str(text)?;
    match construct::construct(node, resolver)? {
        Value::List(items) => Ok(items),
        other => Err(FormatError::NotASequence { tag: Tag::List, found: other.kind().as_str() }),
    }
}

/// Render a tree as a YAML document.
pub fn encode_document(tree: &Value) -> Result<String, FormatError> {
    Ok(serde_yaml::to_string(&construct::encode(tree))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tree::{Complex, Symbol, SymbolKind, Timestamp};

    fn decoder() -> Decoder {
        let registry = Registry::new()
            .with_function("yaml.load")
            .with_class("yaml.loader.Loader")
            .with_module("contextlib");
        Decoder::new(Arc::new(registry))
    }

    const ALL_TYPES: &str = "
an_int: 3
a_float: 3.0
a_bool: true
a_complex_number: !complex 37-880j
a_date: !timestamp 2016-12-11
sequences:
  a_list: [a, b, c]
  a_tuple: !tuple [a, b]
python:
  a_function: !name yaml.load
  a_class: !name yaml.loader.Loader
  a_module: !module contextlib
  a_none: !null ~
";

    #[test]
    fn decodes_all_leaf_kinds() {
        let tree = decoder().decode_str(ALL_TYPES).expect("decode");
        assert_eq!(tree.lookup("an_int"), Some(&Value::Int(3)));
        assert_eq!(tree.lookup("a_float"), Some(&Value::Float(3.0)));
        assert_eq!(tree.lookup("a_bool"), Some(&Value::Bool(true)));
        assert_eq!(
            tree.lookup("a_complex_number"),
            Some(&Value::Complex(Complex::new(37.0, -880.0)))
        );
        assert!(matches!(tree.lookup("a_date"), Some(Value::Timestamp(Timestamp::Date(_)))));
        assert_eq!(
            tree.lookup("sequences.a_tuple"),
            Some(&Value::Tuple(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(
            tree.lookup("python.a_class"),
            Some(&Value::Callable(Symbol::new("yaml.loader.Loader", SymbolKind::Class)))
        );
        assert_eq!(
            tree.lookup("python.a_module"),
            Some(&Value::Module(Symbol::new("contextlib", SymbolKind::Module)))
        );
        assert_eq!(tree.lookup("python.a_none"), Some(&Value::Null));
    }

    #[test]
    fn date_shaped_strings_stay_strings() {
        let tree = decoder()
            .decode_str("version: \"2020-01-01\"\nplain: 2020-01-01\nid: \"2016-02-30\"\n")
            .expect("decode");
        assert_eq!(tree.lookup("version"), Some(&Value::from("2020-01-01")));
        assert_eq!(tree.lookup("plain"), Some(&Value::from("2020-01-01")));
        assert_eq!(tree.lookup("id"), Some(&Value::from("2016-02-30")));

        let err = decoder().decode_str("d: !timestamp 2016-02-30\n").expect_err("impossible date");
        assert!(matches!(err, Error::Format(FormatError::InvalidLiteral { tag: Tag::Timestamp, .. })));
    }

    #[test]
    fn tagged_scalars_use_literal_rules() {
        let tree = decoder().decode_str("flag: !bool no\nraw: !bytes aGVsbG8=\n").expect("decode");
        assert_eq!(tree.lookup("flag"), Some(&Value::Bool(false)));
        assert_eq!(tree.lookup("raw"), Some(&Value::Bytes(b"hello".to_vec())));
    }

    #[test]
    fn pairs_keep_order() {
        let tree = decoder().decode_str("p: !pairs [{b: 1}, {a: 2}]\n").expect("decode");
        assert_eq!(
            tree.lookup("p"),
            Some(&Value::Pairs(vec![
                (Value::from("b"), Value::Int(1)),
                (Value::from("a"), Value::Int(2)),
            ]))
        );
    }

    #[test]
    fn rejects_unknown_tags_and_non_string_keys() {
        let err = decoder().decode_str("x: !frobnicate 1\n").expect_err("unknown tag");
        assert!(matches!(err, Error::Format(FormatError::UnknownTag(ref t)) if t == "frobnicate"));

        let err = decoder().decode_str("1: one\n").expect_err("integer key");
        assert!(matches!(err, Error::Format(FormatError::NonStringKey("number"))));
    }

    #[test]
    fn unresolvable_names_fail_decoding() {
        let err = decoder().decode_str("f: !name tests.not_existing\n").expect_err("unresolved");
        assert!(matches!(err, Error::Format(FormatError::Unresolved(_))));
    }

    #[test]
    fn sequence_literal_must_be_a_sequence() {
        let items = parse_sequence("[b, 4, true]", &Registry::default()).expect("sequence");
        assert_eq!(items, vec![Value::from("b"), Value::Int(4), Value::Bool(true)]);
        assert!(parse_sequence("hallo", &Registry::default()).is_err());
        assert_eq!(parse_sequence("[]", &Registry::default()).expect("empty"), Vec::new());
    }

    #[test]
    fn encoded_documents_decode_to_equal_trees() {
        let dec = decoder();
        let mut tree = dec.decode_str(ALL_TYPES).expect("decode");
        if let Value::Map(map) = &mut tree {
            map.insert("looks_like_date".to_string(), Value::from("2020-02-02"));
            map.insert("raw".to_string(), Value::Bytes(vec![0, 255]));
        }
        let text = encode_document(&tree).expect("encode");
        assert_eq!(dec.decode_str(&text).expect("re-decode"), tree);
    }

    struct Stamp;

    impl DecodeHook for Stamp {
        fn after_decode(&self, tree: Value) -> Result<Value> {
            let mut map = tree.as_map().cloned().unwrap_or_default();
            map.insert("stamped".to_string(), Value::Bool(true));
            Ok(Value::Map(map))
        }
    }

    #[test]
    fn hooks_run_after_decoding() {
        let tree = Decoder::default().with_hook(Stamp).decode_str("a: 1\n").expect("decode");
        assert_eq!(tree.lookup("stamped"), Some(&Value::Bool(true)));
        assert_eq!(tree.lookup("a"), Some(&Value::Int(1)));
    }
}
