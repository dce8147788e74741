//! Configuration tree model
//!
//! A decoded configuration document is a [`Value`]: scalars, sequences, pairs
//! and string-keyed maps. Maps are the only inner nodes; everything else is a
//! leaf that can be overridden from the command line.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub mod complex;
pub mod flatten;
pub mod timestamp;

pub use complex::Complex;
pub use flatten::{flatten, unflatten, FlatMap};
pub use timestamp::Timestamp;

/// Map node of the configuration tree.
pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(Timestamp),
    /// Mutable sequence.
    List(Vec<Value>),
    /// Fixed-arity sequence. Same literal syntax as a list, different kind.
    Tuple(Vec<Value>),
    /// Ordered key/value sequence (`!pairs`). Never overridable.
    Pairs(Vec<(Value, Value)>),
    Map(Map),
    Callable(Symbol),
    Module(Symbol),
}

/// The closed set of value kinds, used to pick an override parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Null,
    List,
    Tuple,
    Timestamp,
    Callable,
    Module,
    Pairs,
    Map,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Complex => "complex",
            ValueKind::Str => "str",
            ValueKind::Bytes => "bytes",
            ValueKind::Null => "null",
            ValueKind::List => "list",
            ValueKind::Tuple => "tuple",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Callable => "callable",
            ValueKind::Module => "module",
            ValueKind::Pairs => "pairs",
            ValueKind::Map => "map",
        }
    }

    /// Placeholder shown in generated help, e.g. `--port <INT>`.
    pub fn value_name(self) -> &'static str {
        match self {
            ValueKind::Bool => "BOOL",
            ValueKind::Int => "INT",
            ValueKind::Float => "FLOAT",
            ValueKind::Complex => "COMPLEX",
            ValueKind::Str => "STR",
            ValueKind::Bytes => "BASE64",
            ValueKind::Null => "NULL",
            ValueKind::List => "LIST",
            ValueKind::Tuple => "TUPLE",
            ValueKind::Timestamp => "TIMESTAMP",
            ValueKind::Callable => "NAME",
            ValueKind::Module => "MODULE",
            ValueKind::Pairs => "PAIRS",
            ValueKind::Map => "MAP",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Module,
}

impl SymbolKind {
    pub fn is_callable(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Class)
    }
}

/// A resolved reference to a named function, class or module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub path: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(path: impl Into<String>, kind: SymbolKind) -> Self {
        Self { path: path.into(), kind }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Complex(_) => ValueKind::Complex,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::List(_) => ValueKind::List,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Pairs(_) => ValueKind::Pairs,
            Value::Map(_) => ValueKind::Map,
            Value::Callable(_) => ValueKind::Callable,
            Value::Module(_) => ValueKind::Module,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child of a map node.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Look up a nested value by its dotted option name, e.g. `logging.level`.
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        dotted.split('.').try_fold(self, |node, key| node.get(key))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Value>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Flow-style rendering used for help text (`default: [a, b]`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Complex(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Bytes(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Value::Timestamp(ts) => write!(f, "{ts}"),
            Value::List(items) | Value::Tuple(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Pairs(pairs) => {
                f.write_str("[")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Callable(symbol) | Value::Module(symbol) => write!(f, "{symbol}"),
        }
    }
}

/// Plain-data serialization (JSON output). Kinds without a JSON counterpart
/// are written as their textual literal.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            Value::Complex(_)
            | Value::Timestamp(_)
            | Value::Callable(_)
            | Value::Module(_) => serializer.collect_str(self),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Pairs(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for pair in pairs {
                    seq.serialize_element(&[&pair.0, &pair.1])?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
