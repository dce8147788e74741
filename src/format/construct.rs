//! Conversion between `serde_yaml` nodes and configuration trees.

use super::literal::parse_scalar;
use super::resolver::{resolve_callable, resolve_module, Resolver};
use super::{FormatError, Tag};
use crate::tree::{Map, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_yaml::value::{Tag as YamlTag, TaggedValue};
use serde_yaml::{Mapping, Number, Value as Node};

fn describe(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Bool(_) => "bool",
        Node::Number(_) => "number",
        Node::String(_) => "string",
        Node::Sequence(_) => "sequence",
        Node::Mapping(_) => "mapping",
        Node::Tagged(_) => "tagged value",
    }
}

pub(crate) fn construct(node: Node, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    match node {
        Node::Null => Ok(Value::Null),
        Node::Bool(b) => Ok(Value::Bool(b)),
        Node::Number(n) => number(&n),
        Node::String(s) => Ok(Value::Str(s)),
        Node::Sequence(items) => sequence(items, resolver).map(Value::List),
        Node::Mapping(mapping) => map(mapping, resolver).map(Value::Map),
        Node::Tagged(tagged) => construct_tagged(*tagged, resolver),
    }
}

fn number(n: &Number) -> Result<Value, FormatError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    if n.is_u64() {
        return Err(FormatError::InvalidLiteral { tag: Tag::Int, text: n.to_string() });
    }
    n.as_f64()
        .map(Value::Float)
        .ok_or_else(|| FormatError::InvalidLiteral { tag: Tag::Float, text: n.to_string() })
}

fn sequence(items: Vec<Node>, resolver: &dyn Resolver) -> Result<Vec<Value>, FormatError> {
    items.into_iter().map(|item| construct(item, resolver)).collect()
}

fn map(mapping: Mapping, resolver: &dyn Resolver) -> Result<Map, FormatError> {
    let mut out = Map::new();
    for (key, value) in mapping {
        let Node::String(key) = key else {
            return Err(FormatError::NonStringKey(describe(&key)));
        };
        out.insert(key, construct(value, resolver)?);
    }
    Ok(out)
}

/// Text content of a tagged scalar, whatever type the YAML layer resolved it to.
fn scalar_text(tag: Tag, node: Node) -> Result<String, FormatError> {
    match node {
        Node::String(s) => Ok(s),
        Node::Number(n) => Ok(n.to_string()),
        Node::Bool(b) => Ok(b.to_string()),
        Node::Null => Ok(String::new()),
        other => Err(FormatError::NotAScalar { tag, found: describe(&other) }),
    }
}

fn tagged_sequence(
    tag: Tag,
    node: Node,
    resolver: &dyn Resolver,
) -> Result<Vec<Value>, FormatError> {
    match node {
        Node::Sequence(items) => sequence(items, resolver),
        other => Err(FormatError::NotASequence { tag, found: describe(&other) }),
    }
}

fn pairs(node: Node, resolver: &dyn Resolver) -> Result<Vec<(Value, Value)>, FormatError> {
    let Node::Sequence(items) = node else {
        return Err(FormatError::NotASequence { tag: Tag::Pairs, found: describe(&node) });
    };
    items
        .into_iter()
        .map(|item| match item {
            Node::Mapping(entry) if entry.len() == 1 => {
                let (key, value) = entry.into_iter().next().ok_or(FormatError::MalformedPairs)?;
                Ok((construct(key, resolver)?, construct(value, resolver)?))
            }
            Node::Sequence(mut entry) if entry.len() == 2 => {
                let value = entry.pop().ok_or(FormatError::MalformedPairs)?;
                let key = entry.pop().ok_or(FormatError::MalformedPairs)?;
                Ok((construct(key, resolver)?, construct(value, resolver)?))
            }
            _ => Err(FormatError::MalformedPairs),
        })
        .collect()
}

fn construct_tagged(tagged: TaggedValue, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    let name = tagged.tag.to_string();
    let name = name.trim_start_matches('!');
    let tag = Tag::from_name(name).ok_or_else(|| FormatError::UnknownTag(name.to_string()))?;
    let node = tagged.value;

    match tag {
        Tag::List => tagged_sequence(tag, node, resolver).map(Value::List),
        Tag::Tuple => tagged_sequence(tag, node, resolver).map(Value::Tuple),
        Tag::Pairs => pairs(node, resolver).map(Value::Pairs),
        Tag::Name => resolve_callable(resolver, &scalar_text(tag, node)?).map(Value::Callable),
        Tag::Module => resolve_module(resolver, &scalar_text(tag, node)?).map(Value::Module),
        Tag::Null => Ok(Value::Null),
        scalar => {
            let text = scalar_text(scalar, node)?;
            parse_scalar(scalar, &text).unwrap_or(Err(FormatError::UnknownTag(name.to_string())))
        }
    }
}

fn tagged(tag: Tag, value: Node) -> Node {
    Node::Tagged(Box::new(TaggedValue { tag: YamlTag::new(tag.to_string()), value }))
}

/// Convert a tree into a YAML node that decodes back to an equal tree.
pub(crate) fn encode(value: &Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(*b),
        Value::Int(i) => Node::Number(Number::from(*i)),
        Value::Float(x) => Node::Number(Number::from(*x)),
        Value::Complex(c) => tagged(Tag::Complex, Node::String(c.to_string())),
        Value::Str(s) => Node::String(s.clone()),
        Value::Bytes(bytes) => tagged(Tag::Bytes, Node::String(STANDARD.encode(bytes))),
        Value::Timestamp(ts) => tagged(Tag::Timestamp, Node::String(ts.to_string())),
        Value::List(items) => Node::Sequence(items.iter().map(encode).collect()),
        Value::Tuple(items) => tagged(Tag::Tuple, Node::Sequence(items.iter().map(encode).collect())),
        Value::Pairs(entries) => {
            let items = entries
                .iter()
                .map(|(key, value)| {
                    let mut entry = Mapping::new();
                    entry.insert(encode(key), encode(value));
                    Node::Mapping(entry)
                })
                .collect();
            tagged(Tag::Pairs, Node::Sequence(items))
        }
        Value::Map(map) => {
            let mut mapping = Mapping::new();
            for (key, value) in map {
                mapping.insert(Node::String(key.clone()), encode(value));
            }
            Node::Mapping(mapping)
        }
        Value::Callable(symbol) => tagged(Tag::Name, Node::String(symbol.path.clone())),
        Value::Module(symbol) => tagged(Tag::Module, Node::String(symbol.path.clone())),
    }
}
