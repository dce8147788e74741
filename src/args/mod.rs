//! Type-directed command-line parser construction.
//!
//! Every leaf of a flattened configuration becomes one long option named by
//! its dotted path. The option's value parser is picked from the kind of the
//! leaf's default, so an override always parses into the same kind.

use crate::error::{Error, Result};
use crate::format::{literal, parse_sequence, resolve_callable, resolve_module};
use crate::format::{FormatError, Resolver};
use crate::tree::{FlatMap, Value, ValueKind};
use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::sync::Arc;
use thiserror::Error;

/// Joins path segments into option names.
pub const SEPARATOR: char = '.';

pub type ParseFn = fn(&str, &dyn Resolver) -> Result<Value, FormatError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no override parser for {0} values")]
pub struct UnsupportedType(pub ValueKind);

/// Parse strategy bound to the kind it produces.
#[derive(Clone, Copy)]
pub struct LeafParser {
    kind: ValueKind,
    parse: ParseFn,
}

impl LeafParser {
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn parse(&self, text: &str, resolver: &dyn Resolver) -> Result<Value, FormatError> {
        (self.parse)(text, resolver)
    }
}

impl std::fmt::Debug for LeafParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafParser").field("kind", &self.kind).finish()
    }
}

fn bool_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_bool(text).map(Value::Bool)
}

fn int_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_int(text).map(Value::Int)
}

fn float_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_float(text).map(Value::Float)
}

fn complex_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_complex(text).map(Value::Complex)
}

fn str_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    Ok(Value::Str(text.to_string()))
}

fn bytes_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_bytes(text).map(Value::Bytes)
}

fn null_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    Ok(literal::parse_null(text))
}

fn list_leaf(text: &str, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    parse_sequence(text, resolver).map(Value::List)
}

fn tuple_leaf(text: &str, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    parse_sequence(text, resolver).map(Value::Tuple)
}

fn timestamp_leaf(text: &str, _: &dyn Resolver) -> Result<Value, FormatError> {
    literal::parse_timestamp(text).map(Value::Timestamp)
}

fn callable_leaf(text: &str, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    resolve_callable(resolver, text).map(Value::Callable)
}

fn module_leaf(text: &str, resolver: &dyn Resolver) -> Result<Value, FormatError> {
    resolve_module(resolver, text).map(Value::Module)
}

/// Parser table in resolution order. Bool comes before Int.
const LEAF_PARSERS: &[(ValueKind, ParseFn)] = &[
    (ValueKind::Bool, bool_leaf),
    (ValueKind::Int, int_leaf),
    (ValueKind::Float, float_leaf),
    (ValueKind::Complex, complex_leaf),
    (ValueKind::Str, str_leaf),
    (ValueKind::Bytes, bytes_leaf),
    (ValueKind::Null, null_leaf),
    (ValueKind::List, list_leaf),
    (ValueKind::Tuple, tuple_leaf),
    (ValueKind::Timestamp, timestamp_leaf),
    (ValueKind::Callable, callable_leaf),
    (ValueKind::Module, module_leaf),
];

/// Pick the override parser for a default value.
///
/// Pairs and maps have no textual override form and are rejected.
pub fn select_parser(default: &Value) -> Result<LeafParser, UnsupportedType> {
    let kind = default.kind();
    LEAF_PARSERS
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|&(kind, parse)| LeafParser { kind, parse })
        .ok_or(UnsupportedType(kind))
}

/// One generated option.
#[derive(Debug, Clone)]
pub struct OverrideSpec {
    pub path: Vec<String>,
    pub name: String,
    pub default: Value,
    pub parser: LeafParser,
}

/// All options generated for one configuration.
#[derive(Clone)]
pub struct OptionSet {
    specs: Vec<OverrideSpec>,
    resolver: Arc<dyn Resolver>,
}

fn check_keys(path: &[String]) -> Result<()> {
    for (depth, key) in path.iter().enumerate() {
        let reason = if key.is_empty() {
            "empty keys cannot be addressed"
        } else if key.contains(SEPARATOR) {
            "keys must not contain the '.' separator"
        } else if key.contains('=') {
            "keys must not contain '=', which ends an option name"
        } else if depth == 0 && key.starts_with('-') {
            "option names cannot start with '-'"
        } else {
            continue;
        };
        return Err(Error::InvalidKey {
            parent: path[..depth].join("."),
            key: key.clone(),
            reason,
        });
    }
    Ok(())
}

/// Build one option per flat leaf.
///
/// Fails on the first (in path order) empty path, unaddressable key or leaf
/// without a parser. Nothing is parsed from the command line here.
pub fn build_parser(flat: &FlatMap, resolver: Arc<dyn Resolver>) -> Result<OptionSet> {
    let mut specs = Vec::with_capacity(flat.len());
    for (path, default) in flat {
        if path.is_empty() {
            return Err(Error::ArgumentWithoutName);
        }
        check_keys(path)?;

        let name = path.join(".");
        let parser = select_parser(default)
            .map_err(|source| Error::UnsupportedType { option: name.clone(), source })?;
        specs.push(OverrideSpec { path: path.clone(), name, default: default.clone(), parser });
    }
    tracing::debug!(options = specs.len(), "built override options");
    Ok(OptionSet { specs, resolver })
}

impl OptionSet {
    pub fn specs(&self) -> &[OverrideSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The clap command exposing every option as `--dotted.name <KIND>`.
    pub fn command(&self, bin_name: &str) -> Command {
        let mut cmd = Command::new(bin_name.to_string())
            .disable_version_flag(true)
            .args_override_self(true);
        if self.specs.iter().any(|spec| spec.name == "help") {
            cmd = cmd.disable_help_flag(true);
        }

        for spec in &self.specs {
            let parser = spec.parser;
            let resolver = Arc::clone(&self.resolver);
            let value_parser =
                ValueParser::new(move |text: &str| parser.parse(text, resolver.as_ref()));
            cmd = cmd.arg(
                Arg::new(spec.name.clone())
                    .long(spec.name.clone())
                    .value_name(parser.kind().value_name())
                    .help(format!("default: {}", spec.default))
                    .action(ArgAction::Set)
                    .num_args(1)
                    .allow_negative_numbers(true)
                    .value_parser(value_parser),
            );
        }
        cmd
    }

    /// Run the command line against the options and return the supplied
    /// overrides, keyed by path. `argv` excludes the program name.
    pub fn parse<I, T>(&self, bin_name: &str, argv: I) -> Result<BTreeMap<Vec<String>, Value>, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = std::iter::once(OsString::from(bin_name))
            .chain(argv.into_iter().map(Into::into))
            .collect::<Vec<_>>();
        let mut matches = self.command(bin_name).try_get_matches_from(args)?;

        let mut overrides = BTreeMap::new();
        for spec in &self.specs {
            if let Some(value) = matches.remove_one::<Value>(&spec.name) {
                overrides.insert(spec.path.clone(), value);
            }
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Registry;
    use crate::tree::{flatten, Symbol, SymbolKind};
    use clap::error::ErrorKind;

    fn registry() -> Arc<dyn Resolver> {
        Arc::new(
            Registry::new()
                .with_function("tests.function_b")
                .with_module("yaml.composer"),
        )
    }

    fn options(tree: &Value) -> OptionSet {
        build_parser(&flatten(tree), registry()).expect("options")
    }

    #[test]
    fn bool_is_not_parsed_as_int() {
        let parser = select_parser(&Value::Bool(true)).expect("parser");
        assert_eq!(parser.kind(), ValueKind::Bool);
        assert_eq!(parser.parse("no", registry().as_ref()).expect("bool"), Value::Bool(false));
        assert!(parser.parse("1", registry().as_ref()).is_err());
    }

    #[test]
    fn every_overridable_kind_has_a_parser() {
        for (kind, _) in LEAF_PARSERS {
            assert!(LEAF_PARSERS.iter().filter(|(k, _)| k == kind).count() == 1, "{kind} listed twice");
        }
        assert_eq!(LEAF_PARSERS.len(), 12);
    }

    #[test]
    fn pairs_and_maps_are_unsupported() {
        let pairs = Value::Pairs(vec![(Value::from("a"), Value::Int(1))]);
        assert_eq!(select_parser(&pairs).expect_err("pairs"), UnsupportedType(ValueKind::Pairs));

        let tree = Value::map([("ok", Value::Int(1)), ("p", pairs)]);
        let err = build_parser(&flatten(&tree), registry()).err().expect("unsupported leaf");
        assert!(matches!(err, Error::UnsupportedType { ref option, .. } if option == "p"));
    }

    #[test]
    fn option_names_join_paths_with_dots() {
        let tree = Value::map([(
            "logging",
            Value::map([("file", Value::from("output.log")), ("level", Value::Int(4))]),
        )]);
        let names: Vec<_> = options(&tree).specs().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["logging.file", "logging.level"]);
    }

    #[test]
    fn bare_root_has_no_name() {
        let err = build_parser(&flatten(&Value::List(vec![Value::from("123")])), registry())
            .err()
            .expect("empty path");
        assert!(matches!(err, Error::ArgumentWithoutName));
    }

    #[test]
    fn keys_with_separator_are_rejected() {
        let tree = Value::map([("a", Value::map([("b.c", Value::Int(1))]))]);
        let err = build_parser(&flatten(&tree), registry()).err().expect("dotted key");
        assert!(matches!(err, Error::InvalidKey { ref parent, ref key, .. } if parent == "a" && key == "b.c"));

        let tree = Value::map([("a=b", Value::Int(1))]);
        let err = build_parser(&flatten(&tree), registry()).err().expect("key with '='");
        assert!(matches!(err, Error::InvalidKey { ref parent, ref key, .. } if parent.is_empty() && key == "a=b"));
    }

    #[test]
    fn parse_returns_only_supplied_values() {
        let tree = Value::map([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let overrides = options(&tree).parse("test", ["--b", "-20"]).expect("parse");
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[&vec!["b".to_string()]], Value::Int(-20));
    }

    #[test]
    fn repeated_option_keeps_last_value() {
        let tree = Value::map([("a", Value::Int(1))]);
        let overrides = options(&tree).parse("test", ["--a=2", "--a=3"]).expect("parse");
        assert_eq!(overrides[&vec!["a".to_string()]], Value::Int(3));
    }

    #[test]
    fn unknown_option_is_a_usage_error() {
        let tree = Value::map([("key1", Value::from("v"))]);
        let err = options(&tree).parse("test", ["--not_existing=cmd_value"]).expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn wrong_kind_is_a_usage_error() {
        let tree = Value::map([("key1", Value::Int(123))]);
        let err = options(&tree).parse("test", ["--key1=hallo"]).expect_err("type mismatch");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn resolution_failures_surface_as_usage_errors() {
        let tree = Value::map([(
            "f",
            Value::Callable(Symbol::new("tests.function_a", SymbolKind::Function)),
        )]);
        let opts = options(&tree);
        let err = opts.parse("test", ["--f=yaml.composer"]).expect_err("module in callable slot");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let overrides = opts.parse("test", ["--f=tests.function_b"]).expect("parse");
        assert_eq!(
            overrides[&vec!["f".to_string()]],
            Value::Callable(Symbol::new("tests.function_b", SymbolKind::Function))
        );
    }

    #[test]
    fn help_lists_defaults() {
        let tree = Value::map([("level", Value::Int(4))]);
        let help = options(&tree).command("test").render_help().to_string();
        assert!(help.contains("--level <INT>"), "{help}");
        assert!(help.contains("default: 4"), "{help}");
    }

    #[test]
    fn leaf_named_help_replaces_help_flag() {
        let tree = Value::map([("help", Value::from("text"))]);
        let overrides = options(&tree).parse("test", ["--help=other"]).expect("parse");
        assert_eq!(overrides[&vec!["help".to_string()]], Value::from("other"));
    }
}
