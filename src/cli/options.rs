//! Options command implementation

use anyhow::{Context, Result};
use clap::Args;
use quickargs::{build_parser, flatten, load_document, Decoder};
use std::path::PathBuf;
use std::sync::Arc;

use super::utils::load_registry;

#[derive(Args)]
pub struct OptionsArgs {
    /// Configuration document (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Names that `!name` and `!module` values may refer to
    #[arg(short, long, value_name = "FILE", env = "QUICKARGS_SYMBOLS")]
    pub symbols: Option<PathBuf>,
}

pub fn run(args: OptionsArgs) -> Result<()> {
    let resolver = Arc::new(load_registry(args.symbols.as_deref())?);
    let tree = load_document(&args.config, &Decoder::new(resolver.clone()))
        .with_context(|| format!("Failed loading {}", args.config.display()))?;
    let options = build_parser(&flatten(&tree), resolver)?;

    let rows: Vec<(String, String)> = options
        .specs()
        .iter()
        .map(|spec| {
            (format!("--{} <{}>", spec.name, spec.parser.kind().value_name()), spec.default.to_string())
        })
        .collect();
    let width = rows.iter().map(|(option, _)| option.len()).max().unwrap_or(0);

    println!("{} options", options.len());
    for (option, default) in rows {
        println!("  {option:<width$}  default: {default}");
    }
    Ok(())
}
