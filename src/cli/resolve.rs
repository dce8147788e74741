//! Resolve command implementation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use quickargs::{encode_document, load_document, Decoder, Merger};
use std::path::PathBuf;

use super::utils::load_registry;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Configuration document (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Names that `!name` and `!module` values may refer to
    #[arg(short, long, value_name = "FILE", env = "QUICKARGS_SYMBOLS")]
    pub symbols: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    /// Overrides, e.g. `-- --logging.level=2`
    #[arg(last = true, value_name = "OVERRIDES")]
    pub overrides: Vec<String>,
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let registry = load_registry(args.symbols.as_deref())?;
    let merger = Merger::with_resolver(registry).bin_name("quickargs resolve CONFIG --");

    let tree = load_document(&args.config, &Decoder::new(merger.resolver()))
        .with_context(|| format!("Failed loading {}", args.config.display()))?;
    let resolved = merger.merge(&tree, &args.overrides)?;

    let rendered = match args.output {
        OutputFormat::Yaml => encode_document(&resolved)?,
        OutputFormat::Json => serde_json::to_string_pretty(&resolved)? + "\n",
    };
    print!("{rendered}");
    Ok(())
}
