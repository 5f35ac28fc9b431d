use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde_json::{Map, Value};

use crate::classifiers::hoeffding_tree::HoeffdingTreeOptions;
use crate::evaluation::CurveFormat;
use crate::ui::types::choices::{StreamChoice, StreamKind};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Train and evaluate incremental Hoeffding trees on data streams"
)]
pub struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. debug, streamtree=trace)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a prequential (test-then-train) evaluation
    Run(RunArgs),
    /// Print the structure of a saved model
    Inspect(InspectArgs),
    /// Print a JSON schema for the tree options or the stream choices
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Stream to consume (arff-file, sea-generator)
    #[arg(long, default_value = "sea-generator", value_name = "STREAM")]
    pub stream: String,

    /// Override stream parameters (key=value, nested keys with dots)
    #[arg(long = "stream-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub stream_params: Vec<KeyValue>,

    /// JSON file with tree options; missing keys keep their defaults
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override tree options (key=value)
    #[arg(long = "learner-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub learner_params: Vec<KeyValue>,

    /// Stop after this many instances (omit for unlimited)
    #[arg(long, value_name = "N")]
    pub max_instances: Option<u64>,

    /// Stop after this many CPU seconds (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub max_seconds: Option<u64>,

    /// Emit metrics every N instances
    #[arg(
        long,
        default_value_t = 100_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub sample_frequency: u64,

    /// Check memory usage every N instances
    #[arg(
        long,
        default_value_t = 100_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub mem_check_frequency: u64,

    /// File to dump evaluation snapshots after completion
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Format for the dump file
    #[arg(long, value_enum, default_value_t = CurveFormat::Csv)]
    pub dump_format: CurveFormat,

    /// Save the trained tree as JSON when the run ends
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub save_model: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Model file written by `run --save-model`
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub model: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaTarget {
    Options,
    Stream,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::Options)]
    pub target: SchemaTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    key: String,
    value: Value,
}

impl RunArgs {
    pub fn tree_options(&self) -> Result<HoeffdingTreeOptions> {
        let mut params = match &self.config {
            Some(path) => read_json(path)?,
            None => serde_json::to_value(HoeffdingTreeOptions::default())
                .context("failed to serialize default options")?,
        };
        apply_overrides(&mut params, &self.learner_params)?;
        let options: HoeffdingTreeOptions =
            serde_json::from_value(params).context("invalid tree options")?;
        options.validate()?;
        Ok(options)
    }

    pub fn stream_choice(&self) -> Result<StreamChoice> {
        let kind = parse_kind::<StreamKind>(&self.stream)
            .with_context(|| format!("invalid stream '{}'", self.stream))?;
        let mut params = StreamChoice::default_params(kind)?;
        apply_overrides(&mut params, &self.stream_params)?;
        StreamChoice::from_parts(kind, params)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn parse_kind<T>(raw: &str) -> Result<T>
where
    T: FromStr,
{
    let trimmed = raw.trim();
    [
        trimmed.to_string(),
        trimmed.to_lowercase(),
        trimmed.to_lowercase().replace('_', "-"),
    ]
    .iter()
    .find_map(|cand| cand.parse::<T>().ok())
    .ok_or_else(|| anyhow!("could not parse value '{raw}'"))
}

fn apply_overrides(target: &mut Value, overrides: &[KeyValue]) -> Result<()> {
    for kv in overrides {
        set_path(target, &kv.key, kv.value.clone())
            .with_context(|| format!("failed to set '{}'", kv.key))?;
    }
    Ok(())
}

fn set_path(target: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        bail!("empty key is not allowed");
    };

    let mut current = target;
    for seg in parents {
        current = ensure_object(current)?
            .entry((*seg).to_string())
            .or_insert(Value::Null);
    }

    ensure_object(current)?.insert((*last).to_string(), new_value);
    Ok(())
}

fn ensure_object(value: &mut Value) -> Result<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("cannot set nested field on non-object value: {other:?}"),
    }
}

fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    Ok(KeyValue {
        key: key.to_string(),
        value: parse_literal(value.trim()),
    })
}

/// JSON literals (`1e-4`, `true`, `null`) keep their type; anything else
/// becomes a string.
fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
