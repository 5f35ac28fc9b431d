use crate::streams::generators::{SeaFunction, SeaGenerator};
use crate::streams::{ArffFileStream, Stream};
use anyhow::{Context, Result};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 42;
fn default_seed() -> u64 {
    DEFAULT_SEED
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct ArffParameters {
    #[schemars(
        with = "String",
        title = "ARFF Path",
        description = "Path to .arff file",
        extend(
            "format" = "path",
            "x-file" = true,
            "x-must-exist" = true,
            "x-extensions" = ["arff"]
        )
    )]
    pub path: PathBuf,

    #[serde(default)]
    #[schemars(
        title = "Class Index",
        description = "Zero-based index of the class column (None = last attribute in file)"
    )]
    pub class_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SeaParameters {
    #[serde(default)]
    #[schemars(title = "Function", description = "SEA concept (threshold 8, 9, 7 or 9.5)")]
    pub function: SeaFunction,

    #[serde(default)]
    #[schemars(
        title = "Noise",
        description = "Probability of flipping a label (0.0–1.0)",
        range(min = 0.0, max = 1.0)
    )]
    pub noise_pct: f64,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Upper bound on instances; empty = infinite"
    )]
    pub max_instances: Option<u64>,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for SeaParameters {
    fn default() -> Self {
        Self {
            function: SeaFunction::default(),
            noise_pct: 0.0,
            max_instances: None,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StreamKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum StreamChoice {
    #[strum_discriminants(strum(
        message = "Arff File Stream",
        detailed_message = "A labelled stream read from an ARFF file."
    ))]
    ArffFile(ArffParameters),

    #[strum_discriminants(strum(
        message = "SEA Generator",
        detailed_message = "Generates the SEA concept functions."
    ))]
    SeaGenerator(SeaParameters),
}

impl StreamChoice {
    pub fn schema() -> Schema {
        schema_for!(StreamChoice)
    }

    pub fn default_params(kind: StreamKind) -> Result<Value> {
        let params = match kind {
            StreamKind::ArffFile => serde_json::to_value(ArffParameters::default()),
            StreamKind::SeaGenerator => serde_json::to_value(SeaParameters::default()),
        };
        params.context("failed to serialize default stream parameters")
    }

    pub fn from_parts(kind: StreamKind, params: Value) -> Result<Self> {
        let tagged = serde_json::json!({ "type": kind.to_string(), "params": params });
        serde_json::from_value(tagged)
            .with_context(|| format!("invalid parameters for stream '{kind}'"))
    }

    pub fn build(self) -> Result<Box<dyn Stream>> {
        match self {
            StreamChoice::ArffFile(p) => {
                let stream = ArffFileStream::new(p.path.clone(), p.class_index)
                    .with_context(|| format!("failed to open {}", p.path.display()))?;
                Ok(Box::new(stream))
            }
            StreamChoice::SeaGenerator(p) => {
                let stream = SeaGenerator::new(p.function, p.noise_pct, p.seed, p.max_instances)?;
                Ok(Box::new(stream))
            }
        }
    }
}
