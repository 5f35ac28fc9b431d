use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterionKind;
use crate::error::TreeError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How numeric attributes are summarised at a leaf.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NumericSplitKind {
    /// One threshold estimated from the first observations, then frozen.
    Binary,
    /// Up to `max_bins` adaptive bins scanned for the best threshold.
    #[default]
    MultiBin,
}

fn default_split_confidence() -> f64 {
    1e-7
}

fn default_tie_threshold() -> f64 {
    0.05
}

fn default_grace_period() -> u64 {
    200
}

fn default_min_samples() -> u64 {
    100
}

fn default_max_bins() -> usize {
    10
}

fn default_observations_before_binning() -> usize {
    100
}

fn default_memory_estimate_period() -> u64 {
    1_000_000
}

/// Hyperparameters fixed when a tree is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HoeffdingTreeOptions {
    #[schemars(
        title = "Split Confidence",
        description = "Allowed error δ in split decisions, in (0, 1)",
        range(min = 0.0, max = 1.0)
    )]
    pub split_confidence: f64,

    #[schemars(
        title = "Tie Threshold",
        description = "Split anyway once the Hoeffding bound drops below this value",
        range(min = 0.0)
    )]
    pub tie_threshold: f64,

    #[schemars(
        title = "Grace Period",
        description = "Examples a leaf absorbs between split evaluations",
        range(min = 1)
    )]
    pub grace_period: u64,

    #[schemars(
        title = "Minimum Samples",
        description = "Examples a leaf must have seen before it may split",
        range(min = 1)
    )]
    pub min_samples: u64,

    #[schemars(
        title = "Maximum Samples",
        description = "Force a split once a leaf has seen this many examples (None = never)",
        range(min = 1)
    )]
    pub max_samples: Option<u64>,

    #[schemars(
        title = "Max Bins",
        description = "Bins kept per numeric attribute by the multi-bin strategy",
        range(min = 2)
    )]
    pub max_bins: usize,

    #[schemars(
        title = "Observations Before Binning",
        description = "Observations buffered before the binary strategy freezes its threshold",
        range(min = 1)
    )]
    pub observations_before_binning: usize,

    #[schemars(title = "Split Criterion", description = "gini / info-gain")]
    pub split_criterion: SplitCriterionKind,

    #[schemars(title = "Numeric Split", description = "binary / multi-bin")]
    pub numeric_split: NumericSplitKind,

    #[schemars(
        title = "Binary Splits",
        description = "Split categorical attributes one-vs-rest only, never multiway"
    )]
    pub binary_splits: bool,

    #[schemars(
        title = "No Pre-Prune",
        description = "Drop the \"do not split\" option from split evaluations"
    )]
    pub no_pre_prune: bool,

    #[schemars(
        title = "Remove Poor Attributes",
        description = "Stop tracking attributes that trail the best by more than the bound"
    )]
    pub remove_poor_attributes: bool,

    #[schemars(
        title = "Max Byte Size",
        description = "Stop growing once the estimated size exceeds this (None = unlimited)",
        range(min = 1)
    )]
    pub max_byte_size: Option<usize>,

    #[schemars(
        title = "Memory Estimate Period",
        description = "Training examples between size estimates",
        range(min = 1)
    )]
    pub memory_estimate_period: u64,
}

impl Default for HoeffdingTreeOptions {
    fn default() -> Self {
        Self {
            split_confidence: default_split_confidence(),
            tie_threshold: default_tie_threshold(),
            grace_period: default_grace_period(),
            min_samples: default_min_samples(),
            max_samples: None,
            max_bins: default_max_bins(),
            observations_before_binning: default_observations_before_binning(),
            split_criterion: SplitCriterionKind::default(),
            numeric_split: NumericSplitKind::default(),
            binary_splits: false,
            no_pre_prune: false,
            remove_poor_attributes: false,
            max_byte_size: None,
            memory_estimate_period: default_memory_estimate_period(),
        }
    }
}

impl HoeffdingTreeOptions {
    pub fn validate(&self) -> Result<(), TreeError> {
        let delta = self.split_confidence;
        if !(delta > 0.0 && delta < 1.0) {
            return Err(TreeError::hyperparameter(
                "split_confidence",
                format!("must lie in (0, 1), got {delta}"),
            ));
        }
        if !self.tie_threshold.is_finite() || self.tie_threshold < 0.0 {
            return Err(TreeError::hyperparameter(
                "tie_threshold",
                format!("must be finite and >= 0, got {}", self.tie_threshold),
            ));
        }
        if self.grace_period == 0 {
            return Err(TreeError::hyperparameter("grace_period", "must be >= 1"));
        }
        if self.min_samples == 0 {
            return Err(TreeError::hyperparameter("min_samples", "must be >= 1"));
        }
        if self.max_samples == Some(0) {
            return Err(TreeError::hyperparameter("max_samples", "must be >= 1 when set"));
        }
        if self.max_bins < 2 {
            return Err(TreeError::hyperparameter(
                "max_bins",
                format!("must be >= 2, got {}", self.max_bins),
            ));
        }
        if self.observations_before_binning == 0 {
            return Err(TreeError::hyperparameter(
                "observations_before_binning",
                "must be >= 1",
            ));
        }
        if self.max_byte_size == Some(0) {
            return Err(TreeError::hyperparameter("max_byte_size", "must be >= 1 when set"));
        }
        if self.memory_estimate_period == 0 {
            return Err(TreeError::hyperparameter(
                "memory_estimate_period",
                "must be >= 1",
            ));
        }
        Ok(())
    }
}
