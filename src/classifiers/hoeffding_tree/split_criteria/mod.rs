mod gini_split_criterion;
mod info_gain_split_criterion;
mod split_criterion;

pub use gini_split_criterion::{GiniSplitCriterion, gini_impurity};
pub use info_gain_split_criterion::{InfoGainSplitCriterion, entropy, information_gain};
pub use split_criterion::{SplitCriterion, SplitCriterionKind};
