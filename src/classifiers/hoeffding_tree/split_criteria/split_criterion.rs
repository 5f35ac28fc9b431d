use crate::classifiers::hoeffding_tree::split_criteria::{GiniSplitCriterion, InfoGainSplitCriterion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Scores a partition of class counts. Larger merit is a better split, and
/// the merit of the trivial partition `[pre]` is zero.
pub trait SplitCriterion {
    /// Width of the interval merits can take, used by the Hoeffding bound.
    fn get_range_of_merit(&self, num_classes: usize) -> f64;
    fn get_merit_of_split(&self, pre_split_distribution: &[u64], post_split_dists: &[Vec<u64>])
    -> f64;
}

/// The split criterion chosen when a tree is built.
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
pub enum SplitCriterionKind {
    #[default]
    Gini,
    InfoGain,
}

impl SplitCriterion for SplitCriterionKind {
    fn get_range_of_merit(&self, num_classes: usize) -> f64 {
        match self {
            SplitCriterionKind::Gini => GiniSplitCriterion.get_range_of_merit(num_classes),
            SplitCriterionKind::InfoGain => InfoGainSplitCriterion.get_range_of_merit(num_classes),
        }
    }

    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[u64],
        post_split_dists: &[Vec<u64>],
    ) -> f64 {
        match self {
            SplitCriterionKind::Gini => {
                GiniSplitCriterion.get_merit_of_split(pre_split_distribution, post_split_dists)
            }
            SplitCriterionKind::InfoGain => {
                InfoGainSplitCriterion.get_merit_of_split(pre_split_distribution, post_split_dists)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            SplitCriterionKind::from_str("info-gain").unwrap(),
            SplitCriterionKind::InfoGain
        );
        assert_eq!(SplitCriterionKind::Gini.to_string(), "gini");
        assert_eq!(SplitCriterionKind::iter().count(), 2);
    }

    #[test]
    fn kind_dispatches_to_criterion() {
        let pre = vec![5, 5];
        let post = vec![vec![5, 0], vec![0, 5]];
        assert!((SplitCriterionKind::Gini.get_merit_of_split(&pre, &post) - 0.5).abs() < 1e-12);
        assert!((SplitCriterionKind::InfoGain.get_merit_of_split(&pre, &post) - 1.0).abs() < 1e-12);
        assert_eq!(SplitCriterionKind::Gini.get_range_of_merit(4), 1.0);
        assert!((SplitCriterionKind::InfoGain.get_range_of_merit(4) - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&SplitCriterionKind::InfoGain).unwrap();
        assert_eq!(json, "\"info-gain\"");
    }
}
