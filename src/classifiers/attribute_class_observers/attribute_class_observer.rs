use crate::classifiers::attribute_class_observers::{
    BinaryNumericAttributeClassObserver, BinnedNumericAttributeClassObserver,
    NominalAttributeClassObserver,
};
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterion;
use crate::core::attributes::Attribute;
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};

/// Running per-class statistics of one attribute at one leaf.
pub trait AttributeClassObserver {
    /// Records one `(value, class)` pair. This is the only mutator.
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize) -> Result<(), TreeError>;

    /// Per-class counts of everything observed so far.
    fn class_distribution(&self) -> Vec<u64>;

    /// Every split this observer can currently propose, scored against `pre`.
    fn split_suggestions(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion>;

    fn get_best_evaluated_split_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        binary_only: bool,
    ) -> Option<AttributeSplitSuggestion> {
        let mut best: Option<AttributeSplitSuggestion> = None;
        for suggestion in self.split_suggestions(criterion, pre_split_dist, att_index, binary_only)
        {
            let better = best
                .as_ref()
                .is_none_or(|b| suggestion.get_merit() > b.get_merit());
            if better {
                best = Some(suggestion);
            }
        }
        best
    }

    /// The null "do not split" option followed by every candidate test.
    fn split_quality(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion> {
        let null_merit =
            criterion.get_merit_of_split(pre_split_dist, &[pre_split_dist.to_vec()]);
        let mut out = vec![AttributeSplitSuggestion::null(pre_split_dist, null_merit)];
        out.extend(self.split_suggestions(criterion, pre_split_dist, att_index, binary_only));
        out
    }

    fn calc_memory_size(&self) -> usize;
}

/// The observer variants a leaf can hold, chosen from the attribute kind
/// and the tree's numeric split strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AttributeObserver {
    Nominal(NominalAttributeClassObserver),
    BinaryNumeric(BinaryNumericAttributeClassObserver),
    BinnedNumeric(BinnedNumericAttributeClassObserver),
}

impl AttributeObserver {
    fn inner(&self) -> &dyn AttributeClassObserver {
        match self {
            AttributeObserver::Nominal(o) => o,
            AttributeObserver::BinaryNumeric(o) => o,
            AttributeObserver::BinnedNumeric(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AttributeClassObserver {
        match self {
            AttributeObserver::Nominal(o) => o,
            AttributeObserver::BinaryNumeric(o) => o,
            AttributeObserver::BinnedNumeric(o) => o,
        }
    }

    /// Checks that a deserialized observer matches `attribute`: a nominal
    /// observer for a categorical attribute with the same arity, a numeric
    /// one otherwise, and class counts sized by `num_classes`.
    pub(crate) fn check_against(
        &self,
        attribute_index: usize,
        attribute: &Attribute,
        num_classes: usize,
    ) -> Result<(), String> {
        match (self, attribute.arity()) {
            (AttributeObserver::Nominal(o), Some(arity)) => {
                o.check_consistency(attribute_index, arity, num_classes)
            }
            (AttributeObserver::BinaryNumeric(o), None) => o.check_consistency(num_classes),
            (AttributeObserver::BinnedNumeric(o), None) => o.check_consistency(num_classes),
            _ => Err(format!(
                "observer kind does not match attribute '{}'",
                attribute.name()
            )),
        }
    }

    /// Total number of observations recorded.
    pub fn observation_count(&self) -> u64 {
        self.class_distribution().iter().sum()
    }
}

impl AttributeClassObserver for AttributeObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize) -> Result<(), TreeError> {
        self.inner_mut().observe_attribute_class(att_val, class_val)
    }

    fn class_distribution(&self) -> Vec<u64> {
        self.inner().class_distribution()
    }

    fn split_suggestions(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion> {
        self.inner()
            .split_suggestions(criterion, pre_split_dist, att_index, binary_only)
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for AttributeObserver {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        match self {
            AttributeObserver::Nominal(o) => o.extra_heap_size(meter),
            AttributeObserver::BinaryNumeric(o) => o.extra_heap_size(meter),
            AttributeObserver::BinnedNumeric(o) => o.extra_heap_size(meter),
        }
    }
}
