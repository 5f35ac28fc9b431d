use crate::classifiers::attribute_class_observers::{AttributeClassObserver, AttributeObserver};
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::nodes::ParentLink;
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterion;
use crate::core::instance_header::InstanceHeader;
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// An active leaf: class counts, one observer per attribute that is still
/// considered for splitting, and the counter driving split evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningNode {
    observed_class_distribution: Vec<u64>,
    /// Class counts seen by the current observers. Differs from
    /// `observed_class_distribution` once the observers have been discarded.
    observer_class_distribution: Vec<u64>,
    /// `None` marks an attribute excluded from splitting at this leaf.
    attribute_observers: Vec<Option<AttributeObserver>>,
    samples_since_last_check: u64,
    declined_splits: u64,
    parent: Option<ParentLink>,
    depth: usize,
}

impl LearningNode {
    pub fn new(
        attribute_observers: Vec<Option<AttributeObserver>>,
        num_classes: usize,
        parent: Option<ParentLink>,
    ) -> Self {
        Self {
            observed_class_distribution: vec![0; num_classes],
            observer_class_distribution: vec![0; num_classes],
            attribute_observers,
            samples_since_last_check: 0,
            declined_splits: 0,
            parent,
            depth: 0,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn get_observed_class_distribution(&self) -> &[u64] {
        &self.observed_class_distribution
    }

    pub fn get_weight_seen(&self) -> u64 {
        self.observed_class_distribution.iter().sum()
    }

    /// Samples the current observers have absorbed.
    pub fn get_observer_weight_seen(&self) -> u64 {
        self.observer_class_distribution.iter().sum()
    }

    pub fn samples_since_last_check(&self) -> u64 {
        self.samples_since_last_check
    }

    pub fn reset_since_last_check(&mut self) {
        self.samples_since_last_check = 0;
    }

    /// How many evaluations chose the "do not split" option.
    pub fn declined_splits(&self) -> u64 {
        self.declined_splits
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn attribute_observers(&self) -> &[Option<AttributeObserver>] {
        &self.attribute_observers
    }

    pub fn is_attribute_active(&self, attribute_index: usize) -> bool {
        matches!(self.attribute_observers.get(attribute_index), Some(Some(_)))
    }

    pub fn num_non_zero_entries(dist: &[u64]) -> usize {
        dist.iter().filter(|&&c| c > 0).count()
    }

    pub fn observed_class_distribution_is_pure(&self) -> bool {
        Self::num_non_zero_entries(&self.observed_class_distribution) < 2
    }

    /// Majority class of the leaf, lowest class id on ties (0 when empty).
    pub fn majority_class(&self) -> usize {
        let mut best = 0;
        for (class, &count) in self.observed_class_distribution.iter().enumerate() {
            if count > self.observed_class_distribution[best] {
                best = class;
            }
        }
        best
    }

    pub fn learn_from_instance(&mut self, values: &[f64], class_val: usize) -> Result<(), TreeError> {
        let num_classes = self.observed_class_distribution.len();
        if class_val >= num_classes {
            return Err(TreeError::InvalidLabel {
                label: class_val,
                num_classes,
            });
        }

        // Observers are updated in turn, so none may fail once the first has
        // changed. Values and labels are checked against the header before
        // routing, and observers against the header on load.
        debug_assert_eq!(self.attribute_observers.len(), values.len());
        for (observer, &value) in self.attribute_observers.iter_mut().zip(values) {
            if let Some(observer) = observer {
                observer.observe_attribute_class(value, class_val)?;
            }
        }
        self.observed_class_distribution[class_val] += 1;
        self.observer_class_distribution[class_val] += 1;
        self.samples_since_last_check += 1;
        Ok(())
    }

    /// The null option (unless `no_pre_prune`) followed by the best
    /// candidate of every active attribute.
    pub fn get_best_split_suggestions(
        &self,
        criterion: &dyn SplitCriterion,
        no_pre_prune: bool,
        binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion> {
        let pre_split_distribution = &self.observer_class_distribution;
        let mut best_suggestions = Vec::new();
        if !no_pre_prune {
            let merit = criterion
                .get_merit_of_split(pre_split_distribution, &[pre_split_distribution.clone()]);
            best_suggestions.push(AttributeSplitSuggestion::null(pre_split_distribution, merit));
        }

        for (i, obs) in self.attribute_observers.iter().enumerate() {
            if let Some(obs) = obs {
                if let Some(best) = obs.get_best_evaluated_split_suggestion(
                    criterion,
                    pre_split_distribution,
                    i,
                    binary_only,
                ) {
                    best_suggestions.push(best);
                }
            }
        }
        best_suggestions
    }

    /// Checks a deserialized leaf against `header`: count vectors sized by
    /// the label domain and one matching observer slot per attribute.
    pub(crate) fn check_against(&self, header: &InstanceHeader) -> Result<(), String> {
        let num_classes = header.number_of_classes();
        if self.observer_class_distribution.len() != num_classes {
            return Err("observer class distribution has the wrong size".to_string());
        }
        if self.attribute_observers.len() != header.number_of_attributes() {
            return Err("wrong number of observers".to_string());
        }
        for (i, slot) in self.attribute_observers.iter().enumerate() {
            let (Some(observer), Some(attribute)) = (slot, header.attribute_at_index(i)) else {
                continue;
            };
            observer
                .check_against(i, attribute, num_classes)
                .map_err(|e| format!("observer {i}: {e}"))?;
        }
        Ok(())
    }

    pub fn disable_attribute(&mut self, attribute_index: usize) {
        if let Some(slot) = self.attribute_observers.get_mut(attribute_index) {
            *slot = None;
        }
    }

    /// Replaces every active observer with a fresh one from `fresh`;
    /// disabled attributes stay disabled.
    pub fn reset_observers(&mut self, mut fresh: impl FnMut(usize) -> AttributeObserver) {
        for (i, slot) in self.attribute_observers.iter_mut().enumerate() {
            if slot.is_some() {
                *slot = Some(fresh(i));
            }
        }
        self.observer_class_distribution.fill(0);
        self.samples_since_last_check = 0;
        self.declined_splits += 1;
    }

    pub fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for LearningNode {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        total += meter.measure_field(&self.observed_class_distribution);
        total += meter.measure_field(&self.observer_class_distribution);
        total += meter.measure_field(&self.attribute_observers);
        total
    }
}
