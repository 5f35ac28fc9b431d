use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::instance_conditional_test::{
    NominalAttributeBinaryTest, NominalAttributeMultiwayTest, SplitTest,
};
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterion;
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Class counts per category of a categorical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalAttributeClassObserver {
    attribute_index: usize,
    /// `[category][class]`, sized by arity up front.
    class_counts_per_value: Vec<Vec<u64>>,
    num_classes: usize,
}

impl NominalAttributeClassObserver {
    pub fn new(attribute_index: usize, arity: usize, num_classes: usize) -> Self {
        Self {
            attribute_index,
            class_counts_per_value: vec![vec![0; num_classes]; arity],
            num_classes,
        }
    }

    pub fn arity(&self) -> usize {
        self.class_counts_per_value.len()
    }

    pub fn counts_for_value(&self, value: usize) -> Option<&[u64]> {
        self.class_counts_per_value.get(value).map(Vec::as_slice)
    }

    /// Verifies a deserialized observer against the attribute it claims to
    /// summarise.
    pub(crate) fn check_consistency(
        &self,
        attribute_index: usize,
        arity: usize,
        num_classes: usize,
    ) -> Result<(), String> {
        if self.attribute_index != attribute_index {
            return Err(format!(
                "observer for attribute {} sits in slot {attribute_index}",
                self.attribute_index
            ));
        }
        if self.arity() != arity {
            return Err(format!("observer arity {} but attribute arity {arity}", self.arity()));
        }
        if self.num_classes != num_classes
            || self.class_counts_per_value.iter().any(|row| row.len() != num_classes)
        {
            return Err("observer class counts have the wrong size".to_string());
        }
        Ok(())
    }

    fn value_is_observed(&self, value: usize) -> bool {
        self.class_counts_per_value[value].iter().any(|&c| c > 0)
    }

    pub fn get_class_dists_resulting_from_multiway_split(&self) -> Vec<Vec<u64>> {
        self.class_counts_per_value.clone()
    }

    pub fn get_class_dists_resulting_from_binary_split(&self, value: usize) -> Vec<Vec<u64>> {
        let mut lhs = vec![0; self.num_classes];
        let mut rhs = vec![0; self.num_classes];
        for (v, row) in self.class_counts_per_value.iter().enumerate() {
            let side = if v == value { &mut lhs } else { &mut rhs };
            for (dst, &count) in side.iter_mut().zip(row) {
                *dst += count;
            }
        }
        vec![lhs, rhs]
    }
}

impl AttributeClassObserver for NominalAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize) -> Result<(), TreeError> {
        let category = att_val as usize;
        let arity = self.arity();
        let row = self
            .class_counts_per_value
            .get_mut(category)
            .ok_or(TreeError::InvalidCategory {
                attribute: self.attribute_index,
                category,
                arity,
            })?;
        let count = row.get_mut(class_val).ok_or(TreeError::InvalidLabel {
            label: class_val,
            num_classes: self.num_classes,
        })?;
        *count += 1;
        Ok(())
    }

    fn class_distribution(&self) -> Vec<u64> {
        let mut dist = vec![0; self.num_classes];
        for row in &self.class_counts_per_value {
            for (dst, &count) in dist.iter_mut().zip(row) {
                *dst += count;
            }
        }
        dist
    }

    fn split_suggestions(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion> {
        let mut out = Vec::new();

        if !binary_only {
            let post_split_dists = self.get_class_dists_resulting_from_multiway_split();
            let merit = criterion.get_merit_of_split(pre_split_dist, &post_split_dists);
            out.push(AttributeSplitSuggestion::new(
                Some(SplitTest::NominalMultiway(NominalAttributeMultiwayTest::new(
                    att_index,
                    self.arity(),
                ))),
                post_split_dists,
                merit,
            ));
        }

        for value in (0..self.arity()).filter(|&v| self.value_is_observed(v)) {
            let post_split_dists = self.get_class_dists_resulting_from_binary_split(value);
            let merit = criterion.get_merit_of_split(pre_split_dist, &post_split_dists);
            out.push(AttributeSplitSuggestion::new(
                Some(SplitTest::NominalBinary(NominalAttributeBinaryTest::new(
                    att_index, value,
                ))),
                post_split_dists,
                merit,
            ));
        }
        out
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for NominalAttributeClassObserver {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.class_counts_per_value)
    }
}
