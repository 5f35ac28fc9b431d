use crate::classifiers::hoeffding_tree::instance_conditional_test::{
    InstanceConditionalTest, SplitTest,
};
use crate::classifiers::hoeffding_tree::nodes::{NodeId, ParentLink};
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// A decision node. Its class distribution is the one its leaf had when it split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    split_test: SplitTest,
    children: Vec<NodeId>,
    observed_class_distribution: Vec<u64>,
    parent: Option<ParentLink>,
    depth: usize,
}

impl SplitNode {
    pub fn new(
        split_test: SplitTest,
        children: Vec<NodeId>,
        observed_class_distribution: Vec<u64>,
        parent: Option<ParentLink>,
        depth: usize,
    ) -> Self {
        Self {
            split_test,
            children,
            observed_class_distribution,
            parent,
            depth,
        }
    }

    pub fn split_test(&self) -> &SplitTest {
        &self.split_test
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn get_child(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn get_observed_class_distribution(&self) -> &[u64] {
        &self.observed_class_distribution
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Branch taken by `values`, or the error the test raised.
    pub fn instance_child_index(&self, values: &[f64]) -> Result<usize, TreeError> {
        self.split_test.branch_for_values(values)
    }
}

impl MemorySized for SplitNode {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        total += meter.measure_field(&self.split_test);
        total += meter.measure_field(&self.children);
        total += meter.measure_field(&self.observed_class_distribution);
        total
    }
}
