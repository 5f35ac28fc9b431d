use crate::classifiers::hoeffding_tree::nodes::{LearningNode, SplitNode};
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};

/// Stable index of a node in the tree's arena.
pub type NodeId = usize;

/// Back reference from a node to the decision node above it. Used for
/// bookkeeping and introspection only; children are owned through the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub node: NodeId,
    pub branch: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    Leaf(LearningNode),
    Split(SplitNode),
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn get_observed_class_distribution(&self) -> &[u64] {
        match self {
            Node::Leaf(leaf) => leaf.get_observed_class_distribution(),
            Node::Split(split) => split.get_observed_class_distribution(),
        }
    }

    pub fn parent(&self) -> Option<ParentLink> {
        match self {
            Node::Leaf(leaf) => leaf.parent(),
            Node::Split(split) => split.parent(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.depth(),
            Node::Split(split) => split.depth(),
        }
    }

    pub fn as_leaf(&self) -> Option<&LearningNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LearningNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }

    pub fn observed_class_distribution_is_pure(&self) -> bool {
        self.get_observed_class_distribution()
            .iter()
            .filter(|&&c| c > 0)
            .count()
            < 2
    }
}

impl MemorySized for Node {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.extra_heap_size(meter),
            Node::Split(split) => split.extra_heap_size(meter),
        }
    }
}
