use crate::classifiers::hoeffding_tree::nodes::{NodeId, ParentLink};

/// Where routing an attribute vector ended: the leaf and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundNode {
    node: NodeId,
    parent: Option<ParentLink>,
}

impl FoundNode {
    pub fn new(node: NodeId, parent: Option<ParentLink>) -> Self {
        Self { node, parent }
    }

    pub fn get_node(&self) -> NodeId {
        self.node
    }

    pub fn get_parent(&self) -> Option<NodeId> {
        self.parent.map(|p| p.node)
    }

    pub fn get_parent_branch(&self) -> Option<usize> {
        self.parent.map(|p| p.branch)
    }
}
