mod found_node;
mod learning_node;
mod node;
mod split_node;

pub use found_node::FoundNode;
pub use learning_node::LearningNode;
pub use node::{Node, NodeId, ParentLink};
pub use split_node::SplitNode;
