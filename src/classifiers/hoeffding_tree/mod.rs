pub mod hoeffding_tree;
pub mod instance_conditional_test;
pub mod model;
pub mod nodes;
pub mod options;
pub mod split_criteria;

pub use hoeffding_tree::HoeffdingTree;
pub use model::HoeffdingTreeModel;
pub use options::{HoeffdingTreeOptions, NumericSplitKind};
