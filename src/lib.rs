pub mod classifiers;
pub mod core;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod streams;
pub mod tasks;
pub mod ui;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifiers::hoeffding_tree::{
    HoeffdingTree, HoeffdingTreeModel, HoeffdingTreeOptions, NumericSplitKind,
};
pub use error::{PersistenceError, TreeError};
