use std::path::PathBuf;

/// Errors surfaced by training, prediction and construction of a tree.
///
/// Every variant is a deterministic function of the tree state and the input;
/// a call that returns one of these leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The attribute vector does not agree with the configured schema.
    #[error("example does not match schema: {0}")]
    SchemaMismatch(String),

    /// A categorical value is outside the attribute's arity during training.
    #[error("category {category} is outside the arity {arity} of attribute #{attribute}")]
    InvalidCategory {
        attribute: usize,
        category: usize,
        arity: usize,
    },

    /// A categorical value outside the trained arity met a decision node.
    /// Routing resolves this to the first child, so it is never returned
    /// from the public training or prediction calls.
    #[error("category {category} of attribute #{attribute} was never seen during training")]
    UnseenCategory { attribute: usize, category: usize },

    /// The training label is outside the label domain.
    #[error("label {label} is outside the label domain of {num_classes} classes")]
    InvalidLabel { label: usize, num_classes: usize },

    /// A hyperparameter failed validation at construction time.
    #[error("invalid hyperparameter '{name}': {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },

    /// The attribute schema itself cannot support a tree.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl TreeError {
    pub(crate) fn hyperparameter(name: &'static str, reason: impl Into<String>) -> Self {
        TreeError::InvalidHyperparameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors raised while saving or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to (de)serialize model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model structure is inconsistent: {0}")]
    Corrupt(String),
}
