use serde::{Deserialize, Serialize};

/// One example of the stream: a dense attribute vector and, when labelled,
/// its class id. Categorical values are carried as integral category ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    values: Vec<f64>,
    class_value: Option<usize>,
}

impl Instance {
    pub fn new(values: Vec<f64>, class_value: Option<usize>) -> Self {
        Self {
            values,
            class_value,
        }
    }

    pub fn labelled(values: Vec<f64>, class_value: usize) -> Self {
        Self::new(values, Some(class_value))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn number_of_attributes(&self) -> usize {
        self.values.len()
    }

    pub fn class_value(&self) -> Option<usize> {
        self.class_value
    }
}
