use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalAttribute {
    pub name: String,
    pub values: Vec<String>,
}

impl NominalAttribute {
    pub fn with_values(name: String, values: Vec<String>) -> NominalAttribute {
        NominalAttribute { name, values }
    }

    /// Categories named by their ids, `"0"` through `"arity - 1"`.
    pub fn with_arity(name: String, arity: usize) -> NominalAttribute {
        NominalAttribute {
            name,
            values: (0..arity).map(|i| i.to_string()).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn index_of_value(&self, v: &str) -> Option<usize> {
        self.values.iter().position(|x| x == v)
    }

    pub fn value_name(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn arff_representation(&self) -> String {
        format!("@attribute {} {{ {} }}", self.name, self.values.join(", "))
    }
}

impl MemorySized for NominalAttribute {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.name) + meter.measure_field(&self.values)
    }
}
