use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericAttribute {
    pub name: String,
}

impl NumericAttribute {
    pub fn new(name: String) -> NumericAttribute {
        NumericAttribute { name }
    }

    pub fn arff_representation(&self) -> String {
        format!("@attribute {} numeric", self.name)
    }
}

impl MemorySized for NumericAttribute {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.name)
    }
}
