use super::{NominalAttribute, NumericAttribute};
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};

/// A feature of the stream: either categorical with a fixed arity, or numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Attribute {
    Nominal(NominalAttribute),
    Numeric(NumericAttribute),
}

impl Attribute {
    pub fn nominal(name: impl Into<String>, values: Vec<String>) -> Self {
        Attribute::Nominal(NominalAttribute::with_values(name.into(), values))
    }

    pub fn nominal_with_arity(name: impl Into<String>, arity: usize) -> Self {
        Attribute::Nominal(NominalAttribute::with_arity(name.into(), arity))
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Attribute::Numeric(NumericAttribute::new(name.into()))
    }

    pub fn name(&self) -> &str {
        match self {
            Attribute::Nominal(a) => &a.name,
            Attribute::Numeric(a) => &a.name,
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, Attribute::Nominal(_))
    }

    /// Number of categories, `None` for numeric attributes.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Attribute::Nominal(a) => Some(a.arity()),
            Attribute::Numeric(_) => None,
        }
    }

    pub fn arff_representation(&self) -> String {
        match self {
            Attribute::Nominal(a) => a.arff_representation(),
            Attribute::Numeric(a) => a.arff_representation(),
        }
    }
}

impl MemorySized for Attribute {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        match self {
            Attribute::Nominal(a) => a.extra_heap_size(meter),
            Attribute::Numeric(a) => a.extra_heap_size(meter),
        }
    }
}
