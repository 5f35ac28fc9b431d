use serde::Serialize;
use std::borrow::Cow;

/// A named metric value reported by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: Cow<'static, str>,
    pub value: f64,
}

impl Measurement {
    pub fn new(name: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
