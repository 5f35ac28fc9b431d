//! Fixtures shared by unit tests and, behind the `test-support` feature,
//! by downstream crates.

mod spies;
mod stubs;

pub use spies::train_spy_classifier::{TrainSpyClassifier, TrainSpyHandle};
pub use stubs::oracle_classifier::OracleClassifier;

use crate::classifiers::hoeffding_tree::HoeffdingTreeOptions;
use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Two binary categorical attributes, two classes.
pub fn header_two_categories() -> InstanceHeader {
    InstanceHeader::with_classes(
        vec![
            Attribute::nominal_with_arity("a", 2),
            Attribute::nominal_with_arity("b", 2),
        ],
        2,
    )
}

/// One binary categorical and one numeric attribute, two classes.
pub fn header_mixed() -> InstanceHeader {
    InstanceHeader::with_classes(
        vec![Attribute::nominal_with_arity("a", 2), Attribute::numeric("x")],
        2,
    )
}

/// `n` numeric attributes named `x0..`, two classes.
pub fn header_numeric(n: usize) -> InstanceHeader {
    InstanceHeader::with_classes(
        (0..n).map(|i| Attribute::numeric(format!("x{i}"))).collect(),
        2,
    )
}

/// The `i`-th example of a stream where attribute 0 equals the label and
/// attribute 1 is independent of it.
pub fn separable_example(i: usize) -> (Vec<f64>, usize) {
    let label = i % 2;
    (vec![label as f64, ((i / 2) % 2) as f64], label)
}

/// Options with the given grace period, minimum samples and confidence;
/// everything else at its default.
pub fn options(grace_period: u64, min_samples: u64, split_confidence: f64) -> HoeffdingTreeOptions {
    HoeffdingTreeOptions {
        grace_period,
        min_samples,
        split_confidence,
        ..Default::default()
    }
}

/// Seeded stream over `header_numeric(attributes)`: values uniform in
/// `[0, 10)`, label 0 iff `x0 + x1 <= 10`.
pub fn numeric_concept_stream(seed: u64, len: usize, attributes: usize) -> Vec<(Vec<f64>, usize)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let values: Vec<f64> = (0..attributes).map(|_| rng.random_range(0.0..10.0)).collect();
            let label = usize::from(values[0] + values.get(1).copied().unwrap_or(0.0) > 10.0);
            (values, label)
        })
        .collect()
}
