use crate::classifiers::classifier::predicted_class;
use crate::core::instances::Instance;
use crate::evaluation::{Measurement, PerformanceEvaluator};

/// Cumulative accuracy and Cohen's kappa over every result seen so far.
#[derive(Debug, Clone)]
pub struct BasicClassificationEvaluator {
    num_classes: usize,
    seen: u64,
    correct: u64,
    true_counts: Vec<u64>,
    predicted_counts: Vec<u64>,
}

impl BasicClassificationEvaluator {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            seen: 0,
            correct: 0,
            true_counts: vec![0; num_classes],
            predicted_counts: vec![0; num_classes],
        }
    }

    pub fn instances_seen(&self) -> u64 {
        self.seen
    }

    /// NaN before the first result.
    pub fn accuracy(&self) -> f64 {
        if self.seen == 0 {
            return f64::NAN;
        }
        self.correct as f64 / self.seen as f64
    }

    /// Agreement beyond chance: `(p0 - pc) / (1 - pc)`, 0 when undefined.
    pub fn kappa(&self) -> f64 {
        if self.seen == 0 {
            return 0.0;
        }
        let n = self.seen as f64;
        let p0 = self.correct as f64 / n;
        let pc: f64 = self
            .true_counts
            .iter()
            .zip(&self.predicted_counts)
            .map(|(&t, &p)| (t as f64 / n) * (p as f64 / n))
            .sum();
        if pc >= 1.0 {
            return 0.0;
        }
        (p0 - pc) / (1.0 - pc)
    }
}

impl PerformanceEvaluator for BasicClassificationEvaluator {
    fn reset(&mut self) {
        *self = Self::new(self.num_classes);
    }

    fn add_result(&mut self, instance: &Instance, votes: &[f64]) {
        let Some(truth) = instance.class_value() else {
            return;
        };
        if truth >= self.num_classes {
            return;
        }
        let predicted = predicted_class(votes).unwrap_or(0).min(self.num_classes - 1);
        self.seen += 1;
        self.true_counts[truth] += 1;
        self.predicted_counts[predicted] += 1;
        if predicted == truth {
            self.correct += 1;
        }
    }

    fn performance(&self) -> Vec<Measurement> {
        vec![
            Measurement::new("instances", self.seen as f64),
            Measurement::new("accuracy", self.accuracy()),
            Measurement::new("kappa", self.kappa()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn record(e: &mut BasicClassificationEvaluator, truth: usize, predicted: usize) {
        let mut votes = vec![0.0; 2];
        votes[predicted] = 1.0;
        e.add_result(&Instance::labelled(vec![0.0], truth), &votes);
    }

    #[test]
    fn empty_evaluator_reports_nan_accuracy_and_zero_kappa() {
        let e = BasicClassificationEvaluator::new(2);
        assert!(e.accuracy().is_nan());
        assert_eq!(e.kappa(), 0.0);
    }

    #[test]
    fn perfect_predictions_give_unit_kappa() {
        let mut e = BasicClassificationEvaluator::new(2);
        for i in 0..10 {
            record(&mut e, i % 2, i % 2);
        }
        assert_eq!(e.accuracy(), 1.0);
        assert!(approx_eq(e.kappa(), 1.0, 1e-12));
    }

    #[test]
    fn constant_predictor_has_zero_kappa() {
        let mut e = BasicClassificationEvaluator::new(2);
        for i in 0..10 {
            record(&mut e, i % 2, 0);
        }
        assert!(approx_eq(e.accuracy(), 0.5, 1e-12));
        assert!(approx_eq(e.kappa(), 0.0, 1e-12));
    }

    #[test]
    fn kappa_matches_hand_computation() {
        // truth:     0 0 0 1 1
        // predicted: 0 0 1 1 0
        let mut e = BasicClassificationEvaluator::new(2);
        for (t, p) in [(0, 0), (0, 0), (0, 1), (1, 1), (1, 0)] {
            record(&mut e, t, p);
        }
        let p0 = 3.0 / 5.0;
        let pc = (3.0 / 5.0) * (3.0 / 5.0) + (2.0 / 5.0) * (2.0 / 5.0);
        assert!(approx_eq(e.kappa(), (p0 - pc) / (1.0 - pc), 1e-12));
    }

    #[test]
    fn unlabelled_results_are_ignored_and_reset_clears() {
        let mut e = BasicClassificationEvaluator::new(2);
        e.add_result(&Instance::new(vec![0.0], None), &[1.0, 0.0]);
        assert_eq!(e.instances_seen(), 0);
        record(&mut e, 1, 1);
        e.reset();
        assert_eq!(e.instances_seen(), 0);
        let names: Vec<_> = e.performance().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["instances", "accuracy", "kappa"]);
    }
}
