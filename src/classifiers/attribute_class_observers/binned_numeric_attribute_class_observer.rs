use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::classifiers::attribute_class_observers::binary_numeric_attribute_class_observer::midpoint;
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::instance_conditional_test::{
    NumericAttributeBinaryTest, SplitTest,
};
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterion;
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// A closed value range `[lower, upper]` with the class counts that fell in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub class_counts: Vec<u64>,
}

impl Bin {
    fn total(&self) -> u64 {
        self.class_counts.iter().sum()
    }
}

impl MemorySized for Bin {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.class_counts)
    }
}

/// Numeric observer keeping at most `max_bins` disjoint, ordered bins.
///
/// A value outside every bin opens a new single-point bin. When that pushes
/// the count past the limit, the adjacent pair whose merge loses the least
/// class information is merged: the cost of merging bins `a` and `b` is
/// `n_a·n_b/(n_a+n_b) · Σ_c (p_a(c) − p_b(c))²`, the increase in within-bin
/// class variance. Ties go to the pair with the smaller gap, then the
/// leftmost pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedNumericAttributeClassObserver {
    num_classes: usize,
    max_bins: usize,
    bins: Vec<Bin>,
}

impl BinnedNumericAttributeClassObserver {
    pub fn new(num_classes: usize, max_bins: usize) -> Self {
        Self {
            num_classes,
            max_bins,
            bins: Vec::new(),
        }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Verifies a deserialized observer: bin count within the limit, finite
    /// ordered disjoint bins and class counts sized by `num_classes`.
    pub(crate) fn check_consistency(&self, num_classes: usize) -> Result<(), String> {
        if self.num_classes != num_classes {
            return Err(format!(
                "observer tracks {} classes, header has {num_classes}",
                self.num_classes
            ));
        }
        if self.max_bins < 2 || self.bins.len() > self.max_bins {
            return Err(format!(
                "{} bins for a limit of {}",
                self.bins.len(),
                self.max_bins
            ));
        }
        for bin in &self.bins {
            if !(bin.lower.is_finite() && bin.upper.is_finite() && bin.lower <= bin.upper) {
                return Err(format!("bin [{}, {}] is malformed", bin.lower, bin.upper));
            }
            if bin.class_counts.len() != num_classes {
                return Err("bin class counts have the wrong size".to_string());
            }
        }
        if self.bins.windows(2).any(|pair| pair[0].upper >= pair[1].lower) {
            return Err("bins are unordered or overlap".to_string());
        }
        Ok(())
    }

    fn merge_cost(a: &Bin, b: &Bin) -> f64 {
        let (n_a, n_b) = (a.total() as f64, b.total() as f64);
        if n_a == 0.0 || n_b == 0.0 {
            return 0.0;
        }
        let divergence: f64 = a
            .class_counts
            .iter()
            .zip(&b.class_counts)
            .map(|(&ca, &cb)| {
                let d = ca as f64 / n_a - cb as f64 / n_b;
                d * d
            })
            .sum();
        n_a * n_b / (n_a + n_b) * divergence
    }

    fn merge_cheapest_pair(&mut self) {
        let mut best: Option<(usize, f64, f64)> = None;
        for i in 0..self.bins.len().saturating_sub(1) {
            let (a, b) = (&self.bins[i], &self.bins[i + 1]);
            let cost = Self::merge_cost(a, b);
            let gap = b.lower - a.upper;
            let better = match best {
                None => true,
                Some((_, best_cost, best_gap)) => {
                    cost < best_cost || (cost == best_cost && gap < best_gap)
                }
            };
            if better {
                best = Some((i, cost, gap));
            }
        }

        if let Some((i, _, _)) = best {
            let right = self.bins.remove(i + 1);
            let left = &mut self.bins[i];
            left.upper = right.upper;
            for (dst, src) in left.class_counts.iter_mut().zip(&right.class_counts) {
                *dst += *src;
            }
        }
    }

    /// Best threshold between adjacent bins: `(threshold, merit, below, at_or_above)`.
    /// Linear in the number of bins.
    pub fn best_binary_split(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
    ) -> Option<(f64, f64, Vec<u64>, Vec<u64>)> {
        let total = self.class_distribution();
        let mut below = vec![0; self.num_classes];
        let mut best: Option<(f64, f64, Vec<u64>, Vec<u64>)> = None;

        for pair in self.bins.windows(2) {
            for (dst, src) in below.iter_mut().zip(&pair[0].class_counts) {
                *dst += *src;
            }
            let above: Vec<u64> = total.iter().zip(&below).map(|(t, b)| t - b).collect();
            let post = [below.clone(), above];
            let merit = criterion.get_merit_of_split(pre_split_dist, &post);
            if best.as_ref().is_none_or(|b| merit > b.1) {
                let [below, above] = post;
                best = Some((midpoint(pair[0].upper, pair[1].lower), merit, below, above));
            }
        }
        best
    }
}

impl AttributeClassObserver for BinnedNumericAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize) -> Result<(), TreeError> {
        if class_val >= self.num_classes {
            return Err(TreeError::InvalidLabel {
                label: class_val,
                num_classes: self.num_classes,
            });
        }

        let pos = self.bins.partition_point(|b| b.upper < att_val);
        match self.bins.get_mut(pos) {
            Some(bin) if bin.lower <= att_val => bin.class_counts[class_val] += 1,
            _ => {
                let mut class_counts = vec![0; self.num_classes];
                class_counts[class_val] = 1;
                self.bins.insert(
                    pos,
                    Bin {
                        lower: att_val,
                        upper: att_val,
                        class_counts,
                    },
                );
                if self.bins.len() > self.max_bins {
                    self.merge_cheapest_pair();
                }
            }
        }
        Ok(())
    }

    fn class_distribution(&self) -> Vec<u64> {
        let mut dist = vec![0; self.num_classes];
        for bin in &self.bins {
            for (dst, src) in dist.iter_mut().zip(&bin.class_counts) {
                *dst += *src;
            }
        }
        dist
    }

    fn split_suggestions(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[u64],
        att_index: usize,
        _binary_only: bool,
    ) -> Vec<AttributeSplitSuggestion> {
        self.best_binary_split(criterion, pre_split_dist)
            .map(|(threshold, merit, below, above)| {
                AttributeSplitSuggestion::new(
                    Some(SplitTest::NumericBinary(NumericAttributeBinaryTest::new(
                        att_index, threshold,
                    ))),
                    vec![below, above],
                    merit,
                )
            })
            .into_iter()
            .collect()
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for BinnedNumericAttributeClassObserver {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterionKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_strictly_ordered(bins: &[Bin]) {
        for bin in bins {
            assert!(bin.lower <= bin.upper);
        }
        for pair in bins.windows(2) {
            assert!(pair[0].upper < pair[1].lower);
        }
    }

    #[test]
    fn consistency_check_flags_malformed_bins() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 4);
        for (v, c) in [(1.0, 0), (2.0, 1), (3.0, 0)] {
            obs.observe_attribute_class(v, c).unwrap();
        }
        assert!(obs.check_consistency(2).is_ok());
        assert!(obs.check_consistency(3).is_err());

        let mut short = obs.clone();
        short.bins[0].class_counts = vec![1];
        assert!(short.check_consistency(2).is_err());

        let mut overlapping = obs.clone();
        overlapping.bins[1].lower = 0.5;
        assert!(overlapping.check_consistency(2).is_err());

        let mut too_many = obs.clone();
        too_many.max_bins = 2;
        assert!(too_many.check_consistency(2).is_err());
    }

    #[test]
    fn repeated_value_reuses_its_bin() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 4);
        obs.observe_attribute_class(1.0, 0).unwrap();
        obs.observe_attribute_class(1.0, 1).unwrap();
        assert_eq!(obs.bins().len(), 1);
        assert_eq!(obs.bins()[0].class_counts, vec![1, 1]);
    }

    #[test]
    fn never_exceeds_max_bins() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut obs = BinnedNumericAttributeClassObserver::new(3, 5);
        for _ in 0..1_000 {
            let v: f64 = rng.random_range(-50.0..50.0);
            let c = rng.random_range(0..3);
            obs.observe_attribute_class(v, c).unwrap();
            assert!(obs.bins().len() <= 5);
        }
        assert_strictly_ordered(obs.bins());
        assert_eq!(obs.class_distribution().iter().sum::<u64>(), 1_000);
    }

    #[test]
    fn merge_preserves_per_class_counts() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 3);
        for (v, c) in [(1.0, 0), (2.0, 0), (3.0, 1)] {
            obs.observe_attribute_class(v, c).unwrap();
        }
        let before = obs.class_distribution();
        obs.observe_attribute_class(4.0, 1).unwrap();
        let after = obs.class_distribution();
        assert_eq!(obs.bins().len(), 3);
        assert_eq!(after, vec![before[0], before[1] + 1]);
    }

    #[test]
    fn merges_the_class_homogeneous_pair() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 2);
        obs.observe_attribute_class(0.0, 0).unwrap();
        obs.observe_attribute_class(5.0, 1).unwrap();
        obs.observe_attribute_class(6.0, 1).unwrap();
        let bins = obs.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].lower, bins[0].upper), (0.0, 0.0));
        assert_eq!((bins[1].lower, bins[1].upper), (5.0, 6.0));
        assert_eq!(bins[1].class_counts, vec![0, 2]);
    }

    #[test]
    fn equal_cost_merges_the_closer_pair() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 2);
        obs.observe_attribute_class(0.0, 0).unwrap();
        obs.observe_attribute_class(10.0, 0).unwrap();
        obs.observe_attribute_class(11.0, 0).unwrap();
        assert_eq!((obs.bins()[1].lower, obs.bins()[1].upper), (10.0, 11.0));
    }

    #[test]
    fn value_between_bins_opens_a_new_bin() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 10);
        obs.observe_attribute_class(1.0, 0).unwrap();
        obs.observe_attribute_class(3.0, 0).unwrap();
        obs.observe_attribute_class(2.0, 1).unwrap();
        let lowers: Vec<f64> = obs.bins().iter().map(|b| b.lower).collect();
        assert_eq!(lowers, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn best_binary_split_finds_class_boundary() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 10);
        for v in [1.0, 2.0, 3.0] {
            obs.observe_attribute_class(v, 0).unwrap();
        }
        for v in [7.0, 8.0] {
            obs.observe_attribute_class(v, 1).unwrap();
        }
        let pre = obs.class_distribution();
        let (threshold, merit, below, above) = obs
            .best_binary_split(&SplitCriterionKind::Gini, &pre)
            .unwrap();
        assert_eq!(threshold, 5.0);
        assert!((merit - 0.48).abs() < 1e-12);
        assert_eq!(below, vec![3, 0]);
        assert_eq!(above, vec![0, 2]);
    }

    #[test]
    fn single_bin_has_no_split() {
        let mut obs = BinnedNumericAttributeClassObserver::new(2, 10);
        obs.observe_attribute_class(1.0, 0).unwrap();
        obs.observe_attribute_class(1.0, 1).unwrap();
        let pre = obs.class_distribution();
        assert!(obs.best_binary_split(&SplitCriterionKind::Gini, &pre).is_none());
        assert!(obs.split_suggestions(&SplitCriterionKind::Gini, &pre, 0, false).is_empty());
    }
}
