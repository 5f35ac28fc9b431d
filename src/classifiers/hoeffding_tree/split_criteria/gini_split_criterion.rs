use crate::classifiers::hoeffding_tree::split_criteria::split_criterion::SplitCriterion;

/// `1 - Σ (cᵢ/n)²`; zero for a pure or empty distribution.
pub fn gini_impurity(distribution: &[u64]) -> f64 {
    let total: u64 = distribution.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let mut gini = 1.0;
    for &count in distribution {
        let rel_freq = count as f64 / total;
        gini -= rel_freq * rel_freq;
    }
    gini.max(0.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GiniSplitCriterion;

impl SplitCriterion for GiniSplitCriterion {
    fn get_range_of_merit(&self, _num_classes: usize) -> f64 {
        1.0
    }

    /// Impurity of `pre` minus the size-weighted impurity of the children.
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[u64],
        post_split_dists: &[Vec<u64>],
    ) -> f64 {
        let dist_weights: Vec<u64> = post_split_dists.iter().map(|d| d.iter().sum()).collect();
        let total_weight: u64 = dist_weights.iter().sum();
        if total_weight == 0 {
            return 0.0;
        }

        let mut gini = 0.0;
        for (dist, &weight) in post_split_dists.iter().zip(&dist_weights) {
            gini += (weight as f64 / total_weight as f64) * gini_impurity(dist);
        }

        gini_impurity(pre_split_distribution) - gini
    }
}
