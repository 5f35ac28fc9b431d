use crate::classifiers::hoeffding_tree::split_criteria::split_criterion::SplitCriterion;

/// `-Σ p log₂ p` over classes with non-zero count.
pub fn entropy(distribution: &[u64]) -> f64 {
    let total: u64 = distribution.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let mut entropy = 0.0;
    for &count in distribution.iter().filter(|&&c| c > 0) {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy.max(0.0)
}

/// Entropy of `parent` minus the size-weighted entropy of `children`.
pub fn information_gain(parent: &[u64], children: &[Vec<u64>]) -> f64 {
    let weights: Vec<u64> = children.iter().map(|d| d.iter().sum()).collect();
    let total: u64 = weights.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let mut children_entropy = 0.0;
    for (dist, &weight) in children.iter().zip(&weights) {
        children_entropy += (weight as f64 / total as f64) * entropy(dist);
    }
    entropy(parent) - children_entropy
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InfoGainSplitCriterion;

impl SplitCriterion for InfoGainSplitCriterion {
    fn get_range_of_merit(&self, num_classes: usize) -> f64 {
        (num_classes.max(2) as f64).ln()
    }

    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[u64],
        post_split_dists: &[Vec<u64>],
    ) -> f64 {
        information_gain(pre_split_distribution, post_split_dists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS
    }

    #[test]
    fn entropy_is_zero_iff_pure() {
        assert_eq!(entropy(&[]), 0.0);
        assert_eq!(entropy(&[0, 0]), 0.0);
        assert_eq!(entropy(&[0, 12]), 0.0);
        assert!(entropy(&[1, 12]) > 0.0);
    }

    #[test]
    fn entropy_of_uniform_distribution_is_log2_of_classes() {
        assert!(approx_eq(entropy(&[5, 5]), 1.0));
        assert!(approx_eq(entropy(&[2, 2, 2, 2]), 2.0));
    }

    #[test]
    fn entropy_is_permutation_invariant() {
        assert!(approx_eq(entropy(&[3, 1, 6]), entropy(&[6, 3, 1])));
    }

    #[test]
    fn gain_of_perfect_split() {
        let gain = information_gain(&[8, 8], &[vec![8, 0], vec![0, 8]]);
        assert!(approx_eq(gain, 1.0));
    }

    #[test]
    fn gain_of_trivial_partition_is_zero() {
        let pre = vec![2, 9, 4];
        assert!(approx_eq(information_gain(&pre, &[pre.clone()]), 0.0));
    }

    #[test]
    fn gain_of_partial_split() {
        // parent [4,4] -> children [3,1] and [1,3]
        let gain = information_gain(&[4, 4], &[vec![3, 1], vec![1, 3]]);
        let child = -(0.75f64 * 0.75f64.log2() + 0.25 * 0.25f64.log2());
        assert!(approx_eq(gain, 1.0 - child));
    }

    #[test]
    fn range_uses_natural_log_with_two_class_floor() {
        assert!(approx_eq(InfoGainSplitCriterion.get_range_of_merit(1), 2f64.ln()));
        assert!(approx_eq(InfoGainSplitCriterion.get_range_of_merit(3), 3f64.ln()));
    }
}
