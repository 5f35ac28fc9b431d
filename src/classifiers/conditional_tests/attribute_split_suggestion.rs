use crate::classifiers::hoeffding_tree::instance_conditional_test::SplitTest;

/// A candidate split: the test to install (or `None` for "do not split"),
/// the class distributions it would induce, and its merit.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSplitSuggestion {
    split_test: Option<SplitTest>,
    resulting_class_distributions: Vec<Vec<u64>>,
    merit: f64,
}

impl AttributeSplitSuggestion {
    pub fn new(
        split_test: Option<SplitTest>,
        resulting_class_distributions: Vec<Vec<u64>>,
        merit: f64,
    ) -> Self {
        Self {
            split_test,
            resulting_class_distributions,
            merit,
        }
    }

    /// The "do not split" candidate for a leaf with distribution `pre`.
    pub fn null(pre: &[u64], merit: f64) -> Self {
        Self::new(None, vec![pre.to_vec()], merit)
    }

    pub fn get_merit(&self) -> f64 {
        self.merit
    }

    pub fn get_split_test(&self) -> Option<&SplitTest> {
        self.split_test.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.split_test.is_none()
    }

    /// Attribute the test reads, `None` for the null candidate.
    pub fn attribute_index(&self) -> Option<usize> {
        self.split_test.as_ref().map(SplitTest::attribute_index)
    }

    pub fn number_of_splits(&self) -> usize {
        self.resulting_class_distributions.len()
    }

    pub fn resulting_class_distribution_from_split(&self, split_index: usize) -> &[u64] {
        self.resulting_class_distributions
            .get(split_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn into_split_test(self) -> Option<SplitTest> {
        self.split_test
    }
}
