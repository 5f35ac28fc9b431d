use crate::classifiers::Classifier;
use crate::classifiers::attribute_class_observers::{
    AttributeObserver, BinaryNumericAttributeClassObserver, BinnedNumericAttributeClassObserver,
    NominalAttributeClassObserver,
};
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::instance_conditional_test::{
    InstanceConditionalTest, SplitTest,
};
use crate::classifiers::hoeffding_tree::nodes::{
    FoundNode, LearningNode, Node, NodeId, ParentLink, SplitNode,
};
use crate::classifiers::hoeffding_tree::options::{HoeffdingTreeOptions, NumericSplitKind};
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterion;
use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::mem::size_of;

const ROOT: NodeId = 0;

/// An incremental decision tree grown one labelled example at a time.
///
/// Nodes live in an arena indexed by [`NodeId`]; the root is always node 0.
/// A split replaces a leaf in place with a decision node and appends fresh
/// leaves for its branches, so ids are stable and nodes are never removed
/// short of [`HoeffdingTree::reset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoeffdingTree {
    header: InstanceHeader,
    options: HoeffdingTreeOptions,
    nodes: Vec<Node>,
    decision_node_count: usize,
    active_leaf_node_count: usize,
    training_samples_seen: u64,
    growth_allowed: bool,
}

impl HoeffdingTree {
    pub fn new(header: InstanceHeader, options: HoeffdingTreeOptions) -> Result<Self, TreeError> {
        header.validate()?;
        options.validate()?;
        let mut tree = Self {
            header,
            options,
            nodes: Vec::new(),
            decision_node_count: 0,
            active_leaf_node_count: 0,
            training_samples_seen: 0,
            growth_allowed: true,
        };
        tree.reset();
        Ok(tree)
    }

    /// `sqrt(R² · ln(1/δ) / 2n)`: with probability `1 - δ` the observed mean
    /// of `n` samples with range `R` is within this distance of the true mean.
    pub fn compute_hoeffding_bound(range: f64, confidence: f64, n: f64) -> f64 {
        ((range * range * (1.0 / confidence).ln()) / (2.0 * n)).sqrt()
    }

    fn hoeffding_bound_for(&self, n: u64) -> f64 {
        Self::compute_hoeffding_bound(
            self.options
                .split_criterion
                .get_range_of_merit(self.header.number_of_classes()),
            self.options.split_confidence,
            n as f64,
        )
    }

    /// Bound the next split evaluation of leaf `id` would use, given every
    /// example the leaf has seen so far. `None` for decision nodes.
    pub fn split_bound(&self, id: NodeId) -> Option<f64> {
        let leaf = self.nodes.get(id)?.as_leaf()?;
        Some(self.hoeffding_bound_for(leaf.get_weight_seen()))
    }

    pub(crate) fn new_attribute_observer(
        header: &InstanceHeader,
        options: &HoeffdingTreeOptions,
        attribute_index: usize,
    ) -> AttributeObserver {
        let num_classes = header.number_of_classes();
        match header.attribute_at_index(attribute_index) {
            Some(Attribute::Nominal(a)) => AttributeObserver::Nominal(
                NominalAttributeClassObserver::new(attribute_index, a.arity(), num_classes),
            ),
            _ => match options.numeric_split {
                NumericSplitKind::Binary => {
                    AttributeObserver::BinaryNumeric(BinaryNumericAttributeClassObserver::new(
                        num_classes,
                        options.observations_before_binning,
                        options.split_criterion,
                    ))
                }
                NumericSplitKind::MultiBin => AttributeObserver::BinnedNumeric(
                    BinnedNumericAttributeClassObserver::new(num_classes, options.max_bins),
                ),
            },
        }
    }

    fn new_learning_node(&self, parent: Option<ParentLink>, depth: usize) -> LearningNode {
        let observers = (0..self.header.number_of_attributes())
            .map(|i| Some(Self::new_attribute_observer(&self.header, &self.options, i)))
            .collect();
        LearningNode::new(observers, self.header.number_of_classes(), parent).with_depth(depth)
    }

    pub fn header(&self) -> &InstanceHeader {
        &self.header
    }

    pub fn options(&self) -> &HoeffdingTreeOptions {
        &self.options
    }

    pub fn root_id(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn decision_node_count(&self) -> usize {
        self.decision_node_count
    }

    pub fn leaf_count(&self) -> usize {
        self.active_leaf_node_count
    }

    /// Length of the longest root-to-leaf path; 0 for a lone root leaf.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    pub fn split_test(&self, id: NodeId) -> Option<&SplitTest> {
        self.nodes.get(id)?.as_split().map(SplitNode::split_test)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .and_then(Node::as_split)
            .map(SplitNode::children)
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent().map(|p| p.node)
    }

    pub fn training_samples_seen(&self) -> u64 {
        self.training_samples_seen
    }

    pub fn is_growth_allowed(&self) -> bool {
        self.growth_allowed
    }

    /// Discards every node and starts over from a single empty leaf.
    pub fn reset(&mut self) {
        let root = self.new_learning_node(None, 0);
        self.nodes = vec![Node::Leaf(root)];
        self.decision_node_count = 0;
        self.active_leaf_node_count = 1;
        self.training_samples_seen = 0;
        self.growth_allowed = true;
    }

    /// Follows split tests from the root to a leaf. A category a decision
    /// node has never seen is sent down its first branch.
    pub fn filter_instance_to_leaf(&self, values: &[f64]) -> FoundNode {
        let mut current = ROOT;
        let mut parent = None;
        while let Some(Node::Split(split)) = self.nodes.get(current) {
            let branch = match split.instance_child_index(values) {
                Ok(branch) => branch,
                Err(err) => {
                    tracing::trace!(node = current, %err, "routing to first branch");
                    0
                }
            };
            let Some(child) = split.get_child(branch) else {
                break;
            };
            parent = Some(ParentLink {
                node: current,
                branch,
            });
            current = child;
        }
        FoundNode::new(current, parent)
    }

    fn validate_training_example(&self, values: &[f64], label: usize) -> Result<(), TreeError> {
        self.header.check_values(values)?;
        self.header.check_categories(values)?;
        self.header.check_label(label)
    }

    /// Learns one labelled example and grows the tree if its leaf is ready.
    /// On error the tree is left untouched.
    pub fn train(&mut self, values: &[f64], label: usize) -> Result<(), TreeError> {
        self.validate_training_example(values, label)?;

        let leaf_id = self.filter_instance_to_leaf(values).get_node();
        if let Some(leaf) = self.nodes[leaf_id].as_leaf_mut() {
            leaf.learn_from_instance(values, label)?;
        }
        self.training_samples_seen += 1;

        if self.growth_allowed {
            self.check_leaf(leaf_id);
        }

        if self.training_samples_seen % self.options.memory_estimate_period == 0 {
            self.enforce_memory_limit();
        }
        Ok(())
    }

    /// Runs a split evaluation when the leaf has absorbed a full grace
    /// period. The counter restarts at every such opportunity.
    fn check_leaf(&mut self, leaf_id: NodeId) {
        let Some(leaf) = self.nodes[leaf_id].as_leaf_mut() else {
            return;
        };
        if leaf.samples_since_last_check() < self.options.grace_period {
            return;
        }
        leaf.reset_since_last_check();

        if leaf.get_weight_seen() < self.options.min_samples
            || leaf.observed_class_distribution_is_pure()
        {
            return;
        }
        self.attempt_to_split(leaf_id);
    }

    fn attempt_to_split(&mut self, leaf_id: NodeId) {
        let Some(leaf) = self.nodes[leaf_id].as_leaf() else {
            return;
        };
        let criterion = self.options.split_criterion;
        let mut best_suggestions = leaf.get_best_split_suggestions(
            &criterion,
            self.options.no_pre_prune,
            self.options.binary_splits,
        );
        // Stable, so the null option wins exact ties.
        best_suggestions.sort_by(|a, b| b.get_merit().total_cmp(&a.get_merit()));

        let n = leaf.get_weight_seen();
        let forced = self.options.max_samples.is_some_and(|max| n >= max);
        let hoeffding_bound = self.hoeffding_bound_for(n);

        let should_split = match best_suggestions.as_slice() {
            [] => false,
            [_] => true,
            [best, second, ..] => {
                let merit_gap = best.get_merit() - second.get_merit();
                let decided = merit_gap > hoeffding_bound
                    || hoeffding_bound < self.options.tie_threshold
                    || forced;
                tracing::trace!(
                    node = leaf_id,
                    merit_gap,
                    hoeffding_bound,
                    n,
                    decided,
                    "evaluated split"
                );
                decided
            }
        };

        if self.options.remove_poor_attributes && best_suggestions.len() > 1 {
            self.remove_poor_attributes(leaf_id, &best_suggestions, hoeffding_bound);
        }

        if !should_split {
            return;
        }

        let merit_gap = match best_suggestions.as_slice() {
            [best, second, ..] => best.get_merit() - second.get_merit(),
            _ => f64::INFINITY,
        };
        let Some(split_decision) = best_suggestions.into_iter().next() else {
            return;
        };

        if split_decision.is_null() {
            let (header, options) = (&self.header, &self.options);
            if let Some(leaf) = self.nodes[leaf_id].as_leaf_mut() {
                leaf.reset_observers(|i| Self::new_attribute_observer(header, options, i));
                tracing::debug!(
                    node = leaf_id,
                    declined = leaf.declined_splits(),
                    n,
                    "declined to split"
                );
            }
        } else {
            tracing::debug!(
                node = leaf_id,
                attribute = split_decision.attribute_index(),
                merit_gap,
                hoeffding_bound,
                n,
                forced,
                "splitting leaf"
            );
            self.split_leaf(leaf_id, split_decision);
        }
    }

    /// Stops tracking attributes whose best candidate trails the overall
    /// best by more than the bound.
    fn remove_poor_attributes(
        &mut self,
        leaf_id: NodeId,
        best_suggestions: &[AttributeSplitSuggestion],
        hoeffding_bound: f64,
    ) {
        let Some(best_merit) = best_suggestions.first().map(|s| s.get_merit()) else {
            return;
        };
        let poor_atts: HashSet<usize> = best_suggestions
            .iter()
            .filter(|s| best_merit - s.get_merit() > hoeffding_bound)
            .filter_map(|s| s.get_split_test())
            .flat_map(|t| t.get_atts_test_depends_on())
            .collect();

        if let Some(leaf) = self.nodes[leaf_id].as_leaf_mut() {
            for att in poor_atts {
                if leaf.is_attribute_active(att) {
                    tracing::debug!(node = leaf_id, attribute = att, "removing poor attribute");
                    leaf.disable_attribute(att);
                }
            }
        }
    }

    /// Turns the leaf into a decision node with one fresh leaf per branch.
    fn split_leaf(&mut self, leaf_id: NodeId, split_decision: AttributeSplitSuggestion) {
        let Some(leaf) = self.nodes[leaf_id].as_leaf() else {
            return;
        };
        let (parent, depth) = (leaf.parent(), leaf.depth());
        let class_distribution = leaf.get_observed_class_distribution().to_vec();
        let Some(split_test) = split_decision.into_split_test() else {
            return;
        };

        let branches = split_test.max_branches();
        let first_child = self.nodes.len();
        let children: Vec<NodeId> = (first_child..first_child + branches).collect();
        for branch in 0..branches {
            let link = ParentLink {
                node: leaf_id,
                branch,
            };
            let child = self.new_learning_node(Some(link), depth + 1);
            self.nodes.push(Node::Leaf(child));
        }

        self.nodes[leaf_id] = Node::Split(SplitNode::new(
            split_test,
            children,
            class_distribution,
            parent,
            depth,
        ));
        self.decision_node_count += 1;
        self.active_leaf_node_count += branches - 1;
    }

    /// Disables growth once the estimated size passes `max_byte_size`.
    pub fn enforce_memory_limit(&mut self) {
        let Some(max_byte_size) = self.options.max_byte_size else {
            return;
        };
        if !self.growth_allowed {
            return;
        }
        let size = self.calc_memory_size();
        if size > max_byte_size {
            self.growth_allowed = false;
            tracing::warn!(
                size,
                max_byte_size,
                nodes = self.nodes.len(),
                "memory limit reached, tree growth disabled"
            );
        }
    }

    fn leaf_for(&self, values: &[f64]) -> Result<&LearningNode, TreeError> {
        self.header.check_values(values)?;
        let found = self.filter_instance_to_leaf(values);
        self.nodes[found.get_node()]
            .as_leaf()
            .ok_or_else(|| TreeError::SchemaMismatch("routing did not end at a leaf".to_string()))
    }

    /// Majority class of the leaf `values` reaches, lowest id on ties.
    pub fn predict(&self, values: &[f64]) -> Result<usize, TreeError> {
        Ok(self.leaf_for(values)?.majority_class())
    }

    /// Predicted class and its share of the leaf's examples (0 for an empty leaf).
    pub fn predict_with_probability(&self, values: &[f64]) -> Result<(usize, f64), TreeError> {
        let leaf = self.leaf_for(values)?;
        let class = leaf.majority_class();
        let total = leaf.get_weight_seen();
        let share = match total {
            0 => 0.0,
            _ => leaf.get_observed_class_distribution()[class] as f64 / total as f64,
        };
        Ok((class, share))
    }

    /// Raw class counts of the leaf `values` reaches.
    pub fn class_votes(&self, values: &[f64]) -> Result<Vec<u64>, TreeError> {
        Ok(self.leaf_for(values)?.get_observed_class_distribution().to_vec())
    }

    /// Checks the arena after deserialization: ids in range, one child per
    /// branch, parent links that agree with the children lists, counters
    /// that match the nodes and leaf observers that match the header.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no root".to_string());
        }
        if self.nodes[ROOT].parent().is_some() {
            return Err("root has a parent".to_string());
        }
        let num_classes = self.header.number_of_classes();
        let mut referenced = vec![false; self.nodes.len()];
        let (mut splits, mut leaves) = (0, 0);

        for (id, node) in self.nodes.iter().enumerate() {
            if node.get_observed_class_distribution().len() != num_classes {
                return Err(format!("node {id} has a class distribution of the wrong size"));
            }
            match node {
                Node::Leaf(leaf) => {
                    leaves += 1;
                    leaf.check_against(&self.header).map_err(|e| format!("leaf {id}: {e}"))?;
                }
                Node::Split(split) => {
                    splits += 1;
                    if split.num_children() != split.split_test().max_branches() {
                        return Err(format!(
                            "node {id} has {} children for a {}-way test",
                            split.num_children(),
                            split.split_test().max_branches()
                        ));
                    }
                    for (branch, &child) in split.children().iter().enumerate() {
                        let expected = Some(ParentLink { node: id, branch });
                        match self.nodes.get(child) {
                            Some(c) if c.parent() == expected && !referenced[child] => {
                                referenced[child] = true;
                            }
                            Some(_) => {
                                return Err(format!("child {child} of node {id} is inconsistent"));
                            }
                            None => return Err(format!("child id {child} is out of range")),
                        }
                    }
                }
            }
        }
        if referenced.iter().skip(1).any(|r| !r) {
            return Err("arena holds unreachable nodes".to_string());
        }
        if splits != self.decision_node_count || leaves != self.active_leaf_node_count {
            return Err("node counters do not match the arena".to_string());
        }
        Ok(())
    }

    /// Indented text rendering of the tree, one node per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_node(ROOT, 0, &mut out);
        out
    }

    fn describe_node(&self, id: NodeId, indent: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let pad = "  ".repeat(indent);
        match node {
            Node::Leaf(leaf) => {
                let class = leaf.majority_class();
                let class_name = self
                    .header
                    .class_attribute()
                    .value_name(class)
                    .unwrap_or("?");
                let _ = writeln!(
                    out,
                    "{pad}leaf #{id}: {class_name} {:?}",
                    leaf.get_observed_class_distribution()
                );
            }
            Node::Split(split) => {
                for (branch, &child) in split.children().iter().enumerate() {
                    let condition = split.split_test().describe_branch(branch, &self.header);
                    let _ = writeln!(out, "{pad}if {condition}:");
                    self.describe_node(child, indent + 1, out);
                }
            }
        }
    }
}

impl Classifier for HoeffdingTree {
    fn get_votes_for_instance(&self, instance: &Instance) -> Result<Vec<f64>, TreeError> {
        Ok(self
            .class_votes(instance.values())?
            .into_iter()
            .map(|c| c as f64)
            .collect())
    }

    fn train_on_instance(&mut self, instance: &Instance) -> Result<(), TreeError> {
        let label = instance
            .class_value()
            .ok_or_else(|| TreeError::SchemaMismatch("training example has no label".to_string()))?;
        self.train(instance.values(), label)
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn reset(&mut self) {
        HoeffdingTree::reset(self);
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MemorySized for HoeffdingTree {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        total += meter.measure_field(&self.header);
        total += meter.measure_field(&self.nodes);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterionKind;
    use crate::core::attributes::Attribute;
    use crate::testing::{
        header_mixed, header_numeric, header_two_categories, numeric_concept_stream, options,
        separable_example,
    };

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn separable_tree(grace_period: u64, min_samples: u64) -> HoeffdingTree {
        HoeffdingTree::new(header_two_categories(), options(grace_period, min_samples, 0.05))
            .unwrap()
    }

    fn train_separable(tree: &mut HoeffdingTree, from: usize, to: usize) {
        for i in from..to {
            let (values, label) = separable_example(i);
            tree.train(&values, label).unwrap();
        }
    }

    #[test]
    fn test_compute_hoeffding_bound() {
        let bound = HoeffdingTree::compute_hoeffding_bound(1.0, 0.05, 50.0);
        assert!(approx_eq(bound, ((1.0f64 / 0.05).ln() / 100.0).sqrt(), 1e-12));
        let wider = HoeffdingTree::compute_hoeffding_bound(2.0, 0.05, 50.0);
        assert!(approx_eq(wider, 2.0 * bound, 1e-12));
        let more_data = HoeffdingTree::compute_hoeffding_bound(1.0, 0.05, 200.0);
        assert!(more_data < bound);
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        let bad = HoeffdingTreeOptions {
            max_bins: 1,
            ..Default::default()
        };
        assert!(matches!(
            HoeffdingTree::new(header_mixed(), bad),
            Err(TreeError::InvalidHyperparameter { name: "max_bins", .. })
        ));
        let no_classes = InstanceHeader::with_classes(vec![Attribute::numeric("x")], 0);
        assert!(matches!(
            HoeffdingTree::new(no_classes, HoeffdingTreeOptions::default()),
            Err(TreeError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_fresh_tree_is_a_single_empty_leaf() {
        let tree = HoeffdingTree::new(header_mixed(), HoeffdingTreeOptions::default()).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.decision_node_count(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.node(tree.root_id()).unwrap().is_leaf());
        assert_eq!(tree.predict(&[1.0, 3.5]), Ok(0));
        assert_eq!(tree.predict_with_probability(&[1.0, 3.5]), Ok((0, 0.0)));
    }

    #[test]
    fn test_train_rejects_wrong_arity_without_mutation() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 5);
        let before = tree.clone();
        assert!(matches!(
            tree.train(&[0.0], 0),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert!(matches!(
            tree.predict(&[0.0, 1.0, 1.0]),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_train_rejects_bad_category_and_label_without_mutation() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 5);
        let before = tree.clone();
        assert_eq!(
            tree.train(&[2.0, 0.0], 0),
            Err(TreeError::InvalidCategory {
                attribute: 0,
                category: 2,
                arity: 2
            })
        );
        assert_eq!(
            tree.train(&[1.0, 0.0], 2),
            Err(TreeError::InvalidLabel {
                label: 2,
                num_classes: 2
            })
        );
        assert!(matches!(
            tree.train(&[0.5, 0.0], 0),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_splits_at_first_evaluation_opportunity() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 19);
        assert_eq!(tree.node_count(), 1);

        train_separable(&mut tree, 19, 20);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.decision_node_count(), 1);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
        let test = tree.split_test(tree.root_id()).unwrap();
        assert_eq!(test.attribute_index(), 0);
        assert_eq!(tree.children(tree.root_id()), &[1, 2]);
        assert_eq!(tree.parent(1), Some(0));
        assert_eq!(tree.parent(0), None);
    }

    #[test]
    fn test_splits_only_at_multiples_of_grace_period() {
        let mut tree = separable_tree(20, 30);
        train_separable(&mut tree, 0, 39);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(
            tree.node(0).unwrap().as_leaf().unwrap().samples_since_last_check(),
            19
        );
        train_separable(&mut tree, 39, 40);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_children_start_empty_and_learn_their_branch() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 20);
        for &child in tree.children(0) {
            assert_eq!(tree.node(child).unwrap().get_observed_class_distribution(), &[0, 0]);
        }
        train_separable(&mut tree, 20, 60);
        assert_eq!(tree.node(1).unwrap().get_observed_class_distribution(), &[20, 0]);
        assert_eq!(tree.node(2).unwrap().get_observed_class_distribution(), &[0, 20]);
        assert_eq!(tree.predict(&[0.0, 1.0]), Ok(0));
        assert_eq!(tree.predict(&[1.0, 0.0]), Ok(1));
        assert_eq!(tree.predict_with_probability(&[1.0, 1.0]), Ok((1, 1.0)));
        assert_eq!(tree.class_votes(&[1.0, 1.0]), Ok(vec![0, 20]));
        // pure leaves never split further
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_pure_leaf_never_evaluates() {
        let mut tree = separable_tree(10, 10);
        for i in 0..100 {
            tree.train(&[(i % 2) as f64, 0.0], 0).unwrap();
        }
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(0).unwrap().as_leaf().unwrap().declined_splits(), 0);
    }

    #[test]
    fn test_null_option_wins_tie_and_resets_observers() {
        let mut opts = options(20, 20, 0.05);
        opts.tie_threshold = 1.0;
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        // attribute 1 of the separable stream is independent of the label
        for i in 0..20 {
            let (values, label) = separable_example(i);
            tree.train(&[values[1], values[1]], label).unwrap();
        }
        assert_eq!(tree.node_count(), 1);
        let leaf = tree.node(0).unwrap().as_leaf().unwrap();
        assert_eq!(leaf.declined_splits(), 1);
        assert_eq!(leaf.get_weight_seen(), 20);
        assert_eq!(leaf.get_observer_weight_seen(), 0);
        assert_eq!(leaf.samples_since_last_check(), 0);
    }

    #[test]
    fn test_bound_after_declined_split_counts_every_leaf_sample() {
        let mut opts = options(20, 20, 0.05);
        opts.tie_threshold = 1.0;
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        for i in 0..30 {
            let (values, label) = separable_example(i);
            tree.train(&[values[1], values[1]], label).unwrap();
        }
        let leaf = tree.node(0).unwrap().as_leaf().unwrap();
        assert_eq!(leaf.declined_splits(), 1);
        assert_eq!(leaf.get_weight_seen(), 30);
        assert_eq!(leaf.get_observer_weight_seen(), 10);

        let expected = HoeffdingTree::compute_hoeffding_bound(1.0, 0.05, 30.0);
        assert!(approx_eq(tree.split_bound(0).unwrap(), expected, 1e-12));

        let mut split = separable_tree(20, 20);
        train_separable(&mut split, 0, 20);
        assert_eq!(split.decision_node_count(), 1);
        assert_eq!(split.split_bound(split.root_id()), None);
    }

    #[test]
    fn test_no_pre_prune_splits_on_best_attribute_even_when_tied() {
        let mut opts = options(20, 20, 0.05);
        opts.tie_threshold = 1.0;
        opts.no_pre_prune = true;
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        for i in 0..20 {
            let (values, label) = separable_example(i);
            tree.train(&[values[1], values[1]], label).unwrap();
        }
        assert_eq!(tree.decision_node_count(), 1);
        assert_eq!(tree.split_test(0).unwrap().attribute_index(), 0);
    }

    #[test]
    fn test_bound_above_gap_keeps_leaf() {
        let mut tree =
            HoeffdingTree::new(header_two_categories(), options(20, 20, 1e-7)).unwrap();
        train_separable(&mut tree, 0, 20);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_max_samples_forces_split() {
        let mut opts = options(20, 20, 1e-7);
        opts.max_samples = Some(20);
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        train_separable(&mut tree, 0, 20);
        assert_eq!(tree.decision_node_count(), 1);
        assert_eq!(tree.split_test(0).unwrap().attribute_index(), 0);
    }

    #[test]
    fn test_binary_splits_install_one_vs_rest_test() {
        let header =
            InstanceHeader::with_classes(vec![Attribute::nominal_with_arity("c", 3)], 2);
        let mut opts = options(30, 30, 0.05);
        opts.binary_splits = true;
        let mut tree = HoeffdingTree::new(header, opts).unwrap();
        for i in 0..30 {
            let category = i % 3;
            tree.train(&[category as f64], usize::from(category == 2)).unwrap();
        }
        assert!(matches!(
            tree.split_test(0),
            Some(SplitTest::NominalBinary(t)) if t.attribute_value() == 2
        ));
        assert_eq!(tree.children(0).len(), 2);
        assert_eq!(tree.predict(&[1.0]), Ok(0));
    }

    #[test]
    fn test_unseen_category_routes_to_first_child() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 40);
        assert_eq!(tree.filter_instance_to_leaf(&[7.0, 0.0]).get_node(), 1);
        assert_eq!(tree.predict(&[7.0, 0.0]), Ok(0));
        let found = tree.filter_instance_to_leaf(&[1.0, 0.0]);
        assert_eq!(found.get_node(), 2);
        assert_eq!(found.get_parent(), Some(0));
        assert_eq!(found.get_parent_branch(), Some(1));
    }

    #[test]
    fn test_remove_poor_attributes_drops_uninformative_observer() {
        let header = InstanceHeader::with_classes(
            vec![
                Attribute::nominal_with_arity("a", 2),
                Attribute::nominal_with_arity("noise", 2),
                Attribute::nominal_with_arity("copy", 2),
            ],
            2,
        );
        let mut opts = options(20, 20, 0.05);
        opts.tie_threshold = 0.0;
        opts.remove_poor_attributes = true;
        let mut tree = HoeffdingTree::new(header, opts).unwrap();
        for i in 0..20 {
            let (values, label) = separable_example(i);
            tree.train(&[values[0], values[1], values[0]], label).unwrap();
        }
        assert_eq!(tree.node_count(), 1);
        let leaf = tree.node(0).unwrap().as_leaf().unwrap();
        assert!(leaf.is_attribute_active(0));
        assert!(!leaf.is_attribute_active(1));
        assert!(leaf.is_attribute_active(2));
    }

    #[test]
    fn test_numeric_binary_strategy_splits_on_threshold() {
        let mut opts = options(40, 40, 0.05);
        opts.numeric_split = NumericSplitKind::Binary;
        opts.observations_before_binning = 10;
        let mut tree = HoeffdingTree::new(header_numeric(1), opts).unwrap();
        for i in 0..40 {
            let v = (i % 10) as f64;
            tree.train(&[v], usize::from(v >= 5.0)).unwrap();
        }
        let Some(SplitTest::NumericBinary(t)) = tree.split_test(0) else {
            panic!("expected a numeric split");
        };
        assert!(t.threshold() > 4.0 && t.threshold() <= 5.0);
        assert_eq!(tree.predict(&[4.9]), Ok(0));
    }

    #[test]
    fn test_info_gain_criterion_splits_separable_stream() {
        let mut opts = options(20, 20, 0.05);
        opts.split_criterion = SplitCriterionKind::InfoGain;
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        train_separable(&mut tree, 0, 20);
        assert_eq!(tree.split_test(0).unwrap().attribute_index(), 0);
    }

    #[test]
    fn test_node_count_never_decreases_and_splits_persist() {
        let mut tree = HoeffdingTree::new(header_numeric(3), options(50, 50, 0.01)).unwrap();
        let mut last_count = tree.node_count();
        let mut split_ids: Vec<NodeId> = Vec::new();
        for (values, label) in numeric_concept_stream(11, 5_000, 3) {
            tree.train(&values, label).unwrap();
            assert!(tree.node_count() >= last_count);
            last_count = tree.node_count();
            for &id in &split_ids {
                assert!(!tree.node(id).unwrap().is_leaf());
            }
            split_ids = (0..tree.node_count())
                .filter(|&id| !tree.node(id).unwrap().is_leaf())
                .collect();
        }
        assert!(tree.decision_node_count() > 0);
        assert_eq!(
            tree.node_count(),
            tree.decision_node_count() + tree.leaf_count()
        );
        assert!(tree.check_structure().is_ok());
    }

    #[test]
    fn test_training_is_deterministic() {
        let stream = numeric_concept_stream(3, 2_000, 2);
        let build = || {
            let mut tree =
                HoeffdingTree::new(header_numeric(2), options(50, 50, 0.01)).unwrap();
            for (values, label) in &stream {
                tree.train(values, *label).unwrap();
            }
            tree
        };
        let (a, b) = (build(), build());
        assert_eq!(a, b);
        for (values, _) in stream.iter().take(100) {
            let p = a.predict(values).unwrap();
            assert_eq!(p, b.predict(values).unwrap());
            assert!(p < 2);
        }
    }

    #[test]
    fn test_memory_limit_stops_growth_until_reset() {
        let mut opts = options(20, 20, 0.05);
        opts.max_byte_size = Some(1);
        opts.memory_estimate_period = 1;
        let mut tree = HoeffdingTree::new(header_two_categories(), opts).unwrap();
        train_separable(&mut tree, 0, 40);
        assert!(!tree.is_growth_allowed());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.training_samples_seen(), 40);

        tree.reset();
        assert!(tree.is_growth_allowed());
        assert_eq!(tree.training_samples_seen(), 0);
    }

    #[test]
    fn test_reset_returns_to_single_leaf() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 40);
        assert_eq!(tree.node_count(), 3);
        tree.reset();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.decision_node_count(), 0);
        assert_eq!(tree.node(0).unwrap().get_observed_class_distribution(), &[0, 0]);
    }

    #[test]
    fn test_classifier_surface() {
        let mut tree = separable_tree(20, 20);
        for i in 0..40 {
            let (values, label) = separable_example(i);
            tree.train_on_instance(&Instance::labelled(values, label)).unwrap();
        }
        let votes = tree
            .get_votes_for_instance(&Instance::new(vec![1.0, 0.0], None))
            .unwrap();
        assert_eq!(votes, vec![0.0, 10.0]);
        assert!(matches!(
            tree.train_on_instance(&Instance::new(vec![1.0, 0.0], None)),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert!(Classifier::calc_memory_size(&tree) > 0);
    }

    #[test]
    fn test_check_structure_detects_corruption() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 20);
        assert!(tree.check_structure().is_ok());

        let mut broken = tree.clone();
        broken.nodes.pop();
        assert!(broken.check_structure().is_err());

        let mut miscounted = tree.clone();
        miscounted.decision_node_count = 0;
        assert!(miscounted.check_structure().is_err());
    }

    #[test]
    fn test_describe_names_attributes_and_classes() {
        let mut tree = separable_tree(20, 20);
        train_separable(&mut tree, 0, 40);
        let text = tree.describe();
        assert!(text.contains("if a = 0:"));
        assert!(text.contains("if a = 1:"));
        assert!(text.contains("leaf #2: 1 [0, 10]"));
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HoeffdingTree>();
    }
}
