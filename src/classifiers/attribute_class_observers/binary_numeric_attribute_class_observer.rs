use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::hoeffding_tree::instance_conditional_test::{
    NumericAttributeBinaryTest, SplitTest,
};
use crate::classifiers::hoeffding_tree::split_criteria::{SplitCriterion, SplitCriterionKind};
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Numeric observer with a single threshold. The first observations are
/// buffered exactly; once enough have been seen the best midpoint is frozen
/// and only the two sides are counted from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryNumericAttributeClassObserver {
    num_classes: usize,
    observations_before_binning: usize,
    criterion: SplitCriterionKind,
    seen: u64,
    state: ThresholdState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
enum ThresholdState {
    /// Distinct values in increasing order with their class counts.
    Buffering { values: Vec<(f64, Vec<u64>)> },
    Frozen {
        threshold: f64,
        below: Vec<u64>,
        at_or_above: Vec<u64>,
    },
}

/// Midpoint of two consecutive distinct values that still separates them.
pub(crate) fn midpoint(a: f64, b: f64) -> f64 {
    let t = a + (b - a) / 2.0;
    if t > a { t } else { b }
}

impl BinaryNumericAttributeClassObserver {
    pub fn new(
        num_classes: usize,
        observations_before_binning: usize,
        criterion: SplitCriterionKind,
    ) -> Self {
        Self {
            num_classes,
            observations_before_binning,
            criterion,
            seen: 0,
            state: ThresholdState::Buffering { values: Vec::new() },
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        match &self.state {
            ThresholdState::Frozen { threshold, .. } => Some(*threshold),
            ThresholdState::Buffering { .. } => None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.threshold().is_some()
    }

    /// Verifies a deserialized observer: buffered values finite and strictly
    /// increasing, a finite frozen threshold, counts sized by `num_classes`.
    pub(crate) fn check_consistency(&self, num_classes: usize) -> Result<(), String> {
        if self.num_classes != num_classes {
            return Err(format!(
                "observer tracks {} classes, header has {num_classes}",
                self.num_classes
            ));
        }
        match &self.state {
            ThresholdState::Buffering { values } => {
                if values
                    .iter()
                    .any(|(v, counts)| !v.is_finite() || counts.len() != num_classes)
                {
                    return Err("buffered value is malformed".to_string());
                }
                if values.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
                    return Err("buffered values are not strictly increasing".to_string());
                }
            }
            ThresholdState::Frozen {
                threshold,
                below,
                at_or_above,
            } => {
                if !threshold.is_finite()
                    || below.len() != num_classes
                    || at_or_above.len() != num_classes
                {
                    return Err("frozen threshold state is malformed".to_string());
                }
            }
        }
        Ok(())
    }

    /// Best threshold over the buffered values: `(threshold, merit, below, at_or_above)`.
    fn best_buffered_split(
        values: &[(f64, Vec<u64>)],
        criterion: &dyn SplitCriterion,
        pre: &[u64],
        num_classes: usize,
    ) -> Option<(f64, f64, Vec<u64>, Vec<u64>)> {
        let mut total = vec![0; num_classes];
        for (_, counts) in values {
            add_counts(&mut total, counts);
        }

        let mut best: Option<(f64, f64, Vec<u64>, Vec<u64>)> = None;
        let mut below = vec![0; num_classes];
        for pair in values.windows(2) {
            add_counts(&mut below, &pair[0].1);
            let above: Vec<u64> = total.iter().zip(&below).map(|(t, b)| t - b).collect();
            let post = [below.clone(), above];
            let merit = criterion.get_merit_of_split(pre, &post);
            if best.as_ref().is_none_or(|b| merit > b.1) {
                let [below, above] = post;
                best = Some((midpoint(pair[0].0, pair[1].0), merit, below, above));
            }
        }
        best
    }

    fn freeze_if_ready(&mut self) {
        let ThresholdState::Buffering { values } = &self.state else {
            return;
        };
        if (self.seen as usize) < self.observations_before_binning || values.len() < 2 {
            return;
        }
        let mut total = vec![0; self.num_classes];
        for (_, counts) in values {
            add_counts(&mut total, counts);
        }
        if let Some((threshold, _, below, at_or_above)) =
            Self::best_buffered_split(values, &self.criterion, &total, self.num_classes)
        {
            self.state = ThresholdState::Frozen {
                threshold,
                below,
                at_or_above,
            };
        }
    }
}

fn add_counts(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s;
    }
}

impl AttributeClassObserver for BinaryNumericAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize) -> Result<(), TreeError> {
        if class_val >= self.num_classes {
            return Err(TreeError::InvalidLabel {
                label: class_val,
                num_classes: self.num_classes,
            });
        }
        match &mut self.state {
            ThresholdState::Buffering { values } => {
                match values.binary_search_by(|(v, _)| v.total_cmp(&att_val)) {
                    Ok(pos) => values[pos].1[class_val] += 1,
                    Err(pos) => {
                        let mut counts = vec![0; self.num_classes];
                        counts[class_val] = 1;
                        values.insert(pos, (att_val, counts));
                    }
                }
            }
            ThresholdState::Frozen {
                threshold,
                below,
                at_or_above,
            } => {
                if att_val < *threshold {
                    below[class_val] += 1;
                } else {
                    at_or_above[class_val] += 1;
                }
            }
        }
        self.seen += 1;
        self.freeze_if_ready();
        Ok(())
    }

    fn class_distribution(&self) -> Vec<u64> {
        let mut dist = vec![0; self.num_classes];
        match &self.state {
            ThresholdState::Buffering { values } => {
                for (_, counts) in values {
                    add_counts(&mut dist, counts);
                }
            }
            ThresholdState::Frozen {
                below, at_or_above, ..
            } => {
                add_counts(&mut dist, below);
                add_counts(&mut dist, at_or_above);
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
        let (threshold, merit, below, at_or_above) = match &self.state {
            ThresholdState::Buffering { values } => {
                match Self::best_buffered_split(values, criterion, pre_split_dist, self.num_classes)
                {
                    Some(best) => best,
                    None => return Vec::new(),
                }
            }
            ThresholdState::Frozen {
                threshold,
                below,
                at_or_above,
            } => {
                let post = [below.clone(), at_or_above.clone()];
                let merit = criterion.get_merit_of_split(pre_split_dist, &post);
                let [below, at_or_above] = post;
                (*threshold, merit, below, at_or_above)
            }
        };
        vec![AttributeSplitSuggestion::new(
            Some(SplitTest::NumericBinary(NumericAttributeBinaryTest::new(
                att_index, threshold,
            ))),
            vec![below, at_or_above],
            merit,
        )]
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for BinaryNumericAttributeClassObserver {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        match &self.state {
            ThresholdState::Buffering { values } => {
                let mut total = values.capacity() * size_of::<(f64, Vec<u64>)>();
                for (_, counts) in values {
                    total += meter.measure_field(counts);
                }
                total
            }
            ThresholdState::Frozen {
                below, at_or_above, ..
            } => meter.measure_field(below) + meter.measure_field(at_or_above),
        }
    }
}
