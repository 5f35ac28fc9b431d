use crate::core::attributes::{Attribute, NominalAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::streams::stream::Stream;
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Error;
use strum_macros::{Display, EnumIter, EnumString};

/// The four SEA concepts, each a threshold on `a1 + a2`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    ValueEnum,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SeaFunction {
    #[default]
    F1,
    F2,
    F3,
    F4,
}

impl SeaFunction {
    pub fn threshold(self) -> f64 {
        match self {
            SeaFunction::F1 => 8.0,
            SeaFunction::F2 => 9.0,
            SeaFunction::F3 => 7.0,
            SeaFunction::F4 => 9.5,
        }
    }
}

/// Endless seeded stream of three uniform attributes in `[0, 10)`; the
/// label is 0 when `a1 + a2 <= θ`, flipped with probability `noise`.
#[derive(Debug)]
pub struct SeaGenerator {
    header: InstanceHeader,
    function: SeaFunction,
    noise: f64,
    seed: u64,
    max_instances: Option<u64>,
    produced: u64,
    rng: StdRng,
}

impl SeaGenerator {
    pub fn new(
        function: SeaFunction,
        noise: f64,
        seed: u64,
        max_instances: Option<u64>,
    ) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&noise) {
            return Err(Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("noise must lie in [0, 1], got {noise}"),
            ));
        }
        let header = InstanceHeader::new(
            "sea".to_string(),
            vec![
                Attribute::numeric("attrib1"),
                Attribute::numeric("attrib2"),
                Attribute::numeric("attrib3"),
            ],
            NominalAttribute::with_values(
                "class".to_string(),
                vec!["groupA".to_string(), "groupB".to_string()],
            ),
        );
        Ok(Self {
            header,
            function,
            noise,
            seed,
            max_instances,
            produced: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Stream for SeaGenerator {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.max_instances.is_none_or(|max| self.produced < max)
    }

    fn next_instance(&mut self) -> Option<Instance> {
        if !self.has_more_instances() {
            return None;
        }
        let values: Vec<f64> = (0..3).map(|_| self.rng.random_range(0.0..10.0)).collect();
        let mut label = usize::from(values[0] + values[1] > self.function.threshold());
        if self.noise > 0.0 && self.rng.random_bool(self.noise) {
            label = 1 - label;
        }
        self.produced += 1;
        Some(Instance::labelled(values, label))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_threshold_without_noise() {
        let mut s = SeaGenerator::new(SeaFunction::F3, 0.0, 7, Some(500)).unwrap();
        let mut count = 0;
        while let Some(inst) = s.next_instance() {
            let v = inst.values();
            assert!(v.iter().all(|x| (0.0..10.0).contains(x)));
            assert_eq!(inst.class_value(), Some(usize::from(v[0] + v[1] > 7.0)));
            count += 1;
        }
        assert_eq!(count, 500);
        assert!(!s.has_more_instances());
    }

    #[test]
    fn restart_replays_the_same_sequence() {
        let mut s = SeaGenerator::new(SeaFunction::F1, 0.1, 42, None).unwrap();
        let first: Vec<Instance> = (0..20).filter_map(|_| s.next_instance()).collect();
        s.restart().unwrap();
        let again: Vec<Instance> = (0..20).filter_map(|_| s.next_instance()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn noise_flips_roughly_the_requested_share() {
        let mut s = SeaGenerator::new(SeaFunction::F2, 0.2, 1, Some(5_000)).unwrap();
        let mut flipped = 0;
        while let Some(inst) = s.next_instance() {
            let v = inst.values();
            if inst.class_value() != Some(usize::from(v[0] + v[1] > 9.0)) {
                flipped += 1;
            }
        }
        let share = flipped as f64 / 5_000.0;
        assert!((0.15..0.25).contains(&share), "share = {share}");
    }

    #[test]
    fn rejects_bad_noise() {
        assert!(SeaGenerator::new(SeaFunction::F1, 1.5, 0, None).is_err());
    }
}
