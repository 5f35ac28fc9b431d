use crate::classifiers::Classifier;
use crate::evaluation::{LearningCurve, PerformanceEvaluator, Snapshot};
use crate::streams::Stream;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use std::sync::mpsc::Sender;

use cpu_time::ThreadTime;

/// Test-then-train loop: every instance is first used to score the learner,
/// then to train it.
pub struct PrequentialEvaluator {
    learner: Box<dyn Classifier>,
    stream: Box<dyn Stream>,
    evaluator: Box<dyn PerformanceEvaluator>,

    curve: LearningCurve,

    max_instances: Option<u64>,
    max_seconds: Option<u64>,
    sample_frequency: u64,
    mem_check_frequency: u64,

    processed: u64,
    training_errors: u64,

    start_cpu: ThreadTime,
    last_cpu_mem: ThreadTime,

    ram_hours: f64,
    progress_tx: Option<Sender<Snapshot>>,
}

impl PrequentialEvaluator {
    pub fn new(
        learner: Box<dyn Classifier>,
        stream: Box<dyn Stream>,
        evaluator: Box<dyn PerformanceEvaluator>,
        max_instances: Option<u64>,
        max_seconds: Option<u64>,
        sample_frequency: u64,
        mem_check_frequency: u64,
    ) -> Result<Self, Error> {
        if sample_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "sample_frequency must be > 0",
            ));
        }
        if mem_check_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "mem_check_frequency must be > 0",
            ));
        }
        if learner.header().number_of_attributes() != stream.header().number_of_attributes()
            || learner.header().number_of_classes() != stream.header().number_of_classes()
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "learner and stream headers disagree",
            ));
        }

        let now = ThreadTime::now();
        Ok(Self {
            learner,
            stream,
            evaluator,
            curve: LearningCurve::default(),
            max_instances,
            max_seconds,
            sample_frequency,
            mem_check_frequency,
            processed: 0,
            training_errors: 0,
            start_cpu: now,
            last_cpu_mem: now,
            ram_hours: 0.0,
            progress_tx: None,
        })
    }

    pub fn with_progress(mut self, tx: Sender<Snapshot>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn run(&mut self) -> Result<(), Error> {
        self.start_cpu = ThreadTime::now();
        self.last_cpu_mem = self.start_cpu;

        while self.stream.has_more_instances() {
            if self.max_instances.is_some_and(|n| self.processed >= n) {
                break;
            }
            if self
                .max_seconds
                .is_some_and(|s| self.start_cpu.elapsed().as_secs() >= s)
            {
                break;
            }

            let Some(instance) = self.stream.next_instance() else {
                break;
            };
            self.processed += 1;

            match self.learner.get_votes_for_instance(&instance) {
                Ok(votes) => self.evaluator.add_result(&instance, &votes),
                Err(e) => tracing::warn!(instance = self.processed, error = %e, "prediction failed"),
            }
            if let Err(e) = self.learner.train_on_instance(&instance) {
                self.training_errors += 1;
                tracing::warn!(instance = self.processed, error = %e, "training failed");
            }

            if self.processed % self.mem_check_frequency == 0 {
                self.bump_ram_hours_cpu();
            }
            if self.processed % self.sample_frequency == 0 {
                self.push_snapshot_cpu();
            }
        }

        self.bump_ram_hours_cpu();
        self.push_snapshot_cpu();
        tracing::info!(
            instances = self.processed,
            training_errors = self.training_errors,
            "prequential evaluation finished"
        );
        Ok(())
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    pub fn learner(&self) -> &dyn Classifier {
        self.learner.as_ref()
    }

    /// Gives the trained learner back once the run is over.
    pub fn into_learner(self) -> Box<dyn Classifier> {
        self.learner
    }

    fn push_snapshot_cpu(&mut self) {
        let secs = self.start_cpu.elapsed().as_secs_f64();

        let mut acc = f64::NAN;
        let mut kap = f64::NAN;
        let mut extras = BTreeMap::new();

        for m in self.evaluator.performance() {
            match m.name.as_ref() {
                "accuracy" => acc = m.value,
                "kappa" => kap = m.value,
                "instances" => {}
                other => {
                    extras.insert(other.to_string(), m.value);
                }
            }
        }

        let snapshot = Snapshot {
            instances_seen: self.processed,
            accuracy: acc,
            kappa: kap,
            ram_hours: self.ram_hours,
            seconds: secs,
            model_bytes: self.learner.calc_memory_size(),
            extras,
        };

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(snapshot.clone());
        }

        self.curve.push(snapshot);
    }

    fn bump_ram_hours_cpu(&mut self) {
        let dt = self.last_cpu_mem.elapsed();
        self.last_cpu_mem = ThreadTime::now();

        let dt_h = dt.as_secs_f64() / 3600.0;

        let model_gb = (self.learner.calc_memory_size() as f64) / (1024.0 * 1024.0 * 1024.0);
        self.ram_hours += model_gb * dt_h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::hoeffding_tree::HoeffdingTree;
    use crate::evaluation::BasicClassificationEvaluator;
    use crate::streams::generators::{SeaFunction, SeaGenerator};
    use crate::testing::{OracleClassifier, TrainSpyClassifier, header_numeric, options};

    fn sea(len: u64) -> Box<dyn Stream> {
        Box::new(SeaGenerator::new(SeaFunction::F1, 0.0, 5, Some(len)).unwrap())
    }

    fn oracle() -> Box<dyn Classifier> {
        Box::new(OracleClassifier::new(header_numeric(3)))
    }

    fn evaluator() -> Box<dyn PerformanceEvaluator> {
        Box::new(BasicClassificationEvaluator::new(2))
    }

    #[test]
    fn ctor_guards() {
        let err = PrequentialEvaluator::new(oracle(), sea(10), evaluator(), None, None, 0, 5)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = PrequentialEvaluator::new(oracle(), sea(10), evaluator(), None, None, 5, 0)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mismatched: Box<dyn Classifier> = Box::new(OracleClassifier::new(header_numeric(2)));
        assert!(PrequentialEvaluator::new(mismatched, sea(10), evaluator(), None, None, 5, 5).is_err());
    }

    #[test]
    fn periodic_and_final_snapshots() {
        let mut pq =
            PrequentialEvaluator::new(oracle(), sea(100), evaluator(), None, None, 10, 7).unwrap();
        pq.run().unwrap();

        assert_eq!(pq.curve().len(), 11);
        let last = pq.curve().latest().unwrap();
        assert_eq!(last.instances_seen, 100);
        assert!(last.accuracy > 0.9999);
        assert!(last.kappa.is_finite() && last.kappa > 0.99);
        assert!(last.ram_hours >= 0.0);
    }

    #[test]
    fn stops_at_max_instances() {
        let mut pq =
            PrequentialEvaluator::new(oracle(), sea(1000), evaluator(), Some(25), None, 5, 3)
                .unwrap();
        pq.run().unwrap();

        assert_eq!(pq.curve().len(), 6);
        assert_eq!(pq.curve().latest().unwrap().instances_seen, 25);
    }

    #[test]
    fn stops_immediately_when_time_zero() {
        let mut pq =
            PrequentialEvaluator::new(oracle(), sea(100), evaluator(), None, Some(0), 10, 10)
                .unwrap();
        pq.run().unwrap();

        assert_eq!(pq.curve().len(), 1);
        let last = pq.curve().latest().unwrap();
        assert_eq!(last.instances_seen, 0);
        assert!(last.accuracy.is_nan());
        assert_eq!(last.kappa, 0.0);
    }

    #[test]
    fn train_called_once_per_instance() {
        let (spy, handle) = TrainSpyClassifier::new(header_numeric(3));
        let mut pq =
            PrequentialEvaluator::new(Box::new(spy), sea(37), evaluator(), None, None, 10, 4)
                .unwrap();
        pq.run().unwrap();

        assert_eq!(handle.count(), 37);
    }

    #[test]
    fn tree_learns_sea_concept() {
        let header = SeaGenerator::new(SeaFunction::F1, 0.0, 5, None)
            .unwrap()
            .header()
            .clone();
        let tree = HoeffdingTree::new(header, options(100, 100, 1e-4)).unwrap();
        let mut pq = PrequentialEvaluator::new(
            Box::new(tree),
            sea(10_000),
            evaluator(),
            None,
            None,
            1_000,
            1_000,
        )
        .unwrap();
        pq.run().unwrap();

        let last = pq.curve().latest().unwrap();
        assert!(last.accuracy > 0.75, "accuracy = {}", last.accuracy);
        assert!(last.model_bytes > 0);
    }
}
