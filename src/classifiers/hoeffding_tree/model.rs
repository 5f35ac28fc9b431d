use crate::classifiers::hoeffding_tree::hoeffding_tree::HoeffdingTree;
use crate::classifiers::hoeffding_tree::options::{HoeffdingTreeOptions, NumericSplitKind};
use crate::classifiers::hoeffding_tree::split_criteria::SplitCriterionKind;
use crate::core::instance_header::InstanceHeader;
use crate::error::{PersistenceError, TreeError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Owns a [`HoeffdingTree`] and adds batch calls and persistence on top of it.
///
/// The criterion and numeric split strategy are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HoeffdingTreeModel {
    tree: HoeffdingTree,
}

impl HoeffdingTreeModel {
    pub fn new(header: InstanceHeader, options: HoeffdingTreeOptions) -> Result<Self, TreeError> {
        Ok(Self {
            tree: HoeffdingTree::new(header, options)?,
        })
    }

    pub fn from_tree(tree: HoeffdingTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &HoeffdingTree {
        &self.tree
    }

    pub fn options(&self) -> &HoeffdingTreeOptions {
        self.tree.options()
    }

    pub fn header(&self) -> &InstanceHeader {
        self.tree.header()
    }

    pub fn numeric_split(&self) -> NumericSplitKind {
        self.tree.options().numeric_split
    }

    pub fn split_criterion(&self) -> SplitCriterionKind {
        self.tree.options().split_criterion
    }

    pub fn train(&mut self, values: &[f64], label: usize) -> Result<(), TreeError> {
        self.tree.train(values, label)
    }

    /// Trains on each pair in order. Stops at the first failing example;
    /// everything before it stays learned.
    pub fn train_batch<'a, I>(&mut self, examples: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = (&'a [f64], usize)>,
    {
        for (values, label) in examples {
            self.tree.train(values, label)?;
        }
        Ok(())
    }

    pub fn predict(&self, values: &[f64]) -> Result<usize, TreeError> {
        self.tree.predict(values)
    }

    pub fn predict_batch<'a, I>(&self, examples: I) -> Result<Vec<usize>, TreeError>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        examples.into_iter().map(|v| self.tree.predict(v)).collect()
    }

    pub fn reset(&mut self) {
        self.tree.reset();
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        serde_json::to_writer(writer, &self.tree)?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, PersistenceError> {
        let tree: HoeffdingTree = serde_json::from_reader(reader)?;
        tree.header()
            .validate()
            .and_then(|_| tree.options().validate())
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        tree.check_structure().map_err(PersistenceError::Corrupt)?;
        Ok(Self { tree })
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let io_err = |source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        self.save(&mut writer)?;
        writer.flush().map_err(io_err)?;
        tracing::info!(
            path = %path.display(),
            nodes = self.tree.node_count(),
            "saved model"
        );
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::load(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            nodes = model.tree.node_count(),
            "loaded model"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{header_mixed, header_two_categories, options, separable_example};
    use serde_json::Value;

    fn trained_model() -> HoeffdingTreeModel {
        let mut model = HoeffdingTreeModel::new(header_two_categories(), options(20, 20, 0.05))
            .unwrap();
        let examples: Vec<(Vec<f64>, usize)> = (0..60).map(separable_example).collect();
        model
            .train_batch(examples.iter().map(|(v, l)| (v.as_slice(), *l)))
            .unwrap();
        model
    }

    #[test]
    fn exposes_construction_time_configuration() {
        let mut opts = HoeffdingTreeOptions::default();
        opts.numeric_split = NumericSplitKind::Binary;
        opts.split_criterion = SplitCriterionKind::InfoGain;
        let model = HoeffdingTreeModel::new(header_mixed(), opts).unwrap();
        assert_eq!(model.numeric_split(), NumericSplitKind::Binary);
        assert_eq!(model.split_criterion(), SplitCriterionKind::InfoGain);
        assert_eq!(model.header().number_of_attributes(), 2);
    }

    #[test]
    fn train_batch_stops_at_first_error() {
        let mut model =
            HoeffdingTreeModel::new(header_two_categories(), options(20, 20, 0.05)).unwrap();
        let good: &[f64] = &[0.0, 1.0];
        let bad: &[f64] = &[0.0];
        let batch = vec![(good, 0), (bad, 0), (good, 0)];
        assert!(matches!(
            model.train_batch(batch),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert_eq!(model.tree().training_samples_seen(), 1);
    }

    #[test]
    fn predict_batch_matches_single_predictions() {
        let model = trained_model();
        let inputs: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 0.0]];
        let batch = model
            .predict_batch(inputs.iter().map(Vec::as_slice))
            .unwrap();
        assert_eq!(batch, vec![0, 1, 1]);
        assert!(model.predict_batch([[0.0].as_slice()]).is_err());
    }

    #[test]
    fn save_and_load_round_trips_structure_and_predictions() {
        let model = trained_model();
        let mut buf = Vec::new();
        model.save(&mut buf).unwrap();
        let restored = HoeffdingTreeModel::load(buf.as_slice()).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.tree().node_count(), 3);
        assert_eq!(restored.predict(&[1.0, 0.0]), Ok(1));
    }

    #[test]
    fn load_rejects_out_of_range_child() {
        let model = trained_model();
        let mut value: Value = serde_json::to_value(model.tree()).unwrap();
        value["nodes"][0]["children"][1] = Value::from(99);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            HoeffdingTreeModel::load(bytes.as_slice()),
            Err(PersistenceError::Corrupt(_))
        ));
    }

    fn mixed_model_json() -> Value {
        let mut model = HoeffdingTreeModel::new(header_mixed(), options(20, 20, 0.05)).unwrap();
        for i in 0..10 {
            let label = i % 2;
            model.train(&[label as f64, i as f64 * 0.5], label).unwrap();
        }
        serde_json::to_value(model.tree()).unwrap()
    }

    fn load_value(value: &Value) -> Result<HoeffdingTreeModel, PersistenceError> {
        let bytes = serde_json::to_vec(value).unwrap();
        HoeffdingTreeModel::load(bytes.as_slice())
    }

    #[test]
    fn load_rejects_observers_that_disagree_with_the_header() {
        let intact = mixed_model_json();
        let mut model = load_value(&intact).unwrap();
        model.train(&[0.0, 1.0], 1).unwrap();

        let mut short_counts = intact.clone();
        short_counts["nodes"][0]["attribute_observers"][1]["bins"][0]["class_counts"] =
            serde_json::json!([1]);
        assert!(matches!(
            load_value(&short_counts),
            Err(PersistenceError::Corrupt(_))
        ));

        let mut overlapping = intact.clone();
        let upper = overlapping["nodes"][0]["attribute_observers"][1]["bins"][1]["upper"].clone();
        overlapping["nodes"][0]["attribute_observers"][1]["bins"][0]["upper"] = upper;
        assert!(matches!(
            load_value(&overlapping),
            Err(PersistenceError::Corrupt(_))
        ));

        let mut wrong_kind = intact.clone();
        wrong_kind["nodes"][0]["attribute_observers"][0] =
            intact["nodes"][0]["attribute_observers"][1].clone();
        assert!(matches!(
            load_value(&wrong_kind),
            Err(PersistenceError::Corrupt(_))
        ));

        let mut wrong_classes = intact.clone();
        wrong_classes["nodes"][0]["attribute_observers"][0]["num_classes"] = Value::from(3);
        assert!(matches!(
            load_value(&wrong_classes),
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[test]
    fn load_rejects_invalid_options_and_garbage() {
        let model = trained_model();
        let mut value: Value = serde_json::to_value(model.tree()).unwrap();
        value["options"]["max_bins"] = Value::from(1);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            HoeffdingTreeModel::load(bytes.as_slice()),
            Err(PersistenceError::Corrupt(_))
        ));
        assert!(matches!(
            HoeffdingTreeModel::load(&b"{not json"[..]),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = trained_model();
        model.to_file(&path).unwrap();
        let restored = HoeffdingTreeModel::from_file(&path).unwrap();
        assert_eq!(restored.tree().describe(), model.tree().describe());

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            HoeffdingTreeModel::from_file(&missing),
            Err(PersistenceError::Io { .. })
        ));
    }

    #[test]
    fn reset_discards_learned_structure() {
        let mut model = trained_model();
        model.reset();
        assert_eq!(model.tree().node_count(), 1);
        assert_eq!(model.predict(&[1.0, 1.0]), Ok(0));
    }
}
