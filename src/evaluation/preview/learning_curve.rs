use crate::evaluation::Snapshot;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CurveFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

/// The ordered snapshots of one evaluation run.
#[derive(Debug, Clone, Default)]
pub struct LearningCurve {
    snapshots: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn export(&self, path: &Path, format: CurveFormat) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w, format)?;
        w.flush()
    }

    pub fn write_to<W: Write>(&self, w: &mut W, format: CurveFormat) -> io::Result<()> {
        match format {
            CurveFormat::Csv => self.write_delimited(w, ','),
            CurveFormat::Tsv => self.write_delimited(w, '\t'),
            CurveFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, &self.snapshots).map_err(io::Error::other)?;
                writeln!(w)
            }
        }
    }

    fn write_delimited<W: Write>(&self, w: &mut W, sep: char) -> io::Result<()> {
        let extra_keys: BTreeSet<&str> = self
            .snapshots
            .iter()
            .flat_map(|s| s.extras.keys().map(String::as_str))
            .collect();

        let mut header = vec![
            "instances_seen",
            "accuracy",
            "kappa",
            "ram_hours",
            "seconds",
            "model_bytes",
        ];
        header.extend(extra_keys.iter().copied());
        writeln!(w, "{}", header.join(&sep.to_string()))?;

        for s in &self.snapshots {
            let mut row = vec![
                s.instances_seen.to_string(),
                s.accuracy.to_string(),
                s.kappa.to_string(),
                s.ram_hours.to_string(),
                s.seconds.to_string(),
                s.model_bytes.to_string(),
            ];
            for key in &extra_keys {
                row.push(s.extras.get(*key).map(f64::to_string).unwrap_or_default());
            }
            writeln!(w, "{}", row.join(&sep.to_string()))?;
        }
        Ok(())
    }
}
