use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Evaluation state captured at one point of a prequential run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub instances_seen: u64,
    pub accuracy: f64,
    pub kappa: f64,
    pub ram_hours: f64,
    pub seconds: f64,
    pub model_bytes: usize,
    pub extras: BTreeMap<String, f64>,
}

impl Snapshot {
    #[inline]
    fn fmtv(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{:.6}", v)
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "seen={}, acc={}, kappa={}, bytes={}, ram_h={:e}, t={:.6}s",
            self.instances_seen,
            Self::fmtv(self.accuracy),
            Self::fmtv(self.kappa),
            self.model_bytes,
            self.ram_hours,
            self.seconds
        )?;
        for (k, v) in &self.extras {
            write!(f, ", {}={}", k, Self::fmtv(*v))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_nan_and_extras() {
        let mut extras = BTreeMap::new();
        extras.insert("nodes".to_string(), 3.0);
        let s = Snapshot {
            instances_seen: 10,
            accuracy: f64::NAN,
            kappa: 0.5,
            ram_hours: 0.0,
            seconds: 1.25,
            model_bytes: 64,
            extras,
        };
        let text = s.to_string();
        assert!(text.starts_with("seen=10, acc=NaN, kappa=0.500000, bytes=64"));
        assert!(text.ends_with("nodes=3.000000"));
    }
}
