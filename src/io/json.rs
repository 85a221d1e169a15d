//! Read/write JSON run files.
//!
//! A run file is the portable record of one `minima` run: configuration,
//! detected minima and the O-C diagram. `oc diagram` can recompute O-C from
//! it against a different ephemeris.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{MinimaConfig, MinimaResult, OcPoint};
use crate::error::OcError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub period: f64,
    pub config: MinimaConfig,
    pub result: MinimaResult,
    pub oc: Vec<OcPoint>,
}

impl RunFile {
    pub fn new(period: f64, config: MinimaConfig, result: MinimaResult, oc: Vec<OcPoint>) -> Self {
        Self {
            tool: "oc".to_string(),
            period,
            config,
            result,
            oc,
        }
    }
}

pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), OcError> {
    let file = File::create(path)
        .map_err(|e| OcError::Io(format!("Failed to create run JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .map_err(|e| OcError::Io(format!("Failed to write run JSON: {e}")))
}

pub fn read_run_json(path: &Path) -> Result<RunFile, OcError> {
    let file =
        File::open(path).map_err(|e| OcError::Io(format!("Failed to open run JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| OcError::Parse(format!("Invalid run JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_serialize_with_source_tags() {
        let json = serde_json::to_value(MinimaConfig::default()).unwrap();
        assert_eq!(json["fit"], "poly");
        assert_eq!(json["on_divergence"], "abort");
        assert_eq!(json["samplings"], 100_000);
    }

    #[test]
    fn model_alias_is_accepted_on_read() {
        let mut json = serde_json::to_value(MinimaConfig::default()).unwrap();
        json["fit"] = "model".into();
        let cfg: MinimaConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.fit, crate::domain::FitKind::Template);
    }
}
