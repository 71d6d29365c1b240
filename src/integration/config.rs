//! Session configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assessment::{ClassifierThresholds, ReconstructConfig};
use crate::{Error, Result};

/// Settings shared by every call made through one [`crate::Session`].
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "reconstruct": { "min_confidence": 0.25 }, "thresholds": { "max_gaps": 5 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub reconstruct: ReconstructConfig,
    pub thresholds: ClassifierThresholds,
    /// Where rendered artifacts go; defaults to the source video's directory
    pub output_dir: Option<PathBuf>,
}

impl SessionConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::UpstreamUnavailable(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
