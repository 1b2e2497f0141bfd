use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Settings for one `check` run.
///
/// Read from a JSON file with camelCase keys; every key is optional.
/// Command-line options are layered on top with [`RunConfig::merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    /// TypeDoc JSON for the previous version.
    pub previous: Option<PathBuf>,
    /// TypeDoc JSON for the next version.
    pub next: Option<PathBuf>,
    /// Human-readable report destination. Console when absent.
    pub out: Option<PathBuf>,
    /// Flat JSON issue array destination.
    pub flat_out: Option<PathBuf>,
    /// Ignore-rule file.
    pub ignore: Option<PathBuf>,
    /// Prefix for source locations in the report.
    pub map_source_dir: Option<String>,
    pub exclude_root_node: bool,
    pub verbose: bool,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> GateResult<Self> {
        serde_json::from_str(json).map_err(|e| GateError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: &Path) -> GateResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Overlay `overrides` on `self`. Values set in `overrides` win; a flag
    /// set on either side stays set.
    pub fn merge(self, overrides: RunConfig) -> Self {
        Self {
            previous: overrides.previous.or(self.previous),
            next: overrides.next.or(self.next),
            out: overrides.out.or(self.out),
            flat_out: overrides.flat_out.or(self.flat_out),
            ignore: overrides.ignore.or(self.ignore),
            map_source_dir: overrides.map_source_dir.or(self.map_source_dir),
            exclude_root_node: overrides.exclude_root_node || self.exclude_root_node,
            verbose: overrides.verbose || self.verbose,
        }
    }
}
