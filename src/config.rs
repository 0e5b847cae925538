use std::{collections::HashSet, fs::File, io::Read, path::Path};
use serde_derive::{Deserialize, Serialize};
use crate::error::ConfigError;

/// What to plot: one metric of one repository, compared across profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Repository directory under the storage root.
    pub repo: String,
    /// Metric key looked up in every complexity report.
    pub prop: String,
    /// Obfuscation profiles in chart order. The first one also supplies the
    /// baseline report.
    pub profiles: Vec<String>,
}

impl GraphConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let read_err = |source| ConfigError::Read { path: path.to_path_buf(), source };
        let mut file = File::open(path).map_err(read_err)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(read_err)?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        let mut seen = HashSet::new();
        for p in &self.profiles {
            if !seen.insert(p.as_str()) {
                return Err(ConfigError::DuplicateProfile(p.clone()));
            }
        }
        Ok(())
    }

    pub fn baseline_profile(&self) -> Result<&str, ConfigError> {
        self.profiles.first().map(String::as_str).ok_or(ConfigError::NoProfiles)
    }

    /// Output file name without extension: `{prop}_{repo}`.
    pub fn output_stem(&self) -> String {
        format!("{}_{}", self.prop, self.repo)
    }
}
