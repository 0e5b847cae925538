use tracing::{info, warn};
use crate::{
    complexity::{read_metric, ObfuscationState},
    config::GraphConfig,
    dataset::Dataset,
    error::GraphError,
    settings::Settings,
};

/// Reads the analyzer's complexity reports for one repository and
/// normalizes them against the original code.
pub struct Loader {
    settings: Settings,
}

impl Loader {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn read(&self, config: &GraphConfig, profile: &str, state: ObfuscationState) -> Result<f64, GraphError> {
        let path = self.settings.metric_file(&config.repo, profile, state);
        read_metric(&path, &config.prop)
    }

    /// The baseline always comes from the first profile's `original.json`;
    /// every profile contributes its obfuscated and deobfuscated reports.
    pub fn load(&self, config: &GraphConfig) -> Result<Dataset, GraphError> {
        config.validate()?;
        let baseline = self.read(config, config.baseline_profile()?, ObfuscationState::Original)?;
        if baseline == 0.0 {
            warn!("baseline {} of {} is zero, every ratio will be non-finite", config.prop, config.repo);
        }
        let mut dataset = Dataset::new(config.prop.as_str(), baseline);
        for profile in &config.profiles {
            let obfuscated = self.read(config, profile, ObfuscationState::Obfuscated)?;
            let deobfuscated = self.read(config, profile, ObfuscationState::Deobfuscated)?;
            dataset.push_raw(profile, obfuscated, deobfuscated);
        }
        info!(
            "loaded {} of {} for {} profile(s), baseline {}",
            config.prop, config.repo, dataset.len(), baseline,
        );
        Ok(dataset)
    }
}
