pub mod error;
pub mod settings;
pub mod config;
pub mod complexity;
pub mod dataset;
pub mod loader;
pub mod legend;
pub mod tikz;
pub mod chart;

use std::path::{Path, PathBuf};
use tracing::debug;
use crate::{config::GraphConfig, error::GraphError, loader::Loader, settings::Settings};

/// Loads the reports named by `config` and writes `{prop}_{repo}.tex` into
/// `out_dir`. Returns the path written.
pub fn generate(settings: &Settings, config: &GraphConfig, out_dir: &Path) -> Result<PathBuf, GraphError> {
    let dataset = Loader::new(settings.clone()).load(config)?;
    if let Ok(json) = serde_json::to_string(&dataset) {
        debug!("normalized {} (baseline {}): {}", dataset.metric(), dataset.baseline(), json);
    }
    chart::render(&dataset, &out_dir.join(config.output_stem()), &config.prop)
}

#[cfg(test)]
mod test {
    use std::fs;
    use crate::{complexity::ObfuscationState, loader::test::write_scenario};
    use super::*;

    #[test]
    fn test_generate_scenario() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let storage = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = write_scenario(storage.path());
        let path = generate(&Settings::new(storage.path()), &config, out.path()).unwrap();
        assert_eq!(path, out.path().join("cyclomatic_repoA.tex"));
        let tex = fs::read_to_string(&path).unwrap();
        assert!(tex.contains("{p1}") && tex.contains("{p2}"));
    }

    #[test]
    fn test_generate_overwrites() {
        let storage = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = write_scenario(storage.path());
        fs::write(out.path().join("cyclomatic_repoA.tex"), "stale").unwrap();
        let path = generate(&Settings::new(storage.path()), &config, out.path()).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "stale");
    }

    #[test]
    fn test_generate_missing_original_writes_nothing() {
        let storage = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = write_scenario(storage.path());
        let settings = Settings::new(storage.path());
        fs::remove_file(settings.metric_file("repoA", "p1", ObfuscationState::Original)).unwrap();
        assert!(matches!(
            generate(&settings, &config, out.path()),
            Err(GraphError::MissingMetricFile { .. }),
        ));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_zero_baseline_writes_nothing() {
        let storage = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = write_scenario(storage.path());
        crate::loader::test::write_report(
            storage.path(), "repoA", "p1", ObfuscationState::Original, "cyclomatic", 0.0,
        );
        assert!(matches!(
            generate(&Settings::new(storage.path()), &config, out.path()),
            Err(GraphError::ZeroBaseline { .. }),
        ));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
