use std::path::PathBuf;
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Problems with the run configuration or the settings it depends on.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot parse config file {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("config lists no profiles")]
    NoProfiles,
    #[error("profile {0:?} is listed more than once")]
    DuplicateProfile(String),
    #[error("{0} is not set (neither in .env nor in the environment)")]
    MissingStorageRoot(&'static str),
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read metric file {path}: {source}")]
    MissingMetricFile { path: PathBuf, source: std::io::Error },
    #[error("metric file {path} is not a valid JSON object: {source}")]
    MalformedMetricFile { path: PathBuf, source: serde_json::Error },
    #[error("metric {key:?} not found in {path}")]
    MissingMetricKey { path: PathBuf, key: String },
    #[error("metric {key:?} in {path} is not a number (found {found})")]
    MetricNotNumeric { path: PathBuf, key: String, found: String },
    #[error("baseline value of {key:?} is zero; ratios are undefined")]
    ZeroBaseline { key: String },
    #[error("ratio for profile {profile:?} is not finite")]
    NonFiniteRatio { profile: String },
    #[error("failed to render chart: {0}")]
    Render(#[from] DrawingAreaErrorKind<std::io::Error>),
}
