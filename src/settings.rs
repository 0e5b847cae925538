use std::path::{Path, PathBuf};
use tracing::debug;
use crate::{complexity::ObfuscationState, error::ConfigError};

/// Environment variable naming the directory the analyzer stores repositories in.
pub const STORAGE_ROOT_VAR: &str = "OBF_ANALYSER_REPO_STORAGE";

/// Process-level settings. Built once at startup and handed to the loader
/// explicitly, so tests can point it at a scratch directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    storage_root: PathBuf,
}

impl Settings {
    pub fn new<P: Into<PathBuf>>(storage_root: P) -> Self {
        Self { storage_root: storage_root.into() }
    }

    /// Reads `.env` (if there is one) and then the process environment.
    /// Variables already set in the environment take precedence over `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded settings from {}", path.display()),
            Err(e) if e.not_found() => debug!("no .env file, using process environment"),
            Err(e) => debug!("ignoring unreadable .env file: {}", e),
        }
        Self::from_var(std::env::var_os(STORAGE_ROOT_VAR))
    }

    /// Like [`Settings::from_env`], with an explicit settings file.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        match dotenvy::from_path(path) {
            Ok(()) => debug!("loaded settings from {}", path.display()),
            Err(e) if e.not_found() => debug!("no {}, using process environment", path.display()),
            Err(e) => debug!("ignoring unreadable {}: {}", path.display(), e),
        }
        Self::from_var(std::env::var_os(STORAGE_ROOT_VAR))
    }

    fn from_var(value: Option<std::ffi::OsString>) -> Result<Self, ConfigError> {
        match value {
            Some(v) if !v.is_empty() => Ok(Self::new(v)),
            _ => Err(ConfigError::MissingStorageRoot(STORAGE_ROOT_VAR)),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.storage_root.join(repo)
    }

    /// `{root}/{repo}/{profile}/stats/complexities`
    pub fn complexities_dir(&self, repo: &str, profile: &str) -> PathBuf {
        self.repo_dir(repo).join(profile).join("stats").join("complexities")
    }

    pub fn metric_file(&self, repo: &str, profile: &str, state: ObfuscationState) -> PathBuf {
        self.complexities_dir(repo, profile).join(state.file_name())
    }
}
