use std::path::PathBuf;
use clap::Parser;
use obf_graphmaker::{config::GraphConfig, generate, settings::Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Charts one complexity metric of an obfuscated repository, relative to the
/// original code, as a TikZ picture named `{prop}_{repo}.tex`.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with `repo`, `prop` and `profiles`.
    config: PathBuf,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    let config = GraphConfig::from_file(&args.config)?;
    info!(
        "charting {} of {} across {} profile(s) from {}",
        config.prop, config.repo, config.profiles.len(), settings.storage_root().display(),
    );
    generate(&settings, &config, &std::env::current_dir()?)?;
    Ok(())
}
