//! CLI command implementations.

pub mod run;
pub mod stress;
pub mod tornado;

use anyhow::Context;
use sim_core::RunConfig;

/// Loads and parses a TOML run configuration.
pub fn load_config(path: &str) -> anyhow::Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file '{path}'"))?;
    let config: RunConfig =
        toml::from_str(&text).with_context(|| format!("failed to parse '{path}' as TOML"))?;
    Ok(config)
}
