//! Configuration loading and parsing

use anyhow::{Context, Result};
use biathlon_race::RaceConfig;
use std::fs;
use std::path::Path;

/// Load the race configuration from a JSON or TOML file
///
/// Files ending in `.json` are parsed as JSON, anything else as TOML. Both
/// use the same keys (`laps`, `lapLen`, `penaltyLen`, `firingLines`, `start`,
/// `startDelta`).
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: RaceConfig = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    };

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}
