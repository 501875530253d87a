use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use locator_core::LocatorConfig;
use locator_logging::locator_info;

/// Reads the RON config at `path`, or the defaults when no file is given.
/// Api keys from the environment and `locale` take precedence over the file.
pub fn load_config(path: Option<&Path>, locale: Option<&str>) -> Result<LocatorConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config: LocatorConfig = ron::from_str(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            locator_info!("loaded config from {}", path.display());
            config
        }
        None => LocatorConfig::default(),
    };

    let mut config = config.with_env_overrides();
    if let Some(locale) = locale {
        config.locale = locale.to_string();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
