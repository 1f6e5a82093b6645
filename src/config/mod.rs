mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./gallery.toml",
        "~/.config/gallery/config.toml",
        "/etc/gallery/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    tracing::debug!("No config file found; using defaults");
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.storage.base_dir.as_os_str().is_empty() {
        anyhow::bail!("storage.base_dir cannot be empty");
    }

    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("database.path cannot be empty");
    }

    if config.listing.default_rows <= 0 {
        anyhow::bail!("listing.default_rows must be positive");
    }

    if config.listing.max_rows < config.listing.default_rows {
        anyhow::bail!(
            "listing.max_rows ({}) is smaller than listing.default_rows ({})",
            config.listing.max_rows,
            config.listing.default_rows
        );
    }

    if !config.storage.base_dir.exists() {
        tracing::warn!(
            "Storage directory does not exist yet: {:?}",
            config.storage.base_dir
        );
    }

    Ok(())
}
