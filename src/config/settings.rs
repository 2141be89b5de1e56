use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::HarvestConfig;

const APP_NAME: &str = "CodeHarvest";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "codeharvest", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file.
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_directory().map(|dir| dir.join(CONFIG_FILE))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the configuration from `path`, or the platform default location.
///
/// A missing file is created with defaults. A file that cannot be parsed is
/// reported and replaced by defaults in memory, leaving the file untouched.
pub fn load_config(path: Option<&Path>) -> Result<HarvestConfig> {
    let config_path = resolve_path(path)?;

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = HarvestConfig::default();
        save_config(&default_config, Some(&config_path))?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    match serde_json::from_str::<HarvestConfig>(&config_content) {
        Ok(config) => {
            tracing::debug!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(HarvestConfig::default())
        }
    }
}

/// Saves the configuration to `path`, or the platform default location.
pub fn save_config(config: &HarvestConfig, path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).with_context(|| {
                format!("Failed to create config directory {}", config_dir.display())
            })?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

// Platform-specific configuration paths for reference:
// macOS:   ~/Library/Application Support/com.codeharvest.CodeHarvest/
// Linux:   ~/.config/codeharvest/
// Windows: %APPDATA%/codeharvest/CodeHarvest/config/

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config, HarvestConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = HarvestConfig {
            max_file_size_kb: 64,
            include_binary: true,
            custom_ignore_patterns: vec!["*.snap".into(), "fixtures".into()],
            output_filename: "dump.txt".into(),
        };

        save_config(&config, Some(&path)).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config, HarvestConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
