use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReapError, Result};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub database: DatabaseConfig,
    pub uploads: UploadsConfig,
    pub registry: Registry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("registry.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub root: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            database: DatabaseConfig::default(),
            uploads: UploadsConfig::default(),
            registry: Registry::pet_registration(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// The first config file that exists must load. A broken file is an error,
    /// never a reason to fall back to the built-in registry.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        Self::load_first_existing(&Self::search_paths())
    }

    /// Implicit config locations, in priority order.
    ///
    /// Primary: ~/.config/<project>/<project>.yml, fallback: ./<project>.yml
    pub fn search_paths() -> Vec<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        let file_name = format!("{}.yml", project_name);

        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(project_name).join(&file_name));
        }
        paths.push(PathBuf::from(file_name));
        paths
    }

    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_file(path),
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ReapError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ReapError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.registry.validate()?;

        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, database: Option<PathBuf>, uploads: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.database.path = path;
        }
        if let Some(root) = uploads {
            self.uploads.root = root;
        }
        self
    }
}
