//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. A missing file
//! is not an error: the kiosk starts with built-in defaults. The root
//! folder (where the review table lives) is resolved in priority order:
//! 1. Command-line argument
//! 2. `KSR_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::controller::AmendTarget;
use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "KSR_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Folder holding the review table
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Review table file name, relative to the root folder unless absolute
    #[serde(default = "default_reviews_file")]
    pub reviews_file: PathBuf,

    /// Address the kiosk shell binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP port of the kiosk shell
    #[serde(default = "default_port")]
    pub port: u16,

    /// Record that receives follow-up comments
    #[serde(default)]
    pub amend_target: AmendTarget,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_reviews_file() -> PathBuf {
    PathBuf::from("reviews.csv")
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            reviews_file: default_reviews_file(),
            bind: default_bind(),
            port: default_port(),
            amend_target: AmendTarget::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the config file at `explicit`, or the first platform config file
    /// that exists. Missing platform files fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::locate(explicit)? {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Config file to read: `explicit` (which must exist) or the first
    /// platform candidate present on disk
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            None => Ok(config_file_candidates().into_iter().find(|p| p.exists())),
        }
    }

    /// Read and parse the config file at `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Candidate config file locations for the platform, most specific first
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("ksr").join("config.toml"))
        .into_iter()
        .collect();
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/ksr/config.toml"));
    }
    candidates
}

/// Resolves the root folder using the four-tier priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            config_value: config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Some(path) = std::env::var_os(ROOT_FOLDER_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(path);
        }

        if let Some(path) = &self.config_value {
            return path.clone();
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ksr"))
        .unwrap_or_else(|| PathBuf::from("./ksr_data"))
}

/// Prepares the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if it does not exist yet
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the review table; absolute `reviews_file` values are kept
    pub fn reviews_path(&self, reviews_file: &Path) -> PathBuf {
        self.root_folder.join(reviews_file)
    }
}
