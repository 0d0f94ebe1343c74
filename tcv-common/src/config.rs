//! Configuration loading and root folder resolution
//!
//! The root folder holds the database (`tcv.db`), the blob store
//! (`storage/<bucket>/...`) and the optional server settings file (`tcv.toml`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "TCV_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "tcv.db";

/// Server settings file name inside the root folder
pub const SETTINGS_FILE: &str = "tcv.toml";

/// Root folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key of the user/system TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root_folder) = locate_config_file().ok().and_then(|p| read_root_folder_key(&p)) {
        return root_folder;
    }

    default_root_folder()
}

fn read_root_folder_key(config_path: &Path) -> Option<PathBuf> {
    let content = std::fs::read_to_string(config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&content).ok()?;
    config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// Get the user or system configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tcv").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tcv/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("tcv"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tcv"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tcv"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tcv"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tcv"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tcv"))
    } else {
        PathBuf::from("./tcv_data")
    }
}

/// Creates the root folder layout and names the files inside it
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.path.exists() {
            std::fs::create_dir_all(&self.path)?;
            info!("Created root folder: {}", self.path.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.path.join("storage")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.path.join(SETTINGS_FILE)
    }
}

pub const DEFAULT_MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

/// Room for a batch of 20 full-size files plus multipart framing
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 20 * DEFAULT_MAX_FILE_BYTES + 1024 * 1024;

/// Server settings (`<root>/tcv.toml`); every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub host: String,
    pub port: u16,
    /// Base URL used to build public `storage_url` values
    pub public_base_url: String,
    /// Blob store bucket for audio uploads
    pub bucket: String,
    /// Language tag stamped on new uploads
    pub default_language_tag: String,
    /// Per-file upload limit in bytes
    pub max_file_bytes: usize,
    /// Whole upload request limit in bytes; must exceed `max_file_bytes`
    pub max_request_bytes: usize,
    /// Add `Secure` to the session cookie
    pub secure_cookies: bool,
    /// Expose `GET /api/debug`
    pub enable_debug: bool,
    /// Model names inserted at startup when absent
    pub seed_models: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
            public_base_url: "http://127.0.0.1:5740".to_string(),
            bucket: "audio-files".to_string(),
            default_language_tag: "pashto".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            secure_cookies: false,
            enable_debug: false,
            seed_models: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load settings from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() || self.bucket.contains(['/', '\\']) || self.bucket.contains("..") {
            return Err(Error::Config(format!("invalid bucket name: {:?}", self.bucket)));
        }
        if self.max_file_bytes == 0 {
            return Err(Error::Config("max_file_bytes must be positive".to_string()));
        }
        if self.max_request_bytes <= self.max_file_bytes {
            return Err(Error::Config(format!(
                "max_request_bytes ({}) must be larger than max_file_bytes ({})",
                self.max_request_bytes, self.max_file_bytes
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
