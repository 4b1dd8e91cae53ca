use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_PREFIX: &str = "storage-quickstart";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const DEVSTORAGE_FULL_CONTROL_SCOPE: &str =
    "https://www.googleapis.com/auth/devstorage.full_control";

const STORAGE_BASE_URL: &str = "https://storage.googleapis.com";
const DEFAULT_SOURCE_FILE: &str = "/usr/share/dict/words";
const DEFAULT_OBJECT_NAME: &str = "english-dictionary";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub google: GoogleConfig,
    pub storage: StorageConfig,
}

/// OAuth2 client identity used to obtain a bearer credential
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            scope: default_scope(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub project_id: String,
    pub bucket: String,
    #[serde(default = "default_object_name")]
    pub object_name: String,
    #[serde(default = "default_source_file")]
    pub source_file: PathBuf,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            bucket: String::new(),
            object_name: default_object_name(),
            source_file: default_source_file(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_scope() -> String {
    DEVSTORAGE_FULL_CONTROL_SCOPE.to_string()
}

fn default_auth_url() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn default_redirect_uri() -> String {
    GOOGLE_REDIRECT_URI.to_string()
}

fn default_object_name() -> String {
    DEFAULT_OBJECT_NAME.to_string()
}

fn default_source_file() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_FILE)
}

fn default_api_base_url() -> String {
    STORAGE_BASE_URL.to_string()
}

impl Config {
    /// Load the config from `path`, or from the XDG config file when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_file()?,
        };

        if !config_path.exists() {
            return Err(AppError::Config(format!(
                "Config file not found at {:?}. Please create one.",
                config_path
            )));
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.google.client_id.is_empty() || self.google.client_secret.is_empty() {
            return Err(AppError::Config(
                "Google client_id and client_secret must be set in config file".to_string(),
            ));
        }

        if self.storage.project_id.is_empty() || self.storage.bucket.is_empty() {
            return Err(AppError::Config(
                "Storage project_id and bucket must be set in config file".to_string(),
            ));
        }

        if self.storage.object_name.is_empty() {
            return Err(AppError::Config(
                "Storage object_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }
}
