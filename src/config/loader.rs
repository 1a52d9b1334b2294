//! Configuration loader

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{CensusError, ConfigError};

use super::{CredentialsConfig, DetectorConfig, FetchConfig, HostingConfig};

/// Name of the per-directory configuration file
pub const CONFIG_FILENAME: &str = ".langcensus.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hosting workspace (organization) that owns the projects
    #[serde(default)]
    pub workspace: String,

    /// Project keys to scan, in order
    #[serde(default)]
    pub project_keys: Vec<String>,

    /// Spreadsheet destination
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Emit a header-only sheet for projects without repositories
    #[serde(default)]
    pub empty_project_sheets: bool,

    /// Emit the per-repository "Scan Status" sheet
    #[serde(default = "default_true")]
    pub status_sheet: bool,

    /// Credential environment variables
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Hosting API settings
    #[serde(default)]
    pub hosting: HostingConfig,

    /// Clone settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Language detector settings
    #[serde(default)]
    pub detector: DetectorConfig,
}

fn default_output() -> PathBuf {
    PathBuf::from("project_languages.xlsx")
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: String::new(),
            project_keys: Vec::new(),
            output: default_output(),
            empty_project_sheets: false,
            status_sheet: true,
            credentials: CredentialsConfig::default(),
            hosting: HostingConfig::default(),
            fetch: FetchConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or discover one.
    ///
    /// Discovery order: `./.langcensus.toml`, then
    /// `<config dir>/langcensus/config.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CensusError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local = Path::new(CONFIG_FILENAME);
        if local.exists() {
            return Self::load_from_file(local);
        }

        if let Some(user_path) = user_config_path() {
            if user_path.exists() {
                return Self::load_from_file(&user_path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, CensusError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CensusError::Config(ConfigError::FileRead {
                path: path.display().to_string(),
                source: e,
            })
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        toml::from_str(&content).map_err(Into::into)
    }

    /// Starter configuration written by `langcensus init`
    pub fn template() -> Self {
        Self {
            workspace: "example".to_string(),
            project_keys: vec!["ABC".to_string(), "XYZ".to_string()],
            ..Default::default()
        }
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, CensusError> {
        toml::to_string_pretty(self).map_err(Into::into)
    }

    /// Check that the configuration is usable for a scan
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.trim().is_empty() {
            return Err(invalid("workspace", "must not be empty"));
        }

        if self.project_keys.is_empty() {
            return Err(invalid("project_keys", "at least one project key is required"));
        }

        if let Some(blank) = self.project_keys.iter().position(|k| k.trim().is_empty()) {
            return Err(invalid(
                "project_keys",
                &format!("entry {} is empty", blank + 1),
            ));
        }

        if self.output.as_os_str().is_empty() {
            return Err(invalid("output", "must not be empty"));
        }

        for (field, value) in [
            ("hosting.api_url", &self.hosting.api_url),
            ("hosting.clone_url", &self.hosting.clone_url),
        ] {
            Url::parse(value).map_err(|e| invalid(field, &e.to_string()))?;
        }

        for (field, value) in [
            ("hosting.timeout_secs", self.hosting.timeout_secs),
            ("fetch.timeout_secs", self.fetch.timeout_secs),
            ("detector.timeout_secs", self.detector.timeout_secs),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        if self.hosting.page_size == 0 || self.hosting.page_size > 100 {
            return Err(invalid("hosting.page_size", "must be between 1 and 100"));
        }

        if self.detector.program.trim().is_empty() {
            return Err(invalid("detector.program", "must not be empty"));
        }

        if self.credentials.username_env.is_empty() || self.credentials.secret_env.is_empty() {
            return Err(invalid(
                "credentials",
                "environment variable names must not be empty",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("langcensus").join("config.toml"))
}
