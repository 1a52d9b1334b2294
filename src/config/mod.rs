//! Configuration module

pub mod loader;

pub use loader::Config;

use serde::{Deserialize, Serialize};

/// Names of the environment variables holding the hosting credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Variable holding the username
    #[serde(default = "default_username_env")]
    pub username_env: String,

    /// Variable holding the app password or token
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username_env: default_username_env(),
            secret_env: default_secret_env(),
        }
    }
}

fn default_username_env() -> String {
    "BB_USER".to_string()
}

fn default_secret_env() -> String {
    "BB_APP_PASSWORD".to_string()
}

/// Hosting API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL repositories are cloned from
    #[serde(default = "default_clone_url")]
    pub clone_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// Page size requested when listing repositories
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            clone_url: default_clone_url(),
            timeout_secs: default_http_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.bitbucket.org/2.0".to_string()
}

fn default_clone_url() -> String {
    "https://bitbucket.org".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

/// Clone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum duration of a single clone in seconds
    #[serde(default = "default_clone_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_clone_timeout(),
        }
    }
}

fn default_clone_timeout() -> u64 {
    600
}

/// External language detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Program to run
    #[serde(default = "default_detector_program")]
    pub program: String,

    /// Arguments placed before the directory to analyze
    #[serde(default = "default_detector_args")]
    pub args: Vec<String>,

    /// Maximum duration of a single analysis in seconds
    #[serde(default = "default_detector_timeout")]
    pub timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: default_detector_program(),
            args: default_detector_args(),
            timeout_secs: default_detector_timeout(),
        }
    }
}

fn default_detector_program() -> String {
    "github-linguist".to_string()
}

fn default_detector_args() -> Vec<String> {
    vec!["--json".to_string()]
}

fn default_detector_timeout() -> u64 {
    300
}
