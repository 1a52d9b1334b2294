//! Error types for langcensus
//!
//! This module defines custom error types using `thiserror` for better error handling
//! and more descriptive error messages throughout the application.

use thiserror::Error;

/// Main error type for langcensus
#[derive(Error, Debug)]
pub enum CensusError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Hosting API errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Clone errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Language detection errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Spreadsheet output errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Filesystem errors outside of a more specific context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        /// Path to the configuration file
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Failed to write the configuration file
    #[error("Failed to write config file '{path}': {source}")]
    FileWrite {
        /// Path to the configuration file
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// TOML parsing failed
    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A setting is missing or out of range
    #[error("Invalid setting '{field}': {message}")]
    Invalid {
        /// Name of the offending setting
        field: String,
        /// What is wrong with it
        message: String,
    },
}

/// Errors from the repository hosting API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Credentials were rejected
    #[error("Authentication failed for workspace '{workspace}' (HTTP {status}); check the username and app password")]
    NotAuthenticated {
        /// Workspace that was being resolved
        workspace: String,
        /// HTTP status code returned by the API
        status: u16,
    },

    /// The requested resource does not exist or is not visible
    #[error("{resource} not found")]
    NotFound {
        /// Human readable resource description
        resource: String,
    },

    /// Any other non-success response
    #[error("Unexpected HTTP {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be built
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API base URL cannot carry path segments
    #[error("API URL '{0}' cannot be used as a base URL")]
    InvalidBaseUrl(String),
}

/// Errors raised while cloning a repository
#[derive(Error, Debug)]
pub enum FetchError {
    /// git could not be started
    #[error("Failed to run git: {0}")]
    Spawn(String),

    /// git exited unsuccessfully
    #[error("git clone of '{slug}' failed with exit code {exit_code}: {stderr}")]
    CloneFailed {
        /// Repository slug
        slug: String,
        /// Exit code of git
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// git did not finish in time
    #[error("git clone of '{slug}' timed out after {seconds}s")]
    TimedOut {
        /// Repository slug
        slug: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The clone URL could not be built
    #[error("Invalid clone URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors raised by the language detector or while parsing its output
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The directory to analyze is missing
    #[error("Directory '{path}' does not exist")]
    MissingDirectory {
        /// Directory that was expected
        path: String,
    },

    /// The detector could not be started
    #[error("Failed to run detector '{program}': {message}")]
    Spawn {
        /// Detector program
        program: String,
        /// Underlying error message
        message: String,
    },

    /// The detector exited unsuccessfully
    #[error("Detector '{program}' failed with exit code {exit_code}: {stderr}")]
    DetectorFailed {
        /// Detector program
        program: String,
        /// Exit code of the detector
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The detector did not finish in time
    #[error("Detector '{program}' timed out after {seconds}s")]
    TimedOut {
        /// Detector program
        program: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The output matched none of the accepted shapes
    #[error("Unrecognized detector output: {0}")]
    UnrecognizedOutput(String),

    /// A percentage was negative, NaN or infinite
    #[error("Invalid percentage {value} for language '{language}'")]
    InvalidPercentage {
        /// Language the value belongs to
        language: String,
        /// Offending raw value
        value: String,
    },
}

/// Errors raised while writing the spreadsheet
#[derive(Error, Debug)]
pub enum ReportError {
    /// The workbook library rejected an operation
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// A table has more columns than a worksheet can hold
    #[error("Sheet '{sheet}' needs {columns} columns, which exceeds the worksheet limit")]
    TooManyColumns {
        /// Sheet name
        sheet: String,
        /// Number of columns required
        columns: usize,
    },

    /// A table has more rows than a worksheet can hold
    #[error("Sheet '{sheet}' needs {rows} rows, which exceeds the worksheet limit")]
    TooManyRows {
        /// Sheet name
        sheet: String,
        /// Number of rows required
        rows: usize,
    },
}

impl From<toml::de::Error> for CensusError {
    fn from(err: toml::de::Error) -> Self {
        CensusError::Config(ConfigError::Parse(err))
    }
}

impl From<toml::ser::Error> for CensusError {
    fn from(err: toml::ser::Error) -> Self {
        CensusError::Config(ConfigError::Serialize(err))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::UnrecognizedOutput(err.to_string())
    }
}
