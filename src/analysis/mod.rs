//! Language analysis of a cloned repository
//!
//! Classification itself is delegated to an external tool (github-linguist
//! by default); this module runs it and turns its output into
//! [`LanguageStats`] through [`parse::parse_detector_output`].

pub mod parse;

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::census::LanguageStats;
use crate::config::DetectorConfig;
use crate::error::AnalysisError;
use crate::utils::command::{execute_command, CommandFailure};

/// Produces language shares for a local directory
#[async_trait::async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, directory: &Path) -> Result<LanguageStats, AnalysisError>;
}

/// Runs `<program> <args...> <directory>` and parses its standard output
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandDetector {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait::async_trait]
impl LanguageDetector for CommandDetector {
    async fn detect(&self, directory: &Path) -> Result<LanguageStats, AnalysisError> {
        if !directory.is_dir() {
            return Err(AnalysisError::MissingDirectory {
                path: directory.display().to_string(),
            });
        }

        let mut args: Vec<&OsStr> = self.args.iter().map(|a| OsStr::new(a.as_str())).collect();
        args.push(directory.as_os_str());

        info!(program = %self.program, directory = %directory.display(), "Analyzing languages");

        let result = execute_command(&self.program, args, &[], None, self.timeout)
            .await
            .map_err(|failure| match failure {
                CommandFailure::Spawn(e) => AnalysisError::Spawn {
                    program: self.program.clone(),
                    message: e.to_string(),
                },
                CommandFailure::TimedOut(d) => AnalysisError::TimedOut {
                    program: self.program.clone(),
                    seconds: d.as_secs(),
                },
            })?;

        if !result.success() {
            return Err(AnalysisError::DetectorFailed {
                program: self.program.clone(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        let stats = parse::parse_detector_output(&result.stdout)?;
        debug!(languages = stats.len(), "Detector output parsed");
        Ok(stats)
    }
}
