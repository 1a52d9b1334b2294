//! CLI commands module

pub mod init;
pub mod scan;

use clap::Args;
use std::path::PathBuf;

use crate::config::Config;

/// Arguments for the scan command
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Bitbucket workspace to scan
    #[arg(short, long, value_name = "WORKSPACE")]
    pub workspace: Option<String>,

    /// Project keys to scan (comma-separated or repeated)
    #[arg(short, long = "project", value_name = "KEY", value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Output workbook path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a header-only sheet for projects without repositories
    #[arg(long)]
    pub empty_project_sheets: bool,

    /// Do not add the Scan Status sheet
    #[arg(long)]
    pub no_status_sheet: bool,

    /// Skip prerequisite checks (git, detector, credentials)
    #[arg(long)]
    pub skip_checks: bool,
}

impl ScanArgs {
    /// Overlay command-line values on a loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        if !self.projects.is_empty() {
            config.project_keys = self.projects.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if self.empty_project_sheets {
            config.empty_project_sheets = true;
        }
        if self.no_status_sheet {
            config.status_sheet = false;
        }
    }
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Where to write the configuration
    #[arg(long, value_name = "FILE", default_value = crate::config::loader::CONFIG_FILENAME)]
    pub path: PathBuf,
}
