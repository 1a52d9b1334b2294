//! Scan command - Run the language census and write the workbook

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

use super::ScanArgs;
use crate::analysis::CommandDetector;
use crate::census::{CensusEngine, ScanEvent};
use crate::cli::exit_codes;
use crate::cli::output::{TerminalOutput, WorkbookWriter};
use crate::config::Config;
use crate::error::CensusError;
use crate::fetcher::GitFetcher;
use crate::providers::bitbucket::BitbucketWorkspace;
use crate::providers::Credentials;
use crate::utils::prerequisites::{
    display_error_summary, display_report, display_warnings, run_all_checks,
};

pub async fn execute(args: ScanArgs, config_path: Option<&Path>) -> Result<i32, CensusError> {
    let mut config = Config::load(config_path)?;
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return Ok(exit_codes::INVALID_ARGS);
    }

    if !args.skip_checks {
        let checks = run_all_checks(&config);
        if !checks.all_required_passed() {
            display_report(&checks);
            display_error_summary(&checks);
            return Ok(exit_codes::ERROR);
        }
        display_warnings(&checks);
    }

    let credentials = Credentials::from_env(&config.credentials);
    let provider =
        BitbucketWorkspace::authenticate(&config.hosting, &config.workspace, credentials.clone())
            .await?;
    let fetcher = GitFetcher::new(
        &config.hosting.clone_url,
        &config.workspace,
        credentials,
        Duration::from_secs(config.fetch.timeout_secs),
    )?;
    let detector = CommandDetector::from_config(&config.detector);

    let progress = ScanProgress::new();
    let mut engine = CensusEngine::new(
        &provider,
        &fetcher,
        &detector,
        config.project_keys.clone(),
    );
    engine.set_empty_project_sheets(config.empty_project_sheets);
    engine.set_observer(|event| progress.observe(event));

    let report = engine.run().await?;
    progress.finish();

    WorkbookWriter::new()
        .with_status_sheet(config.status_sheet)
        .write(&report, &config.output)?;
    info!(path = %config.output.display(), "Report written");

    println!(
        "{}",
        TerminalOutput::new().render(&report, Some(&config.output))
    );

    Ok(if report.has_problems() {
        exit_codes::WARNINGS
    } else {
        exit_codes::SUCCESS
    })
}

/// One progress bar per project, counting finished repositories.
///
/// indicatif hides the bar by itself when stderr is not a terminal.
struct ScanProgress {
    current: Mutex<Option<ProgressBar>>,
}

impl ScanProgress {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
    }

    fn observe(&self, event: &ScanEvent<'_>) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };

        match event {
            ScanEvent::ProjectListed {
                project,
                repositories,
            } if *repositories > 0 => {
                let bar = ProgressBar::new(*repositories as u64);
                bar.set_style(Self::style());
                bar.set_prefix(project.to_string());
                *current = Some(bar);
            }
            ScanEvent::RepositoryStarted { slug, .. } => {
                if let Some(bar) = current.as_ref() {
                    bar.set_message(slug.to_string());
                }
            }
            ScanEvent::RepositoryFinished { .. } => {
                if let Some(bar) = current.as_ref() {
                    bar.inc(1);
                }
            }
            ScanEvent::ProjectFinished { .. } => {
                if let Some(bar) = current.take() {
                    bar.finish_and_clear();
                }
            }
            _ => {}
        }
    }

    fn finish(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                bar.finish_and_clear();
            }
        }
    }
}
