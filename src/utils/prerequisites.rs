//! Prerequisites checking before a scan
//!
//! Verifies that the external tools a scan shells out to are installed and
//! that credentials are present before any network access happens.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Command;

use crate::config::Config;
use crate::providers::Credentials;

/// Level of importance for a prerequisite check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    /// Required for operation - failure blocks execution
    Required,
    /// Optional - failure generates a warning
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Failed,
}

/// Result of a single prerequisite check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub level: CheckLevel,
    pub status: CheckStatus,
    /// Detail line; the failure reason, or e.g. a tool version on success
    pub message: Option<String>,
    /// Suggested fix for the issue
    pub fix: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, level: CheckLevel) -> Self {
        Self {
            name: name.to_string(),
            level,
            status: CheckStatus::Ok,
            message: None,
            fix: None,
        }
    }

    pub fn failed(name: &str, level: CheckLevel, message: &str, fix: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            level,
            status: CheckStatus::Failed,
            message: Some(message.to_string()),
            fix: fix.map(|s| s.to_string()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check if this is a required check that failed
    pub fn is_required_failure(&self) -> bool {
        self.level == CheckLevel::Required && self.status == CheckStatus::Failed
    }

    /// Check if this is an optional check that failed
    pub fn is_optional_failure(&self) -> bool {
        self.level == CheckLevel::Optional && self.status == CheckStatus::Failed
    }
}

/// Aggregated report of all prerequisite checks
#[derive(Debug, Clone, Default)]
pub struct PrerequisitesReport {
    pub checks: Vec<CheckResult>,
}

impl PrerequisitesReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    pub fn all_required_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.is_required_failure())
    }

    pub fn required_failures(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.is_required_failure())
            .collect()
    }

    pub fn optional_failures(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.is_optional_failure())
            .collect()
    }

    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.is_optional_failure())
    }
}

// ============================================================================
// Check functions
// ============================================================================

/// First line of `<program> --version`
pub fn tool_version(program: &str) -> Result<String> {
    let output = Command::new(program)
        .arg("--version")
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        bail!("{} --version exited with {}", program, output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string())
}

/// Check if git is installed
pub fn check_git_installed() -> CheckResult {
    const NAME: &str = "Git installed";

    match tool_version("git") {
        Ok(version) => CheckResult::ok(NAME, CheckLevel::Required).with_message(version),
        Err(e) => CheckResult::failed(
            NAME,
            CheckLevel::Required,
            &format!("Git is not usable: {:#}", e),
            Some("Install git: https://git-scm.com/downloads"),
        ),
    }
}

/// Check if the language detector can be found on PATH (or at its path)
pub fn check_detector_available(program: &str) -> CheckResult {
    const NAME: &str = "Language detector available";

    match which::which(program) {
        Ok(path) => {
            CheckResult::ok(NAME, CheckLevel::Required).with_message(path.display().to_string())
        }
        Err(_) => CheckResult::failed(
            NAME,
            CheckLevel::Required,
            &format!("'{}' was not found", program),
            Some("Install it (gem install github-linguist) or set [detector] program"),
        ),
    }
}

/// Check that both credential variables are set
pub fn check_credentials(config: &Config) -> CheckResult {
    const NAME: &str = "Credentials set";

    if Credentials::from_env(&config.credentials).is_complete() {
        CheckResult::ok(NAME, CheckLevel::Optional)
    } else {
        let vars = format!(
            "{} and {}",
            config.credentials.username_env, config.credentials.secret_env
        );
        CheckResult::failed(
            NAME,
            CheckLevel::Optional,
            &format!("{} are not both set; requests will likely be rejected", vars),
            Some(&format!("export {}", vars)),
        )
    }
}

/// Check that the report can be created where it was asked for
pub fn check_output_directory(output: &Path) -> CheckResult {
    const NAME: &str = "Output directory exists";

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if parent.is_dir() {
        CheckResult::ok(NAME, CheckLevel::Required)
    } else {
        CheckResult::failed(
            NAME,
            CheckLevel::Required,
            &format!("'{}' is not a directory", parent.display()),
            Some(&format!("mkdir -p {}", parent.display())),
        )
    }
}

/// Run all prerequisite checks
pub fn run_all_checks(config: &Config) -> PrerequisitesReport {
    let mut report = PrerequisitesReport::new();
    report.add(check_git_installed());
    report.add(check_detector_available(&config.detector.program));
    report.add(check_output_directory(&config.output));
    report.add(check_credentials(config));
    report
}

// ============================================================================
// Display functions
// ============================================================================

/// Display the full prerequisites report
pub fn display_report(report: &PrerequisitesReport) {
    eprintln!("{}\n", "Checking prerequisites...".bold());

    for check in &report.checks {
        let (icon, name) = match check.status {
            CheckStatus::Ok => ("✓".green(), check.name.normal()),
            CheckStatus::Failed if check.level == CheckLevel::Required => {
                ("✗".red(), check.name.red())
            }
            CheckStatus::Failed => ("!".yellow(), check.name.yellow()),
        };

        let suffix = if check.is_optional_failure() {
            " (optional)".dimmed().to_string()
        } else {
            String::new()
        };

        eprintln!("  {} {}{}", icon, name, suffix);

        if let Some(msg) = &check.message {
            eprintln!("    {}", msg.dimmed());
        }
        if check.status == CheckStatus::Failed {
            if let Some(fix) = &check.fix {
                eprintln!("    {}: {}", "Fix".cyan(), fix);
            }
        }
    }

    eprintln!();
}

/// Display error summary for failed required checks
pub fn display_error_summary(report: &PrerequisitesReport) {
    let failures = report.required_failures();
    if failures.is_empty() {
        return;
    }

    eprintln!(
        "{} {} required prerequisite(s) failed:",
        "Error:".red().bold(),
        failures.len()
    );

    for check in failures {
        eprintln!("  {} {}", "•".red(), check.name);
        if let Some(fix) = &check.fix {
            eprintln!("    {}: {}", "Fix".cyan(), fix);
        }
    }
}

/// Display warnings for failed optional checks
pub fn display_warnings(report: &PrerequisitesReport) {
    let warnings = report.optional_failures();
    if warnings.is_empty() {
        return;
    }

    eprintln!(
        "{} {} optional check(s) failed:",
        "Warning:".yellow().bold(),
        warnings.len()
    );

    for check in warnings {
        if let Some(msg) = &check.message {
            eprintln!("  {} {}", "•".yellow(), msg);
        }
    }

    eprintln!();
}
