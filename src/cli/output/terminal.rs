//! Terminal output formatting with colors

use colored::Colorize;
use std::path::Path;

use crate::census::{ranked, ProjectStatus, ScanReport};
use crate::utils::format_duration;

/// Languages listed in the terminal summary; the workbook has all of them
const TOP_LANGUAGES: usize = 5;

pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn format_header(&self, workspace: &str) -> String {
        format!(
            "\n{} v{}\n\n{} {}\n",
            "langcensus".cyan().bold(),
            env!("CARGO_PKG_VERSION"),
            "Workspace:".dimmed(),
            workspace.white().bold()
        )
    }

    fn format_failures(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        let listing_failures: Vec<_> = report
            .projects
            .iter()
            .filter_map(|p| match &p.status {
                ProjectStatus::ListingFailed(reason) => Some((p.project.as_str(), reason)),
                _ => None,
            })
            .collect();
        let repository_failures: Vec<_> = report.failed_repositories().collect();

        if listing_failures.is_empty() && repository_failures.is_empty() {
            return output;
        }

        output.push_str(&format!(
            "\n{}\n{}\n\n",
            "━".repeat(50).dimmed(),
            "  FAILURES".bold()
        ));

        for (project, reason) in listing_failures {
            output.push_str(&format!(
                "  {} [{}] {}\n",
                "✗".red(),
                project.cyan(),
                reason
            ));
        }

        for outcome in repository_failures {
            output.push_str(&format!(
                "  {} [{}] {} {}\n",
                "✗".red(),
                outcome.project.cyan(),
                outcome.slug.bold(),
                outcome.status.label().red()
            ));
            if let Some(detail) = outcome.status.detail() {
                output.push_str(&format!("    {} {}\n", "└─".dimmed(), detail.dimmed()));
            }
        }

        output
    }

    fn format_languages(&self, report: &ScanReport) -> String {
        let mut output = format!(
            "\n{}\n{}\n\n",
            "━".repeat(50).dimmed(),
            "  TOP LANGUAGES".bold()
        );

        if report.overall.is_empty() {
            output.push_str(&format!("  {}\n", "No language data collected.".yellow()));
            return output;
        }

        for (language, share) in ranked(&report.overall).into_iter().take(TOP_LANGUAGES) {
            output.push_str(&format!("  {:<20} {:>6.2}%\n", language, share));
        }

        output
    }

    fn format_summary(&self, report: &ScanReport, output_path: Option<&Path>) -> String {
        let mut output = format!(
            "\n{}\n{}\n\n",
            "━".repeat(50).dimmed(),
            "  SUMMARY".bold()
        );

        let scanned = report.count_projects(|s| matches!(s, ProjectStatus::Scanned { .. }));
        let empty = report.count_projects(|s| matches!(s, ProjectStatus::Empty));
        let unlisted = report.count_projects(|s| matches!(s, ProjectStatus::ListingFailed(_)));
        let failed = report.failed_repositories().count();

        output.push_str(&format!(
            "Projects:     {} scanned │ {} empty │ {} failed\n",
            scanned.to_string().green().bold(),
            empty.to_string().yellow().bold(),
            unlisted.to_string().red().bold()
        ));
        output.push_str(&format!(
            "Repositories: {} analyzed │ {} failed\n",
            report.analyzed_count().to_string().green().bold(),
            failed.to_string().red().bold()
        ));

        for warning in &report.warnings {
            output.push_str(&format!("\n{} {}\n", "⚠️ ".yellow(), warning));
        }

        output.push_str(&format!(
            "\nCompleted in {}",
            format_duration(report.duration).cyan()
        ));
        if let Some(path) = output_path {
            output.push_str(&format!(
                "; report written to {}",
                path.display().to_string().cyan()
            ));
        }
        output.push('\n');

        output
    }

    /// Render the end-of-run summary
    pub fn render(&self, report: &ScanReport, output_path: Option<&Path>) -> String {
        let mut output = self.format_header(&report.workspace);
        output.push_str(&self.format_failures(report));
        output.push_str(&self.format_languages(report));
        output.push_str(&self.format_summary(report, output_path));
        output
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::{LanguageStats, ProjectOutcome, RepositoryOutcome, RepositoryStatus};

    fn report() -> ScanReport {
        let mut report = ScanReport::new("acme");
        report.overall = [("Go", 65.0), ("Python", 10.0), ("JS", 25.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<LanguageStats>();
        report.projects.push(ProjectOutcome {
            project: "CORE".to_string(),
            status: ProjectStatus::Scanned { repositories: 2 },
        });
        report.projects.push(ProjectOutcome {
            project: "GONE".to_string(),
            status: ProjectStatus::ListingFailed("Project 'GONE' not found".to_string()),
        });
        report.repositories.push(RepositoryOutcome {
            project: "CORE".to_string(),
            slug: "api".to_string(),
            status: RepositoryStatus::Analyzed,
        });
        report.repositories.push(RepositoryOutcome {
            project: "CORE".to_string(),
            slug: "legacy".to_string(),
            status: RepositoryStatus::CloneFailed("exit code 128".to_string()),
        });
        report
    }

    #[test]
    fn test_format_header() {
        let header = TerminalOutput::new().format_header("acme");
        assert!(header.contains("langcensus"));
        assert!(header.contains("acme"));
    }

    #[test]
    fn test_failures_list_projects_and_repositories() {
        let failures = TerminalOutput::new().format_failures(&report());
        assert!(failures.contains("GONE"));
        assert!(failures.contains("legacy"));
        assert!(failures.contains("exit code 128"));
        assert!(!failures.contains("api"));
    }

    #[test]
    fn test_no_failures_renders_nothing() {
        let failures = TerminalOutput::new().format_failures(&ScanReport::new("acme"));
        assert!(failures.is_empty());
    }

    #[test]
    fn test_languages_are_ranked() {
        let languages = TerminalOutput::new().format_languages(&report());
        let go = languages.find("Go").unwrap();
        let js = languages.find("JS").unwrap();
        let python = languages.find("Python").unwrap();
        assert!(go < js && js < python);
        assert!(languages.contains("65.00%"));
    }

    #[test]
    fn test_empty_overall_is_reported() {
        let languages = TerminalOutput::new().format_languages(&ScanReport::new("acme"));
        assert!(languages.contains("No language data collected."));
    }

    #[test]
    fn test_render_mentions_output_path() {
        let rendered =
            TerminalOutput::new().render(&report(), Some(Path::new("project_languages.xlsx")));
        assert!(rendered.contains("project_languages.xlsx"));
        assert!(rendered.contains("SUMMARY"));
    }
}
