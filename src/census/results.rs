//! # Scan Results Structures
//!
//! This module defines the data structures describing what happened to every
//! project and repository during a scan.
//!
//! ## Overview
//!
//! - [`RepositoryStatus`] - Analyzed, or why a repository has no data
//! - [`ProjectStatus`] - Scanned, empty, or why listing failed
//! - [`ScanReport`] - Tables, overall shares and outcomes of a complete run
//!
//! Keeping an explicit status per repository and per project makes partial
//! failure visible: a repository that failed to clone is reported as such
//! instead of looking like a repository without code.

use chrono::{DateTime, Local};
use std::time::Duration;

use super::stats::{LanguageStats, ProjectTable};
use crate::providers::{ProjectKey, RepositorySlug};

/// What happened to a single repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryStatus {
    /// Cloned and analyzed; its stats are in the project table
    Analyzed,
    /// The clone failed; analysis was skipped
    CloneFailed(String),
    /// The clone succeeded but the detector failed
    AnalysisFailed(String),
}

impl RepositoryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyzed => "analyzed",
            Self::CloneFailed(_) => "clone failed",
            Self::AnalysisFailed(_) => "analysis failed",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Analyzed => None,
            Self::CloneFailed(reason) | Self::AnalysisFailed(reason) => Some(reason),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Analyzed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOutcome {
    pub project: ProjectKey,
    pub slug: RepositorySlug,
    pub status: RepositoryStatus,
}

/// What happened to a project as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Listing succeeded with this many repositories
    Scanned { repositories: usize },
    /// Listing succeeded but the project has no repositories
    Empty,
    /// Listing failed; the project was skipped
    ListingFailed(String),
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scanned { .. } => "scanned",
            Self::Empty => "no repositories",
            Self::ListingFailed(_) => "listing failed",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ListingFailed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub project: ProjectKey,
    pub status: ProjectStatus,
}

/// Everything a scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Workspace that was scanned
    pub workspace: String,
    /// One table per project that gets a sheet, in configuration order
    pub tables: Vec<ProjectTable>,
    /// Normalized overall shares; empty when no language data was collected
    pub overall: LanguageStats,
    pub projects: Vec<ProjectOutcome>,
    pub repositories: Vec<RepositoryOutcome>,
    /// Run-level warnings such as an empty overall summary
    pub warnings: Vec<String>,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
}

impl ScanReport {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            tables: Vec::new(),
            overall: LanguageStats::new(),
            projects: Vec::new(),
            repositories: Vec::new(),
            warnings: Vec::new(),
            started_at: Local::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn table(&self, project: &str) -> Option<&ProjectTable> {
        self.tables.iter().find(|t| t.key() == project)
    }

    pub fn project_status(&self, project: &str) -> Option<&ProjectStatus> {
        self.projects
            .iter()
            .find(|p| p.project == project)
            .map(|p| &p.status)
    }

    pub fn repository_status(&self, project: &str, slug: &str) -> Option<&RepositoryStatus> {
        self.repositories
            .iter()
            .find(|r| r.project == project && r.slug == slug)
            .map(|r| &r.status)
    }

    pub fn analyzed_count(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| !r.status.is_failure())
            .count()
    }

    pub fn failed_repositories(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.repositories.iter().filter(|r| r.status.is_failure())
    }

    pub fn count_projects(&self, predicate: impl Fn(&ProjectStatus) -> bool) -> usize {
        self.projects.iter().filter(|p| predicate(&p.status)).count()
    }

    /// Whether anything failed, was empty, or raised a warning
    pub fn has_problems(&self) -> bool {
        !self.warnings.is_empty()
            || self.failed_repositories().next().is_some()
            || self
                .projects
                .iter()
                .any(|p| !matches!(p.status, ProjectStatus::Scanned { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(project: &str, slug: &str, status: RepositoryStatus) -> RepositoryOutcome {
        RepositoryOutcome {
            project: project.to_string(),
            slug: slug.to_string(),
            status,
        }
    }

    #[test]
    fn test_status_labels_and_details() {
        assert_eq!(RepositoryStatus::Analyzed.label(), "analyzed");
        assert_eq!(RepositoryStatus::Analyzed.detail(), None);
        let failed = RepositoryStatus::CloneFailed("network down".to_string());
        assert_eq!(failed.label(), "clone failed");
        assert_eq!(failed.detail(), Some("network down"));
        assert!(failed.is_failure());
        assert_eq!(ProjectStatus::Empty.label(), "no repositories");
    }

    #[test]
    fn test_new_report_is_clean() {
        let report = ScanReport::new("acme");
        assert_eq!(report.workspace, "acme");
        assert_eq!(report.analyzed_count(), 0);
        assert!(!report.has_problems());
    }

    #[test]
    fn test_counts_and_lookups() {
        let mut report = ScanReport::new("acme");
        report.projects.push(ProjectOutcome {
            project: "CORE".to_string(),
            status: ProjectStatus::Scanned { repositories: 2 },
        });
        report.repositories.push(outcome("CORE", "api", RepositoryStatus::Analyzed));
        report.repositories.push(outcome(
            "CORE",
            "web",
            RepositoryStatus::AnalysisFailed("boom".to_string()),
        ));

        assert_eq!(report.analyzed_count(), 1);
        assert_eq!(report.failed_repositories().count(), 1);
        assert_eq!(
            report.repository_status("CORE", "web"),
            Some(&RepositoryStatus::AnalysisFailed("boom".to_string()))
        );
        assert_eq!(
            report.count_projects(|s| matches!(s, ProjectStatus::Scanned { .. })),
            1
        );
        assert!(report.has_problems());
    }

    #[test]
    fn test_empty_project_counts_as_problem() {
        let mut report = ScanReport::new("acme");
        report.projects.push(ProjectOutcome {
            project: "EMPTY".to_string(),
            status: ProjectStatus::Empty,
        });
        assert!(report.has_problems());
        assert_eq!(report.project_status("EMPTY"), Some(&ProjectStatus::Empty));
    }
}
