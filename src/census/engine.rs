//! Census orchestration engine
//!
//! Walks every configured project and every repository in it, strictly one
//! at a time: clone, analyze, record, accumulate, clean up. Per-repository
//! and per-project failures are recorded as outcomes and never abort the run.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn, Instrument};

use super::results::{
    ProjectOutcome, ProjectStatus, RepositoryOutcome, RepositoryStatus, ScanReport,
};
use super::stats::{LanguageStats, OverallTotals, ProjectTable};
use crate::analysis::LanguageDetector;
use crate::error::CensusError;
use crate::fetcher::{RepositoryFetcher, ScratchSpace};
use crate::providers::{HostingProvider, ProjectKey};
use crate::utils::{format_duration, Timer};

/// Progress notification emitted while a scan runs
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'e> {
    /// A project was listed; `repositories` is zero for empty or failed listings
    ProjectListed { project: &'e str, repositories: usize },
    RepositoryStarted {
        project: &'e str,
        slug: &'e str,
        index: usize,
        total: usize,
    },
    RepositoryFinished {
        project: &'e str,
        slug: &'e str,
        status: &'e RepositoryStatus,
    },
    ProjectFinished { project: &'e str },
}

pub type ScanObserver<'a> = Box<dyn Fn(&ScanEvent<'_>) + Send + Sync + 'a>;

/// Sequential census over the configured projects of one workspace
pub struct CensusEngine<'a> {
    provider: &'a dyn HostingProvider,
    fetcher: &'a dyn RepositoryFetcher,
    detector: &'a dyn LanguageDetector,
    project_keys: Vec<ProjectKey>,
    empty_project_sheets: bool,
    scratch_parent: Option<PathBuf>,
    observer: Option<ScanObserver<'a>>,
}

impl<'a> CensusEngine<'a> {
    pub fn new(
        provider: &'a dyn HostingProvider,
        fetcher: &'a dyn RepositoryFetcher,
        detector: &'a dyn LanguageDetector,
        project_keys: Vec<ProjectKey>,
    ) -> Self {
        Self {
            provider,
            fetcher,
            detector,
            project_keys,
            empty_project_sheets: false,
            scratch_parent: None,
            observer: None,
        }
    }

    /// Keep a (header-only) table for projects without repositories
    pub fn set_empty_project_sheets(&mut self, enabled: bool) {
        self.empty_project_sheets = enabled;
    }

    /// Create the per-run scratch root under `parent` instead of the system
    /// temporary directory
    pub fn set_scratch_parent(&mut self, parent: impl Into<PathBuf>) {
        self.scratch_parent = Some(parent.into());
    }

    pub fn set_observer(&mut self, observer: impl Fn(&ScanEvent<'_>) + Send + Sync + 'a) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&self, event: ScanEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Run the census.
    ///
    /// Only failing to create the scratch root is an error here; everything
    /// else ends up in the returned [`ScanReport`].
    pub async fn run(&self) -> Result<ScanReport, CensusError> {
        let timer = Timer::start();
        let mut report = ScanReport::new(self.provider.workspace());
        let scratch = match &self.scratch_parent {
            Some(parent) => ScratchSpace::new_in(parent)?,
            None => ScratchSpace::new()?,
        };
        let mut totals = OverallTotals::new();
        let mut seen = BTreeSet::new();

        info!(
            workspace = self.provider.workspace(),
            projects = self.project_keys.len(),
            "Starting census"
        );

        for project in &self.project_keys {
            if !seen.insert(project.as_str()) {
                warn!(project = %project, "Duplicate project key skipped");
                continue;
            }

            self.scan_project(project, &scratch, &mut totals, &mut report)
                .instrument(info_span!("project", project = %project))
                .await;
        }

        match totals.normalize() {
            Ok(shares) => report.overall = shares,
            Err(warning) => {
                warn!("{}", warning);
                report.warnings.push(warning.to_string());
            }
        }

        report.duration = timer.elapsed();
        info!(
            analyzed = report.analyzed_count(),
            failed = report.failed_repositories().count(),
            duration = %format_duration(report.duration),
            "Census complete"
        );

        Ok(report)
    }

    async fn scan_project(
        &self,
        project: &str,
        scratch: &ScratchSpace,
        totals: &mut OverallTotals,
        report: &mut ScanReport,
    ) {
        let status = match self.provider.list_repositories(project).await {
            Ok(slugs) if slugs.is_empty() => {
                info!("Project has no repositories");
                ProjectStatus::Empty
            }
            Ok(slugs) => {
                let table = self.scan_repositories(project, &slugs, scratch, totals, report).await;
                report.tables.push(table);
                ProjectStatus::Scanned {
                    repositories: slugs.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to list repositories; skipping project");
                ProjectStatus::ListingFailed(e.to_string())
            }
        };

        if !matches!(status, ProjectStatus::Scanned { .. }) {
            self.notify(ScanEvent::ProjectListed {
                project,
                repositories: 0,
            });
            if self.empty_project_sheets {
                report.tables.push(ProjectTable::new(project));
            }
        }

        report.projects.push(ProjectOutcome {
            project: project.to_string(),
            status,
        });
        self.notify(ScanEvent::ProjectFinished { project });
    }

    async fn scan_repositories(
        &self,
        project: &str,
        slugs: &[String],
        scratch: &ScratchSpace,
        totals: &mut OverallTotals,
        report: &mut ScanReport,
    ) -> ProjectTable {
        let mut table = ProjectTable::new(project);
        let mut seen = BTreeSet::new();

        self.notify(ScanEvent::ProjectListed {
            project,
            repositories: slugs.len(),
        });
        info!(repositories = slugs.len(), "Scanning project");

        for (index, slug) in slugs.iter().enumerate() {
            // A repeated slug would be counted twice in the overall totals.
            if !seen.insert(slug.as_str()) {
                warn!(slug = %slug, "Repository listed twice; keeping the first result");
                continue;
            }

            self.notify(ScanEvent::RepositoryStarted {
                project,
                slug,
                index,
                total: slugs.len(),
            });

            let status = match self
                .scan_repository(scratch, project, slug)
                .instrument(info_span!("repository", slug = %slug))
                .await
            {
                Ok(stats) => {
                    totals.accumulate(&stats);
                    table.record(slug.clone(), stats);
                    RepositoryStatus::Analyzed
                }
                Err(status) => status,
            };

            self.notify(ScanEvent::RepositoryFinished {
                project,
                slug,
                status: &status,
            });
            report.repositories.push(RepositoryOutcome {
                project: project.to_string(),
                slug: slug.clone(),
                status,
            });
        }

        table
    }

    /// Clone and analyze one repository; the clone is removed before this
    /// returns, whatever the outcome.
    async fn scan_repository(
        &self,
        scratch: &ScratchSpace,
        project: &str,
        slug: &str,
    ) -> Result<LanguageStats, RepositoryStatus> {
        let checkout = scratch.checkout(project, slug).map_err(|e| {
            warn!(error = %e, "Cannot prepare clone directory");
            RepositoryStatus::CloneFailed(format!("cannot prepare clone directory: {}", e))
        })?;

        if let Err(e) = self.fetcher.fetch(slug, checkout.path()).await {
            warn!(error = %e, "Clone failed; skipping analysis");
            return Err(RepositoryStatus::CloneFailed(e.to_string()));
        }

        match self.detector.detect(checkout.path()).await {
            Ok(stats) => {
                debug!(languages = stats.len(), "Repository analyzed");
                Ok(stats)
            }
            Err(e) => {
                warn!(error = %e, "Language analysis failed");
                Err(RepositoryStatus::AnalysisFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse::parse_detector_output;
    use crate::error::{AnalysisError, FetchError, ProviderError};
    use crate::providers::RepositorySlug;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const STATS_FILE: &str = "languages.json";

    struct FakeProvider {
        projects: HashMap<String, Vec<RepositorySlug>>,
    }

    impl FakeProvider {
        fn new(projects: &[(&str, &[&str])]) -> Self {
            Self {
                projects: projects
                    .iter()
                    .map(|(key, slugs)| {
                        (key.to_string(), slugs.iter().map(|s| s.to_string()).collect())
                    })
                    .collect(),
            }
        }
    }

    #[async_trait::async_trait]
    impl HostingProvider for FakeProvider {
        fn workspace(&self) -> &str {
            "acme"
        }

        async fn list_repositories(
            &self,
            project: &str,
        ) -> Result<Vec<RepositorySlug>, ProviderError> {
            self.projects
                .get(project)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound {
                    resource: format!("Project '{}'", project),
                })
        }
    }

    /// "Clones" by writing the repository's detector output into the target
    struct FakeFetcher {
        outputs: HashMap<String, String>,
        clones: Mutex<Vec<PathBuf>>,
    }

    impl FakeFetcher {
        fn new(outputs: &[(&str, &str)]) -> Self {
            Self {
                outputs: outputs
                    .iter()
                    .map(|(slug, raw)| (slug.to_string(), raw.to_string()))
                    .collect(),
                clones: Mutex::new(Vec::new()),
            }
        }

        fn clones(&self) -> Vec<PathBuf> {
            self.clones.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RepositoryFetcher for FakeFetcher {
        async fn fetch(&self, slug: &str, target: &Path) -> Result<(), FetchError> {
            assert!(!target.exists(), "clone target must not exist yet");
            let raw = self.outputs.get(slug).ok_or_else(|| FetchError::CloneFailed {
                slug: slug.to_string(),
                exit_code: 128,
                stderr: "repository not found".to_string(),
            })?;
            fs::create_dir_all(target).unwrap();
            fs::write(target.join(STATS_FILE), raw).unwrap();
            self.clones.lock().unwrap().push(target.to_path_buf());
            Ok(())
        }
    }

    struct FakeDetector;

    #[async_trait::async_trait]
    impl LanguageDetector for FakeDetector {
        async fn detect(&self, directory: &Path) -> Result<LanguageStats, AnalysisError> {
            let raw = fs::read_to_string(directory.join(STATS_FILE)).map_err(|e| {
                AnalysisError::MissingDirectory {
                    path: e.to_string(),
                }
            })?;
            parse_detector_output(&raw)
        }
    }

    fn keys(keys: &[&str]) -> Vec<ProjectKey> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn stats(entries: &[(&str, f64)]) -> LanguageStats {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    const R1: &str = r#"{"Go": 80, "Python": 20}"#;
    const R2: &str = r#"{"Go": 50, "JS": 50}"#;

    #[tokio::test]
    async fn test_run_builds_tables_and_overall() {
        let provider = FakeProvider::new(&[("CORE", &["r1", "r2"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1), ("r2", R2)]);
        let engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE"]));

        let report = engine.run().await.unwrap();

        let table = report.table("CORE").unwrap();
        assert_eq!(table.get("r1"), Some(&stats(&[("Go", 80.0), ("Python", 20.0)])));
        assert_eq!(table.languages(), vec!["Go", "JS", "Python"]);
        assert_close(report.overall["Go"], 65.0);
        assert_close(report.overall["Python"], 10.0);
        assert_close(report.overall["JS"], 25.0);
        assert_eq!(report.analyzed_count(), 2);
        assert!(!report.has_problems());
    }

    #[tokio::test]
    async fn test_clone_failure_is_absent_from_table_and_run_completes() {
        let provider = FakeProvider::new(&[("CORE", &["r1", "broken", "r2"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1), ("r2", R2)]);
        let engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE"]));

        let report = engine.run().await.unwrap();

        let table = report.table("CORE").unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("broken").is_none());
        assert!(matches!(
            report.repository_status("CORE", "broken"),
            Some(RepositoryStatus::CloneFailed(_))
        ));
        assert_close(report.overall["Go"], 65.0);
        assert!(report.has_problems());
    }

    #[tokio::test]
    async fn test_analysis_failure_is_recorded() {
        let provider = FakeProvider::new(&[("CORE", &["r1", "garbled"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1), ("garbled", "not a breakdown")]);
        let engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE"]));

        let report = engine.run().await.unwrap();

        assert!(matches!(
            report.repository_status("CORE", "garbled"),
            Some(RepositoryStatus::AnalysisFailed(_))
        ));
        assert!(report.table("CORE").unwrap().get("garbled").is_none());
    }

    #[tokio::test]
    async fn test_repository_without_code_is_a_zero_row() {
        let provider = FakeProvider::new(&[("DOCS", &["handbook"])]);
        let fetcher = FakeFetcher::new(&[("handbook", "{}")]);
        let engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["DOCS"]));

        let report = engine.run().await.unwrap();

        assert_eq!(
            report.table("DOCS").unwrap().get("handbook"),
            Some(&LanguageStats::new())
        );
        assert!(report.overall.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_project_omitted_by_default() {
        let provider = FakeProvider::new(&[("CORE", &["r1"]), ("EMPTY", &[])]);
        let fetcher = FakeFetcher::new(&[("r1", R1)]);
        let engine =
            CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["EMPTY", "CORE"]));

        let report = engine.run().await.unwrap();

        assert!(report.table("EMPTY").is_none());
        assert_eq!(report.project_status("EMPTY"), Some(&ProjectStatus::Empty));
        assert_eq!(report.tables.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_project_kept_when_configured() {
        let provider = FakeProvider::new(&[("CORE", &["r1"]), ("EMPTY", &[])]);
        let fetcher = FakeFetcher::new(&[("r1", R1)]);
        let mut engine =
            CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["EMPTY", "CORE"]));
        engine.set_empty_project_sheets(true);

        let report = engine.run().await.unwrap();

        let keys: Vec<&str> = report.tables.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["EMPTY", "CORE"]);
        assert!(report.table("EMPTY").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_skips_project() {
        let provider = FakeProvider::new(&[("CORE", &["r1"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1)]);
        let engine =
            CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["GONE", "CORE"]));

        let report = engine.run().await.unwrap();

        assert!(matches!(
            report.project_status("GONE"),
            Some(ProjectStatus::ListingFailed(_))
        ));
        assert!(report.table("CORE").is_some());
        assert_eq!(report.analyzed_count(), 1);
    }

    #[tokio::test]
    async fn test_nothing_analyzed_warns_and_leaves_overall_empty() {
        let provider = FakeProvider::new(&[("EMPTY", &[])]);
        let fetcher = FakeFetcher::new(&[]);
        let engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["EMPTY"]));

        let report = engine.run().await.unwrap();

        assert!(report.overall.is_empty());
        assert_eq!(
            report.warnings,
            vec!["No language data was collected; the overall summary is empty".to_string()]
        );
    }

    #[tokio::test]
    async fn test_clones_are_removed_after_each_repository() {
        let scratch_parent = TempDir::new().unwrap();
        let provider = FakeProvider::new(&[("CORE", &["r1", "r2"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1), ("r2", R2)]);
        let mut engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE"]));
        engine.set_scratch_parent(scratch_parent.path());

        engine.run().await.unwrap();

        let clones = fetcher.clones();
        assert_eq!(clones.len(), 2);
        assert!(clones.iter().all(|path| !path.exists()));
        assert_eq!(fs::read_dir(scratch_parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_keys_and_slugs_are_counted_once() {
        let provider = FakeProvider::new(&[("CORE", &["r1", "r1"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1)]);
        let engine =
            CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE", "CORE"]));

        let report = engine.run().await.unwrap();

        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.repositories.len(), 1);
        assert_eq!(fetcher.clones().len(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_every_repository() {
        let provider = FakeProvider::new(&[("CORE", &["r1", "broken"])]);
        let fetcher = FakeFetcher::new(&[("r1", R1)]);
        let events = Mutex::new(Vec::new());
        let mut engine = CensusEngine::new(&provider, &fetcher, &FakeDetector, keys(&["CORE"]));
        engine.set_observer(|event| {
            if let ScanEvent::RepositoryFinished { slug, status, .. } = event {
                events
                    .lock()
                    .unwrap()
                    .push(format!("{}:{}", slug, status.label()));
            }
        });

        engine.run().await.unwrap();
        drop(engine);

        assert_eq!(
            events.into_inner().unwrap(),
            vec!["r1:analyzed".to_string(), "broken:clone failed".to_string()]
        );
    }
}
