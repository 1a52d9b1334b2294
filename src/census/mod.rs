//! Census module - Per-project language tables, overall totals and the scan
//! orchestrator

mod engine;
mod results;
mod stats;

pub use engine::{CensusEngine, ScanEvent, ScanObserver};
pub use results::{
    ProjectOutcome, ProjectStatus, RepositoryOutcome, RepositoryStatus, ScanReport,
};
pub use stats::{
    ranked, LanguageStats, NormalizeWarning, OverallTotals, ProjectTable, TabulatedRow,
    Tabulation,
};
