//! Language share tables and their aggregation

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::providers::{ProjectKey, RepositorySlug};

/// Language name to percentage of detected code for one repository.
///
/// Values are relative shares; they need not sum to exactly 100.
pub type LanguageStats = BTreeMap<String, f64>;

/// Per-repository language shares of one project, in listing order
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTable {
    key: ProjectKey,
    rows: Vec<(RepositorySlug, LanguageStats)>,
}

/// A project table laid out as a grid
#[derive(Debug, Clone, PartialEq)]
pub struct Tabulation {
    /// Union of languages across the project, sorted by name
    pub languages: Vec<String>,
    pub rows: Vec<TabulatedRow>,
}

/// One repository row of a [`Tabulation`]; `values` aligns with `languages`
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedRow {
    pub repository: RepositorySlug,
    pub values: Vec<f64>,
}

impl ProjectTable {
    pub fn new(key: impl Into<ProjectKey>) -> Self {
        Self {
            key: key.into(),
            rows: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rows(&self) -> &[(RepositorySlug, LanguageStats)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert a repository's stats; a repeated slug replaces the earlier
    /// entry in place.
    pub fn record(&mut self, slug: impl Into<RepositorySlug>, stats: LanguageStats) {
        let slug = slug.into();
        match self.rows.iter_mut().find(|(existing, _)| *existing == slug) {
            Some(row) => row.1 = stats,
            None => self.rows.push((slug, stats)),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&LanguageStats> {
        self.rows
            .iter()
            .find(|(existing, _)| existing == slug)
            .map(|(_, stats)| stats)
    }

    /// Union of all languages seen in this project, sorted by name
    pub fn languages(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|(_, stats)| stats.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Lay the table out with one column per language, missing entries as zero
    pub fn tabulate(&self) -> Tabulation {
        let languages = self.languages();
        let rows = self
            .rows
            .iter()
            .map(|(slug, stats)| TabulatedRow {
                repository: slug.clone(),
                values: languages
                    .iter()
                    .map(|language| stats.get(language).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Tabulation { languages, rows }
    }
}

/// Raised when there is nothing to normalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalizeWarning {
    #[error("No language data was collected; the overall summary is empty")]
    NoLanguageData,
}

/// Running sum of language shares across every analyzed repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallTotals {
    totals: LanguageStats,
}

impl OverallTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add each share of `stats` to the running total.
    ///
    /// This is a plain sum: repositories are not weighted by size.
    pub fn accumulate(&mut self, stats: &LanguageStats) {
        for (language, share) in stats {
            *self.totals.entry(language.clone()).or_insert(0.0) += share;
        }
    }

    pub fn get(&self, language: &str) -> Option<f64> {
        self.totals.get(language).copied()
    }

    pub fn sum(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Scale the totals into a distribution summing to 100.
    ///
    /// An empty or all-zero total has no distribution; it yields
    /// [`NormalizeWarning::NoLanguageData`] instead of dividing by zero.
    pub fn normalize(&self) -> Result<LanguageStats, NormalizeWarning> {
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(NormalizeWarning::NoLanguageData);
        }

        Ok(self
            .totals
            .iter()
            .map(|(language, total)| (language.clone(), total / sum * 100.0))
            .collect())
    }
}

/// Shares ordered by descending value, ties broken by language name
pub fn ranked(shares: &LanguageStats) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = shares.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked
}
