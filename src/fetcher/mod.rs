//! Fetcher module - Cloning repositories into scratch space
//!
//! Every run owns a uniquely named temporary root. Each repository is
//! cloned into its own [`Checkout`], which deletes the directory when it is
//! dropped, whatever happened in between.

mod git;

pub use git::GitFetcher;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Clones a repository into a local directory
#[async_trait::async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Clone `slug` into `target`, which must not exist yet
    async fn fetch(&self, slug: &str, target: &Path) -> Result<(), FetchError>;
}

/// Per-run temporary root directory, removed on drop
pub struct ScratchSpace {
    root: TempDir,
}

impl ScratchSpace {
    /// Create a new root under the system temporary directory
    pub fn new() -> io::Result<Self> {
        let root = tempfile::Builder::new().prefix("langcensus-").tempdir()?;
        debug!(root = %root.path().display(), "Created scratch space");
        Ok(Self { root })
    }

    /// Create a new root under `parent`
    pub fn new_in(parent: &Path) -> io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("langcensus-")
            .tempdir_in(parent)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Reserve the clone directory for one repository.
    ///
    /// A leftover directory with the same name is removed first, so the
    /// returned path never exists when this returns successfully.
    pub fn checkout(&self, project: &str, slug: &str) -> io::Result<Checkout> {
        let path = self.root.path().join(format!(
            "cloned_repo_{}_{}",
            path_component(project),
            path_component(slug)
        ));

        if path.exists() {
            fs::remove_dir_all(&path)?;
        }

        Ok(Checkout { path })
    }
}

/// Clone directory of a single repository, deleted on drop
#[derive(Debug)]
pub struct Checkout {
    path: PathBuf,
}

impl Checkout {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed clone"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove clone"),
        }
    }
}

/// Restrict an identifier to characters safe in a single path component
fn path_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
