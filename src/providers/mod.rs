//! # Providers Module
//!
//! This module handles integrations with external services: the repository
//! hosting API and the credentials used to reach it.
//!
//! ## Bitbucket Integration
//!
//! The [`bitbucket`] module provides functionality for:
//!
//! - Resolving an authenticated workspace handle
//! - Resolving a project by key
//! - Listing every repository slug of a project (paginated)
//!
//! ## Prerequisites
//!
//! Bitbucket operations require a username and an app password (or access
//! token) with read access to the workspace, exported as `BB_USER` and
//! `BB_APP_PASSWORD` unless configured otherwise.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use langcensus::config::HostingConfig;
//! use langcensus::providers::bitbucket::BitbucketWorkspace;
//! use langcensus::providers::{Credentials, HostingProvider};
//!
//! # async fn demo() -> Result<(), langcensus::error::ProviderError> {
//! let credentials = Credentials::new("alice", "app-password");
//! let workspace =
//!     BitbucketWorkspace::authenticate(&HostingConfig::default(), "acme", credentials).await?;
//! let slugs = workspace.list_repositories("CORE").await?;
//! println!("{} repositories", slugs.len());
//! # Ok(())
//! # }
//! ```

pub mod bitbucket;
pub mod credentials;

pub use credentials::Credentials;

use crate::error::ProviderError;

/// Opaque identifier of a group of repositories
pub type ProjectKey = String;

/// Opaque identifier of a repository within a workspace
pub type RepositorySlug = String;

/// An authenticated view of a hosting workspace
#[async_trait::async_trait]
pub trait HostingProvider: Send + Sync {
    /// Workspace identifier this handle was resolved for
    fn workspace(&self) -> &str;

    /// List every repository slug belonging to a project.
    ///
    /// An `Ok` with an empty list means the project exists but has no
    /// repositories; any failure to list is an `Err`.
    async fn list_repositories(&self, project: &str) -> Result<Vec<RepositorySlug>, ProviderError>;
}
