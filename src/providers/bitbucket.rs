//! Bitbucket provider - Interactions with the Bitbucket Cloud REST API

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{Credentials, HostingProvider, RepositorySlug};
use crate::config::HostingConfig;
use crate::error::ProviderError;

/// Authenticated handle on a Bitbucket workspace
pub struct BitbucketWorkspace {
    client: reqwest::Client,
    api_url: Url,
    workspace: String,
    credentials: Credentials,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct WorkspaceInfo {
    slug: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    key: String,
    #[serde(default)]
    name: Option<String>,
}

/// One page of the repository listing
#[derive(Debug, Deserialize)]
pub struct RepositoryPage {
    #[serde(default)]
    pub values: Vec<RepositoryEntry>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryEntry {
    pub slug: String,
}

impl BitbucketWorkspace {
    /// Build an API client and resolve the workspace with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotAuthenticated`] when the credentials are
    /// rejected, [`ProviderError::NotFound`] when the workspace does not
    /// exist, and transport errors as they occur.
    pub async fn authenticate(
        config: &HostingConfig,
        workspace: &str,
        credentials: Credentials,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("langcensus/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl(config.api_url.clone()));
        }

        let handle = Self {
            client,
            api_url,
            workspace: workspace.to_string(),
            credentials,
            page_size: config.page_size,
        };

        let url = handle.endpoint(&["workspaces", workspace])?;
        let response = handle.get(url).await?;
        let info: WorkspaceInfo = handle
            .check(response, || format!("Workspace '{}'", workspace))
            .await?
            .json()
            .await?;

        info!(
            workspace = %info.slug,
            name = info.name.as_deref().unwrap_or(""),
            "Authenticated against Bitbucket"
        );

        Ok(handle)
    }

    /// Build an API URL from path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidBaseUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, ProviderError> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(self.credentials.username(), Some(self.credentials.secret()))
            .send()
            .await?;
        Ok(response)
    }

    /// Map non-success statuses onto provider errors
    async fn check(
        &self,
        response: Response,
        resource: impl FnOnce() -> String,
    ) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ProviderError::NotAuthenticated {
                    workspace: self.workspace.clone(),
                    status: status.as_u16(),
                })
            }
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound {
                resource: resource(),
            }),
            _ => Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            }),
        }
    }

    async fn resolve_project(&self, project: &str) -> Result<ProjectInfo, ProviderError> {
        let url = self.endpoint(&["workspaces", &self.workspace, "projects", project])?;
        let response = self.get(url).await?;
        let info: ProjectInfo = self
            .check(response, || {
                format!("Project '{}' in workspace '{}'", project, self.workspace)
            })
            .await?
            .json()
            .await?;
        debug!(
            project = %info.key,
            name = info.name.as_deref().unwrap_or(""),
            "Resolved project"
        );
        Ok(info)
    }
}

#[async_trait::async_trait]
impl HostingProvider for BitbucketWorkspace {
    fn workspace(&self) -> &str {
        &self.workspace
    }

    async fn list_repositories(&self, project: &str) -> Result<Vec<RepositorySlug>, ProviderError> {
        let project = self.resolve_project(project).await?;

        let mut url = self.endpoint(&["repositories", &self.workspace])?;
        url.query_pairs_mut()
            .append_pair("q", &format!("project.key=\"{}\"", project.key))
            .append_pair("pagelen", &self.page_size.to_string());

        let mut slugs = Vec::new();
        loop {
            let response = self.get(url.clone()).await?;
            let page: RepositoryPage = self
                .check(response, || format!("Repositories of project '{}'", project.key))
                .await?
                .json()
                .await?;

            slugs.extend(page.values.into_iter().map(|r| r.slug));

            match page.next {
                Some(next) => {
                    let next = Url::parse(&next)?;
                    if next == url {
                        break;
                    }
                    url = next;
                }
                None => break,
            }
        }

        debug!(project = %project.key, count = slugs.len(), "Listed repositories");
        Ok(slugs)
    }
}
