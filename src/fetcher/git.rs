//! Cloning through the `git` command line

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::RepositoryFetcher;
use crate::error::FetchError;
use crate::providers::Credentials;
use crate::utils::command::{execute_command, CommandFailure};

const USERNAME_ENV: &str = "LANGCENSUS_GIT_USERNAME";
const SECRET_ENV: &str = "LANGCENSUS_GIT_SECRET";

/// Inline credential helper answering `get` from the child's environment
const CREDENTIAL_HELPER: &str = "!f() { test \"$1\" = get || exit 0; echo \"username=${LANGCENSUS_GIT_USERNAME}\"; echo \"password=${LANGCENSUS_GIT_SECRET}\"; }; f";

/// Clones `<clone_url>/<workspace>/<slug>.git` with `git clone --single-branch`.
///
/// Credentials never appear in the URL or the argument list: they reach git
/// through an inline credential helper configured via `GIT_CONFIG_*`
/// variables.
pub struct GitFetcher {
    clone_url: Url,
    workspace: String,
    credentials: Credentials,
    timeout: Duration,
}

impl GitFetcher {
    pub fn new(
        clone_url: &str,
        workspace: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            clone_url: Url::parse(clone_url)?,
            workspace: workspace.to_string(),
            credentials,
            timeout,
        })
    }

    /// URL a repository is cloned from
    pub fn repository_url(&self, slug: &str) -> Result<Url, FetchError> {
        let mut url = self.clone_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&self.workspace)
            .push(&format!("{}.git", slug));
        Ok(url)
    }

    fn git_env(&self) -> [(&str, &str); 8] {
        [
            ("GIT_TERMINAL_PROMPT", "0"),
            ("GIT_CONFIG_COUNT", "2"),
            // An empty helper resets helpers inherited from user config.
            ("GIT_CONFIG_KEY_0", "credential.helper"),
            ("GIT_CONFIG_VALUE_0", ""),
            ("GIT_CONFIG_KEY_1", "credential.helper"),
            ("GIT_CONFIG_VALUE_1", CREDENTIAL_HELPER),
            (USERNAME_ENV, self.credentials.username()),
            (SECRET_ENV, self.credentials.secret()),
        ]
    }
}

#[async_trait::async_trait]
impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, slug: &str, target: &Path) -> Result<(), FetchError> {
        let url = self.repository_url(slug)?;
        info!(slug, "Cloning repository");
        debug!(url = %url, target = %target.display(), "git clone");

        let args: [&OsStr; 5] = [
            OsStr::new("clone"),
            OsStr::new("--single-branch"),
            OsStr::new("--quiet"),
            OsStr::new(url.as_str()),
            target.as_os_str(),
        ];

        let result = execute_command("git", args, &self.git_env(), None, self.timeout)
            .await
            .map_err(|failure| match failure {
                CommandFailure::Spawn(e) => FetchError::Spawn(e.to_string()),
                CommandFailure::TimedOut(d) => FetchError::TimedOut {
                    slug: slug.to_string(),
                    seconds: d.as_secs(),
                },
            })?;

        if !result.success() {
            return Err(FetchError::CloneFailed {
                slug: slug.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        info!(slug, "Repository cloned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::ScratchSpace;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Build `<base>/acme/<slug>.git` as a bare repository with one commit
    fn bare_remote(base: &Path, slug: &str) {
        let work = base.join("work");
        fs::create_dir_all(&work).unwrap();
        git(&work, &["init", "--quiet"]);
        fs::write(work.join("main.go"), "package main\n").unwrap();
        git(&work, &["add", "."]);
        git(&work, &["commit", "--quiet", "-m", "initial"]);

        fs::create_dir_all(base.join("acme")).unwrap();
        let bare = base.join("acme").join(format!("{}.git", slug));
        git(
            base,
            &[
                "clone",
                "--quiet",
                "--bare",
                work.to_str().unwrap(),
                bare.to_str().unwrap(),
            ],
        );
    }

    fn fetcher(base: &str) -> GitFetcher {
        GitFetcher::new(
            base,
            "acme",
            Credentials::new("alice", "secret"),
            Duration::from_secs(60),
        )
        .unwrap()
    }

    #[test]
    fn test_repository_url() {
        let fetcher = fetcher("https://bitbucket.org");
        assert_eq!(
            fetcher.repository_url("api").unwrap().as_str(),
            "https://bitbucket.org/acme/api.git"
        );
    }

    #[test]
    fn test_repository_url_keeps_credentials_out() {
        let fetcher = fetcher("https://bitbucket.org/");
        let url = fetcher.repository_url("api").unwrap();
        assert_eq!(url.username(), "");
        assert!(url.password().is_none());
        assert!(!url.as_str().contains("secret"));
    }

    #[test]
    fn test_git_env_carries_secret_only_in_env() {
        let fetcher = fetcher("https://bitbucket.org");
        let env = fetcher.git_env();
        assert!(env.contains(&(SECRET_ENV, "secret")));
        assert!(env.contains(&("GIT_TERMINAL_PROMPT", "0")));
        assert!(!CREDENTIAL_HELPER.contains("secret"));
    }

    #[tokio::test]
    async fn test_fetch_clones_local_remote() {
        if !git_available() {
            return;
        }
        let remotes = TempDir::new().unwrap();
        bare_remote(remotes.path(), "api");

        let base = Url::from_directory_path(remotes.path()).unwrap();
        let fetcher = fetcher(base.as_str());
        let scratch = ScratchSpace::new().unwrap();
        let checkout = scratch.checkout("CORE", "api").unwrap();
        assert!(!checkout.path().exists());

        fetcher.fetch("api", checkout.path()).await.unwrap();
        assert!(checkout.path().join("main.go").exists());

        let path = checkout.path().to_path_buf();
        drop(checkout);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fetch_missing_repository_fails() {
        if !git_available() {
            return;
        }
        let remotes = TempDir::new().unwrap();
        let base = Url::from_directory_path(remotes.path()).unwrap();
        let fetcher = fetcher(base.as_str());
        let scratch = ScratchSpace::new().unwrap();
        let checkout = scratch.checkout("CORE", "missing").unwrap();

        let result = fetcher.fetch("missing", checkout.path()).await;
        assert!(matches!(result, Err(FetchError::CloneFailed { .. })));
    }
}
