//! Static-site publishing through a GitHub Pages repository.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::GithubPagesConfig;

use super::error::DeployError;
use super::traits::Deployer;
use super::types::DeploymentResult;

/// Credentials and target as supplied by the caller; any may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitPagesCredentials {
    pub username: Option<String>,
    pub repository: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
}

/// Fully resolved GitHub Pages target.
#[derive(Clone, PartialEq, Eq)]
pub struct GitPagesSettings {
    pub username: String,
    pub repository: String,
    pub token: String,
    pub branch: String,
    /// Staging directory name, created next to the package directory.
    pub temp_deploy_dir: String,
}

impl std::fmt::Debug for GitPagesSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitPagesSettings")
            .field("username", &self.username)
            .field("repository", &self.repository)
            .field("token", &"***")
            .field("branch", &self.branch)
            .field("temp_deploy_dir", &self.temp_deploy_dir)
            .finish()
    }
}

impl GitPagesSettings {
    /// Combines caller credentials with configuration defaults.
    pub fn resolve(
        credentials: GitPagesCredentials,
        config: &GithubPagesConfig,
    ) -> Result<Self, DeployError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let username = present(credentials.username);
        let repository = present(credentials.repository);
        let token = present(credentials.token);
        let branch = present(credentials.branch).or_else(|| present(Some(config.default_branch.clone())));

        let mut missing = Vec::new();
        for (name, value) in [
            ("username", &username),
            ("repository", &repository),
            ("token", &token),
            ("branch", &branch),
        ] {
            if value.is_none() {
                missing.push(name.to_string());
            }
        }

        match (username, repository, token, branch) {
            (Some(username), Some(repository), Some(token), Some(branch)) => Ok(Self {
                username,
                repository,
                token,
                branch,
                temp_deploy_dir: config.temp_deploy_dir.clone(),
            }),
            _ => Err(DeployError::MissingCredentials { missing }),
        }
    }

    /// Authenticated remote URL with percent-encoded credentials.
    fn remote_url(&self) -> String {
        format!(
            "https://{}:{}@github.com/{}/{}.git",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.token),
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.repository),
        )
    }

    /// Public URL of the master playlist once Pages has published the branch.
    pub fn published_url(&self, package_name: &str) -> String {
        let user = self.username.to_lowercase();
        let user_site = format!("{}.github.io", user);
        if self.repository.to_lowercase() == user_site {
            format!("https://{}/{}/master.m3u8", user_site, package_name)
        } else {
            format!(
                "https://{}/{}/{}/master.m3u8",
                user_site, self.repository, package_name
            )
        }
    }
}

/// Publishes a package by force-pushing it to a GitHub Pages branch.
pub struct GitPagesDeployer {
    settings: GitPagesSettings,
    git_path: PathBuf,
}

impl GitPagesDeployer {
    pub fn new(settings: GitPagesSettings) -> Self {
        Self {
            settings,
            git_path: PathBuf::from("git"),
        }
    }

    /// Uses a specific git binary.
    pub fn with_git_path(mut self, git_path: PathBuf) -> Self {
        self.git_path = git_path;
        self
    }

    /// Removes the token from text that may echo the remote URL.
    fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        let token = &self.settings.token;
        if !token.is_empty() {
            let encoded = urlencoding::encode(token);
            redacted = redacted.replace(token.as_str(), "***").replace(&*encoded, "***");
        }
        if let Ok(re) = Regex::new(r"(https?://[^:/@\s]+:)[^@\s]+@") {
            redacted = re.replace_all(&redacted, "${1}***@").to_string();
        }
        redacted
    }

    /// Runs a git command in the staging repository and returns its stdout.
    async fn git(&self, repo: &Path, args: &[&str]) -> Result<String, DeployError> {
        let command_line = self.redact(&format!("git {}", args.join(" ")));
        debug!("Executing: {}", command_line);

        let output = Command::new(&self.git_path)
            .args(args)
            .current_dir(repo)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DeployError::GitNotFound
                } else {
                    DeployError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = self.redact(String::from_utf8_lossy(&output.stderr).trim());
            return Err(DeployError::command_failed(
                command_line,
                format!("exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Wipes and recreates the staging repository, then copies the package in.
    async fn stage(&self, package_dir: &Path) -> Result<(PathBuf, String), DeployError> {
        let package_dir = tokio::fs::canonicalize(package_dir)
            .await
            .map_err(|_| DeployError::PackageNotFound {
                path: package_dir.to_path_buf(),
            })?;
        let package_name = package_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| DeployError::PackageNotFound {
                path: package_dir.clone(),
            })?;
        let parent = package_dir.parent().unwrap_or(Path::new("/"));
        let staging = parent.join(&self.settings.temp_deploy_dir);

        if tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            info!(
                "Cleaning up old temporary deployment directory: {}",
                staging.display()
            );
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| DeployError::staging(&staging, e))?;
        }
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| DeployError::staging(&staging, e))?;

        let content = staging.join(&package_name);
        info!(
            "Copying HLS content from {} to {}",
            package_dir.display(),
            content.display()
        );
        let copied = copy_tree(&package_dir, &content).await?;
        debug!("Copied {} files into staging", copied);

        // Pages would otherwise run Jekyll and hide underscore-prefixed paths.
        let nojekyll = staging.join(".nojekyll");
        tokio::fs::write(&nojekyll, b"")
            .await
            .map_err(|e| DeployError::staging(&nojekyll, e))?;

        Ok((staging, package_name))
    }
}

/// Recursively copies a directory tree.
async fn copy_tree(source: &Path, destination: &Path) -> Result<u64, DeployError> {
    let mut copied = 0u64;
    let mut pending = vec![(source.to_path_buf(), destination.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to)
            .await
            .map_err(|e| DeployError::staging(&to, e))?;

        let mut entries = tokio::fs::read_dir(&from)
            .await
            .map_err(|e| DeployError::staging(&from, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DeployError::staging(&from, e))?
        {
            let target = to.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| DeployError::staging(entry.path(), e))?;
            if file_type.is_dir() {
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), &target)
                    .await
                    .map_err(|e| DeployError::staging(&target, e))?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

#[async_trait]
impl Deployer for GitPagesDeployer {
    fn name(&self) -> &str {
        "github-pages"
    }

    async fn deploy(&self, package_dir: &Path) -> Result<DeploymentResult, DeployError> {
        let settings = &self.settings;
        info!(
            "Starting deployment to GitHub Pages: {}/{} on branch {}",
            settings.username, settings.repository, settings.branch
        );

        let (repo, package_name) = self.stage(package_dir).await?;
        let remote_url = settings.remote_url();

        self.git(&repo, &["init"]).await?;
        self.git(&repo, &["checkout", "-B", settings.branch.as_str()]).await?;

        let remotes = self.git(&repo, &["remote"]).await?;
        if remotes.lines().any(|r| r.trim() == "origin") {
            self.git(&repo, &["remote", "set-url", "origin", remote_url.as_str()])
                .await?;
        } else {
            self.git(&repo, &["remote", "add", "origin", remote_url.as_str()])
                .await?;
        }

        self.git(&repo, &["add", package_name.as_str(), ".nojekyll"]).await?;

        let status = self.git(&repo, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            info!("No changes to commit. Deployment skipped.");
            return Ok(DeploymentResult {
                deployer: self.name().to_string(),
                changed: false,
                published_url: Some(settings.published_url(&package_name)),
            });
        }

        let author_name = format!("user.name={}", settings.username);
        let author_email = format!(
            "user.email={}@users.noreply.github.com",
            settings.username
        );
        let message = format!("Auto deploy HLS files: {}", package_name);
        self.git(
            &repo,
            &[
                "-c",
                author_name.as_str(),
                "-c",
                author_email.as_str(),
                "commit",
                "-m",
                message.as_str(),
            ],
        )
        .await?;

        info!("Pushing to origin/{}...", settings.branch);
        self.git(&repo, &["push", "--force", "origin", settings.branch.as_str()])
            .await?;

        let url = settings.published_url(&package_name);
        info!("Deployment to GitHub Pages successful: {}", url);
        Ok(DeploymentResult {
            deployer: self.name().to_string(),
            changed: true,
            published_url: Some(url),
        })
    }
}
