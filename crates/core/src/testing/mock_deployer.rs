//! Mock deployer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::deploy::{DeployError, Deployer, DeploymentResult};

/// Mock implementation of the Deployer trait.
///
/// Records every package directory it is handed and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockDeployer {
    /// Package directories handed to `deploy`.
    deployments: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next deployment fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl MockDeployer {
    /// Create a new mock deployer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded deployments.
    pub async fn recorded_deployments(&self) -> Vec<PathBuf> {
        self.deployments.read().await.clone()
    }

    /// Configure the next deployment to fail.
    pub async fn set_next_error(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }
}

#[async_trait]
impl Deployer for MockDeployer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn deploy(&self, package_dir: &Path) -> Result<DeploymentResult, DeployError> {
        self.deployments
            .write()
            .await
            .push(package_dir.to_path_buf());

        if let Some(message) = self.next_error.write().await.take() {
            return Err(DeployError::command_failed("mock", message, None));
        }

        Ok(DeploymentResult {
            deployer: "mock".to_string(),
            changed: true,
            published_url: Some(format!(
                "https://example.invalid/{}/master.m3u8",
                package_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_fails_once() {
        let deployer = MockDeployer::new();
        deployer.set_next_error("boom").await;

        assert!(deployer.deploy(Path::new("/out/movie")).await.is_err());
        let result = deployer.deploy(Path::new("/out/movie")).await.unwrap();
        assert_eq!(
            result.published_url.as_deref(),
            Some("https://example.invalid/movie/master.m3u8")
        );
        assert_eq!(deployer.recorded_deployments().await.len(), 2);
    }
}
