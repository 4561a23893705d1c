//! Trait definitions for the deploy module.

use async_trait::async_trait;
use std::path::Path;

use super::error::DeployError;
use super::types::DeploymentResult;

/// Publishes a finished package directory somewhere.
///
/// The package is an opaque tree of files rooted at `package_dir`; it
/// contains `master.m3u8` and one subdirectory per built rendition.
/// Implementations own their own concurrency and retry policy.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Returns the name of this deployer implementation.
    fn name(&self) -> &str;

    /// Publishes the package.
    async fn deploy(&self, package_dir: &Path) -> Result<DeploymentResult, DeployError>;
}
