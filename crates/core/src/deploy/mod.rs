//! Deployment of finished packages.
//!
//! The orchestrator hands a finished package directory to a [`Deployer`].
//! [`GitPagesDeployer`] publishes it to a GitHub Pages branch; other
//! targets, such as a bulk object-storage upload, plug in by implementing
//! the same trait.

mod error;
mod github_pages;
mod traits;
mod types;

pub use error::DeployError;
pub use github_pages::{GitPagesCredentials, GitPagesDeployer, GitPagesSettings};
pub use traits::Deployer;
pub use types::DeploymentResult;
