//! Types for the deploy module.

use serde::{Deserialize, Serialize};

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResult {
    /// Name of the deployer that ran.
    pub deployer: String,
    /// False when the target already had identical content.
    pub changed: bool,
    /// Public URL of the master playlist, when known.
    pub published_url: Option<String>,
}
