//! Package orchestrator.
//!
//! Runs the packaging pipeline for one source file:
//! probe the source, plan renditions, build video, audio and subtitle
//! renditions stage by stage, then write the master playlist. A thumbnail
//! and a deployment may follow a successful run; neither can fail it.

mod error;
mod runner;
mod types;

pub use error::PackageError;
pub use runner::PackageOrchestrator;
pub use types::{DeploymentOutcome, PackageReport, PackageRequest, PackageStage, PackageState};
