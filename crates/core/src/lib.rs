pub mod builder;
pub mod config;
pub mod deploy;
pub mod encoder;
pub mod inventory;
pub mod manifest;
pub mod package;
pub mod planner;
pub mod quality;
pub mod testing;

pub use config::{
    default_config_path, load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use deploy::{Deployer, DeploymentResult, GitPagesCredentials, GitPagesDeployer, GitPagesSettings};
pub use encoder::{Encoder, EncoderConfig, FfmpegEncoder};
pub use package::{
    DeploymentOutcome, PackageError, PackageOrchestrator, PackageReport, PackageRequest,
    PackageStage, PackageState,
};
pub use planner::QualityRequest;
