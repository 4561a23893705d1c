//! hlspack - package a video file as adaptive-bitrate HLS
//!
//! Probes the source, builds one HLS rendition per selected quality plus
//! every audio and subtitle track, writes `master.m3u8`, and optionally
//! publishes the result to GitHub Pages.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hlspack_core::{
    default_config_path, load_config, validate_config, DeploymentOutcome, Deployer, Encoder,
    FfmpegEncoder, GitPagesCredentials, GitPagesDeployer, GitPagesSettings, PackageOrchestrator,
    PackageRequest, QualityRequest,
};

/// Exit code after Ctrl-C, as a shell would report SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Convert a video into a multi-bitrate HLS package
#[derive(Debug, Parser)]
#[command(name = "hlspack")]
#[command(version)]
#[command(about = "Package a video as adaptive-bitrate HLS", long_about = None)]
struct Cli {
    /// Source video file
    input: PathBuf,

    /// Output directory for the HLS package
    output: PathBuf,

    /// Comma-separated qualities to build (e.g. "480p,720p"), or "all"
    #[arg(short = 'q', long = "video-qualities")]
    video_qualities: Option<String>,

    /// HLS segment duration in seconds
    #[arg(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    segment_duration: Option<u32>,

    /// x264 encoding preset
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Skip thumbnail generation
    #[arg(long)]
    no_thumbnail: bool,

    /// Thumbnail seek position (HH:MM:SS)
    #[arg(long)]
    thumbnail_time: Option<String>,

    /// Publish the package to GitHub Pages
    #[arg(long)]
    deploy: bool,

    /// GitHub username
    #[arg(long, env = "GITHUB_USERNAME")]
    gh_user: Option<String>,

    /// GitHub repository name
    #[arg(long, env = "GITHUB_REPO")]
    gh_repo: Option<String>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    gh_token: Option<String>,

    /// Branch to publish to
    #[arg(long, env = "GITHUB_BRANCH")]
    gh_branch: Option<String>,

    /// Configuration file (default: $HLSPACK_CONFIG or ./hlspack.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Cli {
    fn package_request(&self) -> PackageRequest {
        PackageRequest {
            input: self.input.clone(),
            output_dir: self.output.clone(),
            qualities: QualityRequest::parse(self.video_qualities.as_deref()),
            segment_duration_secs: self.segment_duration,
            preset: self.preset.clone(),
            generate_thumbnail: !self.no_thumbnail,
            thumbnail_time: self.thumbnail_time.clone(),
            deploy: self.deploy,
        }
    }

    fn credentials(&self) -> GitPagesCredentials {
        GitPagesCredentials {
            username: self.gh_user.clone(),
            repository: self.gh_repo.clone(),
            token: self.gh_token.clone(),
            branch: self.gh_branch.clone(),
        }
    }
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let (text, json) = match format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let encoder = Arc::new(FfmpegEncoder::new(config.encoder.clone()));
    encoder
        .validate()
        .await
        .context("FFmpeg is not available")?;
    info!("Using encoder: {}", encoder.name());

    let deployer = (cli.deploy && config.deployment.github.enabled).then(|| {
        GitPagesSettings::resolve(cli.credentials(), &config.deployment.github)
            .map(|settings| Arc::new(GitPagesDeployer::new(settings)) as Arc<dyn Deployer>)
    });

    let request = cli.package_request();
    let mut orchestrator = PackageOrchestrator::new(encoder, config);
    match deployer {
        Some(Ok(deployer)) => orchestrator = orchestrator.with_deployer(deployer),
        Some(Err(e)) => orchestrator = orchestrator.with_deployer_unavailable(e.to_string()),
        None => {}
    }

    let result = tokio::select! {
        result = orchestrator.run(&request) => result,
        _ = signal::ctrl_c() => {
            warn!("Interrupted, stopping encoder processes");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("packaging failed during {}: {}", e.stage(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("Master playlist: {}", report.master_playlist.display());
    println!(
        "Renditions: {} video, {} audio, {} subtitles",
        report.video.len(),
        report.audio.len(),
        report.subtitles.len()
    );
    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.label, skipped.reason);
    }
    if let Some(thumbnail) = &report.thumbnail {
        println!("Thumbnail: {}", thumbnail.display());
    }
    match &report.deployment {
        Some(DeploymentOutcome::Deployed(result)) => {
            if let Some(url) = &result.published_url {
                println!("Published: {}", url);
            }
        }
        Some(DeploymentOutcome::Skipped { reason }) => println!("Deployment skipped: {}", reason),
        Some(DeploymentOutcome::Failed { reason }) => println!("Deployment failed: {}", reason),
        None => {}
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::try_parse_from(["hlspack", "movie.mkv", "out/movie"]).unwrap();
        let request = cli.package_request();
        assert_eq!(request.input, PathBuf::from("movie.mkv"));
        assert_eq!(request.output_dir, PathBuf::from("out/movie"));
        assert_eq!(request.qualities, QualityRequest::All);
        assert!(request.generate_thumbnail);
        assert!(!request.deploy);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_args() {
        let cli = Cli::try_parse_from([
            "hlspack",
            "movie.mkv",
            "out",
            "-q",
            "480p,720p",
            "-s",
            "4",
            "-p",
            "fast",
            "--no-thumbnail",
            "--deploy",
            "--gh-user",
            "octocat",
            "--gh-branch",
            "gh-pages",
            "--log-format",
            "json",
        ])
        .unwrap();

        let request = cli.package_request();
        assert_eq!(
            request.qualities,
            QualityRequest::Named(vec!["480p".to_string(), "720p".to_string()])
        );
        assert_eq!(request.segment_duration_secs, Some(4));
        assert_eq!(request.preset.as_deref(), Some("fast"));
        assert!(!request.generate_thumbnail);
        assert!(request.deploy);
        assert_eq!(cli.log_format, LogFormat::Json);

        let credentials = cli.credentials();
        assert_eq!(credentials.username.as_deref(), Some("octocat"));
        assert_eq!(credentials.branch.as_deref(), Some("gh-pages"));
    }

    #[test]
    fn test_zero_segment_duration_is_rejected() {
        assert!(Cli::try_parse_from(["hlspack", "movie.mkv", "out", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["hlspack", "movie.mkv", "out", "-s", "1"]).is_ok());
    }

    #[test]
    fn test_missing_output_is_rejected() {
        assert!(Cli::try_parse_from(["hlspack", "movie.mkv"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
