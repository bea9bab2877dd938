use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use bundle_updater::config::{UpdaterConfig, log_path};
use bundle_updater::logging::init_logging;
use bundle_updater::manifest::Manifest;
use bundle_updater::update::{check_bundles, update_bundles};
use bundle_updater::version::fetchers::HttpFetcher;

#[derive(Parser)]
#[command(name = "bundle-updater")]
#[command(version, about = "Checks vendored bundles for upstream updates")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file (default location when no path is given)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download newer bundles and rewrite the manifest
    Update(RunArgs),
    /// Report outdated bundles without writing anything
    Check(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to the project manifest
    #[arg(long, short)]
    manifest: PathBuf,

    /// Number of leading lines scanned for a version
    #[arg(long)]
    lines: Option<usize>,

    /// HTTP request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

fn load_config(path: Option<&Path>, args: &RunArgs) -> anyhow::Result<UpdaterConfig> {
    let mut config = match path {
        Some(path) => UpdaterConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => UpdaterConfig::default(),
    };
    if let Some(lines) = args.lines {
        config.lines = lines;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    Ok(config)
}

async fn run(command: Command, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (args, check_only) = match command {
        Command::Update(args) => (args, false),
        Command::Check(args) => (args, true),
    };

    let config = load_config(config_path.as_deref(), &args)?;
    let fetcher = HttpFetcher::new(&config, args.github_token.clone())
        .context("Invalid version pattern in config")?;
    let stagger = Duration::from_millis(config.stagger_delay_ms);
    let mut manifest = Manifest::load(&args.manifest)?;

    let report = if check_only {
        check_bundles(&manifest, &fetcher, stagger).await
    } else {
        update_bundles(&mut manifest, &fetcher, stagger).await
    };

    for (key, outcome) in report.outcomes() {
        println!("{}: {}", key, outcome);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.map(|path| path.unwrap_or_else(log_path));
    let _guard = init_logging(log_file.as_deref(), cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, cli.config))
}
