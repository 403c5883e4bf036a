use anyhow::Result;
use clap::Parser;
use clap::builder::FalseyValueParser;
use ghcr_prune::commands::{PruneOptions, prune};

/// ghcr-prune - prune temporary container image tags
///
/// Deletes package versions whose tags match TEMP_TAG_REGEX and that are
/// older than RETENTION_DAYS, except manifests referenced by KEEP_TAGS
/// (including every platform manifest of a multi-arch index).
///
/// The credential is read from GITHUB_TOKEN, or GH_TOKEN if unset.
#[derive(Parser, Debug)]
#[command(author, version = env!("GHCR_PRUNE_VERSION"), about)]
struct Cli {
    /// Image source repository in the format "owner/name"
    #[arg(long, env = "REPO", value_name = "OWNER/NAME")]
    repo: String,

    /// Registry namespace owner (user or organization login)
    #[arg(long, env = "OWNER")]
    owner: String,

    /// Whitespace-separated tags whose manifests are never deleted
    #[arg(long, env = "KEEP_TAGS", value_name = "TAGS")]
    keep_tags: String,

    /// Only versions last updated more than this many days ago are deleted
    #[arg(long, env = "RETENTION_DAYS", value_name = "DAYS")]
    retention_days: u32,

    /// Regex identifying temporary tags eligible for deletion
    #[arg(
        long,
        env = "TEMP_TAG_REGEX",
        value_name = "REGEX",
        allow_hyphen_values = true
    )]
    temp_tag_regex: String,

    /// Username for the registry token exchange
    #[arg(long, env = "GITHUB_ACTOR", value_name = "LOGIN")]
    actor: String,

    /// Package name (defaults to the name part of --repo)
    #[arg(long, env = "PACKAGE")]
    package: Option<String>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "GITHUB_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Container registry URL (defaults to https://ghcr.io)
    #[arg(long = "registry-url", env = "REGISTRY_URL", value_name = "URL")]
    registry_url: Option<String>,

    /// Overall per-request timeout in seconds (defaults to none)
    #[arg(
        long = "request-timeout",
        env = "REQUEST_TIMEOUT",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout: Option<u64>,

    /// List deletion candidates without deleting them
    #[arg(long, env = "DRY_RUN", value_parser = FalseyValueParser::new())]
    dry_run: bool,

    /// Verbose logging (credentials are never logged)
    #[arg(long, env = "DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,
}

impl From<Cli> for PruneOptions {
    fn from(cli: Cli) -> Self {
        PruneOptions {
            repo: cli.repo,
            owner: cli.owner,
            keep_tags: cli.keep_tags,
            retention_days: cli.retention_days,
            temp_tag_regex: cli.temp_tag_regex,
            actor: cli.actor,
            package: cli.package,
            api_url: cli.api_url,
            registry_url: cli.registry_url,
            request_timeout_secs: cli.request_timeout,
            dry_run: cli.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = ghcr_prune::runtime::RealRuntime;
    prune(runtime, cli.into()).await?;
    Ok(())
}
