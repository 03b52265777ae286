use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_cherry_pick::cherry_pick::{CherryPickOptions, CherryPicker, TracingEventSink};
use github_cherry_pick::github::OctocrabClient;
use github_cherry_pick::types::{RefName, RepoId, Sha};

/// Cherry-pick commits onto a GitHub branch, atomically, without a local clone.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// GitHub token with contents:write on the repository.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Repository as owner/name.
    #[arg(long, env = "GITHUB_REPOSITORY", value_parser = parse_repo)]
    repo: RepoId,

    /// Branch to append the cherry-picked commits to.
    #[arg(long)]
    target: String,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Commits to cherry-pick, applied in the order given.
    #[arg(required = true, value_parser = parse_sha)]
    commits: Vec<Sha>,
}

fn parse_repo(s: &str) -> Result<RepoId, String> {
    RepoId::parse(s).ok_or_else(|| format!("expected owner/name, got {:?}", s))
}

fn parse_sha(s: &str) -> Result<Sha, String> {
    Sha::parse(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_cherry_pick=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let client = OctocrabClient::from_token(args.token, args.repo.clone())
        .context("failed to build GitHub client")?;
    let options = CherryPickOptions::new(RefName::new(&args.target), args.commits);

    tracing::info!(
        repo = %args.repo,
        target = %options.target,
        commits = options.commits.len(),
        "cherry-picking"
    );

    let picker = CherryPicker::new(client).with_event_sink(TracingEventSink);
    let new_head = picker
        .cherry_pick(&options)
        .await
        .with_context(|| format!("cherry-pick onto {} failed", options.target))?;

    if args.json {
        println!("{}", serde_json::json!({ "sha": new_head }));
    } else {
        println!("{}", new_head);
    }
    Ok(())
}
