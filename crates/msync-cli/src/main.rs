//! `msync` — thin process wiring for the two peer roles. Argument parsing
//! and connection setup only; all protocol and sync logic lives in the
//! library crates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use msync_config::logging::{init_logging, LogLevel};
use msync_model::TextCache;
use msync_proto::Client;
use msync_transport::{DuplexPipe, LocalConnection};
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "msync")]
#[command(version, about = "One-way text-file sync over a byte stream", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch `base_dir` and push deltas to a target, spawned as a child
    /// process talking over its own stdio (e.g. `ssh host msync target /dir`).
    Source {
        /// Directory to watch and sync from.
        base_dir: PathBuf,

        /// Program (and its arguments) that runs the target peer.
        #[arg(trailing_var_arg = true, required = true)]
        target: Vec<String>,
    },

    /// Serve the target role over this process's own stdin/stdout.
    Target {
        /// Directory to sync into.
        base_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LogLevel::Info);

    let cli = Cli::parse();
    match cli.command {
        Commands::Source { base_dir, target } => run_source(base_dir, target).await,
        Commands::Target { base_dir } => run_target(base_dir).await,
    }
}

async fn run_source(base_dir: PathBuf, target: Vec<String>) -> Result<()> {
    let base_dir = base_dir.canonicalize().with_context(|| format!("{base_dir:?} does not exist"))?;
    let policy = msync_config::config().ignore_policy().context("building ignore policy")?;
    let commit_delay = msync_config::config().commit_delay();

    let (program, args) = target.split_first().expect("clap requires at least one target argument");
    let LocalConnection { pipe, mut child } =
        LocalConnection::spawn(program, args, &base_dir).context("spawning target process")?;

    tracing::info!(base_dir = %base_dir.display(), target = %program, "starting source");

    let mut cache = msync_source::build_initial_cache(&base_dir, &policy)
        .with_context(|| format!("building initial cache from {base_dir:?}"))?;
    let mut client = Client::new(pipe);

    msync_reconcile::reconcile(&base_dir, &mut cache, &mut client)
        .await
        .context("startup reconciliation failed")?;

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = stop_tx.send(());
    });

    let result = msync_source::run(base_dir, policy, cache, client, commit_delay, stop_rx).await;
    let _ = child.wait().await;
    result.context("source loop exited with an error")
}

async fn run_target(base_dir: PathBuf) -> Result<()> {
    let base_dir = base_dir.canonicalize().with_context(|| format!("{base_dir:?} does not exist"))?;
    let policy = msync_config::config().ignore_policy().context("building ignore policy")?;

    tracing::info!(base_dir = %base_dir.display(), "starting target");

    let cache: TextCache = msync_target::build_initial_cache(&base_dir, &policy)
        .with_context(|| format!("building initial cache from {base_dir:?}"))?;
    let handler = msync_target::TargetHandler::new(base_dir, cache);

    let pipe = DuplexPipe::new(tokio::io::stdin(), tokio::io::stdout());
    msync_target::serve(pipe, handler).await.context("target serve loop exited with an error")
}
