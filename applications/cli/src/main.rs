/// Cadence CLI - content cache administration
use anyhow::Context;
use cadence_cache::ContentCache;
use cadence_cli::{commands, CadenceConfig};
use cadence_core::TrackId;
use cadence_playback::{keys, HttpFetcher};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-cli")]
#[command(about = "Cadence content cache administration", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./cadence.toml when present)
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and maintain the content cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// List all entries
    List,
    /// Print the local path of a committed entry
    Path {
        /// Logical id, or a track id with --track
        id: String,
        /// Treat the id as a track id and resolve its audio entry
        #[arg(long)]
        track: bool,
        /// With --track, resolve the cover entry instead
        #[arg(long, requires = "track")]
        cover: bool,
    },
    /// Download a URL into the cache
    Fetch {
        /// Logical id to store under
        id: String,
        /// Source URL
        url: String,
    },
    /// Remove an entry and its file
    Remove {
        /// Logical id
        id: String,
    },
    /// Remove uncommitted leftovers of interrupted downloads
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config =
        CadenceConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Config => {
            serde_json::to_writer_pretty(&mut out, &config)?;
            writeln!(out)?;
        }
        Commands::Cache { command } => {
            let cache = Arc::new(ContentCache::open(&config.cache.dir).with_context(|| {
                format!("Failed to open cache at {}", config.cache.dir.display())
            })?);
            let source = config.playback_config().source;

            match command {
                CacheCommand::List => commands::list(&cache, &mut out)?,
                CacheCommand::Path { id, track, cover } => {
                    let logical_id = match (track, cover) {
                        (true, true) => keys::cover_key(&source, &TrackId::new(id)),
                        (true, false) => keys::audio_key(&source, &TrackId::new(id)),
                        _ => id,
                    };
                    commands::path(&cache, &logical_id, &mut out)?;
                }
                CacheCommand::Fetch { id, url } => {
                    commands::fetch(&cache, &HttpFetcher::new(), &id, &url, &mut out).await?;
                }
                CacheCommand::Remove { id } => commands::remove(&cache, &id, &mut out)?,
                CacheCommand::Purge => commands::purge(&cache, &mut out)?,
            }
        }
    }

    Ok(())
}
