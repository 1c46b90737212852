use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use lyrics_index::config::Config;
use lyrics_index::LyricsLibrary;

#[derive(Debug, Parser)]
#[command(name = "lyrics-index", version, about = "Search a lyrics corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank songs by keyword relevance
    Search {
        query: String,
        /// Maximum number of results (defaults to SEARCH_MAX_RESULTS)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Include relevance scores and matched terms
        #[arg(long)]
        scored: bool,
    },
    /// Show one song by id
    Song { id: String },
    /// List all artists
    Artists,
    /// List all albums
    Albums,
    /// Show collection statistics
    Stats,
    /// Suggest titles close to an imprecise query
    Suggest { query: String },
    /// Rebuild the collection from the source directory
    Regenerate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lyrics_index=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    debug!("{}", config.summary());

    let library = LyricsLibrary::from_config(&config);
    let cleanup = library.cache().spawn_cleanup_task(config.cache_ttl);

    match cli.command {
        Command::Search {
            query,
            limit,
            scored,
        } => {
            let limit = limit.unwrap_or(config.search_max_results);
            if scored {
                print_json(&library.search_scored(&query, limit).await?)?;
            } else {
                print_json(&library.search(&query, limit).await?)?;
            }
        }
        Command::Song { id } => print_json(&library.song(&id).await?)?,
        Command::Artists => print_json(&library.artists().await?)?,
        Command::Albums => print_json(&library.albums().await?)?,
        Command::Stats => {
            let stats = library.stats().await?;
            info!("{}", stats);
            print_json(&stats)?;
        }
        Command::Suggest { query } => print_json(&library.suggest_titles(&query).await?)?,
        Command::Regenerate => {
            let collection = library.regenerate().await?;
            print_json(&lyrics_index::library::collection_stats(&collection))?;
        }
    }

    cleanup.abort();
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
