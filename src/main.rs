//! # Exercise Catalog CLI (`exercise-catalog`)
//!
//! Serves the exercise catalog over HTTP, or queries it directly from the
//! command line.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `exercise-catalog serve` | Start the HTTP server |
//! | `exercise-catalog search "<query>"` | Fuzzy search by name, one page |
//! | `exercise-catalog get <id>` | Print one record as JSON |
//! | `exercise-catalog random` | Print randomly sampled records |
//! | `exercise-catalog recommend` | Filter by equipment and primary muscle |
//!
//! ## Examples
//!
//! ```bash
//! exercise-catalog serve --config ./config/catalog.toml
//! exercise-catalog search "bench press" --page 2
//! exercise-catalog get Barbell_Curl
//! exercise-catalog recommend --equipment barbell --muscle chest
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use exercise_catalog::{config, logging, lookup, search, server};

#[derive(Parser)]
#[command(
    name = "exercise-catalog",
    about = "Exercise catalog: cached dataset with fuzzy search over HTTP",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used. `PORT` and
    /// `EXERCISE_CATALOG_URL` override the file either way.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` (or `0.0.0.0:$PORT`) and serves
    /// `/exercise/{id}`, `/search`, `/random`, `/recommendations` and
    /// `/health`.
    Serve,

    /// Fuzzy search exercise names.
    Search {
        /// The search query string.
        query: String,

        /// Page number (1-based). Invalid values fall back to 1.
        #[arg(long, allow_hyphen_values = true)]
        page: Option<String>,
    },

    /// Print a single exercise by id.
    Get {
        /// Exercise id (e.g. `Barbell_Curl`).
        id: String,
    },

    /// Print randomly sampled exercises (with replacement).
    Random {
        #[arg(long, default_value_t = lookup::RANDOM_COUNT)]
        count: usize,
    },

    /// Recommend exercises for an equipment and primary muscle.
    Recommend {
        #[arg(long)]
        equipment: String,

        #[arg(long)]
        muscle: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    let cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query, page } => {
            search::run_search(&cfg, &query, page.as_deref()).await?;
        }
        Commands::Get { id } => {
            lookup::run_get(&cfg, &id).await?;
        }
        Commands::Random { count } => {
            lookup::run_random(&cfg, count).await?;
        }
        Commands::Recommend { equipment, muscle } => {
            lookup::run_recommend(&cfg, &equipment, &muscle).await?;
        }
    }

    Ok(())
}
