//! rustmultischolar - multi-platform CS literature aggregator
//!
//! ## Usage
//!
//! ### Search all platforms
//! ```bash
//! rustmultischolar search "dark patterns" "deceptive design" --max-results 15 --combine
//! ```
//!
//! ### Combine existing platform files
//! ```bash
//! rustmultischolar combine --input ./results --csv ./results/combined.csv
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustmultischolar::pipeline::{
    run_combine, run_search, CombineConfig, SearchConfig, COMBINED_FILE_NAME, DEFAULT_OUTPUT_DIR,
};
use rustmultischolar::sources::SearchOptions;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Multi-platform CS literature aggregator
#[derive(Parser)]
#[command(name = "rustmultischolar")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every platform and write one catalog per platform
    Search {
        /// Search keywords
        #[arg(default_values_t = default_keywords())]
        keywords: Vec<String>,

        /// Articles requested per platform per keyword
        #[arg(long, default_value = "15")]
        max_results: usize,

        /// arXiv category for category-restricted queries
        #[arg(long, default_value = "cs.HC")]
        arxiv_category: String,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Combine the platform files when the search finishes
        #[arg(long)]
        combine: bool,
    },

    /// Merge platform catalogs into one deduplicated catalog
    Combine {
        /// Directory holding the platform catalogs
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        input: PathBuf,

        /// Combined catalog path (default: <input>/combined_all_platforms.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export the merged records as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn default_keywords() -> Vec<String> {
    [
        "dark patterns",
        "deceptive design",
        "user interface manipulation",
        "persuasive design ethics",
        "malicious interface design",
        "cookie consent manipulation",
        "subscription cancellation UX",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.log_json {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    match cli.command {
        Commands::Search {
            keywords,
            max_results,
            arxiv_category,
            output,
            combine,
        } => {
            let config = SearchConfig {
                keywords,
                output_dir: output.clone(),
                options: SearchOptions {
                    max_results,
                    arxiv_category,
                },
                ..Default::default()
            };
            let written = run_search(&config).await.context("Search failed")?;
            for path in &written {
                println!("Saved: {}", path.display());
            }

            if combine {
                combine_catalogs(output, None, None)?;
            }
            Ok(())
        }
        Commands::Combine { input, output, csv } => combine_catalogs(input, output, csv),
    }
}

// ============================================================================
// Combine
// ============================================================================

fn combine_catalogs(input: PathBuf, output: Option<PathBuf>, csv: Option<PathBuf>) -> Result<()> {
    let output_file = output.unwrap_or_else(|| input.join(COMBINED_FILE_NAME));
    let config = CombineConfig {
        input_dir: input,
        output_file,
        csv,
    };

    match run_combine(&config).context("Combine failed")? {
        Some(summary) => {
            info!(
                files = summary.files_processed,
                before = summary.records_before,
                unique = summary.unique_records,
                "Combine complete"
            );
            println!("Combined file saved: {}", summary.output_file.display());
            println!("Total unique articles: {}", summary.unique_records);
            println!("Keywords: {}", summary.keywords);
        }
        None => warn!("Nothing to combine"),
    }
    Ok(())
}
