//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::agent::router::BackendId;

/// Default catalog database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".tripforge/catalog.db";

/// tripforge: AI trip-planning orchestration engine.
///
/// Gathers hotels, attractions and vehicles from a local catalog through
/// read-only tools and turns them into a day-by-day itinerary.
#[derive(Parser, Debug)]
#[command(name = "tripforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the catalog database file.
    ///
    /// Defaults to `.tripforge/catalog.db` in the current directory.
    #[arg(short, long, env = "TRIPFORGE_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    ///
    /// Defaults to json for `plan` and `tool`, text for everything else.
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the catalog database.
    ///
    /// Creates the schema and loads the demo catalog.
    #[command(after_help = r#"Examples:
  tripforge init                    # Create .tripforge/catalog.db with demo data
  tripforge init --force            # Recreate (destroys existing data)
  tripforge init --no-seed          # Empty schema only
  tripforge --db-path ./trips.db init
"#)]
    Init {
        /// Recreate the database if it already exists.
        #[arg(short, long)]
        force: bool,

        /// Skip loading the demo catalog.
        #[arg(long)]
        no_seed: bool,
    },

    /// Show catalog row counts.
    Status,

    /// Plan a trip and print the itinerary JSON.
    ///
    /// Requires an API key (`OPENAI_API_KEY` or `TRIPFORGE_API_KEY`).
    /// Failures are reported inside the plan (`success: false`), never as
    /// a non-zero exit.
    #[command(after_help = r#"Examples:
  tripforge plan Luxor --start 2026-03-10 --end 2026-03-12
  tripforge plan Aswan --start 2026-05-01 --end 2026-05-04 --travelers 3 \
      --criteria "budget, history, nature"
  tripforge plan Cairo --start 2026-06-01 --end 2026-06-02 --model fast=gpt-4o-mini
"#)]
    Plan {
        /// Destination city.
        destination: String,

        /// First day of the trip (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the trip (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,

        /// Number of travelers.
        #[arg(short, long, default_value = "1")]
        travelers: u32,

        /// Budget tier and interests, comma separated.
        #[arg(short, long, default_value = "")]
        criteria: String,

        /// Directory containing prompt template files.
        #[arg(long, env = "TRIPFORGE_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,

        /// Override a backend model, e.g. `--model smart=gpt-4o`.
        ///
        /// Backends: `default` (fallback), `fast` (formatting), `smart`
        /// (data collection). Repeatable.
        #[arg(long = "model", value_name = "BACKEND=MODEL", value_parser = parse_backend_model)]
        models: Vec<(BackendId, String)>,
    },

    /// Invoke one gateway tool directly and print its JSON envelope.
    #[command(after_help = r#"Examples:
  tripforge tool fetch_hotels '{"destination": "Luxor", "budget": "budget"}'
  tripforge tool query_database '{"sql": "SELECT name, price FROM Hotels"}'
  tripforge tool semantic_search '{"query": "ancient temples"}'
"#)]
    Tool {
        /// Tool name (see `tripforge tool --list`).
        #[arg(required_unless_present = "list")]
        name: Option<String>,

        /// JSON arguments.
        #[arg(default_value = "{}")]
        args: String,

        /// List the available tools.
        #[arg(long)]
        list: bool,
    },

    /// Normalize model JSON read from stdin and write it to stdout.
    ///
    /// Rewrites keys to camelCase and repairs array-shaped `meals`.
    /// Unparseable input is echoed unchanged.
    Normalize,

    /// Write the default prompt templates for customization.
    InitPrompts {
        /// Target directory (defaults to ~/.config/tripforge/prompts/).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Parses a `BACKEND=MODEL` pair.
fn parse_backend_model(s: &str) -> Result<(BackendId, String), String> {
    let (backend, model) = s
        .split_once('=')
        .ok_or_else(|| format!("expected BACKEND=MODEL, got '{s}'"))?;
    let backend = BackendId::parse(backend).map_err(|e| e.to_string())?;
    let model = model.trim();
    if model.is_empty() {
        return Err(format!("missing model name for backend '{backend}'"));
    }
    Ok((backend, model.to_string()))
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}
