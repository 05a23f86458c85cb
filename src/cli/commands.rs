//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Every command returns
//! its output as a string; `main` writes it to stdout.

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::agent::config::AgentConfig;
use crate::agent::executor::ToolExecutor;
use crate::agent::normalizer::normalize;
use crate::agent::planner::TripPlanner;
use crate::agent::prompt::PromptSet;
use crate::agent::router::BackendId;
use crate::agent::tool::ToolSet;
use crate::cli::output::{
    OutputFormat, format_envelope, format_plan, format_status, format_tool_list,
};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result, StorageError};
use crate::storage::SqliteCatalog;
use crate::tools::{GatewayConfig, ToolGateway};

/// Parameters for the plan command.
#[derive(Debug, Clone)]
pub struct PlanParams<'a> {
    /// Destination city.
    pub destination: &'a str,
    /// First day.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    /// Party size.
    pub travelers: u32,
    /// Free-text budget tier and interests.
    pub criteria: &'a str,
    /// Prompt template directory.
    pub prompt_dir: Option<&'a Path>,
    /// Per-backend model overrides.
    pub models: &'a [(BackendId, String)],
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format_for = |default: OutputFormat| {
        cli.format
            .as_deref()
            .map_or(default, OutputFormat::parse)
    };
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force, no_seed } => {
            cmd_init(&db_path, *force, *no_seed, format_for(OutputFormat::Text))
        }
        Commands::Status => cmd_status(&db_path, format_for(OutputFormat::Text)),
        Commands::Plan {
            destination,
            start,
            end,
            travelers,
            criteria,
            prompt_dir,
            models,
        } => {
            let params = PlanParams {
                destination,
                start: *start,
                end: *end,
                travelers: *travelers,
                criteria,
                prompt_dir: prompt_dir.as_deref(),
                models,
            };
            cmd_plan(&db_path, &params, format_for(OutputFormat::Json))
        }
        Commands::Tool { name, args, list } => {
            let format = format_for(OutputFormat::Json);
            match name.as_deref() {
                Some(name) if !*list => cmd_tool(&db_path, name, args, format),
                _ => Ok(format_tool_list(
                    ToolSet::gateway_tools().definitions(),
                    format,
                )),
            }
        }
        Commands::Normalize => cmd_normalize(),
        Commands::InitPrompts { dir } => {
            cmd_init_prompts(dir.as_deref(), format_for(OutputFormat::Text))
        }
    }
}

/// Opens the catalog and ensures it's initialized.
fn open_catalog(db_path: &Path) -> Result<SqliteCatalog> {
    let catalog = SqliteCatalog::open(db_path)?;

    if !catalog.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(catalog)
}

fn open_gateway(db_path: &Path) -> Result<ToolGateway> {
    let catalog = open_catalog(db_path)?;
    Ok(ToolGateway::new(Arc::new(catalog), GatewayConfig::default()))
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, no_seed: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let catalog = SqliteCatalog::open(db_path)?;
    catalog.init()?;
    if !no_seed {
        catalog.seed_demo()?;
    }
    let counts = catalog.counts()?;

    match format {
        OutputFormat::Text => {
            let mut out = format!("Initialized catalog at: {}\n", db_path.display());
            if no_seed {
                out.push_str("Schema only; no demo data loaded.\n");
            } else {
                let total: i64 = counts.iter().map(|(_, n)| n).sum();
                out.push_str(&format!("Loaded {total} demo catalog entries.\n"));
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "success": true,
                "path": db_path.to_string_lossy(),
                "force": force,
                "seeded": !no_seed,
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let catalog = open_catalog(db_path)?;
    let counts = catalog.counts()?;
    Ok(format_status(db_path, &counts, format))
}

fn cmd_plan(db_path: &Path, params: &PlanParams<'_>, format: OutputFormat) -> Result<String> {
    let gateway = Arc::new(open_gateway(db_path)?);

    let mut builder = AgentConfig::builder().from_env();
    for (backend, model) in params.models {
        builder = builder.model(*backend, model.as_str());
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let planner = TripPlanner::from_config(&config, gateway).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let plan = rt.block_on(planner.generate_trip_plan(
        params.destination,
        params.start,
        params.end,
        params.travelers,
        params.criteria,
    ));

    Ok(format_plan(&plan, format))
}

fn cmd_tool(db_path: &Path, name: &str, args: &str, format: OutputFormat) -> Result<String> {
    let gateway = open_gateway(db_path)?;
    let executor = ToolExecutor::new(&gateway);
    let envelope = executor.dispatch(name, args)?;
    Ok(format_envelope(&envelope, format))
}

fn cmd_normalize() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let mut out = normalize(&input);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str(&format!(
                    "  {}\n",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                ));
            }
            output.push_str("\nEdit these files to customize the planner's system prompts.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect::<Vec<_>>(),
            });
            Ok(format.to_json(&json))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(args).unwrap_or_else(|e| unreachable!("{e}"));
        execute(&cli)
    }

    fn init_db(dir: &TempDir) -> String {
        let db = dir.path().join("catalog.db").to_string_lossy().to_string();
        run(&["tripforge", "--db-path", &db, "init"]).unwrap_or_else(|e| unreachable!("{e}"));
        db
    }

    #[test]
    fn test_init_twice_requires_force() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = init_db(&dir);
        assert!(run(&["tripforge", "--db-path", &db, "init"]).is_err());
        let out = run(&["tripforge", "--db-path", &db, "init", "--force", "--no-seed"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(out.contains("Schema only"));
    }

    #[test]
    fn test_status_counts() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = init_db(&dir);
        let out = run(&["tripforge", "--db-path", &db, "--format", "json", "status"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        let json: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert!(json["counts"]["hotels"].as_i64().is_some_and(|n| n > 0));
    }

    #[test]
    fn test_tool_fetch_hotels() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = init_db(&dir);
        let out = run(&[
            "tripforge",
            "--db-path",
            &db,
            "tool",
            "fetch_hotels",
            r#"{"destination": "Luxor"}"#,
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        let json: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_tool_refuses_mutation() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = init_db(&dir);
        let out = run(&[
            "tripforge",
            "--db-path",
            &db,
            "tool",
            "query_database",
            r#"{"sql": "DROP TABLE Hotels"}"#,
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        let json: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_unknown_tool_is_error() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = init_db(&dir);
        assert!(run(&["tripforge", "--db-path", &db, "tool", "book_hotel"]).is_err());
    }

    #[test]
    fn test_uninitialized_catalog() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("missing.db").to_string_lossy().to_string();
        assert!(run(&["tripforge", "--db-path", &db, "status"]).is_err());
    }

    #[test]
    fn test_init_prompts_writes_once() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let target = dir.path().join("prompts").to_string_lossy().to_string();
        let first = run(&["tripforge", "init-prompts", "--dir", &target])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(first.contains("Wrote 2 prompt template(s)"));
        let second = run(&["tripforge", "init-prompts", "--dir", &target])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(second.contains("already exist"));
    }
}
