mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cstats_core::{
    ConversationContext, DescriptionTable, PipelineConfig, StatsEngine, TurnInput, process_turn,
    stats_block,
};
use cstats_store::{Config, import_toml, load_table};
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(name = "cstats", about = "Character stats engine CLI and MCP server")]
struct Cli {
    /// Config file (defaults to $CSTATS_CONFIG, then ~/.character-stats/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Physical-description table (.toml or SQLite); overrides the config
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Print the stats block for the configured character
    Stats {
        /// Print derived stats as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Run one first-turn message through the pipeline
    Turn {
        /// Message text, control tokens included
        text: String,

        /// Separate text for the visible transcript copy
        #[arg(long)]
        visible: Option<String>,

        /// Print the full turn result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a transcript: blank-line-separated paragraphs are turns
    Replay {
        /// Transcript file
        path: PathBuf,
    },

    /// Inspect or convert description tables
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },
}

#[derive(Subcommand)]
enum TableCommands {
    /// Validate every template in a table
    Check {
        /// Table file (.toml or SQLite)
        path: PathBuf,
    },

    /// Copy a TOML table into a SQLite database
    Import {
        /// Source TOML file
        toml: PathBuf,
        /// Destination SQLite file
        db: PathBuf,
    },
}

/// Everything a pipeline run needs, loaded once at startup.
pub struct Runtime {
    pub engine: StatsEngine,
    pub table: DescriptionTable,
    pub pipeline: PipelineConfig,
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn load_runtime(cli: &Cli) -> Result<Runtime> {
    let config_path = cli.config.clone().or_else(|| env_path("CSTATS_CONFIG"));
    let config = Config::discover(config_path.as_deref()).context("failed to load config")?;

    let engine = config.engine().context("invalid [character] settings")?;
    let pipeline = config
        .pipeline_config()
        .context("invalid celebration date")?;

    let table_path = cli
        .table
        .clone()
        .or_else(|| env_path("CSTATS_TABLE"))
        .or_else(|| config.table.clone());
    let table = match table_path {
        Some(path) => load_table(&path)
            .with_context(|| format!("failed to load description table {}", path.display()))?,
        None => {
            tracing::debug!("no description table configured");
            DescriptionTable::new()
        }
    };

    Ok(Runtime {
        engine,
        table,
        pipeline,
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("info,cstats=debug,cstats_core=debug,cstats_store=debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Stats { json } => cmd_stats(&cli, *json),
        Commands::Turn {
            text,
            visible,
            json,
        } => cmd_turn(&cli, text, visible.as_deref(), *json),
        Commands::Replay { path } => cmd_replay(&cli, path),
        Commands::Table { command } => match command {
            TableCommands::Check { path } => cmd_table_check(path),
            TableCommands::Import { toml, db } => cmd_table_import(toml, db),
        },
    }
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let runtime = load_runtime(cli)?;
    tracing::info!(
        "starting MCP server for '{}' ({} description rows)",
        runtime.engine.record().name(),
        runtime.table.len()
    );

    let server = server::CsServer::new(runtime);
    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;

    tokio::select! {
        result = service.waiting() => {
            result.context("MCP server task failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }
    Ok(())
}

fn cmd_stats(cli: &Cli, json: bool) -> Result<()> {
    let runtime = load_runtime(cli)?;
    let record = runtime.engine.record();
    if json {
        let stats = server::stats_json(record);
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats_block(record));
    }
    Ok(())
}

fn cmd_turn(cli: &Cli, text: &str, visible: Option<&str>, json: bool) -> Result<()> {
    let Runtime {
        mut engine,
        table,
        pipeline,
    } = load_runtime(cli)?;
    let mut context = ConversationContext::default();

    let input = TurnInput {
        text,
        visible_text: visible.unwrap_or(text),
    };
    let output = process_turn(&mut engine, &table, &mut context, &pipeline, input);

    if json {
        let value = serde_json::json!({
            "turn": output,
            "stats": server::stats_json(engine.record()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", output.text);
        println!("---");
        println!("{}", output.visible_text);
    }
    Ok(())
}

/// Split a transcript into turns at blank lines.
fn split_turns(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|turn| !turn.is_empty())
        .map(str::to_string)
        .collect()
}

fn cmd_replay(cli: &Cli, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let Runtime {
        mut engine,
        table,
        pipeline,
    } = load_runtime(cli)?;
    let mut context = ConversationContext::default();

    let turns = split_turns(&content);
    for (i, turn) in turns.iter().enumerate() {
        let output = process_turn(
            &mut engine,
            &table,
            &mut context,
            &pipeline,
            TurnInput::new(turn),
        );
        println!("=== turn {} ===", i + 1);
        println!("{}", output.text);
        println!();
    }

    let record = engine.record();
    println!(
        "done. turns={}, date={}, weight={} lbs, bmi={}",
        turns.len(),
        record.formatted_date(),
        record.weight(),
        record.bmi()
    );
    Ok(())
}

fn cmd_table_check(path: &Path) -> Result<()> {
    let table = load_table(path).with_context(|| format!("invalid table {}", path.display()))?;
    let keys: Vec<u32> = table.iter().map(|(bmi, _)| bmi).collect();
    match (keys.first(), keys.last()) {
        (Some(lo), Some(hi)) => println!("ok: {} rows, BMI {lo}..={hi}", table.len()),
        _ => println!("ok: 0 rows"),
    }
    Ok(())
}

fn cmd_table_import(toml: &Path, db: &Path) -> Result<()> {
    let count = import_toml(toml, db)
        .with_context(|| format!("failed to import {} into {}", toml.display(), db.display()))?;
    println!("imported {count} rows into {}", db.display());
    Ok(())
}
