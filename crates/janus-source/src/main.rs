//! janus CLI
//!
//! Command-line tool for authoring and inspecting single-file migrations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use janus_source::plan::collect_versions;
use janus_source::prelude::*;

/// Single-file up/down SQL migrations.
#[derive(Parser)]
#[command(name = "janus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Migrations directory.
    #[arg(short, long, env = "JANUS_MIGRATIONS_DIR", default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Source URL (defaults to singlefile://<migrations-dir>).
    #[arg(short, long, env = "JANUS_SOURCE")]
    source: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// The `--source` URL, or the migrations directory as a `singlefile://` URL.
    fn source_url(&self) -> String {
        self.source
            .clone()
            .unwrap_or_else(|| format!("singlefile://{}", self.migrations_dir.display()))
    }

    /// Directory that `create` writes into, the same one the source reads.
    fn create_dir(&self) -> Result<PathBuf> {
        match &self.source {
            Some(url) => Ok(SingleFileSource::path_from_url(url)?.to_path_buf()),
            None => Ok(self.migrations_dir.clone()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new migration file with UP and DOWN sections.
    Create {
        /// Migration name (e.g. create_users_table).
        name: String,

        /// Use the current Unix time as version instead of the next number.
        #[arg(long)]
        timestamp: bool,
    },

    /// List the versions of the migration source.
    Versions {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the SQL of one migration.
    Show {
        /// Migration version.
        version: u64,

        /// Show the DOWN section instead of UP.
        #[arg(short, long)]
        down: bool,
    },

    /// Show the migrations a move between two versions would run.
    Plan {
        /// Current version (nothing applied if not specified).
        #[arg(long)]
        from: Option<u64>,

        /// Target version (everything reverted if not specified).
        #[arg(long)]
        to: Option<u64>,
    },

    /// Open the source and report whether it is valid.
    Check,
}

#[derive(Serialize)]
struct VersionRow {
    version: u64,
    name: String,
    up: bool,
    down: bool,
}

fn version_rows(source: &dyn MigrationSource) -> Result<Vec<VersionRow>> {
    let mut rows = Vec::new();
    for version in collect_versions(source)? {
        let up = optional(source.read_up(version))?;
        let down = optional(source.read_down(version))?;
        let name = up
            .or(down)
            .map(|content| content.name.to_string())
            .unwrap_or_default();
        rows.push(VersionRow {
            version,
            name,
            up: up.is_some(),
            down: down.is_some(),
        });
    }
    Ok(rows)
}

fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let url = cli.source_url();
    let registry = SourceRegistry::with_defaults();

    match cli.command {
        Commands::Create { ref name, timestamp } => {
            let scheme = if timestamp {
                VersionScheme::Timestamp
            } else {
                VersionScheme::Sequential
            };
            let path = create_migration(&cli.create_dir()?, name, scheme)?;
            println!("Created: {}", path.display());
        }

        Commands::Versions { json } => {
            let source = registry.open(&url)?;
            let rows = version_rows(source.as_ref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                info!("No migrations found in {url}.");
            } else {
                println!("\n{:>10}  {:<4}  {:<4}  NAME", "VERSION", "UP", "DOWN");
                println!("{:-<60}", "");
                for row in &rows {
                    println!(
                        "{:>10}  {:<4}  {:<4}  {}",
                        row.version,
                        if row.up { "yes" } else { "-" },
                        if row.down { "yes" } else { "-" },
                        row.name
                    );
                }
                println!();
            }
        }

        Commands::Show { version, down } => {
            let source = registry.open(&url)?;
            let content = if down {
                source.read_down(version)?
            } else {
                source.read_up(version)?
            };
            println!("-- {version} {}", content.name);
            println!("{}", content.sql);
        }

        Commands::Plan { from, to } => {
            let source = registry.open(&url)?;
            let plan = plan_goto(source.as_ref(), from, to)?;

            if plan.is_empty() {
                println!("Nothing to run.");
                return Ok(());
            }

            println!(
                "Direction: {} ({} migration(s))\n",
                plan.direction,
                plan.len()
            );
            for &version in &plan.steps {
                let content = match plan.direction {
                    Direction::Down => optional(source.read_down(version))?,
                    _ => optional(source.read_up(version))?,
                };
                match content {
                    Some(content) => {
                        println!("-- {version} {} ({})", content.name, plan.direction);
                        println!("{}\n", content.sql);
                    }
                    None => println!("-- {version} (no {} section)\n", plan.direction),
                }
            }
        }

        Commands::Check => {
            let source = registry.open(&url)?;
            let versions = collect_versions(source.as_ref())?;
            println!("OK: {} migration(s) in {url}", versions.len());
        }
    }

    Ok(())
}
