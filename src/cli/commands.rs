use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ScaffoldConfig;
use crate::generator::{check_prerequisites, create_layout, Pipeline};
use crate::reconcile::CommandInstaller;
use crate::schema::PgMetadataSource;
use crate::tsconfig::{write_aliases, TsconfigMode};

/// Command-line interface for api-scaffold
///
/// Generates an Express/Prisma API skeleton from the tables of a Postgres
/// schema and keeps the project's `.env`, `package.json` and
/// `tsconfig.json` in line with it.
#[derive(Parser)]
#[command(name = "api-scaffold")]
#[command(about = "Scaffold Express/Prisma APIs from a database schema", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root every generated path is relative to
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Path to a config file (default: <root>/api-scaffold.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create the src/ directory skeleton
    Setup,
    /// Generate routes, DTOs, controllers and request samples for every table
    #[command(visible_alias = "generateApi", alias = "generate-api")]
    Generate {
        /// Database connection string (overrides DATABASE_URL and the config file)
        #[arg(long)]
        database_url: Option<String>,

        /// Schema to introspect (default: public)
        #[arg(long)]
        schema: Option<String>,

        /// Also generate src/app.ts and src/server.ts
        #[arg(long, default_value_t = false)]
        full_app: bool,

        /// Log a warning for every table skipped because of its name
        #[arg(long, default_value_t = false)]
        warn_skipped: bool,
    },
    /// Rewrite path aliases in an existing tsconfig.json
    #[command(visible_alias = "updateTsconfig")]
    UpdateTsconfig,
    /// Write path aliases to tsconfig.json, creating it if needed
    #[command(visible_alias = "generateTsconfig")]
    GenerateTsconfig,
}

/// Execute the parsed command
///
/// # Errors
///
/// Returns the error that stopped the command. A generation run that finishes
/// with recorded failures is also an error.
pub async fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ScaffoldConfig::load(cli.config.as_deref(), &cli.root)?;

    match cli.command {
        Commands::Setup => setup(&config)?,
        Commands::Generate {
            database_url,
            schema,
            full_app,
            warn_skipped,
        } => {
            let mut config = config;
            if let Some(url) = database_url {
                config.database_url = Some(url);
            }
            if let Some(schema) = schema {
                config.db_schema = schema;
            }
            config.full_app |= full_app;
            config.warn_on_skipped_models |= warn_skipped;
            generate(config).await?;
        }
        Commands::UpdateTsconfig => tsconfig(&config, TsconfigMode::Update)?,
        Commands::GenerateTsconfig => tsconfig(&config, TsconfigMode::Generate)?,
    }
    Ok(())
}

fn setup(config: &ScaffoldConfig) -> Result<(), Box<dyn std::error::Error>> {
    for dir in create_layout(&config.src_dir())? {
        info!("Created directory: {}", display_relative(&config.project_root, &dir));
    }
    info!("Setup completed successfully.");
    Ok(())
}

async fn generate(config: ScaffoldConfig) -> Result<(), Box<dyn std::error::Error>> {
    check_prerequisites(&config)?;
    let database_url = config.require_database_url()?.to_string();

    let source = PgMetadataSource::connect(&database_url).await?;
    let installer = CommandInstaller::new(config.installer.clone(), config.project_root.clone());
    let report = Pipeline::new(source, installer, config)
        .run(&mut io::stdout())
        .await?;

    info!(
        models = report.models.len(),
        files = report.written.len(),
        skipped = report.skipped.len(),
        installed = report.installed.len(),
        "generation summary"
    );
    if !report.is_clean() {
        return Err(format!(
            "generation finished with {} failure(s)",
            report.failures.len()
        )
        .into());
    }
    Ok(())
}

fn tsconfig(config: &ScaffoldConfig, mode: TsconfigMode) -> Result<(), Box<dyn std::error::Error>> {
    check_prerequisites(config)?;
    write_aliases(&config.tsconfig_path(), &config.tsconfig_aliases, mode)?;
    Ok(())
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
