use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tidemark::{
    create_registry, read_config, JsonFileStorage, MigrationExecutor, Options, TracingEventSink,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = tidemark::utils::CONFIG_FILE;

/// Tidemark - run reversible migrations up or down to a target version
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "TIDEMARK_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Override the applied-versions record location
    #[arg(long, env = "TIDEMARK_STORAGE")]
    storage: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every version and whether it is migrated
    Status,

    /// Apply pending migrations up to and including TARGET
    Up {
        /// Version id, or one of first, latest, head
        #[arg(default_value = "latest")]
        target: String,

        /// Run TARGET's unit again even if it is already migrated
        #[arg(long)]
        force: bool,

        /// Show what would run without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Revert migrated versions down to and including TARGET
    Down {
        /// Version id, or one of first, latest, head
        target: String,

        /// Run TARGET's unit again even if it is already reverted
        #[arg(long)]
        force: bool,

        #[arg(long)]
        dry_run: bool,
    },

    /// Migrate up to UP_TO and revert everything from DOWN_TO onwards
    Converge {
        up_to: String,
        down_to: String,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = read_config(&args.config).await?.unwrap_or_default();
    let base_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let storage_path = args
        .storage
        .clone()
        .unwrap_or_else(|| base_dir.join(&config.storage_path));
    info!(
        config = %args.config.display(),
        storage = %storage_path.display(),
        migrations = config.migrations.len(),
        "Loaded configuration"
    );

    let registry = create_registry(&config, &base_dir)?;
    let storage = Arc::new(JsonFileStorage::new(storage_path));
    let executor = MigrationExecutor::new(registry, storage, Arc::new(TracingEventSink));

    match args.command {
        Commands::Status => {
            for row in executor.status().await? {
                let state = if row.migrated { "migrated" } else { "pending" };
                let note = if row.linked { "" } else { " (no unit)" };
                println!("{:<10} {}{}  {}", state, row.id, note, row.description);
            }
        }
        Commands::Up {
            target,
            force,
            dry_run,
        } => {
            let options = Options::up().with_forced(force).with_dry_run(dry_run);
            let report = executor.migrate(&target, &options).await?;
            print_changes(report.dry_run, "up", &report.changed);
        }
        Commands::Down {
            target,
            force,
            dry_run,
        } => {
            let options = Options::down().with_forced(force).with_dry_run(dry_run);
            let report = executor.migrate(&target, &options).await?;
            print_changes(report.dry_run, "down", &report.changed);
        }
        Commands::Converge {
            up_to,
            down_to,
            dry_run,
        } => {
            let options = Options::up().with_dry_run(dry_run);
            let report = executor.converge(&up_to, &down_to, &options).await?;
            print_changes(report.dry_run, "up", &report.migrated);
            print_changes(report.dry_run, "down", &report.reverted);
        }
    }

    Ok(())
}

fn print_changes(dry_run: bool, direction: &str, ids: &[String]) {
    let prefix = if dry_run { "would run" } else { "ran" };
    if ids.is_empty() {
        println!("nothing to run {}", direction);
    }
    for id in ids {
        println!("{} {} {}", prefix, direction, id);
    }
}
