use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "csync")]
#[command(about = "Catalog feed -> product store sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a catalog feed against the product store
    Sync {
        /// Catalog XML path (overrides feed.path from config)
        #[arg(long)]
        feed: Option<String>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Plan every record but write nothing
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Fail on config keys this command does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Build documents from a catalog feed and print them as JSON lines (no store access)
    Inspect {
        /// Catalog XML path (overrides feed.path from config)
        #[arg(long)]
        feed: Option<String>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> environment -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Sync {
            feed,
            config_paths,
            dry_run,
            strict_config,
        } => commands::sync::run_sync(feed, config_paths, dry_run, strict_config).await?,

        Commands::Inspect { feed, config_paths } => {
            commands::inspect::run_inspect(feed, config_paths)?
        }

        Commands::Db { cmd } => {
            let pool = csync_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = csync_db::status(&pool).await?;
                    println!(
                        "db_ok={} has_products_table={} products={}",
                        s.ok,
                        s.has_products_table,
                        s.product_count
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
                DbCmd::Migrate => {
                    csync_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = csync_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr so `inspect` output on stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
