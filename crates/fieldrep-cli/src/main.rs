mod app;
mod areas_cmd;
mod config;
mod plan_cmds;
mod products_cmd;
mod resolve;
mod sale_cmd;
mod search_cmd;
mod session_cmds;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fieldrep_core::catalog::DEFAULT_PAGE_SIZE;
use fieldrep_store::models::EntityId;

use app::App;
use config::FieldRepConfig;

#[derive(Parser)]
#[command(name = "fieldrep", about = "Field representative client: daily plans, people and catalog")]
struct Cli {
    /// GraphQL endpoint (overrides FIELDREP_ENDPOINT env var)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Persistent store file (overrides FIELDREP_STORE_PATH env var)
    #[arg(long, global = true)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fieldrep config file
    Init {
        /// GraphQL endpoint URL
        #[arg(long, default_value = config::DEFAULT_ENDPOINT)]
        endpoint_url: String,
        /// Reference-data cache lifetime in seconds
        #[arg(long, default_value_t = 300)]
        cache_ttl_secs: u64,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Sign in and save the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// List your working areas
    Areas,
    /// Search doctors and chemists by name
    Search {
        /// At least two characters
        text: String,
    },
    /// List catalog products
    Products {
        /// Load pages 1 through this one
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Products per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: u32,
        /// Only show loaded products whose name or code contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Daily plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Compute a sale line total from raw quantity and unit price text
    LineTotal {
        quantity: String,
        unit_price: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a daily plan from a TOML draft file
    Create {
        /// Path to the draft file
        file: String,
    },
    /// Create a daily plan from flags
    New {
        /// Working area id or label prefix
        #[arg(long)]
        area: String,
        /// Doctor id (repeatable)
        #[arg(long)]
        doctor: Vec<EntityId>,
        /// Chemist id (repeatable)
        #[arg(long)]
        chemist: Vec<EntityId>,
        /// Plan date, YYYY-MM-DD or DD/MM/YYYY (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Visit together with a colleague
        #[arg(long)]
        work_together: bool,
    },
}

/// Execute the `fieldrep init` command: write a config file.
fn cmd_init(endpoint: &str, cache_ttl_secs: u64, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        backend: config::BackendSection {
            endpoint: endpoint.to_string(),
            ..Default::default()
        },
        cache: config::CacheSection {
            ttl_secs: cache_ttl_secs,
            store_path: None,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  backend.endpoint = {endpoint}");
    println!("  backend.timeout_secs = {}", cfg.backend.timeout_secs);
    println!("  cache.ttl_secs = {cache_ttl_secs}");
    println!();
    println!("Next: run `fieldrep login --email <email> --password <password>`.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that need neither the store nor the backend.
    match &cli.command {
        Commands::Init {
            endpoint_url,
            cache_ttl_secs,
            force,
        } => return cmd_init(endpoint_url, *cache_ttl_secs, *force),
        Commands::LineTotal {
            quantity,
            unit_price,
        } => {
            sale_cmd::cmd_line_total(quantity, unit_price);
            return Ok(());
        }
        _ => {}
    }

    let resolved = FieldRepConfig::resolve(cli.endpoint.as_deref(), cli.store_path.as_deref())?;
    let app = App::open(resolved).await?;

    match cli.command {
        Commands::Init { .. } | Commands::LineTotal { .. } => Ok(()),
        Commands::Login { email, password } => session_cmds::cmd_login(&app, &email, &password).await,
        Commands::Logout => session_cmds::cmd_logout(&app).await,
        Commands::Areas => areas_cmd::cmd_areas(&app).await,
        Commands::Search { text } => search_cmd::cmd_search(&app, &text).await,
        Commands::Products {
            page,
            per_page,
            filter,
        } => products_cmd::cmd_products(&app, page, per_page, filter.as_deref()).await,
        Commands::Plan { command } => plan_cmds::run_plan_command(command, &app).await,
    }
}
