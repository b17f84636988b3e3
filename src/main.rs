//! Uganda dashboard API server entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uganda_dashboard::api::{create_router, AppState};
use uganda_dashboard::config::Config;
use uganda_dashboard::domains;
use uganda_dashboard::indicator::YearRange;
use uganda_dashboard::metrics;
use uganda_dashboard::utils::shutdown_signal;

/// Uganda development-indicator dashboard backend.
#[derive(Parser, Debug)]
#[command(name = "uganda-dashboard")]
#[command(about = "Aggregates WHO, World Bank, UNESCO and REST Countries data for Uganda")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the API server (default).
    Run {
        /// Override the listen port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch one indicator from its owning upstream and print the records.
    FetchIndicator {
        /// Indicator code, e.g. SP.POP.TOTL or WHOSIS_000001.
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("uganda_dashboard=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::FetchIndicator { code }) => cmd_fetch_indicator(&code).await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(None).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("UGANDA DASHBOARD - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen:        {}:{}", config.host, config.port);
    println!("  Country:       {}", config.country_code);
    println!("  Year range:    {}..={}", config.start_year, config.end_year);
    println!("  WHO:           {}", config.who_base_url);
    println!("  World Bank:    {}", config.world_bank_base_url);
    println!("  UNESCO:        {}", config.unesco_base_url);
    println!("  REST Countries:{}", config.rest_countries_base_url);
    println!("  Static dir:    {}", config.static_dir);
    println!("  CORS origins:  {}", config.cors_origins);
    println!("======================================================================");

    Ok(())
}

/// Fetch one indicator and print its records (diagnostic).
async fn cmd_fetch_indicator(code: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let source_id = domains::owning_source(code)
        .ok_or_else(|| anyhow::anyhow!("unknown indicator code: {code}"))?;

    let sources = uganda_dashboard::sources::SourceRegistry::from_config(&config);
    let range = YearRange::new(config.start_year, config.end_year);

    println!("Fetching {code} from {source_id}...");
    let batch = sources.get(source_id).fetch_many(&[code], range).await?;
    let records = batch.get(code).map(Vec::as_slice).unwrap_or_default();

    println!("{} record(s):", records.len());
    for record in records {
        println!("{}", serde_json::to_string(record)?);
    }

    Ok(())
}

/// Run the API server until Ctrl+C / SIGTERM.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    if let Some(port) = port_override {
        config.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "uganda dashboard API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
