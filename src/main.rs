//! ng-status entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ng_status::api::WebHandler;
use ng_status::config::{Config, Options};
use ng_status::runtime::available_parallelism;

/// Minimal HTTP server exposing a process status endpoint.
#[derive(Parser, Debug)]
#[command(name = "ng-status")]
#[command(about = "Serve process uptime and runtime counters as JSON")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Address to listen on, e.g. ":8080".
    #[arg(long)]
    listen_address: Option<String>,

    /// Prefix for all routes.
    #[arg(long)]
    route_prefix: Option<String>,

    /// Tokio worker threads.
    #[arg(long)]
    worker_threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the status endpoint (default).
    Run,

    /// Check configuration validity and print the resolved options.
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(address) = args.listen_address.clone() {
        config.listen_address = address;
    }
    if let Some(prefix) = args.route_prefix.clone() {
        config.route_prefix = Some(prefix);
    }
    if let Some(workers) = args.worker_threads {
        config.worker_threads = Some(workers);
    }

    init_logging(&args, &config.rust_log);

    let options = config.into_options().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&options),
        Some(Command::Run) | None => cmd_run(options),
    }
}

fn init_logging(args: &Args, rust_log: &str) {
    let filter = if args.verbose {
        EnvFilter::new("ng_status=debug,info")
    } else {
        EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Print the resolved options.
fn cmd_check_config(options: &Options) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("NG-STATUS - CONFIGURATION CHECK");
    println!("======================================================================");
    println!("  Listen Address:  {}", options.listen_address);
    println!("  Route Prefix:    {:?}", options.route_prefix);
    println!(
        "  External URL:    {}",
        options
            .external_url
            .as_ref()
            .map_or("(none)", |u| u.as_str())
    );
    println!(
        "  CORS Origin:     {}",
        options.cors_origin.as_ref().map_or("(none)", |r| r.as_str())
    );
    println!("  Read Timeout:    {}s", options.read_timeout.as_secs());
    println!("  Max Connections: {}", options.max_connections);
    println!("  Page Title:      {}", options.page_title);
    println!(
        "  Worker Threads:  {}",
        options.worker_threads.unwrap_or_else(available_parallelism)
    );
    println!("  Redact Knobs:    {}", options.redact_tuning_knobs);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");
    Ok(())
}

/// Build the runtime and serve until shutdown.
fn cmd_run(options: Options) -> anyhow::Result<()> {
    let workers = options.worker_threads.unwrap_or_else(available_parallelism);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?;

    info!(workers, "Runtime started");
    runtime.block_on(WebHandler::new(options).run())?;
    Ok(())
}
