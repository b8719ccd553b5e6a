//! zt-agent main entry point
//!
//! This binary serves as the main entry point for the ZeroTier agent.
//! It handles CLI parsing, logging setup, and dispatching reconciliation
//! runs.

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zt_agent::config::Config;
use zt_agent::localconf::LocalConfigWriter;
use zt_agent::reconcile::{plan, Reconciler};
use zt_agent::report::RunReport;
use zt_agent::security::{check_secret_file, require_elevated};
use zt_agent::service::{create_service_manager, node_id_from_identity, LocalApi};
use zt_agent::{central::CentralClient, APP_NAME, VERSION};

/// Declarative ZeroTier node agent
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Declarations file path
    #[arg(
        short,
        long,
        global = true,
        default_value = "/etc/zt-agent/config.toml"
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the host against the declarations
    Apply,

    /// Show what apply would change, without changing anything
    Plan,

    /// Show node and membership status
    Status,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize structured logging with tracing
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the CLI command
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Apply => {
            info!("Starting {} v{} apply with config: {}", APP_NAME, VERSION, cli.config);
            let config = load_config(&cli.config)?;
            let report = apply(&config).await?;

            println!("{}", report);
            if report.failed() {
                anyhow::bail!("reconciliation failed for one or more networks");
            }
            Ok(())
        }
        Commands::Plan => {
            info!("Planning against config: {}", cli.config);
            let config = load_config(&cli.config)?;
            print_plan(&config).await
        }
        Commands::Status => {
            let config = load_config(&cli.config)?;
            print_status(&config).await
        }
        Commands::Version => {
            println!("{} v{}", APP_NAME, VERSION);
            Ok(())
        }
    }
}

/// Load and validate the declarations file, warning when it is readable by
/// other users (it carries Central API keys).
fn load_config(path: &str) -> anyhow::Result<Config> {
    if let Err(e) = check_secret_file(std::path::Path::new(path)) {
        warn!("{}", e);
    }

    Ok(Config::from_file(path)?)
}

/// Run a full reconciliation pass
async fn apply(config: &Config) -> anyhow::Result<RunReport> {
    // The default home directory is root-owned; fail fast rather than with
    // a tail of permission errors. Overridden homes are the operator's call.
    if config.home_dir.is_none() {
        require_elevated()?;
    }

    let mut report = RunReport::new();

    if let Some(ref version) = config.version {
        report.install_changed = zt_agent::install::ensure_version(version)?;
    }

    let home = config.home();
    let local = LocalApi::from_home(&config.service_url, &home)?;
    let node_id = discover_node_id(&local, &home).await?;
    info!("Node ID: {}", node_id);

    let joined: Vec<String> = local
        .networks()
        .await?
        .into_iter()
        .map(|n| n.id)
        .collect();

    let steps = plan(config, &joined);
    info!("Planned {} step(s)", steps.len());

    let central = CentralClient::new(&config.central_url)?;
    let reconciler = Reconciler::new(central, local);
    reconciler.apply(config, &node_id, &steps, &mut report).await;

    report.local_config_changed = zt_agent::localconf::sync(&home, config.local_config.as_ref())?;
    if report.local_config_changed {
        let manager = create_service_manager();
        manager.restart()?;
        report.service_restarted = true;
    }

    Ok(report)
}

/// Print the actions apply would take, without performing any of them
async fn print_plan(config: &Config) -> anyhow::Result<()> {
    if let Some(ref version) = config.version {
        match zt_agent::install::installed_version() {
            Some(current) if &current == version => {}
            Some(current) => {
                println!("package: would install zerotier-one {} (currently {})", version, current)
            }
            None => println!("package: would install zerotier-one {}", version),
        }
    }

    let home = config.home();
    let local = LocalApi::from_home(&config.service_url, &home)?;
    let joined: Vec<String> = local
        .networks()
        .await?
        .into_iter()
        .map(|n| n.id)
        .collect();

    let steps = plan(config, &joined);
    for step in &steps {
        println!("{}: would {}", step.network, step.action);
    }

    if let Some(ref declared) = config.local_config {
        let writer = LocalConfigWriter::new(&home);
        if !writer.is_current(declared)? {
            println!("local.conf: would rewrite and restart the daemon");
        }
    }

    if steps.is_empty() {
        println!("memberships: nothing to do");
    }

    Ok(())
}

/// Print node, platform, and membership status
async fn print_status(config: &Config) -> anyhow::Result<()> {
    let platform = zt_agent::platform::detect_environment();
    println!("platform: {}", platform.description());

    match zt_agent::install::installed_version() {
        Some(version) => println!("package: zerotier-one {}", version),
        None => println!("package: zerotier-one not installed"),
    }

    let home = config.home();
    let local = match LocalApi::from_home(&config.service_url, &home) {
        Ok(local) => local,
        Err(e) => {
            println!("service: unavailable ({})", e);
            return Ok(());
        }
    };

    match local.status().await {
        Ok(status) => {
            println!(
                "node: {} ({}, daemon {})",
                status.address,
                if status.online { "online" } else { "offline" },
                status.version
            );
        }
        Err(e) => {
            println!("service: unavailable ({})", e);
            return Ok(());
        }
    }

    for network in local.networks().await? {
        let addresses = if network.assigned_addresses.is_empty() {
            String::from("no addresses")
        } else {
            network.assigned_addresses.join(", ")
        };
        println!("network {}: {} ({})", network.id, network.status, addresses);
    }

    Ok(())
}

/// Discover this node's ID, preferring the service API and falling back to
/// the identity file
async fn discover_node_id(local: &LocalApi, home: &std::path::Path) -> anyhow::Result<String> {
    let node_id = match local.status().await {
        Ok(status) => status.address,
        Err(e) => {
            warn!("Service status unavailable ({}); reading identity file", e);
            node_id_from_identity(home)?
        }
    };

    zt_agent::config::validate_node_id(&node_id)?;
    Ok(node_id)
}
