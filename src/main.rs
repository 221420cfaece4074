mod inputs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use nodeflow_core::config::AppConfig;
use nodeflow_engine::{Builder, Driver};

#[derive(Parser)]
#[command(name = "nodeflow", version, about = "Declarative function-graph executor")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "nodeflow.toml", env = "NODEFLOW_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one or more targets and print the result as JSON
    Run {
        /// Output names to compute, in order
        #[arg(required = true)]
        targets: Vec<String>,
        /// Input value as key=<json>; plain text is taken as a string
        #[arg(short, long = "input")]
        input: Vec<String>,
        /// JSON file holding an object of inputs
        #[arg(long)]
        inputs: Option<PathBuf>,
        /// Adapter names, replacing the configured chain
        #[arg(short, long = "adapter")]
        adapter: Vec<String>,
        /// Also print the evaluation order
        #[arg(long)]
        log: bool,
    },
    /// List registered computations and their dependencies
    Nodes,
    /// Show the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG only, until the config's own filter is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        if cli.config.exists() {
            AppConfig::load(&cli.config).map(Some)
        } else {
            Ok(None)
        }
    })?;

    let filter = config
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|| AppConfig::default().logging.filter);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Some(config) => config,
        None => {
            warn!(path = %cli.config.display(), "No config file found, using built-in defaults");
            AppConfig::default()
        }
    };

    match cli.command {
        Commands::Run {
            targets,
            input,
            inputs,
            adapter,
            log,
        } => {
            let mut config = config;
            if !adapter.is_empty() {
                config.engine.adapters = adapter;
            }
            let driver = build_driver(&config)?;
            let inputs = inputs::collect(inputs.as_deref(), &input)?;

            let run = driver.execute(&targets, inputs)?;
            println!("{}", serde_json::to_string_pretty(&run.value)?);
            if log {
                println!();
                println!("Execution order ({}):", run.run_id);
                for (i, name) in run.execution_log.iter().enumerate() {
                    println!("  {}. {}", i + 1, name);
                }
            }
        }
        Commands::Nodes => {
            let driver = build_driver(&config)?;
            for node in driver.nodes() {
                if node.dependencies.is_empty() {
                    println!("{}  [{}]", node.name, node.module);
                } else {
                    println!(
                        "{}({})  [{}]",
                        node.name,
                        node.dependencies.join(", "),
                        node.module
                    );
                }
            }
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn build_driver(config: &AppConfig) -> anyhow::Result<Driver> {
    let driver = Builder::new()
        .with_catalog(nodeflow_dataflow::catalog())
        .with_app_config(config)
        .build()?;
    Ok(driver)
}
