use ama_harness::cli::{Cli, Commands};
use ama_harness::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    let _telemetry = ama_harness::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Prepare(args) => {
            tracing::info!("Preparing quotes");
            args.execute(&config).await?;
        }
        Commands::Search(args) => {
            tracing::info!("Starting parameter search");
            args.execute(&config).await?;
        }
        Commands::Value(args) => {
            tracing::info!("Starting value run");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
