//! Main entry point for the DeepL Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepl_translator::cli::commands::{self, Commands};
use deepl_translator::{Plan, TranslatorConfig};

/// DeepL Translator - translate text from the terminal
#[derive(Parser, Debug)]
#[command(name = "deepl-translator", version, about, long_about = None)]
struct Args {
    /// API key for DeepL (optional, defaults to DEEPL_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Subscription plan: free or pro
    #[arg(long)]
    plan: Option<Plan>,

    /// Load configuration from a JSON file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("deepl_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::from_env()?,
    };

    // Override config with CLI args if provided
    if let Some(api_key) = args.api_key {
        config.api_key = api_key;
    }
    if let Some(plan) = args.plan {
        config.plan = plan;
    }
    command.apply_overrides(&mut config);

    match command {
        Commands::Translate { text, .. } => commands::handle_translate(config, text).await?,
        Commands::Interactive { .. } => commands::handle_interactive(config).await?,
        Commands::Usage => commands::handle_usage(config).await?,
        Commands::Languages { remote } => commands::handle_languages(config, remote).await?,
    }

    Ok(())
}
