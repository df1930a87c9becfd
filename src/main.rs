use clap::{Parser, builder::styling};
use owo_colors::OwoColorize;
use seedr::{
    cli::populate, config::SeedConfig, orchestrator::EXIT_INIT_FAILURE, report::ConsoleReporter,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Seedr: populate Firestore collections with reference documents
#[derive(Parser)]
#[command(name = "seedr", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings from, if it exists
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long)]
    debug: bool,

    /// Seed file (.yml, .yaml, .json or .json5) to load instead of the built-in data
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Number of writes per atomic commit (1-500)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Delete each collection's existing documents before writing
    #[arg(long)]
    clear: bool,

    /// Write to an in-memory store instead of Firestore
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = Path::new(&cli.env)
        .exists()
        .then(|| dotenvy::from_filename(&cli.env));

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenv {
        Some(Ok(_)) => log::debug!("Loaded settings from {}", cli.env.bright_black()),
        Some(Err(e)) => {
            log::error!("Failed to load {}: {}", cli.env.bright_black(), e);
            return ExitCode::from(EXIT_INIT_FAILURE);
        }
        None => log::debug!("No {} file, using the process environment", cli.env),
    }

    let mut config = match SeedConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{:#}", e);
            return ExitCode::from(EXIT_INIT_FAILURE);
        }
    };
    if let Some(seed) = cli.seed {
        config.seed_file = Some(seed);
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    config.clear = cli.clear;
    config.dry_run = cli.dry_run;

    match populate(&config, ConsoleReporter).await {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(EXIT_INIT_FAILURE)
        }
    }
}
