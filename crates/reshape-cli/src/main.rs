//! Reshape CLI - Synthesize jq queries that reshape JSON data into a JSON-Schema.

use clap::Parser;
use reshape_cli::commands;
use reshape_cli::config::OutputFormat;
use reshape_cli::cli::{BackendArgs, CliFormat};
use reshape_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, stdout carries the query)
    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> reshape_cli::Result<()> {
    match cli.command {
        // Init writes the file that every other command reads
        Some(Command::Init(args)) => {
            let path = match &cli.backend.config {
                Some(path) => path.clone(),
                None => Config::path()?,
            };
            let formatter = Formatter::new(OutputFormat::Table, !cli.no_color);
            commands::execute_init(&args, &path, &formatter)?;
        }
        Some(Command::Check(input)) => {
            let (config, formatter) =
                load_config(&cli.backend, cli.format, cli.no_color, input.max_retries)?;
            commands::execute_check(input, &config, cli.backend.api_key.as_deref(), &formatter)
                .await?;
        }
        None => {
            let (config, formatter) =
                load_config(&cli.backend, cli.format, cli.no_color, cli.input.max_retries)?;
            commands::execute_synthesize(
                cli.input,
                cli.apply,
                &config,
                cli.backend.api_key.as_deref(),
                cli.quiet,
                &formatter,
            )
            .await?;
        }
    }

    Ok(())
}

/// Load the config file, apply command-line overrides and build the formatter
fn load_config(
    backend: &BackendArgs,
    format: Option<CliFormat>,
    no_color: bool,
    max_retries: Option<u32>,
) -> reshape_cli::Result<(Config, Formatter)> {
    let mut config = Config::load(backend.config.as_deref())?;
    config.apply_overrides(backend, max_retries);

    let format = format.map(Into::into).unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, !no_color && config.settings.color);
    Ok((config, formatter))
}
