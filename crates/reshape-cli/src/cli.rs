//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Reshape CLI - Synthesize a jq query that reshapes JSON data into a JSON-Schema.
#[derive(Debug, Parser)]
#[command(name = "reshape")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub input: InputArgs,

    /// Also run the query on the input and print the result
    #[arg(long)]
    pub apply: bool,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Only print the result, no progress or summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for reports
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Only check whether the data can satisfy the schema, and report per field
    Check(InputArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

/// Schema, data and hint inputs shared by synthesis and checking.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// JSON-Schema file describing the desired output
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// JSON data file (read from stdin when omitted)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Extra hints about the data, given to every prompt
    #[arg(short, long)]
    pub key_hints: Option<String>,

    /// Repair attempts allowed per repair loop
    #[arg(short = 'r', long)]
    pub max_retries: Option<u32>,
}

/// Model backend selection, overriding the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// Model backend
    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderArg>,

    /// Model name
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Backend endpoint (OpenAI-compatible base URL or Ollama server)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
}

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// Model backend options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// OpenAI chat completions API
    Openai,
    /// Local Ollama server
    Ollama,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => crate::config::ProviderKind::OpenAi,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
        }
    }
}
