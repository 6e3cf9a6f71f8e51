//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Reportpull - pull reporting API queries into local files
#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "API_BASE_URL")]
    pub base_url: Option<String>,

    /// API token, sent as the `token` header
    #[arg(long, global = true, env = "API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Warehouse codes as a JSON list (`["1145","1290"]`) or comma-separated
    #[arg(long, global = true, env = "WAREHOUSES")]
    pub warehouses: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every query and write one file per pairing
    Run(RunArgs),

    /// List the query catalog
    Ls(LsArgs),

    /// Print the URL each pairing would request, without fetching
    Urls(UrlsArgs),

    /// Validate configuration and filter templates
    Validate(ValidateArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Query ids to run (comma-separated, default: all)
    #[arg(short, long)]
    pub queries: Option<String>,

    /// Override the output file format
    #[arg(short, long, value_enum)]
    pub format: Option<FileFormat>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Skip the pause between queries
    #[arg(long)]
    pub no_delay: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: RunOutput,
}

/// Output file formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Pretty-printed JSON array
    Json,
    /// Newline-delimited JSON
    Ndjson,
    /// Parquet
    Parquet,
}

impl From<FileFormat> for rp_core::OutputFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Json => rp_core::OutputFormat::Json,
            FileFormat::Ndjson => rp_core::OutputFormat::Ndjson,
            FileFormat::Parquet => rp_core::OutputFormat::Parquet,
        }
    }
}

/// Run summary formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    /// Progress lines and totals
    Text,
    /// Run outcome as JSON
    Json,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the urls command
#[derive(Args, Debug)]
pub struct UrlsArgs {
    /// Query ids to show (comma-separated, default: all)
    #[arg(short, long)]
    pub queries: Option<String>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also require API_BASE_URL and API_TOKEN to be set
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
