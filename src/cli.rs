use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const MATERIALS_CSV_ENV_VAR: &str = "MATERIAL_DIGEST_MATERIALS_CSV";
pub const DEFAULT_LOG_DIRECTIVE: &str = "material_digest=info";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Upload CSV with a `material_no` column and an optional `weight` column
    #[arg(short, long)]
    pub upload: PathBuf,

    /// CSV export of the material table
    #[arg(short, long, env = MATERIALS_CSV_ENV_VAR)]
    pub materials: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Ignore upload weights and treat every material as 100 units
    #[arg(long)]
    pub unweighted: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Log filter from a `RUST_LOG`-style value. Blank or invalid input falls back
/// to [`DEFAULT_LOG_DIRECTIVE`].
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}
