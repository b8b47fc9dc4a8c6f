use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "langdock", about = "Connects open documents to their language backends")]
pub struct Params {
    /// TOML file with the category table. The built-in `rust` entry is used when absent.
    #[arg(long, env = "LANGDOCK_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "LANGDOCK_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}
