use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "tours-api", about = "Tours REST API")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "TOURS_API_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// JSON array of tours loaded into the store at startup.
    #[arg(long, env = "TOURS_SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "TOURS_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}
