// Command-line configuration and logging setup

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::entities::NumberPolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "console-bank")]
#[command(about = "Interactive in-memory bank account manager", long_about = None)]
pub struct Config {
    /// Run the numbered text menu instead of the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Refuse to open an account whose number is already taken
    #[arg(long)]
    pub unique_numbers: bool,

    /// Log filter used when RUST_LOG is not set (logs go to stderr)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Print every account as JSON when the session ends
    #[arg(long)]
    pub dump_json: bool,
}

impl Config {
    pub fn number_policy(&self) -> NumberPolicy {
        if self.unique_numbers {
            NumberPolicy::Unique
        } else {
            NumberPolicy::Permissive
        }
    }

    /// RUST_LOG wins over `--log-level`
    pub fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(&self.log_level)?),
        }
    }

    pub fn init_tracing(&self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
    }
}
