use crate::app::handlers::Endpoint;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "stat-feeds")]
#[command(about = "Edge-cached feeds for Ofgem price cap, ONS house prices and forex rates")]
pub struct CliConfig {
    /// Path to a TOML sources file (optional; defaults are built in)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Run one endpoint once and print the response
    Fetch {
        /// ofgem-cap, house-price or rates
        endpoint: Endpoint,

        #[arg(long)]
        base: Option<String>,

        #[arg(long)]
        currencies: Option<String>,
    },
}
