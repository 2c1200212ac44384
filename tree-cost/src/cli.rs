use clap::{Args, Parser, Subcommand};

use crate::constants::{
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_PORT, DEFAULT_PRICE_API_URL, DEFAULT_RPC_URL,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the cost table over HTTP.
    Serve(ServeArgs),
    /// Print the cost table once and exit.
    Table(TableArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CostArgs {
    #[arg(long, env = "TREE_COST_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    #[arg(long, env = "TREE_COST_PRICE_API_URL", default_value = DEFAULT_PRICE_API_URL)]
    pub price_api_url: String,

    #[arg(
        long,
        env = "TREE_COST_MAX_CONCURRENT_REQUESTS",
        default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS
    )]
    pub max_concurrent_requests: usize,

    /// Size limit in bytes used to pick the deepest canopy.
    #[arg(long, env = "TREE_COST_MAX_ACCOUNT_SIZE")]
    pub max_account_size: Option<usize>,

    /// Compute rent exemption locally instead of asking the RPC node.
    #[arg(long, env = "TREE_COST_OFFLINE", default_value = "false")]
    pub offline: bool,

    /// Use a fixed SOL/USD price instead of querying the price API.
    #[arg(long, env = "TREE_COST_SOL_PRICE")]
    pub sol_price: Option<f64>,
}

#[derive(Parser, Clone, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub cost: CostArgs,

    #[arg(long, env = "TREE_COST_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Bind to 0.0.0.0 instead of 127.0.0.1.
    #[arg(long, env = "TREE_COST_ALLOW_PUBLIC_BIND", default_value = "false")]
    pub allow_public_bind: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct TableArgs {
    #[command(flatten)]
    pub cost: CostArgs,

    /// Print the rows as JSON instead of a text table.
    #[arg(long, default_value = "false")]
    pub json: bool,
}
