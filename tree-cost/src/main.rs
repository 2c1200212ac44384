use clap::Parser;
use tracing::error;
use tree_cost::{
    cli::{Cli, Commands},
    config::ApiServerConfig,
    print_cost_table, run_server,
    telemetry::setup_telemetry,
    TreeCostConfig, TreeCostError,
};

#[tokio::main]
async fn main() -> Result<(), TreeCostError> {
    setup_telemetry();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Serve(args) => {
            let config = TreeCostConfig::new(&args.cost)?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for ctrl-c: {}", e);
                }
            };
            run_server(config, ApiServerConfig::new(args), shutdown).await
        }
        Commands::Table(args) => {
            let config = TreeCostConfig::new(&args.cost)?;
            print_cost_table(config, args).await
        }
    };

    if let Err(e) = &result {
        error!("tree-cost failed: {}", e);
    }
    result
}
