pub mod api_server;
pub mod cli;
pub mod config;
pub mod constants;
pub mod cost_table;
pub mod display;
pub mod errors;
pub mod price;
pub mod rpc;
pub mod telemetry;

pub use config::TreeCostConfig;
pub use cost_table::{generate_cost_table, CostRow, CostTableOptions, TreeConfig};
pub use errors::TreeCostError;
use tracing::info;

use crate::{
    api_server::{spawn_api_server, ApiState},
    cli::TableArgs,
    config::ApiServerConfig,
    constants::ALL_DEPTH_SIZE_PAIRS,
    display::render_text_table,
    price::sol_usd_price_or_default,
};

/// Runs the HTTP server until `shutdown` resolves.
pub async fn run_server<F>(
    config: TreeCostConfig,
    server_config: ApiServerConfig,
    shutdown: F,
) -> Result<(), TreeCostError>
where
    F: std::future::Future<Output = ()>,
{
    info!(
        "Serving cost table: rpc_url={}, offline={}, max_concurrent_requests={}",
        config.external_services.rpc_url,
        config.offline,
        config.cost_table.max_concurrent_requests
    );
    let state = ApiState::new(config.rent_rpc(), config.price_feed(), config.cost_table);
    let handle = spawn_api_server(state, server_config).await?;

    shutdown.await;
    info!("Shutting down API server");
    tokio::task::spawn_blocking(move || handle.shutdown()).await?;
    Ok(())
}

/// Generates the cost table once and prints it to stdout.
pub async fn print_cost_table(
    config: TreeCostConfig,
    args: &TableArgs,
) -> Result<(), TreeCostError> {
    let (rows, sol_price) = tokio::join!(
        generate_cost_table(config.rent_rpc(), &ALL_DEPTH_SIZE_PAIRS, &config.cost_table),
        sol_usd_price_or_default(config.price_feed()),
    );
    print!("{}", format_cost_table(&rows?, sol_price, args.json)?);
    Ok(())
}

/// Output of the `table` command: the rows as pretty JSON, or the text
/// table headed by the SOL price.
pub fn format_cost_table(
    rows: &[CostRow],
    sol_price: f64,
    json: bool,
) -> Result<String, TreeCostError> {
    if json {
        let mut out = serde_json::to_string_pretty(rows).map_err(anyhow::Error::from)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(render_text_table(rows, sol_price))
    }
}
