use std::{net::SocketAddr, sync::Arc, thread::JoinHandle};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::{
    config::ApiServerConfig,
    constants::{ALL_DEPTH_SIZE_PAIRS, COST_TABLE_ERROR_MESSAGE},
    cost_table::{generate_cost_table, CostTableOptions, TreeConfig},
    display::render_html,
    errors::TreeCostError,
    price::{sol_usd_price_or_default, PriceFeed},
    rpc::RentRpc,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Everything a request needs to build the cost table.
#[derive(Clone)]
pub struct ApiState {
    pub rpc: Arc<dyn RentRpc>,
    pub price_feed: Arc<dyn PriceFeed>,
    pub configs: Arc<[TreeConfig]>,
    pub options: CostTableOptions,
}

impl ApiState {
    pub fn new(
        rpc: Arc<dyn RentRpc>,
        price_feed: Arc<dyn PriceFeed>,
        options: CostTableOptions,
    ) -> Self {
        Self {
            rpc,
            price_feed,
            configs: Arc::from(ALL_DEPTH_SIZE_PAIRS.as_slice()),
            options,
        }
    }

    pub fn with_configs(mut self, configs: Vec<TreeConfig>) -> Self {
        self.configs = Arc::from(configs);
        self
    }
}

/// A running API server. Dropping it also stops the server, but without
/// waiting for its thread.
pub struct ApiServerHandle {
    pub addr: SocketAddr,
    thread_handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl ApiServerHandle {
    /// Stops accepting connections, lets in-flight requests finish and joins
    /// the server thread.
    pub fn shutdown(self) {
        // The server may already be gone.
        let _ = self.shutdown_tx.send(());
        if self.thread_handle.join().is_err() {
            error!("API server thread on {} panicked", self.addr);
        }
    }
}

/// All routes served by the API server.
///
/// * `GET /` - HTML dashboard with the cost table and SOL price.
/// * `GET /api/calculateCost` - cost table as JSON.
/// * `GET /health` - liveness check.
pub fn routes(state: ApiState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let dashboard_route = warp::path::end()
        .and(warp::get())
        .and(with_state.clone())
        .and_then(dashboard);

    let cost_route = warp::path!("api" / "calculateCost")
        .and(warp::get())
        .and(with_state)
        .and_then(calculate_cost);

    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
        warp::reply::json(&HealthResponse {
            status: "ok".to_string(),
        })
    });

    dashboard_route.or(cost_route).or(health_route)
}

async fn calculate_cost(state: ApiState) -> Result<impl Reply, Rejection> {
    match generate_cost_table(state.rpc.clone(), &state.configs, &state.options).await {
        Ok(rows) => Ok(warp::reply::with_status(
            warp::reply::json(&rows),
            StatusCode::OK,
        )),
        Err(e) => {
            error!("Failed to calculate costs: {:?}", e);
            let error_response = ErrorResponse {
                error: COST_TABLE_ERROR_MESSAGE.to_string(),
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&error_response),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn dashboard(state: ApiState) -> Result<impl Reply, Rejection> {
    let (rows, sol_price) = tokio::join!(
        generate_cost_table(state.rpc.clone(), &state.configs, &state.options),
        sol_usd_price_or_default(state.price_feed.clone()),
    );
    match rows {
        Ok(rows) => Ok(warp::reply::with_status(
            warp::reply::html(render_html(&rows, sol_price)),
            StatusCode::OK,
        )),
        Err(e) => {
            error!("Failed to calculate costs for dashboard: {:?}", e);
            Ok(warp::reply::with_status(
                warp::reply::html(render_html(&[], sol_price)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

fn bind_address(config: &ApiServerConfig) -> SocketAddr {
    if config.allow_public_bind {
        warn!(
            "API server binding to 0.0.0.0:{} - the cost table will be publicly accessible",
            config.port
        );
        SocketAddr::from(([0, 0, 0, 0], config.port))
    } else {
        SocketAddr::from(([127, 0, 0, 1], config.port))
    }
}

/// Starts the HTTP server on a dedicated thread with its own runtime, so
/// that slow cost table requests never compete with the caller's tasks.
///
/// Resolves once the listening socket is bound. A failure to bind (e.g. the
/// port is taken) is returned instead of a handle.
pub async fn spawn_api_server(
    state: ApiState,
    config: ApiServerConfig,
) -> Result<ApiServerHandle, TreeCostError> {
    let addr = bind_address(&config);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (bound_tx, bound_rx) = oneshot::channel::<Result<SocketAddr, TreeCostError>>();

    let thread_handle = std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                let _ = bound_tx.send(Err(anyhow::Error::from(e)
                    .context("failed to create API server runtime")
                    .into()));
                return;
            }
        };
        rt.block_on(async move {
            let bound = warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, async {
                let _ = shutdown_rx.await;
                info!("API server received shutdown signal");
            });
            let (local_addr, server) = match bound {
                Ok(bound) => bound,
                Err(e) => {
                    let _ = bound_tx.send(Err(TreeCostError::Bind {
                        addr,
                        error: e.to_string(),
                    }));
                    return;
                }
            };
            if bound_tx.send(Ok(local_addr)).is_err() {
                return;
            }
            info!("Starting HTTP API server on {}", local_addr);
            server.await;
            info!("API server on {} stopped", local_addr);
        });
    });

    let addr = match bound_rx.await {
        Ok(result) => result?,
        Err(_) => {
            return Err(anyhow::anyhow!("API server thread exited before binding {}", addr).into())
        }
    };
    Ok(ApiServerHandle {
        addr,
        thread_handle,
        shutdown_tx,
    })
}
