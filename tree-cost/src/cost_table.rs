use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt, StreamExt, TryStreamExt};
use light_concurrent_tree_size::{
    concurrent_merkle_tree_account_size, max_canopy_depth, MAX_ACCOUNT_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{constants::DEFAULT_MAX_CONCURRENT_REQUESTS, errors::TreeCostError, rpc::RentRpc};

/// Shape of a concurrent Merkle tree whose storage cost is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    pub max_depth: u32,
    pub max_buffer_size: u32,
}

/// Storage requirements and rent-exempt cost of one tree configuration at
/// one canopy depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRow {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
    /// Account size in bytes.
    pub required_space: usize,
    /// Rent-exempt balance in lamports.
    pub storage_cost: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Tree without canopy. Always emitted, regardless of its size.
    NoCanopy,
    /// Deepest canopy which keeps the account within the size limit.
    MaxCanopy,
}

#[derive(Debug, Clone, Copy)]
pub struct CostTableOptions {
    /// Size limit for the max canopy row.
    pub max_account_size: usize,
    /// Upper bound of rent lookups in flight at the same time.
    pub max_concurrent_requests: usize,
}

impl Default for CostTableOptions {
    fn default() -> Self {
        Self {
            max_account_size: MAX_ACCOUNT_SIZE,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// Builds the cost table for `configs`.
///
/// Every configuration yields a row without canopy followed by a row with
/// the deepest canopy that fits `max_account_size`, if there is one. Rows
/// keep the order of `configs`. Rent lookups run concurrently, at most
/// `max_concurrent_requests` at a time. A single failed lookup fails the
/// whole table.
pub async fn generate_cost_table(
    rpc: Arc<dyn RentRpc>,
    configs: &[TreeConfig],
    options: &CostTableOptions,
) -> Result<Vec<CostRow>, TreeCostError> {
    let max_account_size = options.max_account_size;
    let mut row_futures: Vec<BoxFuture<'static, Result<Option<CostRow>, TreeCostError>>> =
        Vec::with_capacity(configs.len() * 2);
    for &config in configs {
        debug!(
            "Processing max_depth={}, max_buffer_size={}",
            config.max_depth, config.max_buffer_size
        );
        for kind in [RowKind::NoCanopy, RowKind::MaxCanopy] {
            let rpc = Arc::clone(&rpc);
            row_futures.push(
                async move { compute_row(rpc.as_ref(), config, kind, max_account_size).await }
                    .boxed(),
            );
        }
    }

    let rows: Vec<Option<CostRow>> = futures::stream::iter(row_futures)
        .buffered(options.max_concurrent_requests.max(1))
        .try_collect()
        .await
        .map_err(|e| {
            error!("Failed to generate cost table: {:?}", e);
            e
        })?;

    let rows: Vec<CostRow> = rows.into_iter().flatten().collect();
    info!(
        "Generated cost table with {} rows for {} tree configurations",
        rows.len(),
        configs.len()
    );
    Ok(rows)
}

/// Computes a single row of the cost table. Returns `None` for
/// [`RowKind::MaxCanopy`] when no canopy depth fits.
pub async fn compute_row<R>(
    rpc: &R,
    config: TreeConfig,
    kind: RowKind,
    max_account_size: usize,
) -> Result<Option<CostRow>, TreeCostError>
where
    R: RentRpc + ?Sized,
{
    let TreeConfig {
        max_depth,
        max_buffer_size,
    } = config;

    let (canopy_depth, required_space) = match kind {
        RowKind::NoCanopy => (
            0,
            concurrent_merkle_tree_account_size(max_depth, max_buffer_size, 0)?,
        ),
        RowKind::MaxCanopy => {
            match max_canopy_depth(max_depth, max_buffer_size, max_account_size)? {
                Some(fit) => (fit.canopy_depth, fit.size),
                None => {
                    debug!(
                        "No canopy fits {} bytes: max_depth={}, max_buffer_size={}",
                        max_account_size, max_depth, max_buffer_size
                    );
                    return Ok(None);
                }
            }
        }
    };

    let storage_cost = rpc
        .get_minimum_balance_for_rent_exemption(required_space)
        .await?;
    debug!(
        "{:?}: max_depth={}, max_buffer_size={}, canopy_depth={}, required_space={}, storage_cost={}",
        kind, max_depth, max_buffer_size, canopy_depth, required_space, storage_cost
    );

    Ok(Some(CostRow {
        max_depth,
        max_buffer_size,
        canopy_depth,
        required_space,
        storage_cost,
    }))
}
