use std::sync::{atomic::Ordering, Arc};

use light_concurrent_tree_size::{
    concurrent_merkle_tree_account_size, max_canopy_depth, MAX_ACCOUNT_SIZE,
};
use solana_sdk::rent::Rent;
use tree_cost::{
    constants::ALL_DEPTH_SIZE_PAIRS,
    cost_table::{compute_row, RowKind},
    generate_cost_table,
    rpc::LocalRent,
    format_cost_table, CostRow, CostTableOptions, TreeConfig, TreeCostError,
};

mod test_utils;
use test_utils::{FailingRpc, InFlightRpc};

fn config(max_depth: u32, max_buffer_size: u32) -> TreeConfig {
    TreeConfig {
        max_depth,
        max_buffer_size,
    }
}

#[tokio::test]
async fn test_full_table_has_two_rows_per_config() {
    let rows = generate_cost_table(
        Arc::new(LocalRent::default()),
        &ALL_DEPTH_SIZE_PAIRS,
        &CostTableOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2 * ALL_DEPTH_SIZE_PAIRS.len());
    for (pair, chunk) in ALL_DEPTH_SIZE_PAIRS.iter().zip(rows.chunks(2)) {
        let (no_canopy, max_canopy) = (&chunk[0], &chunk[1]);
        for row in chunk {
            assert_eq!(row.max_depth, pair.max_depth);
            assert_eq!(row.max_buffer_size, pair.max_buffer_size);
            assert_eq!(
                row.storage_cost,
                Rent::default().minimum_balance(row.required_space)
            );
        }

        assert_eq!(no_canopy.canopy_depth, 0);
        assert_eq!(
            no_canopy.required_space,
            concurrent_merkle_tree_account_size(pair.max_depth, pair.max_buffer_size, 0).unwrap()
        );

        let fit = max_canopy_depth(pair.max_depth, pair.max_buffer_size, MAX_ACCOUNT_SIZE)
            .unwrap()
            .unwrap();
        assert_eq!(max_canopy.canopy_depth, fit.canopy_depth);
        assert_eq!(max_canopy.required_space, fit.size);
        assert!(max_canopy.required_space <= MAX_ACCOUNT_SIZE);
        assert!(max_canopy.canopy_depth < pair.max_depth);
    }
}

#[tokio::test]
async fn test_small_tree() {
    let rows = generate_cost_table(
        Arc::new(LocalRent::default()),
        &[config(3, 8)],
        &CostTableOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        rows,
        vec![
            CostRow {
                max_depth: 3,
                max_buffer_size: 8,
                canopy_depth: 0,
                required_space: 1_304,
                storage_cost: Rent::default().minimum_balance(1_304),
            },
            CostRow {
                max_depth: 3,
                max_buffer_size: 8,
                canopy_depth: 2,
                required_space: 1_496,
                storage_cost: Rent::default().minimum_balance(1_496),
            },
        ]
    );
}

#[tokio::test]
async fn test_largest_tree() {
    let rows = generate_cost_table(
        Arc::new(LocalRent::default()),
        &[config(30, 2048)],
        &CostTableOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].canopy_depth, 0);
    assert_eq!(rows[0].required_space, 2_049_080);
    assert_eq!(rows[1].canopy_depth, 17);
    assert_eq!(rows[1].required_space, 10_437_624);
}

/// Rows without canopy are emitted even when they exceed the size limit.
#[tokio::test]
async fn test_no_canopy_row_ignores_limit() {
    let options = CostTableOptions {
        max_account_size: 1_000,
        ..Default::default()
    };
    let rows = generate_cost_table(
        Arc::new(LocalRent::default()),
        &[config(3, 8), config(14, 64)],
        &options,
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].max_depth, rows[0].canopy_depth), (3, 0));
    assert_eq!(rows[0].required_space, 1_304);
    assert_eq!((rows[1].max_depth, rows[1].canopy_depth), (14, 0));
    assert_eq!(rows[1].required_space, 31_800);
}

#[tokio::test]
async fn test_row_count_with_partial_fits() {
    // Only the trees with a depth 0 size below 1 MB get a canopy row.
    let options = CostTableOptions {
        max_account_size: 1_000_000,
        ..Default::default()
    };
    let rows = generate_cost_table(Arc::new(LocalRent::default()), &ALL_DEPTH_SIZE_PAIRS, &options)
        .await
        .unwrap();

    assert!(rows.len() >= ALL_DEPTH_SIZE_PAIRS.len());
    assert!(rows.len() < 2 * ALL_DEPTH_SIZE_PAIRS.len());
    for pair in ALL_DEPTH_SIZE_PAIRS.iter() {
        let pair_rows: Vec<&CostRow> = rows
            .iter()
            .filter(|row| {
                row.max_depth == pair.max_depth && row.max_buffer_size == pair.max_buffer_size
            })
            .collect();
        let fit = max_canopy_depth(pair.max_depth, pair.max_buffer_size, 1_000_000).unwrap();
        assert_eq!(pair_rows.len(), if fit.is_some() { 2 } else { 1 });
        assert_eq!(pair_rows[0].canopy_depth, 0);
    }
}

#[tokio::test]
async fn test_compute_row_without_fit() {
    let row = compute_row(&LocalRent::default(), config(3, 8), RowKind::MaxCanopy, 1_000)
        .await
        .unwrap();
    assert_eq!(row, None);

    let row = compute_row(&LocalRent::default(), config(3, 8), RowKind::NoCanopy, 1_000)
        .await
        .unwrap();
    assert_eq!(row.map(|row| row.required_space), Some(1_304));
}

#[tokio::test]
async fn test_single_rpc_failure_fails_table() {
    for fail_on in [0, 17, 51] {
        let result = generate_cost_table(
            Arc::new(FailingRpc::new(fail_on)),
            &ALL_DEPTH_SIZE_PAIRS,
            &CostTableOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(TreeCostError::Rpc(_))));
    }
}

#[tokio::test]
async fn test_concurrency_limit() {
    let rpc = Arc::new(InFlightRpc::default());
    let options = CostTableOptions {
        max_concurrent_requests: 4,
        ..Default::default()
    };
    let rows = generate_cost_table(rpc.clone(), &ALL_DEPTH_SIZE_PAIRS, &options)
        .await
        .unwrap();

    assert_eq!(rows.len(), 52);
    assert_eq!(rpc.calls.load(Ordering::SeqCst), 52);
    let max_in_flight = rpc.max_in_flight.load(Ordering::SeqCst);
    assert!(max_in_flight > 1);
    assert!(max_in_flight <= 4);
}

#[tokio::test]
async fn test_rows_serialize_camel_case() {
    let row = CostRow {
        max_depth: 14,
        max_buffer_size: 64,
        canopy_depth: 0,
        required_space: 31_800,
        storage_cost: 222_218_880,
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "maxDepth": 14,
            "maxBufferSize": 64,
            "canopyDepth": 0,
            "requiredSpace": 31800,
            "storageCost": 222218880u64,
        })
    );
}

#[tokio::test]
async fn test_json_output_is_parseable() {
    let rows = generate_cost_table(
        Arc::new(LocalRent::default()),
        &ALL_DEPTH_SIZE_PAIRS,
        &CostTableOptions::default(),
    )
    .await
    .unwrap();

    let out = format_cost_table(&rows, 150.0, true).unwrap();
    let parsed: Vec<CostRow> = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, rows);

    let text = format_cost_table(&rows, 150.0, false).unwrap();
    assert!(text.starts_with("Current SOL Price: $150.00"));
    assert_eq!(text.lines().count(), 3 + rows.len());
}

#[test]
fn test_generated_table_future_is_send() {
    fn assert_send<T: Send + 'static>(_: &T) {}
    let rpc: Arc<dyn tree_cost::rpc::RentRpc> = Arc::new(LocalRent::default());
    let future = async move {
        generate_cost_table(rpc, &ALL_DEPTH_SIZE_PAIRS, &CostTableOptions::default()).await
    };
    assert_send(&future);
}
