use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use solana_sdk::rent::Rent;
use tree_cost::{
    errors::{PriceError, RpcError},
    price::PriceFeed,
    rpc::RentRpc,
};

/// Answers like [`tree_cost::rpc::LocalRent`] but fails the `fail_on`-th
/// call (0-based).
#[derive(Debug, Default)]
pub struct FailingRpc {
    pub fail_on: usize,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingRpc {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RentRpc for FailingRpc {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            return Err(RpcError::CustomError("node unavailable".to_string()));
        }
        Ok(Rent::default().minimum_balance(data_len))
    }
}

/// Records the largest number of lookups that were in flight at once.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct InFlightRpc {
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl RentRpc for InFlightRpc {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Rent::default().minimum_balance(data_len))
    }
}

#[allow(dead_code)]
pub struct FailingPriceFeed;

#[async_trait]
impl PriceFeed for FailingPriceFeed {
    async fn sol_usd_price(&self) -> Result<f64, PriceError> {
        Err(PriceError::MissingQuote)
    }
}
