use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, rent::Rent};

use crate::errors::RpcError;

/// Source of rent-exemption balances.
#[async_trait]
pub trait RentRpc: Send + Sync {
    /// Minimum balance in lamports which makes an account of `data_len` bytes
    /// rent exempt.
    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize)
        -> Result<u64, RpcError>;
}

/// Asks a Solana node via `getMinimumBalanceForRentExemption`.
pub struct SolanaRentRpc {
    client: RpcClient,
}

impl SolanaRentRpc {
    pub fn new(url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url, CommitmentConfig::confirmed()),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl Debug for SolanaRentRpc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SolanaRentRpc {{ client: {:?} }}", self.client.url())
    }
}

#[async_trait]
impl RentRpc for SolanaRentRpc {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(RpcError::from)
    }
}

/// Computes rent exemption locally from fixed rent parameters, without any
/// network access.
#[derive(Debug, Clone, Default)]
pub struct LocalRent {
    rent: Rent,
}

impl LocalRent {
    pub fn new(rent: Rent) -> Self {
        Self { rent }
    }
}

#[async_trait]
impl RentRpc for LocalRent {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(self.rent.minimum_balance(data_len))
    }
}
