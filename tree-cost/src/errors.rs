use std::net::SocketAddr;

use light_concurrent_tree_size::TreeSizeError;
use solana_client::client_error::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeCostError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tree size error: {0}")]
    TreeSize(#[from] TreeSizeError),

    #[error("Failed to bind API server to {addr}: {error}")]
    Bind { addr: SocketAddr, error: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("Error: `{0}`")]
    CustomError(String),
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        RpcError::ClientError(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Price request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Price quote API returned HTTP {status}")]
    Status { status: u16 },

    #[error("Price quote missing from response")]
    MissingQuote,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_concurrent_requests must be greater than 0")]
    InvalidConcurrency,

    #[error("max_account_size must be greater than 0")]
    InvalidMaxAccountSize,

    #[error("Invalid URL: {field} - {error}")]
    InvalidUrl { field: &'static str, error: String },

    #[error("Invalid SOL price: {0}")]
    InvalidSolPrice(f64),
}

impl From<tokio::task::JoinError> for TreeCostError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Other(err.into())
    }
}
