use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::errors::PriceError;

/// Source of the SOL/USD exchange rate.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn sol_usd_price(&self) -> Result<f64, PriceError>;
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    solana: Option<UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

/// CoinGecko `simple/price` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoPriceFeed {
    client: reqwest::Client,
    url: String,
}

impl CoinGeckoPriceFeed {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoPriceFeed {
    async fn sol_usd_price(&self) -> Result<f64, PriceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PriceError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: SimplePriceResponse = response.json().await?;
        let price = body
            .solana
            .and_then(|quote| quote.usd)
            .ok_or(PriceError::MissingQuote)?;
        debug!("SOL/USD price: {}", price);
        Ok(price)
    }
}

/// Always reports the same price.
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceFeed(pub f64);

#[async_trait]
impl PriceFeed for FixedPriceFeed {
    async fn sol_usd_price(&self) -> Result<f64, PriceError> {
        Ok(self.0)
    }
}

/// Fetches the SOL/USD price, falling back to 0 when the quote is
/// unavailable.
pub async fn sol_usd_price_or_default(feed: Arc<dyn PriceFeed>) -> f64 {
    match feed.sol_usd_price().await {
        Ok(price) => price,
        Err(e) => {
            error!("Error fetching Solana price: {}", e);
            0.0
        }
    }
}
