use std::sync::Arc;

use light_concurrent_tree_size::MAX_ACCOUNT_SIZE;
use reqwest::Url;

use crate::{
    cli::{CostArgs, ServeArgs},
    cost_table::CostTableOptions,
    errors::ConfigError,
    price::{CoinGeckoPriceFeed, FixedPriceFeed, PriceFeed},
    rpc::{LocalRent, RentRpc, SolanaRentRpc},
};

#[derive(Debug, Clone)]
pub struct ExternalServicesConfig {
    pub rpc_url: String,
    pub price_api_url: String,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    pub port: u16,
    pub allow_public_bind: bool,
}

#[derive(Debug, Clone)]
pub struct TreeCostConfig {
    pub external_services: ExternalServicesConfig,
    pub cost_table: CostTableOptions,
    pub offline: bool,
    pub sol_price: Option<f64>,
}

impl TreeCostConfig {
    pub fn new(args: &CostArgs) -> Result<Self, ConfigError> {
        validate_url("rpc_url", &args.rpc_url)?;
        validate_url("price_api_url", &args.price_api_url)?;

        if args.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        let max_account_size = args.max_account_size.unwrap_or(MAX_ACCOUNT_SIZE);
        if max_account_size == 0 {
            return Err(ConfigError::InvalidMaxAccountSize);
        }
        if let Some(price) = args.sol_price {
            if !price.is_finite() || price < 0.0 {
                return Err(ConfigError::InvalidSolPrice(price));
            }
        }

        Ok(Self {
            external_services: ExternalServicesConfig {
                rpc_url: args.rpc_url.clone(),
                price_api_url: args.price_api_url.clone(),
            },
            cost_table: CostTableOptions {
                max_account_size,
                max_concurrent_requests: args.max_concurrent_requests,
            },
            offline: args.offline,
            sol_price: args.sol_price,
        })
    }

    pub fn rent_rpc(&self) -> Arc<dyn RentRpc> {
        if self.offline {
            Arc::new(LocalRent::default())
        } else {
            Arc::new(SolanaRentRpc::new(self.external_services.rpc_url.clone()))
        }
    }

    pub fn price_feed(&self) -> Arc<dyn PriceFeed> {
        match self.sol_price {
            Some(price) => Arc::new(FixedPriceFeed(price)),
            None => Arc::new(CoinGeckoPriceFeed::new(
                self.external_services.price_api_url.clone(),
            )),
        }
    }
}

impl ApiServerConfig {
    pub fn new(args: &ServeArgs) -> Self {
        Self {
            port: args.port,
            allow_public_bind: args.allow_public_bind,
        }
    }
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl {
            field,
            error: e.to_string(),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::{DEFAULT_PRICE_API_URL, DEFAULT_RPC_URL};

    fn args() -> CostArgs {
        CostArgs {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            max_concurrent_requests: 4,
            max_account_size: None,
            offline: true,
            sol_price: Some(150.0),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = TreeCostConfig::new(&args()).unwrap();
        assert_eq!(config.cost_table.max_account_size, MAX_ACCOUNT_SIZE);
        assert_eq!(config.cost_table.max_concurrent_requests, 4);
        assert_eq!(config.external_services.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        let args = CostArgs {
            max_concurrent_requests: 0,
            ..args()
        };
        assert!(matches!(
            TreeCostConfig::new(&args),
            Err(ConfigError::InvalidConcurrency)
        ));
    }

    #[test]
    fn test_config_rejects_invalid_url() {
        let args = CostArgs {
            rpc_url: "not a url".to_string(),
            ..args()
        };
        assert!(matches!(
            TreeCostConfig::new(&args),
            Err(ConfigError::InvalidUrl {
                field: "rpc_url",
                ..
            })
        ));
    }

    #[test]
    fn test_config_rejects_negative_price() {
        let args = CostArgs {
            sol_price: Some(-1.0),
            ..args()
        };
        assert!(matches!(
            TreeCostConfig::new(&args),
            Err(ConfigError::InvalidSolPrice(_))
        ));
    }
}
