use crate::cost_table::TreeConfig;

pub const DEFAULT_RPC_URL: &str = "https://api.vip.mainnet-beta.solana.com";
pub const DEFAULT_PRICE_API_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Message returned to clients when the cost table cannot be generated.
pub const COST_TABLE_ERROR_MESSAGE: &str = "An error occurred while calculating costs.";

const fn pair(max_depth: u32, max_buffer_size: u32) -> TreeConfig {
    TreeConfig {
        max_depth,
        max_buffer_size,
    }
}

/// Tree configurations listed in the cost table, in display order.
pub const ALL_DEPTH_SIZE_PAIRS: [TreeConfig; 26] = [
    pair(3, 8),
    pair(5, 8),
    pair(14, 64),
    pair(14, 256),
    pair(14, 1024),
    pair(14, 2048),
    pair(15, 64),
    pair(16, 64),
    pair(17, 64),
    pair(18, 64),
    pair(19, 64),
    pair(20, 64),
    pair(20, 256),
    pair(20, 1024),
    pair(20, 2048),
    pair(24, 64),
    pair(24, 256),
    pair(24, 512),
    pair(24, 1024),
    pair(24, 2048),
    pair(26, 512),
    pair(26, 1024),
    pair(26, 2048),
    pair(30, 512),
    pair(30, 1024),
    pair(30, 2048),
];
