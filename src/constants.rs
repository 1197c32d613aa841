/// Every token and native currency handled here uses 18 decimals.
pub const TOKEN_DECIMALS: u32 = 18;

pub const DEFAULT_STORAGE_PATH: &str = ".dexliquid/storage.json";
pub const DEFAULT_CONFIRMATIONS: usize = 1;

// Durable storage keys
pub const LOGS_KEY: &str = "liquidityLogs";
pub const TOTALS_KEY: &str = "totalLiquidity";

// User-facing notices
pub const ADD_SUCCESS: &str = "Liquidity added successfully";
pub const ADD_FAILURE: &str =
    "An error occurred while adding liquidity. Please check the console for details.";
pub const REMOVE_SUCCESS: &str = "Liquidity removed successfully";
pub const REMOVE_FAILURE: &str =
    "An error occurred while removing liquidity. Please check the console for details.";

pub fn get_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
