pub mod amount;
pub mod balances;
pub mod config;
pub mod constants;
pub mod core;        // Add/remove liquidity orchestration
pub mod gateway;     // Wallet and contract access
pub mod networks;
pub mod notify;
pub mod session;
pub mod store;       // Persisted action log and totals
pub mod utils;
