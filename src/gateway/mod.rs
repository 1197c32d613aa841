use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use thiserror::Error;

pub mod evm;

pub use evm::EvmGateway;

/// What a balance is read for: the chain's native currency or an ERC-20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Native,
    Token(Address),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),
    #[error("transaction {0:?} dropped from the mempool")]
    Dropped(TxHash),
    #[error("rpc transport error: {0}")]
    Transport(String),
    #[error("contract call failed: {0}")]
    Contract(String),
}

/// Wallet and contract capabilities for the currently selected chain.
///
/// Write methods resolve once the transaction is mined; a revert, a user
/// rejection or a transport fault all surface as `GatewayError`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiquidityGateway: Send + Sync {
    async fn connect(&self) -> Option<Address>;

    async fn read_balance(&self, account: Address, asset: Asset) -> Result<U256, GatewayError>;

    async fn read_symbol(&self, token: Address) -> Result<String, GatewayError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError>;

    /// Deposit `token_amount` together with `native_value` attached as call value.
    async fn add_liquidity(
        &self,
        dex: Address,
        token_amount: U256,
        native_value: U256,
    ) -> Result<TxHash, GatewayError>;

    async fn remove_liquidity(&self, dex: Address, token_amount: U256)
        -> Result<TxHash, GatewayError>;
}
