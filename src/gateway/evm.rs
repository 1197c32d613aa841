use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::{abigen, ContractCall, ContractError},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TxHash, U256, U64},
};
use log::{debug, info};
use std::sync::Arc;

use super::{Asset, GatewayError, LiquidityGateway};

abigen!(
    Erc20Token,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function balanceOf(address account) external view returns (uint256)
        function symbol() external view returns (string)
    ]"#;

    LiquidityPool,
    r#"[
        function addLiquidity(uint256 tokenAmount) external payable
        function removeLiquidity(uint256 amount) external
    ]"#;
);

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Gateway backed by a JSON-RPC endpoint through ethers middleware.
pub struct EvmGateway<M> {
    client: Arc<M>,
    account: Option<Address>,
    confirmations: usize,
}

impl EvmGateway<SignerClient> {
    /// Connect to `rpc_url` and sign with the hex-encoded `private_key`.
    pub fn with_signer(
        rpc_url: &str,
        chain_id: u64,
        private_key: &str,
        confirmations: usize,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        let wallet = LocalWallet::from_bytes(&hex::decode(private_key.trim_start_matches("0x"))?)?
            .with_chain_id(chain_id);
        let account = wallet.address();
        info!("Wallet {:?} connected to chain {} via {}", account, chain_id, rpc_url);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        Ok(Self::new(client, Some(account), confirmations))
    }
}

impl<M: Middleware + 'static> EvmGateway<M> {
    pub fn new(client: Arc<M>, account: Option<Address>, confirmations: usize) -> Self {
        Self {
            client,
            account,
            confirmations,
        }
    }

    /// Send `call` and wait for the receipt.
    async fn submit<D>(&self, call: ContractCall<M, D>) -> Result<TxHash, GatewayError>
    where
        D: Detokenize + Send + Sync,
    {
        if self.account.is_none() {
            return Err(GatewayError::NotConnected);
        }

        let pending = call.send().await.map_err(contract_error)?;
        let tx_hash = *pending;
        debug!("Submitted transaction {:?}", tx_hash);

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .ok_or(GatewayError::Dropped(tx_hash))?;

        if receipt.status == Some(U64::zero()) {
            return Err(GatewayError::Reverted(tx_hash));
        }
        Ok(tx_hash)
    }
}

#[async_trait]
impl<M: Middleware + 'static> LiquidityGateway for EvmGateway<M> {
    async fn connect(&self) -> Option<Address> {
        self.account
    }

    async fn read_balance(&self, account: Address, asset: Asset) -> Result<U256, GatewayError> {
        match asset {
            Asset::Native => self
                .client
                .get_balance(account, None)
                .await
                .map_err(|e| GatewayError::Transport(e.to_string())),
            Asset::Token(token) => Erc20Token::new(token, self.client.clone())
                .balance_of(account)
                .call()
                .await
                .map_err(contract_error),
        }
    }

    async fn read_symbol(&self, token: Address) -> Result<String, GatewayError> {
        Erc20Token::new(token, self.client.clone())
            .symbol()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        let contract = Erc20Token::new(token, self.client.clone());
        self.submit(contract.approve(spender, amount)).await
    }

    async fn add_liquidity(
        &self,
        dex: Address,
        token_amount: U256,
        native_value: U256,
    ) -> Result<TxHash, GatewayError> {
        let contract = LiquidityPool::new(dex, self.client.clone());
        self.submit(contract.add_liquidity(token_amount).value(native_value))
            .await
    }

    async fn remove_liquidity(
        &self,
        dex: Address,
        token_amount: U256,
    ) -> Result<TxHash, GatewayError> {
        let contract = LiquidityPool::new(dex, self.client.clone());
        self.submit(contract.remove_liquidity(token_amount)).await
    }
}

fn contract_error<M: Middleware>(err: ContractError<M>) -> GatewayError {
    if err.is_revert() {
        GatewayError::Rejected(err.to_string())
    } else {
        GatewayError::Contract(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;

    fn offline_gateway(account: Option<Address>) -> EvmGateway<Provider<MockProvider>> {
        let (provider, _mock) = Provider::mocked();
        EvmGateway::new(Arc::new(provider), account, 1)
    }

    #[tokio::test]
    async fn test_connect_reports_signer_account() {
        let account = Address::random();
        assert_eq!(offline_gateway(Some(account)).connect().await, Some(account));
        assert_eq!(offline_gateway(None).connect().await, None);
    }

    #[tokio::test]
    async fn test_writes_require_a_wallet() {
        let gateway = offline_gateway(None);
        let result = gateway
            .remove_liquidity(Address::random(), U256::from(1))
            .await;
        assert!(matches!(result, Err(GatewayError::NotConnected)));
    }

    #[test]
    fn test_with_signer_rejects_bad_key() {
        assert!(EvmGateway::with_signer("https://rpc.core.com", 1116, "0xzz", 1).is_err());
    }
}
