use ethers::types::Address;
use futures::try_join;

use crate::{
    amount::format_base_units,
    gateway::{Asset, GatewayError, LiquidityGateway},
    networks::ContractAddressPair,
};

/// Wallet and pool balances for one network, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub token_symbol: String,
    pub wallet_native: String,
    pub wallet_token: String,
    pub dex_native: String,
    pub dex_token: String,
}

pub async fn read_balances<G: LiquidityGateway + ?Sized>(
    gateway: &G,
    contracts: &ContractAddressPair,
    account: Address,
) -> Result<BalanceSnapshot, GatewayError> {
    let token = Asset::Token(contracts.token_contract);
    let (token_symbol, wallet_native, wallet_token, dex_native, dex_token) = try_join!(
        gateway.read_symbol(contracts.token_contract),
        gateway.read_balance(account, Asset::Native),
        gateway.read_balance(account, token),
        gateway.read_balance(contracts.dex_contract, Asset::Native),
        gateway.read_balance(contracts.dex_contract, token),
    )?;

    Ok(BalanceSnapshot {
        token_symbol,
        wallet_native: format_base_units(wallet_native),
        wallet_token: format_base_units(wallet_token),
        dex_native: format_base_units(dex_native),
        dex_token: format_base_units(dex_token),
    })
}

/// First five characters of a balance, as shown beside each input.
pub fn truncate_display(value: &str) -> &str {
    match value.char_indices().nth(5) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::MockLiquidityGateway,
        networks::{addresses_for, NetworkId},
    };
    use ethers::types::U256;

    #[tokio::test]
    async fn test_read_balances_formats_every_amount() {
        let contracts = addresses_for(NetworkId::Core).unwrap();
        let account = Address::random();

        let mut gateway = MockLiquidityGateway::new();
        gateway
            .expect_read_symbol()
            .returning(|_| Ok("LIQ".to_string()));
        gateway.expect_read_balance().returning(move |who, asset| {
            let units = match (who == account, asset) {
                (true, Asset::Native) => U256::from(25) * U256::exp10(17),
                (true, Asset::Token(_)) => U256::from(100) * U256::exp10(18),
                (false, Asset::Native) => U256::exp10(18),
                (false, Asset::Token(_)) => U256::zero(),
            };
            Ok(units)
        });

        let snapshot = read_balances(&gateway, &contracts, account).await.unwrap();
        assert_eq!(
            snapshot,
            BalanceSnapshot {
                token_symbol: "LIQ".to_string(),
                wallet_native: "2.5".to_string(),
                wallet_token: "100".to_string(),
                dex_native: "1".to_string(),
                dex_token: "0".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_read_balances_propagates_gateway_error() {
        let contracts = addresses_for(NetworkId::Neon).unwrap();
        let mut gateway = MockLiquidityGateway::new();
        gateway
            .expect_read_symbol()
            .returning(|_| Err(GatewayError::Transport("connection refused".into())));
        gateway
            .expect_read_balance()
            .returning(|_, _| Ok(U256::zero()));

        let result = read_balances(&gateway, &contracts, Address::random()).await;
        assert!(matches!(result, Err(GatewayError::Transport(_))));
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("1234.56789"), "1234.");
        assert_eq!(truncate_display("0.5"), "0.5");
        assert_eq!(truncate_display(""), "");
    }
}
