use chrono::Utc;
use ethers::{
    types::{Address, U256},
    utils::to_checksum,
};
use log::{error, info, warn};
use std::{fmt, sync::Arc};
use thiserror::Error;

use crate::{
    amount::{self, Amount, AmountError},
    constants::{ADD_FAILURE, ADD_SUCCESS, REMOVE_FAILURE, REMOVE_SUCCESS},
    gateway::{GatewayError, LiquidityGateway},
    networks::{self, NetworkId, RegistryError},
    notify::{Notice, Notifier},
    session::Session,
    store::{LiquidityAction, LiquidityLogEntry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Approve,
    AddLiquidity,
    RemoveLiquidity,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Approve => f.write_str("approve"),
            Step::AddLiquidity => f.write_str("addLiquidity"),
            Step::RemoveLiquidity => f.write_str("removeLiquidity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("a liquidity action is already in flight")]
    Busy,
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("{step} failed: {source}")]
    Gateway {
        step: Step,
        #[source]
        source: GatewayError,
    },
}

/// Sequences the on-chain calls for adding and removing liquidity and keeps
/// the session's ledger in step with what succeeded.
///
/// Only one action runs at a time per session. Nothing is retried.
pub struct LiquidityManager<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    revoke_allowance_on_failure: bool,
}

impl<G: LiquidityGateway> LiquidityManager<G> {
    pub fn new(gateway: Arc<G>, session: Arc<Session>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            session,
            notifier,
            revoke_allowance_on_failure: false,
        }
    }

    /// When the deposit fails after the approval went through, reset the
    /// allowance to zero before reporting the failure.
    pub fn with_allowance_revoke(mut self, enabled: bool) -> Self {
        self.revoke_allowance_on_failure = enabled;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Approve the dex for `token_amount`, then deposit it alongside
    /// `native_amount`. Logs the native amount.
    pub async fn add_liquidity(
        &self,
        network: NetworkId,
        wallet: Address,
        native_amount: &str,
        token_amount: &str,
    ) -> Result<LiquidityLogEntry, LiquidityError> {
        let _guard = self.session.try_begin().ok_or_else(|| {
            warn!("Ignoring add liquidity request while another action is pending");
            LiquidityError::Busy
        })?;

        let result = self
            .execute_add(network, wallet, native_amount, token_amount)
            .await;
        self.finish(result, ADD_SUCCESS, ADD_FAILURE, "adding").await
    }

    /// Withdraw `token_amount` from the dex. The ledger records
    /// `native_amount`, matching how additions are booked.
    pub async fn remove_liquidity(
        &self,
        network: NetworkId,
        wallet: Address,
        native_amount: &str,
        token_amount: &str,
    ) -> Result<LiquidityLogEntry, LiquidityError> {
        let _guard = self.session.try_begin().ok_or_else(|| {
            warn!("Ignoring remove liquidity request while another action is pending");
            LiquidityError::Busy
        })?;

        let result = self
            .execute_remove(network, wallet, native_amount, token_amount)
            .await;
        self.finish(result, REMOVE_SUCCESS, REMOVE_FAILURE, "removing")
            .await
    }

    async fn execute_add(
        &self,
        network: NetworkId,
        wallet: Address,
        native_amount: &str,
        token_amount: &str,
    ) -> Result<LiquidityLogEntry, LiquidityError> {
        let native = Amount::parse(native_amount)?;
        let token = Amount::parse(token_amount)?;
        let contracts = networks::addresses_for(network)?;

        info!(
            "Adding liquidity on {}: {} native, {} token",
            network, native.display, token.display
        );

        self.gateway
            .approve(contracts.token_contract, contracts.dex_contract, token.base_units)
            .await
            .map_err(|source| LiquidityError::Gateway {
                step: Step::Approve,
                source,
            })?;

        if let Err(source) = self
            .gateway
            .add_liquidity(contracts.dex_contract, token.base_units, native.base_units)
            .await
        {
            if self.revoke_allowance_on_failure {
                self.revoke_allowance(network, contracts.token_contract, contracts.dex_contract)
                    .await;
            }
            return Err(LiquidityError::Gateway {
                step: Step::AddLiquidity,
                source,
            });
        }

        let entry = LiquidityLogEntry::new(
            to_checksum(&wallet, None),
            LiquidityAction::Add,
            native.display,
            Utc::now(),
        );
        self.commit(network, &entry).await;
        Ok(entry)
    }

    async fn execute_remove(
        &self,
        network: NetworkId,
        wallet: Address,
        native_amount: &str,
        token_amount: &str,
    ) -> Result<LiquidityLogEntry, LiquidityError> {
        let token_units = amount::to_base_units(token_amount)?;
        let booked = amount::parse_display(native_amount)?;
        let contracts = networks::addresses_for(network)?;

        info!("Removing liquidity on {}: {} token units", network, token_units);

        self.gateway
            .remove_liquidity(contracts.dex_contract, token_units)
            .await
            .map_err(|source| LiquidityError::Gateway {
                step: Step::RemoveLiquidity,
                source,
            })?;

        let entry = LiquidityLogEntry::new(
            to_checksum(&wallet, None),
            LiquidityAction::Remove,
            booked,
            Utc::now(),
        );
        self.commit(network, &entry).await;
        Ok(entry)
    }

    async fn commit(&self, network: NetworkId, entry: &LiquidityLogEntry) {
        if let Err(e) = self.session.commit(network, entry.clone()).await {
            error!("Failed to persist liquidity log for {}: {}", network, e);
        }
    }

    async fn revoke_allowance(&self, network: NetworkId, token: Address, spender: Address) {
        match self.gateway.approve(token, spender, U256::zero()).await {
            Ok(tx_hash) => info!("Revoked dex allowance on {} in {:?}", network, tx_hash),
            Err(e) => error!("Failed to revoke dex allowance on {}: {}", network, e),
        }
    }

    async fn finish(
        &self,
        result: Result<LiquidityLogEntry, LiquidityError>,
        success: &str,
        failure: &str,
        verb: &str,
    ) -> Result<LiquidityLogEntry, LiquidityError> {
        match result {
            Ok(entry) => {
                self.notifier.notify(&Notice::Success(success.to_string()));
                self.session.reset_inputs().await;
                Ok(entry)
            }
            Err(e) => {
                error!("Error {} liquidity: {}", verb, e);
                self.notifier.notify(&Notice::Failure(failure.to_string()));
                Err(e)
            }
        }
    }
}
