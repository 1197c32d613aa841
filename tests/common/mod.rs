#![allow(dead_code)]

use async_trait::async_trait;
use dexliquid::{
    core::LiquidityManager,
    gateway::{Asset, GatewayError, LiquidityGateway},
    networks::NetworkId,
    notify::{Notice, Notifier},
    session::Session,
    store::KeyValueStore,
};
use ethers::types::{Address, TxHash, U256};
use mockall::mock;
use std::sync::{Arc, Mutex};

mock! {
    pub Gateway {}

    #[async_trait]
    impl LiquidityGateway for Gateway {
        async fn connect(&self) -> Option<Address>;
        async fn read_balance(&self, account: Address, asset: Asset) -> Result<U256, GatewayError>;
        async fn read_symbol(&self, token: Address) -> Result<String, GatewayError>;
        async fn approve(
            &self,
            token: Address,
            spender: Address,
            amount: U256,
        ) -> Result<TxHash, GatewayError>;
        async fn add_liquidity(
            &self,
            dex: Address,
            token_amount: U256,
            native_value: U256,
        ) -> Result<TxHash, GatewayError>;
        async fn remove_liquidity(
            &self,
            dex: Address,
            token_amount: U256,
        ) -> Result<TxHash, GatewayError>;
    }
}

/// A gateway on which every write succeeds.
pub fn accepting_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_approve()
        .returning(|_, _, _| Ok(TxHash::random()));
    gateway
        .expect_add_liquidity()
        .returning(|_, _, _| Ok(TxHash::random()));
    gateway
        .expect_remove_liquidity()
        .returning(|_, _| Ok(TxHash::random()));
    gateway
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn manager_with(
    gateway: MockGateway,
    storage: Box<dyn KeyValueStore>,
) -> (LiquidityManager<MockGateway>, Arc<RecordingNotifier>) {
    let session = Arc::new(Session::open(storage, NetworkId::Core));
    let notifier = Arc::new(RecordingNotifier::default());
    let manager = LiquidityManager::new(Arc::new(gateway), session, notifier.clone());
    (manager, notifier)
}
