use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};

use crate::{
    networks::{self, Network, NetworkId},
    store::{KeyValueStore, Ledger, LiquidityLogEntry, StoreError},
};

/// The two amount fields a user types into before adding or removing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountInputs {
    pub native: String,
    pub token: String,
}

impl AmountInputs {
    /// The "Max" shortcut: copy a known balance into the native input.
    pub fn use_max_native(&mut self, balance: Option<&str>) {
        self.native = balance.unwrap_or("0").to_string();
    }

    pub fn use_max_token(&mut self, balance: Option<&str>) {
        self.token = balance.unwrap_or("0").to_string();
    }
}

impl Default for AmountInputs {
    fn default() -> Self {
        Self {
            native: "0".to_string(),
            token: "0".to_string(),
        }
    }
}

/// Everything one user session owns: durable storage, its in-memory mirror,
/// the in-flight flag, the selected network and the amount inputs.
pub struct Session {
    storage: Box<dyn KeyValueStore>,
    ledger: RwLock<Ledger>,
    save_lock: Mutex<()>,
    selected: RwLock<NetworkId>,
    inputs: RwLock<AmountInputs>,
    in_flight: AtomicBool,
}

/// Holds the in-flight flag for as long as it lives.
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Session {
    /// Load the ledger from `storage` and select `network`.
    pub fn open(storage: Box<dyn KeyValueStore>, network: NetworkId) -> Self {
        let ledger = Ledger::load(storage.as_ref());
        Self {
            storage,
            ledger: RwLock::new(ledger),
            save_lock: Mutex::new(()),
            selected: RwLock::new(network),
            inputs: RwLock::new(AmountInputs::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn ledger(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().await
    }

    /// Append `entry` to the in-memory ledger, then mirror it to storage.
    ///
    /// The in-memory ledger keeps the entry even when the write fails.
    /// Readers are not blocked while the snapshot is written out.
    pub async fn commit(
        &self,
        network: NetworkId,
        entry: LiquidityLogEntry,
    ) -> Result<(), StoreError> {
        let _saving = self.save_lock.lock().await;
        let snapshot = {
            let mut ledger = self.ledger.write().await;
            ledger.record(network, entry);
            ledger.clone()
        };
        snapshot.save(self.storage.as_ref())
    }

    pub async fn selected_network(&self) -> &'static Network {
        let id = *self.selected.read().await;
        lookup(id)
    }

    /// Switch to `id`. The registry is closed, so this always succeeds.
    pub async fn select_network(&self, id: NetworkId) -> &'static Network {
        *self.selected.write().await = id;
        lookup(id)
    }

    /// Switch by textual id. Unknown ids leave the selection untouched.
    pub async fn select_network_by_name(&self, name: &str) -> &'static Network {
        match name.parse::<NetworkId>() {
            Ok(id) => self.select_network(id).await,
            Err(e) => {
                warn!("{}; keeping current network", e);
                self.selected_network().await
            }
        }
    }

    pub async fn inputs(&self) -> AmountInputs {
        self.inputs.read().await.clone()
    }

    pub async fn set_native_input(&self, value: impl Into<String>) {
        self.inputs.write().await.native = value.into();
    }

    pub async fn set_token_input(&self, value: impl Into<String>) {
        self.inputs.write().await.token = value.into();
    }

    pub async fn set_inputs(&self, inputs: AmountInputs) {
        *self.inputs.write().await = inputs;
    }

    pub async fn reset_inputs(&self) {
        *self.inputs.write().await = AmountInputs::default();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight flag, or `None` if an action is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                debug!("Liquidity action started");
                InFlightGuard {
                    flag: &self.in_flight,
                }
            })
    }
}

fn lookup(id: NetworkId) -> &'static Network {
    match networks::network(id) {
        Ok(network) => network,
        // every NetworkId has a registry row
        Err(_) => &networks::NETWORKS[0],
    }
}
