use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

use crate::{
    constants::{LOGS_KEY, TOTALS_KEY},
    networks::NetworkId,
};

pub mod storage;

pub use storage::{FileStorage, KeyValueStore, MemoryStorage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityAction {
    Add,
    Remove,
}

impl fmt::Display for LiquidityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquidityAction::Add => f.write_str("Added"),
            LiquidityAction::Remove => f.write_str("Removed"),
        }
    }
}

/// One successful on-chain liquidity action, in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityLogEntry {
    pub wallet: String,
    pub action: LiquidityAction,
    pub amount: f64,
    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub timestamp: String,
}

impl LiquidityLogEntry {
    pub fn new(
        wallet: impl Into<String>,
        action: LiquidityAction,
        amount: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            action,
            amount,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub type LogStore = BTreeMap<NetworkId, Vec<LiquidityLogEntry>>;
pub type TotalsStore = BTreeMap<NetworkId, f64>;

/// Result of reading one persisted key.
#[derive(Debug, PartialEq)]
pub enum Decoded<T> {
    Valid(T),
    Missing,
    Malformed(String),
}

impl<T: Default> Decoded<T> {
    pub fn into_value(self) -> T {
        match self {
            Decoded::Valid(value) => value,
            Decoded::Missing | Decoded::Malformed(_) => T::default(),
        }
    }
}

pub fn decode_key<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Decoded<T> {
    match storage.get(key) {
        None => Decoded::Missing,
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Decoded::Valid(value),
            Err(e) => Decoded::Malformed(e.to_string()),
        },
    }
}

/// Per-network action log and running totals.
///
/// The totals are maintained incrementally and are not re-derived from the
/// log on load, so a hand-edited storage file can make the two disagree;
/// [`Ledger::derived_total`] exposes the log's view for auditing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    logs: LogStore,
    totals: TotalsStore,
}

impl Ledger {
    pub fn new(logs: LogStore, totals: TotalsStore) -> Self {
        Self { logs, totals }
    }

    /// Read both keys. Each falls back to empty independently; never fails.
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        let logs = match decode_key::<LogStore>(storage, LOGS_KEY) {
            Decoded::Malformed(reason) => {
                warn!("Discarding malformed {}: {}", LOGS_KEY, reason);
                LogStore::default()
            }
            decoded => decoded.into_value(),
        };
        let totals = match decode_key::<TotalsStore>(storage, TOTALS_KEY) {
            Decoded::Malformed(reason) => {
                warn!("Discarding malformed {}: {}", TOTALS_KEY, reason);
                TotalsStore::default()
            }
            decoded => decoded.into_value(),
        };
        debug!(
            "Loaded {} log entries across {} networks",
            logs.values().map(Vec::len).sum::<usize>(),
            logs.len()
        );
        Self { logs, totals }
    }

    /// Write both keys, overwriting previous values.
    pub fn save(&self, storage: &dyn KeyValueStore) -> Result<(), StoreError> {
        storage.set(LOGS_KEY, &serde_json::to_string(&self.logs)?)?;
        storage.set(TOTALS_KEY, &serde_json::to_string(&self.totals)?)?;
        Ok(())
    }

    pub fn logs(&self, network: NetworkId) -> &[LiquidityLogEntry] {
        self.logs.get(&network).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self, network: NetworkId) -> f64 {
        self.totals.get(&network).copied().unwrap_or(0.0)
    }

    pub fn all_logs(&self) -> &LogStore {
        &self.logs
    }

    pub fn all_totals(&self) -> &TotalsStore {
        &self.totals
    }

    /// Append `entry` and fold its amount into the network's total.
    /// Removals clamp the total at zero.
    pub fn record(&mut self, network: NetworkId, entry: LiquidityLogEntry) {
        let total = apply(self.total(network), &entry);
        self.totals.insert(network, total);
        self.logs.entry(network).or_default().push(entry);
    }

    /// The total implied by replaying the log from zero.
    pub fn derived_total(&self, network: NetworkId) -> f64 {
        self.logs(network).iter().fold(0.0, apply)
    }
}

fn apply(total: f64, entry: &LiquidityLogEntry) -> f64 {
    match entry.action {
        LiquidityAction::Add => total + entry.amount,
        LiquidityAction::Remove => (total - entry.amount).max(0.0),
    }
}
