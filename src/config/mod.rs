use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use std::{collections::HashMap, str::FromStr};
use validator::{Validate, ValidationError};

use crate::{
    constants::{get_env, DEFAULT_CONFIRMATIONS, DEFAULT_STORAGE_PATH},
    networks::{self, NetworkId},
};

#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    // Wallet configuration
    #[validate(custom = "validate_private_key")]
    pub private_key: Option<String>,

    // Network configuration
    pub network: NetworkId,
    pub rpc_overrides: HashMap<NetworkId, String>,

    // Local persistence
    #[validate(length(min = 1))]
    pub storage_path: String,

    // Execution parameters
    #[validate(range(min = 1, max = 12))]
    pub confirmations: usize,
    pub revoke_allowance_on_failure: bool,

    pub log_level: LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            network: NetworkId::Core,
            rpc_overrides: HashMap::new(),
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
            confirmations: DEFAULT_CONFIRMATIONS,
            revoke_allowance_on_failure: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(get_env)
    }

    /// Build from any variable source; unset values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.private_key = lookup("PRIVATE_KEY");
        if let Some(network) = lookup("NETWORK") {
            config.network = network.parse()?;
        }
        for id in NetworkId::ALL {
            let key = format!("RPC_URL_{}", id.as_str().to_ascii_uppercase());
            if let Some(url) = lookup(&key) {
                config.rpc_overrides.insert(id, url);
            }
        }
        if let Some(path) = lookup("STORAGE_PATH") {
            config.storage_path = path;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = LevelFilter::from_str(&level)
                .map_err(|_| anyhow!("Invalid LOG_LEVEL {:?}", level))?;
        }
        if let Some(confirmations) = lookup("CONFIRMATIONS") {
            config.confirmations = confirmations
                .parse()
                .with_context(|| format!("Invalid CONFIRMATIONS {:?}", confirmations))?;
        }
        if let Some(flag) = lookup("REVOKE_ALLOWANCE_ON_FAILURE") {
            config.revoke_allowance_on_failure = flag
                .parse()
                .with_context(|| format!("Invalid REVOKE_ALLOWANCE_ON_FAILURE {:?}", flag))?;
        }

        Ok(config)
    }

    pub fn validate_all(&self) -> Result<()> {
        if let Err(e) = self.validate() {
            return Err(anyhow!("Configuration validation failed: {:?}", e));
        }
        self.validate_rpc_overrides()?;
        Ok(())
    }

    fn validate_rpc_overrides(&self) -> Result<()> {
        for (id, url) in &self.rpc_overrides {
            validate_rpc_url(url).map_err(|_| anyhow!("Invalid RPC url for {}: {}", id, url))?;
        }
        Ok(())
    }

    /// The configured endpoint for `network`, or the registry default.
    pub fn rpc_url(&self, network: NetworkId) -> Result<String> {
        if let Some(url) = self.rpc_overrides.get(&network) {
            return Ok(url.clone());
        }
        Ok(networks::network(network)?.rpc_url.to_string())
    }

    pub fn require_private_key(&self) -> Result<&str> {
        self.private_key
            .as_deref()
            .ok_or_else(|| anyhow!("PRIVATE_KEY is not set; please connect your wallet to continue"))
    }
}

// Custom validators
fn validate_rpc_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::new("invalid_rpc_url"));
    }
    Ok(())
}

fn validate_private_key(key: &str) -> Result<(), ValidationError> {
    let hex_part = key.strip_prefix("0x").unwrap_or(key);
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new("invalid_private_key"));
    }
    Ok(())
}
