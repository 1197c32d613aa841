use ethers::types::Address;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no contracts registered for network {0}")]
    NotFound(NetworkId),
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Core,
    Xdc,
    Tlos,
    Base,
    Neon,
}

impl NetworkId {
    pub const ALL: [NetworkId; 5] = [
        NetworkId::Core,
        NetworkId::Xdc,
        NetworkId::Tlos,
        NetworkId::Base,
        NetworkId::Neon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Core => "core",
            NetworkId::Xdc => "xdc",
            NetworkId::Tlos => "tlos",
            NetworkId::Base => "base",
            NetworkId::Neon => "neon",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        NetworkId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| RegistryError::UnknownNetwork(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub id: NetworkId,
    pub display_name: &'static str,
    pub native_token_symbol: &'static str,
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddressPair {
    pub token_contract: Address,
    pub dex_contract: Address,
}

pub static NETWORKS: [Network; 5] = [
    Network {
        id: NetworkId::Core,
        display_name: "CORE",
        native_token_symbol: "CORE",
        chain_id: 1116,
        rpc_url: "https://rpc.core.com",
        explorer_url: "https://scan.coredao.org",
    },
    Network {
        id: NetworkId::Xdc,
        display_name: "XDC",
        native_token_symbol: "XDC",
        chain_id: 50,
        rpc_url: "https://rpc.xdc.org",
        explorer_url: "https://xdcscan.io",
    },
    Network {
        id: NetworkId::Tlos,
        display_name: "TLOS",
        native_token_symbol: "TLOS",
        chain_id: 40,
        rpc_url: "https://mainnet.telos.net/evm",
        explorer_url: "https://teloscan.io",
    },
    Network {
        id: NetworkId::Base,
        display_name: "BASE",
        native_token_symbol: "ETH",
        chain_id: 8453,
        rpc_url: "https://mainnet.base.org",
        explorer_url: "https://basescan.org",
    },
    Network {
        id: NetworkId::Neon,
        display_name: "NEON",
        native_token_symbol: "NEON",
        chain_id: 245022934,
        rpc_url: "https://neon-proxy-mainnet.solana.p2p.org",
        explorer_url: "https://neon.blockscout.com",
    },
];

const DEX_CONTRACT: &str = "0x5f16053137B88cAB27315653936c3Ff439d7d8B5";

lazy_static! {
    static ref CONTRACT_ADDRESSES: HashMap<NetworkId, ContractAddressPair> = {
        let dex_contract: Address = DEX_CONTRACT.parse().expect("dex address literal");
        let pair = |token: &str| ContractAddressPair {
            token_contract: token.parse().expect("token address literal"),
            dex_contract,
        };

        let mut m = HashMap::new();
        m.insert(NetworkId::Core, pair("0x743b30c4645612a3a22AaE2b19A051b478B60cCa"));
        m.insert(NetworkId::Xdc, pair("0x32bb1c8Be72bB0e826d02d4905eC09F3DAdD5587"));
        m.insert(NetworkId::Tlos, pair("0x349f961500C274e179a298618198Ea8f88513bfc"));
        m.insert(NetworkId::Base, pair("0x54265cCd283Ad1e3F462eCf93BcbA5Ecc42c56Bd"));
        m.insert(NetworkId::Neon, pair("0x5f09f0443ca2d1395C639657Bca40cB3b6444A20"));
        m
    };
}

/// All supported networks, in selector order.
pub fn list_networks() -> &'static [Network] {
    &NETWORKS
}

pub fn network(id: NetworkId) -> Result<&'static Network, RegistryError> {
    NETWORKS
        .iter()
        .find(|network| network.id == id)
        .ok_or(RegistryError::NotFound(id))
}

/// Token and dex contracts deployed on `id`.
pub fn addresses_for(id: NetworkId) -> Result<ContractAddressPair, RegistryError> {
    CONTRACT_ADDRESSES
        .get(&id)
        .copied()
        .ok_or(RegistryError::NotFound(id))
}
