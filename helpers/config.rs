//! Client configuration, loaded from the environment and validated up front.

use std::{fmt, str::FromStr, time::Duration};

use crate::{error::ConfigError, identity::Identity, ids::ObjectId};

/// Package of the deployed counter contract on devnet.
pub const DEFAULT_COUNTER_PACKAGE: &str =
    "0xa51d89641ccc2b72aba0fb4cdfcae9ac4a674a9c2c1a66e897ff3d0748e78daa";

/// Gas budget for a single counter call, in MIST.
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Localnet => "localnet",
        }
    }

    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }

    pub fn faucet_host(&self) -> Option<&'static str> {
        match self {
            Network::Devnet => Some("https://faucet.devnet.sui.io"),
            Network::Testnet => Some("https://faucet.testnet.sui.io"),
            Network::Mainnet => None,
            Network::Localnet => Some("http://127.0.0.1:9123"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "localnet" | "local" => Ok(Network::Localnet),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How reads wait for the full node to catch up with our own writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub deadline: Duration,
}

impl PollConfig {
    /// Delay before the attempt following one that waited `previous`.
    pub fn next_delay(&self, previous: Duration) -> Duration {
        previous.saturating_mul(2).min(self.max_delay)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
            deadline: Duration::from_secs(30),
        }
    }
}

/// Everything needed to talk to a network on behalf of the primary identity.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub network: Network,
    pub rpc_url: String,
    pub faucet_url: String,
    /// Package whose entry points are called; after an upgrade this is the latest version.
    pub package_id: ObjectId,
    /// Package that first defined `counter::Counter`. Object types keep naming it across
    /// upgrades, so reads compare against this id.
    pub type_origin: ObjectId,
    pub gas_budget: u64,
    pub primary: Identity,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let primary = var("PRIVATE_KEY")
            .ok_or(ConfigError::MissingVar("PRIVATE_KEY"))
            .and_then(|key| Identity::from_base64_secret(&key))?;

        let network = match var("SUI_NETWORK") {
            Some(name) => name.parse()?,
            None => Network::Devnet,
        };

        let rpc_url = var("SUI_RPC_URL").unwrap_or_else(|| network.fullnode_url().to_string());
        let faucet_url = match var("SUI_FAUCET_URL") {
            Some(url) => url,
            None => network
                .faucet_host()
                .ok_or(ConfigError::NoFaucet(network.name()))?
                .to_string(),
        };

        let package_id = parse_object_id(
            "COUNTER_PACKAGE_ID",
            &var("COUNTER_PACKAGE_ID").unwrap_or_else(|| DEFAULT_COUNTER_PACKAGE.to_string()),
        )?;

        let type_origin = match var("COUNTER_ORIGINAL_PACKAGE_ID") {
            Some(raw) => parse_object_id("COUNTER_ORIGINAL_PACKAGE_ID", &raw)?,
            None => package_id,
        };

        let gas_budget = match var("GAS_BUDGET") {
            Some(budget) => budget
                .trim()
                .parse::<u64>()
                .map_err(|error: std::num::ParseIntError| ConfigError::InvalidVar {
                    name: "GAS_BUDGET",
                    reason: error.to_string(),
                })?,
            None => DEFAULT_GAS_BUDGET,
        };

        Ok(Self {
            network,
            rpc_url,
            faucet_url,
            package_id,
            type_origin,
            gas_budget,
            primary,
            poll: PollConfig::default(),
        })
    }
}

fn parse_object_id(name: &'static str, raw: &str) -> Result<ObjectId, ConfigError> {
    raw.trim()
        .parse::<ObjectId>()
        .map_err(|error: crate::Error| ConfigError::InvalidVar {
            name,
            reason: error.to_string(),
        })
}

/// Reads the id of an existing counter for the single-step scripts.
pub fn counter_object_from_env() -> Result<ObjectId, ConfigError> {
    counter_object_from_lookup(|name| std::env::var(name).ok())
}

pub fn counter_object_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ObjectId, ConfigError> {
    let raw = lookup("COUNTER_OBJECT_ID")
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingVar("COUNTER_OBJECT_ID"))?;
    parse_object_id("COUNTER_OBJECT_ID", &raw)
}
