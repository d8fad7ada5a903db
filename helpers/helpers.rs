//! Common helper functions for the counter scripts and tests

pub mod config;
pub mod counter;
pub mod error;
pub mod faucet;
pub mod identity;
pub mod ids;
pub mod ledger;
pub mod sui_rpc;

pub use config::{ClientConfig, Network, PollConfig};
pub use counter::{CounterClient, WorkflowReport};
pub use error::{ConfigError, Error, Result};
pub use faucet::SuiFaucet;
pub use identity::Identity;
pub use ids::{ObjectId, SuiAddress};
pub use ledger::{Faucet, LedgerClient};
pub use sui_rpc::SuiRpcClient;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Counter client wired to a live network.
pub type NetworkCounterClient = CounterClient<SuiRpcClient, SuiFaucet>;

/// Script setup configuration
pub struct ClientSetup {
    pub client: NetworkCounterClient,
    pub network: Network,
}

/// Installs the `tracing` subscriber used by the scripts, `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a network client from an already validated configuration
pub fn setup_client_with(config: ClientConfig) -> Result<ClientSetup> {
    let ledger = SuiRpcClient::new(&config.rpc_url, config.gas_budget)?;
    let faucet = SuiFaucet::new(&config.faucet_url)?;

    info!(
        network = %config.network,
        rpc = %config.rpc_url,
        signer = %config.primary.address(),
        "client configured"
    );

    let client = CounterClient::new(
        ledger,
        faucet,
        config.primary,
        config.package_id,
        config.poll,
    )
    .with_type_origin(config.type_origin);
    Ok(ClientSetup {
        client,
        network: config.network,
    })
}

/// Load the configuration from the environment and build a network client
pub fn setup_client() -> Result<ClientSetup> {
    let config = ClientConfig::from_env()?;
    setup_client_with(config)
}
