//! Runs the full counter workflow against the configured network:
//! create, read, increment from a fresh identity, read, set to 10, read.

use helpers::{init_tracing, setup_client, ClientSetup};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let ClientSetup { client, network } = setup_client()?;
    info!(%network, "running counter workflow");

    let report = client.run().await?;

    println!("Counter object: {}", report.counter_id);
    println!("{{ value: {} }}  (after create)", report.initial);
    println!("{{ value: {} }}  (after increment)", report.after_increment);
    println!("{{ value: {} }}  (after set)", report.after_set);
    Ok(())
}
