//! Increments an existing counter from a freshly funded identity.
//!
//! Expects `COUNTER_OBJECT_ID` next to the usual client configuration.

use helpers::{config::counter_object_from_env, init_tracing, setup_client, ClientSetup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let counter_id = counter_object_from_env()?;
    let ClientSetup { client, .. } = setup_client()?;

    let before = client.get_counter(&counter_id).await?;
    client.increment_counter(&counter_id).await?;
    let after = client.get_counter(&counter_id).await?;

    println!("Counter {counter_id}: {before} -> {after}");
    Ok(())
}
