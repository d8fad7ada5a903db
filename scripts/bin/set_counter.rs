//! Overwrites the value of an existing counter with the primary identity.
//!
//! Usage: `COUNTER_OBJECT_ID=0x... COUNTER_VALUE=42 set_counter`

use anyhow::Context;
use helpers::{config::counter_object_from_env, init_tracing, setup_client, ClientSetup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let counter_id = counter_object_from_env()?;
    let value: u64 = std::env::var("COUNTER_VALUE")
        .context("COUNTER_VALUE is not set")?
        .parse()
        .context("COUNTER_VALUE must be an unsigned integer")?;
    let ClientSetup { client, .. } = setup_client()?;

    client.set_counter_value(&counter_id, value).await?;
    let current = client.get_counter(&counter_id).await?;

    println!("Counter {counter_id}: {{ value: {current} }}");
    Ok(())
}
