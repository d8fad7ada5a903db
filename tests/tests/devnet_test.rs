//! Runs against the live network named by the environment; needs `PRIVATE_KEY`
//! for a funded account. Run with `cargo test -p tests -- --ignored`.

use helpers::{setup_client, ClientSetup};

#[tokio::test]
#[ignore = "needs a funded PRIVATE_KEY and network access"]
async fn test_counter_workflow_on_network() -> anyhow::Result<()> {
    let ClientSetup { client, network } = setup_client()?;
    println!("Running against {network}");

    let report = client.run().await?;

    assert_eq!(report.initial, 0, "Fresh counter does not start at 0");
    assert_eq!(report.after_increment, 1, "Count value is not equal to 1");
    assert_eq!(report.after_set, 10, "Count value is not equal to 10");
    println!("Test passed!");
    Ok(())
}

#[tokio::test]
#[ignore = "needs a funded PRIVATE_KEY and network access"]
async fn test_missing_object_on_network() -> anyhow::Result<()> {
    let ClientSetup { client, .. } = setup_client()?;
    let missing = tests::random_object_id();

    let error = client.get_counter(&missing).await.unwrap_err();

    assert!(matches!(error, helpers::Error::ObjectNotFound(_)), "{error}");
    Ok(())
}
