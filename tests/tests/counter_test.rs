use helpers::{CounterClient, Error, Identity, ObjectId};
use tests::{fast_poll, random_object_id, DryFaucet, InMemoryLedger, GAS_COIN_TYPE};

fn package() -> ObjectId {
    "0xa51d89641ccc2b72aba0fb4cdfcae9ac4a674a9c2c1a66e897ff3d0748e78daa"
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_workflow_reports_each_step() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());

    let report = client.run().await?;

    assert_eq!(report.initial, 0);
    assert_eq!(report.after_increment, 1);
    assert_eq!(report.after_set, 10);
    assert_eq!(ledger.committed_value(&report.counter_id), Some(10));
    Ok(())
}

#[tokio::test]
async fn test_fresh_counter_reads_zero() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());

    let counter_id = client.create_counter().await?;

    assert_ne!(counter_id, ObjectId::new([0; 32]));
    assert_eq!(client.get_counter(&counter_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_increment_count() -> anyhow::Result<()> {
    // The counter is created by the primary identity but incremented by a fresh one
    let ledger = InMemoryLedger::new(package());
    let primary = Identity::generate();
    let client = ledger.client(primary.clone());

    let counter_id = client.create_counter().await?;
    assert_eq!(client.get_counter(&counter_id).await?, 0);

    let returned = client.increment_counter(&counter_id).await?;
    assert_eq!(returned, counter_id);
    assert_eq!(client.get_counter(&counter_id).await?, 1);

    let senders = ledger.senders();
    assert_eq!(senders.len(), 2);
    assert_eq!(senders[0], primary.address());
    assert_ne!(senders[1], primary.address());
    assert_eq!(ledger.owner_of(&counter_id), Some(primary.address()));
    Ok(())
}

#[tokio::test]
async fn test_set_value_overrides_any_previous_value() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());

    let counter_id = client.create_counter().await?;
    for _ in 0..3 {
        client.increment_counter(&counter_id).await?;
    }
    assert_eq!(client.get_counter(&counter_id).await?, 3);

    client.set_counter_value(&counter_id, 10).await?;
    assert_eq!(client.get_counter(&counter_id).await?, 10);
    Ok(())
}

#[tokio::test]
async fn test_set_value_is_restricted_to_the_creator() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let creator = ledger.client(Identity::generate());
    let stranger = ledger.client(Identity::generate());

    let counter_id = creator.create_counter().await?;
    let error = stranger
        .set_counter_value(&counter_id, 99)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::TransactionFailed { .. }), "{error}");
    assert_eq!(creator.get_counter(&counter_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_reads_wait_for_a_lagging_node() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    ledger.set_read_lag(3);
    let client = ledger.client(Identity::generate());

    let counter_id = client.create_counter().await?;
    assert_eq!(client.get_counter(&counter_id).await?, 0);

    client.increment_counter(&counter_id).await?;
    // The node still serves version 1 for a few reads; the client must not report 0.
    assert_eq!(client.get_counter(&counter_id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_stale_reads_give_up_at_the_deadline() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());

    let counter_id = client.create_counter().await?;
    assert_eq!(client.get_counter(&counter_id).await?, 0);

    ledger.set_read_lag(u32::MAX);
    client.increment_counter(&counter_id).await?;

    let error = client.get_counter(&counter_id).await.unwrap_err();
    assert!(
        matches!(error, Error::StaleObject { seen: 1, expected: 2, .. }),
        "{error}"
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_counter_is_not_found() {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());
    let missing = random_object_id();

    let error = client.get_counter(&missing).await.unwrap_err();

    assert!(matches!(error, Error::ObjectNotFound(id) if id == missing), "{error}");
}

#[tokio::test]
async fn test_missing_created_object_aborts_the_workflow() {
    let ledger = InMemoryLedger::new(package());
    ledger.omit_created_objects(true);
    let client = ledger.client(Identity::generate());

    let error = client.run().await.unwrap_err();

    assert!(matches!(error, Error::NoCreatedObject { .. }), "{error}");
    // Nothing after the failed create was attempted.
    assert_eq!(ledger.senders().len(), 1);
}

#[tokio::test]
async fn test_other_object_types_are_rejected() {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());
    let coin = random_object_id();
    ledger.insert_object(coin, GAS_COIN_TYPE, client.primary().address());

    let error = client.get_counter(&coin).await.unwrap_err();

    assert!(
        matches!(error, Error::UnexpectedContent { ref found, .. } if found.contains("coin::Coin")),
        "{error}"
    );
}

#[tokio::test]
async fn test_faucet_failure_stops_the_increment() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let client = ledger.client(Identity::generate());
    let counter_id = client.create_counter().await?;

    ledger.set_faucet_down(true);
    let error = client.increment_counter(&counter_id).await.unwrap_err();

    assert!(matches!(error, Error::Faucet(_)), "{error}");
    assert_eq!(ledger.committed_value(&counter_id), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_increment_waits_for_faucet_coin() -> anyhow::Result<()> {
    // The faucet's coin only shows up on the node after a few reads; submitting
    // before that would find no gas for the fresh sender.
    let ledger = InMemoryLedger::new(package());
    ledger.set_funding_lag(3);
    let client = ledger.client(Identity::generate());

    let counter_id = client.create_counter().await?;
    client.increment_counter(&counter_id).await?;

    assert_eq!(client.get_counter(&counter_id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_invisible_faucet_coin_stops_the_increment() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    ledger.set_funding_lag(u32::MAX);
    let client = ledger.client(Identity::generate());
    let counter_id = client.create_counter().await?;

    let error = client.increment_counter(&counter_id).await.unwrap_err();

    assert!(matches!(error, Error::ObjectNotFound(coin) if coin != counter_id), "{error}");
    assert_eq!(ledger.senders().len(), 1);
    assert_eq!(ledger.committed_value(&counter_id), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_upgraded_package_reads_use_the_type_origin() -> anyhow::Result<()> {
    let original = random_object_id();
    let upgraded = random_object_id();
    let ledger = InMemoryLedger::new(upgraded).with_type_origin(original);

    let client = ledger.client(Identity::generate()).with_type_origin(original);
    let counter_id = client.create_counter().await?;
    assert_eq!(client.get_counter(&counter_id).await?, 0);

    let unaware = ledger.client(Identity::generate());
    let error = unaware.get_counter(&counter_id).await.unwrap_err();
    assert!(matches!(error, Error::UnexpectedContent { .. }), "{error}");
    Ok(())
}

#[tokio::test]
async fn test_increment_needs_a_funded_sender() -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(package());
    let primary = Identity::generate();
    ledger.fund(primary.address());
    let client = CounterClient::new(ledger.clone(), DryFaucet, primary, package(), fast_poll());

    let counter_id = client.create_counter().await?;
    let error = client.increment_counter(&counter_id).await.unwrap_err();

    assert!(matches!(error, Error::Rpc { .. }), "{error}");
    assert_eq!(ledger.committed_value(&counter_id), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_wrong_package_is_rejected_by_the_ledger() {
    let ledger = InMemoryLedger::new(package());
    let primary = Identity::generate();
    ledger.fund(primary.address());
    let client = CounterClient::new(
        ledger.clone(),
        ledger.clone(),
        primary,
        random_object_id(),
        fast_poll(),
    );

    let error = client.create_counter().await.unwrap_err();

    assert!(matches!(error, Error::Rpc { .. }), "{error}");
}
