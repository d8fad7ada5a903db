//! Client for the `counter` Move module: create, read, increment and set.

use std::{collections::HashMap, sync::Mutex};

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::{
    config::PollConfig,
    error::{Error, Result},
    identity::Identity,
    ids::ObjectId,
    ledger::{
        CallArg, ExecutionStatus, Faucet, LedgerClient, MoveCall, ObjectContent, ObjectState,
        TransactionResult,
    },
    sui_rpc::json_u64,
};

pub const COUNTER_MODULE: &str = "counter";
pub const COUNTER_STRUCT: &str = "Counter";

/// Value the workflow overwrites the counter with.
pub const WORKFLOW_SET_VALUE: u64 = 10;

/// Values observed during one run of the workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowReport {
    pub counter_id: ObjectId,
    pub initial: u64,
    pub after_increment: u64,
    pub after_set: u64,
}

/// Drives the counter contract on behalf of a primary identity.
pub struct CounterClient<L, F> {
    ledger: L,
    faucet: F,
    primary: Identity,
    package: ObjectId,
    /// Package named in the `Counter` type, the original one if `package` is an upgrade.
    type_origin: ObjectId,
    poll: PollConfig,
    /// Highest version our own transactions produced, per object.
    written_versions: Mutex<HashMap<ObjectId, u64>>,
}

impl<L: LedgerClient, F: Faucet> CounterClient<L, F> {
    pub fn new(
        ledger: L,
        faucet: F,
        primary: Identity,
        package: ObjectId,
        poll: PollConfig,
    ) -> Self {
        Self {
            ledger,
            faucet,
            primary,
            package,
            type_origin: package,
            poll,
            written_versions: Mutex::new(HashMap::new()),
        }
    }

    /// Checks counter types against `origin` instead of the called package.
    pub fn with_type_origin(mut self, origin: ObjectId) -> Self {
        self.type_origin = origin;
        self
    }

    pub fn primary(&self) -> &Identity {
        &self.primary
    }

    fn call(&self, function: &str, arguments: Vec<CallArg>) -> MoveCall {
        MoveCall::new(self.package, COUNTER_MODULE, function, arguments)
    }

    async fn execute(&self, signer: &Identity, call: MoveCall) -> Result<TransactionResult> {
        let result = self.ledger.move_call(signer, call).await?;
        if let ExecutionStatus::Failure(reason) = &result.status {
            return Err(Error::TransactionFailed {
                digest: result.digest.clone(),
                reason: reason.clone(),
            });
        }
        self.record_writes(&result);
        Ok(result)
    }

    fn record_writes(&self, result: &TransactionResult) {
        let mut versions = self
            .written_versions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for object in result.written() {
            let version = versions.entry(object.object_id).or_default();
            *version = (*version).max(object.version);
        }
    }

    fn expected_version(&self, id: &ObjectId) -> u64 {
        self.written_versions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// Creates a counter owned by the primary identity and returns its id.
    pub async fn create_counter(&self) -> Result<ObjectId> {
        let result = self.execute(&self.primary, self.call("create", vec![])).await?;
        let id = result.first_created().ok_or_else(|| Error::NoCreatedObject {
            digest: result.digest.clone(),
        })?;
        info!(counter = %id, digest = %result.digest, "counter created");
        Ok(id)
    }

    /// Reads the counter value, waiting for the node to serve our latest write.
    pub async fn get_counter(&self, id: &ObjectId) -> Result<u64> {
        let object = self.wait_for_object(id).await?;
        self.counter_value(object)
    }

    /// Increments the counter from a freshly generated, faucet-funded identity.
    pub async fn increment_counter(&self, id: &ObjectId) -> Result<ObjectId> {
        let sender = Identity::generate();
        info!(sender = %sender.address(), "funding ephemeral sender");
        let coins = self.faucet.request_funds(&sender.address()).await?;
        match coins.first() {
            Some(coin) => {
                self.wait_for_object(coin).await?;
                debug!(%coin, "gas coin visible to the node");
            }
            None => debug!(sender = %sender.address(), "faucet reported no coin ids"),
        }

        let result = self
            .execute(&sender, self.call("increment", vec![CallArg::Object(*id)]))
            .await?;
        info!(counter = %id, digest = %result.digest, "counter incremented");
        Ok(*id)
    }

    /// Overwrites the counter value; the contract only accepts this from the creator.
    pub async fn set_counter_value(&self, id: &ObjectId, value: u64) -> Result<ObjectId> {
        let call = self.call("set_value", vec![CallArg::Object(*id), CallArg::U64(value)]);
        let result = self.execute(&self.primary, call).await?;
        info!(counter = %id, value, digest = %result.digest, "counter value set");
        Ok(*id)
    }

    /// Runs create, read, increment, read, set, read; stops at the first error.
    pub async fn run(&self) -> Result<WorkflowReport> {
        info!("Creating a counter....");
        let counter_id = self.create_counter().await?;

        info!("Getting the counter....");
        let initial = self.get_counter(&counter_id).await?;

        info!("Incrementing the counter....");
        self.increment_counter(&counter_id).await?;

        info!("Getting the counter....");
        let after_increment = self.get_counter(&counter_id).await?;

        info!("Setting the counter value....");
        self.set_counter_value(&counter_id, WORKFLOW_SET_VALUE).await?;

        info!("Getting the counter....");
        let after_set = self.get_counter(&counter_id).await?;

        Ok(WorkflowReport {
            counter_id,
            initial,
            after_increment,
            after_set,
        })
    }

    async fn wait_for_object(&self, id: &ObjectId) -> Result<ObjectState> {
        let expected = self.expected_version(id);
        let deadline = Instant::now() + self.poll.deadline;
        let mut delay = self.poll.initial_delay;
        let mut last_seen = None;

        loop {
            match self.ledger.get_object(id).await? {
                Some(object) if object.version >= expected => return Ok(object),
                Some(object) => {
                    debug!(object = %id, seen = object.version, expected, "object not caught up");
                    last_seen = Some(object.version);
                }
                None => debug!(object = %id, "object not visible yet"),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(object = %id, "gave up waiting for object");
                return Err(match last_seen {
                    Some(seen) => Error::StaleObject {
                        id: *id,
                        seen,
                        expected,
                    },
                    None => Error::ObjectNotFound(*id),
                });
            }
            sleep(delay.min(deadline - now)).await;
            delay = self.poll.next_delay(delay);
        }
    }

    fn is_counter_type(&self, type_: &str) -> bool {
        let mut parts = type_.splitn(3, "::");
        let package = parts.next().and_then(|address| address.parse::<ObjectId>().ok());
        package == Some(self.type_origin)
            && parts.next() == Some(COUNTER_MODULE)
            && parts.next() == Some(COUNTER_STRUCT)
    }

    fn counter_value(&self, object: ObjectState) -> Result<u64> {
        let id = object.object_id;
        match object.content {
            ObjectContent::MoveObject { type_, fields } if self.is_counter_type(&type_) => {
                json_u64(&fields["value"]).ok_or(Error::MissingField { id, field: "value" })
            }
            ObjectContent::MoveObject { type_, .. } => {
                Err(Error::UnexpectedContent { id, found: type_ })
            }
            ObjectContent::Package => Err(Error::UnexpectedContent {
                id,
                found: "package".to_string(),
            }),
        }
    }
}
