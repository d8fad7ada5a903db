//! The ledger and faucet seams the counter client is written against.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::Result,
    identity::Identity,
    ids::{ObjectId, SuiAddress},
};

/// An argument to a Move entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallArg {
    Object(ObjectId),
    U64(u64),
}

impl CallArg {
    /// JSON form accepted by the full node's transaction builder.
    pub fn to_json(&self) -> Value {
        match self {
            CallArg::Object(id) => json!(id.to_string()),
            CallArg::U64(value) => json!(value.to_string()),
        }
    }
}

/// A call to `package::module::function(arguments)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    pub fn new(package: ObjectId, module: &str, function: &str, arguments: Vec<CallArg>) -> Self {
        Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
            arguments,
        }
    }

    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// An object id together with the version a transaction left it at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure(String),
}

/// The effects of an executed transaction that the client cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionResult {
    pub digest: String,
    pub status: ExecutionStatus,
    pub created: Vec<ObjectRef>,
    pub mutated: Vec<ObjectRef>,
}

impl TransactionResult {
    pub fn first_created(&self) -> Option<ObjectId> {
        self.created.first().map(|object| object.object_id)
    }

    /// Every object this transaction wrote, created or mutated.
    pub fn written(&self) -> impl Iterator<Item = &ObjectRef> {
        self.created.iter().chain(self.mutated.iter())
    }
}

/// Decoded content of a fetched object.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectContent {
    MoveObject { type_: String, fields: Value },
    Package,
}

/// An object as served by a full node.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectState {
    pub object_id: ObjectId,
    pub version: u64,
    pub owner: Option<Value>,
    pub content: ObjectContent,
}

/// Submits calls to and reads objects from a ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Builds, signs with `signer`, and executes a single Move call.
    async fn move_call(&self, signer: &Identity, call: MoveCall) -> Result<TransactionResult>;

    /// Fetches an object, `None` if the ledger does not know it.
    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectState>>;
}

/// Grants test funds to an address.
#[async_trait]
pub trait Faucet: Send + Sync {
    /// Returns the ids of the gas coins transferred to `recipient`.
    async fn request_funds(&self, recipient: &SuiAddress) -> Result<Vec<ObjectId>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_use_the_builder_json_form() {
        let id: ObjectId = "0x5".parse().unwrap();
        assert_eq!(CallArg::Object(id).to_json(), json!(id.to_string()));
        assert_eq!(CallArg::U64(10).to_json(), json!("10"));
    }

    #[test]
    fn target_is_fully_qualified() {
        let call = MoveCall::new("0x2".parse().unwrap(), "counter", "create", vec![]);
        assert_eq!(
            call.target(),
            "0x0000000000000000000000000000000000000000000000000000000000000002::counter::create"
        );
    }
}
