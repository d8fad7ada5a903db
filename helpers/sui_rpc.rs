//! Sui full-node JSON-RPC implementation of [`LedgerClient`].

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    identity::Identity,
    ids::{ObjectId, SuiAddress},
    ledger::{
        ExecutionStatus, LedgerClient, MoveCall, ObjectContent, ObjectRef, ObjectState,
        TransactionResult,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by the ledger and faucet clients.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::ClientBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Shortens a response body for error messages.
pub(crate) fn truncate_body(input: &str) -> String {
    let max_len = 200;
    match input.char_indices().nth(max_len) {
        Some((end, _)) => format!("{} ...", &input[..end]),
        None => input.to_string(),
    }
}

/// Reads a `u64` that Sui may render either as a JSON number or a decimal string.
pub fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn deserialize_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    json_u64(&value).ok_or_else(|| serde::de::Error::custom(format!("not a u64: {value}")))
}

pub struct SuiRpcClient {
    http: reqwest::Client,
    url: String,
    gas_budget: u64,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>, gas_budget: u64) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            url: url.into(),
            gas_budget,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "sending JSON-RPC request");
        let response = self
            .http
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        decode_http_reply(method, status, &body)
    }
}

/// Parameters of `unsafe_moveCall`: signer, package, module, function, type
/// arguments, arguments, gas coin (chosen by the node) and gas budget.
fn move_call_params(signer: &SuiAddress, call: &MoveCall, gas_budget: u64) -> Value {
    let arguments: Vec<Value> = call.arguments.iter().map(|arg| arg.to_json()).collect();
    json!([
        signer,
        call.package,
        call.module,
        call.function,
        [],
        arguments,
        null,
        gas_budget.to_string(),
    ])
}

fn execute_params(tx_bytes: &str, signature: &str) -> Value {
    json!([
        tx_bytes,
        [signature],
        { "showEffects": true, "showEvents": true },
        "WaitForLocalExecution",
    ])
}

fn get_object_params(id: &ObjectId) -> Value {
    json!([id, { "showContent": true, "showOwner": true, "showType": true }])
}

/// Decodes an HTTP reply, preferring a JSON-RPC envelope over the HTTP status
/// so that node errors keep their message.
fn decode_http_reply<T: DeserializeOwned>(
    method: &'static str,
    status: StatusCode,
    body: &str,
) -> Result<T> {
    let envelope = serde_json::from_str::<Value>(body)
        .ok()
        .filter(|value| value.get("result").is_some() || value.get("error").is_some());
    match envelope {
        Some(envelope) => decode_rpc_response(method, envelope),
        None if !status.is_success() => Err(Error::HttpStatus {
            method,
            status: status.as_u16(),
            body: truncate_body(body),
        }),
        None => Err(Error::MalformedResponse {
            method,
            reason: format!("not a JSON-RPC reply: {}", truncate_body(body)),
        }),
    }
}

/// Unwraps a JSON-RPC envelope into its `result`, or the error it carries.
fn decode_rpc_response<T: DeserializeOwned>(
    method: &'static str,
    mut response: Value,
) -> Result<T> {
    if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
        return Err(Error::Rpc {
            method,
            code: error["code"].as_i64().unwrap_or_default(),
            message: error["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        });
    }
    match response.get_mut("result") {
        Some(result) => serde_json::from_value(result.take()).map_err(|error| {
            Error::MalformedResponse {
                method,
                reason: error.to_string(),
            }
        }),
        None => Err(Error::MalformedResponse {
            method,
            reason: "missing `result`".to_string(),
        }),
    }
}

#[derive(Deserialize)]
struct TransactionBlockBytes {
    #[serde(rename = "txBytes")]
    tx_bytes: String,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    digest: String,
    effects: Option<EffectsJson>,
}

#[derive(Deserialize)]
struct EffectsJson {
    status: StatusJson,
    #[serde(default)]
    created: Vec<OwnedObjectRefJson>,
    #[serde(default)]
    mutated: Vec<OwnedObjectRefJson>,
}

#[derive(Deserialize)]
struct StatusJson {
    status: String,
    error: Option<String>,
}

#[derive(Deserialize)]
struct OwnedObjectRefJson {
    reference: ObjectRefJson,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectRefJson {
    object_id: ObjectId,
    #[serde(deserialize_with = "deserialize_u64")]
    version: u64,
}

impl From<OwnedObjectRefJson> for ObjectRef {
    fn from(owned: OwnedObjectRefJson) -> Self {
        ObjectRef {
            object_id: owned.reference.object_id,
            version: owned.reference.version,
        }
    }
}

impl TryFrom<ExecuteResponse> for TransactionResult {
    type Error = Error;

    fn try_from(response: ExecuteResponse) -> Result<Self> {
        let effects = response.effects.ok_or_else(|| Error::MalformedResponse {
            method: "sui_executeTransactionBlock",
            reason: format!("transaction {} returned no effects", response.digest),
        })?;
        let status = match effects.status.status.as_str() {
            "success" => ExecutionStatus::Success,
            _ => ExecutionStatus::Failure(
                effects
                    .status
                    .error
                    .unwrap_or_else(|| effects.status.status.clone()),
            ),
        };
        Ok(TransactionResult {
            digest: response.digest,
            status,
            created: effects.created.into_iter().map(ObjectRef::from).collect(),
            mutated: effects.mutated.into_iter().map(ObjectRef::from).collect(),
        })
    }
}

#[derive(Deserialize)]
struct GetObjectResponse {
    data: Option<ObjectDataJson>,
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectDataJson {
    object_id: ObjectId,
    #[serde(deserialize_with = "deserialize_u64")]
    version: u64,
    owner: Option<Value>,
    content: Option<Value>,
}

fn decode_object(response: GetObjectResponse) -> Result<Option<ObjectState>> {
    if let Some(error) = response.error {
        return match error["code"].as_str() {
            Some("notExists") | Some("deleted") => Ok(None),
            _ => Err(Error::MalformedResponse {
                method: "sui_getObject",
                reason: error.to_string(),
            }),
        };
    }
    let Some(data) = response.data else {
        return Ok(None);
    };
    let content = data.content.unwrap_or(Value::Null);
    let content = match content["dataType"].as_str() {
        Some("moveObject") => ObjectContent::MoveObject {
            type_: content["type"].as_str().unwrap_or_default().to_string(),
            fields: content["fields"].clone(),
        },
        Some("package") => ObjectContent::Package,
        other => {
            return Err(Error::MalformedResponse {
                method: "sui_getObject",
                reason: format!("unknown content type {other:?} for {}", data.object_id),
            })
        }
    };
    Ok(Some(ObjectState {
        object_id: data.object_id,
        version: data.version,
        owner: data.owner,
        content,
    }))
}

#[async_trait]
impl LedgerClient for SuiRpcClient {
    #[instrument(skip_all, fields(function = %call.target(), signer = %signer.address()))]
    async fn move_call(&self, signer: &Identity, call: MoveCall) -> Result<TransactionResult> {
        let unsigned: TransactionBlockBytes = self
            .call(
                "unsafe_moveCall",
                move_call_params(&signer.address(), &call, self.gas_budget),
            )
            .await?;

        let tx_bytes = general_purpose::STANDARD
            .decode(&unsigned.tx_bytes)
            .map_err(|error| Error::MalformedResponse {
                method: "unsafe_moveCall",
                reason: format!("txBytes is not base64: {error}"),
            })?;
        let signature = signer.sign_transaction(&tx_bytes);

        let executed: ExecuteResponse = self
            .call(
                "sui_executeTransactionBlock",
                execute_params(&unsigned.tx_bytes, &signature),
            )
            .await?;
        let result = TransactionResult::try_from(executed)?;
        debug!(digest = %result.digest, "transaction executed");
        Ok(result)
    }

    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectState>> {
        let response: GetObjectResponse = self
            .call("sui_getObject", get_object_params(id))
            .await?;
        decode_object(response)
    }
}
