//! Client for the test-network gas faucet.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{Error, Result},
    ids::{ObjectId, SuiAddress},
    ledger::Faucet,
    sui_rpc::{http_client, truncate_body},
};

/// A faucet host that can be asked for gas.
#[derive(Debug, Clone)]
pub struct SuiFaucet {
    http: reqwest::Client,
    url: String,
}

impl SuiFaucet {
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            url: host.into(),
        })
    }

    fn gas_endpoint(&self) -> String {
        format!("{}/gas", self.url.trim_end_matches('/'))
    }
}

fn gas_request(recipient: &SuiAddress) -> Value {
    json!({ "FixedAmountRequest": { "recipient": recipient } })
}

/// Checks the faucet's answer, which reports problems in an `error` field,
/// and collects the ids of the coins it transferred.
fn check_gas_response(body: &Value) -> Result<Vec<ObjectId>> {
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        return Err(Error::Faucet(
            error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string()),
        ));
    }
    let Some(coins) = body["transferredGasObjects"].as_array() else {
        return Ok(vec![]);
    };
    coins
        .iter()
        .map(|coin| {
            coin["id"]
                .as_str()
                .ok_or_else(|| Error::Faucet(format!("transferred coin without an id: {coin}")))?
                .parse::<ObjectId>()
        })
        .collect()
}

#[async_trait]
impl Faucet for SuiFaucet {
    async fn request_funds(&self, recipient: &SuiAddress) -> Result<Vec<ObjectId>> {
        let response = self
            .http
            .post(self.gas_endpoint())
            .json(&gas_request(recipient))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Faucet(format!(
                "rate limited by {}, try again later",
                self.url
            )));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|error| format!("Could not get response text: {error}"));
            return Err(Error::Faucet(format!("{status}: {}", truncate_body(&text))));
        }

        let body: Value = response.json().await?;
        let coins = check_gas_response(&body)?;
        info!(%recipient, coins = coins.len(), "faucet funded address");
        Ok(coins)
    }
}
