//! Error types shared by the counter client.

use thiserror::Error;

use crate::ids::ObjectId;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Problems found while loading the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },
    #[error("private key is not valid base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),
    #[error("private key uses signature scheme flag {0:#04x}, only Ed25519 (0x00) is supported")]
    UnsupportedScheme(u8),
    #[error("private key must be 32 bytes after the scheme flag, got {0}")]
    KeyLength(usize),
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),
    #[error("network {0} has no faucet, set SUI_FAUCET_URL")]
    NoFaucet(&'static str),
}

/// Errors returned by ledger, faucet and counter operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC call {method} failed with code {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("{method} returned HTTP {status}: {body}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response to {method}: {reason}")]
    MalformedResponse {
        method: &'static str,
        reason: String,
    },

    #[error("faucet request failed: {0}")]
    Faucet(String),

    #[error("transaction {digest} did not create any object")]
    NoCreatedObject { digest: String },

    #[error("transaction {digest} failed: {reason}")]
    TransactionFailed { digest: String, reason: String },

    #[error("object {0} was not found before the read deadline")]
    ObjectNotFound(ObjectId),

    #[error("object {id} is still at version {seen}, expected at least {expected}")]
    StaleObject {
        id: ObjectId,
        seen: u64,
        expected: u64,
    },

    #[error("object {id} is not a counter: {found}")]
    UnexpectedContent { id: ObjectId, found: String },

    #[error("object {id} has no readable `{field}` field")]
    MissingField { id: ObjectId, field: &'static str },

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
