//! Ed25519 identities able to authorize Sui transactions.

use base64::{engine::general_purpose, Engine as _};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use rand::RngCore;

use crate::{error::ConfigError, ids::SuiAddress};

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag Sui prefixes to Ed25519 keys and signatures.
pub const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for a transaction: scope `TransactionData`, version 0, app id `Sui`.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// A key pair together with the Sui address it controls.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
    address: SuiAddress,
}

impl Identity {
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update([ED25519_FLAG]);
        hasher.update(signing_key.verifying_key().as_bytes());
        let address = SuiAddress::new(hasher.finalize().into());
        Self {
            signing_key,
            address,
        }
    }

    /// Loads an identity from a base64 secret whose first byte is the scheme flag.
    pub fn from_base64_secret(encoded: &str) -> Result<Self, ConfigError> {
        let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
        let (flag, secret) = bytes.split_first().ok_or(ConfigError::KeyLength(0))?;
        if *flag != ED25519_FLAG {
            return Err(ConfigError::UnsupportedScheme(*flag));
        }
        let secret: [u8; SECRET_KEY_LENGTH] = secret
            .try_into()
            .map_err(|_| ConfigError::KeyLength(secret.len()))?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&secret)))
    }

    /// Generates a fresh identity from the thread-local RNG.
    pub fn generate() -> Self {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        rand::rng().fill_bytes(&mut seed);
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    pub fn address(&self) -> SuiAddress {
        self.address
    }

    /// Encodes the secret in the same flagged base64 form it is loaded from.
    pub fn to_base64_secret(&self) -> String {
        let mut bytes = Vec::with_capacity(1 + SECRET_KEY_LENGTH);
        bytes.push(ED25519_FLAG);
        bytes.extend_from_slice(self.signing_key.as_bytes());
        general_purpose::STANDARD.encode(bytes)
    }

    /// Signs BCS transaction bytes and returns the serialized signature,
    /// `flag || signature || public key`, base64 encoded.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = transaction_digest(tx_bytes);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        general_purpose::STANDARD.encode(serialized)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// The message an Ed25519 signer actually signs: the Blake2b-256 hash of the intent message.
fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    hasher.finalize().into()
}
