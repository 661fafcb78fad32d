//! Signing capability used to authorize transfers.
//!
//! The ledger only ever talks to the [`Signer`] and [`Verifier`] traits. The
//! concrete scheme shipped here is ECDSA over secp256k1: a public identity is
//! the hex-encoded compressed public key, a private key is 32 bytes of hex,
//! and a signature is the 64-byte compact encoding over a SHA-256 digest.

use crate::error::{LedgerError, Result};
use crate::Hash;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use std::fmt;

static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Something that can produce signatures for one public identity.
pub trait Signer {
    fn public_id(&self) -> String;
    fn sign_digest(&self, digest: &Hash) -> Vec<u8>;
}

/// Pure signature check against a public identity string.
pub trait Verifier: Send + Sync {
    fn verify(&self, digest: &Hash, signature: &[u8], public_id: &str) -> bool;
}

#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| LedgerError::Crypto(format!("secret key is not hex: {e}")))?;
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(LedgerError::Crypto(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_SIZE,
                bytes.len()
            )));
        }
        let secret_key = SecretKey::from_slice(&bytes)
            .map_err(|e| LedgerError::Crypto(format!("invalid secret key: {e}")))?;
        Ok(Self::from_secret_key(secret_key))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_id", &self.public_id())
            .finish_non_exhaustive()
    }
}

impl Signer for KeyPair {
    fn public_id(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    fn sign_digest(&self, digest: &Hash) -> Vec<u8> {
        let message = Message::from_digest(*digest);
        SECP256K1_CONTEXT
            .sign_ecdsa(&message, &self.secret_key)
            .serialize_compact()
            .to_vec()
    }
}

/// Returns `(public_id, private_key_hex)` for a fresh random key.
pub fn generate_key_pair() -> (String, String) {
    let pair = KeyPair::generate();
    (pair.public_id(), pair.secret_hex())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl Verifier for EcdsaVerifier {
    fn verify(&self, digest: &Hash, signature: &[u8], public_id: &str) -> bool {
        if signature.len() != COMPACT_SIGNATURE_SIZE {
            return false;
        }
        let Ok(key_bytes) = hex::decode(public_id) else {
            return false;
        };
        let Ok(public_key) = PublicKey::from_slice(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_compact(signature) else {
            return false;
        };
        let message = Message::from_digest(*digest);
        SECP256K1_CONTEXT
            .verify_ecdsa(&message, &signature, &public_key)
            .is_ok()
    }
}
