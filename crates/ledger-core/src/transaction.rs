use crate::constants::COINBASE_SENDER;
use crate::crypto::{Signer, Verifier};
use crate::error::{LedgerError, Result};
use crate::{sha256, Hash};
use serde::{Deserialize, Serialize};

/// A transfer of `amount` from `from` to `to`. An empty `from` marks a coinbase mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: u64,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,
}

impl Transaction {
    pub fn new(amount: u64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
            signature: None,
        }
    }

    pub fn coinbase(amount: u64, to: impl Into<String>) -> Self {
        Self::new(amount, COINBASE_SENDER, to)
    }

    pub fn is_coinbase(&self) -> bool {
        self.from == COINBASE_SENDER
    }

    /// Raw SHA-256 of `amount ++ from ++ to`; this is what gets signed.
    pub fn digest(&self) -> Hash {
        sha256(&format!("{}{}{}", self.amount, self.from, self.to))
    }

    pub fn compute_hash(&self) -> String {
        hex::encode(self.digest())
    }

    /// Signs the transaction. Only the key owning `from` may sign; on mismatch
    /// the existing signature is left untouched.
    pub fn sign<S: Signer + ?Sized>(&mut self, signer: &S) -> Result<()> {
        let signer_id = signer.public_id();
        if signer_id != self.from {
            return Err(LedgerError::Authorization {
                signer: signer_id,
                from: self.from.clone(),
            });
        }
        self.signature = Some(signer.sign_digest(&self.digest()));
        Ok(())
    }

    pub fn is_signature_valid<V: Verifier + ?Sized>(&self, verifier: &V) -> bool {
        if self.is_coinbase() {
            return true;
        }
        match &self.signature {
            Some(sig) => verifier.verify(&self.digest(), sig, &self.from),
            None => false,
        }
    }
}
