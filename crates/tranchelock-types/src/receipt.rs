//! Receipt types for the Tranchelock audit trail.
//!
//! Every state change the vault commits (purchase, claim, configuration
//! change) produces a [`Receipt`] whose payload hash can be recomputed
//! independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

use crate::Result;

/// The type of action this receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptKind {
    /// A purchase was swapped and locked in a new tranche.
    Purchased,
    /// Matured tranches were paid out to a principal.
    Claimed,
    /// The lock duration for future purchases changed.
    LockDurationChanged,
    /// Purchases were halted.
    Paused,
    /// Purchases were resumed.
    Unpaused,
    /// A new identity became the authority.
    AuthorityTransferred,
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchased => write!(f, "PURCHASED"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::LockDurationChanged => write!(f, "LOCK_DURATION_CHANGED"),
            Self::Paused => write!(f, "PAUSED"),
            Self::Unpaused => write!(f, "UNPAUSED"),
            Self::AuthorityTransferred => write!(f, "AUTHORITY_TRANSFERRED"),
        }
    }
}

/// An entry in the vault's append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// What kind of action this receipt proves.
    pub kind: ReceiptKind,
    /// Position in the audit trail, starting at 0.
    pub sequence: u64,
    /// JSON-encoded action details.
    pub payload: Vec<u8>,
    /// SHA-256 hash of the payload.
    pub payload_hash: [u8; 32],
    /// When the action was committed.
    pub recorded_at: DateTime<Utc>,
}

impl Receipt {
    /// Serialize `payload` and commit to it.
    pub fn new<T: Serialize>(
        kind: ReceiptKind,
        sequence: u64,
        payload: &T,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self> {
        let payload = serde_json::to_vec(payload)?;
        let payload_hash = Self::hash(&payload);
        Ok(Self {
            kind,
            sequence,
            payload,
            payload_hash,
            recorded_at,
        })
    }

    fn hash(payload: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"tranchelock:receipt:v1:");
        hasher.update(payload);
        hasher.finalize().into()
    }

    /// Recompute the payload hash and compare.
    #[must_use]
    pub fn verify(&self) -> bool {
        Self::hash(&self.payload) == self.payload_hash
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.payload_hash)
    }

    /// Decode the payload back into its typed form.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}
