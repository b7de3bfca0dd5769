use ledger_core::{Hash, Height};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("block {} not found", hex::encode(.0))]
    HashNotFound(Hash),

    #[error("no block at height {0}")]
    HeightNotFound(Height),

    /// A persisted entry exists but does not decode to its expected shape.
    #[error("db corrupt at {key}: {reason}")]
    Corruption { key: String, reason: String },

    /// The declared predecessor is unknown and the chain is not empty.
    #[error("previous block {} is missing", hex::encode(.0))]
    BrokenChain(Hash),

    #[error("previous block is at height {prev_height} but the tip is at {tip_height}")]
    Fork { prev_height: Height, tip_height: Height },

    #[error("block {} is already stored", hex::encode(.0))]
    Duplicate(Hash),

    #[error("block encoding: {0}")]
    Encode(ledger_core::CodecError),

    #[error("sled: {0}")]
    Backend(#[from] sled::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::HashNotFound(_) | StoreError::HeightNotFound(_))
    }

    pub(crate) fn corruption(key: &[u8], reason: impl Into<String>) -> Self {
        StoreError::Corruption {
            key: hex::encode(key),
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
