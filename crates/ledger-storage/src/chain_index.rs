//! Hash <-> height mapping and chain growth.
//!
//! Callers hold the store lock; nothing here synchronizes on its own.

use crate::error::{StoreError, StoreResult};
use crate::keys;
use crate::record_store::RecordStore;
use ledger_core::{Hash, Height, Tip};
use tracing::{debug, trace};

pub fn height_of(records: &RecordStore, hash: &Hash) -> StoreResult<Height> {
    let key = keys::hash_key(hash);
    match records.get(&key)? {
        Some(value) => keys::decode_height(&key, &value),
        None => {
            trace!(hash = %hex::encode(hash), "hash not indexed");
            Err(StoreError::HashNotFound(*hash))
        }
    }
}

pub fn record_at(records: &RecordStore, height: Height) -> StoreResult<(Hash, Vec<u8>)> {
    let key = keys::height_key(height);
    match records.get(&key)? {
        Some(value) => keys::decode_record(&key, &value),
        None => {
            trace!(height, "height not indexed");
            Err(StoreError::HeightNotFound(height))
        }
    }
}

pub fn hash_at(records: &RecordStore, height: Height) -> StoreResult<Hash> {
    let key = keys::height_key(height);
    match records.get(&key)? {
        Some(value) => keys::decode_record_hash(&key, &value),
        None => {
            trace!(height, "height not indexed");
            Err(StoreError::HeightNotFound(height))
        }
    }
}

/// Follows the hash entry to its height entry and checks the two agree.
pub fn record_by_hash(records: &RecordStore, hash: &Hash) -> StoreResult<(Vec<u8>, Height)> {
    let height = height_of(records, hash)?;
    let (stored, record) = match record_at(records, height) {
        Ok(found) => found,
        Err(StoreError::HeightNotFound(_)) => {
            return Err(StoreError::corruption(
                &keys::hash_key(hash),
                format!("indexed at height {height} but that height is empty"),
            ))
        }
        Err(e) => return Err(e),
    };
    if stored != *hash {
        return Err(StoreError::corruption(
            &keys::height_key(height),
            format!("holds {} instead of {}", hex::encode(stored), hex::encode(hash)),
        ));
    }
    Ok((record, height))
}

/// Validates linkage against `tip`, then stages both index entries for the
/// new block in the pending batch. Nothing is staged on error.
pub fn assign_and_insert(
    records: &mut RecordStore,
    tip: Tip,
    hash: &Hash,
    prev_hash: &Hash,
    record: &[u8],
) -> StoreResult<Height> {
    match height_of(records, hash) {
        Ok(_) => return Err(StoreError::Duplicate(*hash)),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    let height = match height_of(records, prev_hash) {
        Ok(prev_height) => {
            if prev_height != tip.height() {
                return Err(StoreError::Fork {
                    prev_height,
                    tip_height: tip.height(),
                });
            }
            prev_height + 1
        }
        Err(e) if e.is_not_found() => {
            if tip.next_height() != 0 {
                return Err(StoreError::BrokenChain(*prev_hash));
            }
            0
        }
        Err(e) => return Err(e),
    };

    records.stage_put(&keys::hash_key(hash), keys::encode_height(height).to_vec());
    records.stage_put(&keys::height_key(height), keys::encode_record(hash, record));
    debug!(height, hash = %hex::encode(hash), bytes = record.len(), "staged block");
    Ok(height)
}
