//! Key and value layout for the `blocks` tree.
//!
//! Both namespaces share one tree and are told apart by their leading byte:
//!
//! | key                         | value                      |
//! |-----------------------------|----------------------------|
//! | `h` ++ hash (33 bytes)      | height, 8 bytes LE         |
//! | `n` ++ height BE (9 bytes)  | hash (32 bytes) ++ record  |

use crate::error::{StoreError, StoreResult};
use ledger_core::constants::{HASH_SIZE, HEIGHT_SIZE};
use ledger_core::{Hash, Height, ZERO_HASH};

pub const HASH_PREFIX: u8 = b'h';
pub const HEIGHT_PREFIX: u8 = b'n';

pub const HASH_KEY_LEN: usize = 1 + HASH_SIZE;
pub const HEIGHT_KEY_LEN: usize = 1 + HEIGHT_SIZE;

pub fn hash_key(hash: &Hash) -> [u8; HASH_KEY_LEN] {
    let mut key = [0u8; HASH_KEY_LEN];
    key[0] = HASH_PREFIX;
    key[1..].copy_from_slice(hash);
    key
}

/// Big-endian so heights sort numerically within the prefix.
pub fn height_key(height: Height) -> [u8; HEIGHT_KEY_LEN] {
    let mut key = [0u8; HEIGHT_KEY_LEN];
    key[0] = HEIGHT_PREFIX;
    key[1..].copy_from_slice(&height.to_be_bytes());
    key
}

pub fn decode_height_key(key: &[u8]) -> StoreResult<Height> {
    if key.len() != HEIGHT_KEY_LEN || key[0] != HEIGHT_PREFIX {
        return Err(StoreError::corruption(key, "not a height key"));
    }
    let mut word = [0u8; HEIGHT_SIZE];
    word.copy_from_slice(&key[1..]);
    Ok(Height::from_be_bytes(word))
}

pub fn encode_height(height: Height) -> [u8; HEIGHT_SIZE] {
    height.to_le_bytes()
}

pub fn decode_height(key: &[u8], value: &[u8]) -> StoreResult<Height> {
    let word: [u8; HEIGHT_SIZE] = value.try_into().map_err(|_| {
        StoreError::corruption(
            key,
            format!("height entry has {} bytes, want {}", value.len(), HEIGHT_SIZE),
        )
    })?;
    Ok(Height::from_le_bytes(word))
}

pub fn encode_record(hash: &Hash, record: &[u8]) -> Vec<u8> {
    let mut value = Vec::with_capacity(HASH_SIZE + record.len());
    value.extend_from_slice(hash);
    value.extend_from_slice(record);
    value
}

/// Splits a height entry into its hash and an owned copy of the record.
pub fn decode_record(key: &[u8], value: &[u8]) -> StoreResult<(Hash, Vec<u8>)> {
    let hash = decode_record_hash(key, value)?;
    Ok((hash, value[HASH_SIZE..].to_vec()))
}

pub fn decode_record_hash(key: &[u8], value: &[u8]) -> StoreResult<Hash> {
    if value.len() < HASH_SIZE {
        return Err(StoreError::corruption(
            key,
            format!("block entry has {} bytes, want at least {}", value.len(), HASH_SIZE),
        ));
    }
    let mut hash = ZERO_HASH;
    hash.copy_from_slice(&value[..HASH_SIZE]);
    Ok(hash)
}
