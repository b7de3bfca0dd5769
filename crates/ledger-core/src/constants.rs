pub const HASH_SIZE: usize = 32;
pub const HEIGHT_SIZE: usize = 8;
/// index + previous_hash + merkle_root + timestamp + nonce
pub const BLOCK_HEADER_SIZE: usize = HEIGHT_SIZE + HASH_SIZE + HASH_SIZE + 8 + 8;
/// Upper bound on hashes returned by an open-ended range request.
pub const MAX_RANGE_FETCH: i64 = 500;
