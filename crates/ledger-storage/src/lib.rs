pub mod chain_index;
pub mod config;
pub mod error;
pub mod keys;
pub mod record_store;
pub mod sled_store;
pub mod tip;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use sled_store::SledStore;

use ledger_core::{Block, BlockHeader, Hash, HeaderBytes, Height, Tip};

/// Block storage keyed by hash and by height over a single linear chain.
///
/// Writes are staged; they become durable at [`BlockStorage::sync`].
pub trait BlockStorage: Send + Sync {
    fn exists(&self, hash: &Hash) -> bool;
    fn block_by_hash(&self, hash: &Hash) -> StoreResult<(Vec<u8>, Height)>;
    fn header_by_hash(&self, hash: &Hash) -> StoreResult<HeaderBytes>;
    fn height_by_hash(&self, hash: &Hash) -> StoreResult<Height>;
    fn hash_by_height(&self, height: Height) -> StoreResult<Hash>;
    /// Hashes for `start..end`, or up to 500 of them when `end` is `None`.
    /// Stops quietly at the first empty height.
    fn range(&self, start: Height, end: Option<Height>) -> Vec<Hash>;
    fn newest(&self) -> Tip;
    fn insert(&self, hash: &Hash, prev_hash: &Hash, record: &[u8]) -> StoreResult<Height>;
    fn sync(&self) -> StoreResult<usize>;

    fn insert_block(&self, block: &Block) -> StoreResult<Height> {
        let bytes = block.to_bytes().map_err(StoreError::Encode)?;
        self.insert(&block.hash(), &block.header.previous_hash, &bytes)
    }

    fn fetch_block(&self, hash: &Hash) -> StoreResult<(Block, Height)> {
        let (bytes, height) = self.block_by_hash(hash)?;
        let block = Block::from_bytes(&bytes).map_err(|e| {
            StoreError::corruption(&keys::height_key(height), format!("undecodable block: {e}"))
        })?;
        Ok((block, height))
    }

    fn fetch_header(&self, hash: &Hash) -> StoreResult<BlockHeader> {
        let bytes = self.header_by_hash(hash)?;
        BlockHeader::from_bytes(&bytes)
            .map_err(|e| StoreError::corruption(&keys::hash_key(hash), e.to_string()))
    }
}
