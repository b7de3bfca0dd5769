use crate::error::StoreResult;
use crate::keys::{self, HEIGHT_PREFIX};
use ledger_core::Height;
use sled::{Batch, Tree};
use std::collections::BTreeMap;
use tracing::debug;

/// Point reads and staged writes over one sled tree.
///
/// Staged entries are held in an ordered overlay that reads see first, and
/// reach the tree only through [`RecordStore::commit`], as a single batch.
pub struct RecordStore {
    tree: Tree,
    pending: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl RecordStore {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            pending: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if let Some(value) = self.pending.get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    pub fn stage_put(&mut self, key: &[u8], value: Vec<u8>) {
        self.pending.insert(key.to_vec(), value);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Applies every staged entry atomically and flushes the tree.
    /// The overlay is kept if the apply fails.
    pub fn commit(&mut self) -> StoreResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let mut batch = Batch::default();
        for (key, value) in &self.pending {
            batch.insert(key.as_slice(), value.as_slice());
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        let written = self.pending.len();
        self.pending.clear();
        debug!(entries = written, "committed batch");
        Ok(written)
    }

    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Highest occupied height and its raw entry, staged or committed.
    pub fn last_height(&self) -> StoreResult<Option<(Height, Vec<u8>)>> {
        let committed = match self.tree.scan_prefix([HEIGHT_PREFIX]).next_back().transpose()? {
            Some((key, value)) => Some((keys::decode_height_key(&key)?, value.to_vec())),
            None => None,
        };
        let lo = keys::height_key(0).to_vec();
        let hi = keys::height_key(Height::MAX).to_vec();
        let staged = match self.pending.range(lo..=hi).next_back() {
            Some((key, value)) => Some((keys::decode_height_key(key)?, value.clone())),
            None => None,
        };
        Ok(match (committed, staged) {
            (Some(c), Some(s)) => Some(if s.0 >= c.0 { s } else { c }),
            (c, s) => c.or(s),
        })
    }
}
