use crate::chain_index;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::keys;
use crate::record_store::RecordStore;
use crate::tip::TipCache;
use crate::BlockStorage;
use ledger_core::constants::{BLOCK_HEADER_SIZE, MAX_RANGE_FETCH};
use ledger_core::{Hash, HeaderBytes, Height, Tip};
use sled::Db;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

pub const TREE_BLOCKS: &str = "blocks";

struct Inner {
  records: RecordStore,
  tip: TipCache,
}

/// Every operation runs under one store-wide lock.
pub struct SledStore {
  db: Db,
  inner: Mutex<Inner>,
}

impl SledStore {
  pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
    Self::open_with(&StoreConfig::new(path))
  }

  pub fn open_with(config: &StoreConfig) -> StoreResult<Self> {
    let db = config.to_sled().open()?;
    let records = RecordStore::new(db.open_tree(TREE_BLOCKS)?);
    let mut tip = TipCache::default();
    let newest = tip.load(&records)?;
    info!(
      path = %config.path.display(),
      recovered = db.was_recovered(),
      tip = %newest,
      "sled store opened"
    );
    Ok(Self {
      db,
      inner: Mutex::new(Inner { records, tip }),
    })
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Entries staged since the last `sync`.
  pub fn pending_writes(&self) -> usize {
    self.lock().records.pending_len()
  }

  /// Drops every staged write and re-derives the tip from committed state.
  pub fn rollback(&self) -> StoreResult<usize> {
    let mut guard = self.lock();
    let inner = &mut *guard;
    let dropped = inner.records.discard();
    inner.tip.invalidate();
    let tip = inner.tip.load(&inner.records)?;
    info!(dropped, %tip, "rolled back pending writes");
    Ok(dropped)
  }

  pub fn close(self) -> StoreResult<()> {
    self.sync()?;
    self.db.flush()?;
    info!("sled store closed");
    Ok(())
  }
}

impl BlockStorage for SledStore {
  fn exists(&self, hash: &Hash) -> bool {
    match chain_index::height_of(&self.lock().records, hash) {
      Ok(_) => true,
      Err(e) if e.is_not_found() => false,
      Err(e) => {
        warn!(hash = %hex::encode(hash), error = %e, "existence check failed");
        false
      }
    }
  }

  fn block_by_hash(&self, hash: &Hash) -> StoreResult<(Vec<u8>, Height)> {
    chain_index::record_by_hash(&self.lock().records, hash)
  }

  fn header_by_hash(&self, hash: &Hash) -> StoreResult<HeaderBytes> {
    let (record, height) = chain_index::record_by_hash(&self.lock().records, hash)?;
    record
      .get(..BLOCK_HEADER_SIZE)
      .and_then(|head| head.try_into().ok())
      .ok_or_else(|| {
        StoreError::corruption(
          &keys::height_key(height),
          format!("record has {} bytes, header needs {}", record.len(), BLOCK_HEADER_SIZE),
        )
      })
  }

  fn height_by_hash(&self, hash: &Hash) -> StoreResult<Height> {
    chain_index::height_of(&self.lock().records, hash)
  }

  fn hash_by_height(&self, height: Height) -> StoreResult<Hash> {
    chain_index::hash_at(&self.lock().records, height)
  }

  fn range(&self, start: Height, end: Option<Height>) -> Vec<Hash> {
    let guard = self.lock();
    let end = end.unwrap_or_else(|| start.saturating_add(MAX_RANGE_FETCH));
    let span = end.saturating_sub(start).clamp(0, MAX_RANGE_FETCH);
    let mut hashes = Vec::with_capacity(span as usize);
    let mut height = start;
    while height < end {
      match chain_index::hash_at(&guard.records, height) {
        Ok(hash) => hashes.push(hash),
        Err(e) if e.is_not_found() => break,
        Err(e) => {
          warn!(height, error = %e, "range stopped early");
          break;
        }
      }
      height += 1;
    }
    hashes
  }

  /// Falls back to `Tip::Empty` only if the tip cache cannot be re-warmed.
  fn newest(&self) -> Tip {
    let mut guard = self.lock();
    let inner = &mut *guard;
    inner.tip.load(&inner.records).unwrap_or_else(|e| {
      warn!(error = %e, "tip unavailable");
      Tip::Empty
    })
  }

  fn insert(&self, hash: &Hash, prev_hash: &Hash, record: &[u8]) -> StoreResult<Height> {
    let mut guard = self.lock();
    let inner = &mut *guard;
    let tip = inner.tip.load(&inner.records)?;
    let height = chain_index::assign_and_insert(&mut inner.records, tip, hash, prev_hash, record)?;
    inner.tip.advance(*hash, height);
    Ok(height)
  }

  fn sync(&self) -> StoreResult<usize> {
    self.lock().records.commit()
  }
}

impl Drop for SledStore {
  fn drop(&mut self) {
    let mut guard = self.lock();
    if guard.records.pending_len() == 0 {
      return;
    }
    if let Err(e) = guard.records.commit() {
      warn!(error = %e, "pending writes lost on drop");
    }
  }
}
