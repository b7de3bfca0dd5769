use crate::error::StoreResult;
use crate::keys;
use crate::record_store::RecordStore;
use ledger_core::{Hash, Height, Tip};
use tracing::info;

/// In-memory copy of the newest block, warmed from the height namespace.
#[derive(Debug, Default)]
pub struct TipCache {
    valid: bool,
    tip: Tip,
}

impl TipCache {
    /// Returns the cached tip, scanning for the highest height first if the
    /// cache has not been warmed or was invalidated.
    pub fn load(&mut self, records: &RecordStore) -> StoreResult<Tip> {
        if !self.valid {
            self.tip = match records.last_height()? {
                Some((height, value)) => {
                    let hash = keys::decode_record_hash(&keys::height_key(height), &value)?;
                    Tip::At { hash, height }
                }
                None => Tip::Empty,
            };
            self.valid = true;
            info!(tip = %self.tip, "tip cache warmed");
        }
        Ok(self.tip)
    }

    /// Current tip without touching storage; `Empty` until warmed.
    pub fn get(&self) -> Tip {
        self.tip
    }

    pub fn next_height(&self) -> Height {
        self.tip.next_height()
    }

    /// Records a successful insert.
    pub fn advance(&mut self, hash: Hash, height: Height) {
        self.tip = Tip::At { hash, height };
        self.valid = true;
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
        self.tip = Tip::Empty;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
