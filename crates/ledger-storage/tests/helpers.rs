#![allow(dead_code)]

use std::fs;

use ledger_core::{Block, BlockHeader, Hash, Transaction};
use ledger_storage::{BlockStorage, SledStore};
use rand::Rng;
use tempfile::{tempdir, TempDir};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn create_temp_store() -> (TempDir, SledStore) {
    init_tracing();
    // Create a temporary directory for the sled database
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().to_path_buf();
    (
        temp_dir,
        SledStore::open(&db_path).expect("Failed to open SledStore"),
    )
}

pub fn teardown_store(temp_dir: TempDir, store: SledStore) {
    let db_path = temp_dir.path().to_path_buf();
    store.close().expect("Failed to close the store");
    temp_dir.close().expect("Failed to delete temp dir");
    let _ = fs::remove_dir_all(&db_path);
    // Verify the directory is removed
    assert!(!db_path.exists(), "Database directory should be removed");
}

pub fn random_block(rng: &mut impl Rng, index: u64, prev_hash: Hash, tx_count: usize) -> Block {
    let txs: Vec<Transaction> = (0..tx_count)
        .map(|i| Transaction {
            from: format!("addr_from_{}", i),
            to: format!("addr_to_{}", i),
            amount: rng.gen_range(1..1_000),
            timestamp: 1_600_000_000 + i as u64,
        })
        .collect();
    Block {
        header: BlockHeader::new(index, prev_hash, rng.gen(), rng.gen()),
        txs,
    }
}

/// Appends `count` linked blocks after the current tip and returns them.
pub fn extend_chain(store: &SledStore, count: usize) -> Vec<Block> {
    let mut rng = rand::thread_rng();
    let tip = store.newest();
    let mut prev_hash = tip.hash();
    let mut index = tip.next_height() as u64;
    let mut blocks = Vec::with_capacity(count);
    for _ in 0..count {
        let tx_count = rng.gen_range(0..4);
        let block = random_block(&mut rng, index, prev_hash, tx_count);
        let height = store.insert_block(&block).expect("insert should succeed");
        assert_eq!(height as u64, index);
        prev_hash = block.hash();
        index += 1;
        blocks.push(block);
    }
    blocks
}
