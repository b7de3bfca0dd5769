use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{Hash, ZERO_HASH};
use ledger_storage::{BlockStorage, SledStore, StoreConfig};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

fn temp_store() -> SledStore {
    SledStore::open_with(&StoreConfig::default().temporary(true)).expect("open temporary store")
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_1k_byte_record", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        let store = temp_store();
        let record = vec![7u8; 1024];
        let mut prev: Hash = ZERO_HASH;
        b.iter(|| {
            let hash: Hash = rng.gen();
            store.insert(&hash, &prev, &record).unwrap();
            prev = hash;
        });
    });
}

fn bench_lookups(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let store = temp_store();
    let mut hashes = Vec::new();
    let mut prev: Hash = ZERO_HASH;
    for _ in 0..1_000 {
        let hash: Hash = rng.gen();
        store.insert(&hash, &prev, &[1u8; 256]).unwrap();
        hashes.push(hash);
        prev = hash;
    }
    store.sync().unwrap();

    c.bench_function("block_by_hash", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % hashes.len();
            black_box(store.block_by_hash(&hashes[i]).unwrap());
        });
    });
    c.bench_function("range_open_end", |b| {
        b.iter(|| black_box(store.range(black_box(250), None)));
    });
}

criterion_group!(benches, bench_insert, bench_lookups);
criterion_main!(benches);
