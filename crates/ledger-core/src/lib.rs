pub mod constants;
pub mod error;

use constants::{BLOCK_HEADER_SIZE, HASH_SIZE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub use error::CodecError;

pub type Hash = [u8; HASH_SIZE];

/// Zero-based position of a block in the chain.
pub type Height = i64;

pub const ZERO_HASH: Hash = [0u8; HASH_SIZE];

/// Raw leading header region of a stored block.
pub type HeaderBytes = [u8; BLOCK_HEADER_SIZE];

/// The newest block of the chain, or nothing at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tip {
    #[default]
    Empty,
    At { hash: Hash, height: Height },
}

impl Tip {
    /// Tip hash, or the zero hash on an empty chain.
    pub fn hash(&self) -> Hash {
        match self {
            Tip::Empty => ZERO_HASH,
            Tip::At { hash, .. } => *hash,
        }
    }

    /// Tip height, or `-1` on an empty chain.
    pub fn height(&self) -> Height {
        match self {
            Tip::Empty => -1,
            Tip::At { height, .. } => *height,
        }
    }

    /// Height the next appended block will receive.
    pub fn next_height(&self) -> Height {
        self.height() + 1
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tip::Empty)
    }
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tip::Empty => write!(f, "empty"),
            Tip::At { hash, height } => write!(f, "{} @ {}", hex::encode(hash), height),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub timestamp: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn new(index: u64, previous_hash: Hash, merkle_root: Hash, nonce: u64) -> Self {
        Self {
            index,
            previous_hash,
            merkle_root,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            nonce,
        }
    }

    pub fn to_bytes(&self) -> HeaderBytes {
        let mut out = [0u8; BLOCK_HEADER_SIZE];
        out[0..8].copy_from_slice(&self.index.to_le_bytes());
        out[8..40].copy_from_slice(&self.previous_hash);
        out[40..72].copy_from_slice(&self.merkle_root);
        out[72..80].copy_from_slice(&self.timestamp.to_le_bytes());
        out[80..88].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Decodes the leading header region; bytes past it are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < BLOCK_HEADER_SIZE {
            return Err(CodecError::ShortHeader {
                expected: BLOCK_HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let u64_at = |at: usize| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[at..at + 8]);
            u64::from_le_bytes(word)
        };
        let hash_at = |at: usize| {
            let mut hash = ZERO_HASH;
            hash.copy_from_slice(&bytes[at..at + HASH_SIZE]);
            hash
        };
        Ok(Self {
            index: u64_at(0),
            previous_hash: hash_at(8),
            merkle_root: hash_at(40),
            timestamp: u64_at(72),
            nonce: u64_at(80),
        })
    }

    pub fn hash(&self) -> Hash {
        let digest = Sha256::digest(self.to_bytes());
        let mut out = ZERO_HASH;
        out.copy_from_slice(&digest[..]);
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Transaction>,
}

impl Block {
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Serialized form: the fixed header region followed by the encoded transactions.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let payload = bincode::serialize(&self.txs)?;
        let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE + payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let header = BlockHeader::from_bytes(bytes)?;
        let txs = bincode::deserialize(&bytes[BLOCK_HEADER_SIZE..])?;
        Ok(Self { header, txs })
    }
}

/// A zero-transaction genesis block with zeroed prev-hash and merkle-root.
pub fn genesis_block() -> Block {
    Block {
        header: BlockHeader::new(0, ZERO_HASH, ZERO_HASH, 0),
        txs: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction {
                from: "Alice".to_string(),
                to: "Bob".to_string(),
                amount: 10,
                timestamp: 1_600_000_000,
            },
            Transaction {
                from: "Bob".to_string(),
                to: "Charlie".to_string(),
                amount: 5,
                timestamp: 1_600_000_100,
            },
        ]
    }

    #[test]
    fn empty_tip_uses_sentinels() {
        let tip = Tip::Empty;
        assert_eq!(tip.hash(), ZERO_HASH);
        assert_eq!(tip.height(), -1);
        assert_eq!(tip.next_height(), 0);
        assert!(tip.is_empty());
        assert_eq!(tip.to_string(), "empty");
    }

    #[test]
    fn tip_at_height() {
        let tip = Tip::At {
            hash: [7u8; 32],
            height: 41,
        };
        assert_eq!(tip.hash(), [7u8; 32]);
        assert_eq!(tip.height(), 41);
        assert_eq!(tip.next_height(), 42);
        assert!(!tip.is_empty());
        assert!(tip.to_string().ends_with(" @ 41"));
    }

    #[test]
    fn block_header_layout() {
        let header = BlockHeader::new(1, [0u8; 32], [1u8; 32], 42);
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), 88);
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..40], &[0u8; 32]);
        assert_eq!(&bytes[40..72], &[1u8; 32]);
        assert_eq!(&bytes[72..80], &header.timestamp.to_le_bytes());
        assert_eq!(&bytes[80..88], &42u64.to_le_bytes());
    }

    #[test]
    fn header_decode_ignores_trailing_bytes() {
        let header = BlockHeader::new(3, [9u8; 32], [8u8; 32], 7);
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(b"trailing payload");
        assert_eq!(BlockHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn short_header_is_rejected() {
        let err = BlockHeader::from_bytes(&[0u8; 40]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ShortHeader {
                expected: 88,
                actual: 40
            }
        ));
    }

    #[test]
    fn block_bytes_keep_header_in_front() {
        let header = BlockHeader::new(1, [2u8; 32], [3u8; 32], 0);
        let block = Block {
            header,
            txs: sample_txs(),
        };
        let bytes = block.to_bytes().unwrap();
        assert_eq!(&bytes[..BLOCK_HEADER_SIZE], &header.to_bytes());
        assert_eq!(Block::from_bytes(&bytes).unwrap(), block);
    }

    #[test]
    fn truncated_payload_fails() {
        let block = Block {
            header: BlockHeader::new(1, ZERO_HASH, ZERO_HASH, 0),
            txs: sample_txs(),
        };
        let bytes = block.to_bytes().unwrap();
        let err = Block::from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, CodecError::Payload(_)));
    }

    #[test]
    fn block_hash_is_header_hash() {
        let mut block = Block {
            header: BlockHeader::new(1, ZERO_HASH, ZERO_HASH, 0),
            txs: sample_txs(),
        };
        let before = block.hash();
        block.txs.clear();
        assert_eq!(block.hash(), before);
        block.header.nonce += 1;
        assert_ne!(block.hash(), before);
    }

    #[test]
    fn genesis_block_example() {
        let genesis = genesis_block();
        assert_eq!(genesis.header.index, 0);
        assert_eq!(genesis.header.previous_hash, ZERO_HASH);
        assert_eq!(genesis.header.merkle_root, ZERO_HASH);
        assert_eq!(genesis.txs.len(), 0);
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = sample_txs().remove(0);
        let json = serde_json::to_string(&tx).unwrap();
        let expected_json = r#"{"from":"Alice","to":"Bob","amount":10,"timestamp":1600000000}"#;
        assert_eq!(json, expected_json);
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, deserialized);
    }
}
