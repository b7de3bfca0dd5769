/// Failures decoding the block wire format.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("header needs {expected} bytes, got {actual}")]
    ShortHeader { expected: usize, actual: usize },

    #[error("transaction payload: {0}")]
    Payload(#[from] bincode::Error),
}
