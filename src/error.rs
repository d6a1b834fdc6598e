use thiserror::Error;

/// Failures a caller may want to tell apart. Everything else travels as a plain
/// `anyhow::Error`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("quality must be in [1,99] interval, got {0}")]
    InvalidQuality(i64),

    #[error("invalid pixel grid: {width}x{height} with stride {stride}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        stride: usize,
    },

    #[error("malformed compressed stream: {0}")]
    MalformedStream(String),

    #[error("huffman code for byte {symbol} needs {length} bits, at most 64 are supported")]
    CodeTooLong { symbol: u8, length: usize },

    #[error("invalid compressed container: {0}")]
    InvalidContainer(String),
}
