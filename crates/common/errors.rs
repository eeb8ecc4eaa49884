#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HexError {
    #[error("invalid hex string {0:?}: {1}")]
    InvalidHex(String, hex::FromHexError),
    #[error("expected {expected} bytes, got {actual} in {value:?}")]
    InvalidLength {
        value: String,
        expected: usize,
        actual: usize,
    },
}
