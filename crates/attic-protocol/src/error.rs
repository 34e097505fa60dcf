use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unexpected response: {0:?}")]
    MalformedFrame(String),

    #[error("Empty byte string")]
    EmptyBytes,

    #[error("Invalid hex byte: {0:?}")]
    InvalidHexByte(String),
}
