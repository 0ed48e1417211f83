use crate::types::Tag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdatError {
    #[error("bad signature: expected {expected}, found {found}")]
    BadSignature { expected: Tag, found: Tag },
    #[error("{block} block declares {declared} bytes but spans {actual}")]
    SizeMismatch { block: Tag, declared: u32, actual: u64 },
    #[error("range {offset:#x}+{len:#x} exceeds limit {limit:#x}")]
    OutOfRange { offset: u64, len: u64, limit: u64 },

    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid stream header: {0}")]
    InvalidStream(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SdatError>;
