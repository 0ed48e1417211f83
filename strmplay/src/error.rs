use sdat::{SampleEncoding, SdatError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayError {
    #[error(transparent)]
    Sdat(#[from] SdatError),
    #[error("no decoder for {0:?} samples")]
    UnsupportedEncoding(SampleEncoding),
}

pub type Result<T> = std::result::Result<T, PlayError>;
