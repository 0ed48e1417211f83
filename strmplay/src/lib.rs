//! Streams PCM sample pairs out of STRM files.

mod error;
pub use error::*;

pub mod decoder;
pub use decoder::{BlockDecoder, DecoderState, SampleDecoder};

mod player;
pub use player::{SamplePair, StreamPlayer};
