//! Per-channel block decoders.
//!
//! A decoder holds one channel's bytes for the block currently loaded and a
//! cursor into it. It never looks outside that block: the player rebinds it
//! with [`BlockDecoder::init`] whenever playback crosses into another block.

use crate::error::*;
use byteorder::{ByteOrder, LE};
use sdat::{ByteView, SampleEncoding};

pub trait BlockDecoder {
    /// Binds the decoder to a new block and rewinds it to the block's first
    /// sample. `total_length` is the number of samples in the block.
    fn init(&mut self, block: ByteView<'_>, total_length: u32, loops: bool, loop_length: u32) -> Result<()>;

    /// The sample under the cursor, widened to 16 bits.
    fn current_sample(&self) -> i16;

    /// Moves the cursor to the next sample. Stops at the end of the block.
    fn advance(&mut self);

    fn state(&self) -> &DecoderState;
}

/// Cursor and loop bookkeeping shared by every decoder.
#[derive(Debug, Default, Clone)]
pub struct DecoderState {
    data: Vec<u8>,
    pub cursor: u32,
    pub total_length: u32,
    pub loops: bool,
    pub loop_length: u32,
}

impl DecoderState {
    fn init(&mut self, block: ByteView<'_>, total_length: u32, loops: bool, loop_length: u32) -> Result<()> {
        block.read_all_into(&mut self.data)?;
        self.cursor = 0;
        self.total_length = total_length;
        self.loops = loops;
        self.loop_length = loop_length;
        Ok(())
    }

    fn advance(&mut self) {
        if self.cursor < self.total_length {
            self.cursor += 1;
        }
    }
}

/// Signed 8-bit PCM. Each byte is doubled into both halves of the 16-bit
/// sample, so `0x7f` becomes `0x7f7f` and `0xff` becomes `0xffff`.
#[derive(Debug, Default, Clone)]
pub struct Pcm8Decoder {
    state: DecoderState,
}

impl BlockDecoder for Pcm8Decoder {
    fn init(&mut self, block: ByteView<'_>, total_length: u32, loops: bool, loop_length: u32) -> Result<()> {
        self.state.init(block, total_length, loops, loop_length)
    }

    fn current_sample(&self) -> i16 {
        match self.state.data.get(self.state.cursor as usize) {
            Some(&b) => i16::from_le_bytes([b, b]),
            None => 0,
        }
    }

    fn advance(&mut self) {
        self.state.advance();
    }

    fn state(&self) -> &DecoderState {
        &self.state
    }
}

/// Signed little-endian 16-bit PCM.
#[derive(Debug, Default, Clone)]
pub struct Pcm16Decoder {
    state: DecoderState,
}

impl BlockDecoder for Pcm16Decoder {
    fn init(&mut self, block: ByteView<'_>, total_length: u32, loops: bool, loop_length: u32) -> Result<()> {
        self.state.init(block, total_length, loops, loop_length)
    }

    fn current_sample(&self) -> i16 {
        let at = self.state.cursor as usize * 2;
        self.state.data.get(at..at + 2).map_or(0, LE::read_i16)
    }

    fn advance(&mut self) {
        self.state.advance();
    }

    fn state(&self) -> &DecoderState {
        &self.state
    }
}

#[derive(Debug, Clone)]
pub enum SampleDecoder {
    Pcm8(Pcm8Decoder),
    Pcm16(Pcm16Decoder),
}

impl SampleDecoder {
    pub fn for_encoding(encoding: SampleEncoding) -> Result<Self> {
        match encoding {
            SampleEncoding::Pcm8 => Ok(SampleDecoder::Pcm8(Pcm8Decoder::default())),
            SampleEncoding::Pcm16 => Ok(SampleDecoder::Pcm16(Pcm16Decoder::default())),
            SampleEncoding::ImaAdpcm => Err(PlayError::UnsupportedEncoding(encoding)),
        }
    }
}

impl BlockDecoder for SampleDecoder {
    fn init(&mut self, block: ByteView<'_>, total_length: u32, loops: bool, loop_length: u32) -> Result<()> {
        match self {
            SampleDecoder::Pcm8(decoder) => decoder.init(block, total_length, loops, loop_length),
            SampleDecoder::Pcm16(decoder) => decoder.init(block, total_length, loops, loop_length),
        }
    }

    fn current_sample(&self) -> i16 {
        match self {
            SampleDecoder::Pcm8(decoder) => decoder.current_sample(),
            SampleDecoder::Pcm16(decoder) => decoder.current_sample(),
        }
    }

    fn advance(&mut self) {
        match self {
            SampleDecoder::Pcm8(decoder) => decoder.advance(),
            SampleDecoder::Pcm16(decoder) => decoder.advance(),
        }
    }

    fn state(&self) -> &DecoderState {
        match self {
            SampleDecoder::Pcm8(decoder) => decoder.state(),
            SampleDecoder::Pcm16(decoder) => decoder.state(),
        }
    }
}
