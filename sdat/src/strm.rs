//! STRM sub-files: block-interleaved PCM streams.
//!
//! The payload is laid out block-major, then channel-major: block `i` holds
//! one `block_length`-byte region per channel, except the final block whose
//! regions are `last_block_length` bytes each.

use crate::error::*;
use crate::types::*;
use std::convert::TryFrom;
use std::time::Duration;
use tracing::warn;

pub const STRM_TAG: Tag = Tag::new(*b"STRM");
pub const HEAD_TAG: Tag = Tag::new(*b"HEAD");
pub const DATA_TAG: Tag = Tag::new(*b"DATA");

const HEAD_OFFSET: u64 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Pcm8,
    Pcm16,
    /// Recognised so headers parse, but nothing decodes it yet.
    ImaAdpcm,
}

impl SampleEncoding {
    /// Bytes per sample, for encodings with a fixed width.
    pub fn sample_width(self) -> Option<u64> {
        match self {
            SampleEncoding::Pcm8 => Some(1),
            SampleEncoding::Pcm16 => Some(2),
            SampleEncoding::ImaAdpcm => None,
        }
    }
}

impl TryFrom<u8> for SampleEncoding {
    type Error = SdatError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SampleEncoding::Pcm8),
            1 => Ok(SampleEncoding::Pcm16),
            2 => Ok(SampleEncoding::ImaAdpcm),
            _ => Err(SdatError::InvalidStream("unknown sample encoding")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StreamHeader<'a> {
    pub encoding: SampleEncoding,
    pub channels: u8,
    pub sample_rate: u16,
    pub timer: u16,
    pub loops: bool,
    /// Sample that playback returns to after the end of a looping stream.
    pub loop_start: u32,
    /// Derived from the block geometry.
    pub total_samples: u32,
    pub block_count: u32,
    pub block_length: u32,
    pub block_samples: u32,
    pub last_block_length: u32,
    pub last_block_samples: u32,
    pub payload: ByteView<'a>,
}

impl<'a> StreamHeader<'a> {
    pub fn read(file: ByteView<'a>) -> Result<Self> {
        file.expect_tag(0, STRM_TAG)?;
        file.expect_tag(HEAD_OFFSET, HEAD_TAG)?;
        let head_size = file.read_u32(HEAD_OFFSET + 4)?;
        let head = file.sub(HEAD_OFFSET, head_size as u64)?;
        file.expect_tag(HEAD_OFFSET + head_size as u64, DATA_TAG)?;

        let encoding = SampleEncoding::try_from(head.read_u8(0x08)?)?;
        let loops = head.read_u8(0x09)? != 0;
        let channels = head.read_u8(0x0a)?;
        let sample_rate = head.read_u16(0x0c)?;
        let timer = head.read_u16(0x0e)?;
        let loop_start = head.read_u32(0x10)?;
        let declared_samples = head.read_u32(0x14)?;
        let data_offset = head.read_u32(0x18)?;
        let block_count = head.read_u32(0x1c)?;
        let block_length = head.read_u32(0x20)?;
        let block_samples = head.read_u32(0x24)?;
        let last_block_length = head.read_u32(0x28)?;
        let last_block_samples = head.read_u32(0x2c)?;

        if !(1..=2).contains(&channels) {
            return Err(SdatError::InvalidStream("channel count must be 1 or 2"));
        }
        if block_count == 0 {
            return Err(SdatError::InvalidStream("stream has no blocks"));
        }
        if block_samples == 0 || last_block_samples == 0 {
            return Err(SdatError::InvalidStream("empty block"));
        }
        if last_block_samples > block_samples {
            return Err(SdatError::InvalidStream("last block is longer than a full block"));
        }
        if let Some(width) = encoding.sample_width() {
            if (block_length as u64) < block_samples as u64 * width
                || (last_block_length as u64) < last_block_samples as u64 * width
            {
                return Err(SdatError::InvalidStream("block too short for its samples"));
            }
        }

        let total_samples = (block_count as u64 - 1) * block_samples as u64 + last_block_samples as u64;
        let total_samples = u32::try_from(total_samples)
            .map_err(|_| SdatError::InvalidStream("sample count overflows"))?;
        if declared_samples != total_samples {
            warn!(declared_samples, total_samples, "stream sample count disagrees with block geometry");
        }
        if loops && loop_start >= total_samples {
            return Err(SdatError::InvalidStream("loop starts past the end of the stream"));
        }

        let payload_len = channels as u64
            * ((block_count as u64 - 1) * block_length as u64 + last_block_length as u64);
        let payload = file.sub(data_offset as u64, payload_len)?;

        Ok(Self {
            encoding,
            channels,
            sample_rate,
            timer,
            loops,
            loop_start,
            total_samples,
            block_count,
            block_length,
            block_samples,
            last_block_length,
            last_block_samples,
            payload,
        })
    }

    /// Number of samples replayed on each loop; zero for one-shot streams.
    pub fn loop_length(&self) -> u32 {
        if self.loops {
            self.total_samples - self.loop_start
        } else {
            0
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::default();
        }
        Duration::from_secs_f64(self.total_samples as f64 / self.sample_rate as f64)
    }

    pub fn is_last_block(&self, block: u32) -> bool {
        block + 1 == self.block_count
    }

    pub fn samples_in_block(&self, block: u32) -> u32 {
        if self.is_last_block(block) {
            self.last_block_samples
        } else {
            self.block_samples
        }
    }

    /// One channel's bytes for `block`.
    pub fn block_view(&self, block: u32, channel: u8) -> Result<ByteView<'a>> {
        let len = if self.is_last_block(block) {
            self.last_block_length
        } else {
            self.block_length
        } as u64;
        let start = self.block_length as u64 * self.channels as u64 * block as u64 + len * channel as u64;
        self.payload.sub(start, len)
    }
}
