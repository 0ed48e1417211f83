use crate::decoder::{BlockDecoder, SampleDecoder};
use crate::error::*;
use dasp::Signal;
use sdat::{ByteSource, Sdat, SdatError, StreamHeader};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplePair {
    pub left: i16,
    pub right: i16,
}

impl From<SamplePair> for [i16; 2] {
    fn from(pair: SamplePair) -> Self {
        [pair.left, pair.right]
    }
}

/// Pulls sample pairs out of one stream, one block at a time.
///
/// Mono streams play the same sample on both sides.
#[derive(Debug)]
pub struct StreamPlayer<'a> {
    strm: StreamHeader<'a>,
    decoders: Vec<SampleDecoder>,

    loaded_block: Option<u32>,
    position: u32,
    samples_left_in_block: u32,
    failed: bool,
}

impl<'a> StreamPlayer<'a> {
    pub fn new(strm: StreamHeader<'a>) -> Result<Self> {
        // the division and decoder indexing below rely on these
        if strm.channels == 0 || strm.block_samples == 0 {
            return Err(SdatError::InvalidStream("stream has no channels or empty blocks").into());
        }

        let decoders = (0..strm.channels)
            .map(|_| SampleDecoder::for_encoding(strm.encoding))
            .collect::<Result<Vec<_>>>()?;
        debug!(encoding = ?strm.encoding, channels = strm.channels, "created stream player");

        Ok(Self {
            strm,
            decoders,
            loaded_block: None,
            position: 0,
            samples_left_in_block: 0,
            failed: false,
        })
    }

    pub fn open<S: ByteSource>(sdat: &'a Sdat<S>, index: usize) -> Result<Self> {
        Self::new(sdat.open_stream(index)?)
    }

    pub fn open_by_name<S: ByteSource>(sdat: &'a Sdat<S>, name: &str) -> Result<Self> {
        Self::new(sdat.open_stream_by_name(name)?)
    }

    pub fn header(&self) -> &StreamHeader<'a> {
        &self.strm
    }
    pub fn sample_rate(&self) -> u32 {
        self.strm.sample_rate as u32
    }
    pub fn channel_count(&self) -> u8 {
        self.strm.channels
    }
    /// Index of the next sample to be emitted.
    pub fn position(&self) -> u32 {
        self.position
    }
    pub fn loaded_block(&self) -> Option<u32> {
        self.loaded_block
    }

    /// True once a one-shot stream has played out or a block failed to load.
    pub fn is_finished(&self) -> bool {
        self.failed || (!self.strm.loops && self.position >= self.strm.total_samples)
    }

    pub fn reset(&mut self) {
        self.loaded_block = None;
        self.position = 0;
        self.samples_left_in_block = 0;
        self.failed = false;
    }

    /// Fills `samples` and returns how many were written. Fewer than
    /// `samples.len()` means a one-shot stream has ended.
    pub fn generate_samples(&mut self, samples: &mut [SamplePair]) -> Result<usize> {
        self.generate(samples.len(), |i, pair| samples[i] = pair)
    }

    /// Like [`generate_samples`](Self::generate_samples) but writes
    /// interleaved left/right values. Returns the number of pairs written.
    pub fn fill(&mut self, data: &mut [i16]) -> Result<usize> {
        self.generate(data.len() / 2, |i, pair| {
            data[i * 2] = pair.left;
            data[i * 2 + 1] = pair.right;
        })
    }

    fn generate(&mut self, count: usize, mut emit: impl FnMut(usize, SamplePair)) -> Result<usize> {
        let mut written = 0;
        while written < count {
            if self.samples_left_in_block == 0 {
                match self.select_block() {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => {
                        self.failed = true;
                        return Err(err);
                    }
                }
            }

            let run = (count - written).min(self.samples_left_in_block as usize);
            for i in written..written + run {
                emit(i, self.current_pair());
                for decoder in &mut self.decoders {
                    decoder.advance();
                }
            }
            written += run;
            self.samples_left_in_block -= run as u32;
            self.position += run as u32;
        }
        Ok(written)
    }

    fn current_pair(&self) -> SamplePair {
        let left = self.decoders[0].current_sample();
        let right = self.decoders.get(1).map_or(left, |decoder| decoder.current_sample());
        SamplePair { left, right }
    }

    /// Points the decoders at `position`, loading its block if needed.
    /// Returns false when a one-shot stream has nothing left.
    fn select_block(&mut self) -> Result<bool> {
        if self.position >= self.strm.total_samples {
            if !self.strm.loops {
                return Ok(false);
            }
            trace!(from = self.position, to = self.strm.loop_start, "looping stream");
            self.position = self.strm.loop_start;
            self.loaded_block = None;
        }

        let block = self.position / self.strm.block_samples;
        if self.loaded_block != Some(block) {
            self.load_block(block)?;
        }

        // playback can resume mid-block after a loop
        let offset = self.position - block * self.strm.block_samples;
        let cursor = self.decoders[0].state().cursor;
        for _ in cursor..offset {
            for decoder in &mut self.decoders {
                decoder.advance();
            }
        }

        self.samples_left_in_block = self.strm.samples_in_block(block) - offset;
        Ok(true)
    }

    fn load_block(&mut self, block: u32) -> Result<()> {
        self.loaded_block = None;

        let samples = self.strm.samples_in_block(block);
        let loop_length = self.strm.loop_length();
        for (channel, decoder) in self.decoders.iter_mut().enumerate() {
            let view = self.strm.block_view(block, channel as u8)?;
            decoder.init(view, samples, self.strm.loops, loop_length)?;
        }

        trace!(block, samples, "loaded block");
        self.loaded_block = Some(block);
        Ok(())
    }
}

impl Signal for StreamPlayer<'_> {
    type Frame = [i16; 2];

    fn next(&mut self) -> Self::Frame {
        let mut pair = [SamplePair::default()];
        if self.failed {
            return pair[0].into();
        }
        if let Err(err) = self.generate_samples(&mut pair) {
            warn!(%err, "stream playback stopped");
        }
        pair[0].into()
    }

    fn is_exhausted(&self) -> bool {
        self.is_finished()
    }
}
