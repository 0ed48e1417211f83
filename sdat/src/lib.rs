//! Reader for SDAT sound archives.
//!
//! An archive is a header followed by three tagged blocks: `SYMB` (optional
//! names), `INFO` (typed records) and `FAT ` (where each embedded file
//! lives). Streams are embedded as STRM files and opened through
//! [`Sdat::open_stream`].

mod error;
pub use error::*;

mod types;
pub use types::*;

pub mod fat;
pub mod info;
pub mod strm;
pub mod symb;

pub use fat::FileRecord;
pub use info::{SequenceInfo, StreamInfo};
pub use strm::{SampleEncoding, StreamHeader};
pub use symb::{SymbolCategory, Symbols};

use tracing::debug;

pub const SDAT_TAG: Tag = Tag::new(*b"SDAT");

const BLOCK_TABLE_OFFSET: u64 = 0x0e;

/// Parsing options.
#[derive(Debug, Clone, Copy)]
pub struct SdatReader {
    /// Parse the `SYMB` block when the archive has one.
    pub symbols: bool,
}

impl Default for SdatReader {
    fn default() -> Self {
        Self::all()
    }
}

impl SdatReader {
    pub fn all() -> Self {
        Self { symbols: true }
    }

    /// Parses the whole archive. Nothing is returned unless every block is
    /// well formed.
    pub fn read<S: ByteSource>(&self, source: S) -> Result<Sdat<S>> {
        let (files, info, symbols) = {
            let root = ByteView::new(&source);
            root.expect_tag(0, SDAT_TAG)?;

            let block_count = root.read_u16(BLOCK_TABLE_OFFSET)?;
            let blocks = root.read_u32_array(BLOCK_TABLE_OFFSET + 2, 6)?;
            let (symb_pos, symb_size) = (blocks[0], blocks[1]);
            let (info_pos, info_size) = (blocks[2], blocks[3]);
            let (fat_pos, fat_size) = (blocks[4], blocks[5]);
            debug!(block_count, symb_pos, info_pos, fat_pos, "read archive header");

            let files = fat::read_fat(root.sub(fat_pos as u64, fat_size as u64)?, root.len())?;
            let info = info::read_info(root.sub(info_pos as u64, info_size as u64)?)?;
            let symbols = if self.symbols && symb_pos != 0 {
                Some(symb::read_symb(root.sub(symb_pos as u64, symb_size as u64)?)?)
            } else {
                None
            };
            (files, info, symbols)
        };

        let file_ids = info
            .sequences
            .iter()
            .flatten()
            .map(|seq| seq.file_id)
            .chain(info.streams.iter().flatten().map(|strm| strm.file_id));
        for file_id in file_ids {
            if file_id as usize >= files.len() {
                return Err(SdatError::OutOfRange {
                    offset: file_id as u64,
                    len: 1,
                    limit: files.len() as u64,
                });
            }
        }

        debug!(
            files = files.len(),
            sequences = info.sequences.len(),
            streams = info.streams.len(),
            "parsed archive"
        );
        Ok(Sdat {
            source,
            files,
            sequences: info.sequences,
            streams: info.streams,
            symbols,
        })
    }
}

/// A parsed archive. Read-only once built; any number of streams may be
/// opened from it at once.
#[derive(Debug)]
pub struct Sdat<S> {
    source: S,
    files: Vec<FileRecord>,
    sequences: Vec<Option<SequenceInfo>>,
    streams: Vec<Option<StreamInfo>>,
    symbols: Option<Symbols>,
}

impl<S: ByteSource> Sdat<S> {
    pub fn parse(source: S) -> Result<Self> {
        SdatReader::default().read(source)
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }
    pub fn sequences(&self) -> &[Option<SequenceInfo>] {
        &self.sequences
    }
    pub fn streams(&self) -> &[Option<StreamInfo>] {
        &self.streams
    }
    pub fn symbols(&self) -> Option<&Symbols> {
        self.symbols.as_ref()
    }

    pub fn name_of(&self, category: SymbolCategory, index: usize) -> Option<&str> {
        self.symbols.as_ref()?.name_of(category, index)
    }

    pub fn index_of(&self, category: SymbolCategory, name: &str) -> Option<usize> {
        self.symbols.as_ref()?.index_of(category, name)
    }

    pub fn open_file(&self, file_id: usize) -> Result<ByteView<'_>> {
        let record = self.files.get(file_id).ok_or(SdatError::OutOfRange {
            offset: file_id as u64,
            len: 1,
            limit: self.files.len() as u64,
        })?;
        ByteView::new(&self.source).sub(record.offset as u64, record.length as u64)
    }

    pub fn open_stream(&self, index: usize) -> Result<StreamHeader<'_>> {
        let info = self
            .streams
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| SdatError::NotFound(format!("stream {}", index)))?;

        let strm = StreamHeader::read(self.open_file(info.file_id as usize)?)?;
        debug!(
            index,
            file_id = info.file_id,
            encoding = ?strm.encoding,
            channels = strm.channels,
            samples = strm.total_samples,
            "opened stream"
        );
        Ok(strm)
    }

    pub fn open_stream_by_name(&self, name: &str) -> Result<StreamHeader<'_>> {
        let index = self
            .index_of(SymbolCategory::Stream, name)
            .ok_or_else(|| SdatError::NotFound(format!("stream {:?}", name)))?;
        self.open_stream(index)
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
