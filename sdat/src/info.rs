//! INFO block: typed records describing sequences and streams.
//!
//! Records are reached through per-category pointer tables. A zero pointer
//! marks an unused slot; it is kept as `None` so indices line up with the
//! symbol tables and with ids used elsewhere in the archive.

use crate::error::*;
use crate::types::*;
use byteorder::{ByteOrder, LE};

pub const INFO_TAG: Tag = Tag::new(*b"INFO");

const SUBTABLE_COUNT: u32 = 8;
const SEQUENCE_TABLE: usize = 0;
const STREAM_TABLE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceInfo {
    pub file_id: u16,
    pub bank_id: u16,
    pub volume: u8,
    pub channel_priority: u8,
    pub player_priority: u8,
    pub player: u8,
}

impl SequenceInfo {
    const SIZE: usize = 12;

    fn read(data: &[u8]) -> Self {
        Self {
            file_id: LE::read_u16(&data[0..2]),
            bank_id: LE::read_u16(&data[4..6]),
            volume: data[6],
            channel_priority: data[7],
            player_priority: data[8],
            player: data[9],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub file_id: u16,
    pub volume: u8,
    pub priority: u8,
    pub player: u8,
    pub force_stereo: bool,
}

impl StreamInfo {
    const SIZE: usize = 12;

    fn read(data: &[u8]) -> Self {
        Self {
            file_id: LE::read_u16(&data[0..2]),
            volume: data[4],
            priority: data[5],
            player: data[6],
            force_stereo: data[7] != 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct InfoTables {
    pub sequences: Vec<Option<SequenceInfo>>,
    pub streams: Vec<Option<StreamInfo>>,
}

pub(crate) fn read_info(block: ByteView<'_>) -> Result<InfoTables> {
    block.expect_tag(0, INFO_TAG)?;
    let declared = block.read_u32(4)?;
    if declared as u64 != block.len() {
        return Err(SdatError::SizeMismatch {
            block: INFO_TAG,
            declared,
            actual: block.len(),
        });
    }

    let subtables = block.read_u32_array(8, SUBTABLE_COUNT)?;
    Ok(InfoTables {
        sequences: read_records(block, subtables[SEQUENCE_TABLE], SequenceInfo::SIZE, SequenceInfo::read)?,
        streams: read_records(block, subtables[STREAM_TABLE], StreamInfo::SIZE, StreamInfo::read)?,
    })
}

fn read_records<T>(
    block: ByteView<'_>,
    table: u32,
    size: usize,
    read: fn(&[u8]) -> T,
) -> Result<Vec<Option<T>>> {
    let count = block.read_u32(table as u64)?;
    let pointers = block.read_u32_array(table as u64 + 4, count)?;

    pointers
        .into_iter()
        .map(|pointer| match pointer {
            0 => Ok(None),
            _ => Ok(Some(read(&block.read_vec(pointer as u64, size)?))),
        })
        .collect()
}
