//! File allocation table: where each embedded file lives in the archive.

use crate::error::*;
use crate::types::*;
use byteorder::{ByteOrder, LE};

pub const FAT_TAG: Tag = Tag::new(*b"FAT ");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute position in the archive.
    pub offset: u32,
    pub length: u32,
}

impl FileRecord {
    const SIZE: usize = 16;

    fn read(data: &[u8]) -> Self {
        // the last 8 bytes are reserved
        Self {
            offset: LE::read_u32(&data[0..4]),
            length: LE::read_u32(&data[4..8]),
        }
    }
}

/// Decodes the FAT block. `archive_len` bounds every record.
pub(crate) fn read_fat(block: ByteView<'_>, archive_len: u64) -> Result<Vec<FileRecord>> {
    block.expect_tag(0, FAT_TAG)?;
    let num_records = block.read_u32(8)?;

    let data = block.read_vec(12, num_records as usize * FileRecord::SIZE)?;
    let files: Vec<_> = data.chunks_exact(FileRecord::SIZE).map(FileRecord::read).collect();

    for file in &files {
        let end = file.offset as u64 + file.length as u64;
        if end > archive_len {
            return Err(SdatError::OutOfRange {
                offset: file.offset as u64,
                len: file.length as u64,
                limit: archive_len,
            });
        }
    }

    Ok(files)
}
