//! SYMB block: optional display names for archive entries.

use crate::error::*;
use crate::types::*;
use tracing::trace;

pub const SYMB_TAG: Tag = Tag::new(*b"SYMB");

/// Entry categories that carry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Sequence,
    Bank,
    WaveArchive,
    Player,
    Group,
    StreamPlayer,
    Stream,
}

impl SymbolCategory {
    pub const ALL: [SymbolCategory; 7] = [
        SymbolCategory::Sequence,
        SymbolCategory::Bank,
        SymbolCategory::WaveArchive,
        SymbolCategory::Player,
        SymbolCategory::Group,
        SymbolCategory::StreamPlayer,
        SymbolCategory::Stream,
    ];

    /// Position of the category's pointer in the block header. Slot 1 holds
    /// sequence archives, whose nested layout isn't read here.
    fn slot(self) -> usize {
        match self {
            SymbolCategory::Sequence => 0,
            SymbolCategory::Bank => 2,
            SymbolCategory::WaveArchive => 3,
            SymbolCategory::Player => 4,
            SymbolCategory::Group => 5,
            SymbolCategory::StreamPlayer => 6,
            SymbolCategory::Stream => 7,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Symbols {
    tables: [Vec<Option<String>>; 7],
}

impl Symbols {
    /// Names by entry index; `None` where the entry is unnamed.
    pub fn names(&self, category: SymbolCategory) -> &[Option<String>] {
        &self.tables[category as usize]
    }

    pub fn name_of(&self, category: SymbolCategory, index: usize) -> Option<&str> {
        self.names(category).get(index)?.as_deref()
    }

    pub fn index_of(&self, category: SymbolCategory, name: &str) -> Option<usize> {
        self.names(category)
            .iter()
            .position(|entry| entry.as_deref() == Some(name))
    }
}

pub(crate) fn read_symb(block: ByteView<'_>) -> Result<Symbols> {
    block.expect_tag(0, SYMB_TAG)?;
    // declared size at 4 is not checked
    let slots = block.read_u32_array(8, 8)?;

    let mut symbols = Symbols::default();
    for &category in SymbolCategory::ALL.iter() {
        let names = read_names(block, slots[category.slot()])?;
        trace!(?category, count = names.len(), "read symbol table");
        symbols.tables[category as usize] = names;
    }
    Ok(symbols)
}

fn read_names(block: ByteView<'_>, table: u32) -> Result<Vec<Option<String>>> {
    if table == 0 {
        return Ok(Vec::new());
    }

    let count = block.read_u32(table as u64)?;
    let offsets = block.read_u32_array(table as u64 + 4, count)?;
    offsets
        .into_iter()
        .map(|offset| match offset {
            0 => Ok(None),
            _ => block.read_cstr(offset as u64).map(Some),
        })
        .collect()
}
