use crate::error::*;
use byteorder::{ByteOrder, LE};
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Four-byte block signature.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn data(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(")?;
        fmt::Display::fmt(&self, f)?;
        write!(f, ")")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0.iter() {
            write!(f, "{}", char::from(b).escape_default())?;
        }
        Ok(())
    }
}

/// Random-access storage that views read from.
///
/// Every read names its absolute offset, so implementations never rely on a
/// cursor left behind by an earlier read.
pub trait ByteSource {
    fn size(&self) -> u64;
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

impl ByteSource for [u8] {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = offset as usize;
        let src = start
            .checked_add(buf.len())
            .and_then(|end| self.get(start..end))
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "read past end of buffer"))?;
        buf.copy_from_slice(src);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn size(&self) -> u64 {
        self.as_slice().size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_at(offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}

/// Adapts a seekable reader (a `File`, a `Cursor`, ...) into a [`ByteSource`].
///
/// Reads are serialized through a `RefCell`; players on other threads need
/// their own handle.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: RefCell<R>,
    size: u64,
}

impl<R: Read + Seek> ReaderSource<R> {
    pub fn new(mut reader: R) -> io::Result<Self> {
        let size = reader.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner: RefCell::new(reader),
            size,
        })
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut reader = self.inner.borrow_mut();
        reader.seek(SeekFrom::Start(offset))?;
        reader.read_exact(buf)
    }
}

/// Bounds-checked window over a [`ByteSource`].
///
/// Offsets passed to the accessors are relative to the start of the view.
#[derive(Clone, Copy)]
pub struct ByteView<'a> {
    source: &'a dyn ByteSource,
    offset: u64,
    len: u64,
}

impl fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl<'a> ByteView<'a> {
    /// A view spanning the whole source.
    pub fn new(source: &'a dyn ByteSource) -> Self {
        Self {
            source,
            offset: 0,
            len: source.size(),
        }
    }

    /// Absolute position of the view within its source.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check(&self, offset: u64, len: u64) -> Result<u64> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(self.offset + offset),
            _ => Err(SdatError::OutOfRange {
                offset,
                len,
                limit: self.len,
            }),
        }
    }

    pub fn sub(&self, offset: u64, len: u64) -> Result<ByteView<'a>> {
        let start = self.check(offset, len)?;
        Ok(Self {
            source: self.source,
            offset: start,
            len,
        })
    }

    /// Everything from `offset` to the end of the view.
    pub fn tail(&self, offset: u64) -> Result<ByteView<'a>> {
        let len = self.len.checked_sub(offset).ok_or(SdatError::OutOfRange {
            offset,
            len: 0,
            limit: self.len,
        })?;
        self.sub(offset, len)
    }

    pub fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let start = self.check(offset, buf.len() as u64)?;
        self.source.read_at(start, buf)?;
        Ok(())
    }

    pub fn read_vec(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.check(offset, len as u64)?;
        let mut buf = vec![0; len];
        self.read_into(offset, &mut buf)?;
        Ok(buf)
    }

    /// Copies the whole view into `buf`, reusing its allocation.
    pub fn read_all_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        buf.resize(self.len as usize, 0);
        self.read_into(0, buf)
    }

    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_into(offset, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&self, offset: u64) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_into(offset, &mut buf)?;
        Ok(LE::read_u16(&buf))
    }

    pub fn read_u32(&self, offset: u64) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_into(offset, &mut buf)?;
        Ok(LE::read_u32(&buf))
    }

    pub fn read_u32_array(&self, offset: u64, count: u32) -> Result<Vec<u32>> {
        let data = self.read_vec(offset, count as usize * 4)?;
        Ok(data.chunks_exact(4).map(LE::read_u32).collect())
    }

    pub fn read_tag(&self, offset: u64) -> Result<Tag> {
        let mut buf = [0; 4];
        self.read_into(offset, &mut buf)?;
        Ok(Tag(buf))
    }

    pub fn expect_tag(&self, offset: u64, expected: Tag) -> Result<()> {
        let found = self.read_tag(offset)?;
        if found != expected {
            return Err(SdatError::BadSignature { expected, found });
        }
        Ok(())
    }

    /// Reads a null-terminated string. Invalid UTF-8 is replaced, a missing
    /// terminator is an error.
    pub fn read_cstr(&self, offset: u64) -> Result<String> {
        const CHUNK: u64 = 32;

        let mut bytes = Vec::new();
        let mut pos = offset;
        loop {
            let remaining = self.len.saturating_sub(pos);
            if remaining == 0 {
                return Err(SdatError::OutOfRange {
                    offset,
                    len: pos.saturating_sub(offset) + 1,
                    limit: self.len,
                });
            }
            let chunk = self.read_vec(pos, remaining.min(CHUNK) as usize)?;
            if let Some(nul) = chunk.iter().position(|&b| b == 0) {
                bytes.extend_from_slice(&chunk[..nul]);
                break;
            }
            bytes.extend_from_slice(&chunk);
            pos += chunk.len() as u64;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
