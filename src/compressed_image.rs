//! The compressed container.
//!
//! Everything is big-endian:
//!
//! ```text
//! magic        4 bytes  "TJPC"
//! quality      u8       1..=99
//! width        u32
//! height       u32
//! entry count  u16      0..=256
//! entries      per entry: byte value u8, code length u8, code bits u64
//! bits count   u64      meaningful bits in the payload
//! byte count   u64
//! payload      byte count bytes
//! ```

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use memmap::Mmap;

use crate::entropy::{BitsWithLength, DecodeTable};
use crate::error::CodecError;
use crate::quantization_table::Quality;

pub const MAGIC: [u8; 4] = *b"TJPC";

const ENTRY_BYTES: usize = 1 + 1 + 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub(crate) quality: Quality,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) decode_table: DecodeTable,
    pub(crate) bits_count: u64,
    pub(crate) compressed_bytes: Vec<u8>,
}

impl CompressedImage {
    pub fn new(
        quality: Quality,
        width: usize,
        height: usize,
        decode_table: DecodeTable,
        bits_count: u64,
        compressed_bytes: Vec<u8>,
    ) -> Result<Self> {
        if bits_count > compressed_bytes.len() as u64 * 8 {
            return Err(CodecError::InvalidContainer(format!(
                "{} bits declared for {} bytes",
                bits_count,
                compressed_bytes.len()
            ))
            .into());
        }

        Ok(CompressedImage {
            quality,
            width,
            height,
            decode_table,
            bits_count,
            compressed_bytes,
        })
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn decode_table(&self) -> &DecodeTable {
        &self.decode_table
    }

    pub fn bits_count(&self) -> u64 {
        self.bits_count
    }

    pub fn compressed_bytes(&self) -> &[u8] {
        &self.compressed_bytes
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let width = u32::try_from(self.width)
            .map_err(|_| CodecError::InvalidContainer(format!("width {} too large", self.width)))?;
        let height = u32::try_from(self.height).map_err(|_| {
            CodecError::InvalidContainer(format!("height {} too large", self.height))
        })?;

        let entries = self.decode_table.entries();
        let mut buffer = Vec::with_capacity(
            MAGIC.len() + 1 + 4 + 4 + 2 + entries.len() * ENTRY_BYTES + 8 + 8 + self.compressed_bytes.len(),
        );

        buffer.extend_from_slice(&MAGIC);
        buffer.push(self.quality.value());
        buffer.extend_from_slice(&width.to_be_bytes());
        buffer.extend_from_slice(&height.to_be_bytes());
        buffer.extend_from_slice(&(entries.len() as u16).to_be_bytes());

        for (symbol, BitsWithLength { bits, length }) in entries {
            buffer.push(symbol);
            buffer.push(length);
            buffer.extend_from_slice(&bits.to_be_bytes());
        }

        buffer.extend_from_slice(&self.bits_count.to_be_bytes());
        buffer.extend_from_slice(&(self.compressed_bytes.len() as u64).to_be_bytes());
        buffer.extend_from_slice(&self.compressed_bytes);

        Ok(buffer)
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self> {
        let mut reader = ContainerReader { buffer, cursor: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(CodecError::InvalidContainer("bad magic".to_string()).into());
        }

        let quality = Quality::new(reader.read_u8()? as i64)?;
        let width = reader.read_u32()? as usize;
        let height = reader.read_u32()? as usize;

        let entry_count = reader.read_u16()? as usize;
        if entry_count > 256 {
            return Err(CodecError::InvalidContainer(format!(
                "{} decode table entries",
                entry_count
            ))
            .into());
        }

        let mut decode_table = DecodeTable::default();
        for _ in 0..entry_count {
            let symbol = reader.read_u8()?;
            let length = reader.read_u8()?;
            let bits = reader.read_u64()?;

            decode_table.insert(BitsWithLength { bits, length }, symbol)?;
        }

        let bits_count = reader.read_u64()?;
        let byte_count = usize::try_from(reader.read_u64()?)
            .map_err(|_| CodecError::InvalidContainer("payload too large".to_string()))?;
        let compressed_bytes = reader.take(byte_count)?.to_vec();

        if reader.cursor != buffer.len() {
            return Err(CodecError::InvalidContainer(format!(
                "{} unexpected trailing bytes",
                buffer.len() - reader.cursor
            ))
            .into());
        }

        Self::new(quality, width, height, decode_table, bits_count, compressed_bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let buffer = self.to_bytes()?;

        std::fs::write(path, &buffer).with_context(|| format!("failed to write {:?}", path))?;
        debug!("saved {} bytes to {:?}", buffer.len(), path);

        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
        let mmap = unsafe { Mmap::map(&file)? };
        debug!("mapped {} bytes from {:?}", mmap.len(), path);

        Self::from_bytes(&mmap)
    }
}

struct ContainerReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ContainerReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|&end| end <= self.buffer.len())
            .ok_or_else(|| {
                CodecError::InvalidContainer(format!(
                    "truncated: wanted {} bytes at offset {}, have {}",
                    len,
                    self.cursor,
                    self.buffer.len()
                ))
            })?;

        let bytes = &self.buffer[self.cursor..end];
        self.cursor = end;

        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into()?))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into()?))
    }
}
