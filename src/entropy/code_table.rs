use std::collections::HashMap;

use anyhow::Result;

use crate::error::CodecError;

/// Longest code a [`BitsWithLength`] can carry.
pub(crate) const MAX_CODE_LENGTH: usize = u64::BITS as usize;

/// A code as its low `length` bits. `bits = 0b01, length = 3` is the code `001`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitsWithLength {
    pub bits: u64,
    pub length: u8,
}

impl BitsWithLength {
    pub(crate) fn push(self, bit: u8) -> Self {
        BitsWithLength {
            bits: (self.bits << 1) | bit as u64,
            length: self.length + 1,
        }
    }
}

/// Byte value -> code, `None` for bytes absent from the stream.
pub(crate) type EncodeTable = [Option<BitsWithLength>; 256];

/// Code -> byte value. Travels with every compressed stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeTable {
    codes: HashMap<BitsWithLength, u8>,
    max_length: u8,
}

impl DecodeTable {
    pub(crate) fn from_encode_table(encode_table: &EncodeTable) -> Self {
        let mut table = DecodeTable::default();

        for (symbol, code) in encode_table.iter().enumerate() {
            if let Some(code) = code {
                table.codes.insert(*code, symbol as u8);
                table.max_length = table.max_length.max(code.length);
            }
        }

        table
    }

    /// Adds one entry read from outside, rejecting codes that could never have been
    /// produced by the encoder.
    pub fn insert(&mut self, code: BitsWithLength, symbol: u8) -> Result<()> {
        let length = code.length as usize;

        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(CodecError::InvalidContainer(format!(
                "code for byte {} has length {}",
                symbol, length
            ))
            .into());
        }

        if length < MAX_CODE_LENGTH && code.bits >> length != 0 {
            return Err(CodecError::InvalidContainer(format!(
                "code {:#b} for byte {} does not fit in {} bits",
                code.bits, symbol, length
            ))
            .into());
        }

        if self.codes.contains_key(&code) || self.codes.values().any(|&s| s == symbol) {
            return Err(CodecError::InvalidContainer(format!(
                "duplicate decode table entry for byte {}",
                symbol
            ))
            .into());
        }

        self.codes.insert(code, symbol);
        self.max_length = self.max_length.max(code.length);

        Ok(())
    }

    pub fn get(&self, code: &BitsWithLength) -> Option<u8> {
        self.codes.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Entries sorted by byte value.
    pub fn entries(&self) -> Vec<(u8, BitsWithLength)> {
        let mut entries: Vec<_> = self.codes.iter().map(|(code, symbol)| (*symbol, *code)).collect();
        entries.sort_unstable_by_key(|(symbol, _)| *symbol);

        entries
    }
}
