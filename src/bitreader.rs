use anyhow::Result;

use crate::error::CodecError;

/// Reads bits most significant first, stopping after `bits_count` bits even when the
/// last byte has room for more.
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    bits_count: u64,
    bit_cur: u64,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8], bits_count: u64) -> Result<Self> {
        let available = data.len() as u64 * 8;

        if bits_count > available {
            return Err(CodecError::MalformedStream(format!(
                "declared {} bits but only {} are available",
                bits_count, available
            ))
            .into());
        }

        Ok(BitReader {
            data,
            bits_count,
            bit_cur: 0,
        })
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.bits_count - self.bit_cur
    }
}

impl Iterator for BitReader<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.bit_cur >= self.bits_count {
            return None;
        }

        let byte = self.data[(self.bit_cur / 8) as usize];
        let bit = (byte >> (7 - self.bit_cur % 8)) & 1;
        self.bit_cur += 1;

        Some(bit)
    }
}
