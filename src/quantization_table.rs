use anyhow::Result;

use crate::block::{ChannelBlock, DCT_SIZE};
use crate::error::CodecError;

/// Luminance base table, row-major. Part of the stream contract: a decoder scales the
/// same table by the stored quality.
pub const BASE_TABLE: [[u16; DCT_SIZE]; DCT_SIZE] = [
    [16, 11, 10, 16, 24, 40, 51, 61],
    [12, 12, 14, 19, 26, 58, 60, 55],
    [14, 13, 16, 24, 40, 57, 69, 56],
    [14, 17, 22, 29, 51, 87, 80, 62],
    [18, 22, 37, 56, 68, 109, 103, 77],
    [24, 35, 55, 64, 81, 104, 113, 92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 103, 99],
];

/// Compression quality in `[1, 99]`. Higher keeps more of each block.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn new(quality: i64) -> Result<Self> {
        match u8::try_from(quality) {
            Ok(q) if (Self::MIN..=Self::MAX).contains(&q) => Ok(Quality(q)),
            _ => Err(CodecError::InvalidQuality(quality).into()),
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    fn multiplier(&self) -> u32 {
        let quality = self.0 as u32;

        if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(70)
    }
}

impl TryFrom<u8> for Quality {
    type Error = anyhow::Error;

    fn try_from(quality: u8) -> Result<Self> {
        Quality::new(quality as i64)
    }
}

/// The base table scaled for one quality level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTable {
    quality: Quality,
    elements: [[u16; DCT_SIZE]; DCT_SIZE],
}

impl QuantizationTable {
    pub fn new(quality: Quality) -> Self {
        let multiplier = quality.multiplier();
        let mut elements = BASE_TABLE;

        elements.iter_mut().flatten().for_each(|q| {
            // high qualities round the smallest entries down to 0
            *q = ((multiplier * *q as u32 + 50) / 100).max(1) as u16;
        });

        QuantizationTable { quality, elements }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn elements(&self) -> &[[u16; DCT_SIZE]; DCT_SIZE] {
        &self.elements
    }

    /// Divides, truncates toward zero, and saturates each coefficient into `i8`. The
    /// result keeps the raw two's complement byte.
    pub(crate) fn quantize(&self, freqs: &ChannelBlock) -> [[u8; DCT_SIZE]; DCT_SIZE] {
        let mut quantized = [[0u8; DCT_SIZE]; DCT_SIZE];

        for (row, quantized_row) in quantized.iter_mut().enumerate() {
            for (col, q) in quantized_row.iter_mut().enumerate() {
                *q = (freqs[(row, col)] / self.elements[row][col] as f64) as i8 as u8;
            }
        }

        quantized
    }

    /// Reads every byte back as `i8` before scaling, so negative coefficients survive.
    pub(crate) fn dequantize(&self, quantized: &[[u8; DCT_SIZE]; DCT_SIZE]) -> ChannelBlock {
        ChannelBlock::from_fn(DCT_SIZE, DCT_SIZE, |row, col| {
            quantized[row][col] as i8 as f64 * self.elements[row][col] as f64
        })
    }
}
