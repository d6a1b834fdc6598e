use anyhow::Result;
use log::debug;
use rayon::prelude::*;

use crate::block::{
    super_block_origins, ChannelBlock, BLOCK_LEN, DCT_SIZE, SUPER_BLOCK_BYTES, SUPER_BLOCK_SIZE,
};
use crate::color_spaces::{Rgb, YCbCr};
use crate::compressed_image::CompressedImage;
use crate::dct::Dct;
use crate::entropy;
use crate::error::CodecError;
use crate::pixel_grid::PixelGrid;
use crate::quantization_table::QuantizationTable;
use crate::subsampling::{restore, QUADRANT_OFFSETS};
use crate::zigzag;

/// Rebuilds the pixel grid stored in a [`CompressedImage`].
pub struct Decoder<'a> {
    image: &'a CompressedImage,
    quantization_table: QuantizationTable,
    dct: Dct,
}

impl<'a> Decoder<'a> {
    pub fn new(image: &'a CompressedImage) -> Self {
        Decoder {
            image,
            quantization_table: QuantizationTable::new(image.quality()),
            dct: Dct::new(DCT_SIZE, DCT_SIZE),
        }
    }

    pub fn decode(&self) -> Result<PixelGrid> {
        let (width, height) = (self.image.width(), self.image.height());

        let quantized = entropy::decode(
            self.image.compressed_bytes(),
            self.image.decode_table(),
            self.image.bits_count(),
        )?;

        // checked before anything is sized from the declared dimensions
        let expected = stream_len(width, height).ok_or_else(|| {
            CodecError::MalformedStream(format!(
                "a {}x{} image is too large to decode",
                width, height
            ))
        })?;
        if quantized.len() != expected {
            return Err(CodecError::MalformedStream(format!(
                "decoded {} bytes, a {}x{} image needs {}",
                quantized.len(),
                width,
                height,
                expected
            ))
            .into());
        }

        let mut grid = PixelGrid::new(width, height)?;
        let origins = super_block_origins(height, width);
        debug!(
            "decompressing {}x{} image from {} super-blocks",
            width,
            height,
            origins.len()
        );

        let tiles: Vec<Vec<Rgb>> = quantized
            .par_chunks(SUPER_BLOCK_BYTES)
            .map(|super_block| self.decode_super_block(super_block))
            .collect();

        for ((row, col), tile) in origins.into_iter().zip(tiles) {
            for (i, rgb) in tile.into_iter().enumerate() {
                // pixels past the right or bottom edge are dropped
                grid.set(row + i / SUPER_BLOCK_SIZE, col + i % SUPER_BLOCK_SIZE, rgb);
            }
        }

        Ok(grid)
    }

    /// Returns the super-block's pixels, row-major.
    fn decode_super_block(&self, super_block: &[u8]) -> Vec<Rgb> {
        let blocks: Vec<ChannelBlock> = super_block
            .chunks(BLOCK_LEN)
            .map(|block| self.decode_block(block))
            .collect();

        let (luma, chroma) = blocks.split_at(QUADRANT_OFFSETS.len());
        let cb = restore(&chroma[0]);
        let cr = restore(&chroma[1]);

        let mut tile = vec![Rgb::default(); SUPER_BLOCK_SIZE * SUPER_BLOCK_SIZE];
        for (quadrant, &(row_offset, col_offset)) in QUADRANT_OFFSETS.iter().enumerate() {
            for row in 0..DCT_SIZE {
                for col in 0..DCT_SIZE {
                    let ycbcr = YCbCr {
                        y: luma[quadrant][(row, col)],
                        cb: cb[quadrant][(row, col)],
                        cr: cr[quadrant][(row, col)],
                    };

                    tile[(row_offset + row) * SUPER_BLOCK_SIZE + col_offset + col] =
                        ycbcr.to_rgb();
                }
            }
        }

        tile
    }

    fn decode_block(&self, block: &[u8]) -> ChannelBlock {
        let freqs = self.quantization_table.dequantize(&zigzag::unscan(block));

        let mut samples = ChannelBlock::new(DCT_SIZE, DCT_SIZE);
        self.dct.inverse(&freqs, &mut samples);
        samples.shift(128.0);

        samples
    }
}

/// Quantized stream length for a `width` x `height` image, `None` on overflow.
fn stream_len(width: usize, height: usize) -> Option<usize> {
    height
        .div_ceil(SUPER_BLOCK_SIZE)
        .checked_mul(width.div_ceil(SUPER_BLOCK_SIZE))?
        .checked_mul(SUPER_BLOCK_BYTES)
}
