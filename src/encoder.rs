use anyhow::Result;
use log::debug;
use rayon::prelude::*;

use crate::block::{
    super_block_origins, ChannelBlock, BLOCK_LEN, DCT_SIZE, SUPER_BLOCK_BYTES, SUPER_BLOCK_SIZE,
};
use crate::color_spaces::{Channel, YCbCr};
use crate::compressed_image::CompressedImage;
use crate::dct::Dct;
use crate::entropy::{self, HuffmanEncoded};
use crate::pixel_grid::PixelGrid;
use crate::quantization_table::{Quality, QuantizationTable};
use crate::subsampling::{subsample, QUADRANT_OFFSETS};
use crate::zigzag;

/// Turns a [`PixelGrid`] into a [`CompressedImage`] at a fixed quality.
pub struct Encoder {
    quantization_table: QuantizationTable,
    dct: Dct,
}

impl Encoder {
    pub fn new(quality: Quality) -> Self {
        Encoder {
            quantization_table: QuantizationTable::new(quality),
            dct: Dct::new(DCT_SIZE, DCT_SIZE),
        }
    }

    pub fn encode(&self, grid: &PixelGrid) -> Result<CompressedImage> {
        let origins = super_block_origins(grid.height(), grid.width());
        debug!(
            "compressing {}x{} image as {} super-blocks at quality {}",
            grid.width(),
            grid.height(),
            origins.len(),
            self.quantization_table.quality().value()
        );

        // collect keeps raster order regardless of which worker finished first
        let super_blocks: Vec<Vec<u8>> = origins
            .par_iter()
            .map(|&(row, col)| self.encode_super_block(grid, row, col))
            .collect();
        let quantized = super_blocks.concat();
        debug_assert_eq!(quantized.len(), origins.len() * SUPER_BLOCK_BYTES);

        let HuffmanEncoded {
            bytes,
            decode_table,
            bits_count,
        } = entropy::encode(&quantized)?;
        debug!(
            "{} quantized bytes entropy coded into {} bytes",
            quantized.len(),
            bytes.len()
        );

        CompressedImage::new(
            self.quantization_table.quality(),
            grid.width(),
            grid.height(),
            decode_table,
            bits_count,
            bytes,
        )
    }

    /// Y top-left, Y top-right, Y bottom-left, Y bottom-right, Cb, Cr: 64 bytes each.
    fn encode_super_block(&self, grid: &PixelGrid, row: usize, col: usize) -> Vec<u8> {
        let tile: Vec<YCbCr> = (0..SUPER_BLOCK_SIZE)
            .flat_map(|y| (0..SUPER_BLOCK_SIZE).map(move |x| (y, x)))
            .map(|(y, x)| grid.ycbcr(row + y, col + x))
            .collect();

        let channel_block = |channel: Channel, size: usize, row_offset: usize, col_offset: usize| {
            ChannelBlock::from_fn(size, size, |y, x| {
                tile[(row_offset + y) * SUPER_BLOCK_SIZE + col_offset + x].component(channel)
            })
        };

        let mut blocks: Vec<ChannelBlock> = QUADRANT_OFFSETS
            .iter()
            .map(|&(row_offset, col_offset)| {
                channel_block(Channel::Y, DCT_SIZE, row_offset, col_offset)
            })
            .collect();
        blocks.push(subsample(&channel_block(Channel::Cb, SUPER_BLOCK_SIZE, 0, 0)));
        blocks.push(subsample(&channel_block(Channel::Cr, SUPER_BLOCK_SIZE, 0, 0)));

        let mut bytes = Vec::with_capacity(SUPER_BLOCK_BYTES);
        for block in blocks {
            bytes.extend_from_slice(&self.encode_block(block));
        }

        bytes
    }

    fn encode_block(&self, mut block: ChannelBlock) -> [u8; BLOCK_LEN] {
        block.shift(-128.0);
        let freqs = self.dct.forward(&block);

        zigzag::scan(&self.quantization_table.quantize(&freqs))
    }
}
