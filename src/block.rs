use std::ops::{Index, IndexMut};

/// Side of one transform block.
pub const DCT_SIZE: usize = 8;

/// Side of the luma area that shares one pair of subsampled chroma blocks.
pub const SUPER_BLOCK_SIZE: usize = DCT_SIZE * 2;

/// Samples per transform block, and bytes per block in the quantized stream.
pub const BLOCK_LEN: usize = DCT_SIZE * DCT_SIZE;

/// Four luma blocks, one Cb, one Cr.
pub const BLOCKS_PER_SUPER_BLOCK: usize = 6;

/// Bytes one super-block contributes to the quantized stream.
pub const SUPER_BLOCK_BYTES: usize = BLOCKS_PER_SUPER_BLOCK * BLOCK_LEN;

/// Top-left pixel of every super-block covering a `height` x `width` image, in raster
/// order. Super-blocks on the right and bottom edges may hang past the image.
pub(crate) fn super_block_origins(height: usize, width: usize) -> Vec<(usize, usize)> {
    (0..height)
        .step_by(SUPER_BLOCK_SIZE)
        .flat_map(|row| {
            (0..width)
                .step_by(SUPER_BLOCK_SIZE)
                .map(move |col| (row, col))
        })
        .collect()
}

/// A row-major grid of real-valued samples for one channel, indexed `[(row, col)]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChannelBlock {
    pub(crate) height: usize,
    pub(crate) width: usize,
    pub(crate) data: Vec<f64>,
}

impl ChannelBlock {
    pub(crate) fn new(height: usize, width: usize) -> Self {
        ChannelBlock {
            height,
            width,
            data: vec![0.0; height * width],
        }
    }

    pub(crate) fn from_fn(height: usize, width: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let data = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|(row, col)| f(row, col))
            .collect();

        ChannelBlock {
            height,
            width,
            data,
        }
    }

    /// Adds `value` to every sample. Used for the ±128 level shift around the transform.
    pub(crate) fn shift(&mut self, value: f64) {
        self.data.iter_mut().for_each(|s| *s += value);
    }
}

impl Index<(usize, usize)> for ChannelBlock {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.width + col]
    }
}

impl IndexMut<(usize, usize)> for ChannelBlock {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.width + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_from_fn_is_row_major() -> Result<()> {
        let block = ChannelBlock::from_fn(2, 3, |row, col| (row * 10 + col) as f64);

        assert_eq!(block.data, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(block[(1, 2)], 12.0);

        Ok(())
    }

    #[test]
    fn test_super_block_origins() -> Result<()> {
        assert_eq!(
            super_block_origins(20, 40),
            vec![(0, 0), (0, 16), (0, 32), (16, 0), (16, 16), (16, 32)]
        );
        assert_eq!(super_block_origins(16, 16), vec![(0, 0)]);
        assert_eq!(super_block_origins(1, 1), vec![(0, 0)]);

        Ok(())
    }

    #[test]
    fn test_shift() -> Result<()> {
        let mut block = ChannelBlock::new(DCT_SIZE, DCT_SIZE);
        block[(3, 4)] = 10.0;
        block.shift(-128.0);

        assert_eq!(block[(3, 4)], -118.0);
        assert_eq!(block[(0, 0)], -128.0);

        Ok(())
    }
}
