//! A small JPEG-style still image codec.
//!
//! Images are cut into 16x16 super-blocks. Each one yields four 8x8 luma blocks and one
//! 4:2:0 subsampled block per chroma channel; every block is level shifted, cosine
//! transformed, quantized, and zigzag serialized to 64 bytes, and the bytes of the whole
//! image are Huffman coded in one go. The stream is not JPEG compatible.
//!
//! ```no_run
//! use tiny_jpeg_codec::{compress, decompress, PixelGrid, Quality, Rgb};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut grid = PixelGrid::new(64, 48)?;
//! grid.set(10, 20, Rgb::new(255, 128, 0));
//!
//! let compressed = compress(&grid, Quality::new(70)?)?;
//! compressed.save("picture.tjpc")?;
//!
//! let restored = decompress(&compressed)?;
//! assert_eq!(restored.width(), 64);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;

pub mod block;
pub mod compressed_image;
pub mod entropy;
pub mod error;
pub mod quantization_table;
pub mod zigzag;

mod bitreader;
mod bitwriter;
mod color_spaces;
mod dct;
mod decoder;
mod encoder;
mod huffman_tree;
mod pixel_grid;
mod subsampling;

pub use color_spaces::{Channel, Rgb, YCbCr};
pub use compressed_image::CompressedImage;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::CodecError;
pub use pixel_grid::PixelGrid;
pub use quantization_table::{Quality, QuantizationTable};

pub fn compress(grid: &PixelGrid, quality: Quality) -> Result<CompressedImage> {
    Encoder::new(quality).encode(grid)
}

pub fn decompress(image: &CompressedImage) -> Result<PixelGrid> {
    Decoder::new(image).decode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn solid(width: usize, height: usize, rgb: Rgb) -> Result<PixelGrid> {
        let mut grid = PixelGrid::new(width, height)?;
        for row in 0..height {
            for col in 0..width {
                grid.set(row, col, rgb);
            }
        }

        Ok(grid)
    }

    fn max_channel_error(a: &PixelGrid, b: &PixelGrid) -> u8 {
        a.to_packed_rgb()
            .iter()
            .zip(b.to_packed_rgb())
            .map(|(x, y)| x.abs_diff(y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_solid_color_round_trip() -> Result<()> {
        for rgb in [Rgb::new(200, 100, 50), Rgb::new(10, 20, 30), Rgb::new(0, 0, 0)] {
            let grid = solid(16, 16, rgb)?;

            let compressed = compress(&grid, Quality::new(70)?)?;
            let restored = decompress(&compressed)?;

            for row in 0..16 {
                for col in 0..16 {
                    let got = restored.get(row, col).ok_or(anyhow::anyhow!("missing pixel"))?;
                    assert!(got.r.abs_diff(rgb.r) <= 3, "{:?} -> {:?}", rgb, got);
                    assert!(got.g.abs_diff(rgb.g) <= 3, "{:?} -> {:?}", rgb, got);
                    assert!(got.b.abs_diff(rgb.b) <= 3, "{:?} -> {:?}", rgb, got);
                }
            }
        }

        Ok(())
    }

    #[test]
    fn test_solid_color_compresses_well() -> Result<()> {
        let grid = solid(64, 64, Rgb::new(90, 160, 30))?;
        let compressed = compress(&grid, Quality::default())?;

        // 16 super-blocks * 384 bytes, almost all of them zero
        assert!(compressed.compressed_bytes().len() < 16 * 384 / 4);

        Ok(())
    }

    #[test]
    fn test_smooth_gradient_round_trip() -> Result<()> {
        let (width, height) = (48, 32);
        let mut grid = PixelGrid::new(width, height)?;
        for row in 0..height {
            for col in 0..width {
                grid.set(row, col, Rgb::new((col * 4) as u8, (row * 6) as u8, 120));
            }
        }

        let restored = decompress(&compress(&grid, Quality::new(70)?)?)?;

        assert!(max_channel_error(&grid, &restored) <= 16);

        Ok(())
    }

    #[test]
    fn test_odd_dimensions() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(3);
        let (width, height) = (37, 21);
        let data = (0..width * height * 3).map(|_| rng.random()).collect();
        let grid = PixelGrid::from_raw(width, height, width * 3, data)?;

        let compressed = compress(&grid, Quality::new(40)?)?;
        let restored = decompress(&compressed)?;

        assert_eq!((restored.width(), restored.height()), (width, height));
        assert_eq!(restored.stride(), width * 3);

        Ok(())
    }

    #[test]
    fn test_higher_quality_is_closer() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(11);
        let (width, height) = (32, 32);
        let mut grid = PixelGrid::new(width, height)?;
        for row in 0..height {
            for col in 0..width {
                let base = ((row + col) * 3) as u8;
                grid.set(row, col, Rgb::new(base, base.wrapping_add(rng.random_range(0..8)), 64));
            }
        }

        let error_at = |quality: i64| -> Result<u64> {
            let restored = decompress(&compress(&grid, Quality::new(quality)?)?)?;
            Ok(grid
                .to_packed_rgb()
                .iter()
                .zip(restored.to_packed_rgb())
                .map(|(a, b)| a.abs_diff(b) as u64)
                .sum())
        };

        assert!(error_at(70)? < error_at(5)?);

        Ok(())
    }

    #[test]
    fn test_container_round_trip() -> Result<()> {
        let grid = solid(20, 20, Rgb::new(30, 60, 90))?;
        let compressed = compress(&grid, Quality::new(25)?)?;

        let reloaded = CompressedImage::from_bytes(&compressed.to_bytes()?)?;

        assert_eq!(decompress(&reloaded)?, decompress(&compressed)?);

        Ok(())
    }

    #[test]
    fn test_corrupted_payload_is_an_error() -> Result<()> {
        let grid = solid(16, 16, Rgb::new(30, 60, 90))?;
        let compressed = compress(&grid, Quality::new(70)?)?;

        let truncated = CompressedImage::new(
            compressed.quality(),
            compressed.width(),
            compressed.height(),
            compressed.decode_table().clone(),
            compressed.bits_count() / 2,
            compressed.compressed_bytes().to_vec(),
        )?;

        let err = decompress(&truncated).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::MalformedStream(_))
        ));

        Ok(())
    }

    #[test]
    fn test_oversized_header_is_an_error() -> Result<()> {
        let grid = solid(16, 16, Rgb::new(30, 60, 90))?;
        let compressed = compress(&grid, Quality::new(70)?)?;

        let oversized = CompressedImage::new(
            compressed.quality(),
            u32::MAX as usize,
            u32::MAX as usize,
            compressed.decode_table().clone(),
            compressed.bits_count(),
            compressed.compressed_bytes().to_vec(),
        )?;
        let reloaded = CompressedImage::from_bytes(&oversized.to_bytes()?)?;

        let err = decompress(&reloaded).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::MalformedStream(_))
        ));

        Ok(())
    }
}
