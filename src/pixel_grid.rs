use anyhow::Result;

use crate::color_spaces::{Rgb, YCbCr};
use crate::error::CodecError;

const BYTES_PER_PIXEL: usize = 3;

/// A bounds-checked raster of 24-bit pixels.
///
/// Rows are `stride` bytes apart, so a buffer carrying per-row padding (as bitmap
/// rows usually do) can be wrapped as-is. Padding bytes are never read or written
/// through the pixel accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let stride = width
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(CodecError::InvalidDimensions {
                width,
                height,
                stride: usize::MAX,
            })?;

        Self::with_stride(width, height, stride)
    }

    pub fn with_stride(width: usize, height: usize, stride: usize) -> Result<Self> {
        let len = Self::validate(width, height, stride)?;

        Ok(PixelGrid {
            width,
            height,
            stride,
            data: vec![0; len],
        })
    }

    /// Wraps an existing buffer of `height` rows, each `stride` bytes long.
    pub fn from_raw(width: usize, height: usize, stride: usize, data: Vec<u8>) -> Result<Self> {
        let len = Self::validate(width, height, stride)?;

        if data.len() != len {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                stride,
            }
            .into());
        }

        Ok(PixelGrid {
            width,
            height,
            stride,
            data,
        })
    }

    /// Returns the buffer length the dimensions call for.
    fn validate(width: usize, height: usize, stride: usize) -> Result<usize> {
        let invalid = CodecError::InvalidDimensions {
            width,
            height,
            stride,
        };

        let row_len = width.checked_mul(BYTES_PER_PIXEL);
        if width == 0 || height == 0 || row_len.map_or(true, |row_len| stride < row_len) {
            return Err(invalid.into());
        }

        stride.checked_mul(height).ok_or_else(|| invalid.into())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height || col >= self.width {
            return None;
        }

        Some(row * self.stride + col * BYTES_PER_PIXEL)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
        let offset = self.offset(row, col)?;
        let px = &self.data[offset..offset + BYTES_PER_PIXEL];

        Some(Rgb::new(px[0], px[1], px[2]))
    }

    /// Returns `false` and leaves the grid untouched when `(row, col)` is outside it.
    pub fn set(&mut self, row: usize, col: usize, rgb: Rgb) -> bool {
        match self.offset(row, col) {
            Some(offset) => {
                self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[rgb.r, rgb.g, rgb.b]);
                true
            }
            None => false,
        }
    }

    /// Reads one pixel as YCbCr. Coordinates past the edge of the image read as all
    /// zero components so that super-blocks overhanging the right or bottom border can
    /// still be transformed.
    pub(crate) fn ycbcr(&self, row: usize, col: usize) -> YCbCr {
        match self.get(row, col) {
            Some(rgb) => YCbCr::from_rgb(rgb),
            None => YCbCr {
                y: 0.0,
                cb: 0.0,
                cr: 0.0,
            },
        }
    }

    /// Tightly packed `RGBRGB...` bytes, row padding stripped.
    pub fn to_packed_rgb(&self) -> Vec<u8> {
        let row_len = self.width * BYTES_PER_PIXEL;

        self.data
            .chunks(self.stride)
            .flat_map(|row| &row[..row_len])
            .copied()
            .collect()
    }
}
