use std::f64::consts::PI;

use rayon::prelude::*;

use crate::block::ChannelBlock;

/// Constants of a `width` x `height` cosine transform.
///
/// `cos_x[u * width + x]` holds `cos((2x + 1) * u * pi / 2W)`, `cos_y` the same along
/// the vertical axis. The forward and inverse passes are both scaled by
/// `beta = 1/W + 1/H`, which makes them exact inverses of each other for square blocks.
#[derive(Debug, Clone)]
pub(crate) struct Dct {
    width: usize,
    height: usize,
    beta: f64,
    cos_x: Vec<f64>,
    cos_y: Vec<f64>,
}

impl Dct {
    fn alpha(k: usize) -> f64 {
        match k {
            0 => std::f64::consts::FRAC_1_SQRT_2,
            _ => 1.0,
        }
    }

    fn cos_table(n: usize) -> Vec<f64> {
        let pi_by_n = PI / (2 * n) as f64;

        (0..n)
            .flat_map(|freq| (0..n).map(move |pos| (freq, pos)))
            .map(|(freq, pos)| ((2.0 * pos as f64 + 1.0) * freq as f64 * pi_by_n).cos())
            .collect()
    }

    pub(crate) fn new(width: usize, height: usize) -> Self {
        Dct {
            width,
            height,
            beta: 1.0 / width as f64 + 1.0 / height as f64,
            cos_x: Self::cos_table(width),
            cos_y: Self::cos_table(height),
        }
    }

    fn basis(&self, u: usize, v: usize, x: usize, y: usize) -> f64 {
        self.cos_x[u * self.width + x] * self.cos_y[v * self.height + y]
    }

    /// Coefficient `(v, u)` of the result is the vertical frequency `v` and horizontal
    /// frequency `u` of `block`.
    pub(crate) fn forward(&self, block: &ChannelBlock) -> ChannelBlock {
        debug_assert_eq!((block.height, block.width), (self.height, self.width));

        let mut coeffs = ChannelBlock::new(self.height, self.width);

        coeffs
            .data
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(v, row)| {
                for (u, coeff) in row.iter_mut().enumerate() {
                    let mut sum = 0.0;

                    for y in 0..self.height {
                        for x in 0..self.width {
                            sum += block[(y, x)] * self.basis(u, v, x, y);
                        }
                    }

                    *coeff = sum * self.beta * Self::alpha(u) * Self::alpha(v);
                }
            });

        coeffs
    }

    pub(crate) fn inverse(&self, coeffs: &ChannelBlock, output: &mut ChannelBlock) {
        debug_assert_eq!((coeffs.height, coeffs.width), (self.height, self.width));
        debug_assert_eq!((output.height, output.width), (self.height, self.width));

        output
            .data
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, sample) in row.iter_mut().enumerate() {
                    let mut sum = 0.0;

                    for v in 0..self.height {
                        for u in 0..self.width {
                            sum += coeffs[(v, u)]
                                * self.basis(u, v, x, y)
                                * Self::alpha(u)
                                * Self::alpha(v);
                        }
                    }

                    *sample = sum * self.beta;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BLOCK_LEN, DCT_SIZE};
    use anyhow::Result;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-9;

    fn assert_round_trip(block: &ChannelBlock) {
        let dct = Dct::new(DCT_SIZE, DCT_SIZE);
        let coeffs = dct.forward(block);
        let mut restored = ChannelBlock::new(DCT_SIZE, DCT_SIZE);
        dct.inverse(&coeffs, &mut restored);

        for (got, expected) in restored.data.iter().zip(block.data.iter()) {
            assert!((got - expected).abs() < TOLERANCE, "{} != {}", got, expected);
        }
    }

    #[test]
    fn test_round_trip_zero() -> Result<()> {
        assert_round_trip(&ChannelBlock::new(DCT_SIZE, DCT_SIZE));
        Ok(())
    }

    #[test]
    fn test_round_trip_constant() -> Result<()> {
        assert_round_trip(&ChannelBlock::from_fn(DCT_SIZE, DCT_SIZE, |_, _| 72.5));
        Ok(())
    }

    #[test]
    fn test_round_trip_random() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..16 {
            let data = (0..BLOCK_LEN).map(|_| rng.random_range(-128.0..128.0)).collect();
            assert_round_trip(&ChannelBlock {
                height: DCT_SIZE,
                width: DCT_SIZE,
                data,
            });
        }

        Ok(())
    }

    #[test]
    fn test_constant_block_has_only_dc() -> Result<()> {
        let dct = Dct::new(DCT_SIZE, DCT_SIZE);
        let coeffs = dct.forward(&ChannelBlock::from_fn(DCT_SIZE, DCT_SIZE, |_, _| 10.0));

        // beta * alpha(0)^2 * 64 samples = 1/4 * 1/2 * 64 = 8
        assert!((coeffs[(0, 0)] - 80.0).abs() < TOLERANCE);
        assert!(coeffs.data[1..].iter().all(|c| c.abs() < TOLERANCE));

        Ok(())
    }

    #[test]
    fn test_horizontal_ramp_has_no_vertical_frequencies() -> Result<()> {
        let dct = Dct::new(DCT_SIZE, DCT_SIZE);
        let coeffs = dct.forward(&ChannelBlock::from_fn(DCT_SIZE, DCT_SIZE, |_, col| col as f64));

        for v in 1..DCT_SIZE {
            for u in 0..DCT_SIZE {
                assert!(coeffs[(v, u)].abs() < TOLERANCE);
            }
        }
        assert!(coeffs[(0, 1)].abs() > 1.0);

        Ok(())
    }
}
