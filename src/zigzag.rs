use crate::block::{BLOCK_LEN, DCT_SIZE};

/// `ZIGZAG[k]` is the `(row, col)` of the `k`th byte of a serialized block. This order is
/// part of the stream layout.
#[rustfmt::skip]
pub const ZIGZAG: [(usize, usize); BLOCK_LEN] = [
    (0, 0), (0, 1), (1, 0), (2, 0), (1, 1), (0, 2), (0, 3), (1, 2),
    (2, 1), (3, 0), (4, 0), (3, 1), (2, 2), (1, 3), (0, 4), (0, 5),
    (1, 4), (2, 3), (3, 2), (4, 1), (5, 0), (6, 0), (5, 1), (4, 2),
    (3, 3), (2, 4), (1, 5), (0, 6), (0, 7), (1, 6), (2, 5), (3, 4),
    (4, 3), (5, 2), (6, 1), (7, 0), (7, 1), (6, 2), (5, 3), (4, 4),
    (3, 5), (2, 6), (1, 7), (2, 7), (3, 6), (4, 5), (5, 4), (6, 3),
    (7, 2), (7, 3), (6, 4), (5, 5), (4, 6), (3, 7), (4, 7), (5, 6),
    (6, 5), (7, 4), (7, 5), (6, 6), (5, 7), (6, 7), (7, 6), (7, 7),
];

pub(crate) fn scan(block: &[[u8; DCT_SIZE]; DCT_SIZE]) -> [u8; BLOCK_LEN] {
    let mut sequence = [0u8; BLOCK_LEN];

    for (k, &(row, col)) in ZIGZAG.iter().enumerate() {
        sequence[k] = block[row][col];
    }

    sequence
}

pub(crate) fn unscan(sequence: &[u8]) -> [[u8; DCT_SIZE]; DCT_SIZE] {
    debug_assert_eq!(sequence.len(), BLOCK_LEN);
    let mut block = [[0u8; DCT_SIZE]; DCT_SIZE];

    for (&(row, col), &b) in ZIGZAG.iter().zip(sequence) {
        block[row][col] = b;
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_a_permutation() -> Result<()> {
        let cells: HashSet<_> = ZIGZAG.iter().copied().collect();

        assert_eq!(cells.len(), BLOCK_LEN);
        assert!(cells.iter().all(|&(row, col)| row < DCT_SIZE && col < DCT_SIZE));

        Ok(())
    }

    #[test]
    fn test_scan_unscan() -> Result<()> {
        let mut block = [[0u8; DCT_SIZE]; DCT_SIZE];
        for (row, cols) in block.iter_mut().enumerate() {
            for (col, b) in cols.iter_mut().enumerate() {
                *b = (row * DCT_SIZE + col) as u8;
            }
        }

        let sequence = scan(&block);
        assert_eq!(&sequence[..6], &[0, 1, 8, 16, 9, 2]);
        assert_eq!(sequence[BLOCK_LEN - 1], 63);

        assert_eq!(unscan(&sequence), block);

        Ok(())
    }

    #[test]
    fn test_low_frequencies_first() -> Result<()> {
        // anti-diagonal index never decreases
        let diagonals: Vec<_> = ZIGZAG.iter().map(|(row, col)| row + col).collect();

        assert!(diagonals.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(diagonals.first(), Some(&0));
        assert_eq!(diagonals.last(), Some(&14));

        Ok(())
    }
}
