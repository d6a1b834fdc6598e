use crate::block::{ChannelBlock, DCT_SIZE};

/// Top-left corners of the four luma blocks inside a super-block, in stream order.
pub(crate) const QUADRANT_OFFSETS: [(usize, usize); 4] =
    [(0, 0), (0, DCT_SIZE), (DCT_SIZE, 0), (DCT_SIZE, DCT_SIZE)];

/// 4:2:0 decimation: keeps the sample at every even row and even column.
pub(crate) fn subsample(channel: &ChannelBlock) -> ChannelBlock {
    ChannelBlock::from_fn(channel.height / 2, channel.width / 2, |row, col| {
        channel[(row * 2, col * 2)]
    })
}

/// Splits a subsampled chroma block back into four full resolution blocks, one per
/// luma quadrant, by replicating each sample over a 2x2 neighborhood.
pub(crate) fn restore(subsampled: &ChannelBlock) -> [ChannelBlock; 4] {
    let half = DCT_SIZE / 2;

    QUADRANT_OFFSETS.map(|(row_offset, col_offset)| {
        let (row_offset, col_offset) = (row_offset / 2, col_offset / 2);
        debug_assert!(row_offset + half <= subsampled.height);

        ChannelBlock::from_fn(DCT_SIZE, DCT_SIZE, |row, col| {
            subsampled[(row_offset + row / 2, col_offset + col / 2)]
        })
    })
}
