use std::cmp::Ordering;
use std::collections::BinaryHeap;

use anyhow::Result;

use crate::entropy::{BitsWithLength, EncodeTable, MAX_CODE_LENGTH};
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CodeFreq {
    pub(crate) code: u8,
    pub(crate) freq: usize,
}

impl From<(u8, usize)> for CodeFreq {
    fn from((code, freq): (u8, usize)) -> Self {
        CodeFreq { code, freq }
    }
}

#[derive(Debug)]
pub(crate) enum HuffmanNode {
    Leaf(CodeFreq),
    Internal {
        freq: usize,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub(crate) fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf(CodeFreq { freq, .. }) => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// Min-heap entry. Equal frequencies pop in creation order: leaves by ascending byte
/// value first, then merged nodes in the order they were built.
#[derive(Debug)]
pub(crate) struct HeapItem {
    freq: usize,
    seq: usize,
    node: HuffmanNode,
}

impl HeapItem {
    fn from(seq: usize, node: HuffmanNode) -> Self {
        HeapItem {
            freq: node.freq(),
            seq,
            node,
        }
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}

impl Eq for HeapItem {}

#[derive(Debug)]
pub(crate) struct HuffmanTree {
    pub(crate) root: HuffmanNode,
}

impl HuffmanTree {
    /// Builds the tree over every code with a nonzero frequency. `None` when there is
    /// nothing to encode.
    pub(crate) fn from(code_freqs: Vec<CodeFreq>) -> Option<Self> {
        let mut min_heap = BinaryHeap::new();
        let mut seq = 0;

        for code_freq in code_freqs.into_iter().filter(|cf| cf.freq > 0) {
            min_heap.push(HeapItem::from(seq, HuffmanNode::Leaf(code_freq)));
            seq += 1;
        }

        while min_heap.len() > 1 {
            match (min_heap.pop(), min_heap.pop()) {
                (Some(first), Some(second)) => {
                    let node = HuffmanNode::Internal {
                        freq: first.freq + second.freq,
                        left: Box::new(second.node),
                        right: Box::new(first.node),
                    };

                    min_heap.push(HeapItem::from(seq, node));
                    seq += 1;
                }
                _ => break,
            }
        }

        min_heap.pop().map(|HeapItem { node: root, .. }| HuffmanTree { root })
    }

    /// Left edges append a 1 bit, right edges a 0 bit. A tree made of a single leaf
    /// still gets the one bit code `0`.
    pub(crate) fn encode_table(&self) -> Result<EncodeTable> {
        let mut table = [None; 256];

        match &self.root {
            HuffmanNode::Leaf(CodeFreq { code, .. }) => {
                table[*code as usize] = Some(BitsWithLength { bits: 0, length: 1 });
            }
            internal => Self::fill_encode_table(internal, &mut table, 0, 0)?,
        }

        Ok(table)
    }

    fn fill_encode_table(
        node: &HuffmanNode,
        table: &mut EncodeTable,
        bits: u64,
        depth: usize,
    ) -> Result<()> {
        match node {
            HuffmanNode::Leaf(CodeFreq { code, .. }) => {
                if depth > MAX_CODE_LENGTH {
                    return Err(CodecError::CodeTooLong {
                        symbol: *code,
                        length: depth,
                    }
                    .into());
                }

                table[*code as usize] = Some(BitsWithLength {
                    bits,
                    length: depth as u8,
                });
            }
            HuffmanNode::Internal { left, right, .. } => {
                Self::fill_encode_table(left, table, (bits << 1) | 1, depth + 1)?;
                Self::fill_encode_table(right, table, bits << 1, depth + 1)?;
            }
        }

        Ok(())
    }
}
