pub(crate) mod code_table;
pub(crate) mod huffman_codec;

pub use code_table::{BitsWithLength, DecodeTable};
pub(crate) use code_table::{EncodeTable, MAX_CODE_LENGTH};
pub use huffman_codec::{decode, encode, HuffmanEncoded};
