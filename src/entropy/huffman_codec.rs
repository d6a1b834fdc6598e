use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use log::{debug, trace};
use rayon::prelude::*;

use crate::bitreader::BitReader;
use crate::bitwriter::BitWriter;
use crate::entropy::{BitsWithLength, DecodeTable};
use crate::error::CodecError;
use crate::huffman_tree::{CodeFreq, HuffmanTree};

const FREQUENCY_CHUNK: usize = 1 << 16;

/// Output of [`encode`]: the packed bits and everything needed to read them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub bytes: Vec<u8>,
    pub decode_table: DecodeTable,
    pub bits_count: u64,
}

/// Counts every byte value. Chunks are tallied on the rayon pool and merged into
/// shared atomic counters.
pub(crate) fn calculate_frequencies(data: &[u8]) -> [usize; 256] {
    let counters: Vec<AtomicUsize> = (0..256).map(|_| AtomicUsize::new(0)).collect();

    data.par_chunks(FREQUENCY_CHUNK).for_each(|chunk| {
        let mut local = [0usize; 256];
        for &b in chunk {
            local[b as usize] += 1;
        }

        for (counter, count) in counters.iter().zip(local) {
            if count > 0 {
                counter.fetch_add(count, Ordering::Relaxed);
            }
        }
    });

    std::array::from_fn(|b| counters[b].load(Ordering::Relaxed))
}

pub fn encode(data: &[u8]) -> Result<HuffmanEncoded> {
    let frequencies = calculate_frequencies(data);
    let code_freqs = frequencies
        .iter()
        .enumerate()
        .map(|(code, &freq)| CodeFreq::from((code as u8, freq)))
        .collect();

    let tree = match HuffmanTree::from(code_freqs) {
        Some(tree) => tree,
        None => {
            return Ok(HuffmanEncoded {
                bytes: vec![],
                decode_table: DecodeTable::default(),
                bits_count: 0,
            })
        }
    };

    let encode_table = tree.encode_table()?;
    let decode_table = DecodeTable::from_encode_table(&encode_table);
    trace!("huffman table: {:?}", decode_table.entries());

    let mut writer = BitWriter::with_capacity(data.len() / 2);
    for &b in data {
        match encode_table[b as usize] {
            Some(code) => writer.write(code),
            None => unreachable!("byte {} was counted but has no code", b),
        }
    }

    let (bytes, bits_count) = writer.finish();
    debug!(
        "huffman encoded {} bytes into {} bits with {} codes (longest {})",
        data.len(),
        bits_count,
        decode_table.len(),
        decode_table.max_length()
    );

    Ok(HuffmanEncoded {
        bytes,
        decode_table,
        bits_count,
    })
}

/// Consumes exactly `bits_count` bits of `encoded`. Bits past that point, including
/// the padding of the last byte, are never looked at.
pub fn decode(encoded: &[u8], decode_table: &DecodeTable, bits_count: u64) -> Result<Vec<u8>> {
    let reader = BitReader::new(encoded, bits_count)?;
    let mut decoded = Vec::with_capacity(reader.remaining() as usize / 2);
    let mut sample = BitsWithLength::default();

    for bit in reader {
        sample = sample.push(bit);

        if let Some(b) = decode_table.get(&sample) {
            decoded.push(b);
            sample = BitsWithLength::default();
        } else if sample.length >= decode_table.max_length() {
            return Err(CodecError::MalformedStream(format!(
                "no code matches {:#b} ({} bits) after {} decoded bytes",
                sample.bits,
                sample.length,
                decoded.len()
            ))
            .into());
        }
    }

    if sample.length > 0 {
        return Err(CodecError::MalformedStream(format!(
            "stream ends inside a code: {} dangling bits",
            sample.length
        ))
        .into());
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn round_trip(data: &[u8]) -> Result<HuffmanEncoded> {
        let encoded = encode(data)?;
        let decoded = decode(&encoded.bytes, &encoded.decode_table, encoded.bits_count)?;

        assert_eq!(decoded, data);
        assert!(encoded.bits_count <= encoded.bytes.len() as u64 * 8);
        assert!(encoded.bits_count + 8 > encoded.bytes.len() as u64 * 8);

        Ok(encoded)
    }

    fn assert_malformed(err: anyhow::Error) {
        assert!(
            matches!(
                err.downcast_ref::<CodecError>(),
                Some(CodecError::MalformedStream(_))
            ),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_frequencies() -> Result<()> {
        let mut data = vec![7u8; FREQUENCY_CHUNK * 3 + 11];
        data[5] = 0;
        data[FREQUENCY_CHUNK * 2] = 255;

        let freqs = calculate_frequencies(&data);

        assert_eq!(freqs[0], 1);
        assert_eq!(freqs[255], 1);
        assert_eq!(freqs[7], data.len() - 2);
        assert_eq!(freqs.iter().sum::<usize>(), data.len());

        Ok(())
    }

    #[test]
    fn test_round_trip_text() -> Result<()> {
        round_trip(b"abracadabra, a huffman round trip")?;
        Ok(())
    }

    #[test]
    fn test_single_repeated_byte() -> Result<()> {
        let encoded = round_trip(&[0x42; 1000])?;

        assert_eq!(encoded.bits_count, 1000);
        assert_eq!(encoded.decode_table.len(), 1);
        assert_eq!(encoded.bytes.len(), 125);

        round_trip(&[9])?;

        Ok(())
    }

    #[test]
    fn test_all_byte_values_once() -> Result<()> {
        let data: Vec<u8> = (0..=255).collect();
        let encoded = round_trip(&data)?;

        // a balanced tree over 256 equally likely symbols
        assert_eq!(encoded.bits_count, 256 * 8);
        assert_eq!(encoded.decode_table.max_length(), 8);

        Ok(())
    }

    #[test]
    fn test_round_trip_random() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);

        for len in [1, 2, 3, 100, 4096, 100_000] {
            // skewed towards small values, like quantized coefficients
            let data: Vec<u8> = (0..len)
                .map(|_| {
                    let v: u8 = rng.random();
                    v >> rng.random_range(0..8u32)
                })
                .collect();

            round_trip(&data)?;
        }

        Ok(())
    }

    #[test]
    fn test_empty() -> Result<()> {
        let encoded = round_trip(&[])?;

        assert_eq!(encoded.bits_count, 0);
        assert!(encoded.decode_table.is_empty());

        Ok(())
    }

    #[test]
    fn test_trailing_bits_are_ignored() -> Result<()> {
        let data = b"mississippi river".to_vec();
        let encoded = encode(&data)?;

        let mut padded = encoded.bytes.clone();
        let spare = encoded.bytes.len() as u64 * 8 - encoded.bits_count;
        if let Some(last) = padded.last_mut() {
            *last |= ((1u16 << spare) - 1) as u8;
        }
        padded.extend_from_slice(&[0xFF, 0x00, 0xA5]);

        let decoded = decode(&padded, &encoded.decode_table, encoded.bits_count)?;
        assert_eq!(decoded, data);

        Ok(())
    }

    #[test]
    fn test_bits_count_beyond_data() -> Result<()> {
        let encoded = encode(b"hello")?;
        let too_many = encoded.bytes.len() as u64 * 8 + 1;

        assert_malformed(decode(&encoded.bytes, &encoded.decode_table, too_many).unwrap_err());

        Ok(())
    }

    #[test]
    fn test_truncated_stream() -> Result<()> {
        let data: Vec<u8> = (0..=255).collect();
        let encoded = encode(&data)?;

        // every code is 8 bits long, stopping 3 bits early leaves a dangling prefix
        let err = decode(&encoded.bytes, &encoded.decode_table, encoded.bits_count - 3).unwrap_err();
        assert_malformed(err);

        Ok(())
    }

    #[test]
    fn test_unknown_code() -> Result<()> {
        let mut table = DecodeTable::default();
        table.insert(BitsWithLength { bits: 0b0, length: 1 }, 1)?;
        table.insert(BitsWithLength { bits: 0b10, length: 2 }, 2)?;

        // 0, 10, then 11 which matches nothing
        assert_malformed(decode(&[0b0101_1000], &table, 5).unwrap_err());
        assert_eq!(decode(&[0b0101_1000], &table, 3)?, vec![1, 2]);

        Ok(())
    }
}
