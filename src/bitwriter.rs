use crate::entropy::BitsWithLength;

/// Growable bit buffer. Codes are appended most significant bit first, and bytes fill
/// from their high bit down, mirroring [`crate::bitreader::BitReader`].
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    used: u8,
    bits_count: u64,
}

impl BitWriter {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            bytes: Vec::with_capacity(bytes),
            ..Default::default()
        }
    }

    pub(crate) fn write(&mut self, code: BitsWithLength) {
        for shift in (0..code.length).rev() {
            self.write_bit(((code.bits >> shift) & 1) as u8);
        }
    }

    fn write_bit(&mut self, bit: u8) {
        self.current |= bit << (7 - self.used);
        self.used += 1;
        self.bits_count += 1;

        if self.used == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
    }

    /// Flushes a partially filled last byte (zero padded) and returns the bytes with the
    /// number of meaningful bits in them.
    pub(crate) fn finish(mut self) -> (Vec<u8>, u64) {
        if self.used > 0 {
            self.bytes.push(self.current);
        }

        (self.bytes, self.bits_count)
    }
}
