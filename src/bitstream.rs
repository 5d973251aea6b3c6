//! MSB-first bit packing into a caller-owned byte buffer (C1).

use bitvec::field::BitField as _;
use bitvec::prelude::*;

/// Accumulates bits MSB-first into a fixed byte slice, failing rather than
/// panicking once the slice is exhausted.
pub(crate) struct BitStream<'a> {
    bits: &'a mut BitSlice<u8, Msb0>,
    idx: usize,
    cap: usize,
    overflowed: bool,
}

impl<'a> BitStream<'a> {
    pub(crate) fn new(slice: &'a mut [u8]) -> Self {
        let cap = slice.len() * 8;
        let bits = slice.view_bits_mut::<Msb0>();
        Self {
            bits,
            idx: 0,
            cap,
            overflowed: false,
        }
    }

    /// Writes `count` copies of `val`. Returns `false` (and marks the stream
    /// as overflowed) instead of panicking if the buffer runs out.
    pub(crate) fn output_bit(&mut self, count: usize, val: bool) -> bool {
        if self.idx + count > self.cap {
            self.overflowed = true;
            return false;
        }
        self.bits[self.idx..self.idx + count].fill(val);
        self.idx += count;
        true
    }

    pub(crate) fn output_bits(&mut self, num_bits: usize, val: u32) -> bool {
        if num_bits == 0 {
            return true;
        }
        if self.idx + num_bits > self.cap {
            self.overflowed = true;
            return false;
        }
        self.bits[self.idx..self.idx + num_bits].store_be(val);
        self.idx += num_bits;
        true
    }

    pub(crate) fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub(crate) fn len(&self) -> usize {
        self.idx.div_ceil(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_field_widths() {
        let mut buf = [0u8; 16];
        let pairs: &[(usize, u32)] = &[(3, 0b101), (8, 200), (1, 1), (16, 0xBEEF), (5, 0)];

        {
            let mut bs = BitStream::new(&mut buf);
            for &(count, val) in pairs {
                assert!(bs.output_bits(count, val));
            }
        }

        let total_bits: usize = pairs.iter().map(|(c, _)| c).sum();
        let bits = buf.view_bits::<Msb0>();
        let mut offset = 0;
        for &(count, val) in pairs {
            let got: u32 = bits[offset..offset + count].load_be();
            assert_eq!(got, val);
            offset += count;
        }
        assert_eq!(offset, total_bits);
    }

    #[test]
    fn reports_overflow_instead_of_panicking() {
        let mut buf = [0u8; 1];
        let mut bs = BitStream::new(&mut buf);
        assert!(bs.output_bits(8, 0xFF));
        assert!(!bs.output_bit(1, true));
        assert!(bs.overflowed());
    }
}
