//! Scalar quantization (C5).
//!
//! Applies a per-sub-band shift taken from a 5-byte nibble-packed
//! [`crate::wire::Quant`] table to a linearized (sub-band-major) coefficient
//! buffer, in place. The shift amount is `nibble - 6 + DWT_FACTOR`, matching
//! `rfx_quantization_encode_block`'s inlined pre-scale compensation: DWT
//! level 1 leaves every coefficient pre-scaled by `1 << DWT_FACTOR`
//! ([`crate::dwt`]'s level-1 input already carries that factor), so
//! quantization folds the compensating shift into the nibble-derived factor
//! rather than undoing it separately.

/// DWT level-1 pre-scale applied by [`crate::color_conversion`] before the
/// forward transform; quantization must shift this back out.
pub const DWT_FACTOR: u32 = 5;

/// Sub-band layout for the standard (non Reduce-Extrapolate) 64x64 tile:
/// `(buffer offset, length)` in sub-band order HL1, LH1, HH1, HL2, LH2, HH2,
/// HL3, LH3, HH3, LL3.
pub const STANDARD_LAYOUT: [(usize, usize); 10] = [
    (0, 1024),
    (1024, 1024),
    (2048, 1024),
    (3072, 256),
    (3328, 256),
    (3584, 256),
    (3840, 64),
    (3904, 64),
    (3968, 64),
    (4032, 64),
];

/// Sub-band layout for the Reduce-Extrapolate progressive tile.
pub const REDUCE_EXTRAPOLATE_LAYOUT: [(usize, usize); 10] = [
    (0, 1023),
    (1023, 1023),
    (2046, 961),
    (3007, 272),
    (3279, 272),
    (3551, 256),
    (3807, 72),
    (3879, 72),
    (3951, 64),
    (4015, 81),
];

/// Extracts the ten 4-bit quantization factors from a 5-byte nibble-packed
/// quant table, in the sub-band order used by [`STANDARD_LAYOUT`] /
/// [`REDUCE_EXTRAPOLATE_LAYOUT`]: HL1, LH1, HH1, HL2, LH2, HH2, HL3, LH3,
/// HH3, LL3.
fn nibbles(qtable: &[u8; 5]) -> [u32; 10] {
    [
        u32::from(qtable[4]) & 0xf,
        (u32::from(qtable[3]) >> 4) & 0xf,
        (u32::from(qtable[4]) >> 4) & 0xf,
        (u32::from(qtable[2]) >> 4) & 0xf,
        u32::from(qtable[2]) & 0xf,
        u32::from(qtable[3]) & 0xf,
        u32::from(qtable[1]) & 0xf,
        (u32::from(qtable[0]) >> 4) & 0xf,
        (u32::from(qtable[1]) >> 4) & 0xf,
        u32::from(qtable[0]) & 0xf,
    ]
}

fn quantize_with_layout(buffer: &mut [i16], qtable: &[u8; 5], layout: &[(usize, usize); 10]) {
    let factors = nibbles(qtable);
    for (&(offset, len), factor_nibble) in layout.iter().zip(factors) {
        // Nibble values below 6 represent negative factors (finer
        // quantization); use i32 so the subtraction can't wrap.
        let factor = factor_nibble as i32 - 6;
        quantize_block(&mut buffer[offset..offset + len], factor);
    }
}

fn quantize_block(buffer: &mut [i16], factor: i32) {
    let factor = factor + DWT_FACTOR as i32;
    if factor <= 0 {
        return;
    }
    let factor = factor as u32;
    let half: i32 = 1 << (factor - 1);
    for dst in buffer {
        *dst = ((i32::from(*dst) + half) >> factor) as i16;
    }
}

/// Quantizes a standard 4096-coefficient tile in place.
pub fn quantize(buffer: &mut [i16; 4096], qtable: &[u8; 5]) {
    quantize_with_layout(buffer, qtable, &STANDARD_LAYOUT);
}

/// Quantizes a Reduce-Extrapolate 4096-coefficient tile in place.
pub fn quantize_reduce_extrapolate(buffer: &mut [i16; 4096], qtable: &[u8; 5]) {
    quantize_with_layout(buffer, qtable, &REDUCE_EXTRAPOLATE_LAYOUT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_factor_nibble_leaves_dwt_prescale_shift_only() {
        let mut buffer = [0i16; 4096];
        buffer[0] = 1 << 10;
        // nibble 6 => factor 0, net shift is DWT_FACTOR (5)
        let qtable = [0x66, 0x66, 0x77, 0x88, 0x98];
        quantize(&mut buffer, &qtable);
        assert_eq!(buffer[0], (1 << 10) >> DWT_FACTOR);
    }

    #[test]
    fn standard_layout_offsets_cover_whole_tile_without_overlap() {
        let mut offset = 0;
        for &(o, len) in &STANDARD_LAYOUT {
            assert_eq!(o, offset);
            offset += len;
        }
        assert_eq!(offset, 4096);
    }

    #[test]
    fn reduce_extrapolate_layout_offsets_cover_whole_tile_without_overlap() {
        let mut offset = 0;
        for &(o, len) in &REDUCE_EXTRAPOLATE_LAYOUT {
            assert_eq!(o, offset);
            offset += len;
        }
        assert_eq!(offset, 4096);
    }
}
