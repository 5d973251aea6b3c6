//! Reduce-Extrapolate DWT (C4): the progressive-codec variant of the forward
//! 5/3 lifting transform.
//!
//! Unlike the standard transform (`dwt.rs`), each level operates on an
//! odd-length (33, then 17, then 9) low-pass tail instead of a clean
//! power-of-two half, extrapolating one virtual sample past the last real
//! one (`2*last - second_to_last`) and mirroring at both ends instead of
//! wrapping. This trades the standard transform's 64->32->16->8 pyramid for
//! 64->33->17->9, which is what lets the progressive codec send an LL3 band
//! of 81 (9x9) coefficients instead of 64.
//!
//! Level 1 starts from an even-length (64) input and its boundary needs
//! only two mirrored low-pass samples ([`lift_even`]). Levels 2 and 3 start
//! from an already-odd low-pass tail (33, then 17) and need one more real
//! lifting step before the mirror ([`lift_odd`]). Both share the same
//! interior recurrence; only the boundary differs, so each is written once
//! and driven by closures for the vertical (strided) and horizontal
//! (contiguous) passes.

use crate::quantization::DWT_FACTOR;

const LL1_OFFSET: usize = 31 * 33 + 33 * 31 + 31 * 31; // 3007
const LL2_OFFSET: usize = 16 * 17 + 17 * 16 + 16 * 16; // 800, relative to the LL1 sub-buffer
const LL3_OFFSET: usize = 8 * 9 + 9 * 8 + 8 * 8; // 208, relative to the LL2 sub-buffer

/// Even-length boundary: `hi_len` interior lifting steps plus two mirrored
/// low-pass samples, no extra high-pass sample. Used by level 1, whose
/// 64-sample input is evenly split 32/32 before lifting.
fn lift_even(get: impl Fn(usize) -> i32, mut set_hi: impl FnMut(usize, i16), mut set_lo: impl FnMut(usize, i16), hi_len: usize) {
    let mut x2n = get(0);
    let mut x2n1 = get(1);
    let mut x2n2 = get(2);
    let mut hn = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
    set_hi(0, hn as i16);
    set_lo(0, (x2n + hn) as i16);

    for n in 1..hi_len {
        let hn1 = hn;
        x2n = x2n2;
        x2n1 = get(2 * n + 1);
        x2n2 = get(2 * n + 2);
        hn = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
        set_hi(n, hn as i16);
        set_lo(n, (x2n + ((hn1 + hn) >> 1)) as i16);
    }

    let hn1 = hn;
    let prev = x2n2;
    x2n = x2n2;
    x2n1 = get(2 * hi_len + 1);
    x2n2 = 2 * x2n1 - x2n; // extrapolated virtual sample past the last real one
    set_lo(hi_len, (x2n + (hn1 >> 1)) as i16);

    x2n = x2n2;
    x2n2 = prev;
    let hn_mirror = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
    set_lo(hi_len + 1, (x2n + (hn_mirror >> 1)) as i16);
}

/// Odd-length boundary: one more real lifting step (the input has a genuine
/// sample at `2*loop_bound+1` and `2*loop_bound+2`) before the final
/// mirrored step. Used by levels 2 and 3, whose low-pass tail is itself odd.
fn lift_odd(get: impl Fn(usize) -> i32, mut set_hi: impl FnMut(usize, i16), mut set_lo: impl FnMut(usize, i16), loop_bound: usize) {
    let mut x2n = get(0);
    let mut x2n1 = get(1);
    let mut x2n2 = get(2);
    let mut hn = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
    set_hi(0, hn as i16);
    set_lo(0, (x2n + hn) as i16);

    for n in 1..loop_bound {
        let hn1 = hn;
        x2n = x2n2;
        x2n1 = get(2 * n + 1);
        x2n2 = get(2 * n + 2);
        hn = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
        set_hi(n, hn as i16);
        set_lo(n, (x2n + ((hn1 + hn) >> 1)) as i16);
    }

    let hn1 = hn;
    let prev = x2n2;
    x2n = x2n2;
    x2n1 = get(2 * loop_bound + 1);
    x2n2 = get(2 * loop_bound + 2);
    hn = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
    set_hi(loop_bound, hn as i16);
    set_lo(loop_bound, (x2n + ((hn1 + hn) >> 1)) as i16);

    let hn1 = hn;
    x2n = x2n2;
    x2n2 = prev;
    let hn_mirror = (x2n1 - ((x2n + x2n2) >> 1)) >> 1;
    set_lo(loop_bound + 1, (x2n + ((hn1 + hn_mirror) >> 1)) as i16);
}

/// Vertical pass, level 1: 64 rows of 8-bit samples (pre-scaled `(s-128)<<5`)
/// into a 64-wide scratch buffer holding 33 lo columns then 31 hi columns.
fn vert_lv1(in_buffer: &[u8], scratch: &mut [i16]) {
    for y in 0..64 {
        let get = |off: usize| (i32::from(in_buffer[off * 64 + y]) - 128) << DWT_FACTOR;
        let (lo, hi) = scratch.split_at_mut(64 * 33);
        lift_even(get, |n, v| hi[y + n * 64] = v, |n, v| lo[y + n * 64] = v, 31);
    }
}

/// Horizontal pass, level 1: consumes the level-1 scratch buffer (33 lo rows
/// then 31 hi rows, each 64 wide) and writes HL1/LH1/HH1/LL1 into their
/// final sub-band offsets of a 4096-element tile buffer.
fn horz_lv1(scratch: &[i16], out: &mut [i16]) {
    for y in 0..33 {
        let row = &scratch[64 * y..64 * y + 64];
        let get = |i: usize| i32::from(row[i]);
        lift_even(get, |n, v| out[31 * y + n] = v, |n, v| out[LL1_OFFSET + 33 * y + n] = v, 31);
    }
    for y in 0..31 {
        let row = &scratch[64 * (33 + y)..64 * (33 + y) + 64];
        let get = |i: usize| i32::from(row[i]);
        lift_even(get, |n, v| out[2046 + 31 * y + n] = v, |n, v| out[1023 + 33 * y + n] = v, 31);
    }
}

/// Vertical pass, level 2: decomposes the 33x33 LL1 sub-buffer (`ll1`) into
/// a 33-wide scratch buffer holding 17 lo columns then 16 hi columns.
fn vert_lv2(ll1: &[i16], scratch: &mut [i16]) {
    for y in 0..33 {
        let get = |off: usize| i32::from(ll1[off * 33 + y]);
        let (lo, hi) = scratch.split_at_mut(33 * 17);
        lift_odd(get, |n, v| hi[y + n * 33] = v, |n, v| lo[y + n * 33] = v, 15);
    }
}

/// Horizontal pass, level 2: consumes the level-2 scratch buffer and writes
/// HL2/LH2/HH2/LL2 into `ll1` (overwriting it in place; LL2 lands at
/// `LL2_OFFSET` within this same sub-buffer, ready for level 3).
fn horz_lv2(scratch: &[i16], ll1: &mut [i16]) {
    for y in 0..17 {
        let row = &scratch[33 * y..33 * y + 33];
        let get = |i: usize| i32::from(row[i]);
        lift_odd(get, |n, v| ll1[16 * y + n] = v, |n, v| ll1[LL2_OFFSET + 17 * y + n] = v, 15);
    }
    for y in 0..16 {
        let row = &scratch[33 * (17 + y)..33 * (17 + y) + 33];
        let get = |i: usize| i32::from(row[i]);
        lift_odd(get, |n, v| ll1[16 * 17 + 17 * 16 + 16 * y + n] = v, |n, v| ll1[16 * 17 + 17 * y + n] = v, 15);
    }
}

/// Vertical pass, level 3: decomposes the 17x17 LL2 sub-buffer (`ll2`) into
/// a 17-wide scratch buffer holding 9 lo columns then 8 hi columns.
fn vert_lv3(ll2: &[i16], scratch: &mut [i16]) {
    for y in 0..17 {
        let get = |off: usize| i32::from(ll2[off * 17 + y]);
        let (lo, hi) = scratch.split_at_mut(17 * 9);
        lift_odd(get, |n, v| hi[y + n * 17] = v, |n, v| lo[y + n * 17] = v, 7);
    }
}

/// Horizontal pass, level 3: consumes the level-3 scratch buffer and writes
/// the final HL3/LH3/HH3/LL3 into `ll2`.
fn horz_lv3(scratch: &[i16], ll2: &mut [i16]) {
    for y in 0..9 {
        let row = &scratch[17 * y..17 * y + 17];
        let get = |i: usize| i32::from(row[i]);
        lift_odd(get, |n, v| ll2[8 * y + n] = v, |n, v| ll2[LL3_OFFSET + 9 * y + n] = v, 7);
    }
    for y in 0..8 {
        let row = &scratch[17 * (9 + y)..17 * (9 + y) + 17];
        let get = |i: usize| i32::from(row[i]);
        lift_odd(get, |n, v| ll2[8 * 9 + 9 * 8 + 8 * y + n] = v, |n, v| ll2[8 * 9 + 9 * y + n] = v, 7);
    }
}

/// Applies the full 3-level Reduce-Extrapolate forward transform to a
/// 64x64 plane of 8-bit samples, producing a 4096-element tile laid out as
/// HL1(0)/LH1(1023)/HH1(2046)/HL2(3007)/LH2(3279)/HH2(3551)/HL3(3807)/
/// LH3(3879)/HH3(3951)/LL3(4015), matching
/// [`crate::quantization::REDUCE_EXTRAPOLATE_LAYOUT`].
///
/// `scratch` is reused across all three levels and only needs to be sized
/// for the largest level (4096 elements, same as `buffer`).
pub fn encode(samples: &[u8; 4096], buffer: &mut [i16; 4096], scratch: &mut [i16; 4096]) {
    vert_lv1(samples, scratch);
    horz_lv1(scratch, buffer);

    let ll1 = &mut buffer[LL1_OFFSET..LL1_OFFSET + 33 * 33];
    vert_lv2(ll1, &mut scratch[..33 * 33]);
    horz_lv2(&scratch[..33 * 33], ll1);

    let ll2 = &mut ll1[LL2_OFFSET..LL2_OFFSET + 17 * 17];
    vert_lv3(ll2, &mut scratch[..17 * 17]);
    horz_lv3(&scratch[..17 * 17], ll2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_input_collapses_to_dc_in_ll3_only() {
        let samples = [128u8; 4096];
        let mut buffer = [0i16; 4096];
        let mut scratch = [0i16; 4096];
        encode(&samples, &mut buffer, &mut scratch);

        // a perfectly flat plane should produce no energy in any detail
        // sub-band; only LL3 (the DC term) may be non-zero.
        for (i, &v) in buffer.iter().enumerate() {
            if !(4015..4096).contains(&i) {
                assert_eq!(v, 0, "unexpected energy at offset {i}");
            }
        }
    }

    #[test]
    fn ramp_input_produces_finite_coefficients() {
        let mut samples = [0u8; 4096];
        for (i, s) in samples.iter_mut().enumerate() {
            *s = (i % 256) as u8;
        }
        let mut buffer = [0i16; 4096];
        let mut scratch = [0i16; 4096];
        encode(&samples, &mut buffer, &mut scratch);
        assert!(buffer.iter().any(|&v| v != 0));
    }
}
