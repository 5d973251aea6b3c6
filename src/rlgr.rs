//! Adaptive Run-Length / Golomb-Rice entropy coder (C2).
//!
//! Implements [MS-RDPRFX] §3.1.8.1.7.3: a run-length mode for long zero runs
//! and a Golomb-Rice mode for the residual magnitudes, with two adaptive
//! parameters `kp` (run-length) and `krp` (GR remainder) tracked across the
//! whole 4096-coefficient tile.

use core::cmp::min;

use bitvec::field::BitField as _;
use bitvec::prelude::*;

use crate::bitstream::BitStream;
use crate::utils::Bits;
use crate::wire::EntropyAlgorithm;

const KP_MAX: u32 = 80;
const LS_GR: u32 = 3;
const UP_GR: u32 = 4;
const DN_GR: u32 = 6;
const UQ_GR: u32 = 3;
const DQ_GR: u32 = 3;

macro_rules! write_byte {
    ($output:ident, $value:ident) => {
        if !$output.is_empty() {
            $output[0] = $value;
            $output = &mut $output[1..];
        } else {
            break;
        }
    };
}

macro_rules! try_split_bits {
    ($bits:ident, $n:expr) => {
        if $bits.len() < $n {
            break;
        } else {
            $bits.split_to($n)
        }
    };
}

macro_rules! bits_try {
    ($bits:expr) => {
        if !$bits {
            return Err(RlgrError::BufferOverflow);
        }
    };
}

/// RLGR1-only entry point, mirroring `rfxencode_rlgr1_proc` from the
/// reference encoder's `get_internals` function-pointer table.
pub fn encode_rlgr1(input: &[i16], tile: &mut [u8]) -> Result<usize, RlgrError> {
    encode(EntropyAlgorithm::Rlgr1, input, tile)
}

/// RLGR3-only entry point, mirroring `rfxencode_rlgr3_proc`.
pub fn encode_rlgr3(input: &[i16], tile: &mut [u8]) -> Result<usize, RlgrError> {
    encode(EntropyAlgorithm::Rlgr3, input, tile)
}

pub fn encode(mode: EntropyAlgorithm, input: &[i16], tile: &mut [u8]) -> Result<usize, RlgrError> {
    let mut k: u32 = 1;
    let kr: u32 = 1;
    let mut kp: u32 = k << LS_GR;
    let mut krp: u32 = kr << LS_GR;

    if input.is_empty() {
        return Err(RlgrError::EmptyTile);
    }

    let mut bits = BitStream::new(tile);
    let mut input = input.iter().peekable();
    while input.peek().is_some() {
        match CompressionMode::from(k) {
            CompressionMode::RunLength => {
                // The run always ends on a terminating coefficient, consumed
                // unconditionally: either the first nonzero value, or the
                // final coefficient of the tile if it is itself zero. That
                // terminator's sign+GR code is emitted even when it is zero.
                let mut nz = 0;
                let mut terminator =
                    *input.next().expect("run-length mode only entered when input is non-empty");
                while terminator == 0 && input.peek().is_some() {
                    nz += 1;
                    terminator = *input.next().expect("just checked via peek");
                }

                let mut runmax: u32 = 1 << k;
                while nz >= runmax {
                    bits_try!(bits.output_bit(1, false));
                    nz -= runmax;
                    kp = min(kp + UP_GR, KP_MAX);
                    k = kp >> LS_GR;
                    runmax = 1 << k;
                }
                bits_try!(bits.output_bit(1, true));
                bits_try!(bits.output_bits(k as usize, nz));

                let mag = terminator.unsigned_abs() as u32;
                bits_try!(bits.output_bit(1, terminator < 0));
                code_gr(&mut bits, &mut krp, mag.saturating_sub(1))?;

                kp = kp.saturating_sub(DN_GR);
                k = kp >> LS_GR;
            }
            CompressionMode::GolombRice => {
                let input_first = *input
                    .next()
                    .expect("value is guaranteed to be `Some` due to the prior check");
                match mode {
                    EntropyAlgorithm::Rlgr1 => {
                        let two_ms = get_2magsign(input_first);
                        code_gr(&mut bits, &mut krp, two_ms)?;
                        if two_ms == 0 {
                            kp = min(kp + UQ_GR, KP_MAX);
                        } else {
                            kp = kp.saturating_sub(DQ_GR);
                        }
                        k = kp >> LS_GR;
                    }
                    EntropyAlgorithm::Rlgr3 => {
                        let two_ms1 = get_2magsign(input_first);
                        let two_ms2 = input.next().map(|&n| get_2magsign(n)).unwrap_or(1);
                        let sum2ms = two_ms1 + two_ms2;
                        code_gr(&mut bits, &mut krp, sum2ms)?;

                        let m = 32 - sum2ms.leading_zeros() as usize;
                        if m != 0 {
                            bits_try!(bits.output_bits(m, two_ms1));
                        }

                        if two_ms1 != 0 && two_ms2 != 0 {
                            kp = kp.saturating_sub(2 * DQ_GR);
                            k = kp >> LS_GR;
                        } else if two_ms1 == 0 && two_ms2 == 0 {
                            kp = min(kp + 2 * UQ_GR, KP_MAX);
                            k = kp >> LS_GR;
                        }
                    }
                }
            }
        }
    }

    Ok(bits.len())
}

fn get_2magsign(val: i16) -> u32 {
    let sign = if val < 0 { 1 } else { 0 };

    (val.unsigned_abs() as u32) * 2 - sign
}

fn code_gr(bits: &mut BitStream<'_>, krp: &mut u32, val: u32) -> Result<(), RlgrError> {
    let kr = (*krp >> LS_GR) as usize;
    let vk = (val >> kr) as usize;

    bits_try!(bits.output_bit(vk, true));
    bits_try!(bits.output_bit(1, false));
    if kr != 0 {
        let remainder = val & ((1 << kr) - 1);
        bits_try!(bits.output_bits(kr, remainder));
    }
    if vk == 0 {
        *krp = krp.saturating_sub(2);
    } else if vk > 1 {
        *krp = min(*krp + vk as u32, KP_MAX);
    }
    Ok(())
}

pub fn decode(mode: EntropyAlgorithm, tile: &[u8], mut output: &mut [i16]) -> Result<(), RlgrError> {
    let mut k: u32 = 1;
    let mut kr: u32 = 1;
    let mut kp: u32 = k << LS_GR;
    let mut krp: u32 = kr << LS_GR;

    if tile.is_empty() {
        return Err(RlgrError::EmptyTile);
    }

    let mut bits = Bits::new(BitSlice::from_slice(tile));
    while !bits.is_empty() && !output.is_empty() {
        match CompressionMode::from(k) {
            CompressionMode::RunLength => {
                let number_of_zeros = truncate_leading_value(&mut bits, false);
                try_split_bits!(bits, 1);
                let run = count_run(number_of_zeros, &mut k, &mut kp) + load_be_u32(try_split_bits!(bits, k as usize));

                let sign_bit = try_split_bits!(bits, 1).load_be::<u8>();

                let number_of_ones = truncate_leading_value(&mut bits, true);
                try_split_bits!(bits, 1);

                let code_remainder = load_be_u32(try_split_bits!(bits, kr as usize)) + ((number_of_ones as u32) << kr);

                update_parameters_according_to_number_of_ones(number_of_ones, &mut kr, &mut krp);
                kp = kp.saturating_sub(DN_GR);
                k = kp >> LS_GR;

                let magnitude = compute_rl_magnitude(sign_bit, code_remainder);

                let size = min(run as usize, output.len());
                fill(&mut output[..size], 0);
                output = &mut output[size..];
                write_byte!(output, magnitude);
            }
            CompressionMode::GolombRice => {
                let number_of_ones = truncate_leading_value(&mut bits, true);
                try_split_bits!(bits, 1);

                let code_remainder = load_be_u32(try_split_bits!(bits, kr as usize)) + ((number_of_ones as u32) << kr);

                update_parameters_according_to_number_of_ones(number_of_ones, &mut kr, &mut krp);

                match mode {
                    EntropyAlgorithm::Rlgr1 => {
                        let magnitude = compute_rlgr1_magnitude(code_remainder, &mut k, &mut kp);
                        write_byte!(output, magnitude);
                    }
                    EntropyAlgorithm::Rlgr3 => {
                        let n_index = compute_n_index(code_remainder);

                        let val1 = load_be_u32(try_split_bits!(bits, n_index));
                        let val2 = code_remainder - val1;
                        if val1 != 0 && val2 != 0 {
                            kp = kp.saturating_sub(2 * DQ_GR);
                            k = kp >> LS_GR;
                        } else if val1 == 0 && val2 == 0 {
                            kp = min(kp + 2 * UQ_GR, KP_MAX);
                            k = kp >> LS_GR;
                        }

                        let magnitude = compute_rlgr3_magnitude(val1);
                        write_byte!(output, magnitude);

                        let magnitude = compute_rlgr3_magnitude(val2);
                        write_byte!(output, magnitude);
                    }
                }
            }
        }
    }

    // fill remaining buffer with zeros
    fill(output, 0);

    Ok(())
}

fn fill(buffer: &mut [i16], value: i16) {
    for v in buffer {
        *v = value;
    }
}

fn load_be_u32(s: &BitSlice<u8, Msb0>) -> u32 {
    if s.is_empty() {
        0
    } else {
        s.load_be::<u32>()
    }
}

// Returns number of truncated bits
fn truncate_leading_value(bits: &mut Bits<'_>, value: bool) -> usize {
    let leading_values = if value {
        bits.leading_ones()
    } else {
        bits.leading_zeros()
    };
    bits.split_to(leading_values);
    leading_values
}

fn count_run(number_of_zeros: usize, k: &mut u32, kp: &mut u32) -> u32 {
    (0..number_of_zeros)
        .map(|_| {
            let run = 1 << *k;
            *kp = min(*kp + UP_GR, KP_MAX);
            *k = *kp >> LS_GR;

            run
        })
        .sum()
}

fn compute_rl_magnitude(sign_bit: u8, code_remainder: u32) -> i16 {
    if sign_bit != 0 {
        -((code_remainder + 1) as i16)
    } else {
        (code_remainder + 1) as i16
    }
}

fn compute_rlgr1_magnitude(code_remainder: u32, k: &mut u32, kp: &mut u32) -> i16 {
    if code_remainder == 0 {
        *kp = min(*kp + UQ_GR, KP_MAX);
        *k = *kp >> LS_GR;

        0
    } else {
        *kp = kp.saturating_sub(DQ_GR);
        *k = *kp >> LS_GR;

        if code_remainder % 2 != 0 {
            -(((code_remainder + 1) >> 1) as i16)
        } else {
            (code_remainder >> 1) as i16
        }
    }
}

fn compute_rlgr3_magnitude(val: u32) -> i16 {
    if val % 2 != 0 {
        -(((val + 1) >> 1) as i16)
    } else {
        (val >> 1) as i16
    }
}

fn compute_n_index(code_remainder: u32) -> usize {
    if code_remainder == 0 {
        return 0;
    }

    let code_bytes = code_remainder.to_be_bytes();
    let code_bits = BitSlice::<u8, Msb0>::from_slice(code_bytes.as_ref());
    let leading_zeros = code_bits.leading_zeros();

    32 - leading_zeros
}

fn update_parameters_according_to_number_of_ones(number_of_ones: usize, kr: &mut u32, krp: &mut u32) {
    if number_of_ones == 0 {
        *krp = (*krp).saturating_sub(2);
        *kr = *krp >> LS_GR;
    } else if number_of_ones > 1 {
        *krp = min(*krp + number_of_ones as u32, KP_MAX);
        *kr = *krp >> LS_GR;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum CompressionMode {
    RunLength,
    GolombRice,
}

impl From<u32> for CompressionMode {
    fn from(m: u32) -> Self {
        if m != 0 {
            Self::RunLength
        } else {
            Self::GolombRice
        }
    }
}

#[derive(Debug)]
pub enum RlgrError {
    /// The caller-supplied output buffer ran out mid-tile.
    BufferOverflow,
    EmptyTile,
}

impl core::fmt::Display for RlgrError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferOverflow => write!(f, "output buffer exhausted while encoding tile"),
            Self::EmptyTile => write!(f, "the input tile is empty"),
        }
    }
}

impl core::error::Error for RlgrError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(mode: EntropyAlgorithm, input: &[i16]) {
        let mut tile = vec![0u8; 4096 * 3];
        let written = encode(mode, input, &mut tile).unwrap();
        let mut output = vec![0i16; input.len()];
        decode(mode, &tile[..written], &mut output).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn rlgr1_roundtrips_zeros_and_values() {
        let mut input = vec![0i16; 4096];
        input[10] = 5;
        input[11] = -3;
        input[4095] = 1;
        roundtrip(EntropyAlgorithm::Rlgr1, &input);
    }

    #[test]
    fn rlgr3_roundtrips_zeros_and_values() {
        let mut input = vec![0i16; 4096];
        for (i, v) in input.iter_mut().enumerate().take(200) {
            *v = (i as i16 % 7) - 3;
        }
        roundtrip(EntropyAlgorithm::Rlgr3, &input);
    }

    #[test]
    fn all_zero_tile_roundtrips() {
        let input = vec![0i16; 4096];
        roundtrip(EntropyAlgorithm::Rlgr1, &input);
        roundtrip(EntropyAlgorithm::Rlgr3, &input);
    }

    #[test]
    fn encode_reports_buffer_overflow_instead_of_panicking() {
        let input = vec![1000i16; 64];
        let mut tile = [0u8; 2];
        let err = encode(EntropyAlgorithm::Rlgr3, &input, &mut tile).unwrap_err();
        assert!(matches!(err, RlgrError::BufferOverflow));
    }

    /// A tile that starts in Golomb-Rice mode (`k == 0` only once `kp` has
    /// dropped past the run-length/GR boundary) and then hits a zero symbol:
    /// `kp` must grow by `UQ_GR`, not `UP_GR`, or the decoder's adaptive `k`
    /// trajectory drifts off the encoder's after this symbol.
    #[test]
    fn rlgr1_roundtrips_a_golomb_rice_mode_zero_symbol() {
        // A run of small nonzero values first drives `kp` down below the
        // run-length/GR threshold, then a zero symbol is coded in GR mode.
        let mut input = vec![1i16; 4096];
        input[20] = 0;
        roundtrip(EntropyAlgorithm::Rlgr1, &input);
    }

    /// A tile whose final coefficient is zero: the run-length terminator is
    /// that trailing zero itself, and its sign+GR code must still be emitted
    /// so the bitstream's run count matches what a compliant decoder expects.
    #[test]
    fn rlgr1_roundtrips_a_tile_ending_in_a_zero_run() {
        let mut input = vec![0i16; 4096];
        input[0] = 7;
        roundtrip(EntropyAlgorithm::Rlgr1, &input);
    }

    #[test]
    fn rlgr3_roundtrips_a_tile_ending_in_a_zero_run() {
        let mut input = vec![0i16; 4096];
        input[0] = -4;
        roundtrip(EntropyAlgorithm::Rlgr3, &input);
    }
}
