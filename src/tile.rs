//! Per-component tile pipeline (C8): colour-converted plane to RLGR-coded
//! bytes, tying together DWT (C3/C4), quantization (C5), differential
//! coding (C6) and entropy coding (C2).
//!
//! Mirrors `rfx_encode_component_rlgr1`/`rfx_encode_component_rlgr3` from
//! `rfxencode_tile.c`: DWT, then quantize in place, then differential-code
//! only the LL3 tail, then entropy-code the whole linearized buffer.

use crate::color_conversion::{self, prescale_for_dwt, PixelFormat};
use crate::error::RfxError;
use crate::quantization::{self, REDUCE_EXTRAPOLATE_LAYOUT, STANDARD_LAYOUT};
use crate::rlgr;
use crate::wire::EntropyAlgorithm;
use crate::{dwt, dwt_rem, subband_reconstruction};

/// Conservative upper bound on an encoded 64x64 component: RLGR is assumed
/// (per the reference encoder's own comment) to double the coefficient
/// count in the worst case.
pub const COMPONENT_WORST_CASE_SIZE: usize = 4096 * 2;

/// Scratch buffers reused across tiles by a single-threaded encoder, sized
/// so no allocation happens on the per-tile hot path.
pub struct TileScratch {
    dwt_coefficients: [i16; 4096],
    dwt_temp: [i16; 4096],
    prescaled: [i16; 4096],
}

impl Default for TileScratch {
    fn default() -> Self {
        Self {
            dwt_coefficients: [0; 4096],
            dwt_temp: [0; 4096],
            prescaled: [0; 4096],
        }
    }
}

/// LL3 tail for the standard transform: offset 4032, length 64.
const STANDARD_LL3: (usize, usize) = STANDARD_LAYOUT[9];
/// LL3 tail for the Reduce-Extrapolate transform: offset 4015, length 81.
const REM_LL3: (usize, usize) = REDUCE_EXTRAPOLATE_LAYOUT[9];

/// Encodes one 64x64 plane (standard, non-progressive transform) with the
/// configured entropy algorithm. `qtable` is the 5-byte nibble-packed quant
/// table for this component.
pub fn encode_component(
    mode: EntropyAlgorithm,
    samples: &[u8; 4096],
    qtable: &[u8; 5],
    scratch: &mut TileScratch,
    out: &mut [u8],
) -> Result<usize, RfxError> {
    prescale_for_dwt(samples, &mut scratch.prescaled);
    dwt::encode(&mut scratch.prescaled, &mut scratch.dwt_temp);
    scratch.dwt_coefficients.copy_from_slice(&scratch.prescaled);
    quantization::quantize(&mut scratch.dwt_coefficients, qtable);

    let (offset, len) = STANDARD_LL3;
    subband_reconstruction::encode(&mut scratch.dwt_coefficients[offset..offset + len]);

    rlgr::encode(mode, &scratch.dwt_coefficients, out).map_err(Into::into)
}

/// Runs the progressive Reduce-Extrapolate transform, quantization and
/// differential coding of the LL3 tail, returning the linearized
/// coefficients without entropy-coding them.
///
/// Split out from [`encode_component_progressive`] so the progressive
/// composer can feed the coefficients through the reference ring ([`crate::ring`])
/// before choosing which (original or differenced) buffer to entropy-code.
pub fn quantize_component_progressive(samples: &[u8; 4096], qtable: &[u8; 5], scratch: &mut TileScratch) -> [i16; 4096] {
    dwt_rem::encode(samples, &mut scratch.dwt_coefficients, &mut scratch.dwt_temp);
    quantization::quantize_reduce_extrapolate(&mut scratch.dwt_coefficients, qtable);

    let (offset, len) = REM_LL3;
    subband_reconstruction::encode(&mut scratch.dwt_coefficients[offset..offset + len]);

    scratch.dwt_coefficients
}

/// Encodes one 64x64 plane with the progressive Reduce-Extrapolate
/// transform, for progressive use that does not consult the reference ring
/// (e.g. `PRO_KEY`-reset first tiles, or a caller driving the primitives
/// directly via [`crate::encoder::EncoderState::get_internals`]).
pub fn encode_component_progressive(
    mode: EntropyAlgorithm,
    samples: &[u8; 4096],
    qtable: &[u8; 5],
    scratch: &mut TileScratch,
    out: &mut [u8],
) -> Result<usize, RfxError> {
    let coefficients = quantize_component_progressive(samples, qtable, scratch);
    rlgr::encode(mode, &coefficients, out).map_err(Into::into)
}

/// Encodes a 64x64 alpha plane for `ALPHAV1`: a flat RLGR-coded raster with
/// no DWT/quantization stage, matching `rfx_encode_alpha`.
pub fn encode_alpha_plane(mode: EntropyAlgorithm, alpha: &[u8; 4096], out: &mut [u8]) -> Result<usize, RfxError> {
    let signed: Vec<i16> = alpha.iter().map(|&v| i16::from(v)).collect();
    rlgr::encode(mode, &signed, out).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_tile_encodes_to_a_handful_of_bytes() {
        let samples = [128u8; 4096];
        let qtable = [0x66, 0x66, 0x77, 0x88, 0x98];
        let mut scratch = TileScratch::default();
        let mut out = vec![0u8; COMPONENT_WORST_CASE_SIZE];
        let written = encode_component(EntropyAlgorithm::Rlgr1, &samples, &qtable, &mut scratch, &mut out).unwrap();
        assert!(written < 64, "flat tile should compress to well under 64 bytes, got {written}");
    }

    #[test]
    fn progressive_flat_tile_encodes_to_a_handful_of_bytes() {
        let samples = [200u8; 4096];
        let qtable = [0x66, 0x66, 0x77, 0x88, 0x98];
        let mut scratch = TileScratch::default();
        let mut out = vec![0u8; COMPONENT_WORST_CASE_SIZE];
        let written =
            encode_component_progressive(EntropyAlgorithm::Rlgr3, &samples, &qtable, &mut scratch, &mut out).unwrap();
        assert!(written < 64, "flat tile should compress to well under 64 bytes, got {written}");
    }

    #[test]
    fn alpha_plane_roundtrips_through_rlgr() {
        let mut alpha = [255u8; 4096];
        alpha[100] = 0;
        let mut out = vec![0u8; COMPONENT_WORST_CASE_SIZE];
        let written = encode_alpha_plane(EntropyAlgorithm::Rlgr1, &alpha, &mut out).unwrap();
        assert!(written > 0);
    }
}
