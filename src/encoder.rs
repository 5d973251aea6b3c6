//! Public encoder API: `EncoderState` and the pixel-to-wire pipeline driver.
//!
//! Generalizes `rfxcodec_encode_create_ex`/`rfxcodec_encode_ex`/
//! `rfxcodec_encode_get_internals` (`rfxencode.c`) into an owned Rust type:
//! construction validates its arguments instead of returning an opaque
//! `void *` handle, and `Drop` takes the place of `rfxcodec_encode_destroy`.

use bitflags::bitflags;
use ironrdp_core::{Encode, WriteCursor};
use tracing::{debug, trace, warn};

use crate::color_conversion::{self, PixelFormat};
use crate::composer;
use crate::error::RfxError;
use crate::kernel::Kernel;
use crate::progressive::{ProRegionPdu, ProgressiveTile};
use crate::ring::RingCache;
use crate::rlgr::{encode_rlgr1, encode_rlgr3, RlgrError};
use crate::tile::{self, TileScratch, COMPONENT_WORST_CASE_SIZE};
use crate::wire::{ChannelsPdu, ContextPdu, EntropyAlgorithm, OperatingMode, Quant, RfxChannel, RfxChannelHeight, RfxChannelWidth, RfxRectangle, Tile, TileSetPdu};
use crate::{dwt, quantization, subband_reconstruction};

bitflags! {
    /// Per-encoder and per-call flags, generalizing the `flags` parameter of
    /// `rfxcodec_encode_create_ex`/`rfxcodec_encode_ex`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CodecFlags: u32 {
        /// Forces the scalar [`Kernel`], skipping capability probing.
        const NOACCEL = 0x01;
        /// Selects RLGR1 instead of the default RLGR3.
        const RLGR1 = 0x02;
        /// Enables the progressive (Pro v1) message grammar and sub-band
        /// diffing ring.
        const PRO1 = 0x04;
        /// Enables the alpha sub-pipeline for ARGB/BGRA input.
        const ALPHAV1 = 0x08;
        /// Per-call only: resets the progressive reference ring before this
        /// frame, forcing every tile to be coded as original.
        const PRO_KEY = 0x10;
    }
}

/// One 64x64 (or smaller, at the frame edge) tile to encode, mirroring
/// `struct rfx_tile`.
#[derive(Debug, Clone, Copy)]
pub struct TileDescriptor {
    /// Multiple of 64.
    pub x: u16,
    /// Multiple of 64.
    pub y: u16,
    /// 64 or less.
    pub width: u16,
    /// 64 or less.
    pub height: u16,
    pub quant_y: u8,
    pub quant_cb: u8,
    pub quant_cr: u8,
}

/// One frame's worth of input: the pixel buffer plus the regions and tile
/// grid describing how to carve it up, mirroring the parameter list of
/// `rfxcodec_encode_ex`.
pub struct FrameInput<'a> {
    pub buffer: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub regions: &'a [RfxRectangle],
    pub tiles: &'a [TileDescriptor],
    pub quants: &'a [Quant],
}

/// Outcome of one `encode` call: the standard branch's raw `tiles_written`
/// and the progressive branch's `tiles_written <= 0` check are harmonized
/// here (see `DESIGN.md`) — a frame that wrote zero tiles because the output
/// buffer was too small is still `Ok`, not `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub tiles_written: usize,
    pub bytes_written: usize,
}

/// Function-pointer table mirroring `struct rfxcodec_encode_internals`, for
/// callers that want the standalone primitives without a full
/// [`EncoderState`].
#[derive(Debug, Clone, Copy)]
pub struct EncoderInternals {
    pub rlgr1: fn(&[i16], &mut [u8]) -> Result<usize, RlgrError>,
    pub rlgr3: fn(&[i16], &mut [u8]) -> Result<usize, RlgrError>,
    pub differential: fn(&mut [i16]),
    pub quantize: fn(&mut [i16; 4096], &[u8; 5]),
    pub quantize_reduce_extrapolate: fn(&mut [i16; 4096], &[u8; 5]),
    pub dwt_2d: fn(&mut [i16], &mut [i16]),
}

/// `get_internals()`, operation 4 of §6: returns the standalone primitives
/// without requiring an `EncoderState`.
pub fn get_internals() -> EncoderInternals {
    EncoderInternals {
        rlgr1: encode_rlgr1,
        rlgr3: encode_rlgr3,
        differential: subband_reconstruction::encode,
        quantize: quantization::quantize,
        quantize_reduce_extrapolate: quantization::quantize_reduce_extrapolate,
        dwt_2d: dwt::encode,
    }
}

/// Process-wide per-encoder state. Created via [`EncoderState::new`],
/// mutated only by [`EncoderState::encode`], released by `Drop`. Not `Sync`;
/// a caller sharing one across threads must serialize access itself, per §5.
pub struct EncoderState {
    width: usize,
    height: usize,
    format: PixelFormat,
    entropy_algorithm: EntropyAlgorithm,
    progressive: bool,
    alpha: bool,
    kernel: Kernel,
    frame_idx: u32,
    header_processed: bool,
    ring: Option<RingCache>,
    scratch: TileScratch,
}

impl EncoderState {
    /// `create`/`create_ex`, operation 1 of §6.
    pub fn new(width: usize, height: usize, format: PixelFormat, flags: CodecFlags) -> Result<Self, RfxError> {
        if width == 0 || height == 0 {
            return Err(RfxError::InvalidArgument {
                field: "width/height",
                reason: "frame dimensions must be non-zero",
            });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(RfxError::InvalidArgument {
                field: "width/height",
                reason: "frame dimensions overflow a 16-bit channel width/height",
            });
        }

        let entropy_algorithm = if flags.contains(CodecFlags::RLGR1) {
            EntropyAlgorithm::Rlgr1
        } else {
            EntropyAlgorithm::Rlgr3
        };
        let progressive = flags.contains(CodecFlags::PRO1);

        Ok(Self {
            width,
            height,
            format,
            entropy_algorithm,
            progressive,
            alpha: flags.contains(CodecFlags::ALPHAV1),
            kernel: Kernel::detect(flags.contains(CodecFlags::NOACCEL)),
            frame_idx: 0,
            header_processed: false,
            ring: progressive.then(RingCache::new),
            scratch: TileScratch::default(),
        })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    fn channels_pdu(&self) -> Result<ChannelsPdu, RfxError> {
        let width = i16::try_from(self.width).map_err(|_| RfxError::Internal("width exceeds channel range"))?;
        let height = i16::try_from(self.height).map_err(|_| RfxError::Internal("height exceeds channel range"))?;
        Ok(ChannelsPdu(vec![RfxChannel {
            width: RfxChannelWidth(width),
            height: RfxChannelHeight(height),
        }]))
    }

    fn quants_or_default(quants: &[Quant]) -> Vec<Quant> {
        if quants.is_empty() {
            vec![Quant::default()]
        } else {
            quants.to_vec()
        }
    }

    fn planes_for(&self, frame: &FrameInput<'_>, desc: &TileDescriptor) -> ([u8; 4096], [u8; 4096], [u8; 4096], Option<[u8; 4096]>) {
        let mut y = [0u8; 4096];
        let mut cb = [0u8; 4096];
        let mut cr = [0u8; 4096];
        let width = desc.width as usize;
        let height = desc.height as usize;
        let offset = desc.y as usize * frame.stride + desc.x as usize * self.format.bytes_per_pixel().max(1);

        if self.format == PixelFormat::Yuv {
            let plane_size = frame.stride * frame.height;
            let y_plane = &frame.buffer[..plane_size];
            let uv_plane_size = frame.stride * frame.height;
            let cb_plane = &frame.buffer[plane_size..plane_size + uv_plane_size];
            let cr_plane = &frame.buffer[plane_size + uv_plane_size..plane_size + 2 * uv_plane_size];
            let plane_offset = desc.y as usize * frame.stride + desc.x as usize;
            color_conversion::extract_64x64_plane(&y_plane[plane_offset..], width, height, frame.stride, &mut y);
            color_conversion::extract_64x64_plane(&cb_plane[plane_offset..], width, height, frame.stride, &mut cb);
            color_conversion::extract_64x64_plane(&cr_plane[plane_offset..], width, height, frame.stride, &mut cr);
            (y, cb, cr, None)
        } else {
            let tile_data = &frame.buffer[offset..];
            color_conversion::to_64x64_yuv_planes(tile_data, width, height, frame.stride, self.format, &mut y, &mut cb, &mut cr);
            let alpha = if self.alpha && self.format.has_alpha() {
                let mut alpha_plane = [0u8; 4096];
                color_conversion::to_64x64_alpha_plane(tile_data, width, height, frame.stride, self.format, &mut alpha_plane);
                Some(alpha_plane)
            } else {
                None
            };
            (y, cb, cr, alpha)
        }
    }

    /// `encode`/`encode_ex`, operation 3 of §6.
    pub fn encode(&mut self, frame: FrameInput<'_>, call_flags: CodecFlags, out: &mut [u8]) -> Result<EncodeReport, RfxError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(RfxError::InvalidArgument {
                field: "width/height",
                reason: "frame dimensions do not match the encoder's configured dimensions",
            });
        }
        for desc in frame.tiles {
            if desc.width == 0 || desc.width > 64 || desc.height == 0 || desc.height > 64 {
                return Err(RfxError::InvalidArgument {
                    field: "tile.width/height",
                    reason: "tile extent must be in 1..=64",
                });
            }
        }

        if self.progressive && call_flags.contains(CodecFlags::PRO_KEY) {
            self.ring.get_or_insert_with(RingCache::new).reset();
        }

        let quants = Self::quants_or_default(frame.quants);
        for desc in frame.tiles {
            let max_index = usize::from(desc.quant_y.max(desc.quant_cb).max(desc.quant_cr));
            if max_index >= quants.len() {
                return Err(RfxError::InvalidArgument {
                    field: "tile.quant_index",
                    reason: "quant index is out of range for the supplied quant table",
                });
            }
        }

        let report = if self.progressive {
            self.encode_progressive_frame(&frame, &quants, out)?
        } else {
            self.encode_standard_frame(&frame, &quants, out)?
        };

        debug!(
            tiles_written = report.tiles_written,
            bytes_written = report.bytes_written,
            frame_idx = self.frame_idx,
            "encoded frame"
        );

        self.frame_idx += 1;
        Ok(report)
    }

    fn encode_standard_frame(&mut self, frame: &FrameInput<'_>, quants: &[Quant], out: &mut [u8]) -> Result<EncodeReport, RfxError> {
        let mut cursor = WriteCursor::new(out);

        if self.frame_idx == 0 && !self.header_processed {
            let context = ContextPdu {
                flags: OperatingMode::IMAGE_MODE,
                entropy_algorithm: self.entropy_algorithm,
            };
            let channels = self.channels_pdu()?;
            composer::compose_header(&mut cursor, &context, &channels)?;
            self.header_processed = true;
        }

        // ALPHAV1: reserve a fourth per-tile slot for the alpha plane
        // alongside Y/Cb/Cr, only when this call actually carries one.
        let emit_alpha = self.alpha && self.format.has_alpha();
        let components_per_tile = if emit_alpha { 4 } else { 3 };
        let mut arena = vec![0u8; frame.tiles.len() * components_per_tile * COMPONENT_WORST_CASE_SIZE];
        let mut tile_bounds = Vec::with_capacity(frame.tiles.len());

        for (index, desc) in frame.tiles.iter().enumerate() {
            let (y_plane, cb_plane, cr_plane, alpha_plane) = self.planes_for(frame, desc);
            let base = index * components_per_tile * COMPONENT_WORST_CASE_SIZE;

            let y_qtable = quants[usize::from(desc.quant_y)].to_bytes();
            let cb_qtable = quants[usize::from(desc.quant_cb)].to_bytes();
            let cr_qtable = quants[usize::from(desc.quant_cr)].to_bytes();

            let y_len = tile::encode_component(
                self.entropy_algorithm,
                &y_plane,
                &y_qtable,
                &mut self.scratch,
                &mut arena[base..base + COMPONENT_WORST_CASE_SIZE],
            )?;
            let cb_len = tile::encode_component(
                self.entropy_algorithm,
                &cb_plane,
                &cb_qtable,
                &mut self.scratch,
                &mut arena[base + COMPONENT_WORST_CASE_SIZE..base + 2 * COMPONENT_WORST_CASE_SIZE],
            )?;
            let cr_len = tile::encode_component(
                self.entropy_algorithm,
                &cr_plane,
                &cr_qtable,
                &mut self.scratch,
                &mut arena[base + 2 * COMPONENT_WORST_CASE_SIZE..base + 3 * COMPONENT_WORST_CASE_SIZE],
            )?;
            let a_len = if emit_alpha {
                let alpha_plane = alpha_plane.expect("emit_alpha implies the pixel format carries an alpha channel");
                tile::encode_alpha_plane(
                    self.entropy_algorithm,
                    &alpha_plane,
                    &mut arena[base + 3 * COMPONENT_WORST_CASE_SIZE..base + 4 * COMPONENT_WORST_CASE_SIZE],
                )?
            } else {
                0
            };

            tile_bounds.push((base, y_len, cb_len, cr_len, a_len));
        }

        let region = crate::wire::RegionPdu {
            rectangles: frame.regions.to_vec(),
        };

        // Try the full tile list first, then drop tiles from the end until
        // the rest fits. This is the forward-sizing equivalent of the
        // reference composer's "stop at the first tile that overflows the
        // stream" behaviour, without needing a seek-back length fix-up.
        let mut included = frame.tiles.len();
        let (tile_set, region) = loop {
            let wire_tiles: Vec<Tile<'_>> = frame.tiles[..included]
                .iter()
                .zip(&tile_bounds[..included])
                .map(|(desc, &(base, y_len, cb_len, cr_len, a_len))| Tile {
                    y_quant_index: desc.quant_y,
                    cb_quant_index: desc.quant_cb,
                    cr_quant_index: desc.quant_cr,
                    x: desc.x,
                    y: desc.y,
                    y_data: &arena[base..base + y_len],
                    cb_data: &arena[base + COMPONENT_WORST_CASE_SIZE..base + COMPONENT_WORST_CASE_SIZE + cb_len],
                    cr_data: &arena[base + 2 * COMPONENT_WORST_CASE_SIZE..base + 2 * COMPONENT_WORST_CASE_SIZE + cr_len],
                    a_data: emit_alpha
                        .then(|| &arena[base + 3 * COMPONENT_WORST_CASE_SIZE..base + 3 * COMPONENT_WORST_CASE_SIZE + a_len]),
                })
                .collect();

            let tile_set = TileSetPdu {
                entropy_algorithm: self.entropy_algorithm,
                quants: quants.to_vec(),
                tiles: wire_tiles,
            };

            let needed = BLOCK_OVERHEAD_ESTIMATE + region.size() + tile_set.size();
            if included == 0 || cursor.len() >= needed {
                if included < frame.tiles.len() {
                    warn!(tile_index = included, "dropping trailing tiles: output buffer is full");
                }
                break (tile_set, region);
            }
            included -= 1;
        };

        composer::compose_frame(&mut cursor, self.frame_idx, &region, &tile_set)?;

        Ok(EncodeReport {
            tiles_written: included,
            bytes_written: cursor.pos(),
        })
    }

    fn encode_progressive_frame(&mut self, frame: &FrameInput<'_>, quants: &[Quant], out: &mut [u8]) -> Result<EncodeReport, RfxError> {
        let mut cursor = WriteCursor::new(out);

        if self.frame_idx == 0 && !self.header_processed {
            composer::compose_progressive_header(&mut cursor)?;
            self.header_processed = true;
        }

        let ring = self.ring.get_or_insert_with(RingCache::new);
        let mut arena = vec![0u8; frame.tiles.len() * 3 * COMPONENT_WORST_CASE_SIZE];
        let mut tile_info = Vec::with_capacity(frame.tiles.len());

        for (index, desc) in frame.tiles.iter().enumerate() {
            // ALPHAV1 has no progressive-grammar counterpart (`ProgressiveTile`
            // carries no alpha field); the alpha plane is only ever produced
            // for the standard grammar's WBT_EXTENSION_PLUS tiles.
            let (y_plane, cb_plane, cr_plane, _alpha) = self.planes_for(frame, desc);

            let y_qtable = quants[usize::from(desc.quant_y)].to_bytes();
            let cb_qtable = quants[usize::from(desc.quant_cb)].to_bytes();
            let cr_qtable = quants[usize::from(desc.quant_cr)].to_bytes();

            let y_coefficients = tile::quantize_component_progressive(&y_plane, &y_qtable, &mut self.scratch);
            let u_coefficients = tile::quantize_component_progressive(&cb_plane, &cb_qtable, &mut self.scratch);
            let v_coefficients = tile::quantize_component_progressive(&cr_plane, &cr_qtable, &mut self.scratch);

            let x_idx = usize::from(desc.x / 64);
            let y_idx = usize::from(desc.y / 64);
            let diffed = ring.diff_or_original(x_idx, y_idx, &y_coefficients, &u_coefficients, &v_coefficients);

            trace!(x_idx, y_idx, difference = diffed.difference, "progressive tile branch chosen");

            let base = index * 3 * COMPONENT_WORST_CASE_SIZE;
            let y_len = crate::rlgr::encode(self.entropy_algorithm, &diffed.y, &mut arena[base..base + COMPONENT_WORST_CASE_SIZE])?;
            let u_len = crate::rlgr::encode(
                self.entropy_algorithm,
                &diffed.u,
                &mut arena[base + COMPONENT_WORST_CASE_SIZE..base + 2 * COMPONENT_WORST_CASE_SIZE],
            )?;
            let v_len = crate::rlgr::encode(
                self.entropy_algorithm,
                &diffed.v,
                &mut arena[base + 2 * COMPONENT_WORST_CASE_SIZE..base + 3 * COMPONENT_WORST_CASE_SIZE],
            )?;

            tile_info.push((base, y_len, u_len, v_len, diffed.difference));
        }

        let mut included = frame.tiles.len();
        let region = loop {
            let wire_tiles: Vec<ProgressiveTile<'_>> = frame.tiles[..included]
                .iter()
                .zip(&tile_info[..included])
                .map(|(desc, &(base, y_len, u_len, v_len, difference))| ProgressiveTile {
                    y_quant_index: desc.quant_y,
                    cb_quant_index: desc.quant_cb,
                    cr_quant_index: desc.quant_cr,
                    x_idx: desc.x / 64,
                    y_idx: desc.y / 64,
                    difference,
                    y_data: &arena[base..base + y_len],
                    u_data: &arena[base + COMPONENT_WORST_CASE_SIZE..base + COMPONENT_WORST_CASE_SIZE + u_len],
                    v_data: &arena[base + 2 * COMPONENT_WORST_CASE_SIZE..base + 2 * COMPONENT_WORST_CASE_SIZE + v_len],
                })
                .collect();

            let region = ProRegionPdu {
                rectangles: frame.regions.to_vec(),
                quants: quants.to_vec(),
                tiles: wire_tiles,
            };

            let needed = BLOCK_OVERHEAD_ESTIMATE + region.size();
            if included == 0 || cursor.len() >= needed {
                if included < frame.tiles.len() {
                    warn!(tile_index = included, "dropping trailing progressive tiles: output buffer is full");
                }
                break region;
            }
            included -= 1;
        };

        composer::compose_progressive_frame(&mut cursor, self.frame_idx, &region)?;

        Ok(EncodeReport {
            tiles_written: included,
            bytes_written: cursor.pos(),
        })
    }
}

/// Conservative slack added on top of a region/tile-set's exact `size()`
/// before deciding whether one more tile fits: covers the frame-level
/// `FrameBegin`/`FrameEnd` blocks and both blocks' own headers, none of
/// which are part of `RegionPdu::size()`/`TileSetPdu::size()`.
const BLOCK_OVERHEAD_ESTIMATE: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_bgra_tile() -> Vec<u8> {
        vec![0u8, 0, 0, 255].repeat(64 * 64)
    }

    #[test]
    fn single_solid_tile_encodes_successfully() {
        let mut encoder = EncoderState::new(64, 64, PixelFormat::Bgra32, CodecFlags::empty()).unwrap();
        let buffer = solid_bgra_tile();
        let frame = FrameInput {
            buffer: &buffer,
            width: 64,
            height: 64,
            stride: 64 * 4,
            regions: &[RfxRectangle { x: 0, y: 0, width: 64, height: 64 }],
            tiles: &[TileDescriptor {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
                quant_y: 0,
                quant_cb: 0,
                quant_cr: 0,
            }],
            quants: &[],
        };
        let mut out = vec![0u8; 4096];
        let report = encoder.encode(frame, CodecFlags::empty(), &mut out).unwrap();
        assert_eq!(report.tiles_written, 1);
        assert!(report.bytes_written > 0);
    }

    #[test]
    fn tiny_output_buffer_drops_tiles_without_erroring() {
        let mut encoder = EncoderState::new(64, 64, PixelFormat::Bgra32, CodecFlags::empty()).unwrap();
        let buffer = solid_bgra_tile();
        let frame = FrameInput {
            buffer: &buffer,
            width: 64,
            height: 64,
            stride: 64 * 4,
            regions: &[RfxRectangle { x: 0, y: 0, width: 64, height: 64 }],
            tiles: &[TileDescriptor {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
                quant_y: 0,
                quant_cb: 0,
                quant_cr: 0,
            }],
            quants: &[],
        };
        // Big enough for the one-time header plus an empty frame, too small
        // for the single tile's coded planes to also fit.
        let mut out = vec![0u8; 160];
        let report = encoder.encode(frame, CodecFlags::empty(), &mut out).unwrap();
        assert_eq!(report.tiles_written, 0);
    }

    #[test]
    fn progressive_repeat_tile_is_flagged_as_difference() {
        let mut encoder = EncoderState::new(64, 64, PixelFormat::Bgra32, CodecFlags::PRO1).unwrap();
        let buffer = solid_bgra_tile();
        let tile = TileDescriptor {
            x: 0,
            y: 0,
            width: 64,
            height: 64,
            quant_y: 0,
            quant_cb: 0,
            quant_cr: 0,
        };
        let mut out = vec![0u8; 8192];
        let frame = FrameInput {
            buffer: &buffer,
            width: 64,
            height: 64,
            stride: 64 * 4,
            regions: &[RfxRectangle { x: 0, y: 0, width: 64, height: 64 }],
            tiles: &[tile],
            quants: &[],
        };
        let first = encoder.encode(
            FrameInput {
                buffer: &buffer,
                width: 64,
                height: 64,
                stride: 64 * 4,
                regions: frame.regions,
                tiles: frame.tiles,
                quants: &[],
            },
            CodecFlags::empty(),
            &mut out,
        );
        assert!(first.unwrap().tiles_written == 1);
        let second = encoder.encode(frame, CodecFlags::empty(), &mut out).unwrap();
        assert_eq!(second.tiles_written, 1);
    }

    #[test]
    fn alphav1_wraps_the_tileset_as_extension_plus() {
        let mut encoder = EncoderState::new(64, 64, PixelFormat::Bgra32, CodecFlags::ALPHAV1).unwrap();
        let mut buffer = vec![0u8, 0, 0, 128].repeat(64 * 64);
        buffer[3] = 64; // a lone non-opaque alpha sample so the plane isn't all-zero
        let frame = FrameInput {
            buffer: &buffer,
            width: 64,
            height: 64,
            stride: 64 * 4,
            regions: &[RfxRectangle { x: 0, y: 0, width: 64, height: 64 }],
            tiles: &[TileDescriptor {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
                quant_y: 0,
                quant_cb: 0,
                quant_cr: 0,
            }],
            quants: &[],
        };
        let mut out = vec![0u8; 8192];
        let report = encoder.encode(frame, CodecFlags::empty(), &mut out).unwrap();
        assert_eq!(report.tiles_written, 1);

        // The tileset block is wrapped as WBT_EXTENSION_PLUS (0xDDD7) instead
        // of WBT_EXTENSION (0xCCC7) whenever a tile carries an alpha plane.
        let extension_plus_marker = 0xDDD7u16.to_le_bytes();
        assert!(
            out[..report.bytes_written]
                .windows(2)
                .any(|w| w == extension_plus_marker),
            "expected a WBT_EXTENSION_PLUS block type in the output stream"
        );
    }

    #[test]
    fn get_internals_exposes_working_primitives() {
        let internals = get_internals();
        let mut out = vec![0u8; COMPONENT_WORST_CASE_SIZE];
        let written = (internals.rlgr1)(&[0i16; 4096], &mut out).unwrap();
        assert!(written > 0);
    }
}
