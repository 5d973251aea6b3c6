//! Public error taxonomy for the encoder (C10/encoder boundary).
//!
//! Mirrors the hand-rolled `Display`/`Error` pattern already used by
//! [`crate::rlgr::RlgrError`] rather than pulling in `thiserror` for a
//! handful of variants.

use core::fmt;

use crate::rlgr::RlgrError;

/// Errors surfaced by the public encoder API.
///
/// Lower-level failures (entropy-coder bit-stream overflow, wire-cursor
/// overrun while composing a block) are collapsed into `BufferFull` at the
/// component boundary that produced them, per the "partial success vs. fatal
/// error" rule: a tile that doesn't fit is dropped, not a reason to abort the
/// whole frame.
#[derive(Debug)]
pub enum RfxError {
    /// A caller-supplied argument failed validation (e.g. a tile not aligned
    /// to a 64x64 grid, or a frame whose extent doesn't match the configured
    /// dimensions).
    InvalidArgument { field: &'static str, reason: &'static str },
    /// The output buffer ran out of room; this is not fatal to the frame
    /// overall, only to the tile or block being composed when it happened.
    BufferFull,
    /// A reference cache or scratch buffer could not be allocated.
    OutOfMemory,
    /// An invariant the encoder relies on internally was violated.
    Internal(&'static str),
}

impl fmt::Display for RfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { field, reason } => write!(f, "invalid argument `{field}`: {reason}"),
            Self::BufferFull => write!(f, "output buffer is full"),
            Self::OutOfMemory => write!(f, "allocation failed"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl core::error::Error for RfxError {}

impl From<RlgrError> for RfxError {
    fn from(err: RlgrError) -> Self {
        match err {
            RlgrError::BufferOverflow => Self::BufferFull,
            RlgrError::EmptyTile => Self::InvalidArgument {
                field: "input",
                reason: "tile has no coefficients to encode",
            },
        }
    }
}

impl From<ironrdp_core::EncodeError> for RfxError {
    fn from(_err: ironrdp_core::EncodeError) -> Self {
        // ironrdp-core's cursor-overrun errors are the only EncodeError
        // variant this crate's composer can produce (every fixed-part size
        // is checked against `ensure_size!`/`ensure_fixed_part_size!` before
        // any write).
        Self::BufferFull
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rlgr_buffer_overflow_maps_to_buffer_full() {
        let err: RfxError = RlgrError::BufferOverflow.into();
        assert!(matches!(err, RfxError::BufferFull));
    }

    #[test]
    fn rlgr_empty_tile_maps_to_invalid_argument() {
        let err: RfxError = RlgrError::EmptyTile.into();
        assert!(matches!(err, RfxError::InvalidArgument { .. }));
    }
}
