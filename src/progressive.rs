//! On-wire block definitions for the progressive ("Pro v1") RemoteFX message
//! grammar.
//!
//! Mirrors `rfx_pro_compose_message_*` in `rfxencode_compose.c`: unlike the
//! standard grammar ([`crate::wire`]), progressive blocks carry no
//! `CodecChannelT` (codecId/channelId) wrapper — every block is just a
//! `blockType`/`blockLen` header directly followed by its body.

use bitflags::bitflags;
use ironrdp_core::{
    cast_length, ensure_fixed_part_size, ensure_size, invalid_field_err, Decode, DecodeResult, Encode, EncodeResult,
    ReadCursor, WriteCursor,
};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive as _, ToPrimitive as _};

use crate::wire::{Quant, RfxRectangle};

/// `CT_TILE_64x64`: the only tile size this codec ever negotiates.
const TILE_SIZE: u8 = 0x40;

bitflags! {
    /// `TS_RFX_CONTEXT` progressive flags; `RFX_SUBBAND_DIFFING` is the only
    /// bit this encoder ever emits, since sub-band diffing (C9) is always
    /// active in progressive mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ContextFlags: u8 {
        const SUBBAND_DIFFING = 0x01;
    }
}

bitflags! {
    /// `TS_RFX_REGION` sub-band transform flags; `RFX_DWT_REDUCE_EXTRAPOLATE`
    /// is always set because progressive tiles always use the
    /// Reduce-Extrapolate DWT (C4).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SubbandFlags: u8 {
        const DWT_REDUCE_EXTRAPOLATE = 0x01;
    }
}

bitflags! {
    /// Per-tile flags; `DIFFERENCE` marks a tile coded against the
    /// progressive reference ring (C9) rather than as original coefficients.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TileFlags: u8 {
        const DIFFERENCE = 0x01;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u16)]
pub enum ProBlockType {
    Sync = 0xCCC0,
    FrameBegin = 0xCCC1,
    FrameEnd = 0xCCC2,
    Context = 0xCCC3,
    Region = 0xCCC4,
    TileSimple = 0xCCC5,
    TileProgressiveFirst = 0xCCC6,
    TileProgressiveUpgrade = 0xCCC7,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProBlockHeader {
    pub ty: ProBlockType,
    pub data_length: usize,
}

impl ProBlockHeader {
    const NAME: &'static str = "RfxProBlockHeader";
    pub const FIXED_PART_SIZE: usize = 2 /* blockType */ + 4 /* blockLen */;
}

impl Encode for ProBlockHeader {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u16(self.ty.to_u16().unwrap());
        dst.write_u32(cast_length!("data len", self.data_length)?);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl<'de> Decode<'de> for ProBlockHeader {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let ty = src.read_u16();
        let ty = ProBlockType::from_u16(ty).ok_or_else(|| invalid_field_err!("blockType", "Invalid block type"))?;
        let data_length = src.read_u32() as usize;
        data_length
            .checked_sub(Self::FIXED_PART_SIZE)
            .ok_or_else(|| invalid_field_err!("blockLen", "Invalid block length"))?;
        Ok(Self { ty, data_length })
    }
}

/// `PRO_RFX_CONTEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProContextPdu;

impl ProContextPdu {
    const NAME: &'static str = "RfxProContext";
    const FIXED_PART_SIZE: usize = 1 /* ctxId */ + 2 /* tileSize */ + 1 /* flags */;
}

impl Encode for ProContextPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(0); // ctxId
        dst.write_u16(u16::from(TILE_SIZE));
        dst.write_u8(ContextFlags::SUBBAND_DIFFING.bits());
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl<'de> Decode<'de> for ProContextPdu {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let _ctx_id = src.read_u8();
        let tile_size = src.read_u16();
        if tile_size != u16::from(TILE_SIZE) {
            return Err(invalid_field_err!("tileSize", "Invalid tile size"));
        }
        let _flags = src.read_u8();
        Ok(Self)
    }
}

/// `PRO_RFX_FRAME_BEGIN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProFrameBeginPdu {
    pub index: u32,
}

impl ProFrameBeginPdu {
    const NAME: &'static str = "RfxProFrameBegin";
    const FIXED_PART_SIZE: usize = 4 /* frameIdx */ + 2 /* numRegions */;
}

impl Encode for ProFrameBeginPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u32(self.index);
        dst.write_u16(1); // numRegions
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

/// `PRO_RFX_FRAME_END`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProFrameEndPdu;

impl ProFrameEndPdu {
    const NAME: &'static str = "RfxProFrameEnd";
}

impl Encode for ProFrameEndPdu {
    fn encode(&self, _dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        0
    }
}

/// One progressive tile record. `tail_len` is always written as 0 (reserved
/// for future use, per §4.10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveTile<'a> {
    pub y_quant_index: u8,
    pub cb_quant_index: u8,
    pub cr_quant_index: u8,
    pub x_idx: u16,
    pub y_idx: u16,
    pub difference: bool,
    pub y_data: &'a [u8],
    pub u_data: &'a [u8],
    pub v_data: &'a [u8],
}

impl ProgressiveTile<'_> {
    const NAME: &'static str = "RfxProgressiveTile";
    const FIXED_PART_SIZE: usize = 1 /* quantIdxY */ + 1 /* quantIdxCb */ + 1 /* quantIdxCr */
        + 2 /* xIdx */ + 2 /* yIdx */ + 1 /* flags */
        + 2 /* yLen */ + 2 /* cbLen */ + 2 /* crLen */ + 2 /* tailLen */;

    fn block_size(&self) -> usize {
        ProBlockHeader::FIXED_PART_SIZE + self.size()
    }
}

impl Encode for ProgressiveTile<'_> {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_size!(in: dst, size: self.size());

        dst.write_u8(self.y_quant_index);
        dst.write_u8(self.cb_quant_index);
        dst.write_u8(self.cr_quant_index);
        dst.write_u16(self.x_idx);
        dst.write_u16(self.y_idx);

        let flags = if self.difference {
            TileFlags::DIFFERENCE
        } else {
            TileFlags::empty()
        };
        dst.write_u8(flags.bits());

        dst.write_u16(cast_length!("yLen", self.y_data.len())?);
        dst.write_u16(cast_length!("cbLen", self.u_data.len())?);
        dst.write_u16(cast_length!("crLen", self.v_data.len())?);
        dst.write_u16(0); // tailLen, reserved

        dst.write_slice(self.y_data);
        dst.write_slice(self.u_data);
        dst.write_slice(self.v_data);

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE + self.y_data.len() + self.u_data.len() + self.v_data.len()
    }
}

/// `PRO_RFX_REGION`: embeds the quant table and every progressive tile for
/// this frame's single region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProRegionPdu<'a> {
    pub rectangles: Vec<RfxRectangle>,
    pub quants: Vec<Quant>,
    pub tiles: Vec<ProgressiveTile<'a>>,
}

impl ProRegionPdu<'_> {
    const NAME: &'static str = "RfxProRegion";
    const FIXED_PART_SIZE: usize = 1 /* tileSize */ + 2 /* numRects */ + 1 /* numQuant */
        + 1 /* numProgQuant */ + 1 /* flags */ + 2 /* numTiles */ + 4 /* tileDataSize */;
}

impl Encode for ProRegionPdu<'_> {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_size!(in: dst, size: self.size());

        dst.write_u8(TILE_SIZE);
        dst.write_u16(cast_length!("numRects", self.rectangles.len())?);
        dst.write_u8(cast_length!("numQuant", self.quants.len())?);
        dst.write_u8(0); // numProgQuant, unused by this encoder
        dst.write_u8(SubbandFlags::DWT_REDUCE_EXTRAPOLATE.bits());
        dst.write_u16(cast_length!("numTiles", self.tiles.len())?);

        let tile_data_size: usize = self.tiles.iter().map(ProgressiveTile::block_size).sum();
        dst.write_u32(cast_length!("tileDataSize", tile_data_size)?);

        for rectangle in &self.rectangles {
            rectangle.encode(dst)?;
        }
        for quant in &self.quants {
            quant.encode(dst)?;
        }
        for tile in &self.tiles {
            ProBlockHeader {
                ty: ProBlockType::TileSimple,
                data_length: tile.block_size(),
            }
            .encode(dst)?;
            tile.encode(dst)?;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
            + self.rectangles.iter().map(Encode::size).sum::<usize>()
            + self.quants.iter().map(Encode::size).sum::<usize>()
            + self.tiles.iter().map(ProgressiveTile::block_size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_size_matches_fixed_part() {
        let region = ProRegionPdu {
            rectangles: vec![],
            quants: vec![],
            tiles: vec![],
        };
        assert_eq!(region.size(), ProRegionPdu::FIXED_PART_SIZE);
    }

    #[test]
    fn tile_block_size_accounts_for_header_and_payload() {
        let tile = ProgressiveTile {
            y_quant_index: 0,
            cb_quant_index: 0,
            cr_quant_index: 0,
            x_idx: 0,
            y_idx: 0,
            difference: false,
            y_data: &[1, 2, 3],
            u_data: &[4, 5],
            v_data: &[6],
        };
        assert_eq!(
            tile.block_size(),
            ProBlockHeader::FIXED_PART_SIZE + ProgressiveTile::FIXED_PART_SIZE + 6
        );
    }
}
