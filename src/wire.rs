//! On-wire block and PDU definitions for the standard (non-progressive)
//! RemoteFX message grammar ([MS-RDPRFX] §2.2).
//!
//! These types model the wire layout only; framing and length fix-up is the
//! composer's job (see `composer.rs`). Every block begins with a 16-bit
//! `blockType` and a 32-bit `blockLen`, exactly as `BlockHeader` below
//! encodes it.

use bit_field::BitField as _;
use bitflags::bitflags;
use ironrdp_core::{
    cast_length, ensure_fixed_part_size, ensure_size, invalid_field_err, Decode, DecodeResult, Encode, EncodeResult,
    ReadCursor, WriteCursor,
};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive as _, ToPrimitive as _};

const CODEC_ID: u8 = 1;
pub(crate) const CHANNEL_ID_FOR_CONTEXT: u8 = 0xFF;
pub(crate) const CHANNEL_ID_FOR_OTHER_VALUES: u8 = 0x00;

const SYNC_MAGIC: u32 = 0xCACC_ACCA;
const SYNC_VERSION: u16 = 0x0100;
const TILE_SIZE: u16 = 0x0040;
const COLOR_CONVERSION_ICT: u16 = 1;
const CLW_XFORM_DWT_53_A: u16 = 1;
const SCALAR_QUANTIZATION: u16 = 1;
const LRF: bool = true;
const CBT_REGION: u16 = 0xcac1;
const NUMBER_OF_TILESETS: u16 = 1;
const CBT_TILESET: u16 = 0xcac2;
const IDX: u16 = 0;
const IS_LAST_TILESET_FLAG: bool = true;
const RECTANGLE_SIZE: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u16)]
pub enum BlockType {
    Tile = 0xCAC3,
    Sync = 0xCCC0,
    CodecVersions = 0xCCC1,
    Channels = 0xCCC2,
    Context = 0xCCC3,
    FrameBegin = 0xCCC4,
    FrameEnd = 0xCCC5,
    Region = 0xCCC6,
    Extension = 0xCCC7,
    /// `ALPHAV1`-tagged tileset wrapper: same `TS_RFX_TILESET` payload as
    /// [`BlockType::Extension`], but every tile additionally carries a
    /// fourth (alpha) plane.
    ExtensionPlus = 0xDDD7,
}

impl BlockType {
    fn is_channel(self) -> bool {
        matches!(
            self,
            BlockType::Context
                | BlockType::FrameBegin
                | BlockType::FrameEnd
                | BlockType::Region
                | BlockType::Extension
                | BlockType::ExtensionPlus
        )
    }
}

/// [2.2.2.1.1] TS_RFX_BLOCKT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub ty: BlockType,
    pub data_length: usize,
}

impl BlockHeader {
    const NAME: &'static str = "RfxBlockHeader";
    pub const FIXED_PART_SIZE: usize = 2 /* blockType */ + 4 /* blockLen */;
}

impl Encode for BlockHeader {
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

impl<'de> Decode<'de> for BlockHeader {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let ty = src.read_u16();
        let ty = BlockType::from_u16(ty).ok_or_else(|| invalid_field_err!("blockType", "Invalid block type"))?;
        let data_length = src.read_u32() as usize;
        data_length
            .checked_sub(Self::FIXED_PART_SIZE)
            .ok_or_else(|| invalid_field_err!("blockLen", "Invalid block length"))?;
        Ok(Self { ty, data_length })
    }
}

/// [2.2.2.1.2] TS_RFX_CODEC_CHANNELT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecChannelHeader {
    pub channel_id: u8,
}

impl CodecChannelHeader {
    const NAME: &'static str = "CodecChannelHeader";
    pub const FIXED_PART_SIZE: usize = 1 /* codecId */ + 1 /* channelId */;
}

impl Encode for CodecChannelHeader {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(CODEC_ID);
        dst.write_u8(self.channel_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl Decode<'_> for CodecChannelHeader {
    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let codec_id = src.read_u8();
        if codec_id != CODEC_ID {
            return Err(invalid_field_err!("codecId", "Invalid codec ID"));
        }
        let channel_id = src.read_u8();
        Ok(Self { channel_id })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct OperatingMode: u16 {
        const IMAGE_MODE = 0x02;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u16)]
pub enum EntropyAlgorithm {
    Rlgr1 = 0x01,
    Rlgr3 = 0x04,
}

impl EntropyAlgorithm {
    #[expect(
        clippy::as_conversions,
        reason = "guarantees discriminant layout, and as is the only way to cast enum -> primitive"
    )]
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// [2.2.2.1.1] TS_RFX_SYNC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPdu;

impl SyncPdu {
    const NAME: &'static str = "RfxSync";
    const FIXED_PART_SIZE: usize = 4 /* magic */ + 2 /* version */;
}

impl Encode for SyncPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u32(SYNC_MAGIC);
        dst.write_u16(SYNC_VERSION);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl<'de> Decode<'de> for SyncPdu {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let magic = src.read_u32();
        if magic != SYNC_MAGIC {
            return Err(invalid_field_err!("magic", "Invalid sync magic"));
        }
        let version = src.read_u16();
        if version != SYNC_VERSION {
            return Err(invalid_field_err!("version", "Invalid sync version"));
        }
        Ok(Self)
    }
}

/// [2.2.2.2.4] TS_RFX_CONTEXT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPdu {
    pub flags: OperatingMode,
    pub entropy_algorithm: EntropyAlgorithm,
}

impl ContextPdu {
    const NAME: &'static str = "RfxContext";
    const FIXED_PART_SIZE: usize = 1 /* ctxId */ + 2 /* tileSize */ + 2 /* properties */;
}

impl Encode for ContextPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(0); // ctxId
        dst.write_u16(TILE_SIZE);

        let mut properties: u16 = 0;
        properties.set_bits(0..3, self.flags.bits());
        properties.set_bits(3..5, COLOR_CONVERSION_ICT);
        properties.set_bits(5..9, CLW_XFORM_DWT_53_A);
        properties.set_bits(9..13, self.entropy_algorithm.as_u16());
        properties.set_bits(13..15, SCALAR_QUANTIZATION);
        properties.set_bit(15, false);
        dst.write_u16(properties);

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl<'de> Decode<'de> for ContextPdu {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let id = src.read_u8();
        if id != 0 {
            return Err(invalid_field_err!("ctxId", "Invalid context ID"));
        }
        let tile_size = src.read_u16();
        if tile_size != TILE_SIZE {
            return Err(invalid_field_err!("tileSize", "Invalid tile size"));
        }

        let properties = src.read_u16();
        let flags = OperatingMode::from_bits_truncate(properties.get_bits(0..3));
        if properties.get_bits(3..5) != COLOR_CONVERSION_ICT {
            return Err(invalid_field_err!("cct", "Invalid color conversion transform"));
        }
        if properties.get_bits(5..9) != CLW_XFORM_DWT_53_A {
            return Err(invalid_field_err!("dwt", "Invalid DWT"));
        }
        let entropy_algorithm = EntropyAlgorithm::from_u16(properties.get_bits(9..13))
            .ok_or_else(|| invalid_field_err!("entropy_algorithm", "Invalid entropy algorithm"))?;
        if properties.get_bits(13..15) != SCALAR_QUANTIZATION {
            return Err(invalid_field_err!("qt", "Invalid quantization type"));
        }

        Ok(Self {
            flags,
            entropy_algorithm,
        })
    }
}

/// [2.2.2.1.4] TS_RFX_CODEC_VERSIONT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecVersionsPdu;

impl CodecVersionsPdu {
    const NAME: &'static str = "RfxCodecVersions";
    const FIXED_PART_SIZE: usize = 1 /* numCodecs */ + 1 /* codecId */ + 2 /* version */;
}

impl Encode for CodecVersionsPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(1);
        dst.write_u8(CODEC_ID);
        dst.write_u16(SYNC_VERSION);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

impl<'de> Decode<'de> for CodecVersionsPdu {
    fn decode(src: &mut ReadCursor<'de>) -> DecodeResult<Self> {
        ensure_fixed_part_size!(in: src);
        let num_codecs = src.read_u8();
        if num_codecs != 1 {
            return Err(invalid_field_err!("numCodecs", "Invalid number of codecs"));
        }
        let codec_id = src.read_u8();
        if codec_id != CODEC_ID {
            return Err(invalid_field_err!("codecId", "Invalid codec ID"));
        }
        let version = src.read_u16();
        if version != SYNC_VERSION {
            return Err(invalid_field_err!("version", "Invalid codec version"));
        }
        Ok(Self)
    }
}

/// A 16-bit, signed integer within the range of 1 to 4096
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct RfxChannelWidth(pub i16);

/// A 16-bit, signed integer within the range of 1 to 2048
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct RfxChannelHeight(pub i16);

/// TS_RFX_CHANNELT
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RfxChannel {
    pub width: RfxChannelWidth,
    pub height: RfxChannelHeight,
}

impl RfxChannel {
    const FIXED_PART_SIZE: usize = 1 /* channelId */ + 2 /* width */ + 2 /* height */;
}

impl Encode for RfxChannel {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(0);
        dst.write_i16(self.width.0);
        dst.write_i16(self.height.0);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RfxChannel"
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

/// [2.2.2.1.3] TS_RFX_CHANNELS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelsPdu(pub Vec<RfxChannel>);

impl ChannelsPdu {
    const NAME: &'static str = "RfxChannels";
    const FIXED_PART_SIZE: usize = 1 /* numChannels */;
}

impl Encode for ChannelsPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u8(cast_length!("numChannels", self.0.len())?);
        for channel in &self.0 {
            channel.encode(dst)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE + self.0.iter().map(Encode::size).sum::<usize>()
    }
}

/// [2.2.2.3.1] TS_RFX_FRAME_BEGIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBeginPdu {
    pub index: u32,
    pub number_of_regions: i16,
}

impl FrameBeginPdu {
    const NAME: &'static str = "RfxFrameBegin";
    const FIXED_PART_SIZE: usize = 4 /* frameIdx */ + 2 /* numRegions */;
}

impl Encode for FrameBeginPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u32(self.index);
        dst.write_i16(self.number_of_regions);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

/// [2.2.2.3.2] TS_RFX_FRAME_END
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEndPdu;

impl FrameEndPdu {
    const NAME: &'static str = "RfxFrameEnd";
}

impl Encode for FrameEndPdu {
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

/// [2.2.2.1.6] TS_RFX_RECT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfxRectangle {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl RfxRectangle {
    const NAME: &'static str = "RfxRectangle";
    const FIXED_PART_SIZE: usize = RECTANGLE_SIZE;
}

impl Encode for RfxRectangle {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);
        dst.write_u16(self.x);
        dst.write_u16(self.y);
        dst.write_u16(self.width);
        dst.write_u16(self.height);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

/// [2.2.2.3.3] TS_RFX_REGION
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPdu {
    pub rectangles: Vec<RfxRectangle>,
}

impl RegionPdu {
    const NAME: &'static str = "RfxRegion";
    const FIXED_PART_SIZE: usize = 1 /* regionFlags */ + 2 /* numRects */ + 2 /* regionType */ + 2 /* numTilesets */;
}

impl Encode for RegionPdu {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_size!(in: dst, size: self.size());

        let mut region_flags = 0u8;
        region_flags.set_bit(0, LRF);
        dst.write_u8(region_flags);

        dst.write_u16(cast_length!("numRectangles", self.rectangles.len())?);
        for rectangle in &self.rectangles {
            rectangle.encode(dst)?;
        }

        dst.write_u16(CBT_REGION);
        dst.write_u16(NUMBER_OF_TILESETS);

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE + self.rectangles.len() * RECTANGLE_SIZE
    }
}

/// 2.2.2.1.5 TS_RFX_CODEC_QUANT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quant {
    pub ll3: u8,
    pub lh3: u8,
    pub hl3: u8,
    pub hh3: u8,
    pub lh2: u8,
    pub hl2: u8,
    pub hh2: u8,
    pub lh1: u8,
    pub hl1: u8,
    pub hh1: u8,
}

/// `{0x66, 0x66, 0x77, 0x88, 0x98}` packed, matching the default quantization
/// values used by the reference RDP server.
impl Default for Quant {
    fn default() -> Self {
        Self {
            ll3: 6,
            lh3: 6,
            hl3: 6,
            hh3: 6,
            lh2: 7,
            hl2: 7,
            hh2: 8,
            lh1: 8,
            hl1: 8,
            hh1: 9,
        }
    }
}

impl Quant {
    const NAME: &'static str = "RfxCodecQuant";
    const FIXED_PART_SIZE: usize = 5;

    /// Returns the 5-byte nibble-packed form consumed directly by
    /// quantization (`quantization::quantize`), in MS-RDPRFX nibble order.
    pub fn to_bytes(self) -> [u8; 5] {
        [
            self.ll3 | (self.lh3 << 4),
            self.hl3 | (self.hh3 << 4),
            self.lh2 | (self.hl2 << 4),
            self.hh2 | (self.lh1 << 4),
            self.hl1 | (self.hh1 << 4),
        ]
    }
}

impl Encode for Quant {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);

        let mut level3 = 0u16;
        level3.set_bits(0..4, u16::from(self.ll3));
        level3.set_bits(4..8, u16::from(self.lh3));
        level3.set_bits(8..12, u16::from(self.hl3));
        level3.set_bits(12..16, u16::from(self.hh3));

        let mut level2_with_lh1 = 0u16;
        level2_with_lh1.set_bits(0..4, u16::from(self.lh2));
        level2_with_lh1.set_bits(4..8, u16::from(self.hl2));
        level2_with_lh1.set_bits(8..12, u16::from(self.hh2));
        level2_with_lh1.set_bits(12..16, u16::from(self.lh1));

        let mut level1 = 0u8;
        level1.set_bits(0..4, self.hl1);
        level1.set_bits(4..8, self.hh1);

        dst.write_u16(level3);
        dst.write_u16(level2_with_lh1);
        dst.write_u8(level1);

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        Self::FIXED_PART_SIZE
    }
}

/// [2.2.2.3.4.1] TS_RFX_TILE, extended with the optional fourth (alpha)
/// plane the reference encoder adds under `ALPHAV1`
/// (`rfx_encode_format_t::fmt == RFX_FORMAT_YUVA`): `quantIdxY · quantIdxCb ·
/// quantIdxCr · xIdx · yIdx · YLen · CbLen · CrLen[ · ALen]`, with the alpha
/// plane's raw bytes appended last when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile<'a> {
    pub y_quant_index: u8,
    pub cb_quant_index: u8,
    pub cr_quant_index: u8,
    pub x: u16,
    pub y: u16,
    pub y_data: &'a [u8],
    pub cb_data: &'a [u8],
    pub cr_data: &'a [u8],
    /// Present only when the owning [`TileSetPdu`] is wrapped as
    /// [`BlockType::ExtensionPlus`] (`ALPHAV1`).
    pub a_data: Option<&'a [u8]>,
}

impl Tile<'_> {
    const NAME: &'static str = "RfxTile";
    const FIXED_PART_SIZE: usize =
        1 /* quantIdxY */ + 1 /* quantIdxCb */ + 1 /* quantIdxCr */ + 2 /* xIdx */ + 2 /* yIdx */ + 2 /* YLen */ + 2 /* CbLen */ + 2 /* CrLen */;
    const ALEN_SIZE: usize = 2;
}

impl Encode for Tile<'_> {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_size!(in: dst, size: self.size());

        dst.write_u8(self.y_quant_index);
        dst.write_u8(self.cb_quant_index);
        dst.write_u8(self.cr_quant_index);
        dst.write_u16(self.x);
        dst.write_u16(self.y);
        dst.write_u16(cast_length!("YLen", self.y_data.len())?);
        dst.write_u16(cast_length!("CbLen", self.cb_data.len())?);
        dst.write_u16(cast_length!("CrLen", self.cr_data.len())?);
        if let Some(a_data) = self.a_data {
            dst.write_u16(cast_length!("ALen", a_data.len())?);
        }
        dst.write_slice(self.y_data);
        dst.write_slice(self.cb_data);
        dst.write_slice(self.cr_data);
        if let Some(a_data) = self.a_data {
            dst.write_slice(a_data);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn size(&self) -> usize {
        let alpha_len = self.a_data.map_or(0, |a| Self::ALEN_SIZE + a.len());
        Self::FIXED_PART_SIZE + self.y_data.len() + self.cb_data.len() + self.cr_data.len() + alpha_len
    }
}

/// [2.2.2.3.4] TS_RFX_TILESET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSetPdu<'a> {
    pub entropy_algorithm: EntropyAlgorithm,
    pub quants: Vec<Quant>,
    pub tiles: Vec<Tile<'a>>,
}

impl TileSetPdu<'_> {
    const NAME: &'static str = "RfxTileSet";
    const FIXED_PART_SIZE: usize = 2 /* subtype */ + 2 /* idx */ + 2 /* properties */ + 1 /* numQuant */
        + 1 /* tileSize */ + 2 /* numTiles */ + 4 /* tilesDataSize */;

    fn tile_block_size(tile: &Tile<'_>) -> usize {
        BlockHeader::FIXED_PART_SIZE + CodecChannelHeader::FIXED_PART_SIZE + tile.size()
    }
}

impl Encode for TileSetPdu<'_> {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        ensure_fixed_part_size!(in: dst);

        dst.write_u16(CBT_TILESET);
        dst.write_u16(IDX);

        let mut properties: u16 = 0;
        properties.set_bit(0, IS_LAST_TILESET_FLAG);
        properties.set_bits(1..4, 0);
        properties.set_bits(4..6, COLOR_CONVERSION_ICT);
        properties.set_bits(6..10, CLW_XFORM_DWT_53_A);
        properties.set_bits(10..14, self.entropy_algorithm.as_u16());
        properties.set_bits(14..16, SCALAR_QUANTIZATION);
        dst.write_u16(properties);

        dst.write_u8(cast_length!("numQuant", self.quants.len())?);
        dst.write_u8(TILE_SIZE as u8);
        dst.write_u16(cast_length!("numTiles", self.tiles.len())?);

        let tiles_data_size: usize = self.tiles.iter().map(Self::tile_block_size).sum();
        dst.write_u32(cast_length!("tilesDataSize", tiles_data_size)?);

        for quant in &self.quants {
            quant.encode(dst)?;
        }

        for tile in &self.tiles {
            BlockHeader {
                ty: BlockType::Tile,
                data_length: Self::tile_block_size(tile),
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
            + self.quants.iter().map(Encode::size).sum::<usize>()
            + self.tiles.iter().map(Self::tile_block_size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_quant_packs_to_the_reference_server_bytes() {
        expect![[r#"
            [
                102,
                102,
                119,
                136,
                152,
            ]
        "#]]
        .assert_debug_eq(&Quant::default().to_bytes());
    }

    #[rstest]
    #[case(BlockType::Tile, 0xCAC3)]
    #[case(BlockType::Sync, 0xCCC0)]
    #[case(BlockType::CodecVersions, 0xCCC1)]
    #[case(BlockType::Channels, 0xCCC2)]
    #[case(BlockType::Context, 0xCCC3)]
    #[case(BlockType::FrameBegin, 0xCCC4)]
    #[case(BlockType::FrameEnd, 0xCCC5)]
    #[case(BlockType::Region, 0xCCC6)]
    #[case(BlockType::Extension, 0xCCC7)]
    fn block_type_discriminants_match_the_wire_values(#[case] ty: BlockType, #[case] wire_value: u16) {
        assert_eq!(ty.to_u16().unwrap(), wire_value);
    }

    #[rstest]
    #[case(BlockType::Context, true)]
    #[case(BlockType::FrameBegin, true)]
    #[case(BlockType::FrameEnd, true)]
    #[case(BlockType::Region, true)]
    #[case(BlockType::Extension, true)]
    #[case(BlockType::Sync, false)]
    #[case(BlockType::CodecVersions, false)]
    #[case(BlockType::Channels, false)]
    #[case(BlockType::Tile, false)]
    fn only_per_frame_blocks_carry_a_codec_channel_header(#[case] ty: BlockType, #[case] is_channel: bool) {
        assert_eq!(ty.is_channel(), is_channel);
    }
}
