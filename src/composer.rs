//! Message composer (C10): sequences already-built PDU values into the
//! on-wire block stream, writing each block's `BlockHeader`/`CodecChannelT`
//! wrapper and handing off to the PDU's own [`Encode`] impl.
//!
//! Mirrors `rfx_compose_message_header`/`rfx_compose_message_frame_*`
//! (standard) and `rfx_pro_compose_message_header`/`rfx_pro_compose_message_*`
//! (progressive) from `rfxencode_compose.c`: every block in both grammars is
//! `blockType · blockLen · body`, and five of the standard blocks additionally
//! carry a two-byte `codecId · channelId` in front of their body. The
//! progressive grammar never does.

use ironrdp_core::{Encode, EncodeResult, WriteCursor};

use crate::progressive::{ProBlockHeader, ProBlockType, ProContextPdu, ProFrameBeginPdu, ProFrameEndPdu, ProRegionPdu};
use crate::wire::{
    BlockHeader, BlockType, ChannelsPdu, CodecChannelHeader, CodecVersionsPdu, ContextPdu, FrameBeginPdu, FrameEndPdu,
    RegionPdu, TileSetPdu, CHANNEL_ID_FOR_CONTEXT, CHANNEL_ID_FOR_OTHER_VALUES,
};

fn write_block(dst: &mut WriteCursor<'_>, ty: BlockType, channel_id: Option<u8>, body_size: usize) -> EncodeResult<()> {
    let channel_header_size = channel_id.map_or(0, |_| CodecChannelHeader::FIXED_PART_SIZE);
    BlockHeader {
        ty,
        data_length: BlockHeader::FIXED_PART_SIZE + channel_header_size + body_size,
    }
    .encode(dst)?;
    if let Some(channel_id) = channel_id {
        CodecChannelHeader { channel_id }.encode(dst)?;
    }
    Ok(())
}

/// Writes `Sync · Context · CodecVersions · Channels`, the part of the
/// standard message stream that is only ever sent once per connection
/// (`enc->header_processed`).
pub fn compose_header(dst: &mut WriteCursor<'_>, context: &ContextPdu, channels: &ChannelsPdu) -> EncodeResult<()> {
    let sync = crate::wire::SyncPdu;
    write_block(dst, BlockType::Sync, None, sync.size())?;
    sync.encode(dst)?;

    write_block(dst, BlockType::Context, Some(CHANNEL_ID_FOR_CONTEXT), context.size())?;
    context.encode(dst)?;

    let codec_versions = CodecVersionsPdu;
    write_block(dst, BlockType::CodecVersions, None, codec_versions.size())?;
    codec_versions.encode(dst)?;

    write_block(dst, BlockType::Channels, None, channels.size())?;
    channels.encode(dst)?;

    Ok(())
}

/// Writes one complete standard frame: `FrameBegin · Region · (Extension ·
/// TileSet) · FrameEnd`.
pub fn compose_frame(
    dst: &mut WriteCursor<'_>,
    frame_index: u32,
    region: &RegionPdu,
    tile_set: &TileSetPdu<'_>,
) -> EncodeResult<()> {
    let frame_begin = FrameBeginPdu {
        index: frame_index,
        number_of_regions: 1,
    };
    write_block(dst, BlockType::FrameBegin, Some(CHANNEL_ID_FOR_OTHER_VALUES), frame_begin.size())?;
    frame_begin.encode(dst)?;

    write_block(dst, BlockType::Region, Some(CHANNEL_ID_FOR_OTHER_VALUES), region.size())?;
    region.encode(dst)?;

    // ALPHAV1: tiles carrying a fourth (alpha) plane are wrapped as
    // WBT_EXTENSION_PLUS instead of WBT_EXTENSION; the inner TS_RFX_TILESET
    // payload (and its CBT_TILESET subtype) is unchanged.
    let extension_type = if tile_set.tiles.iter().any(|tile| tile.a_data.is_some()) {
        BlockType::ExtensionPlus
    } else {
        BlockType::Extension
    };
    write_block(dst, extension_type, Some(CHANNEL_ID_FOR_OTHER_VALUES), tile_set.size())?;
    tile_set.encode(dst)?;

    let frame_end = FrameEndPdu;
    write_block(dst, BlockType::FrameEnd, Some(CHANNEL_ID_FOR_OTHER_VALUES), frame_end.size())?;
    frame_end.encode(dst)?;

    Ok(())
}

fn write_pro_block(dst: &mut WriteCursor<'_>, ty: ProBlockType, body_size: usize) -> EncodeResult<()> {
    ProBlockHeader {
        ty,
        data_length: ProBlockHeader::FIXED_PART_SIZE + body_size,
    }
    .encode(dst)
}

/// Writes `Sync · ProContext`, the progressive header.
///
/// Unlike the standard grammar, progressive never sends `CodecVersions` or
/// `Channels` — the reference composer reuses the same `rfx_compose_message_sync`
/// call but has no progressive equivalent of the other two blocks.
pub fn compose_progressive_header(dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
    let sync = crate::wire::SyncPdu;
    write_block(dst, BlockType::Sync, None, sync.size())?;
    sync.encode(dst)?;

    let context = ProContextPdu;
    write_pro_block(dst, ProBlockType::Context, context.size())?;
    context.encode(dst)?;

    Ok(())
}

/// Writes one complete progressive frame: `ProFrameBegin · ProRegion ·
/// ProFrameEnd`.
pub fn compose_progressive_frame(dst: &mut WriteCursor<'_>, frame_index: u32, region: &ProRegionPdu<'_>) -> EncodeResult<()> {
    let frame_begin = ProFrameBeginPdu { index: frame_index };
    write_pro_block(dst, ProBlockType::FrameBegin, frame_begin.size())?;
    frame_begin.encode(dst)?;

    write_pro_block(dst, ProBlockType::Region, region.size())?;
    region.encode(dst)?;

    let frame_end = ProFrameEndPdu;
    write_pro_block(dst, ProBlockType::FrameEnd, frame_end.size())?;
    frame_end.encode(dst)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{EntropyAlgorithm, OperatingMode, RfxChannel, RfxChannelHeight, RfxChannelWidth};

    #[test]
    fn header_round_trips_through_a_cursor() {
        let context = ContextPdu {
            flags: OperatingMode::IMAGE_MODE,
            entropy_algorithm: EntropyAlgorithm::Rlgr1,
        };
        let channels = ChannelsPdu(vec![RfxChannel {
            width: RfxChannelWidth(1024),
            height: RfxChannelHeight(768),
        }]);

        let mut buffer = vec![0u8; 256];
        let mut cursor = WriteCursor::new(&mut buffer);
        compose_header(&mut cursor, &context, &channels).unwrap();
        assert!(cursor.pos() > 0);
    }

    #[test]
    fn empty_frame_round_trips_through_a_cursor() {
        let region = RegionPdu {
            rectangles: vec![crate::wire::RfxRectangle {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
            }],
        };
        let tile_set = TileSetPdu {
            entropy_algorithm: EntropyAlgorithm::Rlgr1,
            quants: vec![Default::default()],
            tiles: vec![],
        };

        let mut buffer = vec![0u8; 256];
        let mut cursor = WriteCursor::new(&mut buffer);
        compose_frame(&mut cursor, 0, &region, &tile_set).unwrap();
        assert!(cursor.pos() > 0);
    }

    #[test]
    fn progressive_header_and_frame_round_trip_through_a_cursor() {
        let mut buffer = vec![0u8; 256];
        let mut cursor = WriteCursor::new(&mut buffer);
        compose_progressive_header(&mut cursor).unwrap();

        let region = ProRegionPdu {
            rectangles: vec![crate::wire::RfxRectangle {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
            }],
            quants: vec![Default::default()],
            tiles: vec![],
        };
        compose_progressive_frame(&mut cursor, 0, &region).unwrap();
        assert!(cursor.pos() > 0);
    }

    /// §8 "Composer length fix-up": every emitted block's declared
    /// `blockLen` must equal the number of bytes the block actually
    /// occupies (its own header plus body), walked from the front of the
    /// stream rather than from any single block's own accounting.
    #[test]
    fn every_emitted_block_len_matches_its_actual_span() {
        use ironrdp_core::ReadCursor;

        let context = ContextPdu {
            flags: OperatingMode::IMAGE_MODE,
            entropy_algorithm: EntropyAlgorithm::Rlgr3,
        };
        let channels = ChannelsPdu(vec![RfxChannel {
            width: RfxChannelWidth(64),
            height: RfxChannelHeight(64),
        }]);
        let region = RegionPdu {
            rectangles: vec![crate::wire::RfxRectangle {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
            }],
        };
        let tile_set = TileSetPdu {
            entropy_algorithm: EntropyAlgorithm::Rlgr3,
            quants: vec![Default::default()],
            tiles: vec![],
        };

        let mut buffer = vec![0u8; 256];
        let mut cursor = WriteCursor::new(&mut buffer);
        compose_header(&mut cursor, &context, &channels).unwrap();
        compose_frame(&mut cursor, 0, &region, &tile_set).unwrap();
        let written = cursor.pos();

        let mut reader = ReadCursor::new(&buffer[..written]);
        while !reader.is_empty() {
            let start = reader.pos();
            let header = BlockHeader::decode(&mut reader).unwrap();
            let end = start + header.data_length;
            assert!(end <= written, "block at {start} claims to extend past the written stream");
            reader = ReadCursor::new(&buffer[end..written]);
        }
    }
}
