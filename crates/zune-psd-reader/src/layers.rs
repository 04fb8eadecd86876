/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer and mask information section
//!
//! The section holds the layer info (layer records followed by every
//! layer's channel payloads), the global layer mask and a trailing run
//! of additional layer information blocks. Documents deeper than eight
//! bits keep their layers inside an `Lr16` or `Lr32` block instead.
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::channel::{ChannelImageData, ChannelRecord, REAL_USER_MASK, USER_MASK};
use crate::constants::SIGNATURE_8BIM;
use crate::errors::PSDDecodeErrors;
use crate::layer_info::{AdditionalLayerInfo, LayerInfoData};
use crate::reader::{ByteRange, Context, LengthWidth, PsdReader};
use crate::resources::Color;

/// The layer and mask information section
#[derive(Debug, Clone, PartialEq)]
pub struct LayerAndMaskInformation {
    /// Payload of the section, without its length field
    pub range:       ByteRange,
    pub layer_info:  Option<LayerInfo>,
    pub global_mask: Option<GlobalLayerMask>,
    pub additional:  Vec<AdditionalLayerInfo>
}

impl LayerAndMaskInformation {
    /// Parse the section, the reader must be at its length field.
    ///
    /// With `decode_layer_info` off only the range is recorded.
    pub(crate) fn parse(
        stream: &mut PsdReader, ctx: &Context
    ) -> Result<LayerAndMaskInformation, PSDDecodeErrors> {
        let range = stream.read_block(ctx.length_width())?;

        let mut section = LayerAndMaskInformation {
            range,
            layer_info: None,
            global_mask: None,
            additional: Vec::new()
        };
        trace!("Layer and mask information: {} bytes", range.len);

        if range.is_empty() || !ctx.options.get_decode_layer_info() {
            return Ok(section);
        }

        stream.parse_range(range, |reader| {
            section.layer_info = Some(LayerInfo::parse(reader, ctx)?);

            if reader.remaining()? >= 4 {
                section.global_mask = GlobalLayerMask::parse(reader)?;
            }
            section.additional = AdditionalLayerInfo::parse_all(reader, ctx)?;

            // whatever is left is too small for a block and must be filler
            let rest = reader.remaining()?;
            let consumed = reader.position()?;

            if reader.take_bytes(rest)?.iter().any(|&b| b != 0) {
                return Err(PSDDecodeErrors::LengthMismatch {
                    declared: range.len,
                    consumed
                });
            }
            Ok(())
        })?;

        Ok(section)
    }

    /// The layers of the document
    ///
    /// Taken from the layer info, or from an `Lr16`, `Lr32` or `Layr`
    /// block when the layer info is empty.
    pub fn layers(&self) -> &[Layer] {
        if let Some(info) = &self.layer_info {
            if !info.layers.is_empty() {
                return &info.layers;
            }
        }
        self.additional
            .iter()
            .find_map(|block| match &block.content {
                LayerInfoData::LayerInfo(info) => Some(info.layers.as_slice()),
                _ => None
            })
            .unwrap_or(&[])
    }
}

/// Layer records and their channel payloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerInfo {
    /// Signed layer count as stored, see [`LayerInfo::has_merged_alpha`]
    pub layer_count: i16,
    pub layers:      Vec<Layer>
}

impl LayerInfo {
    /// A negative layer count means the first alpha channel of the
    /// merged image holds the merged transparency
    pub const fn has_merged_alpha(&self) -> bool {
        self.layer_count < 0
    }

    /// Parse a length prefixed layer info
    pub(crate) fn parse(reader: &mut PsdReader, ctx: &Context) -> Result<LayerInfo, PSDDecodeErrors> {
        let range = reader.read_block(ctx.length_width())?;

        if range.is_empty() {
            return Ok(LayerInfo::default());
        }
        reader.parse_range(range, |body| LayerInfo::parse_body(body, ctx))
    }

    /// Parse a layer info occupying all of `reader`, records first
    /// then every channel payload in record order
    pub(crate) fn parse_body(
        reader: &mut PsdReader, ctx: &Context
    ) -> Result<LayerInfo, PSDDecodeErrors> {
        let layer_count = reader.get_i16()?;
        let count = usize::from(layer_count.unsigned_abs());
        let count = reader.bounded_count(count, LayerRecord::MIN_SIZE)?;

        trace!("Layer count: {}", layer_count);

        let mut records = Vec::with_capacity(count);

        for _ in 0..count {
            records.push(LayerRecord::parse(reader, ctx)?);
        }

        let mut layers = Vec::with_capacity(count);

        for (index, record) in records.into_iter().enumerate() {
            let mut channels = Vec::with_capacity(record.channels.len());

            for channel in &record.channels {
                let rows = record.channel_rows(channel.id)?;
                channels.push(ChannelImageData::parse(reader, ctx, channel, rows)?);
            }
            debug!(
                "Layer {}: {:?}, {}x{}, {} channels",
                index,
                record.name,
                record.width(),
                record.height(),
                channels.len()
            );
            layers.push(Layer { record, channels });
        }
        reader.finish_aligned()?;

        Ok(LayerInfo {
            layer_count,
            layers
        })
    }
}

/// A layer record with its channel payloads
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub record:   LayerRecord,
    pub channels: Vec<ChannelImageData>
}

impl Layer {
    /// The `luni` name when present, the record name otherwise
    pub fn name(&self) -> &str {
        self.record
            .additional
            .iter()
            .find_map(|block| match &block.content {
                LayerInfoData::UnicodeName(name) => Some(name.as_str()),
                _ => None
            })
            .unwrap_or(self.record.name.as_str())
    }

    pub fn channel(&self, id: i16) -> Option<&ChannelImageData> {
        self.channels.iter().find(|channel| channel.channel_id == id)
    }

    /// First additional information block with `key`
    pub fn info(&self, key: &[u8; 4]) -> Option<&AdditionalLayerInfo> {
        self.record
            .additional
            .iter()
            .find(|block| &block.key == key)
    }
}

/// Layer flags byte
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LayerFlags(pub u8);

impl LayerFlags {
    pub const fn transparency_protected(self) -> bool {
        self.0 & 1 != 0
    }

    pub const fn hidden(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// Whether bit 4 carries information
    pub const fn bit4_useful(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    pub const fn pixel_data_irrelevant(self) -> bool {
        self.0 & (1 << 4) != 0
    }
}

/// Blend mode of a layer, keys this reader does not know are kept as is
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LayerBlendMode {
    PassThrough,
    Normal,
    Dissolve,
    Darken,
    Multiply,
    ColorBurn,
    LinearBurn,
    DarkerColor,
    Lighten,
    Screen,
    ColorDodge,
    LinearDodge,
    LighterColor,
    Overlay,
    SoftLight,
    HardLight,
    VividLight,
    LinearLight,
    PinLight,
    HardMix,
    Difference,
    Exclusion,
    Subtract,
    Divide,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Other([u8; 4])
}

const BLEND_MODES: [([u8; 4], LayerBlendMode); 28] = [
    (*b"pass", LayerBlendMode::PassThrough),
    (*b"norm", LayerBlendMode::Normal),
    (*b"diss", LayerBlendMode::Dissolve),
    (*b"dark", LayerBlendMode::Darken),
    (*b"mul ", LayerBlendMode::Multiply),
    (*b"idiv", LayerBlendMode::ColorBurn),
    (*b"lbrn", LayerBlendMode::LinearBurn),
    (*b"dkCl", LayerBlendMode::DarkerColor),
    (*b"lite", LayerBlendMode::Lighten),
    (*b"scrn", LayerBlendMode::Screen),
    (*b"div ", LayerBlendMode::ColorDodge),
    (*b"lddg", LayerBlendMode::LinearDodge),
    (*b"lgCl", LayerBlendMode::LighterColor),
    (*b"over", LayerBlendMode::Overlay),
    (*b"sLit", LayerBlendMode::SoftLight),
    (*b"hLit", LayerBlendMode::HardLight),
    (*b"vLit", LayerBlendMode::VividLight),
    (*b"lLit", LayerBlendMode::LinearLight),
    (*b"pLit", LayerBlendMode::PinLight),
    (*b"hMix", LayerBlendMode::HardMix),
    (*b"diff", LayerBlendMode::Difference),
    (*b"smud", LayerBlendMode::Exclusion),
    (*b"fsub", LayerBlendMode::Subtract),
    (*b"fdiv", LayerBlendMode::Divide),
    (*b"hue ", LayerBlendMode::Hue),
    (*b"sat ", LayerBlendMode::Saturation),
    (*b"colr", LayerBlendMode::Color),
    (*b"lum ", LayerBlendMode::Luminosity)
];

impl LayerBlendMode {
    pub fn from_key(key: [u8; 4]) -> LayerBlendMode {
        BLEND_MODES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, mode)| *mode)
            .unwrap_or(LayerBlendMode::Other(key))
    }

    pub fn key(self) -> [u8; 4] {
        match self {
            LayerBlendMode::Other(key) => key,
            mode => BLEND_MODES
                .iter()
                .find(|(_, m)| *m == mode)
                .map(|(k, _)| *k)
                .unwrap_or(*b"norm")
        }
    }
}

/// Flags byte shared by the user mask and the real user mask
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MaskFlags(pub u8);

impl MaskFlags {
    pub const fn position_relative_to_layer(self) -> bool {
        self.0 & 1 != 0
    }

    pub const fn disabled(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    pub const fn invert_when_blending(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    pub const fn rendered_from_other_data(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    pub const fn has_parameters(self) -> bool {
        self.0 & (1 << 4) != 0
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MaskParameters {
    pub user_density:   Option<u8>,
    pub user_feather:   Option<f64>,
    pub vector_density: Option<u8>,
    pub vector_feather: Option<f64>
}

/// The real user mask, present when a layer has both a user and a vector mask
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RealUserMask {
    pub flags:      MaskFlags,
    pub background: u8,
    pub top:        i32,
    pub left:       i32,
    pub bottom:     i32,
    pub right:      i32
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerMaskData {
    pub top:           i32,
    pub left:          i32,
    pub bottom:        i32,
    pub right:         i32,
    /// 0 or 255
    pub default_color: u8,
    pub flags:         MaskFlags,
    pub parameters:    Option<MaskParameters>,
    pub real:          Option<RealUserMask>
}

impl LayerMaskData {
    const MIN_SIZE: usize = 20;

    /// Parse the mask data block, an empty block means no mask
    fn parse(reader: &mut PsdReader) -> Result<Option<LayerMaskData>, PSDDecodeErrors> {
        let range = reader.read_block(LengthWidth::U32)?;

        if range.is_empty() {
            return Ok(None);
        }
        if range.len < LayerMaskData::MIN_SIZE {
            return Err(PSDDecodeErrors::InsufficientBytes {
                needed:    LayerMaskData::MIN_SIZE,
                remaining: range.len
            });
        }

        reader.parse_range(range, |block| {
            let mut mask = LayerMaskData {
                top:           block.get_i32()?,
                left:          block.get_i32()?,
                bottom:        block.get_i32()?,
                right:         block.get_i32()?,
                default_color: block.get_u8()?,
                flags:         MaskFlags(block.get_u8()?),
                parameters:    None,
                real:          None
            };

            if range.len == LayerMaskData::MIN_SIZE {
                // padding
                block.skip(2)?;
                return Ok(Some(mask));
            }
            if mask.flags.has_parameters() {
                mask.parameters = Some(parse_mask_parameters(block)?);
            }
            if block.remaining()? >= 18 {
                mask.real = Some(RealUserMask {
                    flags:      MaskFlags(block.get_u8()?),
                    background: block.get_u8()?,
                    top:        block.get_i32()?,
                    left:       block.get_i32()?,
                    bottom:     block.get_i32()?,
                    right:      block.get_i32()?
                });
            }
            block.finish_aligned()?;

            Ok(Some(mask))
        })
    }
}

fn parse_mask_parameters(reader: &mut PsdReader) -> Result<MaskParameters, PSDDecodeErrors> {
    let flags = reader.get_u8()?;
    let mut parameters = MaskParameters::default();

    if flags & 1 != 0 {
        parameters.user_density = Some(reader.get_u8()?);
    }
    if flags & (1 << 1) != 0 {
        parameters.user_feather = Some(reader.get_f64()?);
    }
    if flags & (1 << 2) != 0 {
        parameters.vector_density = Some(reader.get_u8()?);
    }
    if flags & (1 << 3) != 0 {
        parameters.vector_feather = Some(reader.get_f64()?);
    }
    Ok(parameters)
}

/// Black and white points of one blending range
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BlendRange {
    pub black: u16,
    pub white: u16
}

/// Source and destination range of one channel
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BlendRangePair {
    pub source:      BlendRange,
    pub destination: BlendRange
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BlendingRanges {
    /// Composite gray ranges, absent when the block is empty
    pub composite: Option<BlendRangePair>,
    pub channels:  Vec<BlendRangePair>
}

impl BlendingRanges {
    fn parse(reader: &mut PsdReader) -> Result<BlendingRanges, PSDDecodeErrors> {
        reader.parse_block(LengthWidth::U32, |block| {
            let mut pairs = Vec::with_capacity(block.remaining()? / 8);

            while block.remaining()? >= 8 {
                pairs.push(BlendRangePair {
                    source:      BlendRange {
                        black: block.get_u16()?,
                        white: block.get_u16()?
                    },
                    destination: BlendRange {
                        black: block.get_u16()?,
                        white: block.get_u16()?
                    }
                });
            }
            let mut pairs = pairs.into_iter();

            Ok(BlendingRanges {
                composite: pairs.next(),
                channels:  pairs.collect()
            })
        })
    }
}

/// One layer record
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    pub top:             i32,
    pub left:            i32,
    pub bottom:          i32,
    pub right:           i32,
    pub channels:        Vec<ChannelRecord>,
    pub blend_mode:      LayerBlendMode,
    pub opacity:         u8,
    /// Clipped to the layer below
    pub clipping:        bool,
    pub flags:           LayerFlags,
    pub mask:            Option<LayerMaskData>,
    pub blending_ranges: BlendingRanges,
    pub name:            String,
    pub additional:      Vec<AdditionalLayerInfo>
}

impl LayerRecord {
    /// Rectangle, channel count, blend signature and key, four single
    /// byte fields and the extra data length
    pub(crate) const MIN_SIZE: usize = 16 + 2 + 4 + 4 + 4 + 4;

    pub(crate) fn parse(reader: &mut PsdReader, ctx: &Context) -> Result<LayerRecord, PSDDecodeErrors> {
        let top = reader.get_i32()?;
        let left = reader.get_i32()?;
        let bottom = reader.get_i32()?;
        let right = reader.get_i32()?;

        let channel_count = usize::from(reader.get_u16()?);
        let channel_count = reader.bounded_count(channel_count, ChannelRecord::MIN_SIZE)?;

        let channels = (0..channel_count)
            .map(|_| ChannelRecord::parse(reader, ctx))
            .collect::<Result<Vec<ChannelRecord>, PSDDecodeErrors>>()?;

        reader.expect_signature(&SIGNATURE_8BIM)?;
        let blend_mode = LayerBlendMode::from_key(reader.get_fourcc()?);

        let opacity = reader.get_u8()?;
        let clipping = reader.get_bool()?;
        let flags = LayerFlags(reader.get_u8()?);
        // filler
        reader.skip(1)?;

        let extra = reader.read_block(LengthWidth::U32)?;

        let (mask, blending_ranges, name, additional) = reader.parse_range(extra, |extra| {
            let start = extra.position()?;

            let mask = LayerMaskData::parse(extra)?;
            let blending_ranges = BlendingRanges::parse(extra)?;

            let name = extra.read_pascal_string()?;
            extra.pad_to(4, start)?;

            let additional = AdditionalLayerInfo::parse_all(extra, ctx)?;
            extra.finish_aligned()?;

            Ok((mask, blending_ranges, name, additional))
        })?;

        Ok(LayerRecord {
            top,
            left,
            bottom,
            right,
            channels,
            blend_mode,
            opacity,
            clipping,
            flags,
            mask,
            blending_ranges,
            name,
            additional
        })
    }

    pub fn width(&self) -> usize {
        span(self.left, self.right).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        span(self.top, self.bottom).unwrap_or(0)
    }

    /// Rows stored for channel `id`, masks use their own rectangle
    pub(crate) fn channel_rows(&self, id: i16) -> Result<usize, PSDDecodeErrors> {
        let (top, bottom) = match (id, &self.mask) {
            (USER_MASK, Some(mask)) => (mask.top, mask.bottom),
            (REAL_USER_MASK, Some(LayerMaskData { real: Some(real), .. })) => {
                (real.top, real.bottom)
            }
            _ => (self.top, self.bottom)
        };

        span(top, bottom).ok_or(PSDDecodeErrors::UnsupportedVariant {
            kind:  "layer rectangle height",
            value: (i64::from(bottom) - i64::from(top)) as u64
        })
    }
}

/// Distance from `start` to `end`, `None` if negative
fn span(start: i32, end: i32) -> Option<usize> {
    usize::try_from(i64::from(end) - i64::from(start)).ok()
}

/// Document wide mask overlay settings
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GlobalLayerMask {
    pub overlay: Color,
    /// 0 transparent to 100 opaque
    pub opacity: u16,
    /// 0 color selected, 1 color protected, 128 use the per layer value
    pub kind:    u8
}

impl GlobalLayerMask {
    fn parse(reader: &mut PsdReader) -> Result<Option<GlobalLayerMask>, PSDDecodeErrors> {
        let range = reader.read_block(LengthWidth::U32)?;

        if range.is_empty() {
            return Ok(None);
        }
        reader.parse_range(range, |block| {
            let mask = GlobalLayerMask {
                overlay: Color::parse(block)?,
                opacity: block.get_u16()?,
                kind:    block.get_u8()?
            };
            let filler = block.remaining()?;
            block.skip(filler)?;

            Ok(Some(mask))
        })
    }
}
