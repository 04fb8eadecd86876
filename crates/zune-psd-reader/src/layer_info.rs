/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Additional layer information
//!
//! Keyed extension blocks attached to every layer record and to the
//! end of the layer and mask section. Each block is a signature, a four
//! character key, a length (eight bytes in PSB for a handful of keys)
//! and the payload, padded to an even size.
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::constants::{SIGNATURE_8B64, SIGNATURE_8BIM};
use crate::descriptor::VersionedDescriptor;
use crate::errors::PSDDecodeErrors;
use crate::layers::{LayerBlendMode, LayerInfo};
use crate::path::PathRecord;
use crate::reader::{ByteRange, Context, LengthWidth, PsdReader};
use crate::registry::{Entry, Registry};
use crate::resources::Color;

/// Keys whose length field is eight bytes wide in PSB documents
pub const LARGE_LENGTH_KEYS: [[u8; 4]; 13] = [
    *b"LMsk", *b"Lr16", *b"Lr32", *b"Layr", *b"Mt16", *b"Mt32", *b"Mtrn", *b"Alph", *b"FMsk",
    *b"lnk2", *b"FEid", *b"FXid", *b"PxSD"
];

/// Smallest possible block, signature, key and a four byte length
pub(crate) const MIN_BLOCK_SIZE: usize = 12;

/// One additional layer information block
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalLayerInfo {
    pub signature: [u8; 4],
    pub key:       [u8; 4],
    /// Payload without padding
    pub data:      ByteRange,
    pub content:   LayerInfoData
}

impl AdditionalLayerInfo {
    /// Name of the block kind if the key is a known one
    pub fn kind(&self) -> Option<&'static str> {
        LAYER_INFO.name_of(self.key)
    }

    pub(crate) fn parse(
        reader: &mut PsdReader, ctx: &Context
    ) -> Result<AdditionalLayerInfo, PSDDecodeErrors> {
        let start = reader.position()?;

        let signature = reader.get_fourcc()?;

        if signature != SIGNATURE_8BIM && signature != SIGNATURE_8B64 {
            return Err(PSDDecodeErrors::SignatureMismatch {
                expected: &SIGNATURE_8BIM,
                found:    signature
            });
        }
        let key = reader.get_fourcc()?;

        let width = if ctx.version.is_large() && LARGE_LENGTH_KEYS.contains(&key) {
            LengthWidth::U64
        } else {
            LengthWidth::U32
        };
        let data = reader.read_block(width)?;
        reader.pad_to(2, start)?;

        let content = match LAYER_INFO.get(key) {
            Some(entry) => {
                debug!(
                    "Layer information {:?} ({}), {} bytes",
                    fourcc(&key),
                    entry.name,
                    data.len
                );
                reader.parse_range(data, |block| {
                    let content = (entry.decode)(block, ctx, key)?;
                    block.finish_aligned()?;
                    Ok(content)
                })?
            }
            None => {
                warn!(
                    "Unknown layer information {:?}, keeping {} bytes raw",
                    fourcc(&key),
                    data.len
                );
                LayerInfoData::Unknown(data)
            }
        };

        Ok(AdditionalLayerInfo {
            signature,
            key,
            data,
            content
        })
    }

    /// Read blocks until `reader` holds fewer bytes than the smallest block
    pub(crate) fn parse_all(
        reader: &mut PsdReader, ctx: &Context
    ) -> Result<Vec<AdditionalLayerInfo>, PSDDecodeErrors> {
        let mut blocks = Vec::new();

        while reader.remaining()? >= MIN_BLOCK_SIZE {
            blocks.push(AdditionalLayerInfo::parse(reader, ctx)?);
        }
        Ok(blocks)
    }
}

fn fourcc(key: &[u8; 4]) -> &str {
    core::str::from_utf8(key).unwrap_or("????")
}

/// Decoded payload of an additional layer information block
#[derive(Debug, Clone, PartialEq)]
pub enum LayerInfoData {
    /// `luni`
    UnicodeName(String),
    /// `lyid`
    LayerId(u32),
    /// `lsct`, `lsdk`
    SectionDivider(SectionDivider),
    /// One byte flags padded to four: `clbl infx knko lspf tsly lmgm vmgm iOpa`, and `sn2P`
    Flag(bool),
    /// `lclr`
    SheetColor([u16; 4]),
    /// `fxrp`
    ReferencePoint { x: f64, y: f64 },
    /// `brst`
    ChannelBlendingRestrictions(Vec<u32>),
    /// Four byte scalars: `ffxi lnsr lyvr`
    Value(u32),
    /// Fill, adjustment and vector settings stored as a descriptor
    Descriptor(VersionedDescriptor),
    /// `lfx2`
    ObjectEffects(VersionedDescriptor),
    /// `TySh`
    TypeTool(TypeToolObject),
    /// `vmsk`, `vsms`
    VectorMask(VectorMask),
    /// `shmd`
    Metadata(Vec<MetadataItem>),
    /// `SoLd`, `SoLE`
    PlacedLayer(PlacedLayerData),
    /// `lnkD`, `lnk2`, `lnk3`
    LinkedLayers(Vec<LinkedLayer>),
    /// `FMsk`
    FilterMask(FilterMask),
    /// `LMsk`
    UserMask(UserMask),
    /// `expA`
    Exposure(Exposure),
    /// `nvrt`
    Invert,
    /// `post`
    Posterize(u16),
    /// `thrs`
    Threshold(u16),
    /// `Mtrn`, `Mt16`, `Mt32`, the payload is only a marker
    MergedTransparency,
    /// `Lr16`, `Lr32`, `Layr`
    LayerInfo(LayerInfo),
    /// A known key kept as bytes
    Raw(ByteRange),
    Unknown(ByteRange)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SectionDividerType {
    Other = 0,
    OpenFolder = 1,
    ClosedFolder = 2,
    /// Hidden marker closing a group
    BoundingDivider = 3
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SectionDivider {
    pub kind:       SectionDividerType,
    pub blend_mode: Option<LayerBlendMode>,
    /// 0 normal, 1 scene group
    pub sub_type:   Option<u32>
}

/// `TySh` text layer
#[derive(Debug, Clone, PartialEq)]
pub struct TypeToolObject {
    pub version:      u16,
    /// xx, xy, yx, yy, tx, ty
    pub transform:    [f64; 6],
    pub text_version: u16,
    pub text:         VersionedDescriptor,
    pub warp_version: u16,
    pub warp:         VersionedDescriptor,
    pub left:         i32,
    pub top:          i32,
    pub right:        i32,
    pub bottom:       i32
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VectorMask {
    pub version:  u32,
    pub invert:   bool,
    pub not_link: bool,
    pub disable:  bool,
    pub paths:    Vec<PathRecord>
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MetadataItem {
    pub signature:                 [u8; 4],
    pub key:                       [u8; 4],
    pub copy_on_sheet_duplication: bool,
    pub data:                      ByteRange
}

/// `SoLd` and `SoLE` smart object placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLayerData {
    pub version:    u32,
    pub descriptor: VersionedDescriptor
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LinkedLayerKind {
    /// `liFD`, the file is embedded
    Data,
    /// `liFE`, the file lives outside the document
    External,
    /// `liFA`
    Alias
}

/// Modification date of an external linked file
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinkedFileDate {
    pub year:    u32,
    pub month:   u8,
    pub day:     u8,
    pub hour:    u8,
    pub minute:  u8,
    pub seconds: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedLayer {
    pub kind:              LinkedLayerKind,
    pub version:           u32,
    pub unique_id:         String,
    pub original_name:     String,
    pub file_type:         [u8; 4],
    pub creator:           [u8; 4],
    pub open_parameters:   Option<VersionedDescriptor>,
    pub linked_parameters: Option<VersionedDescriptor>,
    pub modified:          Option<LinkedFileDate>,
    /// The embedded or external file contents when present
    pub file_data:         Option<ByteRange>,
    pub child_document_id: Option<String>,
    pub asset_mod_time:    Option<f64>,
    pub asset_locked:      Option<bool>
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FilterMask {
    pub color:   Color,
    pub opacity: u16
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UserMask {
    pub color:   Color,
    pub opacity: u16,
    pub flag:    u8
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Exposure {
    pub version:  u16,
    pub exposure: f32,
    pub offset:   f32,
    pub gamma:    f32
}

type LayerInfoDecoder =
    fn(&mut PsdReader, &Context, [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors>;

macro_rules! layer_info {
    ($key:expr, $name:expr, $decode:expr) => {
        Entry {
            tag:    *$key,
            name:   $name,
            decode: $decode
        }
    };
}

const LAYER_INFO_DECODERS: &[Entry<[u8; 4], LayerInfoDecoder>] = &[
    layer_info!(b"lrFX", "Effects layer", raw),
    layer_info!(b"tySh", "Type tool info (Photoshop 5)", raw),
    layer_info!(b"luni", "Unicode layer name", unicode_name),
    layer_info!(b"lyid", "Layer ID", value),
    layer_info!(b"lfx2", "Object based effects layer info", object_effects),
    layer_info!(b"lfxs", "Object based effects layer info (legacy)", raw),
    layer_info!(b"clbl", "Blend clipping elements", flag),
    layer_info!(b"infx", "Blend interior elements", flag),
    layer_info!(b"knko", "Knockout", flag),
    layer_info!(b"lspf", "Protected", flag),
    layer_info!(b"lclr", "Sheet color", sheet_color),
    layer_info!(b"fxrp", "Reference point", reference_point),
    layer_info!(b"grdm", "Gradient map", raw),
    layer_info!(b"lsct", "Section divider", section_divider),
    layer_info!(b"lsdk", "Nested section divider", section_divider),
    layer_info!(b"brst", "Channel blending restrictions", channel_blending_restrictions),
    layer_info!(b"SoCo", "Solid color sheet", descriptor),
    layer_info!(b"PtFl", "Pattern fill", descriptor),
    layer_info!(b"GdFl", "Gradient fill", descriptor),
    layer_info!(b"vmsk", "Vector mask", vector_mask),
    layer_info!(b"vsms", "Vector mask (CS6)", vector_mask),
    layer_info!(b"TySh", "Type tool object", type_tool),
    layer_info!(b"ffxi", "Foreign effect ID", value),
    layer_info!(b"lnsr", "Layer name source", value),
    layer_info!(b"shpa", "Pattern data", raw),
    layer_info!(b"Patt", "Patterns", raw),
    layer_info!(b"Pat2", "Patterns", raw),
    layer_info!(b"Pat3", "Patterns", raw),
    layer_info!(b"Anno", "Annotations", raw),
    layer_info!(b"shmd", "Metadata", metadata),
    layer_info!(b"lyvr", "Layer version", value),
    layer_info!(b"tsly", "Transparency shapes layer", flag),
    layer_info!(b"lmgm", "Layer mask as global mask", flag),
    layer_info!(b"vmgm", "Vector mask as global mask", flag),
    layer_info!(b"brit", "Brightness and contrast", raw),
    layer_info!(b"mixr", "Channel mixer", raw),
    layer_info!(b"clrL", "Color lookup", raw),
    layer_info!(b"PlLd", "Placed layer", raw),
    layer_info!(b"plLd", "Placed layer (legacy)", raw),
    layer_info!(b"lnkD", "Linked layer", linked_layers),
    layer_info!(b"lnk2", "Linked layer", linked_layers),
    layer_info!(b"lnk3", "Linked layer", linked_layers),
    layer_info!(b"phfl", "Photo filter", raw),
    layer_info!(b"blwh", "Black and white", descriptor),
    layer_info!(b"CgEd", "Content generator extra data", descriptor),
    layer_info!(b"Txt2", "Text engine data", raw),
    layer_info!(b"vibA", "Vibrance", descriptor),
    layer_info!(b"pths", "Unicode path name", descriptor),
    layer_info!(b"anFX", "Animation effects", descriptor),
    layer_info!(b"FMsk", "Filter mask", filter_mask),
    layer_info!(b"SoLd", "Placed layer data", placed_layer),
    layer_info!(b"SoLE", "Smart object layer data", placed_layer),
    layer_info!(b"vstk", "Vector stroke data", descriptor),
    layer_info!(b"vscg", "Vector stroke content data", raw),
    layer_info!(b"sn2P", "Using aligned rendering", aligned_rendering),
    layer_info!(b"vogk", "Vector origination data", raw),
    layer_info!(b"PxSc", "Pixel source data", descriptor),
    layer_info!(b"PxSD", "Pixel source data", raw),
    layer_info!(b"cinf", "Compositor used", descriptor),
    layer_info!(b"artb", "Artboard data", descriptor),
    layer_info!(b"artd", "Artboard data", descriptor),
    layer_info!(b"abdd", "Artboard data", descriptor),
    layer_info!(b"Mtrn", "Saving merged transparency", merged_transparency),
    layer_info!(b"Mt16", "Saving merged transparency (16 bit)", merged_transparency),
    layer_info!(b"Mt32", "Saving merged transparency (32 bit)", merged_transparency),
    layer_info!(b"LMsk", "User mask", user_mask),
    layer_info!(b"expA", "Exposure", exposure),
    layer_info!(b"FXid", "Filter effects", raw),
    layer_info!(b"FEid", "Filter effects", raw),
    layer_info!(b"Alph", "Alpha channel", raw),
    layer_info!(b"iOpa", "Fill opacity", flag),
    layer_info!(b"hue ", "Hue/saturation (legacy)", raw),
    layer_info!(b"hue2", "Hue/saturation", raw),
    layer_info!(b"blnc", "Color balance", raw),
    layer_info!(b"levl", "Levels", raw),
    layer_info!(b"curv", "Curves", raw),
    layer_info!(b"nvrt", "Invert", invert),
    layer_info!(b"post", "Posterize", posterize),
    layer_info!(b"thrs", "Threshold", threshold),
    layer_info!(b"selc", "Selective color", raw),
    layer_info!(b"Lr16", "Layer info (16 bit)", nested_layer_info),
    layer_info!(b"Lr32", "Layer info (32 bit)", nested_layer_info),
    layer_info!(b"Layr", "Layer info", nested_layer_info)
];

/// Decoders for every additional layer information key the reader understands
pub(crate) static LAYER_INFO: Registry<[u8; 4], LayerInfoDecoder> =
    Registry::new("layer information", LAYER_INFO_DECODERS);

fn raw(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Raw(reader.take_rest()?))
}

fn descriptor(
    reader: &mut PsdReader, ctx: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Descriptor(VersionedDescriptor::parse(reader, ctx)?))
}

fn unicode_name(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::UnicodeName(reader.read_unicode_string()?))
}

fn value(reader: &mut PsdReader, _: &Context, key: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    let value = reader.get_u32()?;

    if &key == b"lyid" {
        return Ok(LayerInfoData::LayerId(value));
    }
    Ok(LayerInfoData::Value(value))
}

fn flag(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Flag(reader.get_bool()?))
}

fn aligned_rendering(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Flag(reader.get_u32()? != 0))
}

fn sheet_color(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::SheetColor([
        reader.get_u16()?,
        reader.get_u16()?,
        reader.get_u16()?,
        reader.get_u16()?
    ]))
}

fn reference_point(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::ReferencePoint {
        x: reader.get_f64()?,
        y: reader.get_f64()?
    })
}

fn channel_blending_restrictions(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let remaining = reader.remaining()?;

    if remaining % 4 != 0 {
        return Err(PSDDecodeErrors::LengthMismatch {
            declared: remaining,
            consumed: remaining - remaining % 4
        });
    }
    let channels = (0..remaining / 4)
        .map(|_| reader.get_u32())
        .collect::<Result<Vec<u32>, PSDDecodeErrors>>()?;

    Ok(LayerInfoData::ChannelBlendingRestrictions(channels))
}

fn section_divider(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let kind = match reader.get_u32()? {
        0 => SectionDividerType::Other,
        1 => SectionDividerType::OpenFolder,
        2 => SectionDividerType::ClosedFolder,
        3 => SectionDividerType::BoundingDivider,
        value => {
            return Err(PSDDecodeErrors::UnsupportedVariant {
                kind:  "section divider type",
                value: u64::from(value)
            })
        }
    };
    let mut divider = SectionDivider {
        kind,
        blend_mode: None,
        sub_type: None
    };

    if reader.remaining()? == 0 {
        return Ok(LayerInfoData::SectionDivider(divider));
    }
    reader.expect_signature(&SIGNATURE_8BIM)?;
    divider.blend_mode = Some(LayerBlendMode::from_key(reader.get_fourcc()?));

    if reader.remaining()? == 0 {
        return Ok(LayerInfoData::SectionDivider(divider));
    }
    let sub_type = reader.get_u32()?;

    if sub_type > 1 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "section divider sub type",
            value: u64::from(sub_type)
        });
    }
    divider.sub_type = Some(sub_type);

    Ok(LayerInfoData::SectionDivider(divider))
}

fn object_effects(
    reader: &mut PsdReader, ctx: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let version = reader.get_u32()?;

    if version != 0 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "object effects version",
            value: u64::from(version)
        });
    }
    Ok(LayerInfoData::ObjectEffects(VersionedDescriptor::parse(
        reader, ctx
    )?))
}

fn expect_version_u16(
    reader: &mut PsdReader, kind: &'static str, expected: u16
) -> Result<u16, PSDDecodeErrors> {
    let version = reader.get_u16()?;

    if version != expected {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind,
            value: u64::from(version)
        });
    }
    Ok(version)
}

fn type_tool(
    reader: &mut PsdReader, ctx: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let version = expect_version_u16(reader, "type tool version", 1)?;

    let mut transform = [0.0; 6];
    for value in transform.iter_mut() {
        *value = reader.get_f64()?;
    }
    let text_version = expect_version_u16(reader, "type tool text version", 50)?;
    let text = VersionedDescriptor::parse(reader, ctx)?;

    let warp_version = expect_version_u16(reader, "type tool warp version", 1)?;
    let warp = VersionedDescriptor::parse(reader, ctx)?;

    Ok(LayerInfoData::TypeTool(TypeToolObject {
        version,
        transform,
        text_version,
        text,
        warp_version,
        warp,
        left: reader.get_i32()?,
        top: reader.get_i32()?,
        right: reader.get_i32()?,
        bottom: reader.get_i32()?
    }))
}

fn vector_mask(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let version = reader.get_u32()?;
    let flags = reader.get_u32()?;

    let mut paths = Vec::new();

    while reader.remaining()? >= crate::constants::PATH_RECORD_SIZE {
        paths.push(PathRecord::parse(reader)?);
    }

    Ok(LayerInfoData::VectorMask(VectorMask {
        version,
        invert: flags & 1 != 0,
        not_link: flags & 2 != 0,
        disable: flags & 4 != 0,
        paths
    }))
}

fn metadata(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    let count = reader.get_u32()? as usize;
    let count = reader.bounded_count(count, 16)?;

    let mut items = Vec::with_capacity(count);

    for _ in 0..count {
        let signature = reader.get_fourcc()?;
        let key = reader.get_fourcc()?;
        let copy_on_sheet_duplication = reader.get_bool()?;
        // padding
        reader.skip(3)?;
        let data = reader.read_block(LengthWidth::U32)?;

        items.push(MetadataItem {
            signature,
            key,
            copy_on_sheet_duplication,
            data
        });
    }
    Ok(LayerInfoData::Metadata(items))
}

fn placed_layer(
    reader: &mut PsdReader, ctx: &Context, key: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    reader.expect_signature(b"soLD")?;
    let version = reader.get_u32()?;

    let known = match &key {
        b"SoLE" => version == 4 || version == 5,
        _ => version == 4
    };
    if !known {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "placed layer version",
            value: u64::from(version)
        });
    }

    Ok(LayerInfoData::PlacedLayer(PlacedLayerData {
        version,
        descriptor: VersionedDescriptor::parse(reader, ctx)?
    }))
}

fn linked_layers(
    reader: &mut PsdReader, ctx: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let mut layers = Vec::new();

    // each entry is a u64 length plus at least a kind and a version
    while reader.remaining()? >= 16 {
        let start = reader.position()?;
        let entry = reader.read_block(LengthWidth::U64)?;

        layers.push(reader.parse_range(entry, |entry| linked_layer(entry, ctx))?);
        reader.pad_to(4, start)?;
    }
    Ok(LayerInfoData::LinkedLayers(layers))
}

fn linked_layer(reader: &mut PsdReader, ctx: &Context) -> Result<LinkedLayer, PSDDecodeErrors> {
    let kind = match &reader.get_fourcc()? {
        b"liFD" => LinkedLayerKind::Data,
        b"liFE" => LinkedLayerKind::External,
        b"liFA" => LinkedLayerKind::Alias,
        other => {
            return Err(PSDDecodeErrors::UnknownTag {
                kind: "linked layer type",
                tag:  *other
            })
        }
    };
    let version = reader.get_u32()?;

    if version < 1 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "linked layer version",
            value: u64::from(version)
        });
    }
    let unique_id = reader.read_pascal_string()?;
    let original_name = reader.read_unicode_string()?;
    let file_type = reader.get_fourcc()?;
    let creator = reader.get_fourcc()?;
    let data_length = reader.get_u32()? as usize;
    reader.ensure(data_length)?;

    let open_parameters = if reader.get_bool()? {
        Some(VersionedDescriptor::parse(reader, ctx)?)
    } else {
        None
    };

    let mut linked_parameters = None;
    let mut modified = None;
    let mut file_data = None;

    match kind {
        LinkedLayerKind::External => {
            linked_parameters = Some(VersionedDescriptor::parse(reader, ctx)?);

            if version > 3 {
                modified = Some(LinkedFileDate {
                    year:    reader.get_u32()?,
                    month:   reader.get_u8()?,
                    day:     reader.get_u8()?,
                    hour:    reader.get_u8()?,
                    minute:  reader.get_u8()?,
                    seconds: reader.get_f64()?
                });
            }
            let size = reader.get_u64()?;
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            file_data = Some(reader.take(size)?);
        }
        LinkedLayerKind::Alias => {
            // eight bytes of padding
            reader.skip(8)?;
        }
        LinkedLayerKind::Data => {
            file_data = Some(reader.take(data_length)?);
        }
    }

    let child_document_id = if version >= 5 {
        Some(reader.read_unicode_string()?)
    } else {
        None
    };
    let (asset_mod_time, asset_locked) = if version >= 6 {
        (Some(reader.get_f64()?), Some(reader.get_bool()?))
    } else {
        (None, None)
    };
    // newer versions append fields this reader does not know about
    let rest = reader.remaining()?;
    reader.skip(rest)?;

    Ok(LinkedLayer {
        kind,
        version,
        unique_id,
        original_name,
        file_type,
        creator,
        open_parameters,
        linked_parameters,
        modified,
        file_data,
        child_document_id,
        asset_mod_time,
        asset_locked
    })
}

fn filter_mask(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::FilterMask(FilterMask {
        color:   Color::parse(reader)?,
        opacity: reader.get_u16()?
    }))
}

fn user_mask(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::UserMask(UserMask {
        color:   Color::parse(reader)?,
        opacity: reader.get_u16()?,
        flag:    reader.get_u8()?
    }))
}

fn exposure(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Exposure(Exposure {
        version:  expect_version_u16(reader, "exposure version", 1)?,
        exposure: reader.get_f32()?,
        offset:   reader.get_f32()?,
        gamma:    reader.get_f32()?
    }))
}

fn invert(_: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Invert)
}

fn posterize(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Posterize(reader.get_u16()?))
}

fn threshold(reader: &mut PsdReader, _: &Context, _: [u8; 4]) -> Result<LayerInfoData, PSDDecodeErrors> {
    Ok(LayerInfoData::Threshold(reader.get_u16()?))
}

fn merged_transparency(
    reader: &mut PsdReader, _: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    let rest = reader.remaining()?;
    reader.skip(rest)?;

    Ok(LayerInfoData::MergedTransparency)
}

fn nested_layer_info(
    reader: &mut PsdReader, ctx: &Context, _: [u8; 4]
) -> Result<LayerInfoData, PSDDecodeErrors> {
    if ctx.nested {
        return Err(PSDDecodeErrors::Generic(
            "Layer info block nested inside another layer info block"
        ));
    }
    Ok(LayerInfoData::LayerInfo(LayerInfo::parse_body(
        reader,
        &ctx.nested()
    )?))
}
