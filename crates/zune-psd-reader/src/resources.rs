/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image resources section
//!
//! A sequence of blocks each carrying a signature, a two byte id, a
//! padded pascal name and a padded payload. Ids the reader knows are
//! decoded through [`RESOURCES`], the plug-in range and unknown ids are
//! kept as ranges and saved paths are parsed when their size allows it.
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::constants::{PATH_RECORD_SIZE, PATH_RESOURCES, PLUGIN_RESOURCES, RESOURCE_SIGNATURES};
use crate::descriptor::VersionedDescriptor;
use crate::errors::PSDDecodeErrors;
use crate::path::PathRecord;
use crate::reader::{ByteRange, Context, LengthWidth, PsdReader};
use crate::registry::{Entry, Registry};

/// The image resources section
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResources {
    /// Payload of the section, without its length field
    pub range:  ByteRange,
    pub blocks: Vec<ImageResourceBlock>
}

impl ImageResources {
    /// First block with `id`
    pub fn get(&self, id: u16) -> Option<&ImageResourceBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResourceBlock {
    pub signature: [u8; 4],
    pub id:        u16,
    pub name:      String,
    /// Payload of the block, without padding
    pub data:      ByteRange,
    pub content:   ResourceData
}

impl ImageResourceBlock {
    /// Name of the resource kind, if the id is a known one
    pub fn kind(&self) -> Option<&'static str> {
        RESOURCES.name_of(self.id)
    }
}

/// Decoded payload of an image resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    ResolutionInfo(ResolutionInfo),
    AlphaChannelNames(Vec<String>),
    Caption(String),
    BorderInformation(BorderInformation),
    BackgroundColor(Color),
    /// Index of the target layer
    LayerState(u16),
    WorkingPath(Vec<PathRecord>),
    /// Group id of each layer
    LayerGroups(Vec<u16>),
    /// Copyright, watermark, untagged profile and effects visible flags
    Flag(bool),
    Thumbnail(Thumbnail),
    GlobalAngle(i32),
    GlobalAltitude(i32),
    /// The embedded ICC profile, left uninterpreted
    IccProfile(ByteRange),
    DocumentIdSeed(u32),
    UnicodeAlphaNames(Vec<String>),
    IndexedColorCount(u16),
    TransparencyIndex(u16),
    Url(String),
    WorkflowUrl(String),
    AlphaIdentifiers(Vec<u32>),
    VersionInfo(VersionInfo),
    Xmp(ByteRange),
    CaptionDigest([u8; 16]),
    PrintScale(PrintScale),
    PixelAspectRatio(PixelAspectRatio),
    LayerSelectionIds(Vec<u32>),
    LayerGroupsEnabled(Vec<bool>),
    /// Auto save file path or format
    AutoSave(String),
    PrintFlagsInformation(PrintFlagsInformation),
    Descriptor(VersionedDescriptor),
    /// A saved path from the path id range
    Path(Vec<PathRecord>),
    /// A known resource kept as bytes
    Raw(ByteRange),
    /// A resource from the plug-in id range
    Plugin(ByteRange),
    Unknown(ByteRange)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResolutionUnit {
    PixelsPerInch = 1,
    PixelsPerCm = 2
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DimensionUnit {
    Inches = 1,
    Cm = 2,
    Points = 3,
    Picas = 4,
    Columns = 5
}

impl ResolutionUnit {
    fn read(reader: &mut PsdReader) -> Result<ResolutionUnit, PSDDecodeErrors> {
        match reader.get_u16()? {
            1 => Ok(ResolutionUnit::PixelsPerInch),
            2 => Ok(ResolutionUnit::PixelsPerCm),
            value => Err(PSDDecodeErrors::UnsupportedVariant {
                kind:  "resolution unit",
                value: u64::from(value)
            })
        }
    }
}

impl DimensionUnit {
    fn read(reader: &mut PsdReader) -> Result<DimensionUnit, PSDDecodeErrors> {
        match reader.get_u16()? {
            1 => Ok(DimensionUnit::Inches),
            2 => Ok(DimensionUnit::Cm),
            3 => Ok(DimensionUnit::Points),
            4 => Ok(DimensionUnit::Picas),
            5 => Ok(DimensionUnit::Columns),
            value => Err(PSDDecodeErrors::UnsupportedVariant {
                kind:  "dimension unit",
                value: u64::from(value)
            })
        }
    }
}

/// 16.16 fixed point to float
fn fixed_16_16(value: u32) -> f64 {
    f64::from(value) / 65536.0
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolutionInfo {
    pub horizontal:      f64,
    pub horizontal_unit: ResolutionUnit,
    pub width_unit:      DimensionUnit,
    pub vertical:        f64,
    pub vertical_unit:   ResolutionUnit,
    pub height_unit:     DimensionUnit
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BorderInformation {
    pub width: f64,
    pub unit:  u16
}

/// A color as stored in resources and masks
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Color {
    /// Color space id, 0 RGB, 1 HSB, 2 CMYK, 7 Lab, 8 grayscale
    pub space:      u16,
    pub components: [u16; 4]
}

impl Color {
    pub(crate) fn parse(reader: &mut PsdReader) -> Result<Color, PSDDecodeErrors> {
        Ok(Color {
            space:      reader.get_u16()?,
            components: [
                reader.get_u16()?,
                reader.get_u16()?,
                reader.get_u16()?,
                reader.get_u16()?
            ]
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ThumbnailFormat {
    RawRgb = 0,
    Jpeg = 1
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Thumbnail {
    pub format:          ThumbnailFormat,
    pub width:           u32,
    pub height:          u32,
    /// Padded row bytes
    pub width_bytes:     u32,
    pub total_size:      u32,
    pub compressed_size: u32,
    /// Encoded image, usually a JFIF stream
    pub data:            ByteRange
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VersionInfo {
    pub version:              u32,
    pub has_real_merged_data: bool,
    pub writer:               String,
    pub reader:               String,
    pub file_version:         u32
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrintScale {
    /// 0 centered, 1 size to fit, 2 user defined
    pub style: u16,
    pub x:     f32,
    pub y:     f32,
    pub scale: f32
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelAspectRatio {
    pub version: u32,
    pub ratio:   f64
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PrintFlagsInformation {
    pub version:           u16,
    pub center_crop_marks: bool,
    pub bleed_width:       u32,
    pub bleed_scale:       u16
}

type ResourceDecoder = fn(&mut PsdReader, &Context) -> Result<ResourceData, PSDDecodeErrors>;

macro_rules! resource {
    ($id:expr, $name:expr, $decode:expr) => {
        Entry {
            tag:    $id,
            name:   $name,
            decode: $decode
        }
    };
}

const RESOURCE_DECODERS: &[Entry<u16, ResourceDecoder>] = &[
    resource!(0x03E8, "Channels, rows, columns, depth and mode", raw),
    resource!(0x03E9, "Macintosh print manager print info", raw),
    resource!(0x03EA, "Macintosh page format information", raw),
    resource!(0x03EB, "Indexed color table", raw),
    resource!(0x03ED, "Resolution info", resolution_info),
    resource!(0x03EE, "Alpha channel names", alpha_channel_names),
    resource!(0x03EF, "Display info (obsolete)", raw),
    resource!(0x03F0, "Caption", caption),
    resource!(0x03F1, "Border information", border_information),
    resource!(0x03F2, "Background color", background_color),
    resource!(0x03F3, "Print flags", raw),
    resource!(0x03F4, "Grayscale and multichannel halftoning information", raw),
    resource!(0x03F5, "Color halftoning information", raw),
    resource!(0x03F6, "Duotone halftoning information", raw),
    resource!(0x03F7, "Grayscale and multichannel transfer function", raw),
    resource!(0x03F8, "Color transfer functions", raw),
    resource!(0x03F9, "Duotone transfer functions", raw),
    resource!(0x03FA, "Duotone image information", raw),
    resource!(0x03FB, "Effective black and white values for the dot range", raw),
    resource!(0x03FC, "Obsolete", raw),
    resource!(0x03FD, "EPS options", raw),
    resource!(0x03FE, "Quick mask information", raw),
    resource!(0x03FF, "Obsolete", raw),
    resource!(0x0400, "Layer state information", layer_state),
    resource!(0x0401, "Working path", working_path),
    resource!(0x0402, "Layers group information", layer_groups),
    resource!(0x0403, "Obsolete", raw),
    resource!(0x0404, "IPTC-NAA record", raw),
    resource!(0x0405, "Image mode for raw format files", raw),
    resource!(0x0406, "JPEG quality", raw),
    resource!(0x0408, "Grid and guides information", raw),
    resource!(0x0409, "Thumbnail resource (Photoshop 4.0)", thumbnail),
    resource!(0x040A, "Copyright flag", flag),
    resource!(0x040B, "URL", url),
    resource!(0x040C, "Thumbnail resource", thumbnail),
    resource!(0x040D, "Global angle", global_angle),
    resource!(0x040E, "Color samplers resource (obsolete)", raw),
    resource!(0x040F, "ICC profile", icc_profile),
    resource!(0x0410, "Watermark", flag),
    resource!(0x0411, "ICC untagged profile", flag),
    resource!(0x0412, "Effects visible", flag),
    resource!(0x0413, "Spot halftone", raw),
    resource!(0x0414, "Document specific IDs seed number", document_id_seed),
    resource!(0x0415, "Unicode alpha names", unicode_alpha_names),
    resource!(0x0416, "Indexed color table count", indexed_color_count),
    resource!(0x0417, "Transparency index", transparency_index),
    resource!(0x0419, "Global altitude", global_altitude),
    resource!(0x041A, "Slices", raw),
    resource!(0x041B, "Workflow URL", workflow_url),
    resource!(0x041C, "Jump to XPEP", raw),
    resource!(0x041D, "Alpha identifiers", alpha_identifiers),
    resource!(0x041E, "URL list", raw),
    resource!(0x0421, "Version info", version_info),
    resource!(0x0422, "EXIF data 1", raw),
    resource!(0x0423, "EXIF data 3", raw),
    resource!(0x0424, "XMP metadata", xmp),
    resource!(0x0425, "Caption digest", caption_digest),
    resource!(0x0426, "Print scale", print_scale),
    resource!(0x0428, "Pixel aspect ratio", pixel_aspect_ratio),
    resource!(0x0429, "Layer comps", descriptor),
    resource!(0x042A, "Alternate duotone colors", raw),
    resource!(0x042B, "Alternate spot colors", raw),
    resource!(0x042D, "Layer selection IDs", layer_selection_ids),
    resource!(0x042E, "HDR toning information", raw),
    resource!(0x042F, "Print info", raw),
    resource!(0x0430, "Layer group(s) enabled ID", layer_groups_enabled),
    resource!(0x0431, "Color samplers resource", raw),
    resource!(0x0432, "Measurement scale", descriptor),
    resource!(0x0433, "Timeline information", descriptor),
    resource!(0x0434, "Sheet disclosure", descriptor),
    resource!(0x0435, "Display info", raw),
    resource!(0x0436, "Onion skins", descriptor),
    resource!(0x0438, "Count information", descriptor),
    resource!(0x043A, "Print information", descriptor),
    resource!(0x043B, "Print style", descriptor),
    resource!(0x043C, "Macintosh NSPrintInfo", raw),
    resource!(0x043D, "Windows DEVMODE", raw),
    resource!(0x043E, "Auto save file path", auto_save),
    resource!(0x043F, "Auto save format", auto_save),
    resource!(0x0440, "Path selection state", descriptor),
    resource!(0x0BB7, "Name of clipping path", raw),
    resource!(0x0BB8, "Origin path info", descriptor),
    resource!(0x1B58, "Image Ready variables", raw),
    resource!(0x1B59, "Image Ready data sets", raw),
    resource!(0x1B5A, "Image Ready default selected state", raw),
    resource!(0x1B5B, "Image Ready 7 rollover expanded state", raw),
    resource!(0x1B5C, "Image Ready rollover expanded state", raw),
    resource!(0x1B5D, "Image Ready save layer settings", raw),
    resource!(0x1B5E, "Image Ready version", raw),
    resource!(0x1F40, "Lightroom workflow", raw),
    resource!(0x2710, "Print flags information", print_flags_information)
];

/// Decoders for every image resource id the reader understands
pub(crate) static RESOURCES: Registry<u16, ResourceDecoder> =
    Registry::new("image resource", RESOURCE_DECODERS);

/// Parse the image resources section, the reader must be positioned
/// at its length field
pub(crate) fn parse_image_resources(
    stream: &mut PsdReader, ctx: &Context
) -> Result<ImageResources, PSDDecodeErrors> {
    let range = stream.read_block(LengthWidth::U32)?;
    let mut section = stream.sub_reader(range);
    let mut blocks = Vec::new();

    while section.remaining()? > 0 {
        blocks.push(parse_resource_block(&mut section, ctx)?);
    }
    trace!("Image resources: {} blocks in {} bytes", blocks.len(), range.len);

    Ok(ImageResources { range, blocks })
}

fn parse_resource_block(
    section: &mut PsdReader, ctx: &Context
) -> Result<ImageResourceBlock, PSDDecodeErrors> {
    let start = section.position()?;

    let signature = section.get_fourcc()?;

    if !RESOURCE_SIGNATURES.contains(&signature) {
        return Err(PSDDecodeErrors::SignatureMismatch {
            expected: &RESOURCE_SIGNATURES[0],
            found:    signature
        });
    }
    let id = section.get_u16()?;
    let name = section.read_pascal_string()?;
    section.pad_to(2, start)?;

    let data = section.read_block(LengthWidth::U32)?;
    section.pad_to(2, start)?;

    let content = decode_resource(section, ctx, id, data)?;

    Ok(ImageResourceBlock {
        signature,
        id,
        name,
        data,
        content
    })
}

fn decode_resource(
    section: &PsdReader, ctx: &Context, id: u16, data: ByteRange
) -> Result<ResourceData, PSDDecodeErrors> {
    if let Some(entry) = RESOURCES.get(id) {
        debug!("Image resource {:#06X} ({}), {} bytes", id, entry.name, data.len);

        return section.parse_range(data, |block| (entry.decode)(block, ctx));
    }

    if PLUGIN_RESOURCES.contains(&id) {
        debug!("Plug-in resource {:#06X}, {} bytes", id, data.len);
        return Ok(ResourceData::Plugin(data));
    }

    if PATH_RESOURCES.contains(&id) {
        if data.len % PATH_RECORD_SIZE == 0 {
            debug!("Saved path {:#06X}, {} records", id, data.len / PATH_RECORD_SIZE);
            return section.parse_range(data, |block| {
                Ok(ResourceData::Path(PathRecord::parse_all(block)?))
            });
        }
        warn!(
            "Saved path {:#06X} is {} bytes, not a whole number of records, keeping it raw",
            id, data.len
        );
        return Ok(ResourceData::Raw(data));
    }

    warn!("Unknown image resource {:#06X}, keeping {} bytes raw", id, data.len);

    Ok(ResourceData::Unknown(data))
}

fn raw(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::Raw(reader.take_rest()?))
}

fn descriptor(reader: &mut PsdReader, ctx: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::Descriptor(VersionedDescriptor::parse(
        reader, ctx
    )?))
}

fn resolution_info(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::ResolutionInfo(ResolutionInfo {
        horizontal:      fixed_16_16(reader.get_u32()?),
        horizontal_unit: ResolutionUnit::read(reader)?,
        width_unit:      DimensionUnit::read(reader)?,
        vertical:        fixed_16_16(reader.get_u32()?),
        vertical_unit:   ResolutionUnit::read(reader)?,
        height_unit:     DimensionUnit::read(reader)?
    }))
}

fn alpha_channel_names(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let mut names = Vec::new();

    while reader.remaining()? > 0 {
        names.push(reader.read_pascal_string()?);
    }
    Ok(ResourceData::AlphaChannelNames(names))
}

fn unicode_alpha_names(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let mut names = Vec::new();

    while reader.remaining()? > 0 {
        names.push(reader.read_unicode_string()?);
    }
    Ok(ResourceData::UnicodeAlphaNames(names))
}

fn caption(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::Caption(reader.read_pascal_string()?))
}

fn border_information(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::BorderInformation(BorderInformation {
        width: fixed_16_16(reader.get_u32()?),
        unit:  reader.get_u16()?
    }))
}

fn background_color(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::BackgroundColor(Color::parse(reader)?))
}

fn layer_state(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::LayerState(reader.get_u16()?))
}

fn working_path(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    let records = PathRecord::parse_all(reader)?;
    reader.finish_aligned()?;

    Ok(ResourceData::WorkingPath(records))
}

fn layer_groups(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    let count = reader.remaining()? / 2;
    let groups = (0..count)
        .map(|_| reader.get_u16())
        .collect::<Result<Vec<u16>, PSDDecodeErrors>>()?;

    Ok(ResourceData::LayerGroups(groups))
}

fn flag(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::Flag(reader.get_bool()?))
}

fn thumbnail(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    let format = match reader.get_u32()? {
        0 => ThumbnailFormat::RawRgb,
        1 => ThumbnailFormat::Jpeg,
        value => {
            return Err(PSDDecodeErrors::UnsupportedVariant {
                kind:  "thumbnail format",
                value: u64::from(value)
            })
        }
    };
    let width = reader.get_u32()?;
    let height = reader.get_u32()?;
    let width_bytes = reader.get_u32()?;
    let total_size = reader.get_u32()?;
    let compressed_size = reader.get_u32()?;

    let bits_per_pixel = reader.get_u16()?;
    let planes = reader.get_u16()?;

    if bits_per_pixel != 24 || planes != 1 {
        return Err(PSDDecodeErrors::Generic(
            "Thumbnail must have 24 bits per pixel in one plane"
        ));
    }
    let data = reader.take(compressed_size as usize)?;

    Ok(ResourceData::Thumbnail(Thumbnail {
        format,
        width,
        height,
        width_bytes,
        total_size,
        compressed_size,
        data
    }))
}

fn global_angle(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::GlobalAngle(reader.get_i32()?))
}

fn global_altitude(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::GlobalAltitude(reader.get_i32()?))
}

fn icc_profile(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::IccProfile(reader.take_rest()?))
}

fn document_id_seed(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::DocumentIdSeed(reader.get_u32()?))
}

fn indexed_color_count(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::IndexedColorCount(reader.get_u16()?))
}

fn transparency_index(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::TransparencyIndex(reader.get_u16()?))
}

/// Text filling the whole block
fn url(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    let length = reader.remaining()?;
    let mut text = reader.read_ascii(length)?;

    while text.ends_with('\0') {
        text.pop();
    }
    Ok(ResourceData::Url(text))
}

fn workflow_url(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::WorkflowUrl(reader.read_unicode_string()?))
}

/// A bare run of four byte identifiers filling the block, there is no
/// count in front of them
fn alpha_identifiers(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let remaining = reader.remaining()?;

    if remaining % 4 != 0 {
        return Err(PSDDecodeErrors::LengthMismatch {
            declared: remaining,
            consumed: remaining - remaining % 4
        });
    }
    let identifiers = (0..remaining / 4)
        .map(|_| reader.get_u32())
        .collect::<Result<Vec<u32>, PSDDecodeErrors>>()?;

    Ok(ResourceData::AlphaIdentifiers(identifiers))
}

fn version_info(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::VersionInfo(VersionInfo {
        version:              reader.get_u32()?,
        has_real_merged_data: reader.get_bool()?,
        writer:               reader.read_unicode_string()?,
        reader:               reader.read_unicode_string()?,
        file_version:         reader.get_u32()?
    }))
}

fn xmp(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::Xmp(reader.take_rest()?))
}

fn caption_digest(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    let mut digest = [0; 16];
    digest.copy_from_slice(reader.take_bytes(16)?);

    Ok(ResourceData::CaptionDigest(digest))
}

fn print_scale(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::PrintScale(PrintScale {
        style: reader.get_u16()?,
        x:     reader.get_f32()?,
        y:     reader.get_f32()?,
        scale: reader.get_f32()?
    }))
}

fn pixel_aspect_ratio(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let version = reader.get_u32()?;

    if version != 1 && version != 2 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "pixel aspect ratio version",
            value: u64::from(version)
        });
    }
    Ok(ResourceData::PixelAspectRatio(PixelAspectRatio {
        version,
        ratio: reader.get_f64()?
    }))
}

fn layer_selection_ids(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let count = usize::from(reader.get_u16()?);
    let count = reader.bounded_count(count, 4)?;

    let ids = (0..count)
        .map(|_| reader.get_u32())
        .collect::<Result<Vec<u32>, PSDDecodeErrors>>()?;

    Ok(ResourceData::LayerSelectionIds(ids))
}

fn layer_groups_enabled(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let count = reader.remaining()?;
    let enabled = reader.take_bytes(count)?.iter().map(|&b| b != 0).collect();

    Ok(ResourceData::LayerGroupsEnabled(enabled))
}

fn auto_save(reader: &mut PsdReader, _: &Context) -> Result<ResourceData, PSDDecodeErrors> {
    Ok(ResourceData::AutoSave(reader.read_unicode_string()?))
}

fn print_flags_information(
    reader: &mut PsdReader, _: &Context
) -> Result<ResourceData, PSDDecodeErrors> {
    let version = reader.get_u16()?;

    if version != 1 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "print flags version",
            value: u64::from(version)
        });
    }
    let center_crop_marks = reader.get_bool()?;
    // reserved
    reader.skip(1)?;

    Ok(ResourceData::PrintFlagsInformation(PrintFlagsInformation {
        version,
        center_crop_marks,
        bleed_width: reader.get_u32()?,
        bleed_scale: reader.get_u16()?
    }))
}
