/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Document assembly
//!
//! A document is five sections in a fixed order, header, color mode
//! data, image resources, layer and mask information and the merged
//! image data. The header version decides the width of most length
//! fields that follow it.
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use log::trace;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;

use crate::errors::PSDDecodeErrors;
use crate::header::PsdHeader;
use crate::image_data::{colorspace, interleave, ImageData, PixelData};
use crate::layers::{Layer, LayerAndMaskInformation};
use crate::options::PsdOptions;
use crate::reader::{ByteRange, Context, LengthWidth, PsdReader};
use crate::resources::{parse_image_resources, ImageResources};

/// A Photoshop PSD/PSB reader.
///
/// The decoder walks the whole document once and returns a
/// [`PsdDocument`], the structure refers back into the input by
/// [`ByteRange`]s instead of copying payloads.
///
/// # Example
/// ```no_run
/// use zune_psd_reader::PSDDecoder;
/// use zune_psd_reader::errors::PSDDecodeErrors;
///
/// fn main() -> Result<(), PSDDecodeErrors> {
///     let data = std::fs::read("image.psd").unwrap();
///     let document = PSDDecoder::new(data).decode()?;
///
///     for layer in document.layers() {
///         println!("{}", layer.name());
///     }
///     Ok(())
/// }
/// ```
pub struct PSDDecoder<T>
where
    T: AsRef<[u8]>
{
    data:    T,
    options: PsdOptions,
    header:  Option<PsdHeader>
}

impl<T> PSDDecoder<T>
where
    T: AsRef<[u8]>
{
    /// Create a new decoder that reads a photoshop document from `data`
    pub fn new(data: T) -> PSDDecoder<T> {
        Self::new_with_psd_options(data, PsdOptions::default())
    }

    /// Creates a new decoder with options that influence decoding routines
    ///
    /// The dimension limits and strict mode of `options` are used as is,
    /// photoshop specific options take their defaults.
    ///
    /// # Arguments
    /// - data: Data source
    /// - options: Custom options for the decoder
    pub fn new_with_options(data: T, options: DecoderOptions) -> PSDDecoder<T> {
        Self::new_with_psd_options(data, PsdOptions::new(options))
    }

    /// Creates a new decoder with photoshop specific options
    pub fn new_with_psd_options(data: T, options: PsdOptions) -> PSDDecoder<T> {
        PSDDecoder {
            data,
            options,
            header: None
        }
    }

    /// Decode the fixed size file header
    ///
    /// This confirms whether the data is a photoshop document and
    /// extracts the version, dimensions, depth and color mode.
    pub fn decode_headers(&mut self) -> Result<(), PSDDecodeErrors> {
        if self.header.is_some() {
            return Ok(());
        }
        let mut stream = PsdReader::new(self.data.as_ref());

        self.header = Some(PsdHeader::parse(&mut stream, &self.options)?);

        Ok(())
    }

    /// The file header, or None if headers haven't been decoded
    pub const fn header(&self) -> Option<&PsdHeader> {
        self.header.as_ref()
    }

    /// Get image width and height respectively or None if the
    /// headers haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.map(|header| (header.width, header.height))
    }

    /// Get the colorspace of the merged image or None if the headers
    /// haven't been decoded or the color mode has no equivalent
    pub fn colorspace(&self) -> Option<ColorSpace> {
        self.header.as_ref().and_then(colorspace)
    }

    pub const fn options(&self) -> &PsdOptions {
        &self.options
    }

    /// Decode the whole document
    ///
    /// Either every section is read and the returned document is
    /// complete, or the first problem found is returned.
    pub fn decode(self) -> Result<PsdDocument<T>, PSDDecodeErrors> {
        let buffer = self.data.as_ref();
        let mut stream = PsdReader::new(buffer);

        let header = PsdHeader::parse(&mut stream, &self.options)?;
        let ctx = Context::new(header.version, self.options);

        let color_mode_data = stream.read_block(LengthWidth::U32)?;
        trace!("Color mode data: {} bytes", color_mode_data.len);

        let image_resources = parse_image_resources(&mut stream, &ctx)?;
        let layer_and_mask = LayerAndMaskInformation::parse(&mut stream, &ctx)?;
        let image_data = ImageData::parse(&mut stream)?;

        Ok(PsdDocument {
            data: self.data,
            header,
            color_mode_data,
            image_resources,
            layer_and_mask,
            image_data
        })
    }
}

/// A fully read document
///
/// Owns the input it was decoded from, every [`ByteRange`] in the
/// tree indexes into it, see [`PsdDocument::bytes`].
pub struct PsdDocument<T>
where
    T: AsRef<[u8]>
{
    data:            T,
    header:          PsdHeader,
    color_mode_data: ByteRange,
    image_resources: ImageResources,
    layer_and_mask:  LayerAndMaskInformation,
    image_data:      ImageData
}

impl<T> Debug for PsdDocument<T>
where
    T: AsRef<[u8]>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PsdDocument")
            .field("len", &self.data.as_ref().len())
            .field("header", &self.header)
            .field("color_mode_data", &self.color_mode_data)
            .field("image_resources", &self.image_resources)
            .field("layer_and_mask", &self.layer_and_mask)
            .field("image_data", &self.image_data)
            .finish()
    }
}

impl<T> PsdDocument<T>
where
    T: AsRef<[u8]>
{
    pub const fn header(&self) -> &PsdHeader {
        &self.header
    }

    /// Palette for indexed documents or duotone specification,
    /// empty for other color modes
    pub const fn color_mode_data(&self) -> ByteRange {
        self.color_mode_data
    }

    pub const fn image_resources(&self) -> &ImageResources {
        &self.image_resources
    }

    pub const fn layer_and_mask(&self) -> &LayerAndMaskInformation {
        &self.layer_and_mask
    }

    pub const fn image_data(&self) -> &ImageData {
        &self.image_data
    }

    /// Bytes covered by `range`, empty if the range does not lie
    /// inside the document
    pub fn bytes(&self, range: ByteRange) -> &[u8] {
        range.slice(self.data.as_ref()).unwrap_or(&[])
    }

    pub fn layers(&self) -> &[Layer] {
        self.layer_and_mask.layers()
    }

    pub fn colorspace(&self) -> Option<ColorSpace> {
        colorspace(&self.header)
    }

    /// Decompress and interleave the merged image
    ///
    /// Only 8 and 16 bit documents in a color mode with a
    /// [`ColorSpace`] equivalent can be converted.
    pub fn pixels(&self) -> Result<PixelData, PSDDecodeErrors> {
        let colorspace = self.colorspace().ok_or(PSDDecodeErrors::Generic(
            "Color mode has no pixel representation"
        ))?;
        let planes = self
            .image_data
            .decompress(self.data.as_ref(), &self.header)?;

        interleave(&planes, &self.header, colorspace)
    }

    /// Decompressed planar bytes of a layer channel
    pub fn channel_bytes(&self, layer: &Layer, id: i16) -> Result<Vec<u8>, PSDDecodeErrors> {
        let channel = layer
            .channel(id)
            .ok_or(PSDDecodeErrors::Generic("Layer has no channel with that id"))?;

        channel.decompress(self.data.as_ref())
    }

    /// Return the buffer the document was read from
    pub fn into_inner(self) -> T {
        self.data
    }
}
