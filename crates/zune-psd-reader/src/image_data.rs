/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Merged image data
//!
//! The last section of the document, the flattened image stored
//! planar: every row of the first channel, then every row of the
//! second and so on. RLE data carries one scanline count per row of
//! every channel.
use alloc::vec::Vec;

use log::trace;
use zune_core::colorspace::ColorSpace;

use crate::channel::{decompress_rows, read_compression};
use crate::constants::{ColorModes, CompressionMethod};
use crate::errors::PSDDecodeErrors;
use crate::header::PsdHeader;
use crate::reader::{ByteRange, PsdReader};

/// The merged image section
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageData {
    pub compression: CompressionMethod,
    /// Everything after the compression tag up to the end of the document
    pub data:        ByteRange
}

impl ImageData {
    pub(crate) fn parse(stream: &mut PsdReader) -> Result<ImageData, PSDDecodeErrors> {
        let compression = read_compression(stream)?;
        let data = stream.take_rest()?;

        trace!("Image data: {:?}, {} bytes", compression, data.len);

        Ok(ImageData { compression, data })
    }

    /// Decompress into planar bytes, one plane per header channel.
    ///
    /// `buffer` is the document the section was read from.
    pub fn decompress(&self, buffer: &[u8], header: &PsdHeader) -> Result<Vec<u8>, PSDDecodeErrors> {
        let rows = usize::from(header.channels).saturating_mul(header.height);

        decompress_rows(buffer, self.data, self.compression, rows, header.version)
    }
}

/// Interleaved pixels of the merged image
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    /// Sixteen bit samples converted to native endian
    U16(Vec<u16>)
}

impl PixelData {
    pub fn u8(&self) -> Option<&[u8]> {
        match self {
            PixelData::U8(data) => Some(data),
            PixelData::U16(_) => None
        }
    }

    pub fn u16(&self) -> Option<&[u16]> {
        match self {
            PixelData::U16(data) => Some(data),
            PixelData::U8(_) => None
        }
    }
}

/// Colorspace of the merged image if it maps to one
///
/// Grayscale documents may carry extra channels, only the first
/// two are used. RGB uses three or four channels and CMYK four.
pub fn colorspace(header: &PsdHeader) -> Option<ColorSpace> {
    match (header.color_mode, header.channels) {
        (ColorModes::RGB, 3) => Some(ColorSpace::RGB),
        (ColorModes::RGB, c) if c >= 4 => Some(ColorSpace::RGBA),
        (ColorModes::Grayscale, 1) => Some(ColorSpace::Luma),
        (ColorModes::Grayscale, c) if c >= 2 => Some(ColorSpace::LumaA),
        (ColorModes::CMYK, c) if c >= 4 => Some(ColorSpace::CMYK),
        _ => None
    }
}

/// Interleave the planes returned by [`ImageData::decompress`]
pub(crate) fn interleave(
    planes: &[u8], header: &PsdHeader, colorspace: ColorSpace
) -> Result<PixelData, PSDDecodeErrors> {
    let components = colorspace.num_components();
    let pixels = header.width * header.height;

    let sample_size = match header.depth {
        8 => 1,
        16 => 2,
        _ => {
            return Err(PSDDecodeErrors::Generic(
                "Only 8 and 16 bit documents can be converted to pixels"
            ))
        }
    };
    let plane_size = pixels * sample_size;
    let needed = plane_size * components;

    if planes.len() < needed {
        return Err(PSDDecodeErrors::InsufficientBytes {
            needed,
            remaining: planes.len()
        });
    }

    if sample_size == 1 {
        let mut out = alloc::vec![0_u8; needed];

        for (channel, plane) in planes.chunks_exact(plane_size).take(components).enumerate() {
            for (out, value) in out[channel..].iter_mut().step_by(components).zip(plane) {
                *out = *value;
            }
        }
        return Ok(PixelData::U8(out));
    }

    let mut out = alloc::vec![0_u16; pixels * components];

    for (channel, plane) in planes.chunks_exact(plane_size).take(components).enumerate() {
        let samples = plane
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]));

        for (out, value) in out[channel..].iter_mut().step_by(components).zip(samples) {
            *out = value;
        }
    }
    Ok(PixelData::U16(out))
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use zune_core::colorspace::ColorSpace;

    use crate::constants::ColorModes;
    use crate::header::{FileVersion, PsdHeader};
    use crate::image_data::{colorspace, interleave, PixelData};

    fn header(color_mode: ColorModes, channels: u16, depth: u16) -> PsdHeader {
        PsdHeader {
            version: FileVersion::Psd,
            channels,
            height: 1,
            width: 2,
            depth,
            color_mode
        }
    }

    #[test]
    fn colorspace_follows_mode_and_channels() {
        assert_eq!(colorspace(&header(ColorModes::RGB, 3, 8)), Some(ColorSpace::RGB));
        assert_eq!(colorspace(&header(ColorModes::RGB, 5, 8)), Some(ColorSpace::RGBA));
        assert_eq!(colorspace(&header(ColorModes::Grayscale, 3, 8)), Some(ColorSpace::LumaA));
        assert_eq!(colorspace(&header(ColorModes::CMYK, 4, 8)), Some(ColorSpace::CMYK));
        assert_eq!(colorspace(&header(ColorModes::LabColor, 3, 8)), None);
    }

    #[test]
    fn planes_are_interleaved() {
        let planes = [1, 2, 10, 20, 100, 200];
        let header = header(ColorModes::RGB, 3, 8);

        let pixels = interleave(&planes, &header, ColorSpace::RGB).unwrap();
        assert_eq!(pixels, PixelData::U8(vec![1, 10, 100, 2, 20, 200]));
    }

    #[test]
    fn sixteen_bit_planes_are_big_endian() {
        let planes = [0x01, 0x02, 0x03, 0x04, 0xFF, 0x00, 0x00, 0xFF];
        let header = header(ColorModes::Grayscale, 2, 16);

        let pixels = interleave(&planes, &header, ColorSpace::LumaA).unwrap();
        assert_eq!(pixels.u16().unwrap(), [0x0102, 0xFF00, 0x0304, 0x00FF]);
    }

    #[test]
    fn short_planes_are_rejected() {
        let header = header(ColorModes::RGB, 3, 8);
        assert!(interleave(&[0; 5], &header, ColorSpace::RGB).is_err());
    }
}
