/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::{trace, warn};

use crate::constants::{
    ColorModes, MAX_CHANNELS, MAX_PSB_DIMENSIONS, MAX_PSD_DIMENSIONS, PSD_IDENTIFIER_BE
};
use crate::errors::PSDDecodeErrors;
use crate::options::PsdOptions;
use crate::reader::{LengthWidth, PsdReader};

/// Standard (PSD) or large document (PSB) layout
///
/// The version decides the width of nearly every later length field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FileVersion {
    Psd = 1,
    Psb = 2
}

impl FileVersion {
    pub fn from_int(int: u16) -> Option<FileVersion> {
        match int {
            1 => Some(FileVersion::Psd),
            2 => Some(FileVersion::Psb),
            _ => None
        }
    }

    pub const fn is_large(self) -> bool {
        matches!(self, FileVersion::Psb)
    }

    /// Width of section and channel lengths
    pub const fn length_width(self) -> LengthWidth {
        match self {
            FileVersion::Psd => LengthWidth::U32,
            FileVersion::Psb => LengthWidth::U64
        }
    }

    /// Size of one entry in an RLE scanline byte count table
    pub const fn scanline_count_size(self) -> usize {
        match self {
            FileVersion::Psd => 2,
            FileVersion::Psb => 4
        }
    }

    pub const fn max_dimensions(self) -> usize {
        match self {
            FileVersion::Psd => MAX_PSD_DIMENSIONS,
            FileVersion::Psb => MAX_PSB_DIMENSIONS
        }
    }
}

/// The fixed 26 byte file header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PsdHeader {
    pub version:    FileVersion,
    /// Number of channels in the merged image, including alpha
    pub channels:   u16,
    pub height:     usize,
    pub width:      usize,
    /// Bits per channel, one of 1, 8, 16 or 32
    pub depth:      u16,
    pub color_mode: ColorModes
}

impl PsdHeader {
    pub const SIZE: usize = 26;

    pub(crate) fn parse(
        stream: &mut PsdReader, options: &PsdOptions
    ) -> Result<PsdHeader, PSDDecodeErrors> {
        // Check identifier
        let magic = stream.get_u32()?;

        if magic != PSD_IDENTIFIER_BE {
            return Err(PSDDecodeErrors::WrongMagicBytes(magic));
        }

        //  file version
        let version = stream.get_u16()?;
        let version =
            FileVersion::from_int(version).ok_or(PSDDecodeErrors::UnsupportedFileType(version))?;

        let mut reserved = [0_u8; 6];
        reserved.copy_from_slice(stream.take_bytes(6)?);

        let limits = options.get_decoder_options();

        if reserved != [0; 6] {
            if limits.strict_mode() {
                return Err(PSDDecodeErrors::NonZeroReserved(reserved));
            }
            warn!("Reserved header bytes {:?} are not zero, ignoring", reserved);
        }
        // Read the number of channels (R, G, B, A, etc).
        let channels = stream.get_u16()?;

        if channels == 0 || channels > MAX_CHANNELS {
            return Err(PSDDecodeErrors::UnsupportedChannelCount(channels));
        }

        let height = stream.get_u32()? as usize;
        let width = stream.get_u32()? as usize;

        if width == 0 || height == 0 {
            return Err(PSDDecodeErrors::ZeroDimensions);
        }

        let max_width = limits.max_width().min(version.max_dimensions());
        let max_height = limits.max_height().min(version.max_dimensions());

        if width > max_width {
            return Err(PSDDecodeErrors::LargeDimensions(max_width, width));
        }

        if height > max_height {
            return Err(PSDDecodeErrors::LargeDimensions(max_height, height));
        }

        let depth = stream.get_u16()?;

        if !matches!(depth, 1 | 8 | 16 | 32) {
            return Err(PSDDecodeErrors::UnsupportedBitDepth(depth));
        }

        let color_mode = stream.get_u16()?;
        let color_mode =
            ColorModes::from_int(color_mode).ok_or(PSDDecodeErrors::UnknownColorMode(color_mode))?;

        trace!("File version: {:?}", version);
        trace!("Image width: {}", width);
        trace!("Image height: {}", height);
        trace!("Channels: {}", channels);
        trace!("Bit depth: {}", depth);
        trace!("Color mode: {:?}", color_mode);

        Ok(PsdHeader {
            version,
            channels,
            height,
            width,
            depth,
            color_mode
        })
    }

    /// Bytes needed to store one row of one channel
    pub const fn bytes_per_row(&self) -> usize {
        (self.width * self.depth as usize).div_ceil(8)
    }
}
