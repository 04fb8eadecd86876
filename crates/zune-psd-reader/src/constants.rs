/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

use core::ops::RangeInclusive;

/// `8BPS`
pub const PSD_IDENTIFIER_BE: u32 = 0x38425053;

/// Signature used by image resources, blend modes and most layer information blocks
pub const SIGNATURE_8BIM: [u8; 4] = *b"8BIM";
/// Signature some layer information blocks use in large documents
pub const SIGNATURE_8B64: [u8; 4] = *b"8B64";

/// Signatures an image resource block may start with
pub const RESOURCE_SIGNATURES: [[u8; 4]; 5] = [*b"8BIM", *b"MeSa", *b"PHUT", *b"AgHg", *b"DCSR"];

/// Resource IDs reserved for plug-ins, captured without interpretation
pub const PLUGIN_RESOURCES: RangeInclusive<u16> = 0x0FA0..=0x1387;
/// Resource IDs holding saved paths
pub const PATH_RESOURCES: RangeInclusive<u16> = 0x07D0..=0x0BB6;

/// Size of one path record in bytes
pub const PATH_RECORD_SIZE: usize = 26;

pub const MAX_CHANNELS: u16 = 56;
pub const MAX_PSD_DIMENSIONS: usize = 30_000;
pub const MAX_PSB_DIMENSIONS: usize = 300_000;

/// Color modes a document may declare
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CMYK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CMYK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CMYK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }
}

/// Compression used by channel image data and the merged image
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1,
    Zip = 2,
    ZipPrediction = 3
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            2 => Some(Self::Zip),
            3 => Some(Self::ZipPrediction),
            _ => None
        }
    }

    pub const fn to_int(self) -> u16 {
        self as u16
    }
}
