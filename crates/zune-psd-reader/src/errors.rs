/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::PSD_IDENTIFIER_BE;

/// Errors that can occur while reading a PSD/PSB document
///
/// Every variant except [`PSDDecodeErrors::UnsupportedCompression`]
/// means the document is corrupt, see [`PSDDecodeErrors::is_corrupted_format`]
#[non_exhaustive]
pub enum PSDDecodeErrors {
    /// The file does not start with `8BPS`
    WrongMagicBytes(u32),
    /// The header version is neither 1 (PSD) nor 2 (PSB)
    UnsupportedFileType(u16),
    /// Channel count outside `1..=56`
    UnsupportedChannelCount(u16),
    /// Bit depth other than 1, 8, 16 or 32
    UnsupportedBitDepth(u16),
    /// Color mode not defined by the format
    UnknownColorMode(u16),
    /// Dimensions larger than the format (or the caller) allows
    ///
    /// # Arguments
    /// - 1st argument is the maximum allowed
    /// - 2nd argument is the dimension found
    LargeDimensions(usize, usize),
    ZeroDimensions,
    /// Reserved header bytes that should be zero are not, only
    /// raised in strict mode
    NonZeroReserved([u8; 6]),
    /// A declared length, count or fixed size read runs past
    /// the end of the block enclosing it
    InsufficientBytes { needed: usize, remaining: usize },
    /// A block was not consumed exactly
    LengthMismatch { declared: usize, consumed: usize },
    /// A fixed four byte signature did not match
    SignatureMismatch {
        expected: &'static [u8; 4],
        found:    [u8; 4]
    },
    /// A four character code outside every known and fallback range
    UnknownTag { kind: &'static str, tag: [u8; 4] },
    /// A numeric discriminant outside every known range
    UnsupportedVariant { kind: &'static str, value: u64 },
    /// Compression the reader recognises but does not decompress (zip)
    UnsupportedCompression(u16),
    /// Descriptor nesting went deeper than the configured limit
    DescriptorTooDeep(usize),
    /// A run length stream reads past its source
    BadRLE,
    Generic(&'static str),
    IoErrors(ZByteIoError)
}

impl PSDDecodeErrors {
    /// Returns true if this error means the input is malformed.
    ///
    /// Only [`PSDDecodeErrors::UnsupportedCompression`] describes a
    /// valid document this crate can't fully handle.
    pub const fn is_corrupted_format(&self) -> bool {
        !matches!(self, PSDDecodeErrors::UnsupportedCompression(_))
    }
}

fn fourcc(tag: &[u8; 4]) -> &str {
    core::str::from_utf8(tag).unwrap_or("????")
}

impl Debug for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PSDDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            PSDDecodeErrors::WrongMagicBytes(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found  {:?}, not a PSD image",
                    PSD_IDENTIFIER_BE.to_be_bytes(),
                    bytes.to_be_bytes()
                )
            }
            PSDDecodeErrors::UnsupportedFileType(version) => {
                writeln!(
                    f,
                    "Unsupported file version {version:?}, known versions are 1 (PSD) and 2 (PSB)",
                )
            }
            PSDDecodeErrors::UnsupportedChannelCount(channels) => {
                writeln!(f, "Unsupported channel count {channels:?}, expected 1..=56")
            }
            PSDDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth:?}, supported depths are 1, 8, 16 and 32",
                )
            }
            PSDDecodeErrors::UnknownColorMode(mode) => {
                writeln!(f, "Unknown color mode {mode}")
            }
            PSDDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}",
                )
            }
            PSDDecodeErrors::ZeroDimensions => {
                writeln!(f, "Zero found where not expected")
            }
            PSDDecodeErrors::NonZeroReserved(bytes) => {
                writeln!(f, "Reserved header bytes should be zero, found {bytes:?}")
            }
            PSDDecodeErrors::InsufficientBytes { needed, remaining } => {
                writeln!(
                    f,
                    "Corrupted format, needed {needed} bytes but block has {remaining} left"
                )
            }
            PSDDecodeErrors::LengthMismatch { declared, consumed } => {
                writeln!(
                    f,
                    "Corrupted format, block declared {declared} bytes but {consumed} were consumed"
                )
            }
            PSDDecodeErrors::SignatureMismatch { expected, found } => {
                writeln!(
                    f,
                    "Corrupted format, expected signature {:?} but found {:?}",
                    fourcc(expected),
                    fourcc(found)
                )
            }
            PSDDecodeErrors::UnknownTag { kind, tag } => {
                writeln!(f, "Corrupted format, unknown {kind} {:?}", fourcc(tag))
            }
            PSDDecodeErrors::UnsupportedVariant { kind, value } => {
                writeln!(f, "Corrupted format, unknown {kind} {value}")
            }
            PSDDecodeErrors::UnsupportedCompression(method) => {
                writeln!(
                    f,
                    "Unsupported compression {method}, only raw (0) and RLE (1) can be decompressed"
                )
            }
            PSDDecodeErrors::DescriptorTooDeep(depth) => {
                writeln!(f, "Descriptor nesting depth {depth} exceeds the configured limit")
            }
            PSDDecodeErrors::BadRLE => {
                writeln!(f, "Bad RLE")
            }
            PSDDecodeErrors::IoErrors(e) => {
                writeln!(f, "I/O error :{:?}", e)
            }
        }
    }
}

impl Display for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PSDDecodeErrors {}

impl From<&'static str> for PSDDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for PSDDecodeErrors {
    fn from(r: ZByteIoError) -> Self {
        Self::IoErrors(r)
    }
}
