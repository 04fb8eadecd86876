/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Block framing over the document buffer
//!
//! Every section of a PSD is a length prefixed block nested inside
//! another one. [`PsdReader`] is a window over the shared document
//! buffer that knows where it starts, so the blocks it hands out can be
//! stored as plain [`ByteRange`]s and resolved later, and so padding
//! can be computed from the start of the enclosing block.
use alloc::string::String;
use alloc::vec::Vec;

use zune_core::bytestream::{ZCursor, ZReader};

use crate::errors::PSDDecodeErrors;
use crate::header::FileVersion;
use crate::options::PsdOptions;

/// Location of a payload inside the document buffer.
///
/// Ranges are resolved through [`PsdDocument::bytes`](crate::PsdDocument::bytes)
/// so parsed structures never copy pixel or metadata payloads.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ByteRange {
    pub offset: usize,
    pub len:    usize
}

impl ByteRange {
    pub const fn new(offset: usize, len: usize) -> ByteRange {
        ByteRange { offset, len }
    }

    /// One past the last byte, `None` if that overflows
    pub const fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the bytes this range covers in `buffer` or `None`
    /// if the range does not fit
    pub fn slice<'a>(&self, buffer: &'a [u8]) -> Option<&'a [u8]> {
        self.end().and_then(|end| buffer.get(self.offset..end))
    }
}

/// Width of a length field
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LengthWidth {
    U32,
    U64
}

impl LengthWidth {
    pub const fn size(self) -> usize {
        match self {
            LengthWidth::U32 => 4,
            LengthWidth::U64 => 8
        }
    }
}

/// State shared by every decoder while a document is read
#[derive(Debug, Copy, Clone)]
pub(crate) struct Context {
    pub version: FileVersion,
    pub options: PsdOptions,
    /// Set while reading layers stored inside a layer information block
    pub nested:  bool
}

impl Context {
    pub const fn new(version: FileVersion, options: PsdOptions) -> Context {
        Context {
            version,
            options,
            nested: false
        }
    }

    pub const fn nested(self) -> Context {
        Context {
            nested: true,
            ..self
        }
    }

    pub const fn length_width(&self) -> LengthWidth {
        self.version.length_width()
    }
}

/// A bounded reader over one block of the document buffer
pub(crate) struct PsdReader<'a> {
    buffer: &'a [u8],
    window: ByteRange,
    stream: ZReader<ZCursor<&'a [u8]>>
}

impl<'a> PsdReader<'a> {
    pub fn new(buffer: &'a [u8]) -> PsdReader<'a> {
        PsdReader::with_window(buffer, ByteRange::new(0, buffer.len()))
    }

    fn with_window(buffer: &'a [u8], window: ByteRange) -> PsdReader<'a> {
        let end = window.end().unwrap_or(usize::MAX).min(buffer.len());
        let start = window.offset.min(end);
        let bytes = buffer.get(start..end).unwrap_or(&[]);

        PsdReader {
            buffer,
            window: ByteRange::new(start, end - start),
            stream: ZReader::new(ZCursor::new(bytes))
        }
    }

    /// A reader limited to `range`, which must have been handed out
    /// by a reader over the same buffer
    pub fn sub_reader(&self, range: ByteRange) -> PsdReader<'a> {
        PsdReader::with_window(self.buffer, range)
    }

    /// Position relative to the start of this block
    pub fn position(&mut self) -> Result<usize, PSDDecodeErrors> {
        Ok(self.stream.position()? as usize)
    }

    pub fn absolute_position(&mut self) -> Result<usize, PSDDecodeErrors> {
        Ok(self.window.offset + self.position()?)
    }

    pub fn remaining(&mut self) -> Result<usize, PSDDecodeErrors> {
        Ok(self.window.len.saturating_sub(self.position()?))
    }

    pub fn ensure(&mut self, needed: usize) -> Result<(), PSDDecodeErrors> {
        let remaining = self.remaining()?;

        if needed > remaining {
            return Err(PSDDecodeErrors::InsufficientBytes { needed, remaining });
        }
        Ok(())
    }

    pub fn skip(&mut self, num: usize) -> Result<(), PSDDecodeErrors> {
        self.ensure(num)?;
        self.stream.skip(num)?;
        Ok(())
    }

    pub fn get_u8(&mut self) -> Result<u8, PSDDecodeErrors> {
        self.ensure(1)?;
        Ok(self.stream.read_u8_err()?)
    }

    pub fn get_bool(&mut self) -> Result<bool, PSDDecodeErrors> {
        Ok(self.get_u8()? != 0)
    }

    pub fn get_u16(&mut self) -> Result<u16, PSDDecodeErrors> {
        self.ensure(2)?;
        Ok(self.stream.get_u16_be_err()?)
    }

    pub fn get_i16(&mut self) -> Result<i16, PSDDecodeErrors> {
        Ok(self.get_u16()? as i16)
    }

    pub fn get_u32(&mut self) -> Result<u32, PSDDecodeErrors> {
        self.ensure(4)?;
        Ok(self.stream.get_u32_be_err()?)
    }

    pub fn get_i32(&mut self) -> Result<i32, PSDDecodeErrors> {
        Ok(self.get_u32()? as i32)
    }

    pub fn get_u64(&mut self) -> Result<u64, PSDDecodeErrors> {
        self.ensure(8)?;
        Ok(self.stream.get_u64_be_err()?)
    }

    pub fn get_i64(&mut self) -> Result<i64, PSDDecodeErrors> {
        Ok(self.get_u64()? as i64)
    }

    pub fn get_f32(&mut self) -> Result<f32, PSDDecodeErrors> {
        Ok(f32::from_bits(self.get_u32()?))
    }

    pub fn get_f64(&mut self) -> Result<f64, PSDDecodeErrors> {
        Ok(f64::from_bits(self.get_u64()?))
    }

    /// Read a four character code
    pub fn get_fourcc(&mut self) -> Result<[u8; 4], PSDDecodeErrors> {
        self.ensure(4)?;
        Ok(self.stream.read_fixed_bytes_or_error::<4>()?)
    }

    /// Read a four character code and make sure it is `expected`
    pub fn expect_signature(&mut self, expected: &'static [u8; 4]) -> Result<(), PSDDecodeErrors> {
        let found = self.get_fourcc()?;

        if &found != expected {
            return Err(PSDDecodeErrors::SignatureMismatch { expected, found });
        }
        Ok(())
    }

    /// Step over `num` bytes, returning where they live in the document
    pub fn take(&mut self, num: usize) -> Result<ByteRange, PSDDecodeErrors> {
        self.ensure(num)?;
        let offset = self.absolute_position()?;
        self.stream.skip(num)?;

        Ok(ByteRange::new(offset, num))
    }

    /// Step over everything left in this block
    pub fn take_rest(&mut self) -> Result<ByteRange, PSDDecodeErrors> {
        let remaining = self.remaining()?;
        self.take(remaining)
    }

    pub fn take_bytes(&mut self, num: usize) -> Result<&'a [u8], PSDDecodeErrors> {
        let range = self.take(num)?;

        range
            .slice(self.buffer)
            .ok_or(PSDDecodeErrors::Generic("Block lies outside the document buffer"))
    }

    /// Read a length field of the given width
    pub fn read_length(&mut self, width: LengthWidth) -> Result<usize, PSDDecodeErrors> {
        let length = match width {
            LengthWidth::U32 => u64::from(self.get_u32()?),
            LengthWidth::U64 => self.get_u64()?
        };

        usize::try_from(length).map_err(|_| PSDDecodeErrors::InsufficientBytes {
            needed:    usize::MAX,
            remaining: self.window.len
        })
    }

    /// Read a length prefixed block, returning its payload.
    ///
    /// Fails if the declared length runs past the end of this block.
    pub fn read_block(&mut self, width: LengthWidth) -> Result<ByteRange, PSDDecodeErrors> {
        let length = self.read_length(width)?;
        self.take(length)
    }

    /// Run `func` over `range`, then confirm it consumed the range exactly
    pub fn parse_range<T, F>(&self, range: ByteRange, func: F) -> Result<T, PSDDecodeErrors>
    where
        F: FnOnce(&mut PsdReader<'a>) -> Result<T, PSDDecodeErrors>
    {
        let mut block = self.sub_reader(range);
        let value = func(&mut block)?;
        block.expect_exhausted()?;

        Ok(value)
    }

    /// Read a length prefixed block and parse it with `func`,
    /// the block must be consumed exactly
    pub fn parse_block<T, F>(&mut self, width: LengthWidth, func: F) -> Result<T, PSDDecodeErrors>
    where
        F: FnOnce(&mut PsdReader<'a>) -> Result<T, PSDDecodeErrors>
    {
        let range = self.read_block(width)?;
        self.parse_range(range, func)
    }

    /// Skip to the next multiple of `alignment` counted from `start`,
    /// a position previously returned by [`PsdReader::position`]
    pub fn pad_to(&mut self, alignment: usize, start: usize) -> Result<(), PSDDecodeErrors> {
        let consumed = self.position()?.saturating_sub(start);
        let padding = (alignment - consumed % alignment) % alignment;

        self.skip(padding)
    }

    /// Confirm every byte of this block was consumed
    pub fn expect_exhausted(&mut self) -> Result<(), PSDDecodeErrors> {
        let consumed = self.position()?;

        if consumed != self.window.len {
            return Err(PSDDecodeErrors::LengthMismatch {
                declared: self.window.len,
                consumed
            });
        }
        Ok(())
    }

    /// Like [`PsdReader::expect_exhausted`] but tolerates up to three
    /// trailing bytes of four byte alignment padding
    ///
    /// The padding bytes are skipped without looking at them, writers
    /// are not consistent about zeroing them.
    pub fn finish_aligned(&mut self) -> Result<(), PSDDecodeErrors> {
        let remaining = self.remaining()?;

        if (1..4).contains(&remaining) {
            self.skip(remaining)?;
        }
        self.expect_exhausted()
    }

    /// Check that `count` elements of at least `min_size` bytes each can
    /// fit in what is left of this block before anything is allocated
    pub fn bounded_count(&mut self, count: usize, min_size: usize) -> Result<usize, PSDDecodeErrors> {
        let remaining = self.remaining()?;
        let needed = count.saturating_mul(min_size);

        if needed > remaining {
            return Err(PSDDecodeErrors::InsufficientBytes { needed, remaining });
        }
        Ok(count)
    }

    /// A one byte length followed by that many single byte characters
    pub fn read_pascal_string(&mut self) -> Result<String, PSDDecodeErrors> {
        let length = usize::from(self.get_u8()?);
        self.read_ascii(length)
    }

    pub fn read_ascii(&mut self, length: usize) -> Result<String, PSDDecodeErrors> {
        let bytes = self.take_bytes(length)?;

        Ok(bytes.iter().map(|&c| char::from(c)).collect())
    }

    /// A four byte count of UTF-16 code units followed by the units,
    /// trailing NULs are dropped
    pub fn read_unicode_string(&mut self) -> Result<String, PSDDecodeErrors> {
        let count = self.get_u32()? as usize;
        let bytes = self.take_bytes(count.saturating_mul(2))?;

        let mut units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        while units.last() == Some(&0) {
            units.pop();
        }
        Ok(String::from_utf16_lossy(&units))
    }
}
