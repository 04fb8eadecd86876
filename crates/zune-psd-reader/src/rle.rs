/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PackBits run length decoding
//!
//! Loop until the source is exhausted:
//! - Read the next source byte into n.
//! - If n is between 0 and 127 inclusive, copy the next n+1 bytes literally.
//! - Else if n is between -127 and -1 inclusive, copy the next byte -n+1 times.
//! - Else if n is -128, noop.
//!
//! Each scanline is compressed on its own, runs never cross rows.
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::errors::PSDDecodeErrors;

/// Decompress one scanline from `source`, appending the result to `dest`
pub fn decompress(source: &[u8], dest: &mut Vec<u8>) -> Result<(), PSDDecodeErrors> {
    let mut position = 0;

    while let Some(&control) = source.get(position) {
        position += 1;

        let mut len = usize::from(control);

        match len.cmp(&128) {
            Ordering::Less => {
                // copy next len+1 bytes literally
                len += 1;
                let literal = source
                    .get(position..position + len)
                    .ok_or(PSDDecodeErrors::BadRLE)?;

                dest.extend_from_slice(literal);
                position += len;
            }
            Ordering::Equal => (),
            Ordering::Greater => {
                // Next -len+1 bytes in the dest are replicated from next source byte.
                // (Interpret len as a negative 8-bit int.)
                len = 257_usize.wrapping_sub(len) & 255;

                let value = *source.get(position).ok_or(PSDDecodeErrors::BadRLE)?;
                position += 1;

                dest.resize(dest.len() + len, value);
            }
        }
    }
    Ok(())
}
