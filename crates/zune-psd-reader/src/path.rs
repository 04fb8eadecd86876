/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Saved path records
//!
//! Paths are a list of fixed size 26 byte records, a two byte selector
//! followed by 24 bytes whose meaning depends on the selector. Points are
//! stored as 8.24 fixed point fractions of the document size.
use alloc::vec::Vec;

use crate::constants::PATH_RECORD_SIZE;
use crate::errors::PSDDecodeErrors;
use crate::reader::PsdReader;

/// An 8.24 fixed point number
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Fixed8_24(pub i32);

impl Fixed8_24 {
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1_u32 << 24)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PathPoint {
    pub vertical:   Fixed8_24,
    pub horizontal: Fixed8_24
}

/// A bezier knot, the anchor and the control points on either side
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BezierKnot {
    pub preceding: PathPoint,
    pub anchor:    PathPoint,
    pub leaving:   PathPoint
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PathRecord {
    /// Selectors 0 and 3, starts a subpath of `knots` knots
    SubpathLength { closed: bool, knots: u16 },
    /// Selectors 1, 2, 4 and 5
    Knot {
        closed: bool,
        linked: bool,
        knot:   BezierKnot
    },
    /// Selector 6
    PathFillRule,
    /// Selector 7
    Clipboard {
        top:        Fixed8_24,
        left:       Fixed8_24,
        bottom:     Fixed8_24,
        right:      Fixed8_24,
        resolution: Fixed8_24
    },
    /// Selector 8
    InitialFillRule { fill_with_all_pixels: bool }
}

fn point(reader: &mut PsdReader) -> Result<PathPoint, PSDDecodeErrors> {
    Ok(PathPoint {
        vertical:   Fixed8_24(reader.get_i32()?),
        horizontal: Fixed8_24(reader.get_i32()?)
    })
}

impl PathRecord {
    pub(crate) fn parse(reader: &mut PsdReader) -> Result<PathRecord, PSDDecodeErrors> {
        let record = reader.take(PATH_RECORD_SIZE)?;

        reader.parse_range(record, |block| {
            let selector = block.get_u16()?;

            let parsed = match selector {
                0 | 3 => PathRecord::SubpathLength {
                    closed: selector == 0,
                    knots:  block.get_u16()?
                },
                1 | 2 | 4 | 5 => PathRecord::Knot {
                    closed: selector < 3,
                    linked: selector == 1 || selector == 4,
                    knot:   BezierKnot {
                        preceding: point(block)?,
                        anchor:    point(block)?,
                        leaving:   point(block)?
                    }
                },
                6 => PathRecord::PathFillRule,
                7 => PathRecord::Clipboard {
                    top:        Fixed8_24(block.get_i32()?),
                    left:       Fixed8_24(block.get_i32()?),
                    bottom:     Fixed8_24(block.get_i32()?),
                    right:      Fixed8_24(block.get_i32()?),
                    resolution: Fixed8_24(block.get_i32()?)
                },
                8 => PathRecord::InitialFillRule {
                    fill_with_all_pixels: block.get_u16()? != 0
                },
                _ => {
                    return Err(PSDDecodeErrors::UnsupportedVariant {
                        kind:  "path record selector",
                        value: u64::from(selector)
                    })
                }
            };
            // the rest of the record is filler
            let filler = block.remaining()?;
            block.skip(filler)?;

            Ok(parsed)
        })
    }

    /// Parse as many whole records as fit in `reader`
    pub(crate) fn parse_all(reader: &mut PsdReader) -> Result<Vec<PathRecord>, PSDDecodeErrors> {
        let count = reader.remaining()? / PATH_RECORD_SIZE;
        let mut records = Vec::with_capacity(count);

        for _ in 0..count {
            records.push(PathRecord::parse(reader)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::path::{Fixed8_24, PathRecord};
    use crate::reader::PsdReader;

    #[test]
    fn knot_record() {
        let mut data = vec![0, 1];
        for value in [1_i32 << 23, 1 << 24, -(1 << 24), 0, 3 << 22, 1] {
            data.extend_from_slice(&value.to_be_bytes());
        }
        let mut reader = PsdReader::new(&data);

        match PathRecord::parse(&mut reader).unwrap() {
            PathRecord::Knot { closed, linked, knot } => {
                assert!(closed && linked);
                assert_eq!(knot.preceding.vertical.to_f64(), 0.5);
                assert_eq!(knot.preceding.horizontal.to_f64(), 1.0);
                assert_eq!(knot.anchor.vertical, Fixed8_24(-(1 << 24)));
                assert_eq!(knot.leaving.vertical.to_f64(), 0.75);
            }
            other => panic!("Unexpected record {other:?}"),
        }
        reader.expect_exhausted().unwrap();
    }

    #[test]
    fn length_record_skips_filler() {
        let mut data = vec![0; 52];
        data[1] = 3;
        data[3] = 2;
        data[27] = 8;
        let mut reader = PsdReader::new(&data);

        let records = PathRecord::parse_all(&mut reader).unwrap();
        assert_eq!(
            records,
            [
                PathRecord::SubpathLength { closed: false, knots: 2 },
                PathRecord::InitialFillRule { fill_with_all_pixels: false }
            ]
        );
    }

    #[test]
    fn unknown_selector_is_corrupt() {
        let mut data = vec![0; 26];
        data[1] = 9;
        let mut reader = PsdReader::new(&data);

        assert!(PathRecord::parse(&mut reader).is_err());
    }
}
