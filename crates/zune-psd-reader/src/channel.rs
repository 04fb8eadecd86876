/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per channel pixel payloads
//!
//! Each layer lists its channels up front as `(id, length)` pairs, the
//! payloads follow all layer records. A payload is a two byte
//! compression tag followed by the image data. RLE data starts with a
//! table of compressed byte counts, one per row, each row is
//! compressed on its own.
use alloc::vec::Vec;

use log::trace;

use crate::constants::CompressionMethod;
use crate::errors::PSDDecodeErrors;
use crate::header::FileVersion;
use crate::reader::{ByteRange, Context, PsdReader};
use crate::rle;

/// Channel id of the transparency mask
pub const TRANSPARENCY_MASK: i16 = -1;
/// Channel id of the user supplied layer mask
pub const USER_MASK: i16 = -2;
/// Channel id of the real user mask, when both a user and a vector mask are present
pub const REAL_USER_MASK: i16 = -3;

/// An entry in a layer's channel table
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelRecord {
    /// 0, 1, 2... for color channels, negative ids for masks
    pub id:     i16,
    /// Length of the payload including the compression tag
    pub length: u64
}

impl ChannelRecord {
    /// Smallest possible record, a PSD id plus a 32 bit length
    pub(crate) const MIN_SIZE: usize = 6;

    pub(crate) fn parse(reader: &mut PsdReader, ctx: &Context) -> Result<ChannelRecord, PSDDecodeErrors> {
        let id = reader.get_i16()?;
        let length = match ctx.version {
            FileVersion::Psd => u64::from(reader.get_u32()?),
            FileVersion::Psb => reader.get_u64()?
        };

        Ok(ChannelRecord { id, length })
    }

    pub const fn is_mask(&self) -> bool {
        self.id < TRANSPARENCY_MASK
    }
}

/// Compressed byte count of every row of an RLE payload
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScanlineTable {
    pub counts: Vec<usize>
}

impl ScanlineTable {
    /// Read `rows` entries, two bytes each for PSD and four for PSB.
    ///
    /// Fails before allocating if the table itself would not fit.
    pub(crate) fn parse(
        reader: &mut PsdReader, rows: usize, version: FileVersion
    ) -> Result<ScanlineTable, PSDDecodeErrors> {
        let rows = reader.bounded_count(rows, version.scanline_count_size())?;
        let mut counts = Vec::with_capacity(rows);

        for _ in 0..rows {
            let count = match version {
                FileVersion::Psd => usize::from(reader.get_u16()?),
                FileVersion::Psb => reader.get_u32()? as usize
            };
            counts.push(count);
        }
        Ok(ScanlineTable { counts })
    }

    /// Sum of all row counts
    pub fn total(&self) -> usize {
        self.counts
            .iter()
            .fold(0_usize, |acc, count| acc.saturating_add(*count))
    }
}

/// The pixel payload of one layer channel
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelImageData {
    pub channel_id:  i16,
    pub compression: CompressionMethod,
    /// Payload following the compression tag
    pub data:        ByteRange,
    /// Rows covered by the channel, from the layer or mask rectangle
    pub rows:        usize,
    pub version:     FileVersion
}

impl ChannelImageData {
    /// Read the payload described by `record`, it must hold at least
    /// the compression tag
    pub(crate) fn parse(
        reader: &mut PsdReader, ctx: &Context, record: &ChannelRecord, rows: usize
    ) -> Result<ChannelImageData, PSDDecodeErrors> {
        let length = usize::try_from(record.length).unwrap_or(usize::MAX);

        if length < 2 {
            return Err(PSDDecodeErrors::InsufficientBytes {
                needed:    2,
                remaining: length
            });
        }
        let block = reader.take(length)?;

        reader.parse_range(block, |payload| {
            let compression = read_compression(payload)?;
            let data = payload.take_rest()?;

            trace!(
                "Channel {}: {:?}, {} bytes, {} rows",
                record.id,
                compression,
                data.len,
                rows
            );

            Ok(ChannelImageData {
                channel_id: record.id,
                compression,
                data,
                rows,
                version: ctx.version
            })
        })
    }

    /// Decompress this channel into its raw row bytes.
    ///
    /// `buffer` is the document the channel was read from.
    pub fn decompress(&self, buffer: &[u8]) -> Result<Vec<u8>, PSDDecodeErrors> {
        decompress_rows(buffer, self.data, self.compression, self.rows, self.version)
    }
}

/// Read a two byte compression tag
pub(crate) fn read_compression(reader: &mut PsdReader) -> Result<CompressionMethod, PSDDecodeErrors> {
    let tag = reader.get_u16()?;

    CompressionMethod::from_int(tag).ok_or(PSDDecodeErrors::UnsupportedVariant {
        kind:  "compression method",
        value: u64::from(tag)
    })
}

/// Decompress `rows` rows stored in `data`
///
/// Raw data is returned as is. RLE data must be covered exactly by its
/// scanline table. Zip compressed data is refused.
pub(crate) fn decompress_rows(
    buffer: &[u8], data: ByteRange, compression: CompressionMethod, rows: usize,
    version: FileVersion
) -> Result<Vec<u8>, PSDDecodeErrors> {
    let mut reader = PsdReader::new(buffer).sub_reader(data);

    match compression {
        CompressionMethod::NoCompression => {
            let length = reader.remaining()?;
            Ok(reader.take_bytes(length)?.to_vec())
        }
        CompressionMethod::RLE => {
            let table = ScanlineTable::parse(&mut reader, rows, version)?;
            let remaining = reader.remaining()?;

            if table.total() > remaining {
                return Err(PSDDecodeErrors::InsufficientBytes {
                    needed: table.total(),
                    remaining
                });
            }
            let mut out = Vec::with_capacity(remaining.saturating_mul(2));

            for count in &table.counts {
                let row = reader.take_bytes(*count)?;
                rle::decompress(row, &mut out)?;
            }
            reader.expect_exhausted()?;

            Ok(out)
        }
        CompressionMethod::Zip | CompressionMethod::ZipPrediction => {
            Err(PSDDecodeErrors::UnsupportedCompression(compression.to_int()))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::channel::{ChannelImageData, ChannelRecord, ScanlineTable};
    use crate::constants::CompressionMethod;
    use crate::errors::PSDDecodeErrors;
    use crate::header::FileVersion;
    use crate::options::PsdOptions;
    use crate::reader::{Context, PsdReader};

    fn psd() -> Context {
        Context::new(FileVersion::Psd, PsdOptions::default())
    }

    fn record(length: usize) -> ChannelRecord {
        ChannelRecord {
            id:     0,
            length: length as u64
        }
    }

    #[test]
    fn record_width_follows_version() {
        let data = [0xFF, 0xFE, 0, 0, 0, 0, 0, 0, 0, 9];

        let mut reader = PsdReader::new(&data);
        let psb = Context::new(FileVersion::Psb, PsdOptions::default());
        let parsed = ChannelRecord::parse(&mut reader, &psb).unwrap();

        assert_eq!(parsed, ChannelRecord { id: -2, length: 9 });
        assert!(parsed.is_mask());

        let mut reader = PsdReader::new(&data[..6]);
        let parsed = ChannelRecord::parse(&mut reader, &psd()).unwrap();
        assert_eq!(parsed.length, 0);
    }

    #[test]
    fn rle_channel_decodes_each_row() {
        // two rows: a literal run of 2, then a repeat of 3
        let data = vec![0, 1, 0, 3, 0, 2, 1, 0xAA, 0xBB, 0xFE, 0x11];
        let mut reader = PsdReader::new(&data);

        let channel = ChannelImageData::parse(&mut reader, &psd(), &record(data.len()), 2).unwrap();
        assert_eq!(channel.compression, CompressionMethod::RLE);
        assert_eq!(channel.data.len, data.len() - 2);

        assert_eq!(channel.decompress(&data).unwrap(), [0xAA, 0xBB, 0x11, 0x11, 0x11]);
    }

    #[test]
    fn psb_tables_use_four_byte_counts() {
        let data = vec![0, 1, 0, 0, 0, 2, 0x00, 0x42];
        let mut reader = PsdReader::new(&data);
        let psb = Context::new(FileVersion::Psb, PsdOptions::default());

        let channel = ChannelImageData::parse(&mut reader, &psb, &record(data.len()), 1).unwrap();
        assert_eq!(channel.decompress(&data).unwrap(), [0x42]);
    }

    #[test]
    fn raw_channel_is_copied() {
        let data = vec![0, 0, 1, 2, 3, 4];
        let mut reader = PsdReader::new(&data);

        let channel = ChannelImageData::parse(&mut reader, &psd(), &record(6), 2).unwrap();
        assert_eq!(channel.decompress(&data).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn short_channel_is_corrupt() {
        let data = vec![0, 0, 0];

        for length in [0, 1] {
            let mut reader = PsdReader::new(&data);
            let err = ChannelImageData::parse(&mut reader, &psd(), &record(length), 1).unwrap_err();

            assert!(matches!(err, PSDDecodeErrors::InsufficientBytes { needed: 2, .. }));
            assert!(err.is_corrupted_format());
        }
    }

    #[test]
    fn table_overrunning_payload_is_corrupt() {
        // three rows need six bytes of table, only four follow the tag
        let data = vec![0, 1, 0, 1, 0, 1];
        let mut reader = PsdReader::new(&data);

        let channel = ChannelImageData::parse(&mut reader, &psd(), &record(6), 3).unwrap();
        assert!(matches!(
            channel.decompress(&data),
            Err(PSDDecodeErrors::InsufficientBytes { needed: 6, remaining: 4 })
        ));
    }

    #[test]
    fn row_counts_overrunning_payload_are_corrupt() {
        let data = vec![0, 1, 0, 9, 0, 0xAA];
        let mut reader = PsdReader::new(&data);

        let channel = ChannelImageData::parse(&mut reader, &psd(), &record(6), 1).unwrap();
        assert!(matches!(
            channel.decompress(&data),
            Err(PSDDecodeErrors::InsufficientBytes { needed: 9, remaining: 2 })
        ));
    }

    #[test]
    fn zip_is_unsupported_not_corrupt() {
        for tag in [2_u8, 3] {
            let data = vec![0, tag, 0x78, 0x9C];
            let mut reader = PsdReader::new(&data);

            let channel = ChannelImageData::parse(&mut reader, &psd(), &record(4), 1).unwrap();
            let err = channel.decompress(&data).unwrap_err();

            assert!(matches!(err, PSDDecodeErrors::UnsupportedCompression(t) if t == u16::from(tag)));
            assert!(!err.is_corrupted_format());
        }
    }

    #[test]
    fn unknown_compression_is_corrupt() {
        let data = vec![0, 4, 0, 0];
        let mut reader = PsdReader::new(&data);

        assert!(matches!(
            ChannelImageData::parse(&mut reader, &psd(), &record(4), 1),
            Err(PSDDecodeErrors::UnsupportedVariant { value: 4, .. })
        ));
    }

    #[test]
    fn table_total_saturates() {
        let table = ScanlineTable {
            counts: vec![usize::MAX, 1]
        };
        assert_eq!(table.total(), usize::MAX);

        let empty = ScanlineTable { counts: Vec::new() };
        assert_eq!(empty.total(), 0);
    }
}
