/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_psd_reader::constants::{ColorModes, CompressionMethod};
use zune_psd_reader::errors::PSDDecodeErrors;
use zune_psd_reader::layer_info::LayerInfoData;
use zune_psd_reader::{ByteRange, FileVersion, PSDDecoder, PixelData, PsdOptions};

mod common;

use common::{layer_info_block, unicode, Channel, DocumentBuilder, LayerSpec, GRAYSCALE, PSB, PSD};

#[test]
fn minimal_rgb_document() {
    let data = DocumentBuilder::rgb(PSD).build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    let header = document.header();
    assert_eq!(header.version, FileVersion::Psd);
    assert_eq!((header.width, header.height), (1, 1));
    assert_eq!(header.channels, 3);
    assert_eq!(header.depth, 8);
    assert_eq!(header.color_mode, ColorModes::RGB);

    assert!(document.color_mode_data().is_empty());
    assert!(document.image_resources().is_empty());
    assert!(document.layer_and_mask().range.is_empty());
    assert!(document.layers().is_empty());

    let image_data = document.image_data();
    assert_eq!(image_data.compression, CompressionMethod::NoCompression);
    assert_eq!(image_data.data.len, 3);
    assert_eq!(document.bytes(image_data.data), [10, 20, 30]);

    assert_eq!(document.colorspace(), Some(ColorSpace::RGB));
    assert_eq!(document.pixels().unwrap(), PixelData::U8(vec![10, 20, 30]));
}

#[test]
fn headers_can_be_read_alone() {
    let data = DocumentBuilder::rgb(PSB).build();
    let mut decoder = PSDDecoder::new(&data);

    assert!(decoder.header().is_none());
    decoder.decode_headers().unwrap();

    assert_eq!(decoder.header().map(|h| h.version), Some(FileVersion::Psb));
    assert_eq!(decoder.dimensions(), Some((1, 1)));
    assert_eq!(decoder.colorspace(), Some(ColorSpace::RGB));
}

#[test]
fn color_mode_data_is_kept_as_a_range() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.color_mode = 2;
    builder.channels = 1;
    builder.color_mode_data = (0..=255).collect();
    builder.image_data = vec![0, 0, 7];

    let data = builder.build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    assert_eq!(document.header().color_mode, ColorModes::IndexedColor);
    assert_eq!(document.color_mode_data().len, 256);
    assert_eq!(document.bytes(document.color_mode_data())[255], 255);
    assert_eq!(document.colorspace(), None);
    assert!(document.pixels().is_err());
}

fn two_layers(version: u16) -> Vec<u8> {
    let mut first = LayerSpec::new(
        "first",
        2,
        2,
        vec![
            Channel::raw(0, &[1, 2, 3, 4]),
            Channel::rle(-1, version, &[&[9, 9], &[7, 8]]),
        ]
    );
    first.top = 4;
    first.bottom = 6;

    let second = LayerSpec::new("second", 3, 1, vec![Channel::rle(0, version, &[&[5, 5, 5]])]);

    DocumentBuilder::rgb(version)
        .layers(-2, &[first, second])
        .build()
}

#[test]
fn size_mode_changes_footprint_not_content() {
    let psd = two_layers(PSD);
    let psb = two_layers(PSB);
    assert!(psb.len() > psd.len());

    let psd = PSDDecoder::new(psd).decode().unwrap();
    let psb = PSDDecoder::new(psb).decode().unwrap();

    assert_eq!(psd.header().version, FileVersion::Psd);
    assert_eq!(psb.header().version, FileVersion::Psb);

    let psd_info = psd.layer_and_mask().layer_info.as_ref().unwrap();
    let psb_info = psb.layer_and_mask().layer_info.as_ref().unwrap();

    assert_eq!(psd_info.layer_count, -2);
    assert_eq!(psb_info.layer_count, -2);
    assert!(psd_info.has_merged_alpha());
    assert_eq!(psd.layers().len(), 2);
    assert_eq!(psb.layers().len(), 2);

    for (a, b) in psd.layers().iter().zip(psb.layers()) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.record.height(), b.record.height());
        assert_eq!(a.record.channels.len(), b.record.channels.len());

        for (x, y) in a.channels.iter().zip(&b.channels) {
            assert_eq!(x.channel_id, y.channel_id);
            assert_eq!(x.compression, y.compression);
            assert_eq!(
                psd.channel_bytes(a, x.channel_id).unwrap(),
                psb.channel_bytes(b, y.channel_id).unwrap()
            );
        }
    }

    let first = &psd.layers()[0];
    assert_eq!(first.name(), "first");
    assert_eq!(psd.channel_bytes(first, 0).unwrap(), [1, 2, 3, 4]);
    assert_eq!(psd.channel_bytes(first, -1).unwrap(), [9, 9, 7, 8]);
    assert_eq!(psd.channel_bytes(&psd.layers()[1], 0).unwrap(), [5, 5, 5]);
}

#[test]
fn channel_lengths_account_for_the_compression_tag() {
    let data = two_layers(PSD);
    let document = PSDDecoder::new(&data).decode().unwrap();

    for layer in document.layers() {
        for (record, channel) in layer.record.channels.iter().zip(&layer.channels) {
            assert_eq!(record.length, channel.data.len as u64 + 2);
        }
    }
}

#[test]
fn unicode_name_wins_over_pascal_name() {
    let mut luni = Vec::new();
    unicode(&mut luni, "Ünïcode");

    let mut layer = LayerSpec::new("ascii", 1, 1, vec![Channel::raw(0, &[0])]);
    layer.extra = layer_info_block(PSD, b"luni", false, &luni);

    let data = DocumentBuilder::rgb(PSD).layers(1, &[layer]).build();
    let document = PSDDecoder::new(&data).decode().unwrap();
    let layer = &document.layers()[0];

    assert_eq!(layer.record.name, "ascii");
    assert_eq!(layer.name(), "Ünïcode");
    assert!(matches!(
        layer.info(b"luni").map(|block| &block.content),
        Some(LayerInfoData::UnicodeName(name)) if name == "Ünïcode"
    ));
}

#[test]
fn layers_can_be_skipped() {
    let data = two_layers(PSD);
    let options = PsdOptions::default().set_decode_layer_info(false);
    let document = PSDDecoder::new_with_psd_options(&data, options)
        .decode()
        .unwrap();

    assert!(!document.layer_and_mask().range.is_empty());
    assert!(document.layer_and_mask().layer_info.is_none());
    assert!(document.layers().is_empty());
    assert_eq!(document.image_data().data.len, 3);
}

#[test]
fn trailing_garbage_in_layer_section_is_corrupt() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.layer_and_mask = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

    let data = builder.build();
    let err = PSDDecoder::new(&data).decode().unwrap_err();

    assert!(err.is_corrupted_format());
}

#[test]
fn sixteen_bit_grayscale_pixels() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.color_mode = GRAYSCALE;
    builder.channels = 1;
    builder.width = 2;
    builder.depth = 16;
    builder.image_data = vec![0, 0, 0x12, 0x34, 0xFF, 0xEE];

    let data = builder.build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    assert_eq!(document.colorspace(), Some(ColorSpace::Luma));
    assert_eq!(document.pixels().unwrap(), PixelData::U16(vec![0x1234, 0xFFEE]));
}

#[test]
fn rle_merged_image() {
    let mut builder = DocumentBuilder::rgb(PSD);
    // three channels of one row each, a one byte literal per row
    builder.image_data = vec![0, 1, 0, 2, 0, 2, 0, 2, 0, 10, 0, 20, 0, 30];

    let data = builder.build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    assert_eq!(document.image_data().compression, CompressionMethod::RLE);
    assert_eq!(document.pixels().unwrap(), PixelData::U8(vec![10, 20, 30]));
}

#[test]
fn wrong_magic() {
    let mut data = DocumentBuilder::rgb(PSD).build();
    data[0] = b'9';

    assert!(matches!(
        PSDDecoder::new(&data).decode(),
        Err(PSDDecodeErrors::WrongMagicBytes(_))
    ));
}

#[test]
fn unknown_version() {
    let data = DocumentBuilder::rgb(3).build();

    assert!(matches!(
        PSDDecoder::new(&data).decode(),
        Err(PSDDecodeErrors::UnsupportedFileType(3))
    ));
}

#[test]
fn reserved_bytes_respect_strict_mode() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.reserved = [0, 0, 0, 1, 0, 0];
    let data = builder.build();

    let err = PSDDecoder::new(&data).decode().unwrap_err();
    assert!(matches!(err, PSDDecodeErrors::NonZeroReserved([0, 0, 0, 1, 0, 0])));

    let options = DecoderOptions::default().set_strict_mode(false);
    assert!(PSDDecoder::new_with_options(&data, options).decode().is_ok());
}

#[test]
fn dimension_limits() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.width = 30_001;
    let data = builder.build();

    assert!(matches!(
        PSDDecoder::new(&data).decode_headers(),
        Err(PSDDecodeErrors::LargeDimensions(30_000, 30_001))
    ));

    builder.version = PSB;
    let data = builder.build();
    assert!(PSDDecoder::new(&data).decode_headers().is_ok());

    let options = DecoderOptions::default().set_max_width(100);
    assert!(matches!(
        PSDDecoder::new_with_options(&data, options).decode_headers(),
        Err(PSDDecodeErrors::LargeDimensions(100, 30_001))
    ));

    // limits passed in by the caller are not raised to what PSB allows
    let limits = DecoderOptions::default();
    assert!(matches!(
        PSDDecoder::new_with_options(&data, limits).decode_headers(),
        Err(PSDDecodeErrors::LargeDimensions(max, 30_001)) if max == limits.max_width()
    ));
}

#[test]
fn header_field_checks() {
    let mut builder = DocumentBuilder::rgb(PSD);
    builder.channels = 57;
    assert!(matches!(
        PSDDecoder::new(builder.build()).decode_headers(),
        Err(PSDDecodeErrors::UnsupportedChannelCount(57))
    ));

    let mut builder = DocumentBuilder::rgb(PSD);
    builder.depth = 4;
    assert!(matches!(
        PSDDecoder::new(builder.build()).decode_headers(),
        Err(PSDDecodeErrors::UnsupportedBitDepth(4))
    ));

    let mut builder = DocumentBuilder::rgb(PSD);
    builder.color_mode = 5;
    assert!(matches!(
        PSDDecoder::new(builder.build()).decode_headers(),
        Err(PSDDecodeErrors::UnknownColorMode(5))
    ));

    let mut builder = DocumentBuilder::rgb(PSD);
    builder.height = 0;
    assert!(matches!(
        PSDDecoder::new(builder.build()).decode_headers(),
        Err(PSDDecodeErrors::ZeroDimensions)
    ));
}

#[test]
fn truncated_documents_fail() {
    let data = two_layers(PSD);

    for end in [0, 10, 26, 30, 40, data.len() - 20] {
        assert!(PSDDecoder::new(&data[..end]).decode().is_err(), "end {end}");
    }
}

#[test]
fn document_returns_its_buffer() {
    let data = DocumentBuilder::rgb(PSD).build();
    let document = PSDDecoder::new(data.clone()).decode().unwrap();

    assert_eq!(document.into_inner(), data);
}

#[test]
fn out_of_range_bytes_are_empty() {
    let data = DocumentBuilder::rgb(PSD).build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    assert!(document.bytes(ByteRange::new(usize::MAX, 2)).is_empty());
    assert!(document.bytes(ByteRange::new(data.len(), 1)).is_empty());
    assert!(document.bytes(ByteRange::new(0, data.len() + 1)).is_empty());
}

#[test]
fn documents_are_debug_printable() {
    let data = DocumentBuilder::rgb(PSD).build();
    let document = PSDDecoder::new(&data).decode().unwrap();

    let printed = format!("{document:?}");
    assert!(printed.starts_with("PsdDocument"));
    assert!(printed.contains(&format!("len: {}", data.len())));
}
