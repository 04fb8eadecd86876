/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Builds small documents byte by byte
#![allow(dead_code)]

pub const PSD: u16 = 1;
pub const PSB: u16 = 2;

pub const RGB: u16 = 3;
pub const GRAYSCALE: u16 = 1;

/// Append a section or channel length, 64 bit for PSB when `wide` holds
pub fn length(out: &mut Vec<u8>, version: u16, wide: bool, len: usize) {
    if version == PSB && wide {
        out.extend_from_slice(&(len as u64).to_be_bytes());
    } else {
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

pub fn unicode(out: &mut Vec<u8>, text: &str) {
    let units: Vec<u16> = text.encode_utf16().collect();
    out.extend_from_slice(&(units.len() as u32).to_be_bytes());

    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
}

/// A descriptor key, four character names are written as ids
pub fn key(out: &mut Vec<u8>, name: &str) {
    if name.len() == 4 {
        out.extend_from_slice(&0_u32.to_be_bytes());
    } else {
        out.extend_from_slice(&(name.len() as u32).to_be_bytes());
    }
    out.extend_from_slice(name.as_bytes());
}

/// Descriptor name, class and item count, items follow
pub fn descriptor_header(out: &mut Vec<u8>, class: &str, count: u32) {
    unicode(out, "");
    key(out, class);
    out.extend_from_slice(&count.to_be_bytes());
}

/// A descriptor with a single item per level, `levels` descriptors deep
pub fn nested_descriptor(levels: usize) -> Vec<u8> {
    let mut out = Vec::new();

    for level in 1..=levels {
        if level == levels {
            descriptor_header(&mut out, "null", 1);
            key(&mut out, "Vrsn");
            out.extend_from_slice(b"long");
            out.extend_from_slice(&(level as i32).to_be_bytes());
        } else {
            descriptor_header(&mut out, "null", 1);
            key(&mut out, "chld");
            out.extend_from_slice(b"Objc");
        }
    }
    out
}

pub fn resource(id: u16, name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"8BIM");
    out.extend_from_slice(&id.to_be_bytes());

    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}

/// An additional layer information block padded to two
pub fn layer_info_block(version: u16, key: &[u8; 4], wide: bool, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"8BIM");
    out.extend_from_slice(key);
    length(&mut out, version, wide, data.len());
    out.extend_from_slice(data);
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}

/// A layer channel as written in the channel table and its payload
pub struct Channel {
    pub id:      i16,
    pub payload: Vec<u8>
}

impl Channel {
    pub fn raw(id: i16, pixels: &[u8]) -> Channel {
        let mut payload = vec![0, 0];
        payload.extend_from_slice(pixels);
        Channel { id, payload }
    }

    /// One literal run per row
    pub fn rle(id: i16, version: u16, rows: &[&[u8]]) -> Channel {
        let mut payload = vec![0, 1];
        let packed: Vec<Vec<u8>> = rows.iter().map(|row| pack_bits(row)).collect();

        for row in &packed {
            if version == PSB {
                payload.extend_from_slice(&(row.len() as u32).to_be_bytes());
            } else {
                payload.extend_from_slice(&(row.len() as u16).to_be_bytes());
            }
        }
        for row in packed {
            payload.extend_from_slice(&row);
        }
        Channel { id, payload }
    }
}

pub struct LayerSpec {
    pub top:      i32,
    pub left:     i32,
    pub bottom:   i32,
    pub right:    i32,
    pub name:     String,
    pub channels: Vec<Channel>,
    /// Additional layer information blocks, already framed
    pub extra:    Vec<u8>
}

impl LayerSpec {
    pub fn new(name: &str, width: i32, height: i32, channels: Vec<Channel>) -> LayerSpec {
        LayerSpec {
            top: 0,
            left: 0,
            bottom: height,
            right: width,
            name: name.to_string(),
            channels,
            extra: Vec::new()
        }
    }

    fn record(&self, version: u16) -> Vec<u8> {
        let mut out = Vec::new();
        for v in [self.top, self.left, self.bottom, self.right] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out.extend_from_slice(&(self.channels.len() as u16).to_be_bytes());

        for channel in &self.channels {
            out.extend_from_slice(&channel.id.to_be_bytes());
            length(&mut out, version, true, channel.payload.len());
        }
        out.extend_from_slice(b"8BIMnorm");
        // opacity, clipping, flags, filler
        out.extend_from_slice(&[255, 0, 0, 0]);

        let mut extra = Vec::new();
        // no mask
        extra.extend_from_slice(&0_u32.to_be_bytes());
        // no blending ranges
        extra.extend_from_slice(&0_u32.to_be_bytes());

        let name_start = extra.len();
        extra.push(self.name.len() as u8);
        extra.extend_from_slice(self.name.as_bytes());
        while (extra.len() - name_start) % 4 != 0 {
            extra.push(0);
        }
        extra.extend_from_slice(&self.extra);

        out.extend_from_slice(&(extra.len() as u32).to_be_bytes());
        out.extend_from_slice(&extra);
        out
    }
}

/// A length prefixed layer info holding `layers`
pub fn layer_info(version: u16, layer_count: i16, layers: &[LayerSpec]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&layer_count.to_be_bytes());

    for layer in layers {
        body.extend_from_slice(&layer.record(version));
    }
    for layer in layers {
        for channel in &layer.channels {
            body.extend_from_slice(&channel.payload);
        }
    }
    if body.len() % 2 != 0 {
        body.push(0);
    }
    let mut out = Vec::new();
    length(&mut out, version, true, body.len());
    out.extend_from_slice(&body);
    out
}

pub struct DocumentBuilder {
    pub version:         u16,
    pub reserved:        [u8; 6],
    pub channels:        u16,
    pub height:          u32,
    pub width:           u32,
    pub depth:           u16,
    pub color_mode:      u16,
    pub color_mode_data: Vec<u8>,
    pub resources:       Vec<u8>,
    /// Payload of the layer and mask section, without its length
    pub layer_and_mask:  Vec<u8>,
    /// Compression tag followed by the merged image
    pub image_data:      Vec<u8>
}

impl DocumentBuilder {
    /// A 1x1 8 bit RGB document with no layers and three raw bytes of image data
    pub fn rgb(version: u16) -> DocumentBuilder {
        DocumentBuilder {
            version,
            reserved: [0; 6],
            channels: 3,
            height: 1,
            width: 1,
            depth: 8,
            color_mode: RGB,
            color_mode_data: Vec::new(),
            resources: Vec::new(),
            layer_and_mask: Vec::new(),
            image_data: vec![0, 0, 10, 20, 30]
        }
    }

    pub fn layers(mut self, layer_count: i16, layers: &[LayerSpec]) -> DocumentBuilder {
        self.layer_and_mask = layer_info(self.version, layer_count, layers);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"8BPS");
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.reserved);
        out.extend_from_slice(&self.channels.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.depth.to_be_bytes());
        out.extend_from_slice(&self.color_mode.to_be_bytes());

        out.extend_from_slice(&(self.color_mode_data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.color_mode_data);

        out.extend_from_slice(&(self.resources.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.resources);

        length(&mut out, self.version, true, self.layer_and_mask.len());
        out.extend_from_slice(&self.layer_and_mask);

        out.extend_from_slice(&self.image_data);
        out
    }
}

/// Reference PackBits encoder, repeats of three or more become runs
pub fn pack_bits(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut position = 0;

    while position < data.len() {
        let value = data[position];
        let mut run = 1;

        while position + run < data.len() && data[position + run] == value && run < 128 {
            run += 1;
        }
        if run >= 3 {
            out.push((257 - run) as u8);
            out.push(value);
            position += run;
            continue;
        }
        let start = position;
        let mut end = position;

        while end < data.len() && end - start < 128 {
            if end + 2 < data.len() && data[end] == data[end + 1] && data[end] == data[end + 2] {
                break;
            }
            end += 1;
        }
        if end == start {
            end = start + 1;
        }
        out.push((end - start - 1) as u8);
        out.extend_from_slice(&data[start..end]);
        position = end;
    }
    out
}
