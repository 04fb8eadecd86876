/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A structural Photoshop PSD/PSB reader
//!
//! This crate reads Photoshop documents, both standard (PSD) and large
//! document (PSB) layouts, into a tree that mirrors the file: header,
//! color mode data, image resources, layers with their masks, channels
//! and additional layer information, and the merged image.
//!
//! Payloads are not copied, the tree stores [`ByteRange`]s into the
//! buffer the document was read from, see [`PsdDocument::bytes`].
//!
//! ## What is decoded
//! - Every length prefixed block is checked to be consumed exactly.
//! - Action descriptors, the self describing values most modern
//!   metadata is stored in, are decoded into [`descriptor::Value`] trees.
//! - Raw and RLE channel data can be decompressed, zip compressed
//!   channels are recognised but return
//!   [`PSDDecodeErrors::UnsupportedCompression`](errors::PSDDecodeErrors::UnsupportedCompression).
//! - Unknown resource ids and layer info keys are kept as raw ranges.
//!
//! The crate does not render or composite layers.
//!
//! # Example
//! - Reading a psd file
//! ```no_run
//! use zune_psd_reader::errors::PSDDecodeErrors;
//! use zune_psd_reader::{PSDDecoder, PixelData};
//!
//! fn main() -> Result<(), PSDDecodeErrors> {
//!     let data: &[u8] = &[];
//!     let document = PSDDecoder::new(data).decode()?;
//!
//!     println!("{} layers", document.layers().len());
//!
//!     // we need to handle u8 and u16 since the decoder supports those depths
//!     match document.pixels()? {
//!         PixelData::U8(_) => {}
//!         PixelData::U16(_) => {}
//!     };
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//! - `std`: implements `std::error::Error` for the error type, the
//!   crate is `no_std` + `alloc` without it.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
extern crate alloc;
pub extern crate zune_core;

pub use decoder::{PSDDecoder, PsdDocument};
pub use descriptor::{Descriptor, Key, Value, VersionedDescriptor};
pub use header::{FileVersion, PsdHeader};
pub use image_data::PixelData;
pub use layers::Layer;
pub use options::PsdOptions;
pub use reader::ByteRange;

pub mod channel;
pub mod constants;
pub mod decoder;
pub mod descriptor;
pub mod errors;
pub mod header;
pub mod image_data;
pub mod layer_info;
pub mod layers;
pub mod options;
pub mod path;
mod reader;
pub mod registry;
pub mod resources;
pub mod rle;
