/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Options that influence how a document is read
//!
//! Limits shared with the other zune decoders (maximum dimensions,
//! strict mode) live in [`DecoderOptions`], [`PsdOptions`] adds the
//! knobs that only make sense for photoshop documents.

use zune_core::options::DecoderOptions;

use crate::constants::MAX_PSB_DIMENSIONS;

/// Default limit on how deep descriptors, lists and object arrays may nest.
pub const DEFAULT_MAX_DESCRIPTOR_DEPTH: usize = 64;

/// Options respected by [`PSDDecoder`](crate::PSDDecoder)
#[derive(Debug, Copy, Clone)]
pub struct PsdOptions {
    /// Dimension limits and strict mode.
    ///
    /// The format caps PSD at 30,000 and PSB at 300,000 pixels,
    /// the smaller of the configured and the format limit wins.
    decoder:              DecoderOptions,
    /// How deep descriptor values may nest before the reader bails out.
    ///
    /// Each descriptor, list, object array and global object adds one level.
    ///
    /// - Default value: 64
    max_descriptor_depth: usize,
    /// Parse layer records and their channels, when false the
    /// layer and mask section is only captured as a range
    ///
    /// - Default value: true
    decode_layer_info:    bool
}

impl Default for PsdOptions {
    /// Strict mode with dimension limits raised to what PSB allows
    fn default() -> Self {
        let decoder = DecoderOptions::default()
            .set_max_width(MAX_PSB_DIMENSIONS)
            .set_max_height(MAX_PSB_DIMENSIONS);

        PsdOptions::new(decoder)
    }
}

impl From<DecoderOptions> for PsdOptions {
    fn from(decoder: DecoderOptions) -> Self {
        PsdOptions::new(decoder)
    }
}

impl PsdOptions {
    /// Wrap decoder options, photoshop specific knobs take their defaults
    pub const fn new(decoder: DecoderOptions) -> PsdOptions {
        PsdOptions {
            decoder,
            max_descriptor_depth: DEFAULT_MAX_DESCRIPTOR_DEPTH,
            decode_layer_info: true
        }
    }

    pub const fn get_decoder_options(&self) -> &DecoderOptions {
        &self.decoder
    }

    pub const fn get_max_descriptor_depth(&self) -> usize {
        self.max_descriptor_depth
    }

    pub const fn get_decode_layer_info(&self) -> bool {
        self.decode_layer_info
    }

    pub fn set_decoder_options(mut self, decoder: DecoderOptions) -> Self {
        self.decoder = decoder;
        self
    }

    /// Set how deep descriptor trees may nest
    ///
    /// Descriptors are recursive, so this bounds stack usage
    /// on hostile input.
    pub fn set_max_descriptor_depth(mut self, depth: usize) -> Self {
        self.max_descriptor_depth = depth;
        self
    }

    pub fn set_decode_layer_info(mut self, yes: bool) -> Self {
        self.decode_layer_info = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use zune_core::options::DecoderOptions;

    use crate::options::{PsdOptions, DEFAULT_MAX_DESCRIPTOR_DEPTH};

    #[test]
    fn default_allows_large_documents() {
        let options = PsdOptions::default();

        assert_eq!(options.get_decoder_options().max_width(), 300_000);
        assert_eq!(options.get_decoder_options().max_height(), 300_000);
        assert!(options.get_decoder_options().strict_mode());
        assert_eq!(options.get_max_descriptor_depth(), DEFAULT_MAX_DESCRIPTOR_DEPTH);
    }

    #[test]
    fn decoder_options_are_kept() {
        let decoder = DecoderOptions::default()
            .set_max_width(10)
            .set_strict_mode(false);
        let options = PsdOptions::from(decoder);

        assert_eq!(options.get_decoder_options().max_width(), 10);
        assert!(!options.get_decoder_options().strict_mode());
        assert!(options.get_decode_layer_info());
    }
}
