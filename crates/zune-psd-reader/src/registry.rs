/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Tag to decoder tables
//!
//! Image resources, layer information blocks, descriptor values and
//! reference items are all identified by a small tag. Each kind keeps
//! a static table of [`Entry`] values, tags missing from a table fall
//! back to whatever the caller does for unknown content.

/// One tag and the decoder that understands it
#[derive(Copy, Clone)]
pub struct Entry<K: 'static, D: 'static> {
    pub tag:    K,
    /// Human readable name of the block
    pub name:   &'static str,
    pub decode: D
}

/// A static table of decoders keyed by tag
pub struct Registry<K: 'static, D: 'static> {
    kind:    &'static str,
    entries: &'static [Entry<K, D>]
}

impl<K: PartialEq + Copy, D> Registry<K, D> {
    pub const fn new(kind: &'static str, entries: &'static [Entry<K, D>]) -> Registry<K, D> {
        Registry { kind, entries }
    }

    /// What this table decodes, used in log and error messages
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, tag: K) -> Option<&'static Entry<K, D>> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    pub fn name_of(&self, tag: K) -> Option<&'static str> {
        self.get(tag).map(|entry| entry.name)
    }

    pub fn contains(&self, tag: K) -> bool {
        self.get(tag).is_some()
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = K> + 'static {
        self.entries.iter().map(|entry| entry.tag)
    }
}
