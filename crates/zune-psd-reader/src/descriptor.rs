/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Action descriptors
//!
//! Most metadata Photoshop added after version 6 is stored as a
//! descriptor, a self describing tree of keyed values. A descriptor is a
//! name, a class id and a count of `(key, value)` items; each value starts
//! with a four character type code. Descriptors, lists, object arrays and
//! global objects nest, so parsing is recursive and bounded by
//! [`PsdOptions::get_max_descriptor_depth`].
use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::PSDDecodeErrors;
use crate::header::FileVersion;
use crate::options::PsdOptions;
use crate::reader::{ByteRange, Context, LengthWidth, PsdReader};
use crate::registry::{Entry, Registry};

/// Smallest possible key, a length of one plus one character
const MIN_KEY_SIZE: usize = 5;
/// Smallest possible value, a type code plus a one byte boolean
const MIN_VALUE_SIZE: usize = 5;
const MIN_ITEM_SIZE: usize = MIN_KEY_SIZE + MIN_VALUE_SIZE;
/// A type code, an empty name and a class key
const MIN_REFERENCE_SIZE: usize = 4 + 4 + MIN_KEY_SIZE;

/// Identity of a class, key, type or enumeration value.
///
/// Stored either as a four byte id or as a string, a zero length
/// prefix selects the id form.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Id(u32),
    Name(String)
}

impl Key {
    /// The key as text, ids are rendered as their four characters
    pub fn to_text(&self) -> String {
        match self {
            Key::Id(id) => id.to_be_bytes().iter().map(|&c| char::from(c)).collect(),
            Key::Name(name) => name.clone()
        }
    }

    /// Whether this key spells `name`, in either encoding
    pub fn is(&self, name: &str) -> bool {
        match self {
            Key::Name(value) => value == name,
            Key::Id(id) => name.len() == 4 && id.to_be_bytes() == name.as_bytes()
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(String::from(value))
    }
}

/// Read a key, a four byte length followed by either a four byte id
/// (length zero) or `length` ASCII characters
pub(crate) fn read_key(reader: &mut PsdReader) -> Result<Key, PSDDecodeErrors> {
    let length = reader.get_u32()? as usize;

    if length == 0 {
        return Ok(Key::Id(reader.get_u32()?));
    }
    Ok(Key::Name(reader.read_ascii(length)?))
}

/// A parsed descriptor tree
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub name:     String,
    pub class_id: Key,
    pub items:    Vec<Item>
}

impl Descriptor {
    /// Parse a bare descriptor occupying all of `data`.
    ///
    /// Ranges inside the result (aliases and raw data) point into `data`.
    pub fn parse(data: &[u8], options: &PsdOptions) -> Result<Descriptor, PSDDecodeErrors> {
        let ctx = Context::new(FileVersion::Psd, *options);
        let mut reader = PsdReader::new(data);

        let descriptor = parse_descriptor(&mut reader, &ctx, 1)?;
        reader.expect_exhausted()?;

        Ok(descriptor)
    }

    /// Value of the first item whose key spells `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|item| item.key.is(key))
            .map(|item| &item.value)
    }

    /// Depth of the tree below this descriptor, a descriptor with only
    /// scalar items has a depth of 1
    pub fn depth(&self) -> usize {
        1 + self
            .items
            .iter()
            .map(|item| item.value.depth())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key:   Key,
    pub value: Value
}

/// One node of a descriptor tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `obj `
    Reference(Vec<ReferenceItem>),
    /// `Objc`
    Descriptor(Descriptor),
    /// `VlLs`
    List(Vec<Value>),
    /// `doub`
    Double(f64),
    /// `UntF`
    UnitFloat(UnitFloat),
    /// `TEXT`
    String(String),
    /// `enum`
    Enumerated { type_id: Key, value: Key },
    /// `long`
    Integer(i32),
    /// `comp`
    LargeInteger(i64),
    /// `bool`
    Boolean(bool),
    /// `GlbO`
    GlobalObject(Descriptor),
    /// `type` and `GlbC`
    Class(Class),
    /// `alis`, kept uninterpreted
    Alias(ByteRange),
    /// `tdta`, kept uninterpreted
    RawData(ByteRange),
    /// `ObAr`
    ObjectArray(ObjectArray),
    /// `UnFl`
    UnitFloats(UnitFloats)
}

impl Value {
    /// Levels of nesting this value adds, scalars add none
    pub fn depth(&self) -> usize {
        match self {
            Value::Descriptor(descriptor) | Value::GlobalObject(descriptor) => descriptor.depth(),
            Value::List(values) => 1 + values.iter().map(Value::depth).max().unwrap_or(0),
            Value::ObjectArray(array) => {
                1 + array
                    .items
                    .iter()
                    .map(|item| item.value.depth())
                    .max()
                    .unwrap_or(0)
            }
            _ => 0
        }
    }

    pub fn as_descriptor(&self) -> Option<&Descriptor> {
        match self {
            Value::Descriptor(descriptor) | Value::GlobalObject(descriptor) => Some(descriptor),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            Value::UnitFloat(value) => Some(value.value),
            Value::Integer(value) => Some(f64::from(*value)),
            _ => None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None
        }
    }
}

/// Unit attached to a `UntF` or `UnFl` value
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Units {
    /// `#Ang`, base degrees
    Angle,
    /// `#Rsl`, base per inch
    Density,
    /// `#Rlt`, base 72ppi
    Distance,
    /// `#Nne`, coerced
    None,
    /// `#Prc`, unit value
    Percent,
    /// `#Pxl`, tagged unit value
    Pixels,
    /// `#Mlm`
    Millimeters,
    /// `#Pnt`
    Points,
    /// four zero bytes
    Unspecified
}

impl Units {
    pub fn from_code(code: [u8; 4]) -> Option<Units> {
        match &code {
            b"#Ang" => Some(Units::Angle),
            b"#Rsl" => Some(Units::Density),
            b"#Rlt" => Some(Units::Distance),
            b"#Nne" => Some(Units::None),
            b"#Prc" => Some(Units::Percent),
            b"#Pxl" => Some(Units::Pixels),
            b"#Mlm" => Some(Units::Millimeters),
            b"#Pnt" => Some(Units::Points),
            [0, 0, 0, 0] => Some(Units::Unspecified),
            _ => None
        }
    }

    fn read(reader: &mut PsdReader) -> Result<Units, PSDDecodeErrors> {
        let code = reader.get_fourcc()?;

        Units::from_code(code).ok_or(PSDDecodeErrors::UnknownTag {
            kind: "unit",
            tag:  code
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UnitFloat {
    pub units: Units,
    pub value: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitFloats {
    pub units:  Units,
    pub values: Vec<f64>
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Class {
    pub name:     String,
    pub class_id: Key
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectArray {
    pub version:  u32,
    pub name:     String,
    pub class_id: Key,
    pub items:    Vec<Item>
}

/// One step of a `obj ` reference
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ReferenceItem {
    /// `prop`
    Property {
        name:     String,
        class_id: Key,
        key_id:   Key
    },
    /// `Clss`
    Class(Class),
    /// `Enmr`
    Enumerated {
        name:     String,
        class_id: Key,
        type_id:  Key,
        value:    Key
    },
    /// `rele`
    Offset {
        name:     String,
        class_id: Key,
        value:    u32
    },
    /// `Idnt`
    Identifier {
        name:     String,
        class_id: Key,
        value:    u32
    },
    /// `indx`
    Index {
        name:     String,
        class_id: Key,
        value:    u32
    },
    /// `name`
    Name {
        name:     String,
        class_id: Key,
        value:    String
    }
}

/// A descriptor prefixed by its format version
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDescriptor {
    pub version:    u32,
    pub descriptor: Descriptor
}

impl VersionedDescriptor {
    pub(crate) fn parse(
        reader: &mut PsdReader, ctx: &Context
    ) -> Result<VersionedDescriptor, PSDDecodeErrors> {
        let version = reader.get_u32()?;

        if version != 16 && version != 0 {
            return Err(PSDDecodeErrors::UnsupportedVariant {
                kind:  "descriptor version",
                value: u64::from(version)
            });
        }
        let descriptor = parse_descriptor(reader, ctx, 1)?;

        Ok(VersionedDescriptor {
            version,
            descriptor
        })
    }
}

type ValueDecoder = fn(&mut PsdReader, &Context, usize) -> Result<Value, PSDDecodeErrors>;

type ReferenceDecoder = fn(&mut PsdReader, String, Key) -> Result<ReferenceItem, PSDDecodeErrors>;

const VALUE_DECODERS: &[Entry<[u8; 4], ValueDecoder>] = &[
    Entry {
        tag:    *b"obj ",
        name:   "Reference",
        decode: decode_reference
    },
    Entry {
        tag:    *b"Objc",
        name:   "Descriptor",
        decode: decode_object
    },
    Entry {
        tag:    *b"VlLs",
        name:   "List",
        decode: decode_list
    },
    Entry {
        tag:    *b"doub",
        name:   "Double",
        decode: decode_double
    },
    Entry {
        tag:    *b"UntF",
        name:   "Unit float",
        decode: decode_unit_float
    },
    Entry {
        tag:    *b"TEXT",
        name:   "String",
        decode: decode_text
    },
    Entry {
        tag:    *b"enum",
        name:   "Enumerated",
        decode: decode_enumerated
    },
    Entry {
        tag:    *b"long",
        name:   "Integer",
        decode: decode_integer
    },
    Entry {
        tag:    *b"comp",
        name:   "Large integer",
        decode: decode_large_integer
    },
    Entry {
        tag:    *b"bool",
        name:   "Boolean",
        decode: decode_boolean
    },
    Entry {
        tag:    *b"GlbO",
        name:   "Global object",
        decode: decode_global_object
    },
    Entry {
        tag:    *b"type",
        name:   "Class",
        decode: decode_class
    },
    Entry {
        tag:    *b"GlbC",
        name:   "Class",
        decode: decode_class
    },
    Entry {
        tag:    *b"alis",
        name:   "Alias",
        decode: decode_alias
    },
    Entry {
        tag:    *b"tdta",
        name:   "Raw data",
        decode: decode_raw_data
    },
    Entry {
        tag:    *b"ObAr",
        name:   "Object array",
        decode: decode_object_array
    },
    Entry {
        tag:    *b"UnFl",
        name:   "Unit floats",
        decode: decode_unit_floats
    }
];

static VALUES: Registry<[u8; 4], ValueDecoder> = Registry::new("descriptor value", VALUE_DECODERS);

const REFERENCE_DECODERS: &[Entry<[u8; 4], ReferenceDecoder>] = &[
    Entry {
        tag:    *b"prop",
        name:   "Property",
        decode: reference_property
    },
    Entry {
        tag:    *b"Clss",
        name:   "Class",
        decode: reference_class
    },
    Entry {
        tag:    *b"clss",
        name:   "Class",
        decode: reference_class
    },
    Entry {
        tag:    *b"Enmr",
        name:   "Enumerated reference",
        decode: reference_enumerated
    },
    Entry {
        tag:    *b"rele",
        name:   "Offset",
        decode: reference_offset
    },
    Entry {
        tag:    *b"Idnt",
        name:   "Identifier",
        decode: reference_identifier
    },
    Entry {
        tag:    *b"indx",
        name:   "Index",
        decode: reference_index
    },
    Entry {
        tag:    *b"name",
        name:   "Name",
        decode: reference_name
    }
];

static REFERENCES: Registry<[u8; 4], ReferenceDecoder> =
    Registry::new("reference item", REFERENCE_DECODERS);

/// Parse a descriptor at nesting level `depth`, top level descriptors are level 1
pub(crate) fn parse_descriptor(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Descriptor, PSDDecodeErrors> {
    check_depth(ctx, depth)?;

    let name = reader.read_unicode_string()?;
    let class_id = read_key(reader)?;
    let items = read_items(reader, ctx, depth)?;

    Ok(Descriptor {
        name,
        class_id,
        items
    })
}

fn check_depth(ctx: &Context, depth: usize) -> Result<(), PSDDecodeErrors> {
    if depth > ctx.options.get_max_descriptor_depth() {
        return Err(PSDDecodeErrors::DescriptorTooDeep(depth));
    }
    Ok(())
}

fn read_items(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Vec<Item>, PSDDecodeErrors> {
    let count = reader.get_u32()? as usize;
    let count = reader.bounded_count(count, MIN_ITEM_SIZE)?;

    let mut items = Vec::with_capacity(count);

    for _ in 0..count {
        let key = read_key(reader)?;
        let value = parse_value(reader, ctx, depth)?;

        items.push(Item { key, value });
    }
    Ok(items)
}

/// Read a type code and the value it announces
fn parse_value(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Value, PSDDecodeErrors> {
    let tag = reader.get_fourcc()?;

    let entry = VALUES.get(tag).ok_or(PSDDecodeErrors::UnknownTag {
        kind: VALUES.kind(),
        tag
    })?;

    (entry.decode)(reader, ctx, depth)
}

fn decode_reference(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    let count = reader.get_u32()? as usize;
    let count = reader.bounded_count(count, MIN_REFERENCE_SIZE)?;

    let mut items = Vec::with_capacity(count);

    for _ in 0..count {
        let tag = reader.get_fourcc()?;
        let entry = REFERENCES.get(tag).ok_or(PSDDecodeErrors::UnknownTag {
            kind: REFERENCES.kind(),
            tag
        })?;

        let name = reader.read_unicode_string()?;
        let class_id = read_key(reader)?;

        items.push((entry.decode)(reader, name, class_id)?);
    }
    Ok(Value::Reference(items))
}

fn decode_object(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::Descriptor(parse_descriptor(reader, ctx, depth + 1)?))
}

fn decode_global_object(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::GlobalObject(parse_descriptor(
        reader,
        ctx,
        depth + 1
    )?))
}

fn decode_list(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Value, PSDDecodeErrors> {
    check_depth(ctx, depth + 1)?;

    let count = reader.get_u32()? as usize;
    let count = reader.bounded_count(count, MIN_VALUE_SIZE)?;

    let mut values = Vec::with_capacity(count);

    for _ in 0..count {
        values.push(parse_value(reader, ctx, depth + 1)?);
    }
    Ok(Value::List(values))
}

fn decode_object_array(
    reader: &mut PsdReader, ctx: &Context, depth: usize
) -> Result<Value, PSDDecodeErrors> {
    check_depth(ctx, depth + 1)?;

    let version = reader.get_u32()?;

    if version != 16 {
        return Err(PSDDecodeErrors::UnsupportedVariant {
            kind:  "object array version",
            value: u64::from(version)
        });
    }
    let name = reader.read_unicode_string()?;
    let class_id = read_key(reader)?;
    let items = read_items(reader, ctx, depth + 1)?;

    Ok(Value::ObjectArray(ObjectArray {
        version,
        name,
        class_id,
        items
    }))
}

fn decode_double(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::Double(reader.get_f64()?))
}

fn decode_unit_float(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    let units = Units::read(reader)?;
    let value = reader.get_f64()?;

    Ok(Value::UnitFloat(UnitFloat { units, value }))
}

fn decode_unit_floats(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    let units = Units::read(reader)?;
    let count = reader.get_u32()? as usize;
    let count = reader.bounded_count(count, 8)?;

    let values = (0..count)
        .map(|_| reader.get_f64())
        .collect::<Result<Vec<f64>, PSDDecodeErrors>>()?;

    Ok(Value::UnitFloats(UnitFloats { units, values }))
}

fn decode_text(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::String(reader.read_unicode_string()?))
}

fn decode_enumerated(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    let type_id = read_key(reader)?;
    let value = read_key(reader)?;

    Ok(Value::Enumerated { type_id, value })
}

fn decode_integer(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::Integer(reader.get_i32()?))
}

fn decode_large_integer(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::LargeInteger(reader.get_i64()?))
}

fn decode_boolean(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::Boolean(reader.get_bool()?))
}

fn decode_class(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    let name = reader.read_unicode_string()?;
    let class_id = read_key(reader)?;

    Ok(Value::Class(Class { name, class_id }))
}

fn decode_alias(reader: &mut PsdReader, _: &Context, _: usize) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::Alias(reader.read_block(LengthWidth::U32)?))
}

fn decode_raw_data(
    reader: &mut PsdReader, _: &Context, _: usize
) -> Result<Value, PSDDecodeErrors> {
    Ok(Value::RawData(reader.read_block(LengthWidth::U32)?))
}

fn reference_property(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let key_id = read_key(reader)?;

    Ok(ReferenceItem::Property {
        name,
        class_id,
        key_id
    })
}

fn reference_class(
    _: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    Ok(ReferenceItem::Class(Class { name, class_id }))
}

fn reference_enumerated(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let type_id = read_key(reader)?;
    let value = read_key(reader)?;

    Ok(ReferenceItem::Enumerated {
        name,
        class_id,
        type_id,
        value
    })
}

fn reference_offset(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let value = reader.get_u32()?;

    Ok(ReferenceItem::Offset {
        name,
        class_id,
        value
    })
}

fn reference_identifier(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let value = reader.get_u32()?;

    Ok(ReferenceItem::Identifier {
        name,
        class_id,
        value
    })
}

fn reference_index(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let value = reader.get_u32()?;

    Ok(ReferenceItem::Index {
        name,
        class_id,
        value
    })
}

fn reference_name(
    reader: &mut PsdReader, name: String, class_id: Key
) -> Result<ReferenceItem, PSDDecodeErrors> {
    let value = reader.read_unicode_string()?;

    Ok(ReferenceItem::Name {
        name,
        class_id,
        value
    })
}
