/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_psd_reader::descriptor::Units;
use zune_psd_reader::errors::PSDDecodeErrors;
use zune_psd_reader::options::DEFAULT_MAX_DESCRIPTOR_DEPTH;
use zune_psd_reader::{Descriptor, Key, PsdOptions, Value};

mod common;

use common::{descriptor_header, key, nested_descriptor, unicode};

#[test]
fn default_depth_limit_is_inclusive() {
    let options = PsdOptions::default();

    let deepest = Descriptor::parse(&nested_descriptor(DEFAULT_MAX_DESCRIPTOR_DEPTH), &options).unwrap();
    assert_eq!(deepest.depth(), DEFAULT_MAX_DESCRIPTOR_DEPTH);

    let too_deep = Descriptor::parse(&nested_descriptor(DEFAULT_MAX_DESCRIPTOR_DEPTH + 1), &options);
    assert!(matches!(
        too_deep,
        Err(PSDDecodeErrors::DescriptorTooDeep(depth)) if depth == DEFAULT_MAX_DESCRIPTOR_DEPTH + 1
    ));
}

#[test]
fn custom_depth_limit() {
    let options = PsdOptions::default().set_max_descriptor_depth(3);

    assert!(Descriptor::parse(&nested_descriptor(3), &options).is_ok());
    assert!(matches!(
        Descriptor::parse(&nested_descriptor(4), &options),
        Err(PSDDecodeErrors::DescriptorTooDeep(4))
    ));
}

#[test]
fn innermost_value_survives_nesting() {
    let descriptor = Descriptor::parse(&nested_descriptor(10), &PsdOptions::default()).unwrap();

    let mut current = &descriptor;
    for _ in 1..10 {
        current = current.get("chld").and_then(Value::as_descriptor).unwrap();
    }
    assert_eq!(current.get("Vrsn"), Some(&Value::Integer(10)));
}

/// `{ list: [ { a: 1 }, { b: "two" } ], after: 1.5 }`
#[test]
fn list_of_descriptors_keeps_siblings() {
    let mut data = Vec::new();
    descriptor_header(&mut data, "null", 2);

    key(&mut data, "list");
    data.extend_from_slice(b"VlLs");
    data.extend_from_slice(&2_u32.to_be_bytes());

    data.extend_from_slice(b"Objc");
    descriptor_header(&mut data, "clsA", 1);
    key(&mut data, "a");
    data.extend_from_slice(b"long");
    data.extend_from_slice(&1_i32.to_be_bytes());

    data.extend_from_slice(b"Objc");
    descriptor_header(&mut data, "clsB", 1);
    key(&mut data, "b");
    data.extend_from_slice(b"TEXT");
    unicode(&mut data, "two");

    key(&mut data, "after");
    data.extend_from_slice(b"UntF");
    data.extend_from_slice(b"#Prc");
    data.extend_from_slice(&1.5_f64.to_be_bytes());

    let descriptor = Descriptor::parse(&data, &PsdOptions::default()).unwrap();
    assert_eq!(descriptor.items.len(), 2);
    assert_eq!(descriptor.depth(), 3);

    let list = descriptor.get("list").and_then(Value::as_list).unwrap();
    assert_eq!(list.len(), 2);

    let first = list[0].as_descriptor().unwrap();
    assert_eq!(first.class_id, Key::Id(u32::from_be_bytes(*b"clsA")));
    assert_eq!(first.get("a"), Some(&Value::Integer(1)));

    let second = list[1].as_descriptor().unwrap();
    assert_eq!(second.get("b").and_then(Value::as_str), Some("two"));

    match descriptor.get("after") {
        Some(Value::UnitFloat(unit)) => {
            assert_eq!(unit.units, Units::Percent);
            assert_eq!(unit.value, 1.5);
        }
        other => panic!("Expected a unit float, found {other:?}")
    }
}

#[test]
fn lists_count_toward_depth() {
    // a list inside the top level descriptor sits on level two
    let mut data = Vec::new();
    descriptor_header(&mut data, "null", 1);
    key(&mut data, "list");
    data.extend_from_slice(b"VlLs");
    data.extend_from_slice(&0_u32.to_be_bytes());

    let options = PsdOptions::default().set_max_descriptor_depth(1);
    assert!(matches!(
        Descriptor::parse(&data, &options),
        Err(PSDDecodeErrors::DescriptorTooDeep(2))
    ));

    let options = PsdOptions::default().set_max_descriptor_depth(2);
    assert!(Descriptor::parse(&data, &options).is_ok());
}

#[test]
fn truncated_descriptor_is_corrupt() {
    let data = nested_descriptor(4);

    for end in [3, 10, data.len() - 1] {
        let err = Descriptor::parse(&data[..end], &PsdOptions::default()).unwrap_err();
        assert!(err.is_corrupted_format());
    }
}
