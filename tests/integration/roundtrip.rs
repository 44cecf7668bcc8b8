//! Round-trip law (spec §8 property 1): for every well-formed document,
//! reading back the flattened image reproduces the original values modulo
//! the documented normalization (adjacent same-type leaves grouped into a
//! span; interned strings sharing one offset).

use crate::common;
use wisent::{validate, Cursor, CounterOptions, Value};

#[test]
fn nested_objects_and_arrays_round_trip() {
    let text = r#"{
        "name": "wisent",
        "tags": ["fast", "columnar", "fast"],
        "meta": {"version": 2, "stable": true},
        "scores": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]
    }"#;
    let image = common::flatten_json(text, &CounterOptions::default());
    assert!(validate(&image).unwrap().is_empty());

    let root = Cursor::root(&image);
    assert_eq!(root.child_by_key("name").unwrap(), Value::String("wisent".to_string()));

    let Value::Expression(tags_idx) = root.child_by_key("tags").unwrap() else { panic!("tags should be a list") };
    let tags = root.get_expression(tags_idx);
    assert_eq!(tags.child(0).unwrap(), Value::String("fast".to_string()));
    assert_eq!(tags.child(1).unwrap(), Value::String("columnar".to_string()));
    assert_eq!(tags.child(2).unwrap(), Value::String("fast".to_string()));

    let Value::Expression(meta_idx) = root.child_by_key("meta").unwrap() else { panic!("meta should be an object") };
    let meta = root.get_expression(meta_idx);
    assert_eq!(meta.child_by_key("version").unwrap(), Value::Long(2));
    assert_eq!(meta.child_by_key("stable").unwrap(), Value::Bool(true));

    let Value::Expression(scores_idx) = root.child_by_key("scores").unwrap() else { panic!("scores should be a list") };
    let scores = root.get_expression(scores_idx);
    assert_eq!(scores.len(), 14);
    for i in 0..14u64 {
        assert_eq!(scores.child(i).unwrap(), Value::Long(i as i64 + 1));
    }
}

#[test]
fn repeated_strings_intern_to_the_same_offset_when_enabled() {
    let text = r#"["a", "b", "a", "a", "b"]"#;
    let opts = CounterOptions { dict_encode_strings: true, ..CounterOptions::default() };
    let with_interning = common::flatten_json(text, &opts);
    let without_interning = common::flatten_json(text, &CounterOptions::default());

    // Deduplication only shrinks the string region; logical values read
    // back identically either way.
    assert!(with_interning.header().string_bytes_written < without_interning.header().string_bytes_written);

    let root = Cursor::root(&with_interning);
    let expected = ["a", "b", "a", "a", "b"];
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(root.child(i as u64).unwrap(), Value::String(want.to_string()));
    }
}

#[test]
fn doubles_and_mixed_numeric_types_round_trip() {
    let text = "[1.5, 2.25, -3.0, 0.0]";
    let image = common::flatten_json(text, &CounterOptions::default());
    let root = Cursor::root(&image);
    let expected = [1.5, 2.25, -3.0, 0.0];
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(root.child(i as u64).unwrap(), Value::Double(*want));
    }
}

#[test]
fn empty_array_and_empty_object_are_well_formed() {
    for text in ["[]", "{}"] {
        let image = common::flatten_json(text, &CounterOptions::default());
        assert!(validate(&image).unwrap().is_empty());
        let root = Cursor::root(&image);
        assert_eq!(root.len(), 0);
    }
}
