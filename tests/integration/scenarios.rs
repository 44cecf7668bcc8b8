//! The concrete scenarios spec §8 names verbatim (S1, S2, S6 — S3-S5 are
//! codec/column-level and live in `unit/codecs.rs` and `property/`).

use crate::common;
use wisent::{Cursor, CounterOptions, Value};

#[test]
fn s1_object_with_a_bool_list_produces_three_expressions_and_a_packed_span() {
    let image = common::flatten_json(r#"{"a": 1, "b": [true, false, true]}"#, &CounterOptions::default());
    assert_eq!(image.header().expression_count, 3, "Object, `a`, `b`");

    let root = Cursor::root(&image);
    assert_eq!(root.head().unwrap(), "Object");
    assert_eq!(root.child_by_key("a").unwrap(), Value::Long(1));

    let b = root.child_by_key("b").unwrap();
    let Value::Expression(idx) = b else { panic!("expected `b` to be a sub-expression, got {b:?}") };
    let b_cursor = root.get_expression(idx);
    assert_eq!(b_cursor.len(), 3);
    assert_eq!(b_cursor.child(0).unwrap(), Value::Bool(true));
    assert_eq!(b_cursor.child(1).unwrap(), Value::Bool(false));
    assert_eq!(b_cursor.child(2).unwrap(), Value::Bool(true));
}

#[test]
fn s2_thirteen_longs_in_one_span_rle_encode_into_a_single_type_byte() {
    let text = "[[1,2,3,4,5,6,7,8,9,10,11,12,13]]";
    let image = common::flatten_json(text, &CounterOptions::default());

    // One Long type byte (RLE-marked, run length 13) plus the outer List's
    // own type byte for the nested List argument slot.
    assert_eq!(image.header().argument_count, 14);
    assert_eq!(image.header().argument_bytes, 14 * 8);

    let root = Cursor::root(&image);
    let Value::Expression(idx) = root.child(0).unwrap() else { panic!("expected a nested List") };
    let inner = root.get_expression(idx);
    assert_eq!(inner.len(), 13);
    for i in 0..13u64 {
        assert_eq!(inner.child(i).unwrap(), Value::Long(i as i64 + 1));
    }

    // Re-serializing the same source must reproduce the same logical
    // content (bytes differ only in `original_base_address`, which records
    // the allocation's own address and is never expected to match across
    // separate allocations).
    let second = common::flatten_json(text, &CounterOptions::default());
    let second_root = Cursor::root(&second);
    let Value::Expression(second_idx) = second_root.child(0).unwrap() else { panic!("expected a nested List") };
    let second_inner = second_root.get_expression(second_idx);
    for i in 0..13u64 {
        assert_eq!(second_inner.child(i).unwrap(), inner.child(i).unwrap());
    }
}

#[test]
fn s6_dict_encoded_span_preserves_original_order() {
    let text = "[7,7,7,7,5,5,5,5]";
    let opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let image = common::flatten_json(text, &opts);
    assert!(image.header().dictionary_bytes > 0);

    let root = Cursor::root(&image);
    let expected = [7i64, 7, 7, 7, 5, 5, 5, 5];
    for (i, &want) in expected.iter().enumerate() {
        assert_eq!(root.child(i as u64).unwrap(), Value::Long(want));
    }
}
