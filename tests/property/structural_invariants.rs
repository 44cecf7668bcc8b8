//! Structural invariants (spec §8 properties 4-9) and random access
//! (property 10), checked over a spread of generated documents.

use crate::common;
use proptest::prelude::*;
use wisent::{validate, Cursor, CounterOptions};

fn arb_json_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i64>().prop_map(|n| n.to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        "[a-z]{0,8}".prop_map(|s| format!("\"{s}\"")),
    ]
}

fn arb_json_array() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_json_leaf(), 0..40).prop_map(|leaves| format!("[{}]", leaves.join(",")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Properties 4-9: every flattened image from a well-formed document
    /// passes structural validation, with or without RLE/dict-encoding.
    #[test]
    fn prop_generated_arrays_flatten_to_well_formed_images(text in arb_json_array()) {
        for opts in [
            CounterOptions::default(),
            CounterOptions { disable_rle: true, ..CounterOptions::default() },
            CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() },
            CounterOptions { dict_encode_strings: true, ..CounterOptions::default() },
        ] {
            let image = common::flatten_json(&text, &opts);
            let violations = validate(&image).unwrap();
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Property 8: `string_bytes_written` never exceeds the allocated string region.
    #[test]
    fn prop_string_bytes_written_never_exceeds_the_region(text in arb_json_array()) {
        let image = common::flatten_json(&text, &CounterOptions::default());
        prop_assert!(image.header().string_bytes_written <= image.string_region().len() as u64);
    }

    /// Property 10: for a span materialized as a whole, indexing it one
    /// element at a time agrees with the whole-span read.
    #[test]
    fn prop_as_span_at_matches_whole_span_materialization(text in arb_json_array()) {
        let image = common::flatten_json(&text, &CounterOptions::default());
        let root = Cursor::root(&image);
        if let Ok(spans) = root.as_span() {
            let mut offset = 0u64;
            for span in &spans {
                for (i, want) in span.values.iter().enumerate() {
                    let at = root.as_span_at(offset + i as u64).unwrap();
                    prop_assert_eq!(&at, want);
                }
                offset += span.values.len() as u64;
            }
        }
    }
}
