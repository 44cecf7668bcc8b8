// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! `Image::from_bytes` under adversarial input.
//!
//! A caller attaching to a shared-memory segment has no guarantee the bytes
//! there came from this crate's own Flattener. Truncated headers, region
//! sizes that overflow `total_bytes`, and type bytes with out-of-range
//! variant tags should all surface as `Err` or as `validate` violations,
//! never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wisent::{validate, Cursor, Image};

fuzz_target!(|data: &[u8]| {
    let Ok(image) = Image::from_bytes(data.to_vec()) else {
        return;
    };

    // validate() must itself never panic on a successfully-attached image,
    // no matter how its header/region bytes were chosen.
    let Ok(_violations) = validate(&image) else {
        return;
    };

    // Walking from the root must not panic even when the image is
    // structurally bogus; every failure mode is a `Result::Err`.
    let header = image.header();
    if header.expression_count == 0 {
        return;
    }
    let root = Cursor::root(&image);
    let _ = root.head();
    for i in 0..root.len().min(64) {
        let _ = root.child(i);
    }
});
