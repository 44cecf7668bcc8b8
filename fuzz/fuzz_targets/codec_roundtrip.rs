// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Every codec's `decompress` under adversarial (not necessarily
//! `compress`-produced) input, and the round-trip law for input the codec
//! itself produced (spec §8, property 2).

#![no_main]

use libfuzzer_sys::fuzz_target;
use wisent::codec::CodecKind;

const CODECS: &[CodecKind] =
    &[CodecKind::Rle, CodecKind::Delta, CodecKind::Lz77, CodecKind::Huffman, CodecKind::Fse];

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    for &codec in CODECS {
        // Arbitrary bytes fed straight to decompress must never panic,
        // regardless of whether they're a valid encoding for this codec.
        let _ = codec.decompress(data);

        // Round-trip: whatever this codec itself produces from `data`
        // must decompress back to exactly `data`.
        if let Ok(compressed) = codec.compress(data) {
            match codec.decompress(&compressed) {
                Ok(restored) => assert_eq!(restored, data, "{} round-trip mismatch", codec.tag()),
                Err(e) => panic!("{} failed to decompress its own output: {e}", codec.tag()),
            }
        }
    }
});
