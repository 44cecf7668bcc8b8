// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Mod-256 prefix delta (spec §4.2.2).
//!
//! Structural, not compressive by itself — it turns a nearly-sorted integer
//! column into small, repetitive deltas that a following codec (LZ77,
//! Huffman, FSE) can actually shrink. `sorex::binary::postings` uses the
//! same trick one level up (delta-encoding doc IDs before varint-packing
//! them); this is the byte-level analogue used as a pipeline pre-stage.

use crate::error::{Result, WisentError};

pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(WisentError::EmptyInput);
    }
    let mut output = Vec::with_capacity(input.len());
    output.push(input[0]);
    for i in 1..input.len() {
        output.push(input[i].wrapping_sub(input[i - 1]));
    }
    Ok(output)
}

pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(WisentError::EmptyInput);
    }
    let mut output = Vec::with_capacity(input.len());
    output.push(input[0]);
    for i in 1..input.len() {
        let prev = output[i - 1];
        output.push(prev.wrapping_add(input[i]));
    }
    Ok(output)
}
