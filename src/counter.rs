// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! First pass (spec §4.5): walks a `DocNode` tree and produces the exact
//! region sizes `Image::new` needs before a single byte is written.
//!
//! Counting has to agree with `Flattener`'s writing decisions span for
//! span, so `plan_span` here and `write_span` in `flattener.rs` both start
//! from the same `SpanPlan` computed by `plan_run` in this module — one
//! function decides "RLE? dict? what width?", not two.

use crate::document::DocNode;
use crate::image::ImageSizes;
use crate::value::TypeTag;
use std::collections::HashMap;

pub const RLE_MIN: usize = 13;

/// Byte width of one packed dictionary offset, per the span's chosen
/// `DICT_SIZE` bit (spec §4.6 step 3: 0 = 8-bit offsets, 1 = 32-bit). The
/// base index itself lives in its own argument slot ahead of the packed
/// offsets (see `Flattener::write_span`), not in the type array, so this
/// width only governs how many offsets fit per 8-byte slot.
pub fn dict_base_width(width: DictWidth) -> usize {
    match width {
        DictWidth::Offset8 => 1,
        DictWidth::Offset32 => 4,
        DictWidth::None => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictWidth {
    None,
    Offset8,
    Offset32,
}

/// The encoding decided for one run of consecutive same-type leaves, shared
/// verbatim between `Counter` and `Flattener`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanPlan {
    pub tag: TypeTag,
    pub len: usize,
    pub rle: bool,
    pub dict: DictWidth,
    /// Distinct values in first-seen order, only populated when `dict != None`.
    pub dict_values: Vec<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CounterOutput {
    pub sizes: ImageSizes,
    pub per_layer_argument_counts: Vec<u64>,
}

pub struct CounterOptions {
    pub disable_rle: bool,
    pub dict_encode_numeric: bool,
    pub dict_encode_strings: bool,
}

impl Default for CounterOptions {
    fn default() -> Self {
        CounterOptions { disable_rle: false, dict_encode_numeric: false, dict_encode_strings: false }
    }
}

pub struct Counter<'a> {
    opts: &'a CounterOptions,
    per_layer: Vec<u64>,
    seen_strings: HashMap<String, ()>,
    /// Mirrors `Flattener::dict_cursor`: both walk the same tree in the
    /// same order, so the offset-width decision (`Offset8` vs `Offset32`)
    /// a span gets here is exactly the one `Flattener` will make later.
    dict_cursor: u64,
}

impl<'a> Counter<'a> {
    pub fn count(root: &DocNode, opts: &'a CounterOptions) -> CounterOutput {
        let mut counter = Counter { opts, per_layer: Vec::new(), seen_strings: HashMap::new(), dict_cursor: 0 };
        let mut sizes = ImageSizes::default();
        counter.visit(root, 0, &mut sizes);
        CounterOutput { sizes, per_layer_argument_counts: counter.per_layer }
    }

    fn bump_layer(&mut self, depth: usize, n: u64) {
        if self.per_layer.len() <= depth {
            self.per_layer.resize(depth + 1, 0);
        }
        self.per_layer[depth] += n;
    }

    fn visit(&mut self, node: &DocNode, depth: usize, sizes: &mut ImageSizes) {
        let DocNode::Expr { head, children } = node else {
            return;
        };
        sizes.expression_count += 1;
        sizes.string_bytes += self.account_string(&crate::value::Value::Symbol(head.clone()));

        let mut i = 0;
        while i < children.len() {
            match &children[i] {
                DocNode::Expr { .. } => {
                    sizes.argument_count += 1;
                    sizes.argument_bytes += 8;
                    self.bump_layer(depth + 1, 1);
                    self.visit(&children[i], depth + 1, sizes);
                    i += 1;
                }
                DocNode::Leaf(first) => {
                    let mut j = i + 1;
                    while j < children.len() && children[i].is_leaf_of_same_tag(&children[j]) {
                        j += 1;
                    }
                    let run = &children[i..j];
                    self.bump_layer(depth + 1, run.len() as u64);
                    let plan = plan_run(run, first.type_tag(), self.opts, self.dict_cursor);
                    sizes.argument_count += plan.len as u64;
                    sizes.argument_bytes += run_slot_bytes(&plan);
                    if plan.dict != DictWidth::None {
                        sizes.dictionary_bytes += 8 * plan.dict_values.len() as u64;
                        self.dict_cursor += plan.dict_values.len() as u64;
                    }
                    for leaf_node in run {
                        if let DocNode::Leaf(v) = leaf_node {
                            sizes.string_bytes += self.account_string(v);
                        }
                    }
                    i = j;
                }
            }
        }
    }

    /// Returns the bytes this occurrence adds to the string region: its
    /// length plus one NUL, or zero if dict-encoding is on and this exact
    /// string was already interned earlier in the same document.
    ///
    /// `ByteArray` leaves (compressed page bodies; see spec §3.1's note
    /// that the type is reserved for that use) share the same region but
    /// are length-prefixed (8 bytes LE) instead of NUL-terminated, since
    /// their content may contain embedded zero bytes, and are never
    /// deduplicated.
    fn account_string(&mut self, value: &crate::value::Value) -> u64 {
        use crate::value::Value;
        match value {
            Value::String(s) | Value::Symbol(s) => {
                if self.opts.dict_encode_strings {
                    if self.seen_strings.contains_key(s) {
                        return 0;
                    }
                    self.seen_strings.insert(s.clone(), ());
                }
                s.len() as u64 + 1
            }
            Value::ByteArray(bytes) => 8 + bytes.len() as u64,
            _ => 0,
        }
    }
}

/// Decides the span encoding for a run of `len` consecutive same-type
/// leaves (spec §4.6 steps 2-4). Shared by `Counter::visit` and
/// `Flattener::write_span`. `dict_cursor` is the running dictionary-entry
/// count *before* this span, needed to pick an offset width the base index
/// actually fits in.
pub fn plan_run(run: &[DocNode], tag: TypeTag, opts: &CounterOptions, dict_cursor: u64) -> SpanPlan {
    let len = run.len();
    let rle = !opts.disable_rle && len >= RLE_MIN;

    let numeric_like = matches!(tag, TypeTag::Long | TypeTag::Double | TypeTag::Int | TypeTag::Short);
    let dict = if opts.dict_encode_numeric && numeric_like {
        let mut seen: Vec<u64> = Vec::new();
        for node in run {
            if let DocNode::Leaf(v) = node {
                let raw = raw_bits(v);
                if !seen.contains(&raw) {
                    seen.push(raw);
                }
            }
        }
        let width = if dict_cursor + seen.len() as u64 <= 255 { DictWidth::Offset8 } else { DictWidth::Offset32 };
        if seen.len() < len / 2 && seen.len() <= 255 {
            SpanPlanDict::Found(seen, width)
        } else {
            SpanPlanDict::None
        }
    } else {
        SpanPlanDict::None
    };

    match dict {
        SpanPlanDict::Found(values, width) => SpanPlan { tag, len, rle, dict: width, dict_values: values },
        SpanPlanDict::None => SpanPlan { tag, len, rle, dict: DictWidth::None, dict_values: Vec::new() },
    }
}

enum SpanPlanDict {
    Found(Vec<u64>, DictWidth),
    None,
}

/// Matches `flattener::raw_bits_of`'s zero-extended bit pattern exactly:
/// dictionary values must compare equal to the bits `write_packed_span`
/// actually writes, not a sign-extended 64-bit reinterpretation.
fn raw_bits(value: &crate::value::Value) -> u64 {
    use crate::value::Value;
    match value {
        Value::Long(n) => *n as u64,
        Value::Double(d) => d.to_bits(),
        Value::Int(n) => (*n as u32) as u64,
        Value::Short(n) => (*n as u16) as u64,
        _ => 0,
    }
}

/// Number of argument-value bytes a planned span occupies: one 8-byte slot
/// per `vals_per_slot` packed values, plus one more slot up front holding
/// the dictionary base index when dict-encoded.
pub fn run_slot_bytes(plan: &SpanPlan) -> u64 {
    let width = match plan.dict {
        DictWidth::None => plan.tag.element_width(),
        DictWidth::Offset8 => 1,
        DictWidth::Offset32 => 4,
    };
    let vals_per_slot = (8 / width).max(1);
    let slots = (plan.len as u64 + vals_per_slot as u64 - 1) / vals_per_slot as u64;
    let base_slot = if plan.dict != DictWidth::None { 1 } else { 0 };
    (slots + base_slot) * 8
}
