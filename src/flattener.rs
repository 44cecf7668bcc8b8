// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Second pass (spec §4.6): walks the same `DocNode` tree `Counter` already
//! sized and writes every byte of the `Image`.
//!
//! Cursors (`arg_cursor`, `type_cursor`, `expr_cursor`, `dict_cursor`) only
//! ever move forward; `Counter::count` on the same tree guarantees they
//! land exactly on `sizes.{argument_count, dictionary_bytes, expression_count}`
//! when the walk completes, because both passes group leaves into runs the
//! same way (`plan_run`, shared from `counter.rs`).

use crate::counter::{plan_run, CounterOptions, DictWidth, SpanPlan};
use crate::document::DocNode;
use crate::error::Result;
use crate::image::{Image, ImageSizes};
use crate::value::{ComplexExpression, TypeTag, Value};
use std::collections::HashMap;

const RLE_BIT: u8 = 0x80;
const DICT_BIT: u8 = 0x40;
const DICT_WIDTH_BIT: u8 = 0x20;

pub struct Flattener<'a> {
    opts: &'a CounterOptions,
    image: Image,
    arg_cursor: u64,
    type_cursor: u64,
    expr_cursor: u64,
    dict_cursor: u64,
    string_cursor: u64,
    interned: HashMap<String, u64>,
}

impl<'a> Flattener<'a> {
    /// Allocates an `Image` sized by `sizes` and writes `root` into it.
    pub fn flatten(root: &DocNode, sizes: ImageSizes, opts: &'a CounterOptions) -> Result<Image> {
        let image = Image::new(sizes)?;
        let mut flattener = Flattener {
            opts,
            image,
            arg_cursor: 0,
            type_cursor: 0,
            expr_cursor: 0,
            dict_cursor: 0,
            string_cursor: 0,
            interned: HashMap::new(),
        };
        // The root expression occupies sub-expression slot 0 but is not
        // itself referenced by any parent argument slot.
        flattener.write_expr(root)?;
        flattener.image.set_string_bytes_written(flattener.string_cursor);
        Ok(flattener.image)
    }

    fn intern(&mut self, s: &str) -> u64 {
        if self.opts.dict_encode_strings {
            if let Some(&offset) = self.interned.get(s) {
                return offset;
            }
        }
        let offset = self.string_cursor;
        let bytes = s.as_bytes();
        let region = self.image.string_region_mut();
        region[offset as usize..offset as usize + bytes.len()].copy_from_slice(bytes);
        region[offset as usize + bytes.len()] = 0;
        self.string_cursor += bytes.len() as u64 + 1;
        if self.opts.dict_encode_strings {
            self.interned.insert(s.to_string(), offset);
        }
        offset
    }

    /// Length-prefixed (not NUL-terminated) interning for `ByteArray`
    /// leaves, which may contain embedded zero bytes; never deduplicated.
    fn intern_bytes(&mut self, bytes: &[u8]) -> u64 {
        let offset = self.string_cursor;
        let region = self.image.string_region_mut();
        let len = bytes.len() as u64;
        region[offset as usize..offset as usize + 8].copy_from_slice(&len.to_le_bytes());
        region[offset as usize + 8..offset as usize + 8 + bytes.len()].copy_from_slice(bytes);
        self.string_cursor += 8 + bytes.len() as u64;
        offset
    }

    /// Writes `node` (an `Expr`) as a sub-expression row, recursing into its
    /// children, and returns the sub-expression index it was written at.
    fn write_expr(&mut self, node: &DocNode) -> Result<u64> {
        let DocNode::Expr { head, children } = node else {
            unreachable!("write_expr called on a Leaf");
        };
        let my_index = self.expr_cursor;
        self.expr_cursor += 1;
        let head_offset = self.intern(head);
        let start_arg = self.arg_cursor;
        let start_type = self.type_cursor;

        // Reserve the row now so nested writes (which may push the
        // sub-expression cursor further) don't invalidate this index.
        self.image.write_sub_expression(
            my_index,
            &ComplexExpression { head_offset, start_arg, end_arg: start_arg, start_type, end_type: start_type },
        );

        let mut i = 0;
        while i < children.len() {
            match &children[i] {
                DocNode::Expr { .. } => {
                    let child_index = self.write_expr(&children[i])?;
                    self.write_value_slot(Value::Expression(child_index));
                    i += 1;
                }
                DocNode::Leaf(first) => {
                    let mut j = i + 1;
                    while j < children.len() && children[i].is_leaf_of_same_tag(&children[j]) {
                        j += 1;
                    }
                    let run = &children[i..j];
                    self.write_span(run, first.type_tag())?;
                    i = j;
                }
            }
        }

        let end_arg = self.arg_cursor;
        let end_type = self.type_cursor;
        self.image.write_sub_expression(
            my_index,
            &ComplexExpression { head_offset, start_arg, end_arg, start_type, end_type },
        );
        Ok(my_index)
    }

    fn write_value_slot(&mut self, value: Value) {
        let slot = self.arg_cursor;
        self.image.write_argument_slot(slot, value_to_bits(&value));
        self.arg_cursor += 1;
        self.write_type_byte(value.type_tag() as u8);
    }

    fn write_type_byte(&mut self, raw: u8) {
        let idx = self.type_cursor as usize;
        self.image.argument_types_mut()[idx] = raw;
        self.type_cursor += 1;
    }

    /// Writes one raw 8-byte argument slot with no accompanying type byte,
    /// used for the dictionary base index a DICT-encoded span reserves
    /// ahead of its packed offsets.
    fn write_argument_slot_raw(&mut self, value: u64) {
        let slot = self.arg_cursor;
        self.image.write_argument_slot(slot, value);
        self.arg_cursor += 1;
    }

    fn write_span(&mut self, run: &[DocNode], tag: TypeTag) -> Result<()> {
        let plan = plan_run(run, tag, self.opts, self.dict_cursor);
        let values: Vec<&Value> = run
            .iter()
            .map(|n| match n {
                DocNode::Leaf(v) => v,
                DocNode::Expr { .. } => unreachable!("run contains only leaves"),
            })
            .collect();

        let raws: Vec<u64> = values.iter().map(|v| self.raw_value(v)).collect();

        let base_type_index = self.type_cursor;
        let mut tag_byte = tag as u8;
        if plan.rle {
            tag_byte |= RLE_BIT;
        }
        if plan.dict != DictWidth::None {
            tag_byte |= DICT_BIT;
            if plan.dict == DictWidth::Offset32 {
                tag_byte |= DICT_WIDTH_BIT;
            }
        }
        self.write_type_byte(tag_byte);

        if plan.rle {
            let len = plan.len as u32;
            for b in len.to_le_bytes() {
                self.write_type_byte(b);
            }
        }

        let dict_base = if plan.dict != DictWidth::None {
            let base = self.dict_cursor;
            for raw in &plan.dict_values {
                self.image.write_dictionary_entry(self.dict_cursor, *raw);
                self.dict_cursor += 1;
            }
            Some(base)
        } else {
            None
        };

        // An inline run (no RLE) has no length control byte to fall back
        // on, so every logical value needs its own literal tag byte — a
        // reader has nothing else to scan. An RLE run is identified by its
        // control byte alone; the remaining reserved slots are never read
        // and stay zeroed. DICT never touches the type array: its base
        // index lives in its own argument slot instead (see below), so it
        // doesn't affect how many type bytes this run actually needs.
        let written_so_far = (self.type_cursor - base_type_index) as usize;
        let filler = if plan.rle { 0 } else { tag_byte };
        for _ in written_so_far..plan.len {
            self.write_type_byte(filler);
        }

        if let Some(base) = dict_base {
            self.write_argument_slot_raw(base);
        }
        self.write_packed_span(&raws, &plan, dict_base.map(|b| (b, plan.dict_values.as_slice())));
        Ok(())
    }

    /// Resolves a leaf value to the u64 an argument slot actually stores:
    /// the value itself for fixed-width types, or an offset into the
    /// string/byte region for `String`/`Symbol`/`ByteArray`.
    fn raw_value(&mut self, value: &Value) -> u64 {
        match value {
            Value::String(s) | Value::Symbol(s) => self.intern(s),
            Value::ByteArray(bytes) => self.intern_bytes(bytes),
            other => raw_bits_of(other),
        }
    }

    /// Writes the argument-value slots for one run, bit-packing narrow
    /// values (or dictionary offsets) per spec §4.6 step 4.
    fn write_packed_span(&mut self, values: &[u64], plan: &SpanPlan, dict: Option<(u64, &[u64])>) {
        let width = match (plan.dict, dict) {
            (DictWidth::Offset8, Some(_)) => 1usize,
            (DictWidth::Offset32, Some(_)) => 4,
            _ => plan.tag.element_width(),
        };
        let vals_per_slot = (8 / width).max(1);
        let base_slot = self.arg_cursor;
        let slots_needed = (values.len() + vals_per_slot - 1) / vals_per_slot;

        for i in 0..slots_needed {
            let mut slot_bits: u64 = 0;
            for k in 0..vals_per_slot {
                let idx = i * vals_per_slot + k;
                if idx >= values.len() {
                    break;
                }
                let raw = if let Some((dict_base, dict_values)) = dict {
                    let pos = dict_values.iter().position(|v| *v == values[idx]).unwrap_or(0);
                    dict_base + pos as u64
                } else {
                    values[idx]
                };
                let shift = (vals_per_slot - 1 - k) * width * 8;
                slot_bits |= (raw & mask_for_width(width)) << shift;
            }
            self.image.write_argument_slot(base_slot + i as u64, slot_bits);
        }
        self.arg_cursor += slots_needed as u64;
    }
}

fn mask_for_width(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

fn raw_bits_of(value: &Value) -> u64 {
    match value {
        Value::Bool(b) => *b as u64,
        Value::Char(c) => *c as u8 as u64,
        Value::Short(n) => (*n as u16) as u64,
        Value::Int(n) => (*n as u32) as u64,
        Value::Long(n) => *n as u64,
        Value::Float(f) => f.to_bits() as u64,
        Value::Double(d) => d.to_bits(),
        Value::Expression(idx) => *idx,
        Value::String(_) | Value::Symbol(_) | Value::ByteArray(_) => 0,
    }
}

fn value_to_bits(value: &Value) -> u64 {
    raw_bits_of(value)
}
