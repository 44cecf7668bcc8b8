// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Consumer-side reader (spec §4.7): a `Cursor` positioned at a sub-expression
//! materializes its children, spans, and nested expressions on demand,
//! decoding RLE and dictionary encoding lazily rather than up front.
//!
//! The original walks a Cursor by scanning backward up to `RLE_MIN - 1`
//! bytes to find the control byte governing the type position it's
//! currently sitting on — useful when a cursor can start mid-run from an
//! mmap'd offset with no other context. Here a `Cursor` always owns the full
//! `ComplexExpression` it belongs to, so the same answer comes from a single
//! forward scan over `[start_type, end_type)` from the beginning: every run
//! in that range claims exactly as many type-byte slots as its own logical
//! length (`Counter`/`Flattener` both guarantee this), so walking forward
//! and summing run lengths always lands on the right run without needing to
//! search backward for one.

use crate::counter::{dict_base_width, DictWidth};
use crate::error::{Result, WisentError};
use crate::image::Image;
use crate::value::{ComplexExpression, TypeTag, Value};

const RLE_BIT: u8 = 0x80;
const DICT_BIT: u8 = 0x40;
const DICT_WIDTH_BIT: u8 = 0x20;

/// One run decoded from the type array: a contiguous range of logical
/// positions sharing one encoding (inline, RLE, DICT, or RLE+DICT).
#[derive(Debug, Clone, Copy)]
struct RunLoc {
    start_logical: u64,
    run_len: u64,
    tag: TypeTag,
    rle: bool,
    dict_width: DictWidth,
    /// Argument slot holding the dictionary base index, when dict-encoded.
    dict_base_slot: Option<u64>,
    /// First argument slot of this run's packed values (after the dict
    /// base slot, if any).
    arg_values_start: u64,
}

/// A fully materialized run, as returned by `Cursor::as_span`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSpan {
    pub tag: TypeTag,
    pub values: Vec<Value>,
}

/// Positioned at one sub-expression of an `Image`. Cheap to copy; all
/// decoding happens in the accessor methods, not at construction.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    image: &'a Image,
    expr_index: u64,
}

impl<'a> Cursor<'a> {
    pub fn root(image: &'a Image) -> Cursor<'a> {
        Cursor { image, expr_index: 0 }
    }

    pub fn at(image: &'a Image, expr_index: u64) -> Cursor<'a> {
        Cursor { image, expr_index }
    }

    pub fn expr_index(&self) -> u64 {
        self.expr_index
    }

    fn expr(&self) -> ComplexExpression {
        self.image.read_sub_expression(self.expr_index)
    }

    pub fn head(&self) -> Result<String> {
        read_cstr(self.image, self.expr().head_offset)
    }

    /// Number of logical children this expression has. Every logical
    /// position claims exactly one type-byte slot, RLE/DICT runs included,
    /// so this is simply the type range's width.
    pub fn len(&self) -> u64 {
        let expr = self.expr();
        expr.end_type - expr.start_type
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forward scan over this expression's whole `[start_type, end_type)`
    /// range, grouping positions into runs.
    fn runs(&self) -> Result<Vec<RunLoc>> {
        let expr = self.expr();
        let types = self.image.argument_types();
        let mut pos = expr.start_type;
        let mut arg = expr.start_arg;
        let mut logical = 0u64;
        let mut out = Vec::new();

        while pos < expr.end_type {
            let tag_byte = types[pos as usize];
            let tag = TypeTag::from_bits(tag_byte)
                .ok_or(WisentError::Corrupt("type byte has an out-of-range variant tag"))?;
            let rle = tag_byte & RLE_BIT != 0;
            let dict_width = if tag_byte & DICT_BIT == 0 {
                DictWidth::None
            } else if tag_byte & DICT_WIDTH_BIT != 0 {
                DictWidth::Offset32
            } else {
                DictWidth::Offset8
            };

            let run_len = if rle {
                let start = (pos + 1) as usize;
                let end = start + 4;
                if end > types.len() {
                    return Err(WisentError::Truncated("rle run length runs past the type array"));
                }
                u32::from_le_bytes(types[start..end].try_into().unwrap()) as u64
            } else {
                let mut k = 1u64;
                while pos + k < expr.end_type && types[(pos + k) as usize] == tag_byte {
                    k += 1;
                }
                k
            };

            let dict_base_slot = if dict_width != DictWidth::None { Some(arg) } else { None };
            let arg_values_start = if dict_base_slot.is_some() { arg + 1 } else { arg };
            let value_width = match dict_width {
                DictWidth::None => tag.element_width(),
                DictWidth::Offset8 | DictWidth::Offset32 => dict_base_width(dict_width),
            };
            let vals_per_slot = (8 / value_width).max(1) as u64;
            let slots = (run_len + vals_per_slot - 1) / vals_per_slot;
            let total_arg_slots = slots + if dict_base_slot.is_some() { 1 } else { 0 };

            out.push(RunLoc { start_logical: logical, run_len, tag, rle, dict_width, dict_base_slot, arg_values_start });

            pos += run_len;
            arg += total_arg_slots;
            logical += run_len;
        }
        Ok(out)
    }

    fn run_containing(&self, target: u64) -> Result<(RunLoc, u64)> {
        let runs = self.runs()?;
        for run in runs {
            if target < run.start_logical + run.run_len {
                return Ok((run, target - run.start_logical));
            }
        }
        Err(WisentError::OutOfRange { index: target as usize, len: self.len() as usize })
    }

    /// The variant tag stored at logical position `i`.
    pub fn current_type(&self, i: u64) -> Result<TypeTag> {
        Ok(self.run_containing(i)?.0.tag)
    }

    /// Run length if position `i` belongs to an RLE run, else 0.
    pub fn is_rle(&self, i: u64) -> Result<u64> {
        let (run, _) = self.run_containing(i)?;
        Ok(if run.rle { run.run_len } else { 0 })
    }

    /// `(base_dict_index, offset_width_bytes)` if position `i` belongs to a
    /// dict-encoded run, else `(0, 0)`.
    pub fn is_dict_encoded(&self, i: u64) -> Result<(u64, u8)> {
        let (run, _) = self.run_containing(i)?;
        match run.dict_base_slot {
            Some(slot) => {
                let base = self.image.read_argument_slot(slot);
                Ok((base, dict_base_width(run.dict_width) as u8))
            }
            None => Ok((0, 0)),
        }
    }

    /// Materializes the value at logical child index `i`.
    pub fn child(&self, i: u64) -> Result<Value> {
        let (run, idx_in_run) = self.run_containing(i)?;
        value_at(self.image, &run, idx_in_run)
    }

    /// Looks up an object-style child by key. Mirrors `document::kv`: a key
    /// is stored as an `Expression` child whose own sole child is the value.
    pub fn child_by_key(&self, name: &str) -> Result<Value> {
        for i in 0..self.len() {
            if self.current_type(i)? != TypeTag::Expression {
                continue;
            }
            let Value::Expression(idx) = self.child(i)? else { unreachable!() };
            let inner = Cursor::at(self.image, idx);
            if inner.head()? == name {
                return inner.child(0);
            }
        }
        Err(WisentError::OutOfRange { index: 0, len: self.len() as usize })
    }

    pub fn get_expression(&self, idx: u64) -> Cursor<'a> {
        Cursor::at(self.image, idx)
    }

    /// O(1) random access into one logical position, independent of
    /// bit-packing or dict-encoding.
    pub fn as_span_at(&self, i: u64) -> Result<Value> {
        self.child(i)
    }

    /// Gathers an arbitrary index set, run lookups included (no better than
    /// `O(k * runs)`, but every run lookup is itself O(runs) and runs are
    /// few compared to values in the spans this format is built for).
    pub fn as_span_with_indices(&self, indices: &[u64]) -> Result<Vec<Value>> {
        indices.iter().map(|&i| self.as_span_at(i)).collect()
    }

    /// Materializes every run of this expression as an owned `TypedSpan`,
    /// decoding RLE and DICT in full.
    pub fn as_span(&self) -> Result<Vec<TypedSpan>> {
        self.runs()?
            .into_iter()
            .map(|run| {
                let values = (0..run.run_len)
                    .map(|i| value_at(self.image, &run, i))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypedSpan { tag: run.tag, values })
            })
            .collect()
    }
}

fn value_at(image: &Image, run: &RunLoc, idx_in_run: u64) -> Result<Value> {
    let width = match run.dict_width {
        DictWidth::None => run.tag.element_width(),
        DictWidth::Offset8 | DictWidth::Offset32 => dict_base_width(run.dict_width),
    };
    let vals_per_slot = (8 / width).max(1) as u64;
    let slot_idx = idx_in_run / vals_per_slot;
    let within = idx_in_run % vals_per_slot;
    let slot_bits = image.read_argument_slot(run.arg_values_start + slot_idx);
    let shift = (vals_per_slot - 1 - within) * width as u64 * 8;
    let raw = (slot_bits >> shift) & mask_for_width(width);

    let raw = match run.dict_base_slot {
        Some(slot) => {
            let base = image.read_argument_slot(slot);
            image.read_dictionary_entry(base + raw)
        }
        None => raw,
    };
    decode_tag(image, run.tag, raw)
}

fn mask_for_width(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

fn decode_tag(image: &Image, tag: TypeTag, raw: u64) -> Result<Value> {
    Ok(match tag {
        TypeTag::Bool => Value::Bool(raw != 0),
        TypeTag::Char => Value::Char(raw as u8 as i8),
        TypeTag::Short => Value::Short((raw as u16) as i16),
        TypeTag::Int => Value::Int((raw as u32) as i32),
        TypeTag::Long => Value::Long(raw as i64),
        TypeTag::Float => Value::Float(f32::from_bits(raw as u32)),
        TypeTag::Double => Value::Double(f64::from_bits(raw)),
        TypeTag::Expression => Value::Expression(raw),
        TypeTag::String => Value::String(read_cstr(image, raw)?),
        TypeTag::Symbol => Value::Symbol(read_cstr(image, raw)?),
        TypeTag::ByteArray => Value::ByteArray(read_byte_array(image, raw)?),
    })
}

fn read_cstr(image: &Image, offset: u64) -> Result<String> {
    let region = image.string_region();
    let start = offset as usize;
    let rel_end = region
        .get(start..)
        .and_then(|tail| tail.iter().position(|&b| b == 0))
        .ok_or(WisentError::Truncated("unterminated string in string region"))?;
    Ok(String::from_utf8_lossy(&region[start..start + rel_end]).into_owned())
}

fn read_byte_array(image: &Image, offset: u64) -> Result<Vec<u8>> {
    let region = image.string_region();
    let start = offset as usize;
    let len_bytes = region
        .get(start..start + 8)
        .ok_or(WisentError::Truncated("byte array length prefix runs past the string region"))?;
    let len = u64::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
    region
        .get(start + 8..start + 8 + len)
        .map(|b| b.to_vec())
        .ok_or(WisentError::Truncated("byte array body runs past the string region"))
}
