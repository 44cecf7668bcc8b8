// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! The binary image: one contiguous, native-endian byte buffer holding a
//! header, an argument-value array, an argument-type array, a sub-expression
//! table, a dictionary region, and a string region (spec §3.2/§6.1).
//!
//! `Image` owns the `Arena` that backs the buffer and the `ImageLayout` that
//! locates every region inside it. Reading back out of a plain `Vec<u8>`
//! (e.g. after loading a file, or after attaching to a shared-memory
//! segment) goes through `Image::from_bytes`, which re-derives the layout
//! from the header rather than trusting a caller-supplied one — mirroring
//! how the teacher's `SorexHeader::section_offsets()` is always recomputed
//! from the bytes on disk, never cached across a potential relocation.

pub mod layout;

use crate::arena::Arena;
use crate::error::{Result, WisentError};
use crate::value::ComplexExpression;
pub use layout::{ImageLayout, ImageSizes, HEADER_SIZE, SUB_EXPRESSION_RECORD_SIZE};

/// The fixed 48-byte header (spec §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageHeader {
    pub argument_count: u64,
    pub argument_bytes: u64,
    pub expression_count: u64,
    pub dictionary_bytes: u64,
    pub original_base_address: u64,
    pub string_bytes_written: u64,
}

impl ImageHeader {
    pub fn read(bytes: &[u8]) -> Result<ImageHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(WisentError::Truncated("image header"));
        }
        let get = |off: usize| u64::from_ne_bytes(bytes[off..off + 8].try_into().unwrap());
        Ok(ImageHeader {
            argument_count: get(0),
            argument_bytes: get(8),
            expression_count: get(16),
            dictionary_bytes: get(24),
            original_base_address: get(32),
            string_bytes_written: get(40),
        })
    }

    pub fn write(&self, bytes: &mut [u8]) {
        debug_assert!(bytes.len() >= HEADER_SIZE);
        bytes[0..8].copy_from_slice(&self.argument_count.to_ne_bytes());
        bytes[8..16].copy_from_slice(&self.argument_bytes.to_ne_bytes());
        bytes[16..24].copy_from_slice(&self.expression_count.to_ne_bytes());
        bytes[24..32].copy_from_slice(&self.dictionary_bytes.to_ne_bytes());
        bytes[32..40].copy_from_slice(&self.original_base_address.to_ne_bytes());
        bytes[40..48].copy_from_slice(&self.string_bytes_written.to_ne_bytes());
    }
}

/// A complete, self-describing image. `SerializerDriver`/`Flattener` build
/// one with `Image::new`; `LazyView` reads one built elsewhere with
/// `Image::from_bytes`.
#[derive(Debug)]
pub struct Image {
    arena: Arena,
    layout: ImageLayout,
}

impl Image {
    /// Allocate a fresh image sized exactly by `sizes` (the Counter's
    /// output). The header is written immediately so `header()` is valid
    /// even before the Flattener has filled in the regions.
    pub fn new(sizes: ImageSizes) -> Result<Image> {
        let layout = ImageLayout::new(sizes);
        let mut arena = Arena::new();
        arena.alloc(layout.total_bytes as usize)?;
        let header = ImageHeader {
            argument_count: sizes.argument_count,
            argument_bytes: sizes.argument_bytes,
            expression_count: sizes.expression_count,
            dictionary_bytes: sizes.dictionary_bytes,
            original_base_address: arena.original_base_address(),
            // Filled in by the Flattener once interning completes; the
            // Counter's `string_bytes` is only an upper-bound capacity.
            string_bytes_written: 0,
        };
        header.write(arena.as_mut_slice());
        Ok(Image { arena, layout })
    }

    /// Attach to an existing byte buffer (e.g. a shared-memory mapping or a
    /// file read into memory) without re-running the serializer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Image> {
        let header = ImageHeader::read(&bytes)?;
        let sizes = ImageSizes {
            argument_count: header.argument_count,
            argument_bytes: header.argument_bytes,
            expression_count: header.expression_count,
            dictionary_bytes: header.dictionary_bytes,
            string_bytes: header.string_bytes_written,
        };
        let layout = ImageLayout::new(sizes);
        if (bytes.len() as u64) < layout.total_bytes {
            return Err(WisentError::Truncated("image body shorter than header implies"));
        }
        let mut arena = Arena::new();
        arena.alloc(bytes.len())?;
        arena.as_mut_slice().copy_from_slice(&bytes);
        Ok(Image { arena, layout })
    }

    pub fn header(&self) -> ImageHeader {
        ImageHeader::read(self.arena.as_slice()).expect("header was written at construction")
    }

    pub fn set_string_bytes_written(&mut self, n: u64) {
        let mut header = self.header();
        header.string_bytes_written = n;
        header.write(self.arena.as_mut_slice());
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.arena.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.arena.into_bytes()
    }

    // -- region accessors -----------------------------------------------

    pub fn argument_values(&self) -> &[u8] {
        &self.arena.as_slice()[self.layout.argument_values_range()]
    }

    pub fn argument_values_mut(&mut self) -> &mut [u8] {
        let range = self.layout.argument_values_range();
        &mut self.arena.as_mut_slice()[range]
    }

    pub fn argument_types(&self) -> &[u8] {
        &self.arena.as_slice()[self.layout.argument_types_range()]
    }

    pub fn argument_types_mut(&mut self) -> &mut [u8] {
        let range = self.layout.argument_types_range();
        &mut self.arena.as_mut_slice()[range]
    }

    pub fn dictionary(&self) -> &[u8] {
        &self.arena.as_slice()[self.layout.dictionary_range()]
    }

    pub fn dictionary_mut(&mut self) -> &mut [u8] {
        let range = self.layout.dictionary_range();
        &mut self.arena.as_mut_slice()[range]
    }

    pub fn string_region(&self) -> &[u8] {
        let written = self.header().string_bytes_written as usize;
        &self.arena.as_slice()[self.layout.string_offset as usize..][..written]
    }

    pub fn string_region_mut(&mut self) -> &mut [u8] {
        let range = self.layout.string_range();
        &mut self.arena.as_mut_slice()[range]
    }

    // -- argument slots (8-byte, possibly bit-packed) --------------------

    pub fn read_argument_slot(&self, slot_index: u64) -> u64 {
        let off = (slot_index * 8) as usize;
        u64::from_ne_bytes(self.argument_values()[off..off + 8].try_into().unwrap())
    }

    pub fn write_argument_slot(&mut self, slot_index: u64, value: u64) {
        let off = (slot_index * 8) as usize;
        self.argument_values_mut()[off..off + 8].copy_from_slice(&value.to_ne_bytes());
    }

    // -- sub-expression table --------------------------------------------

    pub fn read_sub_expression(&self, index: u64) -> ComplexExpression {
        let base = (index as usize) * SUB_EXPRESSION_RECORD_SIZE;
        let table = self.sub_expressions_bytes();
        let get = |off: usize| u64::from_ne_bytes(table[base + off..base + off + 8].try_into().unwrap());
        ComplexExpression {
            head_offset: get(0),
            start_arg: get(8),
            end_arg: get(16),
            start_type: get(24),
            end_type: get(32),
        }
    }

    pub fn write_sub_expression(&mut self, index: u64, expr: &ComplexExpression) {
        let base = (index as usize) * SUB_EXPRESSION_RECORD_SIZE;
        let table = self.sub_expressions_bytes_mut();
        table[base..base + 8].copy_from_slice(&expr.head_offset.to_ne_bytes());
        table[base + 8..base + 16].copy_from_slice(&expr.start_arg.to_ne_bytes());
        table[base + 16..base + 24].copy_from_slice(&expr.end_arg.to_ne_bytes());
        table[base + 24..base + 32].copy_from_slice(&expr.start_type.to_ne_bytes());
        table[base + 32..base + 40].copy_from_slice(&expr.end_type.to_ne_bytes());
    }

    fn sub_expressions_bytes(&self) -> &[u8] {
        &self.arena.as_slice()[self.layout.sub_expressions_range()]
    }

    fn sub_expressions_bytes_mut(&mut self) -> &mut [u8] {
        let range = self.layout.sub_expressions_range();
        &mut self.arena.as_mut_slice()[range]
    }

    // -- dictionary entries (8-byte: long / double / string-offset) -----

    pub fn read_dictionary_entry(&self, index: u64) -> u64 {
        let off = (index * 8) as usize;
        u64::from_ne_bytes(self.dictionary()[off..off + 8].try_into().unwrap())
    }

    pub fn write_dictionary_entry(&mut self, index: u64, value: u64) {
        let off = (index * 8) as usize;
        self.dictionary_mut()[off..off + 8].copy_from_slice(&value.to_ne_bytes());
    }
}
