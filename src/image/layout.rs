// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! `ImageLayout` is the single source of truth for where every region of an
//! image lives, the way `sorex::binary::header::SectionOffsets` is the
//! single source of truth for that format's section layout (its doc comment
//! puts it well: "every piece of code that reads or writes sections MUST use
//! it, this prevents the 'I updated the write path but forgot the read
//! path' class of bugs"). Region sizes come from `Counter`; this module only
//! does the offset arithmetic spec §3.2/§6.1 specifies, so there is exactly
//! one place region order and padding can go wrong.

/// 6 leading `u64` fields: argument_count, argument_bytes, expression_count,
/// dictionary_bytes, original_base_address, string_bytes_written.
pub const HEADER_SIZE: usize = 6 * 8;

/// One sub-expression table row: head, start_arg, end_arg, start_type, end_type.
pub const SUB_EXPRESSION_RECORD_SIZE: usize = 5 * 8;

/// Exact byte sizes of every region, as produced by `Counter`'s first pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSizes {
    pub argument_count: u64,
    pub argument_bytes: u64,
    pub expression_count: u64,
    pub dictionary_bytes: u64,
    pub string_bytes: u64,
}

fn round_up_to_8(n: u64) -> u64 {
    (n + 7) & !7
}

/// Offset (and, implicitly, size) of every region inside one contiguous
/// image allocation. Regions appear in the order spec §3.2 lists them;
/// `total_bytes` is what `Arena::alloc` is called with.
#[derive(Debug, Clone, Copy)]
pub struct ImageLayout {
    pub sizes: ImageSizes,
    pub argument_values_offset: u64,
    pub argument_types_offset: u64,
    pub argument_types_padded_len: u64,
    pub sub_expressions_offset: u64,
    pub dictionary_offset: u64,
    pub string_offset: u64,
    pub total_bytes: u64,
}

impl ImageLayout {
    pub fn new(sizes: ImageSizes) -> ImageLayout {
        let argument_values_offset = HEADER_SIZE as u64;
        let argument_types_offset = argument_values_offset + sizes.argument_bytes;
        let argument_types_padded_len = round_up_to_8(sizes.argument_count);
        let sub_expressions_offset = argument_types_offset + argument_types_padded_len;
        let dictionary_offset =
            sub_expressions_offset + sizes.expression_count * SUB_EXPRESSION_RECORD_SIZE as u64;
        let string_offset = dictionary_offset + sizes.dictionary_bytes;
        let total_bytes = string_offset + sizes.string_bytes;

        ImageLayout {
            sizes,
            argument_values_offset,
            argument_types_offset,
            argument_types_padded_len,
            sub_expressions_offset,
            dictionary_offset,
            string_offset,
            total_bytes,
        }
    }

    pub fn argument_values_range(&self) -> std::ops::Range<usize> {
        self.argument_values_offset as usize
            ..(self.argument_values_offset + self.sizes.argument_bytes) as usize
    }

    pub fn argument_types_range(&self) -> std::ops::Range<usize> {
        self.argument_types_offset as usize
            ..(self.argument_types_offset + self.argument_types_padded_len) as usize
    }

    pub fn sub_expressions_range(&self) -> std::ops::Range<usize> {
        self.sub_expressions_offset as usize
            ..(self.sub_expressions_offset
                + self.sizes.expression_count * SUB_EXPRESSION_RECORD_SIZE as u64) as usize
    }

    pub fn dictionary_range(&self) -> std::ops::Range<usize> {
        self.dictionary_offset as usize
            ..(self.dictionary_offset + self.sizes.dictionary_bytes) as usize
    }

    pub fn string_range(&self) -> std::ops::Range<usize> {
        self.string_offset as usize..(self.string_offset + self.sizes.string_bytes) as usize
    }
}
