// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Canonical Huffman coding with an explicit end-of-stream symbol (spec
//! §4.2.4).
//!
//! Header: `eof_code_length:u8 eof_code_bits:u8`, then for every byte
//! value that occurs in the input, `symbol:u8 code_length:u8 code_bits:u8`,
//! terminated by a `0x00` sentinel row. Codes are packed MSB-first into the
//! bitstream that follows the header. The EOF symbol's code is always read
//! last during decode so a byte stream with no natural length marker still
//! knows when to stop, matching the way the original treats 256 (one past
//! the byte alphabet) as a guaranteed-unique extra leaf.

use crate::error::{Result, WisentError};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const EOF_SYMBOL: u16 = 256;

#[derive(Debug, Clone)]
struct Code {
    bits: u32,
    len: u8,
}

enum Node {
    Leaf(u16),
    Internal(Box<Node>, Box<Node>),
}

struct HeapEntry {
    freq: u64,
    order: usize,
    node: Node,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.order == other.order
    }
}
impl Eq for HeapEntry {}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the smallest frequency pops
        // first, breaking ties by insertion order for a deterministic tree.
        other.freq.cmp(&self.freq).then(other.order.cmp(&self.order))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn build_tree(freqs: &[(u16, u64)]) -> Node {
    let mut heap = BinaryHeap::new();
    let mut order = 0usize;
    for &(symbol, freq) in freqs {
        heap.push(HeapEntry { freq, order, node: Node::Leaf(symbol) });
        order += 1;
    }
    while heap.len() > 1 {
        let a = heap.pop().unwrap();
        let b = heap.pop().unwrap();
        heap.push(HeapEntry {
            freq: a.freq + b.freq,
            order,
            node: Node::Internal(Box::new(a.node), Box::new(b.node)),
        });
        order += 1;
    }
    heap.pop().unwrap().node
}

fn assign_codes(node: &Node, prefix: u32, len: u8, out: &mut Vec<(u16, Code)>) {
    match node {
        Node::Leaf(symbol) => {
            // A single-symbol alphabet still needs a one-bit code.
            out.push((*symbol, Code { bits: prefix, len: len.max(1) }));
        }
        Node::Internal(left, right) => {
            assign_codes(left, prefix << 1, len + 1, out);
            assign_codes(right, (prefix << 1) | 1, len + 1, out);
        }
    }
}

struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    filled: u8,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { bytes: Vec::new(), cur: 0, filled: 0 }
    }

    fn push_code(&mut self, code: &Code) {
        for i in (0..code.len).rev() {
            let bit = (code.bits >> i) & 1;
            self.cur = (self.cur << 1) | bit as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.cur);
                self.cur = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.cur <<= 8 - self.filled;
            self.bytes.push(self.cur);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, byte_pos: 0, bit_pos: 0 }
    }

    fn next_bit(&mut self) -> Result<u8> {
        if self.byte_pos >= self.bytes.len() {
            return Err(WisentError::Truncated("huffman bitstream"));
        }
        let bit = (self.bytes[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        Ok(bit)
    }
}

pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(WisentError::EmptyInput);
    }

    let mut counts = [0u64; 257];
    for &b in input {
        counts[b as usize] += 1;
    }
    counts[EOF_SYMBOL as usize] = 1;

    let freqs: Vec<(u16, u64)> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(symbol, &c)| (symbol as u16, c))
        .collect();

    let tree = build_tree(&freqs);
    let mut codes = Vec::new();
    assign_codes(&tree, 0, 0, &mut codes);
    codes.sort_by_key(|&(symbol, _)| symbol);

    let mut output = Vec::new();
    let eof_code = codes.iter().find(|&&(s, _)| s == EOF_SYMBOL).unwrap().1.clone();
    output.push(eof_code.len);
    output.push(eof_code.bits as u8);

    for &(symbol, ref code) in &codes {
        if symbol == EOF_SYMBOL {
            continue;
        }
        output.push(symbol as u8);
        output.push(code.len);
        output.push(code.bits as u8);
    }
    output.push(0x00);

    let mut table = vec![Code { bits: 0, len: 0 }; 257];
    for (symbol, code) in &codes {
        table[*symbol as usize] = code.clone();
    }

    let mut writer = BitWriter::new();
    for &b in input {
        writer.push_code(&table[b as usize]);
    }
    writer.push_code(&table[EOF_SYMBOL as usize]);

    output.extend(writer.finish());
    Ok(output)
}

pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() < 2 {
        return Err(WisentError::Truncated("huffman header"));
    }

    let eof_len = input[0];
    let eof_bits = input[1] as u32;
    let mut pos = 2usize;

    let mut table: Vec<(u16, Code)> = vec![(EOF_SYMBOL, Code { bits: eof_bits, len: eof_len })];
    loop {
        if pos >= input.len() {
            return Err(WisentError::Truncated("huffman symbol table"));
        }
        let marker = input[pos];
        if marker == 0x00 && pos + 2 >= input.len() {
            pos += 1;
            break;
        }
        if pos + 2 >= input.len() {
            return Err(WisentError::Truncated("huffman symbol table row"));
        }
        let symbol = input[pos] as u16;
        let len = input[pos + 1];
        let bits = input[pos + 2] as u32;
        if len == 0 && symbol == 0 && bits == 0 {
            pos += 1;
            break;
        }
        table.push((symbol, Code { bits, len }));
        pos += 3;
    }

    let tree = rebuild_tree(&table)?;
    let mut reader = BitReader::new(&input[pos..]);
    let mut output = Vec::new();
    loop {
        let symbol = decode_one(&tree, &mut reader)?;
        if symbol == EOF_SYMBOL {
            break;
        }
        output.push(symbol as u8);
    }
    Ok(output)
}

enum DecodeNode {
    Unset,
    Leaf(u16),
    Internal(Box<DecodeNode>, Box<DecodeNode>),
}

fn rebuild_tree(table: &[(u16, Code)]) -> Result<DecodeNode> {
    let mut root = DecodeNode::Unset;
    for (symbol, code) in table {
        insert(&mut root, code.bits, code.len, *symbol)?;
    }
    Ok(root)
}

/// Walks `bits` (the top `len` bits, MSB first) from `node`, creating
/// `Internal` nodes as needed, and plants a `Leaf(symbol)` at the end.
fn insert(node: &mut DecodeNode, bits: u32, len: u8, symbol: u16) -> Result<()> {
    if len == 0 {
        return Err(WisentError::Corrupt("huffman code of length zero"));
    }
    if matches!(node, DecodeNode::Unset) {
        *node = DecodeNode::Internal(Box::new(DecodeNode::Unset), Box::new(DecodeNode::Unset));
    }
    let mut cur = node;
    for i in (0..len).rev() {
        let bit = (bits >> i) & 1;
        let (left, right) = match cur {
            DecodeNode::Internal(left, right) => (left, right),
            _ => return Err(WisentError::Corrupt("huffman code table is inconsistent")),
        };
        let next = if bit == 0 { left } else { right };
        if i == 0 {
            if !matches!(next.as_ref(), DecodeNode::Unset) {
                return Err(WisentError::Corrupt("huffman code table is inconsistent"));
            }
            **next = DecodeNode::Leaf(symbol);
        } else if matches!(next.as_ref(), DecodeNode::Unset) {
            **next = DecodeNode::Internal(Box::new(DecodeNode::Unset), Box::new(DecodeNode::Unset));
        }
        cur = next.as_mut();
    }
    Ok(())
}

fn decode_one(tree: &DecodeNode, reader: &mut BitReader) -> Result<u16> {
    let mut cur = tree;
    loop {
        match cur {
            DecodeNode::Leaf(symbol) => return Ok(*symbol),
            DecodeNode::Internal(left, right) => {
                let bit = reader.next_bit()?;
                cur = if bit == 0 { left } else { right };
            }
            DecodeNode::Unset => {
                return Err(WisentError::Corrupt("huffman bitstream does not match code table"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_typical_text() {
        let input = b"abracadabra abracadabra".to_vec();
        let compressed = compress(&input).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn round_trips_single_repeated_byte() {
        let input = vec![b'z'; 64];
        let compressed = compress(&input).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn round_trips_all_256_byte_values() {
        let input: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        let compressed = compress(&input).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(compress(&[]), Err(WisentError::EmptyInput)));
    }
}
