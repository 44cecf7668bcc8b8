// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! An ordered chain of codecs applied to one column page (spec §4.3).
//!
//! `compress` runs the chain left to right; `decompress` undoes it right to
//! left. An empty pipeline is a no-op, which lets `ColumnEncoder` store a
//! page verbatim when none of the codecs would help.

use super::CodecKind;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionPipeline {
    stages: Vec<CodecKind>,
}

impl CompressionPipeline {
    pub fn new(stages: Vec<CodecKind>) -> CompressionPipeline {
        CompressionPipeline { stages }
    }

    pub fn empty() -> CompressionPipeline {
        CompressionPipeline { stages: Vec::new() }
    }

    pub fn stages(&self) -> &[CodecKind] {
        &self.stages
    }

    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut buf = input.to_vec();
        for codec in &self.stages {
            buf = codec.compress(&buf)?;
        }
        Ok(buf)
    }

    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut buf = input.to_vec();
        for codec in self.stages.iter().rev() {
            buf = codec.decompress(&buf)?;
        }
        Ok(buf)
    }

    /// Tags in pipeline order, as stored in a column's `ColumnMetaData`.
    pub fn tags(&self) -> Vec<&'static str> {
        self.stages.iter().map(|c| c.tag()).collect()
    }

    /// `"none"` (spec §6.3) is a recognized tag that contributes zero
    /// stages, distinct from an empty `tags` list only in that it's an
    /// explicit, self-documenting choice in a pipeline map.
    pub fn from_tags(tags: &[String]) -> Result<CompressionPipeline> {
        let mut stages = Vec::new();
        for tag in tags {
            if tag.eq_ignore_ascii_case("none") {
                continue;
            }
            stages.push(CodecKind::parse(tag)?);
        }
        Ok(CompressionPipeline { stages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pipeline_is_identity() {
        let pipeline = CompressionPipeline::empty();
        let data = b"hello world".to_vec();
        assert_eq!(pipeline.compress(&data).unwrap(), data);
        assert_eq!(pipeline.decompress(&data).unwrap(), data);
    }

    #[test]
    fn round_trips_through_delta_then_rle() {
        let pipeline = CompressionPipeline::new(vec![CodecKind::Delta, CodecKind::Rle]);
        let data = vec![10u8, 11, 12, 13, 14, 15, 16, 17];
        let compressed = pipeline.compress(&data).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn round_trips_through_lz77_then_huffman() {
        let pipeline = CompressionPipeline::new(vec![CodecKind::Lz77, CodecKind::Huffman]);
        let data = b"the quick brown fox the quick brown fox".to_vec();
        let compressed = pipeline.compress(&data).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn tags_round_trip_through_from_tags() {
        let pipeline = CompressionPipeline::new(vec![CodecKind::Rle, CodecKind::Fse]);
        let tags: Vec<String> = pipeline.tags().iter().map(|t| t.to_string()).collect();
        let rebuilt = CompressionPipeline::from_tags(&tags).unwrap();
        assert_eq!(rebuilt, pipeline);
    }
}
