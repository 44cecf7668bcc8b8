//! Codec and pipeline round-trip laws (spec §8 properties 2-3).

use proptest::prelude::*;
use wisent::codec::pipeline::CompressionPipeline;
use wisent::codec::CodecKind;

const CODECS: &[CodecKind] =
    &[CodecKind::Rle, CodecKind::Delta, CodecKind::Lz77, CodecKind::Huffman, CodecKind::Fse];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property 2: for every codec and every valid input, decompress(compress(x)) == x.
    #[test]
    fn prop_every_codec_round_trips_its_own_output(data in prop::collection::vec(any::<u8>(), 1..512)) {
        for &codec in CODECS {
            if let Ok(compressed) = codec.compress(&data) {
                let restored = codec.decompress(&compressed).unwrap();
                prop_assert_eq!(restored, data.clone(), "{} failed to round-trip", codec.tag());
            }
        }
    }

    /// Property 2 corollary: decompressing arbitrary bytes never panics.
    #[test]
    fn prop_decompress_never_panics_on_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..256)) {
        for &codec in CODECS {
            let _ = codec.decompress(&data);
        }
    }

    /// Property 3: a multi-stage pipeline round-trips exactly like each of
    /// its stages does individually.
    #[test]
    fn prop_pipeline_round_trips(
        data in prop::collection::vec(any::<u8>(), 1..512),
        use_delta in any::<bool>(),
        use_rle in any::<bool>(),
    ) {
        let mut stages = Vec::new();
        if use_delta { stages.push(CodecKind::Delta); }
        if use_rle { stages.push(CodecKind::Rle); }
        let pipeline = CompressionPipeline::new(stages);
        if let Ok(compressed) = pipeline.compress(&data) {
            let restored = pipeline.decompress(&compressed).unwrap();
            prop_assert_eq!(restored, data);
        }
    }
}
