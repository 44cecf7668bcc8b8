//! Per-codec unit tests, including the concrete scenarios spec §8 names
//! (S4, S5) verbatim.

use wisent::codec::{delta, fse, huffman, lz77, rle};

#[test]
fn s4_rle_compresses_a_run_of_identical_bytes() {
    let input = [0x41u8; 5];
    let compressed = rle::compress(&input).unwrap();
    assert_eq!(compressed, vec![0x05, 0x41]);
    let restored = rle::decompress(&compressed).unwrap();
    assert_eq!(restored, vec![0x41u8; 5]);
}

#[test]
fn s5_lz77_back_references_a_repeated_pattern() {
    let input = b"ababababab";
    let compressed = lz77::compress_with(input, 16, 8).unwrap();
    // Two literal tags (a, b), nothing to match against yet, then a
    // back-reference with offset 2 covering the rest of the pattern.
    assert_eq!(&compressed[0..2], &[0x01, b'a']);
    assert_eq!(&compressed[2..4], &[0x01, b'b']);
    assert_eq!(compressed[4], 0x00, "expected a back-reference tag");
    assert_eq!(u16::from_be_bytes([compressed[5], compressed[6]]), 2);
    let restored = lz77::decompress(&compressed).unwrap();
    assert_eq!(restored, input);
}

#[test]
fn rle_rejects_empty_input() {
    assert!(rle::compress(&[]).is_err());
}

#[test]
fn delta_round_trips_a_monotonic_sequence() {
    let input: Vec<u8> = (0..=255u8).collect();
    let compressed = delta::compress(&input).unwrap();
    let restored = delta::decompress(&compressed).unwrap();
    assert_eq!(restored, input);
}

#[test]
fn huffman_round_trips_skewed_byte_frequencies() {
    let mut input = vec![b'a'; 200];
    input.extend(vec![b'b'; 10]);
    input.push(b'c');
    let compressed = huffman::compress(&input).unwrap();
    assert!(compressed.len() < input.len());
    let restored = huffman::decompress(&compressed).unwrap();
    assert_eq!(restored, input);
}

#[test]
fn fse_declines_uniform_input_in_favor_of_rle() {
    let input = vec![7u8; 64];
    let err = fse::compress(&input).unwrap_err();
    assert!(matches!(err, wisent::WisentError::UseRLEInstead));
}

#[test]
fn fse_round_trips_mixed_frequencies() {
    let mut input = Vec::new();
    for i in 0..64u32 {
        input.push((i % 5) as u8);
    }
    let compressed = fse::compress(&input).unwrap();
    let restored = fse::decompress(&compressed).unwrap();
    assert_eq!(restored, input);
}
