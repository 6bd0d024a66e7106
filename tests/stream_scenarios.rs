//! Integration tests reproducing the concrete e-compression scenarios and
//! cross-tag round-trip invariants.

use wfconv::ecomp::block::encode_block;
use wfconv::ecomp::stream::e_decomp;
use wfconv::transcode::conv_data;

/// Scenario 6: three 400-byte blocks of 100 samples each; seeking into the
/// middle of the stream matches a full decode sliced the same way.
#[test]
fn e_stream_seek_across_three_fixed_size_blocks() {
    let input: Vec<i32> = (0..300).map(|i| (i % 37) - 18).collect();
    let bufbytes = 400;
    let bufints = 100;

    let mut bytes = Vec::new();
    for (i, chunk) in input.chunks(bufints).enumerate() {
        let is_final = i == 2;
        let block = encode_block(chunk, bufbytes, bufints, is_final, false);
        assert_eq!(block.bytes.len(), bufbytes);
        assert_eq!(block.consumed, 100);
        bytes.extend_from_slice(&block.bytes);
    }
    assert_eq!(bytes.len(), 1200);

    let full = e_decomp(&bytes, 300, bytes.len() as i32, 0, 300).unwrap();
    assert_eq!(full, input);

    let seeked = e_decomp(&bytes, 300, bytes.len() as i32, 150, 100).unwrap();
    assert_eq!(seeked, full[150..250]);
}

/// Scenario 4: a trivial ascending sequence differences down to all-ones and
/// packs into the 7-sample/9-bit packet, check value equal to the last
/// sample.
#[test]
fn e_compression_trivial_sequence_scenario() {
    let input = [1i32, 2, 3, 4, 5, 6, 7];
    let block = encode_block(&input, 1024, 16384 / 4 - 2, true, true);
    assert_eq!(block.bytes.len(), 16);
    assert_eq!(block.bytes[4] & 0x0f, 1); // ndiff == 1
    let decoded = wfconv::ecomp::block_e_decomp(&block.bytes).unwrap();
    assert_eq!(decoded.samples, input);
}

/// Universal round-trip invariant across several lossless tag pairs.
#[test]
fn lossless_tag_pairs_round_trip() {
    let pairs = [("i2", "s2"), ("i4", "s4"), ("s2", "s4"), ("s4", "t8")];
    for (a, b) in pairs {
        let width_a = wfconv::transcode::conv_length(a).unwrap();
        let width_b = wfconv::transcode::conv_length(b).unwrap();
        let n = 5;
        let mut buf = vec![0u8; n * width_a.max(width_b)];
        for (i, byte) in buf.iter_mut().enumerate().take(n * width_a) {
            *byte = (i * 7 + 3) as u8;
        }
        let original = buf[..n * width_a].to_vec();

        conv_data(&mut buf, n, a, b).unwrap();
        conv_data(&mut buf, n, b, a).unwrap();

        assert_eq!(&buf[..n * width_a], &original[..], "{a} <-> {b} did not round-trip");
    }
}

/// Boundary case: n=0 is a no-op.
#[test]
fn zero_samples_is_a_no_op() {
    let mut buf = [0u8; 0];
    conv_data(&mut buf, 0, "i2", "s2").unwrap();
}
