use std::io::Write;

use nanorand::Rng;
use tinflate::errors::InflateErrorKind;
use tinflate::{InflateDecoder, InflateOptions};

fn zlib_compress(data: &[u8], level: u32) -> Vec<u8>
{
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn deflate_compress(data: &[u8], level: u32) -> Vec<u8>
{
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::new(level));

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Seeded so the round-trip tests get deterministic but shapeless
/// input.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8>
{
    let mut rand = nanorand::WyRand::new_seed(seed);
    let mut out = vec![0_u8; len];

    rand.fill(&mut out);
    out
}

#[test]
fn empty_stored_block()
{
    let data = [0x01, 0x00, 0x00, 0xFF, 0xFF];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_deflate().unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn stored_block_hello()
{
    let data = [
        0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
    ];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_deflate().unwrap();
    assert_eq!(decoded, b"Hello");
}

#[test]
fn fixed_huffman_abc()
{
    let data = [0x4B, 0x4C, 0x4A, 0x06, 0x00];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_deflate().unwrap();
    assert_eq!(decoded, b"abc");
}

#[test]
fn overlapping_match_run_fills()
{
    // literal 'a' followed by a match of length 9 at distance 1
    let data = [0x4B, 0x84, 0x03, 0x00];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_deflate().unwrap();
    assert_eq!(decoded, b"aaaaaaaaaa");
}

#[test]
fn stored_block_length_mismatch()
{
    // NLEN is zero instead of !5
    let data = [
        0x01, 0x05, 0x00, 0x00, 0x00, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
    ];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(
        err.kind,
        InflateErrorKind::BlockLengthMismatch(5, 0)
    ));
}

#[test]
fn reserved_block_type()
{
    // low three bits 111: final block of the reserved kind 3
    let data = [0x07];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::InvalidBlockType));
}

#[test]
fn truncation_is_reported_not_overread()
{
    let vectors: &[&[u8]] = &[
        &[0x01, 0x00, 0x00, 0xFF, 0xFF],
        &[0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F],
        &[0x4B, 0x4C, 0x4A, 0x06, 0x00],
        &[0x4B, 0x84, 0x03, 0x00],
    ];

    for vector in vectors
    {
        let truncated = &vector[..vector.len() - 1];
        let mut decoder = InflateDecoder::new(truncated);

        let err = decoder.decode_deflate().unwrap_err();
        assert!(
            matches!(err.kind, InflateErrorKind::CompressedIncomplete),
            "unexpected error for {vector:X?}: {:?}",
            err.kind
        );
    }
}

#[test]
fn every_prefix_errors_without_panicking()
{
    let data = zlib_compress(b"The quick brown fox jumps over the lazy dog", 6);

    for cut in 1..data.len()
    {
        let mut decoder = InflateDecoder::new(&data[..cut]);
        assert!(decoder.decode_zlib().is_err());
    }
}

#[test]
fn reserved_litlen_symbol_is_rejected()
{
    // static block whose first codeword decodes to symbol 286
    let data = [0x1B, 0x03];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::ValueNotAllowed(286)));
}

#[test]
fn reserved_distance_symbol_is_rejected()
{
    // literal 'a', then a match whose distance codeword is symbol 30
    let data = [0x4B, 0x04, 0x3E];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::ValueNotAllowed(30)));
}

#[test]
fn back_reference_before_output_start_is_rejected()
{
    // a match of length 3 distance 1 with no output written yet
    let data = [0x03, 0x02];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(
        err.kind,
        InflateErrorKind::InvalidBackReference(1, 0)
    ));
}

#[test]
fn error_carries_bytes_of_completed_blocks()
{
    // a non-final stored "Hello" followed by a reserved block type
    let data = [
        0x00, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x07,
    ];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::InvalidBlockType));
    assert_eq!(err.data, b"Hello");
}

#[test]
fn fixed_capacity_exact_buffer()
{
    let data = [
        0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
    ];
    let mut output = [0_u8; 5];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_deflate_into(&mut output).unwrap();
    assert_eq!(decoded, 5);
    assert_eq!(&output, b"Hello");
}

#[test]
fn fixed_capacity_overflow_is_reported()
{
    let data = [
        0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
    ];
    let mut output = [0_u8; 4];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_deflate_into(&mut output).unwrap_err();
    assert!(matches!(
        err.kind,
        InflateErrorKind::DecompressedOverflow(5, 4)
    ));
}

#[test]
fn growable_output_respects_the_limit()
{
    let raw = vec![b'a'; 4096];
    let data = zlib_compress(&raw, 6);

    let options = InflateOptions::default().set_limit(100);
    let mut decoder = InflateDecoder::new_with_options(&data, options);

    let err = decoder.decode_zlib().unwrap_err();
    assert!(matches!(
        err.kind,
        InflateErrorKind::OutputLimitExceeded(100, _)
    ));
}

#[test]
fn zlib_round_trip_fixed_buffer()
{
    let raw = b"abc";
    let data = zlib_compress(raw, 6);

    let mut output = [0_u8; 8];
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_zlib_into(&mut output).unwrap();
    assert_eq!(&output[..decoded], raw);
}

#[test]
fn zlib_rejects_unknown_compression_method()
{
    // CM of 7, check bits made consistent, plus room for a trailer
    let data = [0x77, 0x09, 0x00, 0x00, 0x00, 0x00];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_zlib().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::GenericStr(_)));
}

#[test]
fn zlib_rejects_preset_dictionary()
{
    // FDICT set, check bits consistent
    let data = [0x78, 0x20, 0x00, 0x00, 0x00, 0x00];
    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_zlib().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::Generic(_)));
}

#[test]
fn zlib_rejects_corrupt_check_bits()
{
    let mut data = zlib_compress(b"abc", 6);
    data[1] ^= 0x01;

    let mut decoder = InflateDecoder::new(&data);

    let err = decoder.decode_zlib().unwrap_err();
    assert!(matches!(err.kind, InflateErrorKind::Generic(_)));
}

#[test]
fn empty_input_decodes_to_nothing()
{
    let mut decoder = InflateDecoder::new(&[]);
    assert!(decoder.decode_deflate().unwrap().is_empty());

    let mut output = [0_u8; 4];
    let mut decoder = InflateDecoder::new(&[]);
    assert_eq!(decoder.decode_zlib_into(&mut output).unwrap(), 0);
}

#[test]
fn dynamic_huffman_round_trip()
{
    // repetitive text comfortably above 300 bytes so encoders pick a
    // dynamic block
    let raw: Vec<u8> = b"It was the best of times, it was the worst of times, \
                         it was the age of wisdom, it was the age of foolishness, \
                         it was the epoch of belief, it was the epoch of incredulity, \
                         it was the season of Light, it was the season of Darkness, \
                         it was the spring of hope, it was the winter of despair."
        .repeat(4);

    for level in 1..=9
    {
        let data = zlib_compress(&raw, level);
        let mut decoder = InflateDecoder::new(&data);

        let decoded = decoder.decode_zlib().unwrap();
        assert_eq!(decoded, raw, "level {level} did not round trip");
    }
}

#[test]
fn stored_round_trip_spans_multiple_blocks()
{
    // level 0 emits stored blocks, and 200 KB forces several of them
    let raw = pseudo_random_bytes(200_000, 0xBADC_0FFE);
    let data = zlib_compress(&raw, 0);

    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_zlib().unwrap();
    assert_eq!(decoded, raw);
}

#[test]
fn raw_deflate_round_trip()
{
    let raw = pseudo_random_bytes(10_000, 0x1234_5678);

    for level in [1, 6, 9]
    {
        let data = deflate_compress(&raw, level);
        let mut decoder = InflateDecoder::new(&data);

        let decoded = decoder.decode_deflate().unwrap();
        assert_eq!(decoded, raw, "level {level} did not round trip");
    }
}

#[test]
fn highly_compressible_round_trip()
{
    let mut raw = Vec::new();

    for i in 0_u32..20_000
    {
        raw.extend_from_slice(if i % 3 == 0 { b"abcabc" } else { b"defdef" });
    }

    let data = zlib_compress(&raw, 9);
    let mut decoder = InflateDecoder::new(&data);

    let decoded = decoder.decode_zlib().unwrap();
    assert_eq!(decoded, raw);
}

#[test]
fn decoder_is_reusable()
{
    let data = zlib_compress(b"reuse me twice", 6);
    let mut decoder = InflateDecoder::new(&data);

    let first = decoder.decode_zlib().unwrap();
    let second = decoder.decode_zlib().unwrap();

    assert_eq!(first, second);
    assert_eq!(first, b"reuse me twice");
}
