#![no_main]

use libfuzzer_sys::fuzz_target;

// Compress arbitrary input with a real encoder, then decode it back
// through both output modes and both wire formats. Every path must
// reproduce the encoder input exactly.
fuzz_target!(|data: &[u8]| {
    if data.is_empty()
    {
        return;
    }
    let level = data[0] % 10;
    let raw = &data[1..];

    // fixed-capacity mode over a raw deflate stream, with the buffer
    // sized exactly right
    let deflate_data = miniz_oxide::deflate::compress_to_vec(raw, level);

    let mut exact = vec![0_u8; raw.len()];
    let mut decoder = tinflate::InflateDecoder::new(&deflate_data);
    let written = decoder
        .decode_deflate_into(&mut exact)
        .expect("conforming deflate stream did not decode");
    assert_eq!(
        &exact[..written],
        raw,
        "deflate output differs from the encoder input"
    );

    // growable mode through the zlib wrapper, capped at the known
    // size and starting from a deliberately small hint so the growth
    // path gets exercised too
    let zlib_data = miniz_oxide::deflate::compress_to_vec_zlib(raw, level);

    let options = tinflate::InflateOptions::default()
        .set_limit(raw.len())
        .set_size_hint(raw.len() / 2 + 1);
    let mut decoder = tinflate::InflateDecoder::new_with_options(&zlib_data, options);
    let decoded = decoder
        .decode_zlib()
        .expect("conforming zlib stream did not decode");
    assert_eq!(decoded, raw, "zlib output differs from the encoder input");
});
