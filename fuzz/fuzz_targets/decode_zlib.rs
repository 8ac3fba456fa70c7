#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = tinflate::InflateOptions::default().set_limit(1 << 20);
    let mut decoder = tinflate::InflateDecoder::new_with_options(data, options);
    let _result = decoder.decode_zlib();
});
