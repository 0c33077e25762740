#![no_main]

use hyper_tag::utils::compression::decompress;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Test raw DEFLATE decompression with the default size limit
    let _ = decompress(data, 16 * 1024 * 1024);
});
