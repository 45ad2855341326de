#![no_main]
use libfuzzer_sys::fuzz_target;

use jpeg_baseline::Decoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = Decoder::new(data);
    // Keep allocations bounded for hostile frame headers.
    decoder.set_max_decoding_buffer_size(64 * 1024 * 1024);

    if let Ok(image) = decoder.decode() {
        assert_eq!(image.data.len(), image.width as usize * image.height as usize * 3);
    }
});
