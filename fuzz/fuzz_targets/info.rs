#![no_main]
use libfuzzer_sys::fuzz_target;

use jpeg_baseline::Decoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = Decoder::new(data);
    if decoder.read_info().is_ok() {
        assert!(decoder.info().is_some());
    }
});
