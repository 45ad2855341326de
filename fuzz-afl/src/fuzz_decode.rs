use afl::fuzz;

use jpeg_baseline::{Decoder, Error, PixelBuffer};

#[inline(always)]
fn decode(data: &[u8]) -> Result<PixelBuffer, Error> {
    let mut decoder = Decoder::new(data);
    decoder.set_max_decoding_buffer_size(64 * 1024 * 1024);
    decoder.decode()
}

fn main() {
    fuzz!(|data: &[u8]| {
        let _ = decode(data);
    });
}
