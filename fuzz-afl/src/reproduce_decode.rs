use jpeg_baseline::{Decoder, Error, PixelBuffer};

mod utils;

#[inline(always)]
fn decode(data: &[u8]) -> Result<PixelBuffer, Error> {
    let mut decoder = Decoder::new(data);
    decoder.set_max_decoding_buffer_size(64 * 1024 * 1024);
    decoder.decode()
}

fn main() {
    let data = utils::read_file_from_args();
    match decode(&data) {
        Ok(image) => println!("Decoded {}x{} pixels", image.width, image.height),
        Err(e) => println!("Decoder returned an error: {:?}\nNote: Not a panic, this is fine.", e),
    };
}
