extern crate jpeg_baseline as jpeg;
extern crate png;

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

fn usage() -> ! {
    eprint!("usage: decode image.jpg image.png");
    process::exit(1)
}

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| usage());
    let output_path = args.next().unwrap_or_else(|| usage());

    let input_file = File::open(input_path).expect("The specified input file could not be opened");
    let mut decoder = jpeg::Decoder::new(BufReader::new(input_file));
    let image = match decoder.decode() {
        Ok(image) => image,
        Err(jpeg::Error::Unsupported(feature)) => {
            eprintln!("this decoder only handles baseline JPEG: {:?} is not supported", feature);
            process::exit(2)
        },
        Err(err) => {
            eprintln!("decoding failed: {}", err);
            process::exit(1)
        },
    };

    let output_file = File::create(output_path).unwrap();
    let mut encoder = png::Encoder::new(output_file, u32::from(image.width), u32::from(image.height));
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_color(png::ColorType::RGB);

    encoder.write_header()
           .expect("writing png header failed")
           .write_image_data(&image.data)
           .expect("png encoding failed");
}
