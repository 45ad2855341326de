use jpeg;
use std::cmp;
use std::fs::File;
use std::path::Path;

use super::common;

#[test]
fn reftest() {
    let _ = env_logger::builder().is_test(true).try_init();
    let files = common::test_files(&Path::new("tests").join("reftest").join("images"));
    assert!(!files.is_empty());

    for path in &files {
        reftest_file(path, jpeg::PreferWorkerKind::Multithreaded);
    }
}

#[test]
fn reftest_immediate() {
    let files = common::test_files(&Path::new("tests").join("reftest").join("images"));

    for path in &files {
        reftest_file(path, jpeg::PreferWorkerKind::Immediate);
    }
}

fn reftest_file(path: &Path, worker: jpeg::PreferWorkerKind) {
    let file = File::open(path).unwrap();
    let mut decoder = jpeg::Decoder::new(file);
    decoder.set_worker(worker);
    let image = decoder.decode().expect(&format!("failed to decode file: {:?}", path));

    let ref_file = File::open(path.with_extension("png")).unwrap();
    let (ref_metadata, mut ref_reader) = png::Decoder::new(ref_file).read_info().expect("png failed to read info");

    assert_eq!(ref_metadata.width, image.width as u32);
    assert_eq!(ref_metadata.height, image.height as u32);
    assert_eq!(ref_metadata.bit_depth, png::BitDepth::Eight);

    let mut ref_data = vec![0; ref_metadata.buffer_size()];
    ref_reader.next_frame(&mut ref_data).expect("png decode failed");

    let ref_data = match ref_metadata.color_type {
        png::ColorType::RGB => ref_data,
        png::ColorType::RGBA => rgba_to_rgb(&ref_data),
        png::ColorType::Grayscale => gray_to_rgb(&ref_data),
        other => panic!("unexpected reference color type {:?}", other),
    };

    assert_eq!(image.data.len(), ref_data.len());

    let mut max_diff = 0;
    let pixels: Vec<u8> = image.data.iter().zip(ref_data.iter()).map(|(&a, &b)| {
        let diff = (a as i16 - b as i16).abs();
        max_diff = cmp::max(diff, max_diff);

        if diff <= 2 {
            // White for correct
            0xFF
        } else {
            0xC0
        }
    }).collect();

    if pixels.iter().any(|&a| a < 255) {
        let output_path = path.with_file_name(format!("{}-diff.png", path.file_stem().unwrap().to_str().unwrap()));
        let output = File::create(&output_path).unwrap();
        let mut encoder = png::Encoder::new(output, image.width as u32, image.height as u32);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_color(png::ColorType::RGB);
        encoder.write_header().expect("png failed to write header").write_image_data(&pixels).expect("png failed to write data");

        panic!("decoding difference: {:?}, maximum difference was {}", output_path, max_diff);
    }
}

fn rgba_to_rgb(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() / 4 * 3);

    for pixel in input.chunks(4) {
        assert_eq!(pixel[3], 255);
        output.extend_from_slice(&pixel[.. 3]);
    }

    output
}

fn gray_to_rgb(input: &[u8]) -> Vec<u8> {
    input.iter().flat_map(|&v| vec![v, v, v]).collect()
}
