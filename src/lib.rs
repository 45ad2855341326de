//! This crate contains a baseline JPEG decoder.
//!
//! # Examples
//!
//! ```no_run
//! use jpeg_baseline::Decoder;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("tests/reftest/images/gray.jpg").expect("failed to open file");
//! let mut decoder = Decoder::new(BufReader::new(file));
//! let image = decoder.decode().expect("failed to decode image");
//! println!("{}x{}, first pixel {:?}", image.width, image.height, image.pixel(0, 0));
//! ```
//!
//! Get image information without decoding the pixels:
//!
//! ```no_run
//! # use jpeg_baseline::Decoder;
//! # use std::fs::File;
//! # use std::io::BufReader;
//! # let file = File::open("tests/reftest/images/gray.jpg").expect("failed to open file");
//! let mut decoder = Decoder::new(BufReader::new(file));
//! decoder.read_info().expect("failed to read metadata");
//! let metadata = decoder.info().unwrap();
//! ```

pub use crate::color::ColorSpace;
pub use crate::decoder::{Decoder, ImageInfo, PixelBuffer};
pub use crate::error::{Error, UnsupportedFeature};
pub use crate::reader::JpegRead;
pub use crate::worker::PreferWorkerKind;

mod bit_reader;
mod color;
mod decoder;
mod error;
mod huffman;
mod idct;
mod marker;
mod parser;
mod quantization;
mod reader;
mod scan;
mod upsampler;
mod worker;

#[cfg(test)]
mod test_util;
