use std::error::Error as StdError;
use std::fmt;
use std::io::{Error as IoError, ErrorKind};

pub type Result<T> = ::std::result::Result<T, Error>;

/// An enumeration over JPEG features this library deliberately rejects.
///
/// Only the baseline sequential DCT process (SOF0) with Huffman coding is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedFeature {
    /// Extended sequential DCT (SOF1).
    ExtendedSequential,
    /// Progressive DCT.
    Progressive,
    /// Lossless JPEG.
    Lossless,
    /// Hierarchical JPEG.
    Hierarchical,
    /// JPEG using arithmetic entropy coding instead of Huffman coding.
    ArithmeticEntropyCoding,
    /// Sample precision in bits. 8 bit sample precision is what is currently supported.
    SamplePrecision(u8),
    /// Number of components in an image. 1 and 3 components are currently supported.
    ComponentCount(u8),
    /// An image can specify a zero height in the frame header and use the DNL (Define Number of
    /// Lines) marker at the end of the first scan to define the number of lines in the frame.
    DNL,
    /// A subsampling ratio not representable as an integer.
    NonIntegerSubsamplingRatio,
}

/// Errors that can occur while decoding a JPEG image.
#[derive(Debug)]
pub enum Error {
    /// The stream does not start with a Start-of-Image marker.
    NotJpeg,
    /// The image is not formatted properly. The string contains detailed information about the
    /// error.
    Format(String),
    /// The image makes use of a JPEG feature not supported by this library.
    Unsupported(UnsupportedFeature),
    /// An I/O error occurred while decoding the image.
    Io(IoError),
    /// Entropy-coded data ended at a marker. Carries the byte following `0xFF`.
    EndOfSegment(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NotJpeg               => write!(f, "not a JPEG: missing SOI marker"),
            Error::Format(ref desc)      => write!(f, "invalid JPEG format: {}", desc),
            Error::Unsupported(ref feat) => write!(f, "unsupported JPEG feature: {:?}", feat),
            Error::Io(ref err)           => err.fmt(f),
            Error::EndOfSegment(marker)  => write!(f, "entropy-coded segment ended at marker FF{:02X}", marker),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        // Running out of input is a property of the stream, not of the byte source.
        match err.kind() {
            ErrorKind::UnexpectedEof => Error::Format("unexpected end of stream".to_owned()),
            _ => Error::Io(err),
        }
    }
}
