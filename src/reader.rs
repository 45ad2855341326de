use std::io::{self, Read};

use crate::error::{Error, Result};

/// The byte source a [`Decoder`](crate::Decoder) pulls from.
///
/// Implemented for every [`std::io::Read`], so `&[u8]`, `File` and `BufReader` all work.
/// End of input in the middle of a read surfaces as [`Error::Format`], any other failure of
/// the source as [`Error::Io`].
pub trait JpegRead {
    /// Read the exact number of bytes required to fill buf.
    ///
    /// See [std::io::Read::read_exact]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Skip `length` amount of bytes
    fn skip_bytes(&mut self, length: usize) -> Result<()>;

    /// Read a single `u8` value
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a single big endian encoded `u16` value
    fn read_u16_from_be(&mut self) -> Result<u16> {
        let mut buf = [0, 0];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<T: Read> JpegRead for T {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Ok(Read::read_exact(self, buf)?)
    }

    fn skip_bytes(&mut self, length: usize) -> Result<()> {
        let length = length as u64;
        let to_skip = &mut Read::by_ref(self).take(length);
        let copied = io::copy(to_skip, &mut io::sink())?;
        if copied < length {
            Err(Error::from(io::Error::from(io::ErrorKind::UnexpectedEof)))
        } else {
            Ok(())
        }
    }
}
