use crate::error::{Error, Result};
use crate::huffman::extend;
use crate::marker::Marker;
use crate::reader::JpegRead;

/// MSB-first bit reader over an entropy-coded segment.
///
/// Bytes are pulled from the source one at a time and only when a bit is needed, so the
/// source is never advanced past the byte holding the last consumed bit. `FF 00` stuffing
/// is removed transparently. Any other byte after `FF` ends the segment: the marker is
/// remembered and every further read fails with [`Error::EndOfSegment`].
pub struct BitReader<'a, R: ?Sized> {
    reader: &'a mut R,
    byte: u8,
    bits_left: u8,
    marker: Option<u8>,
}

impl<'a, R: JpegRead + ?Sized> BitReader<'a, R> {
    pub fn new(reader: &'a mut R) -> BitReader<'a, R> {
        BitReader {
            reader,
            byte: 0,
            bits_left: 0,
            marker: None,
        }
    }

    pub fn read_bit(&mut self) -> Result<u8> {
        if self.bits_left == 0 {
            self.byte = self.next_byte()?;
            self.bits_left = 8;
        }

        self.bits_left -= 1;
        Ok((self.byte >> self.bits_left) & 1)
    }

    /// Reads `count` bits, most significant first. `count` may be at most 16.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        debug_assert!(count <= 16);

        let mut remaining = count;
        let mut value = 0u32;

        while remaining > 0 {
            if self.bits_left == 0 {
                self.byte = self.next_byte()?;
                self.bits_left = 8;
            }

            let take = remaining.min(self.bits_left);
            let bits = (u32::from(self.byte) >> (self.bits_left - take)) & ((1 << take) - 1);

            value = (value << take) | bits;
            self.bits_left -= take;
            remaining -= take;
        }

        Ok(value as u16)
    }

    // Section F.2.2.1
    /// Reads a `count` bit magnitude and sign-extends it. Category 0 reads nothing and is 0.
    pub fn receive_extend(&mut self, count: u8) -> Result<i32> {
        if count == 0 {
            return Ok(0);
        }

        let value = self.read_bits(count)?;
        Ok(extend(i32::from(value), count))
    }

    /// Drops the bits left in the current byte.
    pub fn reset(&mut self) {
        self.byte = 0;
        self.bits_left = 0;
    }

    /// The marker that terminated the segment, if one has been met.
    pub fn take_marker(&mut self) -> Option<Marker> {
        self.marker.take().and_then(Marker::from_u8)
    }

    /// Byte-aligns and reads the marker that must follow, e.g. a restart marker.
    pub fn read_marker(&mut self) -> Result<Marker> {
        self.reset();

        let byte = match self.marker.take() {
            Some(byte) => byte,
            None => {
                if self.reader.read_u8()? != 0xFF {
                    return Err(Error::Format("did not find marker where expected".to_owned()));
                }

                let mut byte = self.reader.read_u8()?;

                // Section B.1.1.2
                // "Any marker may optionally be preceded by any number of fill bytes, which are bytes assigned code X’FF’."
                while byte == 0xFF {
                    byte = self.reader.read_u8()?;
                }

                byte
            },
        };

        Marker::from_u8(byte).ok_or_else(|| Error::Format("FF 00 found where marker was expected".to_owned()))
    }

    fn next_byte(&mut self) -> Result<u8> {
        if let Some(marker) = self.marker {
            return Err(Error::EndOfSegment(marker));
        }

        let byte = self.reader.read_u8()?;

        if byte != 0xFF {
            return Ok(byte);
        }

        let mut next_byte = self.reader.read_u8()?;

        // Byte stuffing.
        if next_byte == 0x00 {
            return Ok(0xFF);
        }

        while next_byte == 0xFF {
            next_byte = self.reader.read_u8()?;
        }

        if next_byte == 0x00 {
            return Err(Error::Format("FF 00 found where marker was expected".to_owned()));
        }

        self.marker = Some(next_byte);
        Err(Error::EndOfSegment(next_byte))
    }
}
