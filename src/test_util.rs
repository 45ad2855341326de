//! Test-only JPEG writer used to synthesize streams for the unit tests.

use crate::huffman::derive_huffman_codes;

// Annex K, Table K.3 - K.6
pub const STD_DC_LUMINANCE_BITS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
pub const STD_DC_LUMINANCE_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
pub const STD_DC_CHROMINANCE_BITS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
pub const STD_DC_CHROMINANCE_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
pub const STD_AC_LUMINANCE_BITS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d];
pub const STD_AC_LUMINANCE_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
    0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
    0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];
pub const STD_AC_CHROMINANCE_BITS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
pub const STD_AC_CHROMINANCE_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33, 0x52, 0xF0,
    0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34, 0xE1, 0x25, 0xF1, 0x17, 0x18, 0x19, 0x1A, 0x26,
    0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5,
    0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
    0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA,
    0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

/// MSB-first bit writer with `FF 00` stuffing. Partial bytes are padded with 1 bits.
pub struct BitWriter {
    data: Vec<u8>,
    accumulator: u32,
    count: u8,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter {
            data: Vec::new(),
            accumulator: 0,
            count: 0,
        }
    }

    pub fn write_bits(&mut self, value: u32, count: u8) {
        for i in (0 .. count).rev() {
            self.accumulator = (self.accumulator << 1) | ((value >> i) & 1);
            self.count += 1;

            if self.count == 8 {
                let byte = self.accumulator as u8;
                self.data.push(byte);
                if byte == 0xFF {
                    self.data.push(0x00);
                }
                self.accumulator = 0;
                self.count = 0;
            }
        }
    }

    pub fn pad(&mut self) {
        if self.count > 0 {
            let fill = 8 - self.count;
            self.write_bits((1 << fill) - 1, fill);
        }
    }

    /// Pads and writes a marker without stuffing.
    pub fn write_marker(&mut self, marker: u8) {
        self.pad();
        self.data.push(0xFF);
        self.data.push(marker);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pad();
        self.data
    }
}

pub struct HuffmanEncoder {
    codes: Vec<Option<(u16, u8)>>,
}

impl HuffmanEncoder {
    pub fn new(bits: &[u8; 16], values: &[u8]) -> HuffmanEncoder {
        let (codes, sizes) = derive_huffman_codes(bits).unwrap();
        let mut table = vec![None; 256];

        for ((&code, &size), &value) in codes.iter().zip(&sizes).zip(values) {
            table[value as usize] = Some((code, size));
        }

        HuffmanEncoder { codes: table }
    }

    pub fn encode(&self, writer: &mut BitWriter, symbol: u8) {
        let (code, size) = self.codes[symbol as usize].expect("symbol has no code");
        writer.write_bits(u32::from(code), size);
    }
}

/// Number of bits in the magnitude of `value`.
pub fn category(value: i32) -> u8 {
    (32 - value.abs().leading_zeros()) as u8
}

/// Writes the magnitude bits of `value`; its category is coded separately.
pub fn write_magnitude(writer: &mut BitWriter, value: i32) {
    let size = category(value);
    if size > 0 {
        let bits = if value < 0 { value - 1 } else { value };
        writer.write_bits((bits as u32) & ((1 << size) - 1), size);
    }
}

/// Encodes one block given in zigzag order.
pub fn encode_block(writer: &mut BitWriter,
                    dc_table: &HuffmanEncoder,
                    ac_table: &HuffmanEncoder,
                    zigzag: &[i32; 64],
                    predictor: &mut i32) {
    let diff = zigzag[0] - *predictor;
    *predictor = zigzag[0];

    dc_table.encode(writer, category(diff));
    write_magnitude(writer, diff);

    let mut run = 0;

    for &coefficient in &zigzag[1 ..] {
        if coefficient == 0 {
            run += 1;
            continue;
        }

        while run > 15 {
            ac_table.encode(writer, 0xF0);
            run -= 16;
        }

        ac_table.encode(writer, (run << 4) | category(coefficient));
        write_magnitude(writer, coefficient);
        run = 0;
    }

    if run > 0 {
        ac_table.encode(writer, 0x00);
    }
}

/// Builds a JPEG stream segment by segment.
pub struct JpegWriter {
    data: Vec<u8>,
}

impl JpegWriter {
    pub fn new() -> JpegWriter {
        JpegWriter { data: vec![0xFF, 0xD8] }
    }

    pub fn empty() -> JpegWriter {
        JpegWriter { data: Vec::new() }
    }

    pub fn marker(mut self, marker: u8) -> JpegWriter {
        self.data.push(0xFF);
        self.data.push(marker);
        self
    }

    pub fn segment(self, marker: u8, payload: &[u8]) -> JpegWriter {
        let length = payload.len() as u16 + 2;
        let mut this = self.marker(marker);
        this.data.extend_from_slice(&length.to_be_bytes());
        this.data.extend_from_slice(payload);
        this
    }

    pub fn jfif(self) -> JpegWriter {
        self.segment(0xE0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00")
    }

    /// Quantization table given in zigzag order.
    pub fn dqt(self, id: u8, table: &[u8; 64]) -> JpegWriter {
        let mut payload = vec![id];
        payload.extend_from_slice(table);
        self.segment(0xDB, &payload)
    }

    /// `class` is 0 for DC and 1 for AC.
    pub fn dht(self, class: u8, id: u8, bits: &[u8; 16], values: &[u8]) -> JpegWriter {
        let mut payload = vec![(class << 4) | id];
        payload.extend_from_slice(bits);
        payload.extend_from_slice(values);
        self.segment(0xC4, &payload)
    }

    /// The four standard Huffman tables as DC/AC 0 (luminance) and DC/AC 1 (chrominance).
    pub fn standard_dht(self) -> JpegWriter {
        self.dht(0, 0, &STD_DC_LUMINANCE_BITS, &STD_DC_LUMINANCE_VALUES)
            .dht(1, 0, &STD_AC_LUMINANCE_BITS, &STD_AC_LUMINANCE_VALUES)
            .dht(0, 1, &STD_DC_CHROMINANCE_BITS, &STD_DC_CHROMINANCE_VALUES)
            .dht(1, 1, &STD_AC_CHROMINANCE_BITS, &STD_AC_CHROMINANCE_VALUES)
    }

    /// Components are (id, horizontal factor, vertical factor, quantization table).
    pub fn sof(self, marker: u8, width: u16, height: u16, components: &[(u8, u8, u8, u8)]) -> JpegWriter {
        let mut payload = vec![8];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components.len() as u8);
        for &(id, h, v, tq) in components {
            payload.extend_from_slice(&[id, (h << 4) | v, tq]);
        }
        self.segment(marker, &payload)
    }

    pub fn sof0(self, width: u16, height: u16, components: &[(u8, u8, u8, u8)]) -> JpegWriter {
        self.sof(0xC0, width, height, components)
    }

    pub fn dri(self, interval: u16) -> JpegWriter {
        self.segment(0xDD, &interval.to_be_bytes())
    }

    /// Components are (id, DC table, AC table). Baseline spectral selection.
    pub fn sos(self, components: &[(u8, u8, u8)]) -> JpegWriter {
        let mut payload = vec![components.len() as u8];
        for &(id, td, ta) in components {
            payload.extend_from_slice(&[id, (td << 4) | ta]);
        }
        payload.extend_from_slice(&[0, 63, 0]);
        self.segment(0xDA, &payload)
    }

    pub fn raw(mut self, bytes: &[u8]) -> JpegWriter {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn eoi(self) -> JpegWriter {
        self.marker(0xD9)
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// Converts a row-major block to zigzag order.
pub fn zigzag(block: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (i, &position) in crate::scan::UNZIGZAG.iter().enumerate() {
        out[i] = block[position as usize];
    }
    out
}

/// Entropy codes grayscale blocks with the standard luminance tables, one MCU per block.
/// `restart_interval` of 0 emits no restart markers.
pub fn encode_gray_scan(blocks: &[[i32; 64]], restart_interval: usize) -> Vec<u8> {
    let dc = HuffmanEncoder::new(&STD_DC_LUMINANCE_BITS, &STD_DC_LUMINANCE_VALUES);
    let ac = HuffmanEncoder::new(&STD_AC_LUMINANCE_BITS, &STD_AC_LUMINANCE_VALUES);
    let mut writer = BitWriter::new();
    let mut predictor = 0;

    for (i, block) in blocks.iter().enumerate() {
        if restart_interval > 0 && i > 0 && i % restart_interval == 0 {
            writer.write_marker(0xD0 + ((i / restart_interval - 1) % 8) as u8);
            predictor = 0;
        }
        encode_block(&mut writer, &dc, &ac, block, &mut predictor);
    }

    writer.finish()
}

/// A single component grayscale image of `width` x `height` whose blocks (zigzag order,
/// quantized) are given in raster order, with an all-ones quantization table.
pub fn gray_jpeg(width: u16, height: u16, blocks: &[[i32; 64]], restart_interval: u16) -> Vec<u8> {
    let mut writer = JpegWriter::new()
        .jfif()
        .dqt(0, &[1; 64])
        .sof0(width, height, &[(1, 1, 1, 0)])
        .standard_dht();

    if restart_interval > 0 {
        writer = writer.dri(restart_interval);
    }

    writer.sos(&[(1, 0, 0)])
          .raw(&encode_gray_scan(blocks, restart_interval as usize))
          .eoi()
          .finish()
}

/// A zigzag ordered block with only a DC coefficient.
pub fn dc_block(dc: i32) -> [i32; 64] {
    let mut block = [0i32; 64];
    block[0] = dc;
    block
}
