// Table B.1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Start Of Frame markers
    ///
    /// - SOF(0):  Baseline DCT (Huffman coding)
    /// - SOF(1):  Extended sequential DCT (Huffman coding)
    /// - SOF(2):  Progressive DCT (Huffman coding)
    /// - SOF(3):  Lossless (sequential) (Huffman coding)
    /// - SOF(5):  Differential sequential DCT (Huffman coding)
    /// - SOF(6):  Differential progressive DCT (Huffman coding)
    /// - SOF(7):  Differential lossless (sequential) (Huffman coding)
    /// - SOF(9):  Extended sequential DCT (arithmetic coding)
    /// - SOF(10): Progressive DCT (arithmetic coding)
    /// - SOF(11): Lossless (sequential) (arithmetic coding)
    /// - SOF(13): Differential sequential DCT (arithmetic coding)
    /// - SOF(14): Differential progressive DCT (arithmetic coding)
    /// - SOF(15): Differential lossless (sequential) (arithmetic coding)
    SOF(u8),
    /// Reserved for JPEG extensions
    JPG,
    /// Define Huffman table(s)
    DHT,
    /// Define arithmetic coding conditioning(s)
    DAC,
    /// Restart with modulo 8 count `m`
    RST(u8),
    /// Start of image
    SOI,
    /// End of image
    EOI,
    /// Start of scan
    SOS,
    /// Define quantization table(s)
    DQT,
    /// Define number of lines
    DNL,
    /// Define restart interval
    DRI,
    /// Define hierarchical progression
    DHP,
    /// Expand reference component(s)
    EXP,
    /// Reserved for application segments
    APP(u8),
    /// Reserved for JPEG extensions
    JPGn(u8),
    /// Comment
    COM,
    /// For temporary private use in arithmetic coding
    TEM,
    /// Reserved
    RES(u8),
}

// Human readable segment names, indexed by the marker byte minus 0xC0.
static MARKER_NAMES: [&str; 64] = [
    "Baseline DCT frame", "Extended sequential DCT frame", "Progressive DCT frame", "Lossless frame",
    "Define Huffman Table", "Differential sequential frame", "Differential progressive frame", "Differential lossless frame",
    "JPEG extension", "Arithmetic extended sequential frame", "Arithmetic progressive frame", "Arithmetic lossless frame",
    "Define Arithmetic Conditioning", "Arithmetic differential sequential frame", "Arithmetic differential progressive frame", "Arithmetic differential lossless frame",
    "Restart 0", "Restart 1", "Restart 2", "Restart 3",
    "Restart 4", "Restart 5", "Restart 6", "Restart 7",
    "Start of Image", "End of Image", "Start of Scan", "Quantization Table",
    "Define Number of Lines", "Define Restart Interval", "Define Hierarchical Progression", "Expand Reference Components",
    "Application Default Header", "Application Segment 1", "Application Segment 2", "Application Segment 3",
    "Application Segment 4", "Application Segment 5", "Application Segment 6", "Application Segment 7",
    "Application Segment 8", "Application Segment 9", "Application Segment 10", "Application Segment 11",
    "Application Segment 12", "Application Segment 13", "Application Segment 14", "Application Segment 15",
    "JPEG extension 0", "JPEG extension 1", "JPEG extension 2", "JPEG extension 3",
    "JPEG extension 4", "JPEG extension 5", "JPEG extension 6", "JPEG extension 7",
    "JPEG extension 8", "JPEG extension 9", "JPEG extension 10", "JPEG extension 11",
    "JPEG extension 12", "JPEG extension 13", "Comment", "Fill",
];

impl Marker {
    /// Standalone markers are not followed by a length field.
    pub fn has_length(self) -> bool {
        use self::Marker::*;
        !matches!(self, RST(..) | SOI | EOI | TEM)
    }

    pub fn from_u8(n: u8) -> Option<Marker> {
        use self::Marker::*;
        match n {
            0x00 => None, // Byte stuffing
            0x01 => Some(TEM),
            0x02..=0xBF => Some(RES(n)),
            0xC4 => Some(DHT),
            0xC8 => Some(JPG),
            0xCC => Some(DAC),
            0xC0..=0xCF => Some(SOF(n - 0xC0)),
            0xD0..=0xD7 => Some(RST(n - 0xD0)),
            0xD8 => Some(SOI),
            0xD9 => Some(EOI),
            0xDA => Some(SOS),
            0xDB => Some(DQT),
            0xDC => Some(DNL),
            0xDD => Some(DRI),
            0xDE => Some(DHP),
            0xDF => Some(EXP),
            0xE0..=0xEF => Some(APP(n - 0xE0)),
            0xF0..=0xFD => Some(JPGn(n - 0xF0)),
            0xFE => Some(COM),
            0xFF => None, // Fill byte
        }
    }

    pub fn to_u8(self) -> u8 {
        use self::Marker::*;
        match self {
            TEM => 0x01,
            RES(n) => n,
            SOF(n) => 0xC0 + n,
            DHT => 0xC4,
            JPG => 0xC8,
            DAC => 0xCC,
            RST(n) => 0xD0 + n,
            SOI => 0xD8,
            EOI => 0xD9,
            SOS => 0xDA,
            DQT => 0xDB,
            DNL => 0xDC,
            DRI => 0xDD,
            DHP => 0xDE,
            EXP => 0xDF,
            APP(n) => 0xE0 + n,
            JPGn(n) => 0xF0 + n,
            COM => 0xFE,
        }
    }

    pub fn name(self) -> &'static str {
        match self.to_u8() {
            n @ 0xC0..=0xFF => MARKER_NAMES[(n - 0xC0) as usize],
            0x01 => "Temporary",
            _ => "Reserved",
        }
    }
}
