use log::{debug, trace};

use crate::error::{Error, Result};
use crate::huffman::{HuffmanTable, HuffmanTableClass};
use crate::marker::Marker;
use crate::marker::Marker::SOF;
use crate::quantization::QuantizationTable;
use crate::reader::JpegRead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntropyCoding {
    Huffman,
    Arithmetic,
}

/// Represents the coding process of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodingProcess {
    /// Sequential Discrete Cosine Transform
    DctSequential,
    /// Progressive Discrete Cosine Transform
    DctProgressive,
    /// Lossless
    Lossless,
}

#[derive(Clone, Debug)]
pub struct FrameInfo {
    pub is_baseline: bool,
    pub is_differential: bool,
    pub coding_process: CodingProcess,
    pub entropy_coding: EntropyCoding,
    pub precision: u8,

    pub image_size: Dimensions,
    /// Number of MCUs horizontally and vertically in an interleaved scan.
    pub mcu_size: Dimensions,
    pub max_horizontal_sampling_factor: u8,
    pub max_vertical_sampling_factor: u8,
    pub components: Vec<Component>,
}

#[derive(Clone, Debug)]
pub struct ScanInfo {
    pub component_indices: Vec<usize>,
    pub dc_table_indices: Vec<usize>,
    pub ac_table_indices: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct Component {
    pub identifier: u8,

    pub horizontal_sampling_factor: u8,
    pub vertical_sampling_factor: u8,

    pub quantization_table_index: usize,

    /// Size of the component in samples.
    pub size: Dimensions,
    /// Size of the component in blocks, padded to whole MCUs.
    pub block_size: Dimensions,
}

impl Component {
    /// Number of blocks a non-interleaved scan of this component covers per row and column.
    pub fn coded_blocks(&self) -> Dimensions {
        Dimensions {
            width: ceil_div(u32::from(self.size.width), 8) as u16,
            height: ceil_div(u32::from(self.size.height), 8) as u16,
        }
    }

    pub fn blocks_per_mcu(&self) -> usize {
        usize::from(self.horizontal_sampling_factor) * usize::from(self.vertical_sampling_factor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdobeColorTransform {
    // RGB or CMYK
    Unknown,
    YCbCr,
}

#[derive(Debug)]
pub enum AppData {
    Adobe(AdobeColorTransform),
    Jfif,
}

fn ceil_div(x: u32, y: u32) -> u32 {
    (x + y - 1) / y
}

fn read_length<R: JpegRead + ?Sized>(reader: &mut R, marker: Marker) -> Result<usize> {
    debug_assert!(marker.has_length());

    // length is including itself.
    let length = usize::from(reader.read_u16_from_be()?);

    if length < 2 {
        return Err(Error::Format(format!("encountered {:?} with invalid length {}", marker, length)));
    }

    Ok(length - 2)
}

/// Skips a segment without interpreting its content.
pub fn skip_segment<R: JpegRead + ?Sized>(reader: &mut R, marker: Marker) -> Result<()> {
    let length = read_length(reader, marker)?;
    trace!("skipping {} bytes of {:?}", length, marker);
    reader.skip_bytes(length)
}

// Section B.2.2
pub fn parse_sof<R: JpegRead + ?Sized>(reader: &mut R, marker: Marker) -> Result<FrameInfo> {
    let length = read_length(reader, marker)?;

    if length <= 6 {
        return Err(Error::Format("invalid length in SOF".to_owned()));
    }

    let is_baseline = marker == SOF(0);
    let is_differential = match marker {
        SOF(0 ..= 3) | SOF(9 ..= 11) => false,
        SOF(5 ..= 7) | SOF(13 ..= 15) => true,
        _ => return Err(Error::Format(format!("{:?} is not a frame marker", marker))),
    };
    let coding_process = match marker {
        SOF(0) | SOF(1) | SOF(5) | SOF(9) | SOF(13) => CodingProcess::DctSequential,
        SOF(2) | SOF(6) | SOF(10) | SOF(14) => CodingProcess::DctProgressive,
        _ => CodingProcess::Lossless,
    };
    let entropy_coding = match marker {
        SOF(0 ..= 7) => EntropyCoding::Huffman,
        _ => EntropyCoding::Arithmetic,
    };

    let precision = reader.read_u8()?;
    let height = reader.read_u16_from_be()?;
    let width = reader.read_u16_from_be()?;

    if width == 0 {
        return Err(Error::Format("zero width in frame header".to_owned()));
    }

    let component_count = reader.read_u8()?;

    if component_count == 0 {
        return Err(Error::Format("zero component count in frame header".to_owned()));
    }
    if length != 6 + 3 * component_count as usize {
        return Err(Error::Format("invalid length in SOF".to_owned()));
    }

    let mut components: Vec<Component> = Vec::with_capacity(component_count as usize);

    for _ in 0 .. component_count {
        let identifier = reader.read_u8()?;

        // Each component's identifier must be unique.
        if components.iter().any(|c| c.identifier == identifier) {
            return Err(Error::Format(format!("duplicate frame component identifier {}", identifier)));
        }

        let byte = reader.read_u8()?;
        let horizontal_sampling_factor = byte >> 4;
        let vertical_sampling_factor = byte & 0x0f;

        if horizontal_sampling_factor == 0 || horizontal_sampling_factor > 4 {
            return Err(Error::Format(format!("invalid horizontal sampling factor {}", horizontal_sampling_factor)));
        }
        if vertical_sampling_factor == 0 || vertical_sampling_factor > 4 {
            return Err(Error::Format(format!("invalid vertical sampling factor {}", vertical_sampling_factor)));
        }

        let quantization_table_index = reader.read_u8()?;

        if quantization_table_index > 3 {
            return Err(Error::Format(format!("invalid quantization table index {}", quantization_table_index)));
        }

        components.push(Component {
            identifier,
            horizontal_sampling_factor,
            vertical_sampling_factor,
            quantization_table_index: quantization_table_index as usize,
            size: Dimensions { width: 0, height: 0 },
            block_size: Dimensions { width: 0, height: 0 },
        });
    }

    let image_size = Dimensions { width, height };
    let h_max = components.iter().map(|c| c.horizontal_sampling_factor).max().unwrap_or(1);
    let v_max = components.iter().map(|c| c.vertical_sampling_factor).max().unwrap_or(1);
    let mcu_size = update_component_sizes(image_size, h_max, v_max, &mut components);

    debug!("frame {}x{}, {} component(s), {}x{} MCUs", width, height, component_count, mcu_size.width, mcu_size.height);

    Ok(FrameInfo {
        is_baseline,
        is_differential,
        coding_process,
        entropy_coding,
        precision,
        image_size,
        mcu_size,
        max_horizontal_sampling_factor: h_max,
        max_vertical_sampling_factor: v_max,
        components,
    })
}

// Section A.1.1
fn update_component_sizes(size: Dimensions, h_max: u8, v_max: u8, components: &mut [Component]) -> Dimensions {
    let h_max = u32::from(h_max);
    let v_max = u32::from(v_max);

    let mcu_size = Dimensions {
        width: ceil_div(u32::from(size.width), h_max * 8) as u16,
        height: ceil_div(u32::from(size.height), v_max * 8) as u16,
    };

    for component in components {
        let h = u32::from(component.horizontal_sampling_factor);
        let v = u32::from(component.vertical_sampling_factor);

        component.size = Dimensions {
            width: ceil_div(u32::from(size.width) * h, h_max) as u16,
            height: ceil_div(u32::from(size.height) * v, v_max) as u16,
        };
        component.block_size = Dimensions {
            width: (u32::from(mcu_size.width) * h) as u16,
            height: (u32::from(mcu_size.height) * v) as u16,
        };
    }

    mcu_size
}

// Section B.2.3
pub fn parse_sos<R: JpegRead + ?Sized>(reader: &mut R, frame: &FrameInfo) -> Result<ScanInfo> {
    let length = read_length(reader, Marker::SOS)?;

    if length == 0 {
        return Err(Error::Format("zero length in SOS".to_owned()));
    }

    let component_count = reader.read_u8()?;

    if component_count == 0 || component_count > 4 {
        return Err(Error::Format(format!("invalid component count {} in scan header", component_count)));
    }
    if length != 4 + 2 * component_count as usize {
        return Err(Error::Format("invalid length in SOS".to_owned()));
    }

    let mut component_indices = Vec::with_capacity(component_count as usize);
    let mut dc_table_indices = Vec::with_capacity(component_count as usize);
    let mut ac_table_indices = Vec::with_capacity(component_count as usize);

    for _ in 0 .. component_count {
        let identifier = reader.read_u8()?;

        let component_index = match frame.components.iter().position(|c| c.identifier == identifier) {
            Some(value) => value,
            None => return Err(Error::Format(format!("scan component identifier {} does not match any of the component identifiers defined in the frame", identifier))),
        };

        // Each of the scan's components must be unique.
        if component_indices.contains(&component_index) {
            return Err(Error::Format(format!("scan component identifier {} is repeated", identifier)));
        }

        // "... the ordering in the scan header shall follow the ordering in the frame header."
        if component_index < *component_indices.iter().max().unwrap_or(&0) {
            return Err(Error::Format("the scan component order does not follow the order in the frame header".to_owned()));
        }

        let byte = reader.read_u8()?;
        let dc_table_index = byte >> 4;
        let ac_table_index = byte & 0x0f;

        if dc_table_index > 3 || (frame.is_baseline && dc_table_index > 1) {
            return Err(Error::Format(format!("invalid dc table index {}", dc_table_index)));
        }
        if ac_table_index > 3 || (frame.is_baseline && ac_table_index > 1) {
            return Err(Error::Format(format!("invalid ac table index {}", ac_table_index)));
        }

        component_indices.push(component_index);
        dc_table_indices.push(dc_table_index as usize);
        ac_table_indices.push(ac_table_index as usize);
    }

    let blocks_per_mcu = component_indices.iter()
                                          .map(|&i| frame.components[i].blocks_per_mcu())
                                          .sum::<usize>();

    if component_count > 1 && blocks_per_mcu > 10 {
        return Err(Error::Format("scan with more than one component and more than 10 blocks per MCU".to_owned()));
    }

    let spectral_selection_start = reader.read_u8()?;
    let spectral_selection_end = reader.read_u8()?;

    let byte = reader.read_u8()?;
    let successive_approximation_high = byte >> 4;
    let successive_approximation_low = byte & 0x0f;

    // Sequential scans cover the whole block at full precision.
    if spectral_selection_start != 0 || spectral_selection_end != 63 {
        return Err(Error::Format(format!("invalid spectral selection {}..={} for a sequential scan",
                                         spectral_selection_start, spectral_selection_end)));
    }
    if successive_approximation_high != 0 || successive_approximation_low != 0 {
        return Err(Error::Format("successive approximation in a sequential scan".to_owned()));
    }

    Ok(ScanInfo {
        component_indices,
        dc_table_indices,
        ac_table_indices,
    })
}

// Section B.2.4.1
pub fn parse_dqt<R: JpegRead + ?Sized>(reader: &mut R) -> Result<[Option<QuantizationTable>; 4]> {
    let mut length = read_length(reader, Marker::DQT)?;
    let mut tables = [None; 4];

    // Each DQT segment may contain multiple quantization tables.
    while length > 0 {
        let byte = reader.read_u8()?;
        let precision = (byte >> 4) as usize;
        let index = (byte & 0x0f) as usize;

        // The combination of 8-bit sample precision and 16-bit quantization tables is explicitly
        // disallowed by the JPEG spec, but files in the wild use it anyway.
        if precision > 1 {
            return Err(Error::Format(format!("invalid precision {} in DQT", precision)));
        }
        if index > 3 {
            return Err(Error::Format(format!("invalid destination identifier {} in DQT", index)));
        }
        if length < 65 + 64 * precision {
            return Err(Error::Format("invalid length in DQT".to_owned()));
        }

        let mut table = [0u16; 64];

        for item in table.iter_mut() {
            *item = match precision {
                0 => u16::from(reader.read_u8()?),
                _ => reader.read_u16_from_be()?,
            };
        }

        if table.iter().any(|&val| val == 0) {
            return Err(Error::Format("quantization table contains element with a zero value".to_owned()));
        }

        tables[index] = Some(table);
        length -= 65 + 64 * precision;
    }

    Ok(tables)
}

// Section B.2.4.2
pub fn parse_dht<R: JpegRead + ?Sized>(reader: &mut R, is_baseline: Option<bool>) -> Result<(Vec<Option<HuffmanTable>>, Vec<Option<HuffmanTable>>)> {
    let mut length = read_length(reader, Marker::DHT)?;
    let mut dc_tables = vec![None, None, None, None];
    let mut ac_tables = vec![None, None, None, None];

    // Each DHT segment may contain multiple huffman tables.
    while length > 17 {
        let byte = reader.read_u8()?;
        let class = byte >> 4;
        let index = (byte & 0x0f) as usize;

        if class != 0 && class != 1 {
            return Err(Error::Format(format!("invalid class {} in DHT", class)));
        }
        if is_baseline == Some(true) && index > 1 {
            return Err(Error::Format("a maximum of two huffman tables per class are allowed in baseline".to_owned()));
        }
        if index > 3 {
            return Err(Error::Format(format!("invalid destination identifier {} in DHT", index)));
        }

        let mut counts = [0u8; 16];
        reader.read_exact(&mut counts)?;

        let size = counts.iter().map(|&val| val as usize).sum();

        if size == 0 {
            return Err(Error::Format("encountered table with zero length in DHT".to_owned()));
        }
        else if size > 256 {
            return Err(Error::Format("encountered table with excessive length in DHT".to_owned()));
        }
        else if size > length - 17 {
            return Err(Error::Format("invalid length in DHT".to_owned()));
        }

        let mut values = vec![0u8; size];
        reader.read_exact(&mut values)?;

        let class = match class {
            0 => HuffmanTableClass::DC,
            _ => HuffmanTableClass::AC,
        };

        let table = HuffmanTable::new(&counts, &values, class)?;

        debug!("{:?} huffman table {} defined with {} symbols", table.class, index, table.values().len());

        let destination = match table.class {
            HuffmanTableClass::DC => &mut dc_tables,
            HuffmanTableClass::AC => &mut ac_tables,
        };
        destination[index] = Some(table);

        length -= 17 + size;
    }

    if length != 0 {
        return Err(Error::Format("invalid length in DHT".to_owned()));
    }

    Ok((dc_tables, ac_tables))
}

// Section B.2.4.4
pub fn parse_dri<R: JpegRead + ?Sized>(reader: &mut R) -> Result<u16> {
    let length = read_length(reader, Marker::DRI)?;

    if length != 2 {
        return Err(Error::Format("DRI with invalid length".to_owned()));
    }

    Ok(reader.read_u16_from_be()?)
}

// Section B.2.4.6
pub fn parse_app<R: JpegRead + ?Sized>(reader: &mut R, marker: Marker) -> Result<Option<AppData>> {
    let length = read_length(reader, marker)?;
    let mut bytes_read = 0;
    let mut result = None;

    match marker {
        Marker::APP(0) => {
            if length >= 5 {
                let mut buffer = [0u8; 5];
                reader.read_exact(&mut buffer)?;
                bytes_read = buffer.len();

                // http://www.w3.org/Graphics/JPEG/jfif3.pdf
                if buffer[0 .. 5] == *b"JFIF\0" {
                    result = Some(AppData::Jfif);
                }
            }
        },
        Marker::APP(14) => {
            if length >= 12 {
                let mut buffer = [0u8; 12];
                reader.read_exact(&mut buffer)?;
                bytes_read = buffer.len();

                // http://www.sno.phy.queensu.ca/~phil/exiftool/TagNames/JPEG.html#Adobe
                if buffer[0 .. 6] == *b"Adobe\0" {
                    let color_transform = match buffer[11] {
                        0 => AdobeColorTransform::Unknown,
                        // 2 marks YCCK, whose first three components are YCbCr.
                        1 | 2 => AdobeColorTransform::YCbCr,
                        _ => return Err(Error::Format("invalid color transform in adobe app segment".to_owned())),
                    };

                    result = Some(AppData::Adobe(color_transform));
                }
            }
        },
        _ => {},
    }

    reader.skip_bytes(length - bytes_read)?;
    Ok(result)
}
