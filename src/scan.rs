use log::trace;

use crate::bit_reader::BitReader;
use crate::decoder::MAX_COMPONENTS;
use crate::error::{Error, Result};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::parser::{FrameInfo, ScanInfo};
use crate::quantization::{QuantizationTable, QuantizationTables};
use crate::reader::JpegRead;

/// Dequantized coefficients of one 8x8 block in natural (row-major) order.
pub type Block = [i32; 64];

/// Natural order position of each zigzag index.
pub static UNZIGZAG: [u8; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// The tables a scan reads. They are never modified while a scan is decoded.
pub struct ScanTables<'a> {
    pub dc_huffman_tables: &'a [Option<HuffmanTable>],
    pub ac_huffman_tables: &'a [Option<HuffmanTable>],
    pub quantization_tables: &'a QuantizationTables,
}

/// Decodes the entropy-coded segment following a SOS header into `coefficients`, which holds
/// one block plane per frame component.
///
/// Returns the marker that ended the segment if the bit reader had to consume it.
pub fn decode_scan<R: JpegRead + ?Sized>(reader: &mut R,
                                         frame: &FrameInfo,
                                         scan: &ScanInfo,
                                         tables: &ScanTables,
                                         restart_interval: u16,
                                         coefficients: &mut [Vec<Block>]) -> Result<Option<Marker>> {
    debug_assert!(scan.component_indices.len() <= MAX_COMPONENTS);

    let mut dc_tables = Vec::with_capacity(scan.component_indices.len());
    let mut ac_tables = Vec::with_capacity(scan.component_indices.len());
    let mut quantization_tables = Vec::with_capacity(scan.component_indices.len());

    for (i, &component_index) in scan.component_indices.iter().enumerate() {
        let component = &frame.components[component_index];

        // Verify that all required tables has been set.
        let quantization_table = tables.quantization_tables
                                       .get(component.quantization_table_index)
                                       .ok_or_else(|| Error::Format("use of unset quantization table".to_owned()))?;
        let dc_table = tables.dc_huffman_tables[scan.dc_table_indices[i]]
                             .as_ref()
                             .ok_or_else(|| Error::Format("scan makes use of unset dc huffman table".to_owned()))?;
        let ac_table = tables.ac_huffman_tables[scan.ac_table_indices[i]]
                             .as_ref()
                             .ok_or_else(|| Error::Format("scan makes use of unset ac huffman table".to_owned()))?;

        quantization_tables.push(&**quantization_table);
        dc_tables.push(dc_table);
        ac_tables.push(ac_table);
    }

    let is_interleaved = scan.component_indices.len() > 1;
    let mcu_size = if is_interleaved {
        frame.mcu_size
    } else {
        // Section A.2.2
        frame.components[scan.component_indices[0]].coded_blocks()
    };

    let mut reader = BitReader::new(reader);
    let mut dc_predictors = [0i32; MAX_COMPONENTS];
    let mut restarts_left = restart_interval;
    let mut expected_rst_num = 0;

    for mcu_y in 0 .. mcu_size.height as usize {
        for mcu_x in 0 .. mcu_size.width as usize {
            for (i, &component_index) in scan.component_indices.iter().enumerate() {
                let component = &frame.components[component_index];
                let (h, v) = if is_interleaved {
                    // Section A.2.3
                    (component.horizontal_sampling_factor as usize, component.vertical_sampling_factor as usize)
                } else {
                    (1, 1)
                };
                let blocks_per_row = component.block_size.width as usize;

                for block_y in mcu_y * v .. (mcu_y + 1) * v {
                    for block_x in mcu_x * h .. (mcu_x + 1) * h {
                        let block = &mut coefficients[component_index][block_y * blocks_per_row + block_x];

                        decode_block(&mut reader,
                                     block,
                                     dc_tables[i],
                                     ac_tables[i],
                                     quantization_tables[i],
                                     &mut dc_predictors[i]).map_err(inside_scan)?;
                    }
                }
            }

            if restart_interval > 0 {
                let is_last_mcu = mcu_x == mcu_size.width as usize - 1 && mcu_y == mcu_size.height as usize - 1;
                restarts_left -= 1;

                if restarts_left == 0 && !is_last_mcu {
                    let expected_marker = Marker::RST(expected_rst_num);

                    match reader.read_marker()? {
                        marker @ Marker::RST(_) if marker != expected_marker => {
                            return Err(Error::Format(format!("found {:?} marker where {:?} was expected", marker, expected_marker)));
                        },
                        Marker::RST(_) => {},
                        marker => {
                            return Err(Error::Format(format!("found marker {:?} inside scan where {:?} was expected", marker, expected_marker)));
                        },
                    }

                    trace!("restart marker {} after MCU ({}, {})", expected_rst_num, mcu_x, mcu_y);

                    expected_rst_num = (expected_rst_num + 1) % 8;
                    // Section F.2.1.3.1
                    dc_predictors = [0i32; MAX_COMPONENTS];
                    restarts_left = restart_interval;
                }
            }
        }
    }

    Ok(reader.take_marker())
}

fn inside_scan(err: Error) -> Error {
    match err {
        Error::EndOfSegment(marker) => {
            Error::Format(format!("entropy-coded data ended early at marker FF{:02X}", marker))
        },
        err => err,
    }
}

/// Decodes one block, placing the dequantized coefficients in natural order.
pub fn decode_block<R: JpegRead + ?Sized>(reader: &mut BitReader<R>,
                                          block: &mut Block,
                                          dc_table: &HuffmanTable,
                                          ac_table: &HuffmanTable,
                                          quantization_table: &QuantizationTable,
                                          dc_predictor: &mut i32) -> Result<()> {
    *block = [0; 64];

    // Section F.2.2.1
    let size = dc_table.decode(reader)?;

    if size > 11 {
        return Err(Error::Format(format!("invalid DC difference magnitude category {}", size)));
    }

    let diff = reader.receive_extend(size)?;
    *dc_predictor = dc_predictor.wrapping_add(diff);
    block[0] = dc_predictor.wrapping_mul(i32::from(quantization_table[0]));

    // Section F.2.2.2
    let mut index = 1;

    while index < 64 {
        let byte = ac_table.decode(reader)?;
        let r = (byte >> 4) as usize;
        let s = byte & 0x0f;

        if s == 0 {
            match r {
                // Run length of 16 zero coefficients.
                15 => {
                    index += 16;

                    if index > 64 {
                        return Err(Error::Format("AC coefficient index out of range".to_owned()));
                    }
                },
                // End of block.
                0 => break,
                _ => return Err(Error::Format(format!("invalid AC symbol {:#04x} in sequential scan", byte))),
            }
        }
        else {
            index += r;

            if index > 63 {
                return Err(Error::Format("AC coefficient index out of range".to_owned()));
            }

            let value = reader.receive_extend(s)?;
            block[UNZIGZAG[index] as usize] = value.wrapping_mul(i32::from(quantization_table[index]));
            index += 1;
        }
    }

    Ok(())
}
