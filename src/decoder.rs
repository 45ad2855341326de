use std::mem;

use log::{debug, trace, warn};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::color::{choose_color_convert_func, ColorSpace};
use crate::error::{Error, Result, UnsupportedFeature};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::parser::{AdobeColorTransform, AppData, CodingProcess, EntropyCoding, FrameInfo,
                    parse_app, parse_dht, parse_dqt, parse_dri, parse_sof, parse_sos, skip_segment};
use crate::quantization::QuantizationTables;
use crate::reader::JpegRead;
use crate::scan::{decode_scan, Block, ScanTables};
use crate::upsampler::Upsampler;
use crate::worker::{with_worker, PreferWorkerKind, RowData};

pub const MAX_COMPONENTS: usize = 4;

/// Describes the image a [`Decoder`] has found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    /// The width of the image, in pixels.
    pub width: u16,
    /// The height of the image, in pixels.
    pub height: u16,
    /// The color space the components are coded in. Decoded pixels are always RGB.
    pub color_space: ColorSpace,
}

/// A decoded image: `width * height` RGB triples, row by row, top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// The RGB triple at column `x` of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the image.
    pub fn pixel(&self, x: u16, y: u16) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) outside {}x{} image", x, y, self.width, self.height);

        let offset = (usize::from(y) * usize::from(self.width) + usize::from(x)) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    /// Iterates over the rows of the image, each `width * 3` bytes long.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact((usize::from(self.width) * 3).max(1))
    }
}

/// What the marker loop does after a segment has been handled.
enum Flow {
    Continue,
    FrameParsed,
    EndOfImage,
}

type MarkerHandler<R> = fn(&mut Decoder<R>, Marker) -> Result<Flow>;

/// JPEG decoder
pub struct Decoder<R> {
    reader: R,

    frame: Option<FrameInfo>,
    dc_huffman_tables: Vec<Option<HuffmanTable>>,
    ac_huffman_tables: Vec<Option<HuffmanTable>>,
    quantization_tables: QuantizationTables,

    restart_interval: u16,
    color_transform: Option<AdobeColorTransform>,

    coefficients: Vec<Vec<Block>>,
    scanned_components: [bool; MAX_COMPONENTS],
    scans_processed: usize,
    previous_marker: Marker,
    pending_marker: Option<Marker>,

    max_decoding_buffer_size: usize,
    worker: PreferWorkerKind,
}

impl<R: JpegRead> Decoder<R> {
    /// Creates a new `Decoder` using the reader `reader`.
    pub fn new(reader: R) -> Decoder<R> {
        Decoder {
            reader,
            frame: None,
            dc_huffman_tables: vec![None, None, None, None],
            ac_huffman_tables: vec![None, None, None, None],
            quantization_tables: QuantizationTables::new(),
            restart_interval: 0,
            color_transform: None,
            coefficients: Vec::new(),
            scanned_components: [false; MAX_COMPONENTS],
            scans_processed: 0,
            previous_marker: Marker::SOI,
            pending_marker: None,
            max_decoding_buffer_size: usize::MAX,
            worker: PreferWorkerKind::Multithreaded,
        }
    }

    /// Set maximum buffer size allowed for decoded images
    pub fn set_max_decoding_buffer_size(&mut self, max: usize) {
        self.max_decoding_buffer_size = max;
    }

    /// Choose how the block transform and color conversion stages are run.
    pub fn set_worker(&mut self, worker: PreferWorkerKind) {
        self.worker = worker;
    }

    /// Returns the image information, available once the frame header has been read.
    pub fn info(&self) -> Option<ImageInfo> {
        let frame = self.frame.as_ref()?;
        let color_space = ColorSpace::from_frame(frame.components.len(), self.color_transform).ok()?;

        Some(ImageInfo {
            width: frame.image_size.width,
            height: frame.image_size.height,
            color_space,
        })
    }

    /// Tries to read metadata from the image without decoding it.
    ///
    /// If successful, the metadata can be obtained using the `info` method.
    pub fn read_info(&mut self) -> Result<()> {
        self.decode_internal(true).map(|_| ())
    }

    /// Decodes the image, returning its pixels as RGB.
    pub fn decode(&mut self) -> Result<PixelBuffer> {
        self.decode_internal(false)?
            .ok_or_else(|| Error::Format("no data found".to_owned()))
    }

    fn decode_internal(&mut self, stop_after_metadata: bool) -> Result<Option<PixelBuffer>> {
        if stop_after_metadata && self.frame.is_some() {
            // The metadata has already been read.
            return Ok(None);
        }
        else if self.frame.is_none() && self.previous_marker == Marker::SOI {
            self.read_soi()?;
        }

        loop {
            let marker = match self.pending_marker.take() {
                Some(marker) => marker,
                None => self.read_marker()?,
            };

            debug!("{:?} marker: {}", marker, marker.name());

            let handler = Self::marker_handler(marker)
                .ok_or_else(|| Error::Format(format!("{:?} marker found where not allowed", marker)))?;

            match handler(self, marker)? {
                Flow::Continue => {},
                Flow::FrameParsed if stop_after_metadata => {
                    self.previous_marker = marker;
                    return Ok(None);
                },
                Flow::FrameParsed => {},
                Flow::EndOfImage => break,
            }

            self.previous_marker = marker;
        }

        if self.scans_processed == 0 {
            return Err(Error::Format("no data found".to_owned()));
        }

        self.compute_image().map(Some)
    }

    // Table B.1
    fn marker_handler(marker: Marker) -> Option<MarkerHandler<R>> {
        use crate::marker::Marker::*;

        let handler: MarkerHandler<R> = match marker {
            SOF(_) => Self::handle_sof,
            SOS => Self::handle_sos,
            DQT => Self::handle_dqt,
            DHT => Self::handle_dht,
            DRI => Self::handle_dri,
            APP(_) => Self::handle_app,
            DNL => Self::handle_dnl,
            DAC | DHP | EXP => Self::reject_segment,
            COM | JPG | JPGn(_) | RES(_) => Self::skip_segment,
            EOI => Self::handle_eoi,
            // Standalone markers that may not appear between segments.
            SOI | RST(_) | TEM => return None,
        };

        Some(handler)
    }

    fn read_soi(&mut self) -> Result<()> {
        let mut bytes = [0u8; 2];

        match self.reader.read_exact(&mut bytes) {
            Ok(()) if bytes == [0xFF, Marker::SOI.to_u8()] => Ok(()),
            Ok(()) => Err(Error::NotJpeg),
            // Shorter than a marker.
            Err(Error::Format(_)) => Err(Error::NotJpeg),
            Err(err) => Err(err),
        }
    }

    fn read_marker(&mut self) -> Result<Marker> {
        // This should be an error as the JPEG spec doesn't allow extraneous data between marker segments.
        if self.reader.read_u8()? != 0xFF {
            return Err(Error::Format("did not find marker where expected".to_owned()));
        }

        let mut byte = self.reader.read_u8()?;
        let mut fill_bytes = 0;

        // Section B.1.1.2
        // "Any marker may optionally be preceded by any number of fill bytes, which are bytes assigned code X’FF’."
        while byte == 0xFF {
            fill_bytes += 1;
            byte = self.reader.read_u8()?;
        }

        if fill_bytes > 0 {
            warn!("{} fill bytes before marker FF{:02X}", fill_bytes, byte);
        }

        Marker::from_u8(byte).ok_or_else(|| Error::Format("FF 00 found where marker was expected".to_owned()))
    }

    fn handle_sof(&mut self, marker: Marker) -> Result<Flow> {
        // Section 4.10
        // "An image contains only one frame in the cases of sequential and
        //  progressive coding processes; an image contains multiple frames for the
        //  hierarchical mode."
        if self.frame.is_some() {
            return Err(Error::Format("more than one frame header in image".to_owned()));
        }

        let frame = parse_sof(&mut self.reader, marker)?;
        let component_count = frame.components.len();

        if frame.is_differential {
            return Err(Error::Unsupported(UnsupportedFeature::Hierarchical));
        }
        if frame.entropy_coding == EntropyCoding::Arithmetic {
            return Err(Error::Unsupported(UnsupportedFeature::ArithmeticEntropyCoding));
        }
        match frame.coding_process {
            CodingProcess::Lossless => return Err(Error::Unsupported(UnsupportedFeature::Lossless)),
            CodingProcess::DctProgressive => return Err(Error::Unsupported(UnsupportedFeature::Progressive)),
            CodingProcess::DctSequential if !frame.is_baseline => {
                return Err(Error::Unsupported(UnsupportedFeature::ExtendedSequential));
            },
            CodingProcess::DctSequential => {},
        }
        if frame.precision != 8 {
            return Err(Error::Unsupported(UnsupportedFeature::SamplePrecision(frame.precision)));
        }
        if frame.image_size.height == 0 {
            return Err(Error::Unsupported(UnsupportedFeature::DNL));
        }
        if component_count != 1 && component_count != 3 {
            return Err(Error::Unsupported(UnsupportedFeature::ComponentCount(component_count as u8)));
        }

        // Rejects sampling factors that do not divide the maximum.
        Upsampler::new(&frame.components,
                       frame.max_horizontal_sampling_factor,
                       frame.max_vertical_sampling_factor)?;

        self.frame = Some(frame);
        Ok(Flow::FrameParsed)
    }

    fn handle_sos(&mut self, _marker: Marker) -> Result<Flow> {
        let frame = self.frame.as_ref()
                        .ok_or_else(|| Error::Format("scan encountered before frame".to_owned()))?;
        let scan = parse_sos(&mut self.reader, frame)?;

        for &index in &scan.component_indices {
            if self.scanned_components[index] {
                return Err(Error::Format(format!("component {} is coded in more than one scan",
                                                 frame.components[index].identifier)));
            }
        }

        if self.coefficients.is_empty() {
            check_buffer_size(frame, self.max_decoding_buffer_size)?;

            self.coefficients = frame.components.iter().map(|component| {
                let block_count = component.block_size.width as usize * component.block_size.height as usize;
                vec![[0i32; 64]; block_count]
            }).collect();
        }

        debug!("scan of {} component(s), restart interval {}", scan.component_indices.len(), self.restart_interval);

        let tables = ScanTables {
            dc_huffman_tables: &self.dc_huffman_tables,
            ac_huffman_tables: &self.ac_huffman_tables,
            quantization_tables: &self.quantization_tables,
        };

        self.pending_marker = decode_scan(&mut self.reader,
                                          frame,
                                          &scan,
                                          &tables,
                                          self.restart_interval,
                                          &mut self.coefficients)?;

        for &index in &scan.component_indices {
            self.scanned_components[index] = true;
        }
        self.scans_processed += 1;

        Ok(Flow::Continue)
    }

    fn handle_dqt(&mut self, _marker: Marker) -> Result<Flow> {
        let tables = parse_dqt(&mut self.reader)?;

        for (id, table) in tables.iter().enumerate() {
            if let Some(table) = *table {
                self.quantization_tables.insert(id, table)?;
            }
        }

        Ok(Flow::Continue)
    }

    fn handle_dht(&mut self, _marker: Marker) -> Result<Flow> {
        let is_baseline = self.frame.as_ref().map(|frame| frame.is_baseline);
        let (dc_tables, ac_tables) = parse_dht(&mut self.reader, is_baseline)?;

        let current_dc_tables = mem::take(&mut self.dc_huffman_tables);
        self.dc_huffman_tables = dc_tables.into_iter()
                                          .zip(current_dc_tables.into_iter())
                                          .map(|(a, b)| a.or(b))
                                          .collect();

        let current_ac_tables = mem::take(&mut self.ac_huffman_tables);
        self.ac_huffman_tables = ac_tables.into_iter()
                                          .zip(current_ac_tables.into_iter())
                                          .map(|(a, b)| a.or(b))
                                          .collect();

        Ok(Flow::Continue)
    }

    fn handle_dri(&mut self, _marker: Marker) -> Result<Flow> {
        self.restart_interval = parse_dri(&mut self.reader)?;
        debug!("restart interval {}", self.restart_interval);
        Ok(Flow::Continue)
    }

    fn handle_app(&mut self, marker: Marker) -> Result<Flow> {
        match parse_app(&mut self.reader, marker)? {
            Some(AppData::Adobe(color_transform)) => {
                debug!("Adobe color transform {:?}", color_transform);
                self.color_transform = Some(color_transform);
            },
            Some(AppData::Jfif) => {
                // Some JPEGs in the wild do not put the JFIF APP0 right after SOI, so it is
                // accepted anywhere an APP0 is.
                debug!("JFIF header");
            },
            None => {},
        }

        Ok(Flow::Continue)
    }

    fn handle_dnl(&mut self, _marker: Marker) -> Result<Flow> {
        // Section B.2.1
        // "If a DNL segment (see B.2.5) is present, it shall immediately follow the first scan."
        if self.previous_marker != Marker::SOS || self.scans_processed != 1 {
            return Err(Error::Format("DNL is only allowed immediately after the first scan".to_owned()));
        }

        Err(Error::Unsupported(UnsupportedFeature::DNL))
    }

    fn reject_segment(&mut self, marker: Marker) -> Result<Flow> {
        match marker {
            Marker::DAC => Err(Error::Unsupported(UnsupportedFeature::ArithmeticEntropyCoding)),
            _ => Err(Error::Unsupported(UnsupportedFeature::Hierarchical)),
        }
    }

    fn skip_segment(&mut self, marker: Marker) -> Result<Flow> {
        skip_segment(&mut self.reader, marker)?;
        Ok(Flow::Continue)
    }

    fn handle_eoi(&mut self, _marker: Marker) -> Result<Flow> {
        trace!("end of image after {} scan(s)", self.scans_processed);
        Ok(Flow::EndOfImage)
    }

    fn compute_image(&mut self) -> Result<PixelBuffer> {
        let frame = self.frame.as_ref()
                        .ok_or_else(|| Error::Format("no frame found".to_owned()))?;

        if frame.components.iter().enumerate().any(|(i, _)| !self.scanned_components[i]) {
            return Err(Error::Format("not all components has data".to_owned()));
        }

        let coefficients = mem::take(&mut self.coefficients);
        let component_data = with_worker(self.worker, |worker| -> Result<Vec<Vec<u8>>> {
            for (index, component) in frame.components.iter().enumerate() {
                worker.start(RowData { index, component: component.clone() })?;
            }

            let mut rows = frame.components.iter().zip(&coefficients).enumerate().flat_map(|(index, (component, plane))| {
                let row_len = component.block_size.width as usize * component.vertical_sampling_factor as usize;
                plane.chunks(row_len).map(move |row| (index, row))
            });
            worker.append_rows(&mut rows)?;

            (0 .. frame.components.len()).map(|index| worker.get_result(index)).collect()
        })?;
        drop(coefficients);

        let color_space = ColorSpace::from_frame(frame.components.len(), self.color_transform)?;
        let upsampler = Upsampler::new(&frame.components,
                                       frame.max_horizontal_sampling_factor,
                                       frame.max_vertical_sampling_factor)?;
        let color_convert_func = choose_color_convert_func(color_space);

        let width = frame.image_size.width as usize;
        let line_size = width * 3;
        let mut data = vec![0u8; line_size * frame.image_size.height as usize];

        for_each_line(&mut data, line_size, self.worker, |row, line| {
            upsampler.upsample_and_interleave_row(&component_data, row, width, line);
            color_convert_func(line, width);
        });

        Ok(PixelBuffer {
            width: frame.image_size.width,
            height: frame.image_size.height,
            data,
        })
    }
}

#[cfg(feature = "rayon")]
fn for_each_line<F>(data: &mut [u8], line_size: usize, worker: PreferWorkerKind, f: F)
    where F: Fn(usize, &mut [u8]) + Send + Sync
{
    match worker {
        PreferWorkerKind::Multithreaded => {
            data.par_chunks_mut(line_size)
                .enumerate()
                .for_each(|(row, line)| f(row, line));
        },
        PreferWorkerKind::Immediate => {
            data.chunks_mut(line_size)
                .enumerate()
                .for_each(|(row, line)| f(row, line));
        },
    }
}

#[cfg(not(feature = "rayon"))]
fn for_each_line<F>(data: &mut [u8], line_size: usize, _worker: PreferWorkerKind, f: F)
    where F: Fn(usize, &mut [u8])
{
    data.chunks_mut(line_size)
        .enumerate()
        .for_each(|(row, line)| f(row, line));
}

/// Coefficients, component samples and output pixels must fit in `max` bytes.
fn check_buffer_size(frame: &FrameInfo, max: usize) -> Result<()> {
    let too_large = || Error::Format(format!(
        "{}x{} image exceeds the maximum decoding buffer size of {} bytes",
        frame.image_size.width, frame.image_size.height, max
    ));

    let blocks = frame.components.iter().try_fold(0usize, |acc, component| {
        (component.block_size.width as usize)
            .checked_mul(component.block_size.height as usize)
            .and_then(|count| acc.checked_add(count))
    }).ok_or_else(too_large)?;

    // Each block holds 64 i32 coefficients and 64 samples.
    let planes = blocks.checked_mul(64 * (mem::size_of::<i32>() + 1)).ok_or_else(too_large)?;
    let pixels = (frame.image_size.width as usize)
        .checked_mul(frame.image_size.height as usize)
        .and_then(|count| count.checked_mul(3))
        .ok_or_else(too_large)?;

    match planes.checked_add(pixels) {
        Some(total) if total <= max => Ok(()),
        _ => Err(too_large()),
    }
}
