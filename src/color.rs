use crate::error::{Error, Result, UnsupportedFeature};
use crate::parser::AdobeColorTransform;

/// The color space the components of a frame are coded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Monochrome
    Grayscale,
    /// Red/Green/Blue, signalled by an Adobe APP14 segment with transform 0.
    RGB,
    /// Y/Cb/Cr, also known as YUV.
    YCbCr,
}

impl ColorSpace {
    pub fn num_components(&self) -> usize {
        match *self {
            ColorSpace::Grayscale => 1,
            ColorSpace::RGB | ColorSpace::YCbCr => 3,
        }
    }

    pub(crate) fn from_frame(component_count: usize,
                             color_transform: Option<AdobeColorTransform>) -> Result<ColorSpace> {
        match component_count {
            1 => Ok(ColorSpace::Grayscale),
            // http://www.sno.phy.queensu.ca/~phil/exiftool/TagNames/JPEG.html#Adobe
            // Unknown means the data is RGB, so we don't need to perform any color conversion on it.
            3 if color_transform == Some(AdobeColorTransform::Unknown) => Ok(ColorSpace::RGB),
            3 => Ok(ColorSpace::YCbCr),
            n => Err(Error::Unsupported(UnsupportedFeature::ComponentCount(n as u8))),
        }
    }
}

/// Converts a line of interleaved 3-channel samples to RGB in place. Grayscale lines only
/// have the first channel of each pixel set.
pub(crate) fn choose_color_convert_func(color_space: ColorSpace) -> fn(&mut [u8], usize) {
    match color_space {
        ColorSpace::Grayscale => color_convert_line_grayscale,
        ColorSpace::RGB => color_convert_line_null,
        ColorSpace::YCbCr => color_convert_line_ycbcr,
    }
}

fn color_convert_line_null(_data: &mut [u8], _width: usize) {
}

fn color_convert_line_grayscale(data: &mut [u8], width: usize) {
    for pixel in data[.. width * 3].chunks_exact_mut(3) {
        pixel[1] = pixel[0];
        pixel[2] = pixel[0];
    }
}

fn color_convert_line_ycbcr(data: &mut [u8], width: usize) {
    for pixel in data[.. width * 3].chunks_exact_mut(3) {
        let [r, g, b] = ycbcr_to_rgb(pixel[0], pixel[1], pixel[2]);

        pixel[0] = r;
        pixel[1] = g;
        pixel[2] = b;
    }
}

const SHIFT: u32 = 16;
const HALF: i32 = 1 << (SHIFT - 1);

// 1.40200, 0.34414, 0.71414 and 1.77200 in 16 bit fixed point.
const CR_TO_R: i32 = 91_881;
const CB_TO_G: i32 = 22_554;
const CR_TO_G: i32 = 46_802;
const CB_TO_B: i32 = 116_130;

// ITU-R BT.601
pub(crate) fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = i32::from(y);
    let cb = i32::from(cb) - 128;
    let cr = i32::from(cr) - 128;

    let r = y + ((CR_TO_R * cr + HALF) >> SHIFT);
    let g = y + ((-CB_TO_G * cb - CR_TO_G * cr + HALF) >> SHIFT);
    let b = y + ((CB_TO_B * cb + HALF) >> SHIFT);

    [clamp(r), clamp(g), clamp(b)]
}

fn clamp(value: i32) -> u8 {
    value.max(0).min(255) as u8
}
