use crate::error::{Error, Result, UnsupportedFeature};
use crate::parser::Component;

/// Nearest-neighbour upsampling of component planes to the full image resolution.
pub struct Upsampler {
    components: Vec<UpsamplerComponent>,
    max_h: usize,
    max_v: usize,
}

struct UpsamplerComponent {
    horizontal_sampling_factor: usize,
    vertical_sampling_factor: usize,
    line_stride: usize,
}

impl Upsampler {
    pub fn new(components: &[Component], max_h: u8, max_v: u8) -> Result<Upsampler> {
        let max_h = usize::from(max_h);
        let max_v = usize::from(max_v);

        let components = components.iter().map(|component| {
            let h = usize::from(component.horizontal_sampling_factor);
            let v = usize::from(component.vertical_sampling_factor);

            if h == 0 || v == 0 || max_h % h != 0 || max_v % v != 0 {
                return Err(Error::Unsupported(UnsupportedFeature::NonIntegerSubsamplingRatio));
            }

            Ok(UpsamplerComponent {
                horizontal_sampling_factor: h,
                vertical_sampling_factor: v,
                line_stride: usize::from(component.block_size.width) * 8,
            })
        }).collect::<Result<Vec<_>>>()?;

        Ok(Upsampler {
            components,
            max_h,
            max_v,
        })
    }

    /// Fills channel `i` of every 3-byte pixel in `output` from component `i`, replicating
    /// samples of subsampled components.
    pub fn upsample_and_interleave_row(&self,
                                       component_data: &[Vec<u8>],
                                       row: usize,
                                       output_width: usize,
                                       output: &mut [u8]) {
        debug_assert_eq!(component_data.len(), self.components.len());

        for (i, component) in self.components.iter().enumerate() {
            let input_row = row * component.vertical_sampling_factor / self.max_v;
            let line = &component_data[i][input_row * component.line_stride .. (input_row + 1) * component.line_stride];

            for (x, pixel) in output[.. output_width * 3].chunks_exact_mut(3).enumerate() {
                pixel[i] = line[x * component.horizontal_sampling_factor / self.max_h];
            }
        }
    }
}
