// All transform arithmetic wraps; coefficients from corrupt files can overflow i32.
use std::num::Wrapping;

use crate::scan::Block;

// Fixed-point constants are scaled by 1 << 12. The column pass keeps 2 extra bits of precision
// and the row pass removes them along with the 1 << 3 gained from the two sqrt(8) scalings.
const COLUMN_BIAS: i32 = 1 << 9;
const COLUMN_SHIFT: usize = 10;
const ROW_BIAS: i32 = (1 << 16) + (128 << 17);
const ROW_SHIFT: usize = 17;

/// Inverse DCT of one block of dequantized coefficients in natural order, writing 8 rows of
/// 8 level-shifted samples into `output` at `output_linestride` apart.
///
/// This follows stb_image's integer transform, so results are bit exact with it.
pub fn idct_block(coefficients: &Block, output_linestride: usize, output: &mut [u8]) {
    debug_assert!(output.len() >= 7 * output_linestride + 8);

    let mut temp = [Wrapping(0i32); 64];

    for column in 0 .. 8 {
        let input = column_of(coefficients, column);

        if input[1 ..].iter().all(|c| c.0 == 0) {
            let dc = input[0] << 2;
            for row in 0 .. 8 {
                temp[row * 8 + column] = dc;
            }
            continue;
        }

        let (even, odd) = kernel(input);
        for k in 0 .. 4 {
            let base = even[k] + Wrapping(COLUMN_BIAS);
            temp[k * 8 + column] = (base + odd[k]) >> COLUMN_SHIFT;
            temp[(7 - k) * 8 + column] = (base - odd[k]) >> COLUMN_SHIFT;
        }
    }

    for row in 0 .. 8 {
        let mut input = [Wrapping(0i32); 8];
        input.copy_from_slice(&temp[row * 8 .. row * 8 + 8]);

        let (even, odd) = kernel(input);
        let line = &mut output[row * output_linestride .. row * output_linestride + 8];
        for k in 0 .. 4 {
            let base = even[k] + Wrapping(ROW_BIAS);
            line[k] = clamp_to_u8((base + odd[k]) >> ROW_SHIFT);
            line[7 - k] = clamp_to_u8((base - odd[k]) >> ROW_SHIFT);
        }
    }
}

fn column_of(coefficients: &Block, column: usize) -> [Wrapping<i32>; 8] {
    let mut input = [Wrapping(0i32); 8];
    for (row, value) in input.iter_mut().enumerate() {
        *value = Wrapping(coefficients[row * 8 + column]);
    }
    input
}

/// 8-point one-dimensional inverse DCT.
///
/// Returns the even and odd halves: output `k` is `even[k] + odd[k]` and output `7 - k` is
/// `even[k] - odd[k]`, both still scaled by 1 << 12.
fn kernel(s: [Wrapping<i32>; 8]) -> ([Wrapping<i32>; 4], [Wrapping<i32>; 4]) {
    // Even part, from s0, s2, s4 and s6.
    let rotated = (s[2] + s[6]) * fixed(0.5411961);
    let e2 = rotated + s[6] * fixed(-1.847759065);
    let e3 = rotated + s[2] * fixed(0.765366865);
    let sum = (s[0] + s[4]) << 12;
    let difference = (s[0] - s[4]) << 12;
    let even = [sum + e3, difference + e2, difference - e2, sum - e3];

    // Odd part, from s1, s3, s5 and s7.
    let (o0, o1, o2, o3) = (s[7], s[5], s[3], s[1]);
    let z3 = o0 + o2;
    let z4 = o1 + o3;
    let z5 = (z3 + z4) * fixed(1.175875602);
    let z1 = z5 + (o0 + o3) * fixed(-0.899976223);
    let z2 = z5 + (o1 + o2) * fixed(-2.562915447);
    let z3 = z3 * fixed(-1.961570560);
    let z4 = z4 * fixed(-0.390180644);
    let odd = [
        o3 * fixed(1.501321110) + z1 + z4,
        o2 * fixed(3.072711026) + z2 + z3,
        o1 * fixed(2.053119869) + z2 + z4,
        o0 * fixed(0.298631336) + z1 + z3,
    ];

    (even, odd)
}

/// Transforms every block of a component plane, writing `blocks_per_row` blocks side by side
/// into `output`, whose rows are `blocks_per_row * 8` samples wide.
pub fn idct_blocks(blocks: &[Block], blocks_per_row: usize, output: &mut [u8]) {
    let line_stride = blocks_per_row * 8;

    for (i, block) in blocks.iter().enumerate() {
        let x = (i % blocks_per_row) * 8;
        let y = (i / blocks_per_row) * 8;

        idct_block(block, line_stride, &mut output[y * line_stride + x ..]);
    }
}

fn clamp_to_u8(x: Wrapping<i32>) -> u8 {
    x.0.max(0).min(255) as u8
}

fn fixed(x: f32) -> Wrapping<i32> {
    Wrapping((x * 4096.0 + 0.5) as i32)
}
