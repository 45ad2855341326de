use rayon::prelude::*;

use crate::decoder::MAX_COMPONENTS;
use crate::error::{Error, Result};
use crate::idct::idct_blocks;
use crate::scan::Block;

use super::immediate::ImmediateWorker;
use super::{RowData, Worker};

/// Same bookkeeping as `ImmediateWorker`, but rows handed over together are transformed in
/// parallel. Each row owns a disjoint slice of its component plane.
#[derive(Default)]
pub struct Scoped {
    inner: ImmediateWorker,
}

pub fn with_rayon<T>(f: impl FnOnce(&mut dyn Worker) -> T) -> T {
    let mut worker = Scoped::default();
    f(&mut worker)
}

impl Worker for Scoped {
    fn start(&mut self, row_data: RowData) -> Result<()> {
        self.inner.start_immediate(row_data);
        Ok(())
    }

    fn append_row(&mut self, row: (usize, &[Block])) -> Result<()> {
        self.inner.append_row_immediate(row)
    }

    fn get_result(&mut self, index: usize) -> Result<Vec<u8>> {
        Ok(self.inner.get_result_immediate(index))
    }

    // Magic sauce, these _may_ run in parallel.
    fn append_rows<'a>(&mut self, iter: &mut dyn Iterator<Item = (usize, &'a [Block])>) -> Result<()> {
        let mut pending: [Vec<&'a [Block]>; MAX_COMPONENTS] = Default::default();

        for (index, data) in iter {
            pending.get_mut(index)
                   .ok_or_else(|| Error::Format(format!("invalid component index {}", index)))?
                   .push(data);
        }

        for (index, rows) in pending.iter().enumerate() {
            // Rows of one component all hold the same number of blocks.
            let blocks_in_row = match rows.first() {
                Some(row) if !row.is_empty() => row.len(),
                _ => continue,
            };

            let blocks_per_row = self.inner.blocks_per_row(index)?;
            let output = self.inner.reserve(index, blocks_in_row * rows.len())?;

            output.par_chunks_mut(blocks_in_row * 64)
                  .zip(rows.par_iter())
                  .for_each(|(samples, blocks)| idct_blocks(blocks, blocks_per_row, samples));
        }

        Ok(())
    }
}
