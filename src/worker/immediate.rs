use std::mem;

use crate::decoder::MAX_COMPONENTS;
use crate::error::{Error, Result};
use crate::idct::idct_blocks;
use crate::scan::Block;
use super::{RowData, Worker};

#[derive(Default)]
pub struct ImmediateWorker {
    offsets: [usize; MAX_COMPONENTS],
    results: [Vec<u8>; MAX_COMPONENTS],
    blocks_per_row: [Option<usize>; MAX_COMPONENTS],
}

pub fn with_immediate<T>(f: impl FnOnce(&mut dyn Worker) -> T) -> T {
    let mut worker = ImmediateWorker::default();
    f(&mut worker)
}

impl ImmediateWorker {
    pub fn start_immediate(&mut self, data: RowData) {
        let block_size = data.component.block_size;

        self.offsets[data.index] = 0;
        self.results[data.index] = vec![0u8; block_size.width as usize * block_size.height as usize * 64];
        self.blocks_per_row[data.index] = Some(block_size.width as usize);
    }

    pub fn append_row_immediate(&mut self, (index, data): (usize, &[Block])) -> Result<()> {
        // Convert coefficients from a MCU row to samples.
        let blocks_per_row = self.blocks_per_row(index)?;
        let output = self.reserve(index, data.len())?;

        idct_blocks(data, blocks_per_row, output);
        Ok(())
    }

    pub(super) fn blocks_per_row(&self, index: usize) -> Result<usize> {
        self.blocks_per_row.get(index)
                           .copied()
                           .flatten()
                           .ok_or_else(|| Error::Format(format!("component {} was not started", index)))
    }

    /// Claims the samples of the next `block_count` blocks of a component plane.
    pub(super) fn reserve(&mut self, index: usize, block_count: usize) -> Result<&mut [u8]> {
        let offset = self.offsets[index];
        let end = offset + block_count * 64;

        self.offsets[index] = end;
        self.results[index].get_mut(offset .. end)
                           .ok_or_else(|| Error::Format(format!("too many block rows for component {}", index)))
    }

    pub fn get_result_immediate(&mut self, index: usize) -> Vec<u8> {
        mem::take(&mut self.results[index])
    }
}

impl Worker for ImmediateWorker {
    fn start(&mut self, data: RowData) -> Result<()> {
        self.start_immediate(data);
        Ok(())
    }
    fn append_row(&mut self, row: (usize, &[Block])) -> Result<()> {
        self.append_row_immediate(row)
    }
    fn get_result(&mut self, index: usize) -> Result<Vec<u8>> {
        Ok(self.get_result_immediate(index))
    }
}
