mod immediate;
#[cfg(feature = "rayon")]
mod rayon;

use crate::error::Result;
use crate::parser::Component;
use crate::scan::Block;

pub struct RowData {
    pub index: usize,
    pub component: Component,
}

/// Turns rows of dequantized blocks into component sample planes.
///
/// A row holds one MCU row of a component: `block_size.width * vertical_sampling_factor`
/// blocks, in raster order. Rows are borrowed from the coefficient planes, so a worker only
/// allocates the sample planes it returns.
pub trait Worker {
    fn start(&mut self, row_data: RowData) -> Result<()>;
    fn append_row(&mut self, row: (usize, &[Block])) -> Result<()>;
    /// Default implementation for spawning multiple tasks.
    fn append_rows<'a>(&mut self, rows: &mut dyn Iterator<Item = (usize, &'a [Block])>) -> Result<()> {
        for item in rows {
            self.append_row(item)?;
        }
        Ok(())
    }
    fn get_result(&mut self, index: usize) -> Result<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferWorkerKind {
    /// Transform blocks on the calling thread.
    Immediate,
    /// Transform blocks in parallel when the `rayon` feature is enabled.
    Multithreaded,
}

/// Execute something with a worker system.
pub fn with_worker<T>(prefer: PreferWorkerKind, f: impl FnOnce(&mut dyn Worker) -> T) -> T {
    match prefer {
        #[cfg(feature = "rayon")]
        PreferWorkerKind::Multithreaded => self::rayon::with_rayon(f),
        _ => self::immediate::with_immediate(f),
    }
}
