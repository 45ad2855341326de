use std::sync::Arc;

use log::{debug, warn};

use crate::error::{Error, Result};

/// A quantization table in zigzag order, as it is stored in the DQT segment.
pub type QuantizationTable = [u16; 64];

/// The (up to four) quantization tables defined so far, keyed by table id.
#[derive(Clone, Debug, Default)]
pub struct QuantizationTables {
    tables: [Option<Arc<QuantizationTable>>; 4],
}

impl QuantizationTables {
    pub fn new() -> QuantizationTables {
        QuantizationTables::default()
    }

    pub fn insert(&mut self, id: usize, table: QuantizationTable) -> Result<()> {
        let slot = self.tables.get_mut(id).ok_or_else(|| {
            Error::Format(format!("invalid quantization table id {}", id))
        })?;

        if slot.is_some() {
            warn!("quantization table {} redefined", id);
        }

        debug!("quantization table {} defined, DC step {}", id, table[0]);
        *slot = Some(Arc::new(table));
        Ok(())
    }

    pub fn get(&self, id: usize) -> Option<&Arc<QuantizationTable>> {
        self.tables.get(id).and_then(Option::as_ref)
    }
}
