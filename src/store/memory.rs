use std::collections::HashMap;
use std::sync::Mutex;

use super::{Row, RowStore, Sheet};
use crate::error::{Result, RosterError};

/// In-process store backing the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<Sheet, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Sheet, Vec<Row>>>> {
        self.sheets
            .lock()
            .map_err(|_| RosterError::Storage("memory store lock poisoned".to_string()))
    }
}

impl RowStore for MemoryStore {
    fn list_rows(&self, sheet: Sheet) -> Result<Vec<Row>> {
        Ok(self.lock()?.get(&sheet).cloned().unwrap_or_default())
    }

    fn append_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()> {
        self.lock()?
            .entry(sheet)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    fn clear(&self, sheet: Sheet) -> Result<()> {
        self.lock()?.insert(sheet, Vec::new());
        Ok(())
    }

    fn replace_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()> {
        self.lock()?.insert(sheet, rows.to_vec());
        Ok(())
    }
}
