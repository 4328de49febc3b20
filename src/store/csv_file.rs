use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{Row, RowStore, Sheet};
use crate::error::{Result, RosterError};

/// One CSV file per sheet (`Users.csv`, `Config.csv`, `Schedule.csv`) inside a data directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Opens an existing data directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(RosterError::ConfigurationMissing(format!(
                "data directory {} does not exist (run `acolyte-roster init`)",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Creates the data directory if needed and opens it.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Self::open(dir)
    }

    pub fn sheet_path(&self, sheet: Sheet) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet.title()))
    }

    /// Writes header + rows into a temp file next to the target, then renames it into place.
    fn write_atomically(&self, sheet: Sheet, rows: &[Row]) -> Result<()> {
        let headers = sheet.headers();
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        {
            let mut wtr = WriterBuilder::new().from_writer(&mut staged);
            wtr.write_record(headers)?;
            for row in rows {
                wtr.write_record(record_for(headers, row))?;
            }
            wtr.flush()?;
        }
        staged
            .persist(self.sheet_path(sheet))
            .map_err(|e| RosterError::Io(e.error))?;
        debug!(sheet = %sheet, rows = rows.len(), "sheet rewritten");
        Ok(())
    }
}

fn record_for<'a>(headers: &'a [&'a str], row: &'a Row) -> impl Iterator<Item = &'a str> + 'a {
    headers
        .iter()
        .map(move |h| row.get(*h).map(String::as_str).unwrap_or(""))
}

impl RowStore for CsvStore {
    fn list_rows(&self, sheet: Sheet) -> Result<Vec<Row>> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(&path)?;
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .filter(|(h, _)| !h.is_empty())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            // Fully blank lines carry no data
            if row.values().all(|v| v.trim().is_empty()) {
                continue;
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn append_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            self.write_atomically(sheet, &[])?;
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        for row in rows {
            wtr.write_record(record_for(sheet.headers(), row))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn clear(&self, sheet: Sheet) -> Result<()> {
        self.write_atomically(sheet, &[])
    }

    fn replace_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()> {
        self.write_atomically(sheet, rows)
    }
}
