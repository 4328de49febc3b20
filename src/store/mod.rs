//! Row-oriented storage collaborator. Each sheet is a flat table of string cells keyed by header.

pub mod csv_file;
pub mod memory;

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

pub use csv_file::CsvStore;
pub use memory::MemoryStore;

/// One row of a sheet: header -> cell.
pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Users,
    Config,
    Schedule,
}

impl Sheet {
    pub const ALL: [Sheet; 3] = [Sheet::Users, Sheet::Config, Sheet::Schedule];

    pub fn title(&self) -> &'static str {
        match self {
            Sheet::Users => "Users",
            Sheet::Config => "Config",
            Sheet::Schedule => "Schedule",
        }
    }

    /// Column order used when the sheet is written out.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Sheet::Users => &["id", "name", "role", "active", "limitations"],
            Sheet::Config => &["day", "time", "type", "setting_key", "setting_value"],
            Sheet::Schedule => &[
                "id",
                "date",
                "time",
                "is_central_mass",
                "assigned_acolyte_id",
                "attendance_status",
            ],
        }
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The narrow interface the roster needs from its backing store.
///
/// `replace_rows` must be atomic from a reader's point of view: a concurrent
/// `list_rows` observes either the old rows or the new ones.
pub trait RowStore: Send + Sync {
    fn list_rows(&self, sheet: Sheet) -> Result<Vec<Row>>;

    fn append_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()>;

    /// Drops every data row, keeping the header. Idempotent.
    fn clear(&self, sheet: Sheet) -> Result<()>;

    fn replace_rows(&self, sheet: Sheet, rows: &[Row]) -> Result<()>;
}

/// Returns the trimmed cell for `key`, or `""` when the column is absent.
pub fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(|v| v.trim()).unwrap_or("")
}

/// Builds a row from `(header, value)` pairs.
pub fn row<I, K, V>(cells: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    cells
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
