use crate::error::Result;
use crate::types::FacultyTableRow;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Concatenated multi-year dataset.
///
/// Rows are append-only and never deduplicated across years: the same person
/// appearing in two catalogs is two rows, which is what the downstream
/// analysis expects.
#[derive(Debug, Default)]
pub struct Warehouse {
    rows: Vec<FacultyTableRow>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[FacultyTableRow] {
        &self.rows
    }

    pub fn append_year(&mut self, rows: Vec<FacultyTableRow>) {
        self.rows.extend(rows);
    }

    /// Load every per-year snapshot in `dir`, concatenated in label order.
    pub fn from_snapshots(dir: impl AsRef<Path>) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut warehouse = Self::new();
        for path in paths {
            let rows: Vec<FacultyTableRow> = serde_json::from_str(&fs::read_to_string(&path)?)?;
            debug!("loaded {} rows from {}", rows.len(), path.display());
            warehouse.append_year(rows);
        }
        Ok(warehouse)
    }

    /// Export the assembled dataset for the reporting layer.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!("wrote {} rows to {}", self.rows.len(), path.as_ref().display());
        Ok(())
    }
}
