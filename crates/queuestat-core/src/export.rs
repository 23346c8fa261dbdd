//! Export of analysis results
//!
//! Series go out as pretty-printed JSON for external plotting; loss tables
//! go out as CSV with one row per capacity configuration.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use queuestat_erlang::LossRow;
use serde::Serialize;
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};

/// Column names of an exported loss table, in record order
pub const LOSS_TABLE_HEADER: [&str; 4] = ["node_capacity", "number_of_seats", "queue_capacity", "loss_probability"];

#[derive(Serialize)]
struct LossRecord {
    node_capacity: u32,
    number_of_seats: u32,
    queue_capacity: u32,
    loss_probability: f64,
}

impl From<&LossRow> for LossRecord {
    fn from(row: &LossRow) -> Self {
        Self {
            node_capacity: row.capacity,
            number_of_seats: row.servers,
            queue_capacity: row.queue_size,
            loss_probability: row.loss_probability,
        }
    }
}

/// Writes result files into one directory
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
}

impl Exporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write any serializable result as `<name>.json`
    pub fn json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> AnalysisResult<PathBuf> {
        let path = self.prepare(name, "json")?;
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| AnalysisError::Export(e.to_string()))?;
        writer.flush()?;

        info!(path = %path.display(), "Exported series");
        Ok(path)
    }

    /// Write a loss table as `<name>.csv`
    pub fn loss_table(&self, name: &str, rows: &[LossRow]) -> AnalysisResult<PathBuf> {
        let path = self.prepare(name, "csv")?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| AnalysisError::Export(e.to_string()))?;
        writer
            .write_record(LOSS_TABLE_HEADER)
            .map_err(|e| AnalysisError::Export(e.to_string()))?;
        for row in rows {
            writer
                .serialize(LossRecord::from(row))
                .map_err(|e| AnalysisError::Export(e.to_string()))?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = rows.len(), "Exported loss table");
        Ok(path)
    }

    fn prepare(&self, name: &str, extension: &str) -> AnalysisResult<PathBuf> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') {
            return Err(AnalysisError::Export(format!("invalid export name {name:?}")));
        }
        fs::create_dir_all(&self.directory)?;
        Ok(self.directory.join(format!("{name}.{extension}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_loss_table_keeps_header() {
        let dir = tempdir().unwrap();
        let path = Exporter::new(dir.path()).loss_table("empty", &[]).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "node_capacity,number_of_seats,queue_capacity,loss_probability\n");
    }

    #[test]
    fn test_loss_table_header_written_once() {
        let dir = tempdir().unwrap();
        let row = LossRow {
            servers: 3,
            queue_size: 2,
            capacity: 5,
            loss_probability: 0.5,
        };
        let path = Exporter::new(dir.path()).loss_table("one", &[row]).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["node_capacity,number_of_seats,queue_capacity,loss_probability", "5,3,2,0.5"]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let path = Exporter::new(dir.path()).json("values", &vec![1.0, 2.0]).unwrap();

        let parsed: Vec<f64> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, vec![1.0, 2.0]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_json_reports_write_failure() {
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink("/dev/full", dir.path().join("mean.json")).unwrap();

        let result = Exporter::new(dir.path()).json("mean", &vec![1.0, 2.0, 3.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_path_separators() {
        let exporter = Exporter::new("unused");
        assert!(matches!(exporter.json("a/b", &1), Err(AnalysisError::Export(_))));
        assert!(matches!(exporter.loss_table("", &[]), Err(AnalysisError::Export(_))));
    }
}
