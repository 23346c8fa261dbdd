//! Raw scavetool record reader
//!
//! Each CSV line is either a run attribute (`type = "runattr"`/`"itervar"`,
//! with `attrname`/`attrvalue`) or a result row (`type = "vector"`, with
//! `name`, `vectime` and `vecvalue`). Columns other than the ones below are
//! ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while ingesting simulation output
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Run {run} defines attribute {attribute} more than once")]
    DuplicateAttribute { run: String, attribute: String },

    #[error("Run {run} has vectors but no {attribute} attribute")]
    MissingAttribute { run: String, attribute: String },

    #[error("Run {run}: cannot parse {column} value {value:?} as a number")]
    InvalidNumber {
        run: String,
        column: String,
        value: String,
    },
}

/// Result type for ingestion operations
pub type IoResult<T> = Result<T, IoError>;

/// One line of a scavetool CSV export
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunRecord {
    pub run: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attrname: Option<String>,
    #[serde(default)]
    pub attrvalue: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub vectime: Option<String>,
    #[serde(default)]
    pub vecvalue: Option<String>,
}

impl RunRecord {
    /// Attribute name and value, if this line defines a run attribute
    pub fn attribute(&self) -> Option<(&str, &str)> {
        let name = non_empty(&self.attrname)?;
        let value = non_empty(&self.attrvalue)?;
        Some((name, value))
    }

    /// Whether this line carries a vector result
    pub fn is_vector(&self) -> bool {
        non_empty(&self.name).is_some() && non_empty(&self.vecvalue).is_some()
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Read every record of a scavetool CSV file
pub fn read_records(path: impl AsRef<Path>) -> IoResult<Vec<RunRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path).map_err(|e| IoError::Csv(e.to_string()))?;
    let records = read_records_from(BufReader::new(file))?;
    debug!(path = %path.display(), records = records.len(), "Read scavetool export");
    Ok(records)
}

/// Read records from any CSV source with a header line
pub fn read_records_from<R: Read>(source: R) -> IoResult<Vec<RunRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
    if !headers.iter().any(|h| h == "run") {
        return Err(IoError::InvalidFormat("missing required column: run".into()));
    }

    reader
        .deserialize()
        .map(|result| result.map_err(|e| IoError::Csv(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
run,type,module,name,attrname,attrvalue,value,vectime,vecvalue
r0,runattr,,,CASH,1min,,,
r0,runattr,,,repetition,0,,,
r0,vector,Bar.cashier,waitingTime:vector,,,,0 1 2,0.5 0.25 1
";

    #[test]
    fn test_read_records() {
        let records = read_records_from(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].attribute(), Some(("CASH", "1min")));
        assert!(!records[0].is_vector());

        assert!(records[2].is_vector());
        assert_eq!(records[2].kind.as_deref(), Some("vector"));
        assert_eq!(records[2].vecvalue.as_deref(), Some("0.5 0.25 1"));
    }

    #[test]
    fn test_extra_and_missing_columns() {
        let csv = "run,attrname,attrvalue,extra\nr1,CASH,2min,ignored\n";
        let records = read_records_from(csv.as_bytes()).unwrap();
        assert_eq!(records[0].attribute(), Some(("CASH", "2min")));
        assert_eq!(records[0].vecvalue, None);
    }

    #[test]
    fn test_missing_run_column() {
        let csv = "name,vecvalue\nx,1 2\n";
        assert!(matches!(
            read_records_from(csv.as_bytes()),
            Err(IoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_file_not_found() {
        assert!(matches!(
            read_records("/nonexistent/results.csv"),
            Err(IoError::FileNotFound(_))
        ));
    }
}
