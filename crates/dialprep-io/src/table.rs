use crate::error::{IoError, Result};
use crate::{csv, xlsx};
use dialprep_core::record::{Header, LeadRecord};
use std::path::Path;

/// Physical format of one input file. Outputs are written in the same
/// format (and delimiter) as the input they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv { delimiter: u8 },
    Xlsx,
}

/// An input file held in memory: header, data rows, and the format
/// provenance needed to write matching outputs.
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Header,
    pub records: Vec<LeadRecord>,
    pub format: TableFormat,
}

/// Read a delimited-text or spreadsheet file, chosen by extension.
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    match extension(path).as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => csv::read(path),
        Some("xlsx") | Some("xlsm") => xlsx::read(path),
        _ => Err(IoError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::read_table;
    use crate::error::IoError;
    use std::path::Path;

    #[test]
    fn missing_file_is_not_found() {
        let err = read_table(Path::new("/nonexistent/leads.csv")).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("leads.parquet");
        std::fs::write(&path, b"").expect("write");
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }
}
