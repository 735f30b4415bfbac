use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("input table has no header row: {0}")]
    EmptyTable(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {message}")]
    Serialize { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, IoError>;
