use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("column not found in input header: {0}")]
    MissingColumn(String),
    #[error("no phone candidate column present in input header")]
    NoCandidateColumns,
    #[error("invalid excerpt pattern: {0}")]
    InvalidExcerptPattern(String),
}
