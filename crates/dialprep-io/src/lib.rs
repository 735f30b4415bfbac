pub mod csv;
pub mod error;
pub mod table;
pub mod writer;
pub mod xlsx;

pub use error::{IoError, Result};
pub use table::{read_table, Table, TableFormat};
pub use writer::{removed_sibling, OutputTable, RecordWriter, RunSummary, WriteCounts};
