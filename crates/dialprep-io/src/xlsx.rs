use crate::error::{IoError, Result};
use crate::table::{Table, TableFormat};
use calamine::{open_workbook_auto, Data, Reader};
use dialprep_core::record::{Header, LeadRecord};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Sheet1";
const MAX_COLUMN_WIDTH: f64 = 80.0;

pub(crate) fn read(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|err| IoError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| IoError::EmptyTable(path.to_path_buf()))?;
    let range = workbook
        .worksheet_range(first)
        .map_err(|err| IoError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| IoError::EmptyTable(path.to_path_buf()))?
        .iter()
        .map(cell_to_string)
        .collect();
    if header.iter().all(|name| name.is_empty()) {
        return Err(IoError::EmptyTable(path.to_path_buf()));
    }

    let records = rows
        .enumerate()
        .map(|(index, row)| LeadRecord::new(index, row.iter().map(cell_to_string).collect()))
        .collect();

    Ok(Table {
        header: Header::new(header),
        records,
        format: TableFormat::Xlsx,
    })
}

/// Render one calamine cell as text. Whole floats lose the trailing
/// `.0` so phone numbers that came in as numeric cells survive.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

/// Write one sheet. Columns listed in `text_columns` get an explicit
/// text number-format so spreadsheet apps never coerce phone values;
/// every column is sized to its longest cell.
pub(crate) fn write(
    path: &Path,
    columns: &[String],
    rows: &[Vec<String>],
    text_columns: &[usize],
) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(|err| IoError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let text_format = Format::new().set_num_format("@");

    for (column, name) in columns.iter().enumerate() {
        sheet
            .write_string(0, column as u16, name)
            .map_err(|err| IoError::Serialize {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
    }
    for (row, values) in rows.iter().enumerate() {
        for (column, value) in values.iter().enumerate() {
            let result = if text_columns.contains(&column) {
                sheet.write_string_with_format((row + 1) as u32, column as u16, value, &text_format)
            } else {
                sheet.write_string((row + 1) as u32, column as u16, value)
            };
            result.map_err(|err| IoError::Serialize {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        }
    }

    for (column, width) in column_widths(columns, rows) {
        sheet
            .set_column_width(column as u16, width)
            .map_err(|err| IoError::Serialize {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
    }

    workbook.save(path).map_err(|err| IoError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<(usize, f64)> {
    columns
        .iter()
        .enumerate()
        .map(|(column, name)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0)
                .max(name.chars().count());
            (column, ((longest + 2) as f64).min(MAX_COLUMN_WIDTH))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{read, write};
    use crate::table::TableFormat;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_preserves_cells() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("leads.xlsx");
        let columns = vec!["CompanyName".to_string(), "resolved_number".to_string()];
        let rows = vec![vec!["Müller GmbH".to_string(), "'+49301234567".to_string()]];

        write(&path, &columns, &rows, &[1]).expect("write");
        let table = read(&path).expect("read");

        assert_eq!(table.format, TableFormat::Xlsx);
        assert_eq!(table.header.columns(), ["CompanyName", "resolved_number"]);
        assert_eq!(table.records[0].values, ["Müller GmbH", "'+49301234567"]);
    }

    #[test]
    fn empty_workbook_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("empty.xlsx");
        write(&path, &[], &[], &[]).expect("write");
        assert!(read(&path).is_err());
    }
}
