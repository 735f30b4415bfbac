use crate::error::{IoError, Result};
use crate::table::{Table, TableFormat};
use dialprep_core::record::{Header, LeadRecord};
use std::io::{Read, Write};
use std::path::Path;

pub(crate) fn read(path: &Path) -> Result<Table> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader
        .headers()
        .map_err(|err| parse_error(path, err))?
        .iter()
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();
    if header.is_empty() || header.iter().all(|name| name.is_empty()) {
        return Err(IoError::EmptyTable(path.to_path_buf()));
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|err| parse_error(path, err))?;
        records.push(LeadRecord::new(
            index,
            row.iter().map(|cell| cell.to_string()).collect(),
        ));
    }

    Ok(Table {
        header: Header::new(header),
        records,
        format: TableFormat::Csv { delimiter },
    })
}

pub(crate) fn write(path: &Path, columns: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = std::io::BufWriter::new(file);
    // BOM keeps Excel from mis-decoding umlauts in the output.
    file.write_all("\u{FEFF}".as_bytes())
        .map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(file);
    writer
        .write_record(columns)
        .map_err(|err| serialize_error(path, err))?;
    for row in rows {
        writer.write_record(row).map_err(|err| serialize_error(path, err))?;
    }
    let mut file = writer.into_inner().map_err(|err| IoError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    file.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read a file as UTF-8, stripping a BOM if present and falling back to
/// Windows-1252 for Excel-exported files.
fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            let raw = err.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&raw);
            decoded.into_owned()
        }
    };
    Ok(content.strip_prefix('\u{FEFF}').unwrap_or(&content).to_string())
}

/// Pick the delimiter that parses the first lines into the most
/// consistent multi-field rows.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b',', b';', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;
    for &delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|row| row.ok())
                    .map(|row| row.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&count| count == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}

fn parse_error(path: &Path, err: csv::Error) -> IoError {
    IoError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn serialize_error(path: &Path, err: csv::Error) -> IoError {
    IoError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
