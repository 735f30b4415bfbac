use anyhow::Result;
use dialprep_config::AppConfig;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod excerpt;
pub mod prepare;

pub struct Context<'a> {
    pub config: &'a AppConfig,
    pub json: bool,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Default output path: `leads.csv` + `_prepared` -> `leads_prepared.csv`.
pub(crate) fn default_output_path(input: &Path, marker: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}{marker}"),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::default_output_path;
    use std::path::Path;

    #[test]
    fn default_output_inserts_marker_before_extension() {
        assert_eq!(
            default_output_path(Path::new("data/leads.csv"), "_prepared"),
            Path::new("data/leads_prepared.csv")
        );
        assert_eq!(
            default_output_path(Path::new("leads.xlsx"), "_excerpts"),
            Path::new("leads_excerpts.xlsx")
        );
    }
}
