use crate::commands::{default_output_path, print_json, Context};
use anyhow::{Context as _, Result};
use clap::Args;
use dialprep_core::excerpt::Markers;
use dialprep_io::{read_table, OutputTable, RecordWriter, RunSummary};
use std::path::PathBuf;
use tracing::debug;

const EXCERPT_MARKER: &str = "_excerpts";

#[derive(Debug, Args)]
pub struct ExcerptArgs {
    #[arg(long, short = 'i')]
    pub input: PathBuf,
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    #[arg(long, help = "Free-text column to excerpt (default from config)")]
    pub column: Option<String>,
}

pub fn run(ctx: &Context<'_>, args: ExcerptArgs) -> Result<()> {
    let table = read_table(&args.input)
        .with_context(|| format!("read input {}", args.input.display()))?;
    let pitch = ctx
        .config
        .columns
        .bind_pitch(&table.header, args.column.as_deref())?;
    let markers = Markers::new(
        &ctx.config.markers.start,
        &ctx.config.markers.end,
        &ctx.config.markers.count_keyword,
    )?;

    let mut columns: Vec<String> = table.header.columns().to_vec();
    columns.push("excerpt_text".to_string());
    columns.push("excerpt_count".to_string());

    let mut with_excerpt = 0u64;
    let mut with_count = 0u64;
    let rows: Vec<Vec<String>> = table
        .records
        .iter()
        .map(|record| {
            let result = markers.extract(record.cell(Some(pitch)));
            if !result.excerpt.is_empty() {
                with_excerpt += 1;
            }
            if result.count.is_some() {
                with_count += 1;
            }
            let mut row = record.values.clone();
            row.resize(table.header.len(), String::new());
            row.push(result.excerpt);
            row.push(result.count.map(|count| count.to_string()).unwrap_or_default());
            row
        })
        .collect();
    debug!(rows = rows.len(), with_excerpt, with_count, "excerpts extracted");

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, EXCERPT_MARKER));
    let writer = RecordWriter::new(table.format, ctx.config.text_protect_prefix);
    let written = writer
        .write_single(
            &OutputTable {
                columns,
                rows,
                protected: Vec::new(),
            },
            &output,
        )
        .with_context(|| format!("write output {}", output.display()))?;

    let mut summary = RunSummary::default();
    summary.set("input_rows", table.records.len() as u64);
    summary.set("kept_rows", written as u64);
    summary.set("rows_with_excerpt", with_excerpt);
    summary.set("rows_with_count", with_count);
    let summary_path = summary
        .write_beside(&output)
        .with_context(|| "write run summary")?;

    if ctx.json {
        print_json(&summary)?;
    } else {
        println!(
            "excerpted {} of {} rows ({} with lead count)",
            with_excerpt,
            table.records.len(),
            with_count
        );
        println!("wrote {}", output.display());
        println!("wrote {}", summary_path.display());
    }
    Ok(())
}
