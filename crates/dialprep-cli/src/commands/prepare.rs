use crate::commands::{default_output_path, print_json, Context};
use anyhow::{Context as _, Result};
use clap::Args;
use dialprep_core::dedupe::dedupe;
use dialprep_core::excerpt::{ExcerptResult, Markers};
use dialprep_core::record::LeadRecord;
use dialprep_core::resolve::{resolve, ResolvedCall, SelectedNumber};
use dialprep_io::{read_table, OutputTable, RecordWriter, RunSummary};
use std::path::PathBuf;
use tracing::debug;

const PREPARED_MARKER: &str = "_prepared";

const RESOLVED_COLUMNS: [&str; 10] = [
    "resolved_number",
    "resolved_type",
    "resolved_source_url",
    "resolved_region",
    "main_line_backup_number",
    "main_line_backup_type",
    "main_line_backup_source_url",
    "backup_number",
    "backup_type",
    "backup_source_url",
];
const EXCERPT_COLUMNS: [&str; 2] = ["excerpt_text", "excerpt_count"];
const REMOVAL_REASON_COLUMN: &str = "removal_reason";

// Offsets of the phone-bearing appended columns within RESOLVED_COLUMNS.
const PROTECTED_OFFSETS: [usize; 3] = [0, 4, 7];

#[derive(Debug, Args)]
pub struct PrepareArgs {
    #[arg(long, short = 'i')]
    pub input: PathBuf,
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    #[arg(long, help = "Move rows without a resolved number to the removed file")]
    pub drop_unreachable: bool,
}

pub fn run(ctx: &Context<'_>, args: PrepareArgs) -> Result<()> {
    let table = read_table(&args.input)
        .with_context(|| format!("read input {}", args.input.display()))?;
    let profile = ctx.config.columns.bind(&table.header)?;
    let markers = Markers::new(
        &ctx.config.markers.start,
        &ctx.config.markers.end,
        &ctx.config.markers.count_keyword,
    )?;

    let calls: Vec<ResolvedCall> = table
        .records
        .iter()
        .map(|record| resolve(record, &profile, &ctx.config.regions))
        .collect();
    let split = dedupe(&table.records, &calls, &profile);
    debug!(
        input = table.records.len(),
        kept = split.kept.len(),
        duplicates = split.removed.len(),
        "dedup complete"
    );

    let drop_unreachable = args.drop_unreachable || ctx.config.drop_unreachable;
    let (kept, unreachable): (Vec<usize>, Vec<usize>) = if drop_unreachable {
        split
            .kept
            .iter()
            .copied()
            .partition(|&position| calls[position].has_number())
    } else {
        (split.kept.clone(), Vec::new())
    };

    let with_excerpt = profile.pitch.is_some();
    let base = table.header.len();
    let mut columns: Vec<String> = table.header.columns().to_vec();
    columns.extend(RESOLVED_COLUMNS.iter().map(|name| name.to_string()));
    if with_excerpt {
        columns.extend(EXCERPT_COLUMNS.iter().map(|name| name.to_string()));
    }
    let protected: Vec<usize> = PROTECTED_OFFSETS.iter().map(|offset| base + offset).collect();

    let excerpt_of = |record: &LeadRecord| -> Option<ExcerptResult> {
        profile
            .pitch
            .map(|position| markers.extract(record.cell(Some(position))))
    };

    let kept_rows: Vec<Vec<String>> = kept
        .iter()
        .map(|&position| {
            let record = &table.records[position];
            output_row(record, base, &calls[position], excerpt_of(record).as_ref())
        })
        .collect();

    // Removed rows keep the kept-file columns plus the removal reason,
    // in original input order.
    let mut removals: Vec<(usize, String)> = split
        .removed
        .iter()
        .map(|entry| (entry.position, format!("DuplicateOf:{}", entry.kept_index)))
        .collect();
    removals.extend(
        unreachable
            .iter()
            .map(|&position| (position, "NonDachOrInvalid".to_string())),
    );
    removals.sort_unstable_by_key(|(position, _)| *position);

    let duplicate_count = split.removed.len();
    let unreachable_count = unreachable.len();
    let removed_rows: Vec<Vec<String>> = removals
        .into_iter()
        .map(|(position, reason)| {
            let record = &table.records[position];
            let mut row = output_row(record, base, &calls[position], excerpt_of(record).as_ref());
            row.push(reason);
            row
        })
        .collect();

    let mut removed_columns = columns.clone();
    removed_columns.push(REMOVAL_REASON_COLUMN.to_string());

    let kept_table = OutputTable {
        columns,
        rows: kept_rows,
        protected: protected.clone(),
    };
    let removed_table = OutputTable {
        columns: removed_columns,
        rows: removed_rows,
        protected,
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, PREPARED_MARKER));
    let writer = RecordWriter::new(table.format, ctx.config.text_protect_prefix);
    let counts = writer
        .write(&kept_table, &removed_table, &output)
        .with_context(|| format!("write output {}", output.display()))?;

    let mut summary = RunSummary::default();
    summary.set("input_rows", table.records.len() as u64);
    summary.set("kept_rows", counts.kept as u64);
    summary.set("removed_duplicate", duplicate_count as u64);
    summary.set("removed_non_dach_or_invalid", unreachable_count as u64);
    let summary_path = summary
        .write_beside(&output)
        .with_context(|| "write run summary")?;

    if ctx.json {
        print_json(&summary)?;
    } else {
        println!(
            "kept {} of {} rows ({} duplicates, {} without callable number)",
            counts.kept,
            table.records.len(),
            duplicate_count,
            unreachable_count
        );
        println!("wrote {}", output.display());
        println!("wrote {}", dialprep_io::removed_sibling(&output).display());
        println!("wrote {}", summary_path.display());
    }
    Ok(())
}

fn output_row(
    record: &LeadRecord,
    width: usize,
    call: &ResolvedCall,
    excerpt: Option<&ExcerptResult>,
) -> Vec<String> {
    let mut row = record.values.clone();
    row.resize(width, String::new());

    let (number, type_label, source_url, region) = selected_fields(&call.first_call);
    row.extend([number, type_label, source_url, region]);
    let (number, type_label, source_url, _) = selected_fields(&call.main_line);
    row.extend([number, type_label, source_url]);
    let (number, type_label, source_url, _) = selected_fields(&call.backup);
    row.extend([number, type_label, source_url]);

    if let Some(result) = excerpt {
        row.push(result.excerpt.clone());
        row.push(result.count.map(|count| count.to_string()).unwrap_or_default());
    }
    row
}

fn selected_fields(selected: &Option<SelectedNumber>) -> (String, String, String, String) {
    match selected {
        Some(number) => (
            number.number.clone(),
            number.type_label.clone(),
            number.source_url.clone(),
            number.region.as_str().to_string(),
        ),
        None => Default::default(),
    }
}
