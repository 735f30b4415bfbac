use crate::record::{BoundProfile, BoundSlot, LeadRecord};
use crate::region::{self, Region};
use std::collections::HashSet;

/// Where a selected number came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSlot {
    /// Ranked candidate, 1-based.
    Top(usize),
    MainOffice,
    InputFallback,
}

impl CandidateSlot {
    pub fn label(self) -> String {
        match self {
            CandidateSlot::Top(rank) => format!("Top_{rank}"),
            CandidateSlot::MainOffice => "MainOffice".to_string(),
            CandidateSlot::InputFallback => "InputFallback".to_string(),
        }
    }
}

/// A validated, callable number with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedNumber {
    pub number: String,
    pub region: Region,
    pub slot: CandidateSlot,
    pub type_label: String,
    pub source_url: String,
}

/// Terminal status of one record's phone resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Selected,
    NoDachNumber,
}

/// Immutable per-record resolution result, consumed by dedup and output.
///
/// `main_line` is computed from the main-office column alone, independent
/// of whether a first call was found; the two serve different roles and
/// stay separately inspectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCall {
    pub first_call: Option<SelectedNumber>,
    pub main_line: Option<SelectedNumber>,
    pub backup: Option<SelectedNumber>,
}

impl ResolvedCall {
    pub fn status(&self) -> CallStatus {
        if self.first_call.is_some() {
            CallStatus::Selected
        } else {
            CallStatus::NoDachNumber
        }
    }

    pub fn has_number(&self) -> bool {
        self.first_call.is_some()
    }
}

/// Fax numbers are never callable outreach numbers, regardless of rank.
pub fn is_fax_type(type_label: &str) -> bool {
    type_label.to_lowercase().contains("fax")
}

/// Parse an exclusion cell into a set of normalized numbers. Upstream
/// emits a JSON string list, a Python-repr list, or `;`/`,`-separated
/// text; anything unparseable degrades to an empty set.
pub fn parse_exclusion_set(raw: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let value = raw.trim();
    if value.is_empty() || value == "[]" {
        return out;
    }

    if value.starts_with('[') && value.ends_with(']') {
        if let Ok(entries) = serde_json::from_str::<Vec<serde_json::Value>>(value) {
            for entry in entries {
                let text = match entry {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                };
                insert_normalized(&mut out, &text);
            }
            return out;
        }
        // repr-style list with single quotes
        for part in value[1..value.len() - 1].split(',') {
            insert_normalized(&mut out, part.trim().trim_matches(|c| c == '\'' || c == '"'));
        }
        return out;
    }

    for part in value.split([';', ',']) {
        insert_normalized(&mut out, part);
    }
    out
}

fn insert_normalized(out: &mut HashSet<String>, raw: &str) {
    if let Some(number) = region::normalize_for_match(raw) {
        out.insert(number);
    }
}

/// Resolve the first-call number, the independent main-line backup, and,
/// when the first call is the Top-1 number doubling as the main line, a
/// secondary backup from the remaining ranked slots.
///
/// Slots are consulted in fixed priority order; the first candidate that
/// is not fax-typed, not in the exclusion set, and region-valid wins.
/// Candidates that fail validation are skipped, not errors. Deterministic
/// over identical input.
pub fn resolve(record: &LeadRecord, profile: &BoundProfile, regions: &[Region]) -> ResolvedCall {
    let excluded = parse_exclusion_set(record.cell(profile.exclusion));

    let mut first_call = None;
    for (slot, columns) in priority_slots(profile) {
        if let Some(selected) = candidate(record, slot, columns, regions, &excluded) {
            first_call = Some(selected);
            break;
        }
    }

    let main_line = candidate(
        record,
        CandidateSlot::MainOffice,
        profile.main_office,
        regions,
        &excluded,
    );

    let backup = match (&first_call, &main_line) {
        (Some(call), Some(main)) if call.slot == CandidateSlot::Top(1) && call.number == main.number => {
            profile
                .tops
                .iter()
                .enumerate()
                .skip(1)
                .find_map(|(rank, columns)| {
                    candidate(record, CandidateSlot::Top(rank + 1), *columns, regions, &excluded)
                        .filter(|selected| selected.number != call.number)
                })
        }
        _ => None,
    };

    ResolvedCall {
        first_call,
        main_line,
        backup,
    }
}

fn priority_slots(profile: &BoundProfile) -> Vec<(CandidateSlot, BoundSlot)> {
    let mut slots: Vec<(CandidateSlot, BoundSlot)> = profile
        .tops
        .iter()
        .enumerate()
        .map(|(rank, columns)| (CandidateSlot::Top(rank + 1), *columns))
        .collect();
    slots.push((CandidateSlot::MainOffice, profile.main_office));
    slots.push((
        CandidateSlot::InputFallback,
        BoundSlot {
            number: profile.input_fallback,
            type_label: None,
            source_url: None,
        },
    ));
    slots
}

fn candidate(
    record: &LeadRecord,
    slot: CandidateSlot,
    columns: BoundSlot,
    regions: &[Region],
    excluded: &HashSet<String>,
) -> Option<SelectedNumber> {
    let raw = record.cell(columns.number);
    let type_label = record.cell(columns.type_label);

    if is_fax_type(type_label) {
        return None;
    }
    if let Some(matchable) = region::normalize_for_match(raw) {
        if excluded.contains(&matchable) {
            return None;
        }
    }
    let classified = region::classify(raw, regions)?;

    let type_label = match slot {
        CandidateSlot::InputFallback if type_label.trim().is_empty() => "Input Backup".to_string(),
        _ => type_label.trim().to_string(),
    };
    Some(SelectedNumber {
        number: classified.normalized,
        region: classified.region,
        slot,
        type_label,
        source_url: record.cell(columns.source_url).trim().to_string(),
    })
}
