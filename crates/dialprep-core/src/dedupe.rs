use crate::record::{BoundProfile, LeadRecord};
use crate::resolve::ResolvedCall;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Normalized identity of one company: collapsed name plus canonical URL.
/// Two records with equal keys are the same company.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn of(record: &LeadRecord, profile: &BoundProfile) -> Self {
        let company = normalize_company(record.cell(Some(profile.company)));
        let mut url = record.cell(profile.canonical_url);
        if url.trim().is_empty() {
            url = record.cell(profile.fallback_url);
        }
        DedupKey(format!("{company}||{}", normalize_url(url)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lower-case and collapse internal whitespace.
pub fn normalize_company(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip scheme, `www.` prefix, and trailing slashes; lower-case the rest.
pub fn normalize_url(url: &str) -> String {
    let mut value = url.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = value.strip_prefix(scheme) {
            value = rest.to_string();
            break;
        }
    }
    let value = value.strip_prefix("www.").unwrap_or(&value);
    value.trim_end_matches('/').to_string()
}

/// A record dropped in favor of another member of its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedRecord {
    /// Position into the input slice.
    pub position: usize,
    pub key: DedupKey,
    /// Original row index of the record it lost to.
    pub kept_index: usize,
}

/// Result of deduplicating one batch, as positions into the input slice.
/// Kept plus removed always covers the whole input, each in original
/// input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupSplit {
    pub kept: Vec<usize>,
    pub removed: Vec<RemovedRecord>,
}

/// Group records by dedup key and keep exactly one per group: a record
/// with a resolved number beats one without, ties go to the earliest
/// original index. Fields are never merged across group members; the
/// winner's row is used as-is.
///
/// `calls` must parallel `records` (one ResolvedCall per record).
pub fn dedupe(records: &[LeadRecord], calls: &[ResolvedCall], profile: &BoundProfile) -> DedupSplit {
    let mut order: Vec<DedupKey> = Vec::new();
    let mut groups: HashMap<DedupKey, Vec<usize>> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        match groups.entry(DedupKey::of(record, profile)) {
            Entry::Occupied(mut entry) => entry.get_mut().push(position),
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(vec![position]);
            }
        }
    }

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for key in &order {
        let Some(members) = groups.get(key) else {
            continue;
        };
        let Some(&winner) = members
            .iter()
            .min_by_key(|&&position| (!has_number(calls, position), records[position].index))
        else {
            continue;
        };
        kept.push(winner);
        for &position in members {
            if position != winner {
                removed.push(RemovedRecord {
                    position,
                    key: key.clone(),
                    kept_index: records[winner].index,
                });
            }
        }
    }

    kept.sort_unstable();
    removed.sort_unstable_by_key(|entry| entry.position);
    DedupSplit { kept, removed }
}

fn has_number(calls: &[ResolvedCall], position: usize) -> bool {
    calls.get(position).map(ResolvedCall::has_number).unwrap_or(false)
}
