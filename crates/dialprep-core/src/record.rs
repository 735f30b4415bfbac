use crate::error::CoreError;
use std::collections::HashMap;

/// Column header of one input table. The column set is input-defined;
/// nothing here assumes a closed schema.
#[derive(Debug, Clone, Default)]
pub struct Header {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();
        Self { columns, positions }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One input row: raw cell values in header order plus the original
/// data-row position (0-based, header excluded), used for deterministic
/// tie-breaks and audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub index: usize,
    pub values: Vec<String>,
}

impl LeadRecord {
    pub fn new(index: usize, values: Vec<String>) -> Self {
        Self { index, values }
    }

    /// Read a cell by bound position. Absent columns and short rows read
    /// as empty rather than failing, so malformed rows keep flowing.
    pub fn cell(&self, position: Option<usize>) -> &str {
        position
            .and_then(|p| self.values.get(p))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Column names for one ranked candidate slot. Empty names mean the slot
/// has no such column in this profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSlotColumns {
    pub number: String,
    pub type_label: String,
    pub source_url: String,
}

/// Logical column roles, by name. Built once from configuration; the
/// resolution and dedup logic never touches a literal column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProfile {
    pub company: String,
    pub canonical_url: String,
    pub fallback_url: String,
    pub tops: Vec<TopSlotColumns>,
    pub main_office_number: String,
    pub main_office_type: String,
    pub main_office_source_url: String,
    pub input_fallback_number: String,
    pub exclusion_list: String,
    pub pitch: String,
}

impl Default for FieldProfile {
    fn default() -> Self {
        let tops = (1..=3)
            .map(|rank| TopSlotColumns {
                number: format!("Top_Number_{rank}"),
                type_label: format!("Top_Type_{rank}"),
                source_url: format!("Top_SourceURL_{rank}"),
            })
            .collect();
        Self {
            company: "CompanyName".to_string(),
            canonical_url: "CanonicalEntryURL".to_string(),
            fallback_url: "GivenURL".to_string(),
            tops,
            main_office_number: "MainOffice_Number".to_string(),
            main_office_type: "MainOffice_Type".to_string(),
            main_office_source_url: "MainOffice_SourceURL".to_string(),
            input_fallback_number: "Company Phone".to_string(),
            exclusion_list: "SuspectedOtherOrgNumbers".to_string(),
            pitch: "sales_pitch".to_string(),
        }
    }
}

/// Bound positions of one candidate slot within a concrete header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundSlot {
    pub number: Option<usize>,
    pub type_label: Option<usize>,
    pub source_url: Option<usize>,
}

/// A profile resolved against one input header. The company column is
/// required; candidate columns degrade to absent slots when missing, but
/// at least one number-bearing column must exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundProfile {
    pub company: usize,
    pub canonical_url: Option<usize>,
    pub fallback_url: Option<usize>,
    pub tops: Vec<BoundSlot>,
    pub main_office: BoundSlot,
    pub input_fallback: Option<usize>,
    pub exclusion: Option<usize>,
    pub pitch: Option<usize>,
}

impl FieldProfile {
    pub fn bind(&self, header: &Header) -> Result<BoundProfile, CoreError> {
        let company = header
            .position(&self.company)
            .ok_or_else(|| CoreError::MissingColumn(self.company.clone()))?;

        let tops: Vec<BoundSlot> = self
            .tops
            .iter()
            .map(|slot| BoundSlot {
                number: lookup(header, &slot.number),
                type_label: lookup(header, &slot.type_label),
                source_url: lookup(header, &slot.source_url),
            })
            .collect();
        let main_office = BoundSlot {
            number: lookup(header, &self.main_office_number),
            type_label: lookup(header, &self.main_office_type),
            source_url: lookup(header, &self.main_office_source_url),
        };
        let input_fallback = lookup(header, &self.input_fallback_number);

        let any_candidate = tops.iter().any(|slot| slot.number.is_some())
            || main_office.number.is_some()
            || input_fallback.is_some();
        if !any_candidate {
            return Err(CoreError::NoCandidateColumns);
        }

        Ok(BoundProfile {
            company,
            canonical_url: lookup(header, &self.canonical_url),
            fallback_url: lookup(header, &self.fallback_url),
            tops,
            main_office,
            input_fallback,
            exclusion: lookup(header, &self.exclusion_list),
            pitch: lookup(header, &self.pitch),
        })
    }

    /// Bind only the pitch column, for excerpt-only runs. An explicit
    /// override takes precedence over the profile name.
    pub fn bind_pitch(&self, header: &Header, column: Option<&str>) -> Result<usize, CoreError> {
        let name = column.unwrap_or(&self.pitch);
        header
            .position(name)
            .ok_or_else(|| CoreError::MissingColumn(name.to_string()))
    }
}

fn lookup(header: &Header, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    header.position(name)
}

#[cfg(test)]
mod tests {
    use super::{FieldProfile, Header, LeadRecord};
    use crate::error::CoreError;

    fn header(columns: &[&str]) -> Header {
        Header::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn bind_resolves_default_profile() {
        let header = header(&[
            "CompanyName",
            "CanonicalEntryURL",
            "Top_Number_1",
            "Top_Type_1",
            "MainOffice_Number",
            "sales_pitch",
        ]);
        let bound = FieldProfile::default().bind(&header).expect("bind");
        assert_eq!(bound.company, 0);
        assert_eq!(bound.tops[0].number, Some(2));
        assert_eq!(bound.tops[0].source_url, None);
        assert_eq!(bound.tops[1].number, None);
        assert_eq!(bound.main_office.number, Some(4));
        assert_eq!(bound.pitch, Some(5));
        assert_eq!(bound.fallback_url, None);
    }

    #[test]
    fn bind_requires_company_column() {
        let header = header(&["Top_Number_1"]);
        let err = FieldProfile::default().bind(&header).unwrap_err();
        assert_eq!(err, CoreError::MissingColumn("CompanyName".to_string()));
    }

    #[test]
    fn bind_requires_some_candidate_column() {
        let header = header(&["CompanyName", "CanonicalEntryURL"]);
        let err = FieldProfile::default().bind(&header).unwrap_err();
        assert_eq!(err, CoreError::NoCandidateColumns);
    }

    #[test]
    fn bind_pitch_prefers_override() {
        let header = header(&["CompanyName", "Pitch_DE", "sales_pitch"]);
        let profile = FieldProfile::default();
        assert_eq!(profile.bind_pitch(&header, None).expect("default"), 2);
        assert_eq!(
            profile.bind_pitch(&header, Some("Pitch_DE")).expect("override"),
            1
        );
        assert!(profile.bind_pitch(&header, Some("Missing")).is_err());
    }

    #[test]
    fn cell_reads_short_rows_as_empty() {
        let record = LeadRecord::new(0, vec!["Acme".to_string()]);
        assert_eq!(record.cell(Some(0)), "Acme");
        assert_eq!(record.cell(Some(5)), "");
        assert_eq!(record.cell(None), "");
    }
}
