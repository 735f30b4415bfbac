use serde::{Deserialize, Serialize};

/// Target dialing regions. The active subset is configuration; the set of
/// known regions is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    De,
    At,
    Ch,
}

impl Region {
    pub const fn calling_code(self) -> &'static str {
        match self {
            Region::De => "49",
            Region::At => "43",
            Region::Ch => "41",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Region::De => "DE",
            Region::At => "AT",
            Region::Ch => "CH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DE" => Some(Region::De),
            "AT" => Some(Region::At),
            "CH" => Some(Region::Ch),
            _ => None,
        }
    }

    pub const fn all() -> &'static [Region] {
        &[Region::De, Region::At, Region::Ch]
    }
}

/// A phone string accepted by [`classify`]: canonical dial form plus the
/// matched region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub normalized: String,
    pub region: Region,
}

const SEPARATORS: &[char] = &[' ', '\t', '-', '/', '(', ')', '.'];

// Subscriber part below this is noise, not a dialable number.
const MIN_SUBSCRIBER_DIGITS: usize = 5;

/// Classify a raw phone string against the active region set.
///
/// Accepts `+<code>` and `00<code>` international forms only; national
/// formats are rejected, never inferred into a region. Returns the
/// canonical `+<code><digits>` form and the matched region, or `None`.
pub fn classify(raw: &str, regions: &[Region]) -> Option<Classified> {
    let digits = canonical_digits(raw)?;
    let digits = digits.strip_prefix('+')?;
    for &region in regions {
        if let Some(subscriber) = digits.strip_prefix(region.calling_code()) {
            if subscriber.len() < MIN_SUBSCRIBER_DIGITS {
                return None;
            }
            return Some(Classified {
                normalized: format!("+{digits}"),
                region,
            });
        }
    }
    None
}

/// Normalize a phone-ish string for equality comparison: same cleanup as
/// [`classify`] without the region gate. Used to match candidates against
/// exclusion-list entries that may be formatted differently.
pub fn normalize_for_match(raw: &str) -> Option<String> {
    canonical_digits(raw)
}

/// Strip the spreadsheet text-protection prefix and separator characters,
/// then fold a leading `00` international prefix into `+`. `None` when a
/// non-dialing character is present or no digits remain.
fn canonical_digits(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    if let Some(rest) = value.strip_prefix('\'') {
        value = rest.trim_start();
    }

    let mut digits = String::with_capacity(value.len());
    let mut plus = false;
    for ch in value.chars() {
        match ch {
            '+' if digits.is_empty() && !plus => plus = true,
            '0'..='9' => digits.push(ch),
            c if SEPARATORS.contains(&c) => {}
            _ => return None,
        }
    }

    if digits.is_empty() {
        return None;
    }

    if !plus {
        if let Some(rest) = digits.strip_prefix("00") {
            digits = rest.to_string();
            plus = true;
        }
    }

    if plus {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, normalize_for_match, Region};

    #[test]
    fn classify_accepts_all_three_regions() {
        let cases = [
            ("+49 30 1234567", "+49301234567", Region::De),
            ("+43 1 5550123", "+4315550123", Region::At),
            ("+41 44 1112233", "+41441112233", Region::Ch),
        ];
        for (raw, normalized, region) in cases {
            let result = classify(raw, Region::all()).expect("classify");
            assert_eq!(result.normalized, normalized);
            assert_eq!(result.region, region);
        }
    }

    #[test]
    fn classify_folds_international_zero_prefix() {
        let result = classify("0049 30 1234567", Region::all()).expect("classify");
        assert_eq!(result.normalized, "+49301234567");
        assert_eq!(result.region, Region::De);
    }

    #[test]
    fn classify_strips_protection_prefix_and_separators() {
        let result = classify("'+49 (0.30) 12-34/567", Region::all());
        assert!(result.is_some());
    }

    #[test]
    fn classify_rejects_national_format() {
        assert!(classify("030 1234567", Region::all()).is_none());
        assert!(classify("069 7654321", Region::all()).is_none());
    }

    #[test]
    fn classify_rejects_other_country_codes() {
        assert!(classify("+33 1 23456789", Region::all()).is_none());
        assert!(classify("+1 415 5551212", Region::all()).is_none());
    }

    #[test]
    fn classify_rejects_letters_and_empty() {
        assert!(classify("", Region::all()).is_none());
        assert!(classify("   ", Region::all()).is_none());
        assert!(classify("+49 30 CALL-NOW", Region::all()).is_none());
    }

    #[test]
    fn classify_rejects_too_short_subscriber_part() {
        assert!(classify("+49 123", Region::all()).is_none());
    }

    #[test]
    fn classify_honors_active_region_subset() {
        let only_de = [Region::De];
        assert!(classify("+49 30 1234567", &only_de).is_some());
        assert!(classify("+41 44 1112233", &only_de).is_none());
    }

    #[test]
    fn classify_is_idempotent_on_its_own_output() {
        let first = classify("+49 30 1234567", Region::all()).expect("classify");
        let second = classify(&first.normalized, Region::all()).expect("classify again");
        assert_eq!(first, second);
    }

    #[test]
    fn normalize_for_match_aligns_formats() {
        assert_eq!(
            normalize_for_match("0049 30 123456"),
            normalize_for_match("+49 (30) 12 34 56")
        );
        assert_eq!(
            normalize_for_match("030 123456").as_deref(),
            Some("030123456")
        );
        assert!(normalize_for_match("n/a").is_none());
        assert!(normalize_for_match("").is_none());
    }
}
