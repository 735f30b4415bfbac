use crate::error::CoreError;
use regex::Regex;
use serde::Serialize;

/// Excerpt plus derived lead count for one free-text cell. Either field
/// can be absent independently of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExcerptResult {
    pub excerpt: String,
    pub count: Option<u64>,
}

/// Compiled marker configuration for the excerpt extractor.
#[derive(Debug, Clone)]
pub struct Markers {
    start: String,
    end: String,
    count: Regex,
}

impl Markers {
    /// Build from the configured phrases. The count pattern matches the
    /// first integer followed by the keyword (case-sensitive).
    pub fn new(start: &str, end: &str, count_keyword: &str) -> Result<Self, CoreError> {
        let pattern = format!(r"(\d+)\s+{}\b", regex::escape(count_keyword.trim()));
        let count = Regex::new(&pattern)
            .map_err(|err| CoreError::InvalidExcerptPattern(err.to_string()))?;
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            count,
        })
    }

    /// Extract the literal substring between the two markers and the
    /// first lead count. Total over any input; "no excerpt" is a normal
    /// outcome, not an error.
    pub fn extract(&self, text: &str) -> ExcerptResult {
        ExcerptResult {
            excerpt: self.between_markers(text),
            count: self.lead_count(text),
        }
    }

    fn between_markers(&self, text: &str) -> String {
        if self.start.is_empty() || self.end.is_empty() {
            return String::new();
        }
        let Some(start_at) = text.find(&self.start) else {
            return String::new();
        };
        let after = start_at + self.start.len();
        let Some(end_at) = text[after..].find(&self.end) else {
            return String::new();
        };
        text[after..after + end_at].trim().to_string()
    }

    fn lead_count(&self, text: &str) -> Option<u64> {
        self.count
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::Markers;

    const START: &str = "umgesetzt haben";
    const END: &str = "Für dieses";

    fn markers() -> Markers {
        Markers::new(START, END, "Leads").expect("markers")
    }

    #[test]
    fn extracts_between_markers_trimmed() {
        let text = "...bereits sehr erfolgreich ein ähnliches Projekt umgesetzt haben \
                    XYZ 42 Leads generiert. Für dieses...";
        let result = markers().extract(text);
        assert_eq!(result.excerpt, "XYZ 42 Leads generiert.");
        assert_eq!(result.count, Some(42));
    }

    #[test]
    fn missing_start_marker_yields_empty_excerpt() {
        let result = markers().extract("etwas Text. Für dieses Projekt");
        assert_eq!(result.excerpt, "");
    }

    #[test]
    fn missing_end_marker_yields_empty_excerpt() {
        let result = markers().extract("umgesetzt haben und danach nichts");
        assert_eq!(result.excerpt, "");
    }

    #[test]
    fn end_before_start_yields_empty_excerpt() {
        let result = markers().extract("Für dieses Projekt, umgesetzt haben wir");
        assert_eq!(result.excerpt, "");
    }

    #[test]
    fn count_is_independent_of_excerpt() {
        let result = markers().extract("wir haben 17 Leads geliefert");
        assert_eq!(result.excerpt, "");
        assert_eq!(result.count, Some(17));
    }

    #[test]
    fn count_takes_first_match() {
        let text = "umgesetzt haben 8 Leads, später 20 Leads. Für dieses";
        let result = markers().extract(text);
        assert_eq!(result.count, Some(8));
    }

    #[test]
    fn count_keyword_is_case_sensitive() {
        let result = markers().extract("42 leads generiert");
        assert_eq!(result.count, None);
    }

    #[test]
    fn empty_input_is_fully_empty() {
        let result = markers().extract("");
        assert_eq!(result.excerpt, "");
        assert_eq!(result.count, None);
    }

    #[test]
    fn spans_newlines_between_markers() {
        let text = "umgesetzt haben\nXYZ\n12 Leads generiert.\nFür dieses";
        let result = markers().extract(text);
        assert_eq!(result.excerpt, "XYZ\n12 Leads generiert.");
        assert_eq!(result.count, Some(12));
    }
}
