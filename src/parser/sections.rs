use std::sync::LazyLock;

use regex::Regex;

// All-uppercase header shape: letters, spaces, ampersand, optional parenthetical.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z\s&]+(?:\([^)]+\))?$").unwrap());

const SPORT_KEYWORDS: &[&str] = &[
    "baseball",
    "basketball",
    "soccer",
    "football",
    "swimming",
    "volleyball",
    "lacrosse",
    "track",
    "field hockey",
    "cross country",
    "softball",
];

/// Single-pass state machine over document lines. A matching header line opens
/// a section whose label scopes every subsequent candidate record until the
/// next header; header lines themselves are never candidate record lines.
#[derive(Debug, Default)]
pub struct SectionTracker {
    current: Option<String>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns true if the line was consumed as a section header.
    pub fn observe(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() || !HEADER_RE.is_match(trimmed) {
            return false;
        }
        let lower = trimmed.to_lowercase();
        if SPORT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            self.current = Some(trimmed.to_string());
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_on_uppercase_sport_header() {
        let mut tracker = SectionTracker::new();
        assert!(tracker.observe("WOMENS BASKETBALL"));
        assert_eq!(tracker.current(), Some("WOMENS BASKETBALL"));
    }

    #[test]
    fn header_with_parenthetical() {
        let mut tracker = SectionTracker::new();
        assert!(tracker.observe("TRACK & FIELD (INDOOR)"));
        assert_eq!(tracker.current(), Some("TRACK & FIELD (INDOOR)"));
    }

    #[test]
    fn uppercase_without_sport_keyword_ignored() {
        let mut tracker = SectionTracker::new();
        assert!(!tracker.observe("ADMINISTRATION"));
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn mixed_case_sport_line_is_not_a_header() {
        let mut tracker = SectionTracker::new();
        assert!(!tracker.observe("Jane Doe Head Soccer Coach jdoe@school.edu"));
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn label_persists_until_next_header() {
        let mut tracker = SectionTracker::new();
        tracker.observe("BASEBALL");
        assert!(!tracker.observe("John Smith Head Coach jsmith@school.edu"));
        assert_eq!(tracker.current(), Some("BASEBALL"));
        tracker.observe("SOFTBALL");
        assert_eq!(tracker.current(), Some("SOFTBALL"));
    }
}
