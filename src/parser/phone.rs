use std::sync::LazyLock;

use regex::Regex;

/// Phrase patterns announcing a document-wide default area code, in priority
/// order. First match wins.
static AREA_CODE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Area Code \((\d{3})\)",
        r"(?i)Area Code: \((\d{3})\)",
        r"(?i)Area Code (\d{3})",
        r"(?i)Area Code: (\d{3})",
        r"(?i)\((\d{3})\) area code",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Phone shapes, fully-specified and least-ambiguous first.
static PHONE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\(\d{3}\)\s*\d{3}-\d{4}", // (856) 256-4687
        r"\(\d{3}\)\s*\d{3}\.\d{4}", // (856) 256.4687
        r"\d{3}-\d{3}-\d{4}",        // 856-256-4687
        r"\d{3}\.\d{3}\.\d{4}",      // 856.256.4687
        r"\d{3}\s+\d{3}-\d{4}",      // 856 256-4687
        r"\d{3}-\d{4}",              // 256-4687 (7-digit)
        r"\d{3}\.\d{4}",             // 256.4687 (7-digit)
        r"\b\d{7}\b",                // 2564687 (7-digit, no separator)
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEVEN_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}-\d{4}$").unwrap());
static SEVEN_DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}\.\d{4}$").unwrap());
static SEVEN_BARE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{7}$").unwrap());
static TEN_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap());
static TEN_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\s+\d{3}-\d{4}$").unwrap());
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(\d{3}\)").unwrap());

/// Scan the full document text for a default area code announcement.
pub fn detect_area_code(text: &str) -> Option<String> {
    AREA_CODE_RES
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()))
}

/// Extract the first phone-shaped substring from `line` and canonicalize it.
/// 7-digit numbers are combined with `area_code` when one is known; shapes that
/// already carry an area code are reformatted to `(AAA) NNN-NNNN` where the
/// delimiter style is unambiguous, and returned unchanged otherwise.
/// Absence of a match is not an error.
pub fn extract_and_format_phone(line: &str, area_code: Option<&str>) -> Option<String> {
    let m = PHONE_RES.iter().find_map(|re| re.find(line))?;
    let phone = m.as_str().trim().to_string();

    if let Some(area) = area_code {
        if SEVEN_DASH_RE.is_match(&phone)
            || SEVEN_DOT_RE.is_match(&phone)
            || SEVEN_BARE_RE.is_match(&phone)
        {
            let phone = if SEVEN_BARE_RE.is_match(&phone) {
                format!("{}-{}", &phone[..3], &phone[3..])
            } else {
                phone
            };
            return Some(format!("({}) {}", area, phone));
        }
    }

    if TEN_DASH_RE.is_match(&phone) {
        return Some(format!("({}) {}", &phone[..3], &phone[4..]));
    }
    if TEN_SPACE_RE.is_match(&phone) {
        let mut parts = phone.split_whitespace();
        let area = parts.next().unwrap_or("");
        let number = parts.next().unwrap_or("");
        return Some(format!("({}) {}", area, number));
    }
    if PAREN_RE.is_match(&phone) {
        return Some(phone);
    }

    Some(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_code_parenthesized() {
        let text = "All numbers use Area Code (401) unless noted.";
        assert_eq!(detect_area_code(text).as_deref(), Some("401"));
    }

    #[test]
    fn area_code_trailing_phrase() {
        assert_eq!(
            detect_area_code("numbers are in the (609) area code").as_deref(),
            Some("609")
        );
        assert_eq!(detect_area_code("no code here"), None);
    }

    #[test]
    fn area_code_pattern_priority() {
        // Parenthesized pattern outranks the bare one even when both appear.
        let text = "Area Code 555 ... Area Code (401)";
        assert_eq!(detect_area_code(text).as_deref(), Some("401"));
    }

    #[test]
    fn dotted_ten_digit_unchanged() {
        assert_eq!(
            extract_and_format_phone("call 856.256.4687 now", None).as_deref(),
            Some("856.256.4687")
        );
    }

    #[test]
    fn seven_digit_combined_with_area_code() {
        assert_eq!(
            extract_and_format_phone("ext 256-4687", Some("609")).as_deref(),
            Some("(609) 256-4687")
        );
        assert_eq!(
            extract_and_format_phone("2564687", Some("609")).as_deref(),
            Some("(609) 256-4687")
        );
    }

    #[test]
    fn seven_digit_without_area_code_unchanged() {
        assert_eq!(
            extract_and_format_phone("ext 256-4687", None).as_deref(),
            Some("256-4687")
        );
    }

    #[test]
    fn parenthesized_unchanged() {
        assert_eq!(
            extract_and_format_phone("(609) 256-4687", None).as_deref(),
            Some("(609) 256-4687")
        );
    }

    #[test]
    fn dashed_ten_digit_reformatted() {
        assert_eq!(
            extract_and_format_phone("office 856-256-4687", None).as_deref(),
            Some("(856) 256-4687")
        );
    }

    #[test]
    fn space_separated_reformatted() {
        assert_eq!(
            extract_and_format_phone("856 256-4687", None).as_deref(),
            Some("(856) 256-4687")
        );
    }

    #[test]
    fn no_phone() {
        assert_eq!(extract_and_format_phone("no digits here", Some("609")), None);
    }
}
