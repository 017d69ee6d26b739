use super::cascade::ContactRecord;

// Free-text fallback table, scanned in order; every distinct tag hit is kept.
// "football" maps to Soccer: the source directories use it for the soccer
// program, never for gridiron.
const ROLE_KEYWORDS: &[(&str, &str)] = &[
    ("soccer", "Soccer"),
    ("football", "Soccer"),
    ("men's soccer", "Soccer"),
    ("mens soccer", "Soccer"),
    ("goalkeeper", "Soccer"),
    ("goalie", "Soccer"),
    ("midfielder", "Soccer"),
    ("defender", "Soccer"),
    ("forward", "Soccer"),
    ("striker", "Soccer"),
    ("baseball", "Baseball"),
    ("basketball", "Basketball"),
    ("tennis", "Tennis"),
    ("swimming", "Swimming"),
    ("track", "Track & Field"),
    ("field", "Track & Field"),
    ("cross country", "Cross Country"),
    ("volleyball", "Volleyball"),
    ("golf", "Golf"),
    ("wrestling", "Wrestling"),
    ("lacrosse", "Lacrosse"),
    ("softball", "Softball"),
    ("hockey", "Hockey"),
    ("rowing", "Rowing"),
    ("strength", "Strength & Conditioning"),
    ("conditioning", "Strength & Conditioning"),
];

/// Map a record to canonical sport tags. An active section label wins and
/// yields exactly one tag; otherwise the provenance line is scanned against
/// the keyword table; otherwise the organization default (when present),
/// else the generic fallback.
pub fn classify_sports(record: &ContactRecord, default_sport: Option<&str>) -> Vec<String> {
    if let Some(section) = record.sport_section.as_deref() {
        if let Some(tag) = classify_section(&section.to_lowercase()) {
            return vec![tag];
        }
    }

    let role_text = record.full_line.to_lowercase();
    let mut sports: Vec<String> = Vec::new();
    for (keyword, tag) in ROLE_KEYWORDS {
        if role_text.contains(keyword) && !sports.iter().any(|s| s == tag) {
            sports.push((*tag).to_string());
        }
    }
    if !sports.is_empty() {
        return sports;
    }

    match default_sport {
        Some(tag) => vec![tag.to_string()],
        None => vec!["General Athletics".to_string()],
    }
}

// "women" is checked before "men" since the former contains the latter.
fn gender_split(section: &str, base: &str) -> String {
    if section.contains("women") {
        format!("{} (Women)", base)
    } else if section.contains("men") {
        format!("{} (Men)", base)
    } else {
        base.to_string()
    }
}

fn classify_section(section: &str) -> Option<String> {
    if section.contains("basketball") {
        Some(gender_split(section, "Basketball"))
    } else if section.contains("soccer") {
        Some(gender_split(section, "Soccer"))
    } else if section.contains("football") {
        Some("Football".to_string())
    } else if section.contains("baseball") {
        Some("Baseball".to_string())
    } else if section.contains("softball") {
        Some("Softball".to_string())
    } else if section.contains("swimming") {
        Some("Swimming".to_string())
    } else if section.contains("field hockey") {
        Some("Field Hockey".to_string())
    } else if section.contains("track") || section.contains("field") {
        Some("Track & Field".to_string())
    } else if section.contains("cross country") {
        Some("Cross Country".to_string())
    } else if section.contains("volleyball") {
        Some("Volleyball".to_string())
    } else if section.contains("lacrosse") {
        if section.contains("women") {
            Some("Lacrosse (Women)".to_string())
        } else {
            Some("Lacrosse".to_string())
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(section: Option<&str>, full_line: &str) -> ContactRecord {
        ContactRecord {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: None,
            username: "jane.doe".into(),
            phone: None,
            title: "Head Coach".into(),
            sport_section: section.map(str::to_string),
            full_line: full_line.into(),
            uploadable: true,
        }
    }

    #[test]
    fn section_label_wins_over_role_text() {
        let r = record(Some("WOMENS BASKETBALL"), "Jane Doe Head Soccer Coach");
        assert_eq!(classify_sports(&r, Some("Soccer")), vec!["Basketball (Women)"]);
    }

    #[test]
    fn mens_section_split() {
        let r = record(Some("MENS SOCCER"), "");
        assert_eq!(classify_sports(&r, None), vec!["Soccer (Men)"]);
    }

    #[test]
    fn field_hockey_section_not_track_and_field() {
        let r = record(Some("FIELD HOCKEY"), "");
        assert_eq!(classify_sports(&r, None), vec!["Field Hockey"]);
    }

    #[test]
    fn role_text_accumulates_distinct_tags() {
        let r = record(None, "Goalkeeper Coach and Strength Coordinator");
        assert_eq!(
            classify_sports(&r, None),
            vec!["Soccer", "Strength & Conditioning"]
        );
    }

    #[test]
    fn role_text_deduplicates_tags() {
        let r = record(None, "Head Men's Soccer Coach and goalkeeper trainer");
        assert_eq!(classify_sports(&r, None), vec!["Soccer"]);
    }

    #[test]
    fn organization_default_applies_when_nothing_matches() {
        let r = record(None, "Assistant Coach");
        assert_eq!(classify_sports(&r, Some("Soccer")), vec!["Soccer"]);
        assert_eq!(classify_sports(&r, None), vec!["General Athletics"]);
    }
}
