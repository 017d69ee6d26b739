use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::names::{self, EMAIL_RE};
use super::phone;
use super::sections::SectionTracker;

// Standalone "First Last" (optionally "First Middle Last") line.
static STANDALONE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z’'\-]+)\s+([A-Z][A-Za-z’'\-]+)(?:\s+[A-Z][A-Za-z’'\-]+)?$").unwrap()
});

// First role word through end of line, for name recovery on email-less lines.
static ROLE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:head|assistant|associate|coach|coaching|coordinator|director|staff)\b.*$")
        .unwrap()
});

static COACHING_STAFF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)coaching\s+staff").unwrap());

static AM_PM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b[ap]m\b").unwrap());

const WINDOW: usize = 8;

/// One extracted directory entry. Created once per detected candidate; mutated
/// only during post-processing; filtered (never deleted) before emission.
#[derive(Debug, Clone)]
pub struct ContactRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub username: String,
    pub phone: Option<String>,
    pub title: String,
    pub sport_section: Option<String>,
    pub full_line: String,
    pub uploadable: bool,
}

impl ContactRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

pub struct Extraction {
    pub records: Vec<ContactRecord>,
    /// Raw "coach"-containing lines for the report appendix.
    pub coach_lines: Vec<String>,
}

/// Run the full cascade: single-line pass, multi-line pass (only when the
/// first found nothing), then the window-augmentation pass, followed by
/// post-processing.
pub fn extract_records(lines: &[String], area_code: Option<&str>) -> Extraction {
    let mut coach_lines = Vec::new();
    let mut records = single_line_pass(lines, area_code, &mut coach_lines);

    if records.is_empty() {
        records = multi_line_pass(lines, area_code, &mut coach_lines);
        if !records.is_empty() {
            info!("single-line layout not found, multi-line pass produced {} records", records.len());
        }
    }

    window_pass(lines, area_code, &mut records, &mut coach_lines);
    post_process(&mut records);

    Extraction { records, coach_lines }
}

/// Pass 1: lines carrying both an email and the keyword "coach". Sport section
/// headers are tracked here and never treated as candidate record lines.
fn single_line_pass(
    lines: &[String],
    area_code: Option<&str>,
    coach_lines: &mut Vec<String>,
) -> Vec<ContactRecord> {
    let mut records = Vec::new();
    let mut tracker = SectionTracker::new();

    for (i, line) in lines.iter().enumerate() {
        if tracker.observe(line) {
            continue;
        }
        let Some(m) = EMAIL_RE.find(line) else { continue };
        if !line.to_lowercase().contains("coach") {
            continue;
        }

        let email = m.as_str().to_string();
        let name_part = line[..m.start()].trim();
        let phone = phone::extract_and_format_phone(line, area_code);
        coach_lines.push(line.trim().to_string());

        let (s_first, s_last, s_title) = names::split_name_and_title(name_part);
        let (mut first, mut last) = if !s_first.is_empty() || !s_last.is_empty() {
            names::sanitize_name(&s_first, &s_last)
        } else {
            basic_name_tokens(name_part)
        };

        if first.is_empty() && last.is_empty() {
            if let Some((rf, rl)) = recover_name_from_previous_lines(lines, i) {
                (first, last) = names::sanitize_name(&rf, &rl);
            } else {
                let (df, dl) = names::derive_name_from_email(&email);
                (first, last) = names::sanitize_name(&df, &dl);
            }
        }

        // "<Last> Coach" in the title segment can still supply a surname.
        if last.is_empty() {
            let source = if s_title.is_empty() { name_part } else { s_title.as_str() };
            (first, last) = names::adopt_surname_from_title(source, &email, &first, &last);
        }

        let username = email.split('@').next().unwrap_or("").to_string();
        let (email_first, email_last) = names::derive_name_from_email(&email);

        let mut title = if s_title.is_empty() {
            names::derive_title_from_namepart(name_part, &first, &last)
        } else {
            s_title.clone()
        };
        if last.is_empty() && !title.is_empty() {
            (first, last) = names::adopt_surname_from_title(&title, &email, &first, &last);
        }
        title = names::normalize_title(&title, name_part);
        title = names::strip_name_from_title(&title, &first, &last);
        title = names::fix_surname_leak(&title, &username, &email_first, &email_last);
        title = names::clean_title_text(&title);
        if title.is_empty() {
            title = names::extract_coach_title(line);
        }

        records.push(ContactRecord {
            first_name: first,
            last_name: last,
            email: Some(email),
            username,
            phone,
            title,
            sport_section: tracker.current().map(str::to_string),
            full_line: line.trim().to_string(),
            uploadable: true,
        });
    }

    records
}

/// Pass 2: multi-line layouts (name / title / email on separate lines). Only
/// runs when pass 1 produced nothing. Title is searched up to 3 lines before
/// the email, the name on the line directly above the title, a phone up to 3
/// lines after the email.
fn multi_line_pass(
    lines: &[String],
    area_code: Option<&str>,
    coach_lines: &mut Vec<String>,
) -> Vec<ContactRecord> {
    let mut records = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(m) = EMAIL_RE.find(line) else { continue };
        let email = m.as_str().to_string();
        let username = email.split('@').next().unwrap_or("").to_string();

        let mut coach_title = String::new();
        let mut coach_name = String::new();
        for back in 1..=3 {
            if i < back {
                break;
            }
            let prev = lines[i - back].trim();
            if prev.to_lowercase().contains("coach") {
                coach_title = prev.to_string();
                coach_lines.push(format!("{} -> {}", prev, line.trim()));
                if i >= back + 1 {
                    let candidate = lines[i - back - 1].trim();
                    if is_plausible_name_line(candidate) {
                        coach_name = candidate.to_string();
                    }
                }
                break;
            }
        }

        let mut phone = None;
        for ahead in 1..=3 {
            let Some(next) = lines.get(i + ahead) else { break };
            phone = phone::extract_and_format_phone(next.trim(), area_code);
            if phone.is_some() {
                break;
            }
        }

        if coach_title.is_empty() {
            continue;
        }

        let (mut first, mut last) = name_line_tokens(&coach_name);
        if first.is_empty() && last.is_empty() {
            let (df, dl) = names::derive_name_from_email(&email);
            (first, last) = names::sanitize_name(&df, &dl);
        }
        if last.is_empty() {
            (first, last) = names::adopt_surname_from_title(&coach_title, &email, &first, &last);
        }

        let mut title = names::strip_name_from_title(&coach_title, &first, &last);
        title = names::clean_title_text(&title);
        if title.is_empty() {
            title = "coach".to_string();
        }

        records.push(ContactRecord {
            first_name: first,
            last_name: last,
            full_line: format!("{} {} {}", coach_name, coach_title, email).trim().to_string(),
            email: Some(email),
            username,
            phone,
            title,
            sport_section: None,
            uploadable: true,
        });
    }

    records
}

/// Pass 3: always runs. Any "coach" line not already covered is matched to an
/// email on the same line or the nearest one in a symmetric window, scanning
/// outward alternately. Lines with no email anywhere in the window still emit
/// a report-only record.
fn window_pass(
    lines: &[String],
    _area_code: Option<&str>,
    records: &mut Vec<ContactRecord>,
    coach_lines: &mut Vec<String>,
) {
    let mut seen_emails: HashSet<String> = records
        .iter()
        .filter_map(|r| r.email.clone())
        .collect();
    let mut seen_lines: HashSet<String> =
        records.iter().map(|r| r.full_line.clone()).collect();

    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains("coach") {
            continue;
        }
        let trimmed = line.trim();
        if seen_lines.contains(trimmed) {
            continue;
        }

        let found = match EMAIL_RE.find(line) {
            Some(m) => Some((m.as_str().to_string(), i)),
            None => find_email_in_window(lines, i),
        };
        let title = names::extract_coach_title(line);

        match found {
            Some((email, email_idx)) if !seen_emails.contains(&email) => {
                let username = email.split('@').next().unwrap_or("").to_string();
                let source_line = &lines[email_idx];
                let prefix = source_line
                    .find(email.as_str())
                    .map(|p| source_line[..p].trim())
                    .unwrap_or("");

                let (s_first, s_last, s_title) = names::split_name_and_title(prefix);
                let (mut first, mut last) = names::sanitize_name(&s_first, &s_last);
                if first.is_empty() && last.is_empty() {
                    let (df, dl) = names::derive_name_from_email(&email);
                    (first, last) = names::sanitize_name(&df, &dl);
                }
                if last.is_empty() && !prefix.is_empty() {
                    (first, last) = names::adopt_surname_from_title(prefix, &email, &first, &last);
                }

                let candidate = if title.is_empty() { s_title.as_str() } else { title.as_str() };
                let mut normalized = names::normalize_title(candidate, prefix);
                normalized = names::strip_name_from_title(&normalized, &first, &last);
                normalized = names::fix_surname_leak(&normalized, &username, "", "");
                normalized = names::clean_title_text(&normalized);

                records.push(ContactRecord {
                    first_name: first,
                    last_name: last,
                    full_line: format!("{} {}", trimmed, email),
                    email: Some(email.clone()),
                    username,
                    phone: None,
                    title: normalized,
                    sport_section: None,
                    uploadable: true,
                });
                seen_emails.insert(email);
                seen_lines.insert(trimmed.to_string());
                coach_lines.push(trimmed.to_string());
            }
            _ => {
                // No usable email nearby: report-only entry.
                let (first, last) = if COACHING_STAFF_RE.is_match(trimmed) {
                    (String::new(), String::new())
                } else {
                    let raw_name = ROLE_TAIL_RE.replace(trimmed, "").trim().to_string();
                    names::clean_name_tokens(&raw_name)
                };
                records.push(ContactRecord {
                    first_name: first,
                    last_name: last,
                    email: None,
                    username: String::new(),
                    phone: None,
                    title: if title.is_empty() { "coach".to_string() } else { title },
                    sport_section: None,
                    full_line: trimmed.to_string(),
                    uploadable: false,
                });
                seen_lines.insert(trimmed.to_string());
                coach_lines.push(trimmed.to_string());
            }
        }
    }
}

/// Post-processing: trim name fields and, for records without an email that
/// are not header-like, synthesize a `first.last` username (which makes the
/// record uploadable).
fn post_process(records: &mut [ContactRecord]) {
    for record in records.iter_mut() {
        record.first_name = record.first_name.trim().to_string();
        record.last_name = record.last_name.trim().to_string();

        if record.email.is_some() {
            continue;
        }
        let full_lower = record.full_line.to_lowercase();
        let display_lower = record.display_name().to_lowercase();
        let header_like = full_lower.contains("coaching staff")
            || full_lower.trim().starts_with("coaches")
            || matches!(display_lower.as_str(), "" | "staff" | "coaches" | "coaching");
        if record.username.is_empty() && !header_like {
            let username = names::build_username_from_name(&record.first_name, &record.last_name);
            if !username.is_empty() {
                record.username = username;
                record.uploadable = true;
            }
        }
    }
}

/// Plain tokenization fallback: first two tokens after any honorific prefix.
fn basic_name_tokens(name_part: &str) -> (String, String) {
    let mut tokens: Vec<&str> = name_part.split_whitespace().collect();
    if tokens
        .first()
        .is_some_and(|t| matches!(t.to_lowercase().as_str(), "dr." | "dr"))
    {
        tokens.remove(0);
    }
    let first = tokens.first().copied().unwrap_or("");
    let last = tokens.get(1).copied().unwrap_or("");
    names::sanitize_name(first, last)
}

/// Name-line tokenization: everything after the first token is the last name.
fn name_line_tokens(name_line: &str) -> (String, String) {
    let mut tokens: Vec<&str> = name_line.split_whitespace().collect();
    if tokens
        .first()
        .is_some_and(|t| matches!(t.to_lowercase().as_str(), "dr." | "dr"))
    {
        tokens.remove(0);
    }
    let first = tokens.first().copied().unwrap_or("");
    let last = if tokens.len() > 1 { tokens[1..].join(" ") } else { String::new() };
    names::sanitize_name(first, &last)
}

fn recover_name_from_previous_lines(lines: &[String], i: usize) -> Option<(String, String)> {
    for back in 1..=3 {
        if i < back {
            break;
        }
        let prev = lines[i - back].trim();
        let lower = prev.to_lowercase();
        if prev.is_empty() || lower.contains('@') || lower.contains("coach") {
            continue;
        }
        if let Some(caps) = STANDALONE_NAME_RE.captures(prev) {
            return Some((caps[1].to_string(), caps[2].to_string()));
        }
    }
    None
}

/// Reject name candidates that carry emails, digits/slashes/clock tokens, or
/// organizational stopwords, or that are too short to be a full name.
fn is_plausible_name_line(candidate: &str) -> bool {
    if candidate.is_empty() || EMAIL_RE.is_match(candidate) {
        return false;
    }
    if candidate.chars().any(|c| c.is_ascii_digit()) || candidate.contains('/') {
        return false;
    }
    if AM_PM_RE.is_match(candidate) {
        return false;
    }
    let lower = candidate.to_lowercase();
    const REJECT: &[&str] = &["coaching", "staff", "soccer", "university", "director of"];
    if REJECT.iter().any(|kw| lower.contains(kw)) {
        return false;
    }
    candidate.split_whitespace().count() >= 2
}

fn find_email_in_window(lines: &[String], i: usize) -> Option<(String, usize)> {
    for dist in 1..=WINDOW {
        let forward = i + dist;
        if forward < lines.len() {
            if let Some(m) = EMAIL_RE.find(&lines[forward]) {
                return Some((m.as_str().to_string(), forward));
            }
        }
        if dist <= i {
            let back = i - dist;
            if let Some(m) = EMAIL_RE.find(&lines[back]) {
                return Some((m.as_str().to_string(), back));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn fixture(name: &str) -> Vec<String> {
        let text = std::fs::read_to_string(format!("tests/fixtures/{}.txt", name)).unwrap();
        doc(&text)
    }

    #[test]
    fn single_line_layout() {
        let lines = fixture("rowan_single_line");
        let extraction = extract_records(&lines, Some("856"));
        let smith = extraction
            .records
            .iter()
            .find(|r| r.email.as_deref() == Some("jsmith@rowan.edu"))
            .expect("jsmith record");
        assert_eq!(smith.first_name, "John");
        assert_eq!(smith.last_name, "Smith");
        assert_eq!(smith.username, "jsmith");
        assert_eq!(smith.phone.as_deref(), Some("(856) 256-4687"));
        assert_eq!(smith.sport_section.as_deref(), Some("MENS SOCCER"));
        assert!(smith.title.to_lowercase().contains("coach"));
    }

    #[test]
    fn single_line_pass_wins_over_multi_line() {
        let lines = fixture("rowan_single_line");
        let mut coach_lines = Vec::new();
        let singles = single_line_pass(&lines, Some("856"), &mut coach_lines);
        assert!(!singles.is_empty());
        // Every record carries an email, so the multi-line pass must not run.
        let extraction = extract_records(&lines, Some("856"));
        let with_email = extraction.records.iter().filter(|r| r.email.is_some()).count();
        assert_eq!(with_email, singles.len());
    }

    #[test]
    fn multi_line_layout() {
        let lines = fixture("bryant_multi_line");
        let extraction = extract_records(&lines, Some("401"));
        let coven = extraction
            .records
            .iter()
            .find(|r| r.email.as_deref() == Some("scoven@bryant.edu"))
            .expect("scoven record");
        assert_eq!(coven.first_name, "Steve");
        assert_eq!(coven.last_name, "Coven");
        assert_eq!(coven.phone.as_deref(), Some("(401) 232-6000"));
        assert_eq!(coven.title, "Head Men's Soccer Coach");
        let hearn = extraction
            .records
            .iter()
            .find(|r| r.email.as_deref() == Some("chearn@bryant.edu"))
            .expect("chearn record");
        assert_eq!(hearn.first_name, "Carl");
        assert_eq!(hearn.last_name, "Hearn");
    }

    #[test]
    fn window_pass_recovers_distant_email() {
        let lines = fixture("scattered_window");
        let extraction = extract_records(&lines, None);
        let with_email: Vec<_> = extraction
            .records
            .iter()
            .filter(|r| r.email.is_some())
            .collect();
        assert_eq!(with_email.len(), 1);
        assert_eq!(with_email[0].email.as_deref(), Some("trizzo@school.edu"));
        assert_eq!(with_email[0].title, "Head Baseball Coach");
    }

    #[test]
    fn no_email_in_window_emits_report_only_record() {
        let lines = doc("Pat Miller Head Volleyball Coach\n\nno contact information here\n");
        let extraction = extract_records(&lines, None);
        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert!(record.email.is_none());
        // Post-processing synthesized a username from the recovered name.
        assert_eq!(record.username, "pat.miller");
        assert!(record.uploadable);
    }

    #[test]
    fn header_like_lines_stay_non_uploadable() {
        let lines = doc("Coaching Staff\n");
        let extraction = extract_records(&lines, None);
        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert!(!record.uploadable);
        assert!(record.username.is_empty());
    }

    #[test]
    fn emails_never_reused_across_passes() {
        let text = "Head Softball Coach\njdoe@school.edu\n\nAssistant Softball Coach of hitting jdoe@school.edu\n";
        let lines = doc(text);
        let extraction = extract_records(&lines, None);
        let uses = extraction
            .records
            .iter()
            .filter(|r| r.email.as_deref() == Some("jdoe@school.edu"))
            .count();
        assert_eq!(uses, 1);
    }

    #[test]
    fn rerun_is_idempotent() {
        let lines = fixture("rowan_single_line");
        let a = extract_records(&lines, Some("856"));
        let b = extract_records(&lines, Some("856"));
        let emails = |e: &Extraction| {
            let mut v: Vec<String> = e.records.iter().filter_map(|r| r.email.clone()).collect();
            v.sort();
            v
        };
        assert_eq!(emails(&a), emails(&b));
        assert_eq!(a.records.len(), b.records.len());
    }

    #[test]
    fn section_headers_are_not_records() {
        let lines = fixture("rowan_single_line");
        let extraction = extract_records(&lines, Some("856"));
        assert!(extraction
            .records
            .iter()
            .all(|r| r.full_line != "MENS SOCCER" && r.full_line != "WOMENS BASKETBALL"));
    }
}
