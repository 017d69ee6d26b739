use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::Local;
use regex::Regex;
use tracing::warn;

use crate::document::OrganizationContext;
use crate::parser::sports::classify_sports;
use crate::parser::ContactRecord;

const NON_UPLOADABLE_NOTE: &str = "No email found nearby; this entry will NOT be uploaded.";

static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+\S+").unwrap());

/// Render the human-review report: context header, one block per record,
/// then an appendix of every raw "coach" line.
pub fn render(
    records: &[ContactRecord],
    coach_lines: &[String],
    org: &OrganizationContext,
) -> String {
    let mut out = String::new();
    let now = Local::now().format("%Y-%m-%d %H:%M:%S");
    out.push_str(&format!("COACH ENTRIES FOUND - {}\n", now));
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");

    let university = if org.university.is_empty() { "Unknown University" } else { org.university.as_str() };
    let organization = if org.organization.is_empty() { "University Athletics" } else { org.organization.as_str() };
    out.push_str("SCHOOL CONTEXT\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    out.push_str(&format!("University: {}\n", university));
    out.push_str(&format!("Organization: {}\n", organization));
    if !org.state.is_empty() {
        out.push_str(&format!("State: {}\n", org.state));
    }
    if !org.location.is_empty() {
        out.push_str(&format!("Location: {}\n", org.location));
    }
    if !org.source.is_empty() {
        out.push_str(&format!("Source: {}\n", org.source));
    }
    out.push('\n');

    out.push_str(&format!("Total coaches found: {}\n\n", records.len()));
    out.push_str("PARSED ENTRIES:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');

    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!("{}. {} {}\n", i + 1, record.first_name, record.last_name));
        out.push_str(&format!("   Email: {}\n", record.email.as_deref().unwrap_or("")));
        out.push_str(&format!("   Username: {}\n", record.username));
        let sports = classify_sports(record, org.default_sport());
        if !sports.is_empty() {
            out.push_str(&format!("   Sports: {}\n", sports.join(", ")));
        }
        if !record.title.is_empty() {
            out.push_str(&format!("   Title: {}\n", record.title));
        }
        if !record.uploadable {
            out.push_str(&format!("   Note: {}\n", NON_UPLOADABLE_NOTE));
        }
        if let Some(phone) = &record.phone {
            out.push_str(&format!("   Phone: {}\n", phone));
        }
        out.push_str(&format!("   Original line: {}\n", record.full_line));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str("RAW LINES WITH 'COACH' KEYWORD:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for line in coach_lines {
        out.push_str(&format!("• {}\n", line));
    }
    out
}

/// Write atomically (temp file + rename) so an interrupt mid-batch never
/// leaves a half-written report behind.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("writing report {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming report into {}", path.display()))?;
    Ok(())
}

#[derive(Debug)]
pub struct Validation {
    pub passed: bool,
    pub issues: usize,
}

/// Re-read a rendered report and check each uploadable entry block for the
/// fields the claiming backend requires.
pub fn validate_file(path: &Path) -> Result<Validation> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading report {}", path.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    Ok(validate_lines(&lines))
}

/// Required per block: non-empty name, username, and title; an email is only
/// required when the username is absent. Non-uploadable and header-like
/// blocks are skipped.
pub fn validate_lines(lines: &[&str]) -> Validation {
    let Some(header_idx) = lines.iter().position(|l| l.trim() == "PARSED ENTRIES:") else {
        warn!("report has no PARSED ENTRIES section");
        return Validation { passed: false, issues: 1 };
    };
    // Skip the separator line below the header.
    let start = (header_idx + 2).min(lines.len());
    // The appendix header can sit right after the separator when the entries
    // section is empty; keep the range well-formed in that case.
    let end = lines[start..]
        .iter()
        .position(|l| l.trim() == "RAW LINES WITH 'COACH' KEYWORD:")
        .map(|i| (start + i).saturating_sub(1).max(start))
        .unwrap_or(lines.len());

    let mut issues = 0;
    let mut block: Vec<&str> = Vec::new();
    for line in &lines[start..end] {
        if line.trim().is_empty() {
            issues += validate_block(&block);
            block.clear();
        } else {
            block.push(line);
        }
    }
    issues += validate_block(&block);

    Validation { passed: issues == 0, issues }
}

fn validate_block(block: &[&str]) -> usize {
    if block.is_empty() {
        return 0;
    }
    if block.iter().any(|l| l.contains("will NOT be uploaded")) {
        return 0;
    }
    for line in block {
        let trimmed = line.trim();
        if let Some(provenance) = strip_field(trimmed, "original line:") {
            let low = provenance.to_lowercase();
            if low.contains("coaching staff") || low.trim_start().starts_with("coaches") {
                return 0;
            }
        }
    }

    let mut name_ok = false;
    let mut email_ok = false;
    let mut username_ok = false;
    let mut title_ok = false;
    for line in block {
        let trimmed = line.trim();
        if ORDINAL_RE.is_match(trimmed) {
            if let Some((_, rest)) = trimmed.split_once(char::is_whitespace) {
                name_ok = !rest.trim().is_empty();
            }
        } else if let Some(val) = strip_field(trimmed, "email:") {
            email_ok = !val.is_empty() && val.contains('@');
        } else if let Some(val) = strip_field(trimmed, "username:") {
            username_ok = !val.is_empty();
        } else if let Some(val) = strip_field(trimmed, "title:") {
            title_ok = !val.is_empty();
        }
    }

    if name_ok && username_ok && title_ok {
        return 0;
    }
    let mut missing: Vec<&str> = Vec::new();
    if !name_ok {
        missing.push("name");
    }
    if !email_ok && !username_ok {
        missing.push("email");
    }
    if !username_ok {
        missing.push("username");
    }
    if !title_ok {
        missing.push("title");
    }
    warn!(
        missing = %missing.join(", "),
        block = %block.join(" | "),
        "invalid report entry block"
    );
    1
}

fn strip_field<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let low = line.to_lowercase();
    if low.starts_with(field) {
        Some(line[field.len()..].trim())
    } else {
        None
    }
}

/// Move a failed report into a sibling quarantine directory; upload for the
/// document is skipped by the caller.
pub fn quarantine(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let damaged_dir = parent.join("damaged-reports");
    fs::create_dir_all(&damaged_dir)?;
    let target = damaged_dir.join(path.file_name().context("report path has no file name")?);
    fs::rename(path, &target)
        .with_context(|| format!("moving {} into quarantine", path.display()))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, title: &str, uploadable: bool) -> ContactRecord {
        ContactRecord {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: if username.is_empty() { None } else { Some(format!("{}@school.edu", username)) },
            username: username.into(),
            phone: Some("(856) 256-4687".into()),
            title: title.into(),
            sport_section: None,
            full_line: "John Smith Head Soccer Coach jsmith@school.edu".into(),
            uploadable,
        }
    }

    #[test]
    fn rendered_report_round_trips_through_validator() {
        let org = OrganizationContext::default();
        let records = vec![record("jsmith", "Head Soccer Coach", true)];
        let text = render(&records, &["John Smith Head Soccer Coach".to_string()], &org);
        assert!(text.contains("1. John Smith"));
        assert!(text.contains("   Username: jsmith"));
        assert!(text.contains("   Sports: Soccer"));
        assert!(text.contains("• John Smith Head Soccer Coach"));

        let lines: Vec<&str> = text.lines().collect();
        let validation = validate_lines(&lines);
        assert!(validation.passed);
        assert_eq!(validation.issues, 0);
    }

    #[test]
    fn missing_username_and_email_fails() {
        let lines = vec![
            "PARSED ENTRIES:",
            "----------------------------------------",
            "1. John Smith",
            "   Email: ",
            "   Username: ",
            "   Title: Head Coach",
            "",
            "RAW LINES WITH 'COACH' KEYWORD:",
        ];
        let validation = validate_lines(&lines);
        assert!(!validation.passed);
        assert_eq!(validation.issues, 1);
    }

    #[test]
    fn username_without_email_passes() {
        let lines = vec![
            "PARSED ENTRIES:",
            "----------------------------------------",
            "1. John Smith",
            "   Email: ",
            "   Username: john.smith",
            "   Title: Head Coach",
            "",
            "RAW LINES WITH 'COACH' KEYWORD:",
        ];
        assert!(validate_lines(&lines).passed);
    }

    #[test]
    fn non_uploadable_blocks_are_skipped() {
        let org = OrganizationContext::default();
        let records = vec![record("", "coach", false)];
        let text = render(&records, &[], &org);
        assert!(text.contains("will NOT be uploaded"));
        let lines: Vec<&str> = text.lines().collect();
        assert!(validate_lines(&lines).passed);
    }

    #[test]
    fn header_like_provenance_is_skipped() {
        let lines = vec![
            "PARSED ENTRIES:",
            "----------------------------------------",
            "1. ",
            "   Email: ",
            "   Username: ",
            "   Original line: Coaching Staff",
            "",
            "RAW LINES WITH 'COACH' KEYWORD:",
        ];
        assert!(validate_lines(&lines).passed);
    }

    #[test]
    fn empty_entries_section_passes() {
        let lines = vec![
            "PARSED ENTRIES:",
            "----------------------------------------",
            "RAW LINES WITH 'COACH' KEYWORD:",
        ];
        let validation = validate_lines(&lines);
        assert!(validation.passed);
        assert_eq!(validation.issues, 0);
    }

    #[test]
    fn missing_section_fails() {
        let validation = validate_lines(&["nothing here"]);
        assert!(!validation.passed);
    }

    #[test]
    fn write_and_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.txt");
        write_report(&path, "PARSED ENTRIES:\n").unwrap();
        assert!(path.exists());

        let moved = quarantine(&path).unwrap();
        assert!(!path.exists());
        assert!(moved.ends_with("damaged-reports/report.txt"));
        assert!(moved.exists());
    }
}
