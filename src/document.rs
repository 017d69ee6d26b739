use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static UNIVERSITY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:University|College|Academy|Institute|School)\b").unwrap());

static GENERIC_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)staff|directory|athletics").unwrap());

static GENERIC_ORG_WORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:staff\s+directory|directory|athletics|athletic\s+staff|staff)\b").unwrap()
});

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// One input document as an ordered line list plus a source identifier.
/// Extraction never re-reads the file after this point.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub source: String,
    pub lines: Vec<String>,
}

impl DocumentText {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading document {}", path.display()))?;
        Ok(Self {
            source: path.display().to_string(),
            lines: text.lines().map(str::to_string).collect(),
        })
    }
}

/// School/organization context inferred once per document from the file path
/// and its content. Read-only input to sport classification and the report
/// header.
#[derive(Debug, Clone, Default)]
pub struct OrganizationContext {
    pub university: String,
    pub organization: String,
    pub location: String,
    pub source: String,
    pub state: String,
}

impl OrganizationContext {
    /// Filename match first, then content match, then a generic scan of the
    /// first 200 prominent lines for the shortest institution-looking line.
    pub fn detect(path: &Path, lines: &[String]) -> Self {
        let mut ctx = Self::default();

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if filename.contains("bryant") {
            ctx.set_known("Bryant");
            ctx.source = "Bryant University Men's Soccer Coaches Directory".to_string();
        } else if filename.contains("rowan") {
            ctx.set_known("Rowan");
            ctx.source = "Rowan University Athletics Staff Directory".to_string();
        } else if filename.contains("rutgers") {
            ctx.set_known("Rutgers");
            ctx.source = "Rutgers University Athletics Staff Directory".to_string();
        }

        for component in path.components() {
            let c = component.as_os_str().to_string_lossy().to_lowercase();
            match c.as_str() {
                "ny" => ctx.state = "New York".to_string(),
                "nj" => ctx.state = "New Jersey".to_string(),
                "az" => ctx.state = "Arizona".to_string(),
                _ => {}
            }
        }

        let content_lower = lines.join("\n").to_lowercase();
        if content_lower.contains("bryant university") {
            ctx.university = "Bryant".to_string();
            ctx.fill_known("Bryant");
        } else if content_lower.contains("rowan university") {
            ctx.university = "Rowan".to_string();
            ctx.fill_known("Rowan");
        } else if content_lower.contains("rutgers university")
            || content_lower.contains("scarlet knights")
        {
            ctx.university = "Rutgers".to_string();
            ctx.fill_known("Rutgers");
        }

        if ctx.university.is_empty() {
            ctx.university = guess_university(lines).unwrap_or_default();
        }

        if ctx.organization.is_empty() {
            let inferred = infer_org_from_filename(path);
            if !inferred.is_empty() {
                ctx.organization = if inferred.to_lowercase().contains("athletic") {
                    inferred.clone()
                } else {
                    format!("{} Athletics", inferred)
                };
                if ctx.university.is_empty() {
                    ctx.university = inferred;
                }
            }
        }

        ctx
    }

    fn set_known(&mut self, university: &str) {
        self.university = university.to_string();
        self.fill_known(university);
    }

    fn fill_known(&mut self, university: &str) {
        if !self.organization.is_empty() {
            return;
        }
        let (organization, location) = match university {
            "Bryant" => ("Bryant University Athletics", "Smithfield, Rhode Island"),
            "Rowan" => ("Rowan University Athletics", "Glassboro, New Jersey"),
            "Rutgers" => ("Rutgers University Athletics", "Piscataway, New Jersey"),
            _ => return,
        };
        self.organization = organization.to_string();
        self.location = location.to_string();
    }

    /// Organization-specific default sport tag for classification step 3.
    /// Rowan directories span many programs, so no default applies there.
    pub fn default_sport(&self) -> Option<&'static str> {
        if self.university.to_lowercase().contains("rowan") {
            None
        } else {
            Some("Soccer")
        }
    }
}

fn guess_university(lines: &[String]) -> Option<String> {
    let mut candidates: Vec<&str> = Vec::new();
    for line in lines.iter().filter(|l| l.trim().len() > 2).take(200) {
        let trimmed = line.trim();
        if UNIVERSITY_WORD_RE.is_match(trimmed) && !GENERIC_HEADER_RE.is_match(trimmed) {
            candidates.push(trimmed);
        }
    }
    candidates
        .into_iter()
        .min_by_key(|s| s.len())
        .map(str::to_string)
}

/// Fallback organization name from the file stem: prefer the segment after
/// " - " ("Staff Directory - Camden County College"), then drop generic words.
fn infer_org_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let candidate = match stem.split_once(" - ") {
        Some((_, rest)) => rest.trim().to_string(),
        None => stem,
    };
    let candidate = GENERIC_ORG_WORDS_RE.replace_all(&candidate, "");
    WS_RE.replace_all(candidate.trim(), " ").to_string()
}
