use std::sync::LazyLock;

use regex::Regex;

pub static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.\w+").unwrap());

static EMAIL_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.\-]+@[\w.\-]+\.[A-Za-z]{2,}\b").unwrap());

// Role phrases around "coach", most specific first.
static TITLE_PHRASE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(head\s+coach[ A-Za-z\s/&-]*)",
        r"(?i)(associate\s+(?:head\s+)?coach[ A-Za-z\s/&-]*)",
        r"(?i)(assistant\s+(?:head\s+)?coach[ A-Za-z\s/&-]*)",
        r"(?i)([A-Za-z\s/&-]*?\bcoach\b[ A-Za-z\s/&-]*)",
        r"(?i)([A-Za-z\s/&-]*coordinator[ A-Za-z\s/&-]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Trailing personal name after "coach" ("Head Coach John Doe" -> "Head Coach").
static TRAILING_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bcoach\b)\s+[A-Z][A-Za-z’'\-]+(?:\s+[A-Z][A-Za-z’'\-]+){0,2}\s*$").unwrap()
});

// Rule (a): role phrase ending in "coach", then 2-4 capitalized words at the end.
static ROLE_THEN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<role>.*?\bcoach(?:[\w\s/&\-’']*)?)\s+(?P<name>[A-Z][A-Za-z’'\-\.]+(?:\s+[A-Z][A-Za-z’'\-\.]+){1,3})\s*$",
    )
    .unwrap()
});

// Rule (b): longest trailing 1-6 word phrase ending in "coach".
static TITLE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Za-z'’/&\-\s]*?\b(?:[A-Za-z'’/&\-]+\s+){1,6}coach)\b\s*$").unwrap()
});

// Rule (c): any trailing substring anchored on the word "coach".
static TITLE_ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([A-Za-z’/&\-\s]*?\bcoach\b[ A-Za-z’/&\-]*)$").unwrap());

// Role tokens and descriptors that may trail a name segment.
static TRAILING_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[-—–,:/\s]*(?:head|assistant|associate|coach|coordinator|director|recruit(?:ing|er)?|operations?|strength|conditioning|athletic|performance|men|women|men's|women's)\b.*$",
    )
    .unwrap()
});

static NAME_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z'’\-]+$").unwrap());

static CAMEL_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]+)([A-Z][a-z]+)$").unwrap());

static HEAD_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bhead\b").unwrap());

// "<Word> Coach" at the start of a title, candidate surname leak.
static TITLE_SURNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([A-Za-z][A-Za-z’'\-]+)\s+Coach\b").unwrap());

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

static PHONE_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{3}\)\s*\d{3}[-.]\d{4}").unwrap());
static PHONE_TEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.]\d{3}[-.]\d{4}\b").unwrap());
static PHONE_SEVEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}[-.]\d{4}\b").unwrap());
static PHONE_STUB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}[-.]\b").unwrap());
static TRAILING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-–,:]*\b\d{2,}\b.*$").unwrap());

static USERNAME_CLEAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

// Tokens that can never be part of a person's name: role words, sport and
// program words, generic directory headers.
const NAME_STOPWORDS: &[&str] = &[
    "and", "of", "the", "dept", "department", "athletics", "athletic", "recreation", "business",
    "health", "trainer", "performance", "strength", "conditioning", "manager", "representative",
    "advisor", "associate", "assistant", "head", "coach", "coaching", "coaches", "coordinator",
    "director", "offensive", "defensive", "women", "women's", "men", "men's", "club", "ext", "sr",
    "jr", "ii", "iii", "iv", "senior", "junior", "admin", "administrative", "baseball",
    "basketball", "soccer", "football", "swimming", "diving", "volleyball", "lacrosse", "track",
    "cross", "country", "cross-country", "field", "field-hockey", "fieldhockey", "softball",
    "tennis", "golf", "wrestling", "hockey", "rowing", "cheer", "cheerleading", "stunt",
    "esports", "bowling", "fencing", "gymnastics", "staff", "directory", "university", "college",
];

const ROLE_SUBSTRINGS: &[&str] = &[
    "coach", "assistant", "associate", "head", "recruit", "recruiting", "recruiter",
    "coordinator", "director", "manager", "strength", "conditioning", "athletic", "operations",
    "performance",
];

const ROLE_WORDS: &[&str] = &["head", "assistant", "associate", "coach", "coordinator", "director"];

const HONORIFICS: &[&str] = &["dr.", "dr", "mr.", "mr", "ms.", "ms", "mrs.", "mrs"];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn trim_punct(s: &str) -> String {
    s.trim_matches(|c: char| " -—–,:\t\n".contains(c)).to_string()
}

/// Generic extractor: pull a role phrase around "coach"/"coordinator" out of a
/// line. Returns "" when the line has no "coach" at all; "coach" when the word
/// is present but no phrase pattern applies.
pub fn extract_coach_title(s: &str) -> String {
    if !s.to_lowercase().contains("coach") {
        return String::new();
    }
    // Drop emails so local-part tokens after "coach" are not captured.
    let without_email = EMAIL_STRIP_RE.replace_all(s, "");
    for re in TITLE_PHRASE_RES.iter() {
        if let Some(caps) = re.captures(&without_email) {
            let cand = caps[1].trim();
            let cand = TRAILING_NAME_RE.replace(cand, "$1");
            return cand.trim().to_string();
        }
    }
    "coach".to_string()
}

/// Split a pre-email segment into (first_name, last_name, title) via the
/// ordered rule cascade; first satisfied rule wins.
pub fn split_name_and_title(pre_email_text: &str) -> (String, String, String) {
    let pre = pre_email_text.trim();
    if pre.is_empty() {
        return (String::new(), String::new(), String::new());
    }

    let title;
    let mut name_only;

    if let Some(caps) = ROLE_THEN_NAME_RE.captures(pre) {
        title = caps["role"].trim().to_string();
        name_only = caps["name"].trim().to_string();
    } else if let Some(caps) = TITLE_END_RE.captures(pre) {
        let m = caps.get(1).unwrap();
        title = m.as_str().trim().to_string();
        name_only = pre[..m.start()].trim().trim_end_matches(['-', '—', '–', ',', ':']).trim().to_string();
    } else if let Some(caps) = TITLE_ANCHOR_RE.captures(pre) {
        let m = caps.get(1).unwrap();
        title = m.as_str().trim().to_string();
        name_only = pre[..m.start()].trim().trim_end_matches(['-', '—', '–', ',', ':']).trim().to_string();
    } else {
        title = extract_coach_title(pre);
        name_only = pre.to_string();
    }

    // Trailing role tokens that slipped through.
    name_only = TRAILING_ROLE_RE.replace(&name_only, "").trim().to_string();
    let (first, last) = clean_name_tokens(&name_only);
    (first, last, title)
}

/// Token sanitation: split candidate name text on whitespace and keep only
/// name-shaped tokens that are not role, sport, or header words. First name is
/// the first survivor; last name is the last survivor different from it.
pub fn clean_name_tokens(name_text: &str) -> (String, String) {
    let mut cleaned: Vec<String> = Vec::new();
    for token in name_text.split_whitespace() {
        let stripped = token.trim_matches(|c: char| ",.:;|/()&[]{}-—–".contains(c));
        if stripped.is_empty() {
            continue;
        }
        if stripped.chars().any(|c| c.is_ascii_digit()) || stripped.contains('@') {
            continue;
        }
        let low = stripped.to_lowercase();
        if NAME_STOPWORDS.contains(&low.as_str()) {
            continue;
        }
        if ROLE_SUBSTRINGS.iter().any(|sub| low.contains(sub)) {
            continue;
        }
        // Hyphen/slash-separated parts checked individually too.
        let part_hit = low.split(['-', '/']).filter(|p| !p.is_empty()).any(|part| {
            NAME_STOPWORDS.contains(&part) || ROLE_SUBSTRINGS.iter().any(|sub| part.contains(sub))
        });
        if part_hit {
            continue;
        }
        if !NAME_SHAPE_RE.is_match(stripped) {
            continue;
        }
        cleaned.push(stripped.to_string());
    }

    let Some(first) = cleaned.first().cloned() else {
        return (String::new(), String::new());
    };
    if cleaned.len() == 1 {
        return (first, String::new());
    }
    let first_low = first.to_lowercase();
    let last = cleaned[1..]
        .iter()
        .filter(|t| t.to_lowercase() != first_low)
        .next_back()
        .cloned()
        .unwrap_or_default();
    (first, last)
}

/// Clear degenerate name fields: identical first/last, or bare role words
/// (clearing the first name lets the email-derived fallback fire later).
pub fn sanitize_name(first_name: &str, last_name: &str) -> (String, String) {
    let mut first = first_name.trim().to_string();
    let mut last = last_name.trim().to_string();
    if !first.is_empty() && !last.is_empty() && first.to_lowercase() == last.to_lowercase() {
        last.clear();
    }
    if ROLE_WORDS.contains(&last.to_lowercase().as_str()) {
        last.clear();
    }
    if ROLE_WORDS.contains(&first.to_lowercase().as_str()) {
        first.clear();
    }
    (first, last)
}

/// Derive a plausible (first, last) from an email local part.
pub fn derive_name_from_email(email: &str) -> (String, String) {
    let Some(local) = email.split('@').next().filter(|_| email.contains('@')) else {
        return (String::new(), String::new());
    };
    let parts: Vec<&str> = local.split(['.', '_', '-']).filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [initial, last, ..] if initial.chars().count() == 1 => {
            (initial.to_uppercase(), capitalize(last))
        }
        [first, last, ..] => (capitalize(first), capitalize(last)),
        [token] => {
            if let Some(caps) = CAMEL_SPLIT_RE.captures(token) {
                (caps[1].to_string(), caps[2].to_string())
            } else {
                (capitalize(token), String::new())
            }
        }
    }
}

/// Keep an explicit coach title verbatim; else "Head Coach" when the context
/// mentions the standalone word "head"; else "Assistant Coach".
pub fn normalize_title(title_candidate: &str, context_text: &str) -> String {
    let t = title_candidate.trim();
    if !t.is_empty() && t.to_lowercase().contains("coach") {
        return t.to_string();
    }
    if HEAD_WORD_RE.is_match(context_text) {
        return "Head Coach".to_string();
    }
    "Assistant Coach".to_string()
}

/// Remove word-bounded occurrences of the person's own name from a title.
pub fn strip_name_from_title(title_text: &str, first_name: &str, last_name: &str) -> String {
    let mut t = title_text.trim().to_string();
    if t.is_empty() {
        return t;
    }
    let mut patterns: Vec<String> = Vec::new();
    if !first_name.is_empty() {
        patterns.push(format!(r"(?i)\b{}\b", regex::escape(first_name)));
    }
    if !last_name.is_empty() {
        patterns.push(format!(r"(?i)\b{}\b", regex::escape(last_name)));
    }
    if !first_name.is_empty() && !last_name.is_empty() {
        patterns.push(format!(
            r"(?i)\b{}\s+{}\b",
            regex::escape(first_name),
            regex::escape(last_name)
        ));
        patterns.push(format!(
            r"(?i)\b{}\s+{}\b",
            regex::escape(last_name),
            regex::escape(first_name)
        ));
    }
    for pat in patterns {
        t = Regex::new(&pat).unwrap().replace_all(&t, "").to_string();
    }
    trim_punct(&WS_RE.replace_all(&t, " "))
}

/// Remove phone-shaped substrings and stray numeric fragments from a title.
pub fn clean_title_text(title_text: &str) -> String {
    if title_text.is_empty() {
        return String::new();
    }
    let t = PHONE_PAREN_RE.replace_all(title_text, "");
    let t = PHONE_TEN_RE.replace_all(&t, "");
    let t = PHONE_SEVEN_RE.replace_all(&t, "");
    let t = PHONE_STUB_RE.replace_all(&t, "");
    let t = TRAILING_DIGITS_RE.replace(&t, "");
    trim_punct(&WS_RE.replace_all(&t, " "))
}

/// Derive a title from the raw pre-email segment by dropping honorifics and
/// the already-detected name from its front; falls back to the generic
/// extractor when no "coach" survives.
pub fn derive_title_from_namepart(name_part: &str, first_name: &str, last_name: &str) -> String {
    let s = name_part.trim();
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    while tokens
        .first()
        .is_some_and(|t| HONORIFICS.contains(&t.to_lowercase().as_str()))
    {
        tokens.remove(0);
    }
    if !first_name.is_empty()
        && tokens.first().is_some_and(|t| t.eq_ignore_ascii_case(first_name))
    {
        tokens.remove(0);
    }
    if !last_name.is_empty()
        && tokens.first().is_some_and(|t| t.eq_ignore_ascii_case(last_name))
    {
        tokens.remove(0);
    }
    let cleaned = tokens
        .join(" ")
        .trim()
        .trim_start_matches(['-', '—', '–', ',', ':'])
        .trim()
        .to_string();
    if !cleaned.to_lowercase().contains("coach") {
        return extract_coach_title(s);
    }
    cleaned
}

/// Surname-leak correction: a title of the form "<Word> Coach" where `<Word>`
/// echoes the username or an email-derived name token loses the word,
/// leaving the bare role phrase.
pub fn fix_surname_leak(
    title_text: &str,
    username: &str,
    email_first: &str,
    email_last: &str,
) -> String {
    let trimmed = title_text.trim();
    let Some(caps) = TITLE_SURNAME_RE.captures(trimmed) else {
        return trimmed.to_string();
    };
    let surname = caps[1].to_lowercase();
    let user_low = username.to_lowercase();
    let mut hit = !username.is_empty()
        && (user_low.contains(&surname) || user_low.ends_with(&surname));
    if !hit {
        hit = (!email_first.is_empty() && email_first.to_lowercase() == surname)
            || (!email_last.is_empty() && email_last.to_lowercase() == surname);
    }
    if hit {
        format!("Coach{}", &trimmed[caps.get(0).unwrap().end()..])
    } else {
        trimmed.to_string()
    }
}

/// When no last name was recovered and the title segment reads "<Word> Coach",
/// adopt `<Word>` as the surname and backfill the first name from the email
/// local part (preferring the token that is not the surname; prefix-stripped
/// when the local part ends with the surname).
pub fn adopt_surname_from_title(
    title_source: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> (String, String) {
    if !last_name.is_empty() {
        return (first_name.to_string(), last_name.to_string());
    }
    let Some(caps) = TITLE_SURNAME_RE.captures(title_source.trim()) else {
        return (first_name.to_string(), last_name.to_string());
    };
    let last = caps[1].to_string();
    let last_low = last.to_lowercase();
    let mut first = first_name.to_string();
    if first.is_empty() && !email.is_empty() {
        let (df, dl) = derive_name_from_email(email);
        if !dl.is_empty() && dl.to_lowercase() == last_low {
            first = df;
        } else if !df.is_empty()
            && df.to_lowercase().ends_with(&last_low)
            && df.len() > last.len()
            && df.is_char_boundary(df.len() - last.len())
        {
            let stem = df[..df.len() - last.len()].trim_matches(|c: char| "._-".contains(c)).to_string();
            first = capitalize(&stem);
        } else if !df.is_empty() {
            first = df;
        } else if !dl.is_empty() && dl.to_lowercase() != last_low {
            first = dl;
        }
    }
    sanitize_name(&first, &last)
}

/// Synthesized username: lowercase `first.last`, each part reduced to
/// `[a-z0-9]` runs joined by dots, empty parts omitted.
pub fn build_username_from_name(first_name: &str, last_name: &str) -> String {
    let clean = |s: &str| -> String {
        USERNAME_CLEAN_RE
            .replace_all(&s.trim().to_lowercase(), ".")
            .trim_matches('.')
            .to_string()
    };
    [clean(first_name), clean(last_name)]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}
