//! Content rules shared by all forms.
//!
//! The SQL keyword check is an input constraint for titles and names, not a
//! security control: every query is parameterized. It rejects some legitimate
//! text ("Update on the Selection Committee") and misses plenty of malicious
//! text.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub type Rule = fn(&str) -> Result<(), String>;

pub const TITLE_MAX: usize = 200;
pub const NAME_MAX: usize = 100;
pub const TAG_MAX: usize = 50;
pub const MIN_PUBLICATION_YEAR: i32 = 1450;
pub const PHONE_MAX: usize = 20;
pub const PERSON_NAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const WEBSITE_MAX: usize = 200;

const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "union", "alter", "create", "exec", "--",
    ";--", "/*", "*/", "xp_",
];

const SCRIPT_PATTERNS: &[&str] = &[
    "<script",
    "</script",
    "javascript:",
    "vbscript:",
    "onerror=",
    "onload=",
    "onclick=",
    "onmouseover=",
    "<iframe",
    "<object",
    "<embed",
    "data:text/html",
];

const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:"];

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9\s\-\(\)\.]+$").unwrap());
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9@.+\-_]+$").unwrap());

pub fn required(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("This field is required.".to_string())
    } else {
        Ok(())
    }
}

pub fn no_sql_keywords(value: &str) -> Result<(), String> {
    let lowered = value.to_lowercase();
    match SQL_KEYWORDS.iter().find(|kw| lowered.contains(**kw)) {
        Some(kw) => Err(format!("Contains a disallowed keyword: {}", kw.to_uppercase())),
        None => Ok(()),
    }
}

pub fn no_script(value: &str) -> Result<(), String> {
    let lowered = value.to_lowercase();
    if SCRIPT_PATTERNS.iter().any(|p| lowered.contains(p)) {
        Err("Contains disallowed HTML or script content.".to_string())
    } else {
        Ok(())
    }
}

pub fn phone_number(value: &str) -> Result<(), String> {
    let value = value.trim();
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if value.chars().count() > PHONE_MAX
        || !PHONE_RE.is_match(value)
        || !(10..=15).contains(&digits)
    {
        return Err("Enter a valid phone number (10 to 15 digits).".to_string());
    }
    Ok(())
}

pub fn url(value: &str) -> Result<(), String> {
    let lowered = value.trim().to_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return Err("URL must start with http:// or https://".to_string());
    }
    if DANGEROUS_SCHEMES.iter().any(|s| lowered.contains(s)) {
        return Err("URL contains a disallowed scheme.".to_string());
    }
    Ok(())
}

pub fn username(value: &str) -> Result<(), String> {
    if USERNAME_RE.is_match(value) {
        Ok(())
    } else {
        Err("Username may contain only letters, digits and @/./+/-/_ characters.".to_string())
    }
}

pub fn publication_year(year: i32) -> Result<i32, String> {
    publication_year_at(year, Utc::now().year())
}

/// Accepts years in `[1450, current_year]`
pub fn publication_year_at(year: i32, current_year: i32) -> Result<i32, String> {
    if year < MIN_PUBLICATION_YEAR {
        Err(format!("Publication year must be {} or later.", MIN_PUBLICATION_YEAR))
    } else if year > current_year {
        Err(format!(
            "Publication year cannot be in the future. Current year is {}.",
            current_year
        ))
    } else {
        Ok(year)
    }
}

/// Strip separators and check the ISBN-10 / ISBN-13 shape
pub fn isbn(value: &str) -> Result<String, String> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();
    let valid = compact.is_ascii()
        && match compact.len() {
            13 => compact.chars().all(|c| c.is_ascii_digit()),
            10 => {
                let (body, last) = compact.split_at(9);
                body.chars().all(|c| c.is_ascii_digit())
                    && last.chars().all(|c| c.is_ascii_digit() || c == 'X')
            }
            _ => false,
        };
    if valid {
        Ok(compact)
    } else {
        Err("ISBN must have 10 or 13 digits.".to_string())
    }
}

const ENTITIES: &[&str] = &["&amp;", "&quot;", "&#x27;", "&#39;", "&lt;", "&gt;"];

/// Trim, drop angle brackets and escape the remaining HTML-significant
/// characters. Idempotent: already-escaped entities are left alone.
pub fn sanitize_text(value: &str) -> String {
    let stripped: String = value.trim().chars().filter(|c| *c != '<' && *c != '>').collect();
    let mut out = String::with_capacity(stripped.len());
    for (i, c) in stripped.char_indices() {
        match c {
            '&' if ENTITIES.iter().any(|e| stripped[i..].starts_with(e)) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out.trim().to_string()
}
