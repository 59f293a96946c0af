//! Field normalizers for roster imports
//!
//! Every normalizer is a pure, total function: raw text in, canonical value
//! or `None` out. Malformed input degrades to `None` (or passes through
//! unformatted, for phone numbers) — it never fails the row.

use chrono::NaiveDate;

use crate::types::{EmergencyContact, HealthInfo};

/// Tri-state classification of a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    Yes,
    No,
    Uncertain,
    Absent,
}

impl TriState {
    /// Value persisted on the record. Uncertain answers are stored as
    /// `false` and separately flagged for human review.
    pub fn stored(self) -> Option<bool> {
        match self {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::Uncertain => Some(false),
            TriState::Absent => None,
        }
    }
}

/// Classify a raw yes/no cell.
///
/// `y`/`yes` and `n`/`no` are definite; `?`, `y?`, `n?` and any other
/// non-empty text that cannot be confidently read either way is uncertain.
pub fn classify_tri_state(raw: Option<&str>) -> TriState {
    let value = match raw {
        Some(v) => v.trim().to_lowercase(),
        None => return TriState::Absent,
    };
    match value.as_str() {
        "" => TriState::Absent,
        "y" | "yes" => TriState::Yes,
        "n" | "no" => TriState::No,
        _ => TriState::Uncertain,
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Title-case a name. The whole string is lower-cased first so ALL-CAPS and
/// all-lowercase source data both come out as "Jane Doe".
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    let titled = lowered
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ");
    Some(titled)
}

/// Normalize pronouns to `Word/Word` capitalization ("she/her" -> "She/Her").
pub fn normalize_pronouns(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let joined = trimmed
        .to_lowercase()
        .split('/')
        .map(|part| capitalize_first(part.trim()))
        .collect::<Vec<_>>()
        .join("/");
    Some(joined)
}

/// Normalize a phone cell. Multi-value cells keep only the first number;
/// 10 digits format locally, 11 digits with a leading country `1` format
/// internationally, anything else passes through unformatted.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let first = raw.split([';', ',']).next().unwrap_or("").trim();
    if first.is_empty() {
        return None;
    }
    let digits: String = first.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => Some(format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        )),
        11 if digits.starts_with('1') => Some(format!(
            "+1 ({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        )),
        _ => Some(first.to_string()),
    }
}

/// Lower-cased email, or `None` when the cell does not look like an address.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.contains('@') {
        Some(trimmed.to_lowercase())
    } else {
        None
    }
}

/// Fixed format table for free-form dates. Deliberately pinned (no locale
/// lookup) so parsing is deterministic.
const GENERIC_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%Y/%m/%d"];

const MONTH_ABBREVIATIONS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a date cell through an ordered chain of attempts: ISO, year-month
/// (defaulted to day 1), the fixed generic table, then `D-Mon-YY` /
/// `D-Mon-YYYY`. Unparseable text yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    // YYYY-MM defaults to the first of the month
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
        return Some(date);
    }

    for format in GENERIC_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    parse_day_month_year(trimmed)
}

/// `D-Mon-YY` / `D-Mon-YYYY`, e.g. "5-Mar-24". Two-digit years up to 50 are
/// 20xx, above 50 are 19xx.
fn parse_day_month_year(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].trim().parse().ok()?;
    let month_key = parts[1].trim().to_lowercase();
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == month_key)
        .map(|i| i as u32 + 1)?;

    let year_part = parts[2].trim();
    let year: i32 = match year_part.len() {
        2 => {
            let short: i32 = year_part.parse().ok()?;
            if short <= 50 {
                2000 + short
            } else {
                1900 + short
            }
        }
        4 => year_part.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rating in the closed interval [1, 5]; anything else is `None`.
pub fn normalize_rating(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|n| (1..=5).contains(n))
}

/// Team codes are upper-cased and trimmed.
pub fn normalize_team_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Trimmed free text, `None` when empty.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Join the non-empty address parts with ", "; all-empty yields `None`.
pub fn normalize_address(
    street: Option<&str>,
    city: Option<&str>,
    province: Option<&str>,
    postal: Option<&str>,
) -> Option<String> {
    let parts: Vec<&str> = [street, city, province, postal]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Assemble an emergency contact from its sub-fields; present iff any
/// member is present.
pub fn build_emergency_contact(
    name: Option<&str>,
    relation: Option<&str>,
    phone: Option<&str>,
) -> Option<EmergencyContact> {
    let contact = EmergencyContact {
        name: name.and_then(normalize_name),
        relation: relation.and_then(clean_text),
        phone: phone.and_then(normalize_phone),
    };
    if contact.name.is_none() && contact.relation.is_none() && contact.phone.is_none() {
        None
    } else {
        Some(contact)
    }
}

/// Assemble health info from its sub-fields; present iff any member is.
pub fn build_health_info(allergies: Option<&str>, medical: Option<&str>) -> Option<HealthInfo> {
    let info = HealthInfo {
        allergies: allergies.and_then(clean_text),
        medical: medical.and_then(clean_text),
    };
    if info.allergies.is_none() && info.medical.is_none() {
        None
    } else {
        Some(info)
    }
}
