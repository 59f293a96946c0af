//! Fuzzy header resolution for roster exports
//!
//! Source spreadsheets never agree on column names ("Full Legal Name",
//! "Preferred Name (nickname)", "Police Check Completed?"). Each canonical
//! field carries one label; resolution tries the label, the label with
//! `_`/`-` as spaces, and the label with `_`/`-` removed, and accepts the
//! first header cell that contains the candidate or is contained by it.
//! The leftmost match wins, so an ambiguous export binds the earliest
//! plausible column.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonical fields the reconciliation engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterField {
    LegalName,
    PreferredName,
    Pronouns,
    Email,
    Phone,
    BirthDate,
    StartDate,
    TeamCode,
    TeamType,
    Street,
    City,
    Province,
    Postal,
    EmergencyName,
    EmergencyRelation,
    EmergencyPhone,
    Allergies,
    Medical,
    PoliceCheck,
    FirstAid,
    DriversLicense,
    ExperienceRating,
}

impl RosterField {
    pub const ALL: [RosterField; 22] = [
        RosterField::LegalName,
        RosterField::PreferredName,
        RosterField::Pronouns,
        RosterField::Email,
        RosterField::Phone,
        RosterField::BirthDate,
        RosterField::StartDate,
        RosterField::TeamCode,
        RosterField::TeamType,
        RosterField::Street,
        RosterField::City,
        RosterField::Province,
        RosterField::Postal,
        RosterField::EmergencyName,
        RosterField::EmergencyRelation,
        RosterField::EmergencyPhone,
        RosterField::Allergies,
        RosterField::Medical,
        RosterField::PoliceCheck,
        RosterField::FirstAid,
        RosterField::DriversLicense,
        RosterField::ExperienceRating,
    ];

    /// Canonical label used to generate candidate spellings.
    pub fn label(self) -> &'static str {
        match self {
            RosterField::LegalName => "legal_name",
            RosterField::PreferredName => "preferred_name",
            RosterField::Pronouns => "pronouns",
            RosterField::Email => "email",
            RosterField::Phone => "phone",
            RosterField::BirthDate => "birth",
            RosterField::StartDate => "start_date",
            RosterField::TeamCode => "team_code",
            RosterField::TeamType => "team_type",
            RosterField::Street => "street",
            RosterField::City => "city",
            RosterField::Province => "province",
            RosterField::Postal => "postal",
            RosterField::EmergencyName => "emergency_contact_name",
            RosterField::EmergencyRelation => "emergency_contact_relation",
            RosterField::EmergencyPhone => "emergency_contact_phone",
            RosterField::Allergies => "allergies",
            RosterField::Medical => "medical",
            RosterField::PoliceCheck => "police_check",
            RosterField::FirstAid => "first_aid",
            RosterField::DriversLicense => "license",
            RosterField::ExperienceRating => "experience",
        }
    }

    /// Stable key used when reporting this field back to the portal.
    pub fn report_key(self) -> &'static str {
        match self {
            RosterField::LegalName => "name",
            RosterField::PreferredName => "preferredName",
            RosterField::Pronouns => "pronouns",
            RosterField::Email => "email",
            RosterField::Phone => "phone",
            RosterField::BirthDate => "birthDate",
            RosterField::StartDate => "startDate",
            RosterField::TeamCode => "teamCode",
            RosterField::TeamType => "teamType",
            RosterField::Street => "street",
            RosterField::City => "city",
            RosterField::Province => "province",
            RosterField::Postal => "postal",
            RosterField::EmergencyName => "emergencyContactName",
            RosterField::EmergencyRelation => "emergencyContactRelation",
            RosterField::EmergencyPhone => "emergencyContactPhone",
            RosterField::Allergies => "allergies",
            RosterField::Medical => "medical",
            RosterField::PoliceCheck => "policeCheck",
            RosterField::FirstAid => "firstAid",
            RosterField::DriversLicense => "driversLicense",
            RosterField::ExperienceRating => "experienceRating",
        }
    }
}

/// Candidate spellings per field, computed once.
static CANDIDATES: Lazy<HashMap<RosterField, Vec<String>>> = Lazy::new(|| {
    RosterField::ALL
        .iter()
        .map(|&field| {
            let label = field.label();
            let spaced = label.replace(['_', '-'], " ");
            let squashed = label.replace(['_', '-'], "");
            let mut candidates = vec![label.to_string()];
            if spaced != label {
                candidates.push(spaced);
            }
            if squashed != label {
                candidates.push(squashed);
            }
            (field, candidates)
        })
        .collect()
});

/// Resolve one canonical field to a zero-based column index.
///
/// `headers` must already be lower-cased and trimmed. Returns the first
/// (leftmost) header cell where the header contains a candidate spelling or
/// the candidate contains the header. Empty header cells never match.
pub fn resolve_column(field: RosterField, headers: &[String]) -> Option<usize> {
    for candidate in &CANDIDATES[&field] {
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if header.contains(candidate.as_str()) || candidate.contains(header.as_str()) {
                return Some(idx);
            }
        }
    }
    None
}

/// Resolved header row: canonical field -> column index.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<RosterField, usize>,
}

impl HeaderMap {
    /// Resolve every canonical field against a tokenized header row.
    pub fn resolve(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut columns = HashMap::new();
        for field in RosterField::ALL {
            if let Some(idx) = resolve_column(field, &lowered) {
                columns.insert(field, idx);
            }
        }
        Self { columns }
    }

    pub fn column(&self, field: RosterField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Raw cell for a field, trimmed; `None` when the column is unresolved,
    /// missing from this row, or empty.
    pub fn cell<'a>(&self, cells: &'a [String], field: RosterField) -> Option<&'a str> {
        let idx = self.column(field)?;
        let value = cells.get(idx)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}
