//! Person registry types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Whether a person is on payroll or contracted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "team_type", rename_all = "lowercase")]
pub enum TeamType {
    Employee,
    Contractor,
}

impl Default for TeamType {
    fn default() -> Self {
        TeamType::Employee
    }
}

/// Lifecycle status of a person record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "person_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonStatus {
    Pending,
    Active,
    Inactive,
}

/// Emergency contact, stored as a single structured value on the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub relation: Option<String>,
    pub phone: Option<String>,
}

/// Health information, stored as a single structured value on the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInfo {
    pub allergies: Option<String>,
    pub medical: Option<String>,
}

/// Person entity - a staff member or contractor in the registry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub preferred_name: Option<String>,
    pub pronouns: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub team_code: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<Json<EmergencyContact>>,
    pub health_info: Option<Json<HealthInfo>>,
    pub police_check: Option<bool>,
    pub first_aid: Option<bool>,
    pub drivers_license: Option<bool>,
    pub experience_rating: Option<i32>,
    pub role: String,
    pub team_type: TeamType,
    pub status: PersonStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full candidate record to create in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    pub preferred_name: Option<String>,
    pub pronouns: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub team_code: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub health_info: Option<HealthInfo>,
    pub police_check: Option<bool>,
    pub first_aid: Option<bool>,
    pub drivers_license: Option<bool>,
    pub experience_rating: Option<i32>,
    pub role: String,
    pub team_type: TeamType,
    pub status: PersonStatus,
}

/// Partial update carrying only fields that should be filled in.
///
/// The merge policy is fill-gaps-only: a field appears here only when the
/// imported row has a value and the stored record does not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
    pub preferred_name: Option<String>,
    pub pronouns: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub team_code: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub health_info: Option<HealthInfo>,
    pub police_check: Option<bool>,
    pub first_aid: Option<bool>,
    pub drivers_license: Option<bool>,
    pub experience_rating: Option<i32>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.preferred_name.is_none()
            && self.pronouns.is_none()
            && self.phone.is_none()
            && self.birth_date.is_none()
            && self.start_date.is_none()
            && self.team_code.is_none()
            && self.address.is_none()
            && self.emergency_contact.is_none()
            && self.health_info.is_none()
            && self.police_check.is_none()
            && self.first_aid.is_none()
            && self.drivers_license.is_none()
            && self.experience_rating.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_status_serializes_uppercase() {
        let json = serde_json::to_string(&PersonStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn test_team_type_serializes_variant_name() {
        let json = serde_json::to_string(&TeamType::Contractor).unwrap();
        assert_eq!(json, "\"Contractor\"");
    }

    #[test]
    fn test_person_patch_default_is_empty() {
        assert!(PersonPatch::default().is_empty());
    }

    #[test]
    fn test_person_patch_with_field_is_not_empty() {
        let patch = PersonPatch {
            pronouns: Some("She/Her".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_emergency_contact_serializes_camel_case() {
        let contact = EmergencyContact {
            name: Some("Mary Doe".to_string()),
            relation: Some("mother".to_string()),
            phone: None,
        };
        let json = serde_json::to_string(&contact).unwrap();
        assert!(json.contains("\"name\":\"Mary Doe\""));
        assert!(json.contains("\"relation\":\"mother\""));
    }
}
