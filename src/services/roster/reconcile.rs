//! Per-row reconciliation: skip, create, or fill-only merge
//!
//! Each data row builds a typed candidate record, looks up a possible match
//! by natural key (lower-cased email), and either creates a new person or
//! fills the gaps on the existing one. Failure is a first-class value
//! (`RowError`) so the orchestrator can record it and move on.

use thiserror::Error;

use crate::services::registry::PersonRegistry;
use crate::services::roster::headers::{HeaderMap, RosterField};
use crate::services::roster::normalize;
use crate::types::{NewPerson, Person, PersonPatch, PersonStatus, TeamType, UncertainField};

/// Role assigned when a row's team-type cell carries the contractor signal
const CONTRACTOR_ROLE: &str = "CONTRACTOR";

/// What happened to one data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    Skipped,
}

/// Row result: the outcome plus any tri-state answers needing review
#[derive(Debug)]
pub struct RowReport {
    pub outcome: RowOutcome,
    pub uncertain: Vec<UncertainField>,
}

impl RowReport {
    fn skipped() -> Self {
        Self {
            outcome: RowOutcome::Skipped,
            uncertain: Vec::new(),
        }
    }
}

/// Failure while reconciling a single row. Never aborts the import; the
/// orchestrator records it and continues.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("registry lookup failed: {0}")]
    Lookup(anyhow::Error),
    #[error("registry write failed: {0}")]
    Write(anyhow::Error),
}

/// Tri-state fields tracked for uncertainty reporting
const TRI_STATE_FIELDS: [RosterField; 3] = [
    RosterField::PoliceCheck,
    RosterField::FirstAid,
    RosterField::DriversLicense,
];

/// Reconcile one tokenized data row against the registry.
pub async fn reconcile_row(
    registry: &dyn PersonRegistry,
    cells: &[String],
    map: &HeaderMap,
    default_role: &str,
) -> Result<RowReport, RowError> {
    // A row without a usable name never reaches normalization
    let name_raw = map.cell(cells, RosterField::LegalName).unwrap_or("");
    if name_raw.chars().count() < 2 {
        return Ok(RowReport::skipped());
    }

    let email = map
        .cell(cells, RosterField::Email)
        .and_then(normalize::normalize_email);

    let existing = match &email {
        Some(key) => registry.find_by_email(key).await.map_err(RowError::Lookup)?,
        None => None,
    };

    let candidate = build_candidate(cells, map, &email, default_role);

    // Uncertainty is only tracked when the row has a natural key to attach
    // it to; ambiguity on keyless rows is dropped.
    let uncertain = match &email {
        Some(key) => collect_uncertain(cells, map, key),
        None => Vec::new(),
    };

    match existing {
        None => {
            registry.create(&candidate).await.map_err(RowError::Write)?;
            Ok(RowReport {
                outcome: RowOutcome::Created,
                uncertain,
            })
        }
        Some(person) => {
            let patch = build_patch(&person, &candidate);
            if patch.is_empty() {
                return Ok(RowReport {
                    outcome: RowOutcome::Skipped,
                    uncertain,
                });
            }
            registry
                .update(person.id, &patch)
                .await
                .map_err(RowError::Write)?;
            Ok(RowReport {
                outcome: RowOutcome::Updated,
                uncertain,
            })
        }
    }
}

/// Run every applicable normalizer over the row and assemble the candidate.
fn build_candidate(
    cells: &[String],
    map: &HeaderMap,
    email: &Option<String>,
    default_role: &str,
) -> NewPerson {
    let cell = |field| map.cell(cells, field);

    // A single source signal drives both role and team type
    let (role, team_type) = match cell(RosterField::TeamType) {
        Some("Contractor") => (CONTRACTOR_ROLE.to_string(), TeamType::Contractor),
        _ => (default_role.to_string(), TeamType::Employee),
    };

    NewPerson {
        name: cell(RosterField::LegalName)
            .and_then(normalize::normalize_name)
            .unwrap_or_default(),
        preferred_name: cell(RosterField::PreferredName).and_then(normalize::normalize_name),
        pronouns: cell(RosterField::Pronouns).and_then(normalize::normalize_pronouns),
        email: email.clone(),
        phone: cell(RosterField::Phone).and_then(normalize::normalize_phone),
        birth_date: cell(RosterField::BirthDate).and_then(normalize::normalize_date),
        start_date: cell(RosterField::StartDate).and_then(normalize::normalize_date),
        team_code: cell(RosterField::TeamCode).and_then(normalize::normalize_team_code),
        address: normalize::normalize_address(
            cell(RosterField::Street),
            cell(RosterField::City),
            cell(RosterField::Province),
            cell(RosterField::Postal),
        ),
        emergency_contact: normalize::build_emergency_contact(
            cell(RosterField::EmergencyName),
            cell(RosterField::EmergencyRelation),
            cell(RosterField::EmergencyPhone),
        ),
        health_info: normalize::build_health_info(
            cell(RosterField::Allergies),
            cell(RosterField::Medical),
        ),
        police_check: normalize::classify_tri_state(cell(RosterField::PoliceCheck)).stored(),
        first_aid: normalize::classify_tri_state(cell(RosterField::FirstAid)).stored(),
        drivers_license: normalize::classify_tri_state(cell(RosterField::DriversLicense)).stored(),
        experience_rating: cell(RosterField::ExperienceRating).and_then(normalize::normalize_rating),
        role,
        team_type,
        status: PersonStatus::Pending,
    }
}

fn collect_uncertain(cells: &[String], map: &HeaderMap, email: &str) -> Vec<UncertainField> {
    TRI_STATE_FIELDS
        .iter()
        .filter(|&&field| {
            normalize::classify_tri_state(map.cell(cells, field)) == normalize::TriState::Uncertain
        })
        .map(|&field| UncertainField {
            email: email.to_string(),
            field: field.report_key().to_string(),
        })
        .collect()
}

/// Field-by-field comparison implementing the non-destructive merge: a
/// candidate value is taken only where the stored field is currently null.
fn build_patch(existing: &Person, candidate: &NewPerson) -> PersonPatch {
    fn fill<T: Clone>(existing: &Option<T>, candidate: &Option<T>) -> Option<T> {
        if existing.is_none() {
            candidate.clone()
        } else {
            None
        }
    }

    PersonPatch {
        preferred_name: fill(&existing.preferred_name, &candidate.preferred_name),
        pronouns: fill(&existing.pronouns, &candidate.pronouns),
        phone: fill(&existing.phone, &candidate.phone),
        birth_date: fill(&existing.birth_date, &candidate.birth_date),
        start_date: fill(&existing.start_date, &candidate.start_date),
        team_code: fill(&existing.team_code, &candidate.team_code),
        address: fill(&existing.address, &candidate.address),
        emergency_contact: if existing.emergency_contact.is_none() {
            candidate.emergency_contact.clone()
        } else {
            None
        },
        health_info: if existing.health_info.is_none() {
            candidate.health_info.clone()
        } else {
            None
        },
        police_check: fill(&existing.police_check, &candidate.police_check),
        first_aid: fill(&existing.first_aid, &candidate.first_aid),
        drivers_license: fill(&existing.drivers_license, &candidate.drivers_license),
        experience_rating: fill(&existing.experience_rating, &candidate.experience_rating),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::services::registry::InMemoryPersonRegistry;
    use crate::services::roster::tokenizer::split_line;

    /// A record as entered through the portal: name and birth date known,
    /// everything else still blank.
    fn portal_person(email: &str) -> Person {
        let now = Utc::now();
        Person {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            preferred_name: None,
            pronouns: None,
            email: Some(email.to_string()),
            phone: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 1),
            start_date: None,
            team_code: None,
            address: None,
            emergency_contact: None,
            health_info: None,
            police_check: None,
            first_aid: None,
            drivers_license: None,
            experience_rating: None,
            role: "FACILITATOR".to_string(),
            team_type: TeamType::Employee,
            status: PersonStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn resolve(header_line: &str) -> HeaderMap {
        HeaderMap::resolve(&split_line(header_line))
    }

    async fn run_row(
        registry: &InMemoryPersonRegistry,
        header_line: &str,
        data_line: &str,
    ) -> RowReport {
        let map = resolve(header_line);
        let cells = split_line(data_line);
        reconcile_row(registry, &cells, &map, "FACILITATOR")
            .await
            .expect("row reconciles")
    }

    #[tokio::test]
    async fn test_create_contractor_row() {
        let registry = InMemoryPersonRegistry::new();
        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Team Type",
            "jane doe,JANE@X.com,Contractor",
        )
        .await;

        assert_eq!(report.outcome, RowOutcome::Created);
        let person = registry
            .find_by_email("jane@x.com")
            .await
            .unwrap()
            .expect("created");
        assert_eq!(person.name, "Jane Doe");
        assert_eq!(person.email.as_deref(), Some("jane@x.com"));
        assert_eq!(person.role, "CONTRACTOR");
        assert_eq!(person.team_type, TeamType::Contractor);
        assert_eq!(person.status, PersonStatus::Pending);
    }

    #[tokio::test]
    async fn test_default_role_for_non_contractor() {
        let registry = InMemoryPersonRegistry::new();
        run_row(
            &registry,
            "Full Legal Name,Email Address,Team Type",
            "sam lee,sam@x.com,Staff",
        )
        .await;

        let person = registry.find_by_email("sam@x.com").await.unwrap().unwrap();
        assert_eq!(person.role, "FACILITATOR");
        assert_eq!(person.team_type, TeamType::Employee);
    }

    #[tokio::test]
    async fn test_short_name_is_skipped() {
        let registry = InMemoryPersonRegistry::new();
        for data in ["", "j", " x ,a@x.com"] {
            let report = run_row(&registry, "Full Legal Name,Email Address", data).await;
            assert_eq!(report.outcome, RowOutcome::Skipped);
        }
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_row_without_email_always_creates() {
        let registry = InMemoryPersonRegistry::new();
        run_row(&registry, "Full Legal Name,Email Address", "jane doe,").await;
        run_row(&registry, "Full Legal Name,Email Address", "jane doe,").await;

        // No natural key, so the second row cannot match the first
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_merge_fills_only_gaps() {
        let registry = InMemoryPersonRegistry::new();
        // Existing record with a populated phone and an empty pronouns field
        run_row(
            &registry,
            "Full Legal Name,Email Address,Phone",
            "jane doe,jane@x.com,7091234567",
        )
        .await;

        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Phone,Pronouns",
            "jane doe,jane@x.com,7099999999,she/her",
        )
        .await;
        assert_eq!(report.outcome, RowOutcome::Updated);

        let person = registry.find_by_email("jane@x.com").await.unwrap().unwrap();
        // Populated field untouched, gap filled
        assert_eq!(person.phone.as_deref(), Some("(709) 123-4567"));
        assert_eq!(person.pronouns.as_deref(), Some("She/Her"));
    }

    #[tokio::test]
    async fn test_merge_against_portal_entered_record() {
        let registry = InMemoryPersonRegistry::new();
        registry.insert(portal_person("jane@x.com")).await;

        // The import carries a conflicting birth date and a new start date
        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Birth Date,Start Date",
            "JANE DOE,jane@x.com,1985-01-01,2024-03",
        )
        .await;
        assert_eq!(report.outcome, RowOutcome::Updated);

        let person = registry.find_by_email("jane@x.com").await.unwrap().unwrap();
        // The populated birth date is never overwritten; the empty start
        // date is filled with the normalized import value
        assert_eq!(person.birth_date, NaiveDate::from_ymd_opt(1990, 6, 1));
        assert_eq!(person.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        // Portal-entered status is untouched by an import
        assert_eq!(person.status, PersonStatus::Active);
    }

    #[tokio::test]
    async fn test_nothing_new_to_merge_is_skipped() {
        let registry = InMemoryPersonRegistry::new();
        run_row(
            &registry,
            "Full Legal Name,Email Address,Phone",
            "jane doe,jane@x.com,7091234567",
        )
        .await;

        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Phone",
            "jane doe,jane@x.com,7090000000",
        )
        .await;
        assert_eq!(report.outcome, RowOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_uncertain_tri_state_is_flagged_and_stored_false() {
        let registry = InMemoryPersonRegistry::new();
        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Police Check Completed?,First Aid Certified?",
            "jane doe,jane@x.com,y?,yes",
        )
        .await;

        assert_eq!(
            report.uncertain,
            vec![UncertainField {
                email: "jane@x.com".to_string(),
                field: "policeCheck".to_string(),
            }]
        );

        let person = registry.find_by_email("jane@x.com").await.unwrap().unwrap();
        assert_eq!(person.police_check, Some(false));
        assert_eq!(person.first_aid, Some(true));
    }

    #[tokio::test]
    async fn test_uncertainty_not_tracked_without_email() {
        let registry = InMemoryPersonRegistry::new();
        let report = run_row(
            &registry,
            "Full Legal Name,Email Address,Police Check Completed?",
            "jane doe,,?",
        )
        .await;

        assert_eq!(report.outcome, RowOutcome::Created);
        assert!(report.uncertain.is_empty());
    }

    #[tokio::test]
    async fn test_composite_fields_assembled() {
        let registry = InMemoryPersonRegistry::new();
        run_row(
            &registry,
            "Full Legal Name,Email Address,Street,City,Province,Postal,Emergency Contact Name,Emergency Contact Phone,Allergies",
            "jane doe,jane@x.com,12 Water St,St. John's,NL,A1C 1A1,mary doe,7091234567,peanuts",
        )
        .await;

        let person = registry.find_by_email("jane@x.com").await.unwrap().unwrap();
        assert_eq!(
            person.address.as_deref(),
            Some("12 Water St, St. John's, NL, A1C 1A1")
        );
        let contact = person.emergency_contact.expect("contact present");
        assert_eq!(contact.name.as_deref(), Some("Mary Doe"));
        assert_eq!(contact.phone.as_deref(), Some("(709) 123-4567"));
        let health = person.health_info.expect("health present");
        assert_eq!(health.allergies.as_deref(), Some("peanuts"));
    }
}
