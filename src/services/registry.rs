//! Person registry abstraction
//!
//! The reconciliation engine only ever reads a record by its natural key and
//! conditionally writes it back; everything else about storage belongs to the
//! registry. Two implementations:
//! - `PgPersonRegistry` for production (PostgreSQL via sqlx)
//! - `InMemoryPersonRegistry` - deterministic, no database; used by engine
//!   tests and local development

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::queries;
use crate::types::{NewPerson, Person, PersonPatch};

/// Registry trait - the engine's only view of person storage
#[async_trait]
pub trait PersonRegistry: Send + Sync {
    /// Look up a person by natural key (case-insensitive email)
    async fn find_by_email(&self, email: &str) -> Result<Option<Person>>;

    /// Persist a full candidate record
    async fn create(&self, person: &NewPerson) -> Result<Person>;

    /// Apply a fill-only partial update to an existing record
    async fn update(&self, id: Uuid, patch: &PersonPatch) -> Result<Person>;

    /// Name of this registry implementation
    fn name(&self) -> &'static str;
}

// ==========================================================================
// PgPersonRegistry
// ==========================================================================

/// Production registry backed by the portal's PostgreSQL database
pub struct PgPersonRegistry {
    pool: PgPool,
}

impl PgPersonRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonRegistry for PgPersonRegistry {
    async fn find_by_email(&self, email: &str) -> Result<Option<Person>> {
        queries::person::find_person_by_email(&self.pool, email).await
    }

    async fn create(&self, person: &NewPerson) -> Result<Person> {
        queries::person::create_person(&self.pool, person).await
    }

    async fn update(&self, id: Uuid, patch: &PersonPatch) -> Result<Person> {
        queries::person::update_person_partial(&self.pool, id, patch).await
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

// ==========================================================================
// InMemoryPersonRegistry
// ==========================================================================

/// In-memory registry - deterministic, no database
pub struct InMemoryPersonRegistry {
    people: Mutex<Vec<Person>>,
}

impl InMemoryPersonRegistry {
    pub fn new() -> Self {
        Self {
            people: Mutex::new(Vec::new()),
        }
    }

    /// Seed an existing record, as if it had been entered through the portal
    pub async fn insert(&self, person: Person) {
        self.people.lock().await.push(person);
    }

    pub async fn len(&self) -> usize {
        self.people.lock().await.len()
    }
}

impl Default for InMemoryPersonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRegistry for InMemoryPersonRegistry {
    async fn find_by_email(&self, email: &str) -> Result<Option<Person>> {
        let people = self.people.lock().await;
        Ok(people
            .iter()
            .find(|p| {
                p.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn create(&self, person: &NewPerson) -> Result<Person> {
        let now = Utc::now();
        let created = Person {
            id: Uuid::new_v4(),
            name: person.name.clone(),
            preferred_name: person.preferred_name.clone(),
            pronouns: person.pronouns.clone(),
            email: person.email.clone(),
            phone: person.phone.clone(),
            birth_date: person.birth_date,
            start_date: person.start_date,
            team_code: person.team_code.clone(),
            address: person.address.clone(),
            emergency_contact: person.emergency_contact.clone().map(Json),
            health_info: person.health_info.clone().map(Json),
            police_check: person.police_check,
            first_aid: person.first_aid,
            drivers_license: person.drivers_license,
            experience_rating: person.experience_rating,
            role: person.role.clone(),
            team_type: person.team_type,
            status: person.status,
            created_at: now,
            updated_at: now,
        };
        self.people.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &PersonPatch) -> Result<Person> {
        let mut people = self.people.lock().await;
        let person = people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow::anyhow!("person {} not found", id))?;

        // Same fill-only semantics as the SQL COALESCE(column, $n) update:
        // existing values always win.
        if person.preferred_name.is_none() {
            person.preferred_name = patch.preferred_name.clone();
        }
        if person.pronouns.is_none() {
            person.pronouns = patch.pronouns.clone();
        }
        if person.phone.is_none() {
            person.phone = patch.phone.clone();
        }
        if person.birth_date.is_none() {
            person.birth_date = patch.birth_date;
        }
        if person.start_date.is_none() {
            person.start_date = patch.start_date;
        }
        if person.team_code.is_none() {
            person.team_code = patch.team_code.clone();
        }
        if person.address.is_none() {
            person.address = patch.address.clone();
        }
        if person.emergency_contact.is_none() {
            person.emergency_contact = patch.emergency_contact.clone().map(Json);
        }
        if person.health_info.is_none() {
            person.health_info = patch.health_info.clone().map(Json);
        }
        if person.police_check.is_none() {
            person.police_check = patch.police_check;
        }
        if person.first_aid.is_none() {
            person.first_aid = patch.first_aid;
        }
        if person.drivers_license.is_none() {
            person.drivers_license = patch.drivers_license;
        }
        if person.experience_rating.is_none() {
            person.experience_rating = patch.experience_rating;
        }
        person.updated_at = Utc::now();

        Ok(person.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create the person registry based on the REGISTRY_BACKEND environment
/// variable ("postgres", default, or "memory" for database-free local runs).
pub fn create_registry(pool: PgPool) -> Box<dyn PersonRegistry> {
    let backend = std::env::var("REGISTRY_BACKEND").unwrap_or_else(|_| "postgres".to_string());

    match backend.as_str() {
        "memory" => {
            tracing::info!("Using InMemoryPersonRegistry");
            Box::new(InMemoryPersonRegistry::new())
        }
        "postgres" => Box::new(PgPersonRegistry::new(pool)),
        _ => {
            tracing::warn!("Unknown REGISTRY_BACKEND '{}', using postgres", backend);
            Box::new(PgPersonRegistry::new(pool))
        }
    }
}
