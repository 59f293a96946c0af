//! Person registry queries

use anyhow::Result;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{NewPerson, Person, PersonPatch};

/// Find a person by email (case-insensitive)
pub async fn find_person_by_email(pool: &PgPool, email: &str) -> Result<Option<Person>> {
    let person = sqlx::query_as::<_, Person>(
        r#"SELECT * FROM people WHERE LOWER(email) = LOWER($1)"#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(person)
}

/// Create a new person from an import
pub async fn create_person(pool: &PgPool, new: &NewPerson) -> Result<Person> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let person = sqlx::query_as::<_, Person>(
        r#"
        INSERT INTO people (id, name, preferred_name, pronouns, email, phone,
            birth_date, start_date, team_code, address,
            emergency_contact, health_info,
            police_check, first_aid, drivers_license, experience_rating,
            role, team_type, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $20)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&new.name)
    .bind(&new.preferred_name)
    .bind(&new.pronouns)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.birth_date)
    .bind(new.start_date)
    .bind(&new.team_code)
    .bind(&new.address)
    .bind(new.emergency_contact.as_ref().map(Json))
    .bind(new.health_info.as_ref().map(Json))
    .bind(new.police_check)
    .bind(new.first_aid)
    .bind(new.drivers_license)
    .bind(new.experience_rating)
    .bind(&new.role)
    .bind(new.team_type)
    .bind(new.status)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(person)
}

/// Fill the gaps on an existing person. COALESCE keeps every populated
/// column; only currently-null columns take the imported value.
pub async fn update_person_partial(
    pool: &PgPool,
    id: Uuid,
    patch: &PersonPatch,
) -> Result<Person> {
    let person = sqlx::query_as::<_, Person>(
        r#"
        UPDATE people
        SET preferred_name = COALESCE(preferred_name, $2),
            pronouns = COALESCE(pronouns, $3),
            phone = COALESCE(phone, $4),
            birth_date = COALESCE(birth_date, $5),
            start_date = COALESCE(start_date, $6),
            team_code = COALESCE(team_code, $7),
            address = COALESCE(address, $8),
            emergency_contact = COALESCE(emergency_contact, $9),
            health_info = COALESCE(health_info, $10),
            police_check = COALESCE(police_check, $11),
            first_aid = COALESCE(first_aid, $12),
            drivers_license = COALESCE(drivers_license, $13),
            experience_rating = COALESCE(experience_rating, $14),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.preferred_name)
    .bind(&patch.pronouns)
    .bind(&patch.phone)
    .bind(patch.birth_date)
    .bind(patch.start_date)
    .bind(&patch.team_code)
    .bind(&patch.address)
    .bind(patch.emergency_contact.as_ref().map(Json))
    .bind(patch.health_info.as_ref().map(Json))
    .bind(patch.police_check)
    .bind(patch.first_aid)
    .bind(patch.drivers_license)
    .bind(patch.experience_rating)
    .fetch_one(pool)
    .await?;

    Ok(person)
}
