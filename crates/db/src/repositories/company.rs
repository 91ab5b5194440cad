use crate::models::DbCompany;
use bizagent_core::models::company::{ContactUpdate, NewCompany};
use chrono::Utc;
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const COMPANY_COLUMNS: &str = "id, name, website, email, phone, address, contact_person, \
                               industry, size, created_at, updated_at";

pub async fn create_company(pool: &Pool<Postgres>, company: &NewCompany) -> Result<DbCompany> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating company: id={}, name={}", id, company.name);

    let row = sqlx::query_as::<_, DbCompany>(&format!(
        r#"
        INSERT INTO companies (id, name, website, email, phone, address, contact_person,
                               industry, size, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(id)
    .bind(&company.name)
    .bind(&company.website)
    .bind(&company.email)
    .bind(&company.phone)
    .bind(&company.address)
    .bind(&company.contact_person)
    .bind(&company.industry)
    .bind(&company.size)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_company_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbCompany>> {
    let row = sqlx::query_as::<_, DbCompany>(&format!(
        "SELECT {} FROM companies WHERE id = $1",
        COMPANY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_companies(pool: &Pool<Postgres>) -> Result<Vec<DbCompany>> {
    let rows = sqlx::query_as::<_, DbCompany>(&format!(
        "SELECT {} FROM companies ORDER BY name ASC",
        COMPANY_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Overwrites only the contact fields that are present in `contact`.
pub async fn update_contact_info(
    pool: &Pool<Postgres>,
    id: Uuid,
    contact: &ContactUpdate,
) -> Result<DbCompany> {
    let row = sqlx::query_as::<_, DbCompany>(&format!(
        r#"
        UPDATE companies
        SET email = COALESCE($2, email),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address),
            contact_person = COALESCE($5, contact_person),
            updated_at = $6
        WHERE id = $1
        RETURNING {}
        "#,
        COMPANY_COLUMNS
    ))
    .bind(id)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.address)
    .bind(&contact.contact_person)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Company not found"))?;

    Ok(row)
}
