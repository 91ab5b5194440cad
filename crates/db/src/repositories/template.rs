use crate::models::DbEmailTemplate;
use bizagent_core::models::template::NewEmailTemplate;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_template(
    pool: &Pool<Postgres>,
    template: &NewEmailTemplate,
) -> Result<DbEmailTemplate> {
    let id = Uuid::new_v4();

    let row = sqlx::query_as::<_, DbEmailTemplate>(
        r#"
        INSERT INTO email_templates (id, name, category, subject, html_content, text_content, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, category, subject, html_content, text_content, created_at
        "#,
    )
    .bind(id)
    .bind(&template.name)
    .bind(&template.category)
    .bind(&template.subject)
    .bind(&template.html_content)
    .bind(&template.text_content)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_template_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbEmailTemplate>> {
    let row = sqlx::query_as::<_, DbEmailTemplate>(
        r#"
        SELECT id, name, category, subject, html_content, text_content, created_at
        FROM email_templates
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_templates(pool: &Pool<Postgres>) -> Result<Vec<DbEmailTemplate>> {
    let rows = sqlx::query_as::<_, DbEmailTemplate>(
        r#"
        SELECT id, name, category, subject, html_content, text_content, created_at
        FROM email_templates
        ORDER BY category ASC, name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
