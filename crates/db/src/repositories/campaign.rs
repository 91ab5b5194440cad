use crate::models::DbCampaign;
use bizagent_core::models::campaign::{CampaignStatus, NewCampaign};
use chrono::Utc;
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_campaign(pool: &Pool<Postgres>, campaign: &NewCampaign) -> Result<DbCampaign> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating campaign: id={}, name={}", id, campaign.name);

    let row = sqlx::query_as::<_, DbCampaign>(
        r#"
        INSERT INTO campaigns (id, name, description, status, template_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, name, description, status, template_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&campaign.name)
    .bind(&campaign.description)
    .bind(CampaignStatus::Draft.as_str())
    .bind(campaign.template_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_campaigns(
    pool: &Pool<Postgres>,
    status: Option<CampaignStatus>,
) -> Result<Vec<DbCampaign>> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, DbCampaign>(
                r#"
                SELECT id, name, description, status, template_id, created_at, updated_at
                FROM campaigns
                WHERE status = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbCampaign>(
                r#"
                SELECT id, name, description, status, template_id, created_at, updated_at
                FROM campaigns
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

pub async fn get_campaign_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbCampaign>> {
    let row = sqlx::query_as::<_, DbCampaign>(
        r#"
        SELECT id, name, description, status, template_id, created_at, updated_at
        FROM campaigns
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn update_campaign_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: CampaignStatus,
) -> Result<DbCampaign> {
    tracing::debug!("Updating campaign status: id={}, status={}", id, status);

    let row = sqlx::query_as::<_, DbCampaign>(
        r#"
        UPDATE campaigns
        SET status = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, description, status, template_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Campaign not found"))?;

    Ok(row)
}
