use crate::models::DbCampaignCompany;
use bizagent_core::models::campaign::DeliveryEvent;
use chrono::Utc;
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const RECIPIENT_COLUMNS: &str = "id, campaign_id, company_id, sent, sent_at, message_id, error, \
                                 delivered, opened, clicked, bounced, created_at";

pub async fn add_company_to_campaign(
    pool: &Pool<Postgres>,
    campaign_id: Uuid,
    company_id: Uuid,
) -> Result<DbCampaignCompany> {
    let row = sqlx::query_as::<_, DbCampaignCompany>(&format!(
        r#"
        INSERT INTO campaign_companies (id, campaign_id, company_id, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        RECIPIENT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(campaign_id)
    .bind(company_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_campaign_companies(
    pool: &Pool<Postgres>,
    campaign_id: Uuid,
) -> Result<Vec<DbCampaignCompany>> {
    let rows = sqlx::query_as::<_, DbCampaignCompany>(&format!(
        r#"
        SELECT {}
        FROM campaign_companies
        WHERE campaign_id = $1
        ORDER BY created_at ASC
        "#,
        RECIPIENT_COLUMNS
    ))
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn mark_sent(
    pool: &Pool<Postgres>,
    id: Uuid,
    message_id: Option<&str>,
) -> Result<DbCampaignCompany> {
    let row = sqlx::query_as::<_, DbCampaignCompany>(&format!(
        r#"
        UPDATE campaign_companies
        SET sent = TRUE, sent_at = $2, message_id = $3, error = NULL
        WHERE id = $1
        RETURNING {}
        "#,
        RECIPIENT_COLUMNS
    ))
    .bind(id)
    .bind(Utc::now())
    .bind(message_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Campaign recipient not found"))?;

    Ok(row)
}

pub async fn mark_failed(pool: &Pool<Postgres>, id: Uuid, error: &str) -> Result<DbCampaignCompany> {
    let row = sqlx::query_as::<_, DbCampaignCompany>(&format!(
        r#"
        UPDATE campaign_companies
        SET error = $2
        WHERE id = $1
        RETURNING {}
        "#,
        RECIPIENT_COLUMNS
    ))
    .bind(id)
    .bind(error)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Campaign recipient not found"))?;

    Ok(row)
}

/// Flags the recipient that was sent `message_id`. Returns `None` for unknown ids.
pub async fn record_event(
    pool: &Pool<Postgres>,
    message_id: &str,
    event: DeliveryEvent,
) -> Result<Option<DbCampaignCompany>> {
    let column = match event {
        DeliveryEvent::Delivered => "delivered",
        DeliveryEvent::Opened => "opened",
        DeliveryEvent::Clicked => "clicked",
        DeliveryEvent::Bounced => "bounced",
    };

    let row = sqlx::query_as::<_, DbCampaignCompany>(&format!(
        r#"
        UPDATE campaign_companies
        SET {} = TRUE
        WHERE message_id = $1
        RETURNING {}
        "#,
        column, RECIPIENT_COLUMNS
    ))
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
