use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create companies table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            website VARCHAR(512) NULL,
            email VARCHAR(255) NULL,
            phone VARCHAR(64) NULL,
            address TEXT NULL,
            contact_person VARCHAR(255) NULL,
            industry VARCHAR(128) NULL,
            size VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create email_templates table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS email_templates (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            category VARCHAR(128) NOT NULL,
            subject VARCHAR(512) NOT NULL,
            html_content TEXT NOT NULL,
            text_content TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create campaigns table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            description TEXT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'DRAFT',
            template_id UUID NOT NULL REFERENCES email_templates(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_campaign_status CHECK (
                status IN ('DRAFT', 'ACTIVE', 'PAUSED', 'COMPLETED', 'CANCELLED')
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create campaign_companies join table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaign_companies (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            campaign_id UUID NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
            company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
            sent BOOLEAN NOT NULL DEFAULT FALSE,
            sent_at TIMESTAMP WITH TIME ZONE NULL,
            message_id VARCHAR(255) NULL,
            error TEXT NULL,
            delivered BOOLEAN NOT NULL DEFAULT FALSE,
            opened BOOLEAN NOT NULL DEFAULT FALSE,
            clicked BOOLEAN NOT NULL DEFAULT FALSE,
            bounced BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT unique_campaign_company UNIQUE (campaign_id, company_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create time_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            calendar_event_id VARCHAR(255) NULL,
            is_booked BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create oauth_tokens table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_tokens (
            provider VARCHAR(64) PRIMARY KEY,
            access_token TEXT NOT NULL,
            refresh_token TEXT NULL,
            expires_at TIMESTAMP WITH TIME ZONE NULL,
            scopes TEXT[] NOT NULL DEFAULT '{}',
            token_type VARCHAR(32) NOT NULL DEFAULT 'Bearer',
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status)",
        "CREATE INDEX IF NOT EXISTS idx_campaign_companies_campaign_id ON campaign_companies(campaign_id)",
        "CREATE INDEX IF NOT EXISTS idx_campaign_companies_company_id ON campaign_companies(company_id)",
        "CREATE INDEX IF NOT EXISTS idx_campaign_companies_message_id ON campaign_companies(message_id)",
        "CREATE INDEX IF NOT EXISTS idx_time_slots_start_time ON time_slots(start_time)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
