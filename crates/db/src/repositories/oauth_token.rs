use crate::models::DbOAuthToken;
use bizagent_core::models::oauth::OAuthToken;
use eyre::Result;
use sqlx::{Pool, Postgres};

/// Upserts the credential set for `token.provider`; there is one row per provider.
pub async fn save_token(pool: &Pool<Postgres>, token: &OAuthToken) -> Result<DbOAuthToken> {
    tracing::debug!(
        "Saving OAuth token: provider={}, has_refresh_token={}, expires_at={:?}",
        token.provider,
        token.refresh_token.is_some(),
        token.expires_at
    );

    let row = sqlx::query_as::<_, DbOAuthToken>(
        r#"
        INSERT INTO oauth_tokens (provider, access_token, refresh_token, expires_at, scopes, token_type, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (provider) DO UPDATE
        SET access_token = EXCLUDED.access_token,
            refresh_token = EXCLUDED.refresh_token,
            expires_at = EXCLUDED.expires_at,
            scopes = EXCLUDED.scopes,
            token_type = EXCLUDED.token_type,
            updated_at = EXCLUDED.updated_at
        RETURNING provider, access_token, refresh_token, expires_at, scopes, token_type, updated_at
        "#,
    )
    .bind(&token.provider)
    .bind(&token.access_token)
    .bind(&token.refresh_token)
    .bind(token.expires_at)
    .bind(&token.scopes)
    .bind(&token.token_type)
    .bind(token.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn load_token(pool: &Pool<Postgres>, provider: &str) -> Result<Option<DbOAuthToken>> {
    let row = sqlx::query_as::<_, DbOAuthToken>(
        r#"
        SELECT provider, access_token, refresh_token, expires_at, scopes, token_type, updated_at
        FROM oauth_tokens
        WHERE provider = $1
        "#,
    )
    .bind(provider)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
