use crate::models::{DbTimeSlot, NewTimeSlot};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_time_slot(pool: &Pool<Postgres>, slot: &NewTimeSlot) -> Result<DbTimeSlot> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let time_slot = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        INSERT INTO time_slots (id, start_time, end_time, calendar_event_id, is_booked, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        RETURNING id, start_time, end_time, calendar_event_id, is_booked, created_at
        "#,
    )
    .bind(id)
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(&slot.calendar_event_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(time_slot)
}

pub async fn list_time_slots(pool: &Pool<Postgres>) -> Result<Vec<DbTimeSlot>> {
    let time_slots = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        SELECT id, start_time, end_time, calendar_event_id, is_booked, created_at
        FROM time_slots
        ORDER BY start_time ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(time_slots)
}

pub async fn delete_all_time_slots(pool: &Pool<Postgres>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM time_slots
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_time_slots(pool: &Pool<Postgres>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM time_slots")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
