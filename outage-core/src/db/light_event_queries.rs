use anyhow::Result;
use sqlx::PgPool;

use crate::domain::LightEvent;

/// The `limit` most recent events for an area, oldest first.
pub async fn recent_events(pool: &PgPool, area: &str, limit: i64) -> Result<Vec<LightEvent>> {
    let mut rows = sqlx::query_as::<_, LightEvent>(
        r#"
        SELECT
            ts,
            light
        FROM light_events
        WHERE area = $1
        ORDER BY ts DESC
        LIMIT $2
        "#,
    )
    .bind(area)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}

/// The latest event recorded for an area, if any.
pub async fn latest_event(pool: &PgPool, area: &str) -> Result<Option<LightEvent>> {
    let row = sqlx::query_as::<_, LightEvent>(
        r#"
        SELECT
            ts,
            light
        FROM light_events
        WHERE area = $1
        ORDER BY ts DESC
        LIMIT 1
        "#,
    )
    .bind(area)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
