/// Usage history model
///
/// History rows form an append-only ledger: one row per recorded usage
/// event, carrying the marginal cost of that single event. Entries are
/// never updated; deleting a project or service cascades its rows away.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE history (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     content TEXT,
///     cost BIGINT NOT NULL,
///     service_id UUID NOT NULL REFERENCES services(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::DateRange;

/// A single usage ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct History {
    /// Unique entry ID (UUID v4)
    pub id: Uuid,

    /// Service name at the time of the event
    pub name: String,

    /// Optional payload describing the event
    pub content: Option<String>,

    /// Marginal cost of this event (the service's unit price)
    pub cost: i64,

    /// Service the event was recorded against
    pub service_id: Uuid,

    /// Project the service belongs to
    pub project_id: Uuid,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for appending a ledger entry
#[derive(Debug, Clone)]
pub struct CreateHistory {
    /// Service name snapshot
    pub name: String,

    /// Optional event payload
    pub content: Option<String>,

    /// Unit price charged for this event
    pub cost: i64,

    /// Service ID
    pub service_id: Uuid,

    /// Project ID
    pub project_id: Uuid,
}

impl History {
    /// Appends a ledger entry
    ///
    /// Takes any executor so it can run inside the usage-recording
    /// transaction alongside the counter update.
    pub async fn create<'e, E>(executor: E, data: CreateHistory) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let entry = sqlx::query_as::<_, History>(
            r#"
            INSERT INTO history (name, content, cost, service_id, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, content, cost, service_id, project_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.content)
        .bind(data.cost)
        .bind(data.service_id)
        .bind(data.project_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    /// Lists a project's ledger entries, newest first
    ///
    /// When a range is given, only entries created within it are returned.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let entries = match range {
            Some(range) => {
                sqlx::query_as::<_, History>(
                    r#"
                    SELECT id, name, content, cost, service_id, project_id, created_at
                    FROM history
                    WHERE project_id = $1 AND created_at >= $2 AND created_at < $3
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(project_id)
                .bind(range.start)
                .bind(range.end_exclusive)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, History>(
                    r#"
                    SELECT id, name, content, cost, service_id, project_id, created_at
                    FROM history
                    WHERE project_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(project_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_history_struct() {
        let data = CreateHistory {
            name: "translation".to_string(),
            content: Some("{\"chars\": 120}".to_string()),
            cost: 5,
            service_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
        };

        assert_eq!(data.cost, 5);
        assert!(data.content.is_some());
    }
}
