/// Service model and database operations
///
/// One table holds two kinds of row, distinguished by `project_id`:
///
/// - catalog templates (`project_id IS NULL`), created by admins, carrying
///   the name, description, and unit price offered to customers
/// - project instances (`project_id` set), created when a user attaches a
///   catalog service to a project; these accumulate the usage counters
///
/// The counters are denormalized running totals: `sum_data` counts events,
/// `sum_cost` is `sum_data * price`, and `unpaid` tracks the outstanding
/// balance. [`Service::record_usage`] advances the usage counters atomically
/// together with the ledger append. The active flag is a display/billing
/// state toggled separately and does not gate usage recording.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE services (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     introduction TEXT,
///     information TEXT,
///     price BIGINT NOT NULL,
///     sum_data BIGINT NOT NULL DEFAULT 0,
///     sum_cost BIGINT NOT NULL DEFAULT 0,
///     unpaid BIGINT NOT NULL DEFAULT 0,
///     is_active BOOLEAN NOT NULL DEFAULT FALSE,
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::history::{CreateHistory, History};
use super::DateRange;

/// Service model, covering both catalog templates and project instances
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    /// Unique service ID (UUID v4)
    pub id: Uuid,

    /// Service name
    pub name: String,

    /// Short marketing blurb
    pub introduction: Option<String>,

    /// Longer usage/technical description
    pub information: Option<String>,

    /// Unit price charged per usage event
    pub price: i64,

    /// Number of usage events recorded
    pub sum_data: i64,

    /// Running total cost (`sum_data * price`)
    pub sum_cost: i64,

    /// Outstanding unpaid balance
    pub unpaid: i64,

    /// Whether the instance is switched on (toggled by the owner)
    pub is_active: bool,

    /// Owning project; None for catalog templates
    pub project_id: Option<Uuid>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a catalog service
#[derive(Debug, Clone)]
pub struct CreateCatalogService {
    /// Service name, unique within the catalog
    pub name: String,

    /// Short blurb
    pub introduction: Option<String>,

    /// Longer description
    pub information: Option<String>,

    /// Unit price
    pub price: i64,
}

const SERVICE_COLUMNS: &str = "id, name, introduction, information, price, sum_data, sum_cost, \
     unpaid, is_active, project_id, created_at, updated_at";

impl Service {
    /// Creates a catalog template (no project)
    pub async fn create_catalog(
        pool: &PgPool,
        data: CreateCatalogService,
    ) -> Result<Self, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (name, introduction, information, price)
            VALUES ($1, $2, $3, $4)
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.introduction)
        .bind(data.information)
        .bind(data.price)
        .fetch_one(pool)
        .await?;

        Ok(service)
    }

    /// Finds a catalog template by name
    pub async fn find_catalog_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE project_id IS NULL AND name = $1",
        ))
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Lists the catalog (templates only), oldest first
    pub async fn list_catalog(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE project_id IS NULL ORDER BY created_at",
        ))
        .fetch_all(pool)
        .await?;

        Ok(services)
    }

    /// Finds a service by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Finds a service instance within a specific project
    pub async fn find_in_project(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 AND project_id = $2",
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Finds a service instance in a project by the catalog name
    ///
    /// Used to reject attaching the same catalog service twice.
    pub async fn find_in_project_by_name(
        pool: &PgPool,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE project_id = $1 AND name = $2",
        ))
        .bind(project_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Attaches a catalog template to a project
    ///
    /// Copies the template's name, descriptions, and price into a fresh
    /// project-scoped row with zeroed counters. Later catalog price changes
    /// do not affect already-attached instances.
    pub async fn attach(
        pool: &PgPool,
        template: &Service,
        project_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (name, introduction, information, price, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(&template.name)
        .bind(&template.introduction)
        .bind(&template.information)
        .bind(template.price)
        .bind(project_id)
        .fetch_one(pool)
        .await?;

        Ok(service)
    }

    /// Records one usage event against a project service
    ///
    /// Runs in a single transaction: the counters advance with an atomic
    /// in-database increment and the ledger entry is appended with the
    /// marginal cost (the unit price), so concurrent events never lose an
    /// increment and the ledger never diverges from the totals. The active
    /// flag does not gate recording.
    ///
    /// Returns None if the service does not exist in this project.
    pub async fn record_usage(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
        content: Option<String>,
    ) -> Result<Option<(Self, History)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET sum_data = sum_data + 1,
                sum_cost = (sum_data + 1) * price,
                updated_at = NOW()
            WHERE id = $1 AND project_id = $2
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(service) = service else {
            tx.rollback().await?;
            return Ok(None);
        };

        let entry = History::create(
            &mut *tx,
            CreateHistory {
                name: service.name.clone(),
                content,
                cost: service.price,
                service_id: service.id,
                project_id,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(Some((service, entry)))
    }

    /// Activates or deactivates a project service instance
    pub async fn set_active(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
        active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services SET is_active = $3, updated_at = NOW()
            WHERE id = $1 AND project_id = $2
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(project_id)
        .bind(active)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Lists a project's service instances, optionally filtered by creation date
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let services = match range {
            Some(range) => {
                sqlx::query_as::<_, Service>(&format!(
                    r#"
                    SELECT {SERVICE_COLUMNS}
                    FROM services
                    WHERE project_id = $1 AND created_at >= $2 AND created_at < $3
                    ORDER BY created_at
                    "#,
                ))
                .bind(project_id)
                .bind(range.start)
                .bind(range.end_exclusive)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Service>(&format!(
                    r#"
                    SELECT {SERVICE_COLUMNS}
                    FROM services
                    WHERE project_id = $1
                    ORDER BY created_at
                    "#,
                ))
                .bind(project_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(services)
    }

    /// Deletes a service by ID
    ///
    /// Works for both catalog templates and project instances; ledger
    /// entries of an instance cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_catalog_service_struct() {
        let data = CreateCatalogService {
            name: "ocr".to_string(),
            introduction: Some("Optical character recognition".to_string()),
            information: None,
            price: 3,
        };

        assert_eq!(data.name, "ocr");
        assert_eq!(data.price, 3);
    }

    // record_usage and the totals invariant are covered by the database-backed
    // tests in tests/usage_ledger_tests.rs.
}
