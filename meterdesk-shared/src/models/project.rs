/// Project model and database operations
///
/// Projects are owned by users and act as the billing boundary: services
/// attach to a project and history accrues per project. Each project also
/// carries its own refresh token, a realm separate from the owner's user
/// tokens, so leaking a project credential never grants account access.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     refresh_token TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (owner_id, name)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name, unique per owner
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Currently persisted project refresh token
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project for an owner
    ///
    /// # Errors
    ///
    /// Returns an error if the owner already has a project with this name
    /// (unique constraint) or the database is unreachable.
    pub async fn create(pool: &PgPool, owner_id: Uuid, name: &str) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, refresh_token, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, scoped to its owner
    ///
    /// Handlers always scope lookups by owner, so one user's project ID is a
    /// plain not-found for everyone else.
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, owner_id, refresh_token, created_at, updated_at
            FROM projects
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by name within an owner's namespace
    pub async fn find_by_name_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, owner_id, refresh_token, created_at, updated_at
            FROM projects
            WHERE owner_id = $1 AND name = $2
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists an owner's projects with pagination and search
    ///
    /// `search` matches the id (as text) and the project name.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = match search {
            Some(text) => {
                let pattern = format!("%{}%", text);
                sqlx::query_as::<_, Project>(
                    r#"
                    SELECT id, name, owner_id, refresh_token, created_at, updated_at
                    FROM projects
                    WHERE owner_id = $1
                      AND (CAST(id AS TEXT) ILIKE $4 OR name ILIKE $4)
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(owner_id)
                .bind(limit)
                .bind(offset)
                .bind(pattern)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Project>(
                    r#"
                    SELECT id, name, owner_id, refresh_token, created_at, updated_at
                    FROM projects
                    WHERE owner_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(owner_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(projects)
    }

    /// Renames a project, scoped to its owner
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET name = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, owner_id, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Persists a new project refresh token (or clears it with None)
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET refresh_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(refresh_token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a project whose stored refresh token matches the presented value
    ///
    /// Scoped to the owner: rotation requires owning the project AND holding
    /// the current token.
    pub async fn find_for_refresh(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, owner_id, refresh_token, created_at, updated_at
            FROM projects
            WHERE id = $1 AND owner_id = $2 AND refresh_token = $3
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(refresh_token)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// Attached services and history entries cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
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
    fn test_refresh_token_not_serialized() {
        let project = Project {
            id: Uuid::new_v4(),
            name: "alpha".to_string(),
            owner_id: Uuid::new_v4(),
            refresh_token: Some("secret-token".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("alpha"));
        assert!(!json.contains("secret-token"));
    }
}
