/// User model and database operations
///
/// Users own projects (cascade on delete) and authenticate with an email +
/// Argon2id password hash. Accounts start unconfirmed and cannot log in
/// until the emailed confirmation token is redeemed. Admins can lock and
/// unlock accounts; locking flips a flag and never touches data.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     role user_role NOT NULL DEFAULT 'user',
///     is_locked BOOLEAN NOT NULL DEFAULT FALSE,
///     is_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     refresh_token TEXT,
///     password_reset_digest VARCHAR(64),
///     password_reset_expires TIMESTAMPTZ,
///     password_changed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    /// Ordinary account
    User,

    /// Privileged account with access to the admin console
    Admin,

    /// Unauthenticated/public principal
    Anonymous,
}

/// User model representing an account
///
/// `password_hash`, the token columns, and the flags never leave the server;
/// handlers return [`UserProfile`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional avatar reference (opaque id from the upload service)
    pub avatar_url: Option<String>,

    /// Account role
    pub role: UserRole,

    /// Whether an admin has locked the account
    pub is_locked: bool,

    /// Whether the email confirmation token has been redeemed
    pub is_confirmed: bool,

    /// Currently persisted refresh token, if logged in
    pub refresh_token: Option<String>,

    /// SHA-256 digest of the outstanding password-reset token
    pub password_reset_digest: Option<String>,

    /// Expiry of the outstanding reset token
    pub password_reset_expires: Option<DateTime<Utc>>,

    /// When the password was last changed through the reset flow
    pub password_changed_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Role for the new account
    pub role: UserRole,
}

/// Public view of a user, safe to serialize into responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Avatar reference
    pub avatar_url: Option<String>,

    /// Whether the account is locked
    pub is_locked: bool,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            is_locked: user.is_locked,
            created_at: user.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, avatar_url, role, is_locked, \
     is_confirmed, refresh_token, password_reset_digest, password_reset_expires, \
     password_changed_at, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// The account starts unconfirmed and unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user whose stored refresh token matches the presented value
    ///
    /// Used on refresh: the cookie token must verify cryptographically AND
    /// match this column for the rotation to proceed.
    pub async fn find_by_id_and_refresh_token(
        pool: &PgPool,
        id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND refresh_token = $2",
        ))
        .bind(id)
        .bind(refresh_token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by an unexpired password-reset digest
    ///
    /// The `expires > now` guard makes an expired token look exactly like an
    /// unknown one.
    pub async fn find_by_reset_digest(
        pool: &PgPool,
        digest: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE password_reset_digest = $1 AND password_reset_expires > NOW()
            "#,
        ))
        .bind(digest)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Persists a new refresh token (or clears it with None)
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(refresh_token)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears any stored refresh token matching the presented value (logout)
    pub async fn clear_refresh_token_by_value(
        pool: &PgPool,
        refresh_token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = NULL, updated_at = NOW() WHERE refresh_token = $1",
        )
        .bind(refresh_token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the account as confirmed (one-way)
    pub async fn confirm(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_confirmed = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Sets or clears the lock flag
    ///
    /// Locking is reversible and preserves all account data.
    pub async fn set_locked(
        pool: &PgPool,
        id: Uuid,
        locked: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_locked = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(locked)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the email address
    pub async fn update_email(
        pool: &PgPool,
        id: Uuid,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET email = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates the display name and/or avatar reference
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(avatar_url)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the password hash (change-password flow)
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a password-reset digest and its expiry
    pub async fn set_reset_digest(
        pool: &PgPool,
        id: Uuid,
        digest: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_reset_digest = $2, password_reset_expires = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(digest)
        .bind(expires)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Completes the reset flow: new hash, digest cleared, change timestamped
    pub async fn reset_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $2,
                password_reset_digest = NULL,
                password_reset_expires = NULL,
                password_changed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Owned projects, their services, and their history cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists ordinary (role = user) accounts with pagination and search
    ///
    /// `search` matches against the id (as text) and the display name.
    pub async fn list_members(
        pool: &PgPool,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = match search {
            Some(text) => {
                let pattern = format!("%{}%", text);
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    WHERE role = 'user'
                      AND (CAST(id AS TEXT) ILIKE $3 OR name ILIKE $3)
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                ))
                .bind(limit)
                .bind(offset)
                .bind(pattern)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    WHERE role = 'user'
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: UserRole::User,
        };

        assert_eq!(create_user.email, "test@example.com");
        assert_eq!(create_user.role, UserRole::User);
    }

    #[test]
    fn test_profile_hides_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            avatar_url: None,
            role: UserRole::User,
            is_locked: false,
            is_confirmed: true,
            refresh_token: Some("token".to_string()),
            password_reset_digest: None,
            password_reset_expires: None,
            password_changed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let profile = UserProfile::from(user.clone());
        let json = serde_json::to_string(&profile).unwrap();

        assert!(json.contains("test@example.com"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("refresh_token"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&UserRole::Anonymous).unwrap(),
            "\"anonymous\""
        );
    }

    // Database-backed tests require a running Postgres and live with the
    // API crate's handler tests.
}
