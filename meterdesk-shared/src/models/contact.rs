/// Contact model
///
/// Records submitted through the public contact form. Reading, editing,
/// and deleting are admin-console operations.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     full_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone_number VARCHAR(64) NOT NULL,
///     company VARCHAR(255) NOT NULL,
///     message TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A contact-form submission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    /// Unique record ID (UUID v4)
    pub id: Uuid,

    /// Submitter's full name
    pub full_name: String,

    /// Submitter's email address
    pub email: String,

    /// Submitter's phone number
    pub phone_number: String,

    /// Submitter's company
    pub company: String,

    /// Free-form message
    pub message: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a contact record
#[derive(Debug, Clone)]
pub struct ContactInput {
    /// Full name
    pub full_name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone_number: String,

    /// Company
    pub company: String,

    /// Message body
    pub message: String,
}

impl Contact {
    /// Creates a contact record
    pub async fn create(pool: &PgPool, data: ContactInput) -> Result<Self, sqlx::Error> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (full_name, email, phone_number, company, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, full_name, email, phone_number, company, message, created_at, updated_at
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.phone_number)
        .bind(data.company)
        .bind(data.message)
        .fetch_one(pool)
        .await?;

        Ok(contact)
    }

    /// Lists contact records with pagination and search
    ///
    /// `search` matches the full name and the message body.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let contacts = match search {
            Some(text) => {
                let pattern = format!("%{}%", text);
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT id, full_name, email, phone_number, company, message, created_at, updated_at
                    FROM contacts
                    WHERE full_name ILIKE $3 OR message ILIKE $3
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .bind(pattern)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT id, full_name, email, phone_number, company, message, created_at, updated_at
                    FROM contacts
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(contacts)
    }

    /// Replaces a contact record's fields
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: ContactInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET full_name = $2, email = $3, phone_number = $4, company = $5,
                message = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, full_name, email, phone_number, company, message, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.phone_number)
        .bind(data.company)
        .bind(data.message)
        .fetch_optional(pool)
        .await?;

        Ok(contact)
    }

    /// Deletes a contact record
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
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
    fn test_contact_input_struct() {
        let input = ContactInput {
            full_name: "Jane Doe".to_string(),
            email: "jane@corp.example".to_string(),
            phone_number: "+1-555-0100".to_string(),
            company: "Corp".to_string(),
            message: "Interested in the OCR service".to_string(),
        };

        assert_eq!(input.company, "Corp");
    }
}
