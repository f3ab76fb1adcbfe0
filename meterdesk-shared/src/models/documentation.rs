/// Documentation model
///
/// Site documentation content, readable by anyone and writable only from
/// the admin console. In practice a single row exists, but the table is
/// keyed by UUID so revisions can coexist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documentation (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     overview TEXT NOT NULL,
///     services TEXT NOT NULL,
///     pricing_policies TEXT NOT NULL,
///     privacy_policies TEXT NOT NULL,
///     terms_of_service TEXT NOT NULL,
///     faqs TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A documentation record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Documentation {
    /// Unique record ID (UUID v4)
    pub id: Uuid,

    /// Platform overview section
    pub overview: String,

    /// Services section
    pub services: String,

    /// Pricing policies section
    pub pricing_policies: String,

    /// Privacy policies section
    pub privacy_policies: String,

    /// Terms of service section
    pub terms_of_service: String,

    /// FAQ section
    pub faqs: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing documentation content
#[derive(Debug, Clone)]
pub struct DocumentationInput {
    /// Platform overview
    pub overview: String,

    /// Services section
    pub services: String,

    /// Pricing policies
    pub pricing_policies: String,

    /// Privacy policies
    pub privacy_policies: String,

    /// Terms of service
    pub terms_of_service: String,

    /// FAQs
    pub faqs: String,
}

const DOC_COLUMNS: &str = "id, overview, services, pricing_policies, privacy_policies, \
     terms_of_service, faqs, created_at, updated_at";

impl Documentation {
    /// Creates a documentation record
    pub async fn create(pool: &PgPool, data: DocumentationInput) -> Result<Self, sqlx::Error> {
        let doc = sqlx::query_as::<_, Documentation>(&format!(
            r#"
            INSERT INTO documentation
                (overview, services, pricing_policies, privacy_policies, terms_of_service, faqs)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DOC_COLUMNS}
            "#,
        ))
        .bind(data.overview)
        .bind(data.services)
        .bind(data.pricing_policies)
        .bind(data.privacy_policies)
        .bind(data.terms_of_service)
        .bind(data.faqs)
        .fetch_one(pool)
        .await?;

        Ok(doc)
    }

    /// Lists all documentation records, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let docs = sqlx::query_as::<_, Documentation>(&format!(
            "SELECT {DOC_COLUMNS} FROM documentation ORDER BY created_at",
        ))
        .fetch_all(pool)
        .await?;

        Ok(docs)
    }

    /// Replaces a documentation record's content
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: DocumentationInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let doc = sqlx::query_as::<_, Documentation>(&format!(
            r#"
            UPDATE documentation
            SET overview = $2, services = $3, pricing_policies = $4,
                privacy_policies = $5, terms_of_service = $6, faqs = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DOC_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.overview)
        .bind(data.services)
        .bind(data.pricing_policies)
        .bind(data.privacy_policies)
        .bind(data.terms_of_service)
        .bind(data.faqs)
        .fetch_optional(pool)
        .await?;

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_input_struct() {
        let input = DocumentationInput {
            overview: "Meterdesk meters usage per project".to_string(),
            services: "OCR, translation".to_string(),
            pricing_policies: "Pay per event".to_string(),
            privacy_policies: "We keep your data".to_string(),
            terms_of_service: "Be nice".to_string(),
            faqs: "Q: ... A: ...".to_string(),
        };

        assert!(!input.overview.is_empty());
    }
}
