/// Documentation endpoints
///
/// Site documentation is readable by anyone; creating and editing content
/// are admin-console operations.
///
/// # Endpoints
///
/// - `GET /api/documentation/` - Public listing
/// - `POST /api/documentation/createDocumentation` - Create content (admin)
/// - `PATCH /api/documentation/editDocumentation/:id` - Replace content (admin)
use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use meterdesk_shared::models::documentation::{Documentation, DocumentationInput};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Documentation content payload
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRequest {
    /// Platform overview
    #[validate(length(min = 1, message = "Overview must not be empty"))]
    pub overview: String,

    /// Services section
    #[validate(length(min = 1, message = "Services section must not be empty"))]
    pub services: String,

    /// Pricing policies
    #[validate(length(min = 1, message = "Pricing policies must not be empty"))]
    pub pricing_policies: String,

    /// Privacy policies
    #[validate(length(min = 1, message = "Privacy policies must not be empty"))]
    pub privacy_policies: String,

    /// Terms of service
    #[validate(length(min = 1, message = "Terms of service must not be empty"))]
    pub terms_of_service: String,

    /// FAQs
    #[validate(length(min = 1, message = "FAQs must not be empty"))]
    pub faqs: String,
}

impl From<DocumentationRequest> for DocumentationInput {
    fn from(req: DocumentationRequest) -> Self {
        Self {
            overview: req.overview,
            services: req.services,
            pricing_policies: req.pricing_policies,
            privacy_policies: req.privacy_policies,
            terms_of_service: req.terms_of_service,
            faqs: req.faqs,
        }
    }
}

/// Lists documentation content
pub async fn read_documentation(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Documentation>>>> {
    let docs = Documentation::list(&state.db).await?;

    Ok(ApiResponse::ok("Documentation", docs))
}

/// Creates a documentation record
pub async fn create_documentation(
    State(state): State<AppState>,
    Json(req): Json<DocumentationRequest>,
) -> ApiResult<Json<ApiResponse<Documentation>>> {
    req.validate().map_err(validation_error)?;

    let doc = Documentation::create(&state.db, req.into()).await?;

    Ok(ApiResponse::ok("Documentation created", doc))
}

/// Replaces a documentation record's content
pub async fn edit_documentation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DocumentationRequest>,
) -> ApiResult<Json<ApiResponse<Documentation>>> {
    req.validate().map_err(validation_error)?;

    let doc = Documentation::update(&state.db, id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Documentation not found".to_string()))?;

    Ok(ApiResponse::ok("Documentation updated", doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_request_validation() {
        let valid = DocumentationRequest {
            overview: "Meterdesk overview".to_string(),
            services: "OCR, translation".to_string(),
            pricing_policies: "Per event".to_string(),
            privacy_policies: "Data handling".to_string(),
            terms_of_service: "Terms".to_string(),
            faqs: "Q&A".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_overview = DocumentationRequest {
            overview: String::new(),
            ..valid_request()
        };
        assert!(empty_overview.validate().is_err());
    }

    fn valid_request() -> DocumentationRequest {
        DocumentationRequest {
            overview: "o".to_string(),
            services: "s".to_string(),
            pricing_policies: "p".to_string(),
            privacy_policies: "p".to_string(),
            terms_of_service: "t".to_string(),
            faqs: "f".to_string(),
        }
    }
}
