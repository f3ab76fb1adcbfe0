/// Contact-form endpoints
///
/// The listing is public; creating, editing, and deleting records are
/// admin-console operations.
///
/// # Endpoints
///
/// - `GET /api/contact/` - Public paginated listing
/// - `POST /api/contact/createContact` - Create a record (admin)
/// - `PATCH /api/contact/editContact/:id` - Replace a record (admin)
/// - `DELETE /api/contact/deleteContact/:id` - Delete a record (admin)
use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    response::ApiResponse,
    routes::projects::ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use meterdesk_shared::models::contact::{Contact, ContactInput};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Contact record payload
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    /// Submitter's full name
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    /// Submitter's email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Submitter's phone number
    #[validate(length(min = 1, max = 64, message = "Phone number must be 1-64 characters"))]
    pub phone_number: String,

    /// Submitter's company
    #[validate(length(min = 1, max = 100, message = "Company must be 1-100 characters"))]
    pub company: String,

    /// Free-form message
    #[validate(length(min = 1, message = "Message must not be empty"))]
    pub message: String,
}

impl From<ContactRequest> for ContactInput {
    fn from(req: ContactRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            phone_number: req.phone_number,
            company: req.company,
            message: req.message,
        }
    }
}

/// Lists contact records with pagination and search
pub async fn read_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Contact>>>> {
    let (limit, offset) = query.limit_offset();

    let contacts = Contact::list(&state.db, limit, offset, query.search_text.as_deref()).await?;

    Ok(ApiResponse::ok("Contacts", contacts))
}

/// Creates a contact record
pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ApiResponse<Contact>>> {
    req.validate().map_err(validation_error)?;

    let contact = Contact::create(&state.db, req.into()).await?;

    Ok(ApiResponse::ok("Contact created", contact))
}

/// Replaces a contact record
pub async fn edit_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ApiResponse<Contact>>> {
    req.validate().map_err(validation_error)?;

    let contact = Contact::update(&state.db, id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(ApiResponse::ok("Contact updated", contact))
}

/// Deletes a contact record
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !Contact::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    Ok(ApiResponse::message("Contact deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_request_validation() {
        let valid = ContactRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@corp.example".to_string(),
            phone_number: "+1-555-0100".to_string(),
            company: "Corp".to_string(),
            message: "Interested in the catalog".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad = ContactRequest {
            full_name: "Jane Doe".to_string(),
            email: "not-an-email".to_string(),
            phone_number: "+1-555-0100".to_string(),
            company: "Corp".to_string(),
            message: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("message"));
    }
}
