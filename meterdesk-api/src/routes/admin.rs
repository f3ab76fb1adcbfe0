/// Admin console endpoints
///
/// All routes here sit behind the user-realm JWT middleware plus the admin
/// role check. Destructive operations additionally re-verify the acting
/// admin's own password from the request body.
///
/// # Endpoints
///
/// - `GET /api/admin/readUsers` - List ordinary accounts
/// - `GET /api/admin/readProfile/:id` - Full account view
/// - `PATCH /api/admin/editUserEmail/:id` - Change an email, notify both
/// - `PATCH /api/admin/lockUser/:id` / `unLockUser/:id` - Toggle the lock
/// - `POST /api/admin/createUser` - Direct account creation
/// - `POST /api/admin/createServiceByAdmin` - Catalog entry creation
/// - `DELETE /api/admin/deleteUser/:id` - Delete an account
/// - `DELETE /api/admin/deleteService/:id` - Delete a service
/// - `DELETE /api/admin/deleteProject/:id` - Delete a project
use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult, ValidationErrorDetail},
    response::ApiResponse,
    routes::projects::ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use meterdesk_shared::{
    auth::password,
    email::OutboundEmail,
    models::{
        project::Project,
        service::{CreateCatalogService, Service},
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Full account view for the admin console
///
/// Unlike the public profile this includes the role and account flags, but
/// credential columns still never leave the server.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Avatar reference
    pub avatar_url: Option<String>,

    /// Account role
    pub role: UserRole,

    /// Whether the account is locked
    pub is_locked: bool,

    /// Whether the email confirmation was redeemed
    pub is_confirmed: bool,

    /// Account creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl From<User> for AdminUserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role,
            is_locked: user.is_locked,
            is_confirmed: user.is_confirmed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Email change request
#[derive(Debug, Deserialize, Validate)]
pub struct EditUserEmailRequest {
    /// Replacement email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Direct account creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Role for the new account (default: user)
    pub role: Option<UserRole>,
}

/// Catalog entry creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogRequest {
    /// Service name, unique within the catalog
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Short blurb
    pub introduction: Option<String>,

    /// Longer description
    pub information: Option<String>,

    /// Unit price per usage event
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,
}

/// Body for destructive operations
#[derive(Debug, Deserialize)]
pub struct ConfirmPasswordRequest {
    /// The acting admin's own password
    pub password: String,
}

/// Lists ordinary accounts with pagination and search
///
/// Admin accounts are excluded from the listing.
pub async fn read_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AdminUserView>>>> {
    let (limit, offset) = query.limit_offset();

    let users = User::list_members(&state.db, limit, offset, query.search_text.as_deref())
        .await?
        .into_iter()
        .map(AdminUserView::from)
        .collect();

    Ok(ApiResponse::ok("Users", users))
}

/// Shows one account in full
pub async fn read_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("User profile", AdminUserView::from(user)))
}

/// Changes an account's email address
///
/// The new address must be unused. Both the old and the new address are
/// notified of the change.
pub async fn edit_user_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditUserEmailRequest>,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    req.validate().map_err(validation_error)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let before = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let old_email = before.email;

    let user = User::update_email(&state.db, id, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    for recipient in [&old_email, &user.email] {
        state
            .mailer
            .send(OutboundEmail {
                to: recipient.clone(),
                subject: "Your Meterdesk email address was changed".to_string(),
                html: format!(
                    "<p>The email on this account was changed from {} to {}. \
                     Contact support if this was not you.</p>",
                    old_email, user.email
                ),
            })
            .await?;
    }

    tracing::info!(user_id = %user.id, "User email changed by admin");

    Ok(ApiResponse::ok("Email updated", AdminUserView::from(user)))
}

/// Locks an account
///
/// Locking is reversible and preserves all account data.
pub async fn lock_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    set_user_locked(&state, id, true).await
}

/// Unlocks an account
pub async fn un_lock_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    set_user_locked(&state, id, false).await
}

async fn set_user_locked(
    state: &AppState,
    id: Uuid,
    locked: bool,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    let user = User::set_locked(&state.db, id, locked)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(
        if locked { "User locked" } else { "User unlocked" },
        AdminUserView::from(user),
    ))
}

/// Creates an account directly
///
/// Admin-created accounts skip the email confirmation round trip.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<ApiResponse<AdminUserView>>> {
    req.validate().map_err(validation_error)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or(UserRole::User),
        },
    )
    .await?;

    let user = User::confirm(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::UnprocessableEntity("User was not created".to_string()))?;

    tracing::info!(user_id = %user.id, "User created by admin");

    Ok(ApiResponse::ok("User created", AdminUserView::from(user)))
}

/// Creates a catalog service
pub async fn create_service_by_admin(
    State(state): State<AppState>,
    Json(req): Json<CreateCatalogRequest>,
) -> ApiResult<Json<ApiResponse<Service>>> {
    req.validate().map_err(validation_error)?;

    if Service::find_catalog_by_name(&state.db, &req.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "{} already exists, please enter another name",
            req.name
        )));
    }

    let service = Service::create_catalog(
        &state.db,
        CreateCatalogService {
            name: req.name,
            introduction: req.introduction,
            information: req.information,
            price: req.price,
        },
    )
    .await?;

    Ok(ApiResponse::ok("Service created", service))
}

/// Deletes an account (cascades projects, services, history)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    verify_admin_password(&state, current, &req.password).await?;

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, admin_id = %current.id, "User deleted");

    Ok(ApiResponse::message("User deleted"))
}

/// Deletes a service (catalog template or attached instance)
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    verify_admin_password(&state, current, &req.password).await?;

    if !Service::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }

    tracing::info!(service_id = %id, admin_id = %current.id, "Service deleted");

    Ok(ApiResponse::message("Service deleted"))
}

/// Deletes a project (cascades services and history)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    verify_admin_password(&state, current, &req.password).await?;

    if !Project::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    tracing::info!(project_id = %id, admin_id = %current.id, "Project deleted");

    Ok(ApiResponse::message("Project deleted"))
}

/// Re-verifies the acting admin's own password before a deletion
async fn verify_admin_password(
    state: &AppState,
    current: CurrentUser,
    supplied: &str,
) -> ApiResult<()> {
    let admin = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if !password::verify_password(supplied, &admin.password_hash)? {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            name: "Ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "MyP@ssw0rd!".to_string(),
            role: Some(UserRole::Admin),
        };
        assert!(valid.validate().is_ok());

        let bad = CreateUserRequest {
            name: String::new(),
            email: "ops@example.com".to_string(),
            password: "MyP@ssw0rd!".to_string(),
            role: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_catalog_request_rejects_negative_price() {
        let req = CreateCatalogRequest {
            name: "ocr".to_string(),
            introduction: None,
            information: None,
            price: -1,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_admin_view_includes_flags_but_no_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            avatar_url: None,
            role: UserRole::User,
            is_locked: true,
            is_confirmed: false,
            refresh_token: Some("tok".to_string()),
            password_reset_digest: None,
            password_reset_expires: None,
            password_changed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&AdminUserView::from(user)).unwrap();
        assert!(json.contains("is_locked"));
        assert!(json.contains("is_confirmed"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("refresh_token"));
    }
}
