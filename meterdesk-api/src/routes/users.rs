/// Account endpoints
///
/// Registration with email confirmation, login/logout, refresh-token
/// rotation, profile updates, and the password change/reset flows.
///
/// # Endpoints
///
/// - `POST /api/user/register` - Create an unconfirmed account
/// - `GET /api/user/confirmRegisterUser/:token` - Redeem the emailed token
/// - `POST /api/user/login` - Login and receive tokens
/// - `GET /api/user/refreshToken` - Rotate the cookie-borne refresh token
/// - `GET /api/user/logout` - Invalidate the session
/// - `PUT /api/user/updateProfile` - Update name/avatar (authenticated)
/// - `PATCH /api/user/changePassword` - Change password (authenticated)
/// - `GET /api/user/forgotPassword` - Start the reset flow
/// - `GET /api/user/verifyForgotPassword/:token` - Check a reset token
/// - `PUT /api/user/resetPassword/:id` - Complete the reset flow
use crate::{
    app::{AppState, CurrentUser},
    cookies::{clear_cookie, get_cookie, set_cookie, REFRESH_COOKIE},
    error::{validation_error, ApiError, ApiResult, ValidationErrorDetail},
    response::ApiResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::AppendHeaders,
    Extension, Json,
};
use meterdesk_shared::{
    auth::{
        jwt::{self, TokenAudience},
        password, reset,
    },
    email::OutboundEmail,
    models::user::{CreateUser, User, UserProfile, UserRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct SessionData {
    /// Bearer access token (1h)
    pub access_token: String,

    /// Sanitized account view
    pub user: UserProfile,
}

/// Refresh response payload
#[derive(Debug, Serialize)]
pub struct RefreshData {
    /// New bearer access token (1h)
    pub access_token: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New avatar reference (opaque id, no upload handling here)
    #[validate(length(max = 512, message = "Avatar reference too long"))]
    pub avatar_url: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before the change
    pub current_password: String,

    /// Replacement password
    pub new_password: String,
}

/// Forgot-password query
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordQuery {
    /// Account email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
///
/// Carries the emailed token so the reset is only honored for the holder of
/// an unexpired token matching this account.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Reset token from the emailed link
    pub token: String,

    /// Replacement password
    pub password: String,
}

/// Registers a new account
///
/// The account starts unconfirmed; a confirmation link carrying a signed
/// access token is emailed, and login is refused until it is redeemed.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
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
            role: UserRole::User,
        },
    )
    .await?;

    let confirm_claims = jwt::Claims::user_access(user.id, user.role);
    let confirm_token = jwt::create_token(&confirm_claims, state.access_secret())?;
    let confirm_link = format!(
        "{}/api/user/confirmRegisterUser/{}",
        state.config.api.public_url, confirm_token
    );

    state
        .mailer
        .send(OutboundEmail {
            to: user.email.clone(),
            subject: "Confirm your Meterdesk account".to_string(),
            html: format!(
                "<p>Welcome to Meterdesk! Confirm your account within the hour:</p>\
                 <a href=\"{confirm_link}\">Confirm account</a>"
            ),
        })
        .await?;

    tracing::info!(user_id = %user.id, "Registered new account");

    Ok(ApiResponse::ok(
        "Account created, please confirm via email",
        UserProfile::from(user),
    ))
}

/// Redeems an email-confirmation token
///
/// The token is the signed access token from the registration email.
/// Confirmation is one-way.
pub async fn confirm_register_user(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let claims = jwt::validate_access_token(&token, state.access_secret(), TokenAudience::User)?;

    User::confirm(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::message("Account confirmed"))
}

/// Login endpoint
///
/// Succeeds only when the email exists, the account is confirmed, and the
/// password verifies; every other combination gets the same generic 401.
/// On success the refresh token is persisted and set as a cookie, and the
/// access token is returned in the body.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<SessionData>>,
)> {
    req.validate().map_err(validation_error)?;

    let rejection = || ApiError::Unauthorized("Incorrect email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(rejection)?;

    if !user.is_confirmed {
        return Err(rejection());
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(rejection());
    }

    let access_claims = jwt::Claims::user_access(user.id, user.role);
    let refresh_claims = jwt::Claims::user_refresh(user.id);

    let access_token = jwt::create_token(&access_claims, state.access_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.refresh_secret())?;

    User::set_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie(REFRESH_COOKIE, &refresh_token))]),
        ApiResponse::ok(
            "Logged in",
            SessionData {
                access_token,
                user: UserProfile::from(user),
            },
        ),
    ))
}

/// Rotates the session tokens
///
/// The cookie-borne refresh token must both verify cryptographically and
/// match the value stored on the account row. Both tokens are reissued and
/// the new refresh token replaces the stored one.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<RefreshData>>,
)> {
    let cookie = get_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let claims = jwt::validate_refresh_token(&cookie, state.refresh_secret(), TokenAudience::User)?;

    let user = User::find_by_id_and_refresh_token(&state.db, claims.sub, &cookie)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Refresh token is no longer valid".to_string()))?;

    let access_claims = jwt::Claims::user_access(user.id, user.role);
    let refresh_claims = jwt::Claims::user_refresh(user.id);

    let access_token = jwt::create_token(&access_claims, state.access_secret())?;
    let new_refresh = jwt::create_token(&refresh_claims, state.refresh_secret())?;

    User::set_refresh_token(&state.db, user.id, Some(&new_refresh)).await?;

    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie(REFRESH_COOKIE, &new_refresh))]),
        ApiResponse::ok("Token refreshed", RefreshData { access_token }),
    ))
}

/// Logout endpoint
///
/// Clears the stored refresh token matching the cookie (if any) and expires
/// the cookie. Succeeds whether or not a session existed.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<()>>,
)> {
    if let Some(cookie) = get_cookie(&headers, REFRESH_COOKIE) {
        User::clear_refresh_token_by_value(&state.db, &cookie).await?;
    }

    Ok((
        AppendHeaders([(SET_COOKIE, clear_cookie(REFRESH_COOKIE))]),
        ApiResponse::message("Logged out"),
    ))
}

/// Updates the caller's display name and/or avatar reference
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    req.validate().map_err(validation_error)?;

    if req.name.is_none() && req.avatar_url.is_none() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }

    let user = User::update_profile(
        &state.db,
        current.id,
        req.name.as_deref(),
        req.avatar_url.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("Profile updated", UserProfile::from(user)))
}

/// Changes the caller's password
///
/// The current password is re-verified and the replacement must pass the
/// strength check.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.new_password)?;

    if !User::update_password(&state.db, user.id, &password_hash).await? {
        return Err(ApiError::UnprocessableEntity(
            "Password was not updated".to_string(),
        ));
    }

    Ok(ApiResponse::message("Password changed"))
}

/// Starts the password-reset flow
///
/// Generates a 32-byte token, stores only its SHA-256 digest with a
/// 15-minute expiry, and emails the reset link. The plaintext token never
/// touches the database.
pub async fn forgot_password(
    State(state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> ApiResult<Json<ApiResponse<()>>> {
    query.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account for that email".to_string()))?;

    let reset_token = reset::generate_reset_token();

    User::set_reset_digest(
        &state.db,
        user.id,
        &reset_token.digest,
        reset_token.expires_at,
    )
    .await?;

    let reset_link = format!(
        "{}/api/user/verifyForgotPassword/{}",
        state.config.api.public_url, reset_token.token
    );

    state
        .mailer
        .send(OutboundEmail {
            to: user.email.clone(),
            subject: "Reset your Meterdesk password".to_string(),
            html: format!(
                "<p>A password reset was requested for this account. The link \
                 expires in {} minutes.</p><a href=\"{reset_link}\">Reset password</a>",
                reset::RESET_TOKEN_TTL_MINUTES
            ),
        })
        .await?;

    Ok(ApiResponse::message("Reset email sent"))
}

/// Verifies a reset token and returns the matching account id
///
/// A token that does not resolve is a 404, and an expired token is
/// indistinguishable from an unknown one.
pub async fn verify_forgot_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let digest = reset::digest_token(&token);

    let user = User::find_by_reset_digest(&state.db, &digest)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired reset token".to_string()))?;

    Ok(ApiResponse::ok(
        "Reset token is valid",
        serde_json::json!({ "id": user.id }),
    ))
}

/// Completes the password-reset flow
///
/// The reset token is re-verified here: its digest must match an unexpired
/// stored digest AND belong to the account in the path. Either failure is
/// the same 404 as an unknown token. On success the digest is cleared and
/// the change is timestamped.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let digest = reset::digest_token(&req.token);

    let user = User::find_by_reset_digest(&state.db, &digest)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired reset token".to_string()))?;

    if user.id != id {
        return Err(ApiError::NotFound(
            "Invalid or expired reset token".to_string(),
        ));
    }

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    User::reset_password(&state.db, user.id, &password_hash)
        .await?
        .ok_or_else(|| ApiError::UnprocessableEntity("Password was not reset".to_string()))?;

    tracing::info!(user_id = %user.id, "Password reset completed");

    Ok(ApiResponse::message("Password reset"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "MyP@ssw0rd!".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            name: "Jane".to_string(),
            email: "not-an-email".to_string(),
            password: "MyP@ssw0rd!".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_update_profile_request_validation() {
        let valid = UpdateProfileRequest {
            name: Some("New Name".to_string()),
            avatar_url: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = UpdateProfileRequest {
            name: Some(String::new()),
            avatar_url: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_session_data_serializes_access_token() {
        let data = RefreshData {
            access_token: "eyJ.example".to_string(),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("access_token"));
    }
}
