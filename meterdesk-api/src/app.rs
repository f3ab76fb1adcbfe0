/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use meterdesk_api::{app::AppState, config::Config};
/// use meterdesk_shared::email::LogMailer;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(LogMailer));
/// let app = meterdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use meterdesk_shared::{
    auth::jwt::{self, TokenAudience},
    email::Mailer,
    models::user::UserRole,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the access-token signing secret
    pub fn access_secret(&self) -> &str {
        &self.config.jwt.access_secret
    }

    /// Gets the refresh-token signing secret
    pub fn refresh_secret(&self) -> &str {
        &self.config.jwt.refresh_secret
    }
}

/// Authenticated principal injected into request extensions
///
/// Produced by the user-realm JWT middleware; handlers read it with the
/// `Extension` extractor.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    /// User ID from the token's `sub` claim
    pub id: uuid::Uuid,

    /// Role from the token's `role` claim
    pub role: UserRole,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /user/                       # Accounts: register, confirm, login,
///     │                                #   refresh, logout, profile, passwords
///     ├── /project/                    # Owner-scoped projects + project tokens
///     ├── /service/                    # Catalog, attach, usage recording
///     ├── /admin/                      # Admin console (admin role required)
///     ├── /contact/                    # Public list + admin-managed records
///     └── /documentation/              # Public read + admin-managed content
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public account routes (the token flows carry their own credentials)
    let user_public = Router::new()
        .route("/register", post(routes::users::register))
        .route(
            "/confirmRegisterUser/:token",
            get(routes::users::confirm_register_user),
        )
        .route("/login", post(routes::users::login))
        .route("/refreshToken", get(routes::users::refresh_token))
        .route("/logout", get(routes::users::logout))
        .route("/forgotPassword", get(routes::users::forgot_password))
        .route(
            "/verifyForgotPassword/:token",
            get(routes::users::verify_forgot_password),
        )
        .route("/resetPassword/:id", put(routes::users::reset_password));

    // Account routes requiring a live session
    let user_authed = Router::new()
        .route("/updateProfile", put(routes::users::update_profile))
        .route("/changePassword", patch(routes::users::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = user_public.merge(user_authed);

    let project_routes = Router::new()
        .route("/readProjects", get(routes::projects::read_projects))
        .route("/createProject", post(routes::projects::create_project))
        .route("/projectDetail/:id", get(routes::projects::project_detail))
        .route("/editProject/:id", patch(routes::projects::edit_project))
        .route(
            "/refreshProjectToken",
            get(routes::projects::refresh_project_token),
        )
        .route(
            "/projectHistory/:id",
            get(routes::projects::project_history),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let service_authed = Router::new()
        .route(
            "/createServiceByUser/:projectId/:serviceId",
            post(routes::services::create_service_by_user),
        )
        .route(
            "/editServiceByUser/:projectId/:serviceId",
            patch(routes::services::edit_service_by_user),
        )
        .route(
            "/activateService",
            patch(routes::services::activate_service),
        )
        .route(
            "/deactivateService",
            patch(routes::services::deactivate_service),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let service_routes = Router::new()
        .route("/", get(routes::services::read_services))
        .merge(service_authed);

    let admin_routes = Router::new()
        .route("/readUsers", get(routes::admin::read_users))
        .route("/readProfile/:id", get(routes::admin::read_profile))
        .route("/editUserEmail/:id", patch(routes::admin::edit_user_email))
        .route("/lockUser/:id", patch(routes::admin::lock_user))
        .route("/unLockUser/:id", patch(routes::admin::un_lock_user))
        .route("/createUser", post(routes::admin::create_user))
        .route(
            "/createServiceByAdmin",
            post(routes::admin::create_service_by_admin),
        )
        .route("/deleteUser/:id", delete(routes::admin::delete_user))
        .route("/deleteService/:id", delete(routes::admin::delete_service))
        .route("/deleteProject/:id", delete(routes::admin::delete_project))
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let contact_admin = Router::new()
        .route("/createContact", post(routes::contacts::create_contact))
        .route("/editContact/:id", patch(routes::contacts::edit_contact))
        .route("/deleteContact/:id", delete(routes::contacts::delete_contact))
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let contact_routes = Router::new()
        .route("/", get(routes::contacts::read_contacts))
        .merge(contact_admin);

    let documentation_admin = Router::new()
        .route(
            "/createDocumentation",
            post(routes::documentation::create_documentation),
        )
        .route(
            "/editDocumentation/:id",
            patch(routes::documentation::edit_documentation),
        )
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let documentation_routes = Router::new()
        .route("/", get(routes::documentation::read_documentation))
        .merge(documentation_admin);

    let api_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/project", project_routes)
        .nest("/service", service_routes)
        .nest("/admin", admin_routes)
        .nest("/contact", contact_routes)
        .nest("/documentation", documentation_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// User-realm JWT authentication middleware
///
/// Extracts and validates the Bearer access token, then injects
/// [`CurrentUser`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.access_secret(), TokenAudience::User)?;

    let current = CurrentUser {
        id: claims.sub,
        role: claims.role.unwrap_or(UserRole::Anonymous),
    };

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Role check middleware for the admin console
///
/// Runs after [`jwt_auth_layer`] and rejects any principal whose token does
/// not carry the admin role.
async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    if current.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "Admin privileges are required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_copy() {
        let current = CurrentUser {
            id: uuid::Uuid::new_v4(),
            role: UserRole::User,
        };
        let copied = current;
        assert_eq!(copied.id, current.id);
    }
}
