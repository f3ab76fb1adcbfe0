/// Project endpoints
///
/// Owner-scoped project CRUD, the project-realm token flow, and the
/// per-project service/ledger views.
///
/// # Endpoints
///
/// - `GET /api/project/readProjects` - Paginated, searchable listing
/// - `POST /api/project/createProject` - Create + issue project tokens
/// - `GET /api/project/projectDetail/:id` - Attached services overview
/// - `PATCH /api/project/editProject/:id` - Rename
/// - `GET /api/project/refreshProjectToken` - Rotate the project token pair
/// - `GET /api/project/projectHistory/:id` - Usage ledger
use crate::{
    app::{AppState, CurrentUser},
    cookies::{get_cookie, set_cookie, PROJECT_REFRESH_COOKIE},
    error::{validation_error, ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::AppendHeaders,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use meterdesk_shared::{
    auth::{
        jwt::{self, TokenAudience},
        password,
    },
    models::{
        history::History,
        project::Project,
        service::Service,
        user::User,
        DateRange,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for listings
pub const DEFAULT_PAGE_LIMIT: i64 = 7;

/// Pagination and search query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,

    /// Page size (default 7)
    pub limit: Option<i64>,

    /// Substring matched against id and name
    pub search_text: Option<String>,
}

impl ListQuery {
    /// Resolves page/limit into a LIMIT/OFFSET pair
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1) * limit)
    }
}

/// Optional inclusive date-range query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Builds the half-open range when both bounds are present
    pub fn range(&self) -> Result<Option<DateRange>, ApiError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(ApiError::BadRequest(
                        "endDate must not precede startDate".to_string(),
                    ));
                }
                Ok(Some(DateRange::inclusive(start, end)))
            }
            (None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(
                "startDate and endDate must be supplied together".to_string(),
            )),
        }
    }
}

/// Create/rename project request
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectNameRequest {
    /// Project name, unique per owner
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Create-project response payload
#[derive(Debug, Serialize)]
pub struct CreatedProjectData {
    /// The new project
    pub project: Project,

    /// Project-realm bearer access token (1h)
    pub access_token: String,
}

/// Project token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshProjectTokenRequest {
    /// The owning user's password, re-verified before rotation
    pub password: String,
}

/// Attached-service overview row
#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    /// Service name
    pub name: String,

    /// Running total cost
    pub sum_cost: i64,

    /// Whether the instance is switched on
    pub is_active: bool,

    /// When the service was attached
    pub created_at: DateTime<Utc>,
}

impl From<Service> for ServiceSummary {
    fn from(service: Service) -> Self {
        Self {
            name: service.name,
            sum_cost: service.sum_cost,
            is_active: service.is_active,
            created_at: service.created_at,
        }
    }
}

/// Project detail response payload
#[derive(Debug, Serialize)]
pub struct ProjectDetailData {
    /// The project
    pub project: Project,

    /// Attached services (optionally date-filtered)
    pub services: Vec<ServiceSummary>,
}

/// Lists the caller's projects with pagination and search
pub async fn read_projects(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Project>>>> {
    let (limit, offset) = query.limit_offset();

    let projects = Project::list_for_owner(
        &state.db,
        current.id,
        limit,
        offset,
        query.search_text.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok("Projects", projects))
}

/// Creates a project and issues its token pair
///
/// The name must be unused within the caller's namespace. The project
/// refresh token is persisted on the row and set as the
/// `refreshProjectToken` cookie; the access token is returned in the body.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProjectNameRequest>,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<CreatedProjectData>>,
)> {
    req.validate().map_err(validation_error)?;

    if Project::find_by_name_for_owner(&state.db, current.id, &req.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "{} already exists, please enter another name",
            req.name
        )));
    }

    let project = Project::create(&state.db, current.id, &req.name).await?;

    let access_claims = jwt::Claims::project_access(project.id);
    let refresh_claims = jwt::Claims::project_refresh(project.id);

    let access_token = jwt::create_token(&access_claims, state.access_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.refresh_secret())?;

    Project::set_refresh_token(&state.db, project.id, Some(&refresh_token)).await?;

    tracing::info!(project_id = %project.id, owner_id = %current.id, "Project created");

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            set_cookie(PROJECT_REFRESH_COOKIE, &refresh_token),
        )]),
        ApiResponse::ok(
            "Project created",
            CreatedProjectData {
                project,
                access_token,
            },
        ),
    ))
}

/// Shows a project with its attached services
///
/// Another owner's project id is a plain 404. An optional inclusive date
/// range filters the services by attach date.
pub async fn project_detail(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<ApiResponse<ProjectDetailData>>> {
    let project = Project::find_owned(&state.db, id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let range = query.range()?;
    let services = Service::list_for_project(&state.db, project.id, range)
        .await?
        .into_iter()
        .map(ServiceSummary::from)
        .collect();

    Ok(ApiResponse::ok(
        "Project detail",
        ProjectDetailData { project, services },
    ))
}

/// Renames a project
pub async fn edit_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProjectNameRequest>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    req.validate().map_err(validation_error)?;

    if Project::find_by_name_for_owner(&state.db, current.id, &req.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "{} already exists, please enter another name",
            req.name
        )));
    }

    let project = Project::rename(&state.db, id, current.id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(ApiResponse::ok("Project renamed", project))
}

/// Rotates the project token pair
///
/// Requires three proofs at once: a live user session, the owning user's
/// password, and the current project refresh token in the
/// `refreshProjectToken` cookie matching the stored column.
pub async fn refresh_project_token(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(req): Json<RefreshProjectTokenRequest>,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<ApiResponse<CreatedProjectData>>,
)> {
    let cookie = get_cookie(&headers, PROJECT_REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("Missing project refresh token".to_string()))?;

    let claims =
        jwt::validate_refresh_token(&cookie, state.refresh_secret(), TokenAudience::Project)?;

    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }

    let project = Project::find_for_refresh(&state.db, claims.sub, current.id, &cookie)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("Project refresh token is no longer valid".to_string())
        })?;

    let access_claims = jwt::Claims::project_access(project.id);
    let refresh_claims = jwt::Claims::project_refresh(project.id);

    let access_token = jwt::create_token(&access_claims, state.access_secret())?;
    let new_refresh = jwt::create_token(&refresh_claims, state.refresh_secret())?;

    Project::set_refresh_token(&state.db, project.id, Some(&new_refresh)).await?;

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            set_cookie(PROJECT_REFRESH_COOKIE, &new_refresh),
        )]),
        ApiResponse::ok(
            "Project token refreshed",
            CreatedProjectData {
                project,
                access_token,
            },
        ),
    ))
}

/// Lists a project's usage ledger, newest first
pub async fn project_history(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<History>>>> {
    let project = Project::find_owned(&state.db, id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let range = query.range()?;
    let entries = History::list_for_project(&state.db, project.id, range).await?;

    Ok(ApiResponse::ok("Project history", entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset_defaults() {
        let query = ListQuery {
            page: None,
            limit: None,
            search_text: None,
        };
        assert_eq!(query.limit_offset(), (DEFAULT_PAGE_LIMIT, 0));
    }

    #[test]
    fn test_limit_offset_paging() {
        let query = ListQuery {
            page: Some(3),
            limit: Some(10),
            search_text: None,
        };
        assert_eq!(query.limit_offset(), (10, 20));
    }

    #[test]
    fn test_limit_offset_clamps_nonsense() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(-5),
            search_text: None,
        };
        assert_eq!(query.limit_offset(), (1, 0));
    }

    #[test]
    fn test_date_range_query_requires_both_bounds() {
        let only_start = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
        };
        assert!(only_start.range().is_err());

        let neither = DateRangeQuery {
            start_date: None,
            end_date: None,
        };
        assert!(neither.range().unwrap().is_none());
    }

    #[test]
    fn test_date_range_query_rejects_inverted() {
        let inverted = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };
        assert!(inverted.range().is_err());
    }
}
