/// Service endpoints
///
/// The public catalog, attaching catalog services to projects, recording
/// usage against an attached instance, and the activation toggle.
///
/// # Endpoints
///
/// - `GET /api/service/` - Public catalog listing
/// - `POST /api/service/createServiceByUser/:projectId/:serviceId` - Attach
/// - `PATCH /api/service/editServiceByUser/:projectId/:serviceId` - Record usage
/// - `PATCH /api/service/activateService` - Switch an instance on
/// - `PATCH /api/service/deactivateService` - Switch an instance off
use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use meterdesk_shared::models::{
    history::History,
    project::Project,
    service::Service,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of a catalog entry
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    /// Catalog service ID, used when attaching
    pub id: Uuid,

    /// Service name
    pub name: String,

    /// Short blurb
    pub introduction: Option<String>,

    /// Longer description
    pub information: Option<String>,

    /// Unit price per usage event
    pub price: i64,
}

impl From<Service> for CatalogEntry {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            introduction: service.introduction,
            information: service.information,
            price: service.price,
        }
    }
}

/// Usage-recording request
#[derive(Debug, Deserialize, Validate)]
pub struct RecordUsageRequest {
    /// Payload describing the usage event, stored on the ledger entry
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Usage-recording response payload
#[derive(Debug, Serialize)]
pub struct RecordUsageData {
    /// The instance with advanced counters
    pub service: Service,

    /// The appended ledger entry (cost = unit price)
    pub history: History,
}

/// Activation toggle request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleServiceRequest {
    /// Owning project
    pub project_id: Uuid,

    /// Attached service instance
    pub service_id: Uuid,
}

/// Lists the public service catalog
pub async fn read_services(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<CatalogEntry>>>> {
    let catalog = Service::list_catalog(&state.db)
        .await?
        .into_iter()
        .map(CatalogEntry::from)
        .collect();

    Ok(ApiResponse::ok("Services", catalog))
}

/// Attaches a catalog service to one of the caller's projects
///
/// The template's name, descriptions, and price are copied into a fresh
/// instance with zeroed counters; a catalog service can only be attached to
/// a project once.
pub async fn create_service_by_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((project_id, service_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<Service>>> {
    let project = Project::find_owned(&state.db, project_id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let template = Service::find_by_id(&state.db, service_id)
        .await?
        .filter(|s| s.project_id.is_none())
        .ok_or_else(|| ApiError::NotFound("Catalog service not found".to_string()))?;

    if Service::find_in_project_by_name(&state.db, project.id, &template.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "{} is already attached to this project",
            template.name
        )));
    }

    let service = Service::attach(&state.db, &template, project.id).await?;

    tracing::info!(
        project_id = %project.id,
        service_id = %service.id,
        "Service attached to project"
    );

    Ok(ApiResponse::ok("Service attached", service))
}

/// Records one usage event against an attached service
///
/// A single transaction advances the counters with an atomic in-database
/// increment and appends the ledger entry carrying the marginal cost. After
/// N successful calls: `sum_data = N`, `sum_cost = N * price`, N entries.
pub async fn edit_service_by_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((project_id, service_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RecordUsageRequest>,
) -> ApiResult<Json<ApiResponse<RecordUsageData>>> {
    req.validate().map_err(validation_error)?;

    let project = Project::find_owned(&state.db, project_id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Service::find_in_project(&state.db, service_id, project.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found in this project".to_string()))?;

    let (service, history) =
        Service::record_usage(&state.db, service_id, project.id, Some(req.content))
            .await?
            .ok_or_else(|| {
                ApiError::UnprocessableEntity("Usage could not be recorded".to_string())
            })?;

    Ok(ApiResponse::ok(
        "Usage recorded",
        RecordUsageData { service, history },
    ))
}

/// Switches a service instance on
pub async fn activate_service(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ToggleServiceRequest>,
) -> ApiResult<Json<ApiResponse<Service>>> {
    toggle_service(&state, current, req, true).await
}

/// Switches a service instance off
///
/// Deactivation only flips the flag; counters and ledger entries stay.
pub async fn deactivate_service(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ToggleServiceRequest>,
) -> ApiResult<Json<ApiResponse<Service>>> {
    toggle_service(&state, current, req, false).await
}

async fn toggle_service(
    state: &AppState,
    current: CurrentUser,
    req: ToggleServiceRequest,
    active: bool,
) -> ApiResult<Json<ApiResponse<Service>>> {
    let project = Project::find_owned(&state.db, req.project_id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let service = Service::set_active(&state.db, req.service_id, project.id, active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found in this project".to_string()))?;

    Ok(ApiResponse::ok(
        if active {
            "Service activated"
        } else {
            "Service deactivated"
        },
        service,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_usage_request_validation() {
        let valid = RecordUsageRequest {
            content: "{\"chars\": 42}".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = RecordUsageRequest {
            content: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_catalog_entry_hides_counters() {
        let json = serde_json::to_string(&CatalogEntry {
            id: Uuid::new_v4(),
            name: "ocr".to_string(),
            introduction: None,
            information: None,
            price: 3,
        })
        .unwrap();

        assert!(json.contains("price"));
        assert!(!json.contains("sum_data"));
        assert!(!json.contains("unpaid"));
    }
}
