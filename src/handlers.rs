// HTTP handlers for the pricing admin endpoints
//
// Each handler locks the shared workspace, applies one operation to the
// working draft and returns the result as JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::costing::{
    AccessLevel, AutoIncreasePolicy, DraftStatus, EconomyWideOutcome, FinancialSettings, FixedCostBreakdown,
    IncludedService, IncreaseRunEntry, IncreaseState, MetricsSummary, PlanAnalysis, PlanDiscountView,
    PriceChange, PriceIncreaseEvent, Service, ServiceAnalysis, Staff, SubscriptionPlan,
};
use crate::error::ApiError;
use crate::validation::{
    is_amount_in_range, validate_currency_text, validate_duration_text, validate_identifier, MAX_CURRENCY_AMOUNT,
};
use crate::AppState;

fn validated_id(id: &str) -> Result<(), ApiError> {
    validate_identifier(id).map_err(|_| ApiError::BadRequest(format!("Invalid identifier: {}", id)))
}

fn checked_amount(field: &str, amount: Decimal) -> Result<Decimal, ApiError> {
    if is_amount_in_range(amount) {
        Ok(amount)
    } else {
        Err(ApiError::BadRequest(format!(
            "{} must be between 0 and {}",
            field, MAX_CURRENCY_AMOUNT
        )))
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// Request DTO for creating or replacing a service
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertServiceRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    #[schema(example = "Corte feminino")]
    pub name: String,
    #[validate(custom = "validate_currency_text")]
    #[schema(example = "R$ 90,00")]
    pub price: String,
    #[validate(custom = "validate_duration_text")]
    #[schema(example = "1h")]
    pub duration: String,
    #[serde(default)]
    #[schema(example = 6)]
    pub product_cost: Decimal,
}

/// Request DTO for creating or replacing a plan
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertPlanRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    #[schema(example = "Plano Ouro")]
    pub name: String,
    #[schema(example = 199.9)]
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[validate]
    #[serde(default)]
    pub included_services: Vec<IncludedService>,
}

/// Roster entry as sent by the staff provider
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StaffEntryRequest {
    #[validate(custom = "validate_identifier")]
    #[schema(example = "staff-ana")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[schema(value_type = String, example = "professional")]
    pub access_level: AccessLevel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceStaffRequest {
    #[validate]
    pub staff: Vec<StaffEntryRequest>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RunIncreasesRequest {
    /// Day to evaluate; the current UTC date when omitted
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Every analysis view in one response
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisReport {
    pub fixed_costs: FixedCostBreakdown,
    pub cost_per_minute: Decimal,
    pub services: Vec<ServiceAnalysis>,
    /// Worst value per minute first
    pub plans_by_profitability: Vec<PlanAnalysis>,
    /// Best perceived discount first
    pub plans_by_discount: Vec<PlanDiscountView>,
    pub draft: DraftStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EconomyWidePreview {
    /// Whether the working fixed cost is above the committed one
    pub available: bool,
    pub percentage: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IncreaseStateResponse {
    pub plan_id: String,
    pub state: IncreaseState,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionalPriceResponse {
    pub plan_id: String,
    pub applied: bool,
    pub original_price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunIncreasesResponse {
    pub today: NaiveDate,
    pub entries: Vec<IncreaseRunEntry>,
}

// ============================================================================
// Settings and staff
// ============================================================================

/// Handler for GET /api/settings
/// Returns the working financial settings
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Working settings", body = FinancialSettings)),
    tag = "settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> Json<FinancialSettings> {
    let workspace = state.workspace.read().await;
    Json(workspace.settings().clone())
}

/// Handler for PUT /api/settings
/// Replaces the working settings; percentages are clamped into range
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = FinancialSettings,
    responses(
        (status = 200, description = "Settings updated", body = FinancialSettings),
        (status = 400, description = "Invalid settings")
    ),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<FinancialSettings>,
) -> Result<Json<FinancialSettings>, ApiError> {
    payload.validate()?;

    let mut workspace = state.workspace.write().await;
    let updated = workspace.update_settings(payload)?.clone();

    tracing::debug!("Working settings updated");
    Ok(Json(updated))
}

/// Handler for GET /api/staff
#[utoipa::path(
    get,
    path = "/api/staff",
    responses((status = 200, description = "Staff roster", body = Vec<Staff>)),
    tag = "settings"
)]
pub async fn get_staff(State(state): State<AppState>) -> Json<Vec<Staff>> {
    let workspace = state.workspace.read().await;
    Json(workspace.staff().to_vec())
}

/// Handler for PUT /api/staff
/// Replaces the staff roster
#[utoipa::path(
    put,
    path = "/api/staff",
    request_body = ReplaceStaffRequest,
    responses(
        (status = 200, description = "Roster replaced", body = Vec<Staff>),
        (status = 400, description = "Invalid roster entry")
    ),
    tag = "settings"
)]
pub async fn replace_staff(
    State(state): State<AppState>,
    Json(payload): Json<ReplaceStaffRequest>,
) -> Result<Json<Vec<Staff>>, ApiError> {
    payload.validate()?;

    let staff: Vec<Staff> = payload
        .staff
        .into_iter()
        .map(|entry| Staff {
            id: entry.id,
            name: entry.name,
            access_level: entry.access_level,
        })
        .collect();

    let mut workspace = state.workspace.write().await;
    workspace.replace_staff(staff);
    Ok(Json(workspace.staff().to_vec()))
}

// ============================================================================
// Services
// ============================================================================

/// Handler for GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    responses((status = 200, description = "Services in catalog order", body = Vec<Service>)),
    tag = "catalog"
)]
pub async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    let workspace = state.workspace.read().await;
    Json(workspace.catalog().services.clone())
}

/// Handler for PUT /api/services/:id
/// Creates or replaces a service in the working catalog
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(("id" = String, Path, description = "Service ID")),
    request_body = UpsertServiceRequest,
    responses(
        (status = 200, description = "Service stored", body = Service),
        (status = 400, description = "Invalid input data")
    ),
    tag = "catalog"
)]
pub async fn upsert_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertServiceRequest>,
) -> Result<Json<Service>, ApiError> {
    validated_id(&id)?;
    payload.validate()?;
    let product_cost = checked_amount("Product cost", payload.product_cost.max(Decimal::ZERO))?;

    let service = Service {
        id,
        name: payload.name,
        price: payload.price,
        duration: payload.duration,
        product_cost,
    };

    let mut workspace = state.workspace.write().await;
    workspace.upsert_service(service.clone());

    tracing::debug!("Service {} stored in draft", service.id);
    Ok(Json(service))
}

/// Handler for DELETE /api/services/:id
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(("id" = String, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service removed"),
        (status = 404, description = "Service not found")
    ),
    tag = "catalog"
)]
pub async fn delete_service(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut workspace = state.workspace.write().await;
    workspace.remove_service(&id)?;

    tracing::debug!("Service {} removed from draft", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/services/:id/apply-suggested
#[utoipa::path(
    post,
    path = "/api/services/{id}/apply-suggested",
    params(("id" = String, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Suggested price applied", body = PriceChange),
        (status = 404, description = "Service not found")
    ),
    tag = "adjustments"
)]
pub async fn apply_suggested_service_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PriceChange>, ApiError> {
    let mut workspace = state.workspace.write().await;
    Ok(Json(workspace.apply_suggested_service_price(&id)?))
}

// ============================================================================
// Plans
// ============================================================================

/// Handler for GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    responses((status = 200, description = "Plans in catalog order", body = Vec<SubscriptionPlan>)),
    tag = "catalog"
)]
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<SubscriptionPlan>> {
    let workspace = state.workspace.read().await;
    Json(workspace.catalog().plans.clone())
}

/// Handler for PUT /api/plans/:id
/// Creates or replaces a plan in the working catalog
#[utoipa::path(
    put,
    path = "/api/plans/{id}",
    params(("id" = String, Path, description = "Plan ID")),
    request_body = UpsertPlanRequest,
    responses(
        (status = 200, description = "Plan stored", body = SubscriptionPlan),
        (status = 400, description = "Invalid input data")
    ),
    tag = "catalog"
)]
pub async fn upsert_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertPlanRequest>,
) -> Result<Json<SubscriptionPlan>, ApiError> {
    validated_id(&id)?;
    payload.validate()?;

    let price = checked_amount("Plan price", payload.price)?;
    let original_price = payload
        .original_price
        .map(|original| checked_amount("Original price", original))
        .transpose()?;

    let plan = SubscriptionPlan {
        id,
        name: payload.name,
        price,
        original_price,
        discount_percentage: payload.discount_percentage.map(|discount| discount.max(Decimal::ZERO)),
        included_services: payload.included_services,
    };

    let mut workspace = state.workspace.write().await;
    workspace.upsert_plan(plan.clone());

    tracing::debug!("Plan {} stored in draft", plan.id);
    Ok(Json(plan))
}

/// Handler for DELETE /api/plans/:id
/// Removes a plan and any increase scheduled for it
#[utoipa::path(
    delete,
    path = "/api/plans/{id}",
    params(("id" = String, Path, description = "Plan ID")),
    responses(
        (status = 204, description = "Plan removed"),
        (status = 404, description = "Plan not found")
    ),
    tag = "catalog"
)]
pub async fn delete_plan(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut workspace = state.workspace.write().await;
    workspace.remove_plan(&id)?;

    tracing::debug!("Plan {} removed from draft", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/plans/:id/apply-suggested
#[utoipa::path(
    post,
    path = "/api/plans/{id}/apply-suggested",
    params(("id" = String, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Suggested minimum price applied", body = PriceChange),
        (status = 404, description = "Plan not found")
    ),
    tag = "adjustments"
)]
pub async fn apply_suggested_plan_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PriceChange>, ApiError> {
    let mut workspace = state.workspace.write().await;
    Ok(Json(workspace.apply_suggested_plan_price(&id)?))
}

/// Handler for POST /api/plans/:id/schedule-increase
#[utoipa::path(
    post,
    path = "/api/plans/{id}/schedule-increase",
    params(("id" = String, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan scheduled for an increase", body = IncreaseStateResponse),
        (status = 404, description = "Plan not found")
    ),
    tag = "auto-increase"
)]
pub async fn schedule_increase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IncreaseStateResponse>, ApiError> {
    let mut workspace = state.workspace.write().await;
    let increase_state = workspace.schedule_increase(&id)?;
    Ok(Json(IncreaseStateResponse {
        plan_id: id,
        state: increase_state,
    }))
}

/// Handler for DELETE /api/plans/:id/schedule-increase
#[utoipa::path(
    delete,
    path = "/api/plans/{id}/schedule-increase",
    params(("id" = String, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Scheduled increase cancelled", body = IncreaseStateResponse),
        (status = 404, description = "Plan not found")
    ),
    tag = "auto-increase"
)]
pub async fn cancel_increase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IncreaseStateResponse>, ApiError> {
    let mut workspace = state.workspace.write().await;
    let increase_state = workspace.cancel_increase(&id)?;
    Ok(Json(IncreaseStateResponse {
        plan_id: id,
        state: increase_state,
    }))
}

/// Handler for POST /api/plans/:id/promotional-price
/// Derives the "from" price of a discounted plan
#[utoipa::path(
    post,
    path = "/api/plans/{id}/promotional-price",
    params(("id" = String, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Promotional price derived, or unchanged without a discount", body = PromotionalPriceResponse),
        (status = 404, description = "Plan not found")
    ),
    tag = "adjustments"
)]
pub async fn derive_promotional_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PromotionalPriceResponse>, ApiError> {
    let mut workspace = state.workspace.write().await;
    let original_price = workspace.derive_promotional_price(&id)?;
    Ok(Json(PromotionalPriceResponse {
        plan_id: id,
        applied: original_price.is_some(),
        original_price,
    }))
}

// ============================================================================
// Analysis and adjustments
// ============================================================================

/// Handler for GET /api/analysis
/// Runs the analysis over the working draft
#[utoipa::path(
    get,
    path = "/api/analysis",
    responses((status = 200, description = "Analysis of the working draft", body = AnalysisReport)),
    tag = "analysis"
)]
pub async fn get_analysis(State(state): State<AppState>) -> Json<AnalysisReport> {
    let workspace = state.workspace.read().await;
    let analysis = workspace.analyze();

    Json(AnalysisReport {
        fixed_costs: analysis.fixed_costs.clone(),
        cost_per_minute: analysis.cost_per_minute,
        services: analysis.services().to_vec(),
        plans_by_profitability: analysis.plans_by_profitability().into_iter().cloned().collect(),
        plans_by_discount: analysis.plans_by_discount().into_iter().cloned().collect(),
        draft: workspace.draft_status(),
    })
}

/// Handler for GET /api/adjustments/economy-wide
#[utoipa::path(
    get,
    path = "/api/adjustments/economy-wide",
    responses((status = 200, description = "Current fixed cost increase", body = EconomyWidePreview)),
    tag = "adjustments"
)]
pub async fn preview_economy_wide_increase(State(state): State<AppState>) -> Json<EconomyWidePreview> {
    let workspace = state.workspace.read().await;
    let percentage = workspace.economy_wide_increase_percentage();
    Json(EconomyWidePreview {
        available: percentage.is_some(),
        percentage,
    })
}

/// Handler for POST /api/adjustments/economy-wide
/// Reprices the whole catalog; a no-op when fixed costs did not rise
#[utoipa::path(
    post,
    path = "/api/adjustments/economy-wide",
    responses((status = 200, description = "Repricing outcome", body = EconomyWideOutcome)),
    tag = "adjustments"
)]
pub async fn apply_economy_wide_increase(State(state): State<AppState>) -> Json<EconomyWideOutcome> {
    let mut workspace = state.workspace.write().await;
    Json(workspace.apply_economy_wide_increase())
}

// ============================================================================
// Auto-increase
// ============================================================================

/// Handler for GET /api/auto-increase/policy
#[utoipa::path(
    get,
    path = "/api/auto-increase/policy",
    responses((status = 200, description = "Auto-increase policy", body = AutoIncreasePolicy)),
    tag = "auto-increase"
)]
pub async fn get_policy(State(state): State<AppState>) -> Json<AutoIncreasePolicy> {
    let workspace = state.workspace.read().await;
    Json(workspace.policy())
}

/// Handler for PUT /api/auto-increase/policy
#[utoipa::path(
    put,
    path = "/api/auto-increase/policy",
    request_body = AutoIncreasePolicy,
    responses(
        (status = 200, description = "Policy updated", body = AutoIncreasePolicy),
        (status = 400, description = "Trigger day out of range")
    ),
    tag = "auto-increase"
)]
pub async fn update_policy(
    State(state): State<AppState>,
    Json(payload): Json<AutoIncreasePolicy>,
) -> Result<Json<AutoIncreasePolicy>, ApiError> {
    payload.validate()?;

    let mut workspace = state.workspace.write().await;
    workspace.set_policy(payload)?;
    Ok(Json(workspace.policy()))
}

/// Handler for POST /api/auto-increase/run
/// Evaluates every scheduled plan for the given day
#[utoipa::path(
    post,
    path = "/api/auto-increase/run",
    request_body = RunIncreasesRequest,
    responses((status = 200, description = "One entry per scheduled plan", body = RunIncreasesResponse)),
    tag = "auto-increase"
)]
pub async fn run_due_increases(
    State(state): State<AppState>,
    Json(payload): Json<RunIncreasesRequest>,
) -> Json<RunIncreasesResponse> {
    let today = payload.today.unwrap_or_else(|| Utc::now().date_naive());

    let mut workspace = state.workspace.write().await;
    let entries = workspace.run_due_increases(today, state.notifier.as_ref());

    tracing::debug!("Auto-increase run for {} evaluated {} plans", today, entries.len());
    Json(RunIncreasesResponse { today, entries })
}

/// Handler for GET /api/notifications
/// Price increase events delivered so far
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, description = "Delivered events, oldest first", body = Vec<PriceIncreaseEvent>)),
    tag = "auto-increase"
)]
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<PriceIncreaseEvent>> {
    Json(state.notifier.events())
}

// ============================================================================
// Draft lifecycle and metrics
// ============================================================================

/// Handler for GET /api/draft
#[utoipa::path(
    get,
    path = "/api/draft",
    responses((status = 200, description = "Draft state", body = DraftStatus)),
    tag = "draft"
)]
pub async fn get_draft_status(State(state): State<AppState>) -> Json<DraftStatus> {
    let workspace = state.workspace.read().await;
    Json(workspace.draft_status())
}

/// Handler for POST /api/draft/save
/// Persists the working draft; a failed save discards it
#[utoipa::path(
    post,
    path = "/api/draft/save",
    responses(
        (status = 200, description = "Draft committed", body = DraftStatus),
        (status = 500, description = "Store failed, draft discarded")
    ),
    tag = "draft"
)]
pub async fn save_draft(State(state): State<AppState>) -> Result<Json<DraftStatus>, ApiError> {
    let mut workspace = state.workspace.write().await;
    workspace.save(state.store.as_ref())?;
    Ok(Json(workspace.draft_status()))
}

/// Handler for POST /api/draft/revert
#[utoipa::path(
    post,
    path = "/api/draft/revert",
    responses((status = 200, description = "Draft discarded", body = DraftStatus)),
    tag = "draft"
)]
pub async fn revert_draft(State(state): State<AppState>) -> Json<DraftStatus> {
    let mut workspace = state.workspace.write().await;
    workspace.revert();
    Json(workspace.draft_status())
}

/// Handler for GET /api/metrics
#[utoipa::path(
    get,
    path = "/api/metrics",
    responses((status = 200, description = "Engine metrics", body = MetricsSummary)),
    tag = "analysis"
)]
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSummary> {
    let workspace = state.workspace.read().await;
    Json(workspace.metrics().summary())
}
