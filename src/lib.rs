// Salon pricing backend
//
// Cost and pricing analysis engine (`costing`) plus the HTTP admin surface
// that edits its settings, roster and catalog.

pub mod config;
pub mod costing;
pub mod error;
pub mod handlers;
pub mod validation;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use costing::{NotificationOutbox, PricingWorkspace, WorkspaceStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_settings,
        handlers::update_settings,
        handlers::get_staff,
        handlers::replace_staff,
        handlers::list_services,
        handlers::upsert_service,
        handlers::delete_service,
        handlers::apply_suggested_service_price,
        handlers::list_plans,
        handlers::upsert_plan,
        handlers::delete_plan,
        handlers::apply_suggested_plan_price,
        handlers::schedule_increase,
        handlers::cancel_increase,
        handlers::derive_promotional_price,
        handlers::get_analysis,
        handlers::preview_economy_wide_increase,
        handlers::apply_economy_wide_increase,
        handlers::get_policy,
        handlers::update_policy,
        handlers::run_due_increases,
        handlers::list_notifications,
        handlers::get_draft_status,
        handlers::save_draft,
        handlers::revert_draft,
        handlers::get_metrics,
    ),
    components(
        schemas(
            costing::FinancialSettings,
            costing::Staff,
            costing::Service,
            costing::SubscriptionPlan,
            costing::IncludedService,
            costing::FixedCostBreakdown,
            costing::ServiceAnalysis,
            costing::PlanAnalysis,
            costing::PlanDiscountView,
            costing::HealthStatus,
            costing::IncreaseState,
            costing::DraftState,
            costing::DraftStatus,
            costing::PriceChange,
            costing::EconomyWideOutcome,
            costing::AutoIncreasePolicy,
            costing::IncreaseOutcome,
            costing::IncreaseRunEntry,
            costing::PriceIncreaseEvent,
            costing::MetricsSummary,
            handlers::UpsertServiceRequest,
            handlers::UpsertPlanRequest,
            handlers::StaffEntryRequest,
            handlers::ReplaceStaffRequest,
            handlers::RunIncreasesRequest,
            handlers::AnalysisReport,
            handlers::EconomyWidePreview,
            handlers::IncreaseStateResponse,
            handlers::PromotionalPriceResponse,
            handlers::RunIncreasesResponse,
        )
    ),
    tags(
        (name = "settings", description = "Financial settings and staff roster"),
        (name = "catalog", description = "Services and subscription plans"),
        (name = "analysis", description = "Cost and profitability analysis"),
        (name = "adjustments", description = "Price adjustments"),
        (name = "auto-increase", description = "Scheduled price increases"),
        (name = "draft", description = "Save or discard the working draft")
    ),
    info(
        title = "Salon Pricing API",
        version = "0.1.0",
        description = "Cost analysis and pricing for services and subscription plans"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<RwLock<PricingWorkspace>>,
    pub store: Arc<dyn WorkspaceStore>,
    pub notifier: Arc<NotificationOutbox>,
}

impl AppState {
    pub fn new(workspace: PricingWorkspace, store: Arc<dyn WorkspaceStore>) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(workspace)),
            store,
            notifier: Arc::new(NotificationOutbox::new()),
        }
    }
}

/// API routes without docs or middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(handlers::get_settings).put(handlers::update_settings))
        .route("/api/staff", get(handlers::get_staff).put(handlers::replace_staff))
        .route("/api/services", get(handlers::list_services))
        .route(
            "/api/services/:id",
            put(handlers::upsert_service).delete(handlers::delete_service),
        )
        .route(
            "/api/services/:id/apply-suggested",
            post(handlers::apply_suggested_service_price),
        )
        .route("/api/plans", get(handlers::list_plans))
        .route("/api/plans/:id", put(handlers::upsert_plan).delete(handlers::delete_plan))
        .route("/api/plans/:id/apply-suggested", post(handlers::apply_suggested_plan_price))
        .route(
            "/api/plans/:id/schedule-increase",
            post(handlers::schedule_increase).delete(handlers::cancel_increase),
        )
        .route(
            "/api/plans/:id/promotional-price",
            post(handlers::derive_promotional_price),
        )
        .route("/api/analysis", get(handlers::get_analysis))
        .route(
            "/api/adjustments/economy-wide",
            get(handlers::preview_economy_wide_increase).post(handlers::apply_economy_wide_increase),
        )
        .route(
            "/api/auto-increase/policy",
            get(handlers::get_policy).put(handlers::update_policy),
        )
        .route("/api/auto-increase/run", post(handlers::run_due_increases))
        .route("/api/notifications", get(handlers::list_notifications))
        .route("/api/draft", get(handlers::get_draft_status))
        .route("/api/draft/save", post(handlers::save_draft))
        .route("/api/draft/revert", post(handlers::revert_draft))
        .route("/api/metrics", get(handlers::get_metrics))
}

/// Creates and configures the application router
/// Adds Swagger UI, request tracing and CORS
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
