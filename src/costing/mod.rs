// Costing Engine Module
//
// Cost and pricing analysis for a services business sold both a la carte and
// as subscription plans:
// - Fixed cost aggregation and per-minute allocation
// - Per-service profitability and suggested prices
// - Plan profitability, health classification and perceived discount
// - Price adjustments, scheduled increases and draft/commit editing
//
// The calculators are pure; only the workspace store and the notifier touch
// the outside world.

pub mod error;
pub mod types;
pub mod parsing;
pub mod rounding;
pub mod models;
pub mod fixed_costs;
pub mod allocation;
pub mod service_analysis;
pub mod plan_analysis;
pub mod analysis;
pub mod adjustments;
pub mod draft;
pub mod auto_increase;
pub mod notification;
pub mod metrics;
pub mod store;
pub mod seed;
pub mod workspace;

// Re-export commonly used types for convenience
pub use error::{CostingError, CostingResult};
pub use types::{AccessLevel, DraftState, HealthStatus, IncreaseState};
pub use parsing::{format_currency, parse_currency, parse_duration};
pub use rounding::{round_currency, round_up_to_990};
pub use models::{Catalog, FinancialSettings, IncludedService, Service, Staff, SubscriptionPlan, PRO_LABORE_KEY};
pub use fixed_costs::{FixedCostAggregator, FixedCostBreakdown};
pub use allocation::{PerMinuteAllocator, HOURS_PER_WORKDAY};
pub use service_analysis::{CostRates, ServiceAnalysis, ServiceProfitabilityCalculator};
pub use plan_analysis::{PlanAnalysis, PlanDiscountView, PlanProfitabilityCalculator};
pub use analysis::AnalysisResult;
pub use adjustments::{EconomyWideOutcome, PriceAdjuster, PriceChange};
pub use draft::Draft;
pub use auto_increase::{
    AutoIncreasePolicy,
    AutoIncreaseRunner,
    IncreaseAction,
    IncreaseOutcome,
    IncreaseRunEntry,
    IncreaseSchedule,
    IncreaseStateMachine,
};
pub use notification::{NotificationOutbox, PriceIncreaseEvent, PriceIncreaseNotifier};
pub use metrics::{MetricsSummary, PerformanceMetrics};
pub use store::{load_snapshot_file, InMemoryStore, WorkspaceSnapshot, WorkspaceStore};
pub use workspace::{DraftStatus, PricingWorkspace};

// Cost Analysis Engine
//
// Runs the calculators in dependency order and records how long it took.

/// Cost Analysis Engine
///
/// Produces one `AnalysisResult` per call; nothing is cached between calls,
/// so every edit is reflected in the next analysis.
#[derive(Debug, Clone, Default)]
pub struct CostAnalysisEngine {
    metrics: PerformanceMetrics,
}

impl CostAnalysisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: PerformanceMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Analyze settings, roster and catalog together
    pub fn analyze(&self, settings: &FinancialSettings, staff: &[Staff], catalog: &Catalog) -> AnalysisResult {
        let _timer = self.metrics.start_analysis();
        AnalysisResult::compute(settings, staff, catalog)
    }
}
