// Pricing Workspace
//
// The editing session: drafts of the settings and the catalog, the staff
// roster, the increase schedule and the auto-increase policy. Every analysis
// reads the working drafts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::costing::adjustments::{EconomyWideOutcome, PriceAdjuster, PriceChange};
use crate::costing::analysis::AnalysisResult;
use crate::costing::auto_increase::{
    AutoIncreasePolicy, AutoIncreaseRunner, IncreaseAction, IncreaseRunEntry, IncreaseSchedule,
};
use crate::costing::draft::Draft;
use crate::costing::error::{CostingError, CostingResult};
use crate::costing::fixed_costs::FixedCostAggregator;
use crate::costing::metrics::PerformanceMetrics;
use crate::costing::models::{Catalog, FinancialSettings, Service, Staff, SubscriptionPlan};
use crate::costing::notification::PriceIncreaseNotifier;
use crate::costing::store::{WorkspaceSnapshot, WorkspaceStore};
use crate::costing::types::{DraftState, IncreaseState};
use crate::costing::CostAnalysisEngine;

/// Draft state of every edited document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DraftStatus {
    pub settings: DraftState,
    pub catalog: DraftState,
    pub schedule: DraftState,
}

#[derive(Debug)]
pub struct PricingWorkspace {
    settings: Draft<FinancialSettings>,
    catalog: Draft<Catalog>,
    /// Saved and reverted together with the catalog
    schedule: Draft<IncreaseSchedule>,
    /// Fixed cost the working catalog was last repriced against
    repriced_for_fixed_cost: Option<Decimal>,
    staff: Vec<Staff>,
    policy: AutoIncreasePolicy,
    engine: CostAnalysisEngine,
}

impl PricingWorkspace {
    /// Open a workspace on a committed snapshot
    ///
    /// Settings are clamped on the way in; a policy outside its range is rejected.
    pub fn from_snapshot(snapshot: WorkspaceSnapshot, metrics: PerformanceMetrics) -> CostingResult<Self> {
        let settings = Self::checked_settings(snapshot.settings)?;
        snapshot.policy.ensure_valid()?;

        tracing::info!(
            "Workspace opened with {} services, {} plans and {} staff",
            snapshot.catalog.services.len(),
            snapshot.catalog.plans.len(),
            snapshot.staff.len()
        );

        Ok(Self {
            settings: Draft::new(settings),
            catalog: Draft::new(snapshot.catalog),
            schedule: Draft::new(snapshot.schedule),
            repriced_for_fixed_cost: None,
            staff: snapshot.staff,
            policy: snapshot.policy,
            engine: CostAnalysisEngine::with_metrics(metrics),
        })
    }

    fn checked_settings(settings: FinancialSettings) -> CostingResult<FinancialSettings> {
        let settings = settings.clamped();
        if settings.work_days_in_month < 1 {
            return Err(CostingError::InvalidSettings(
                "work_days_in_month must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Working state as a snapshot
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            settings: self.settings.working().clone(),
            staff: self.staff.clone(),
            catalog: self.catalog.working().clone(),
            policy: self.policy,
            schedule: self.schedule.working().clone(),
        }
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        self.engine.metrics()
    }

    // Settings and roster

    pub fn settings(&self) -> &FinancialSettings {
        self.settings.working()
    }

    pub fn committed_settings(&self) -> &FinancialSettings {
        self.settings.committed()
    }

    /// Replace the working settings, clamped into range
    pub fn update_settings(&mut self, settings: FinancialSettings) -> CostingResult<&FinancialSettings> {
        let settings = Self::checked_settings(settings)?;
        self.settings.set_working(settings);
        Ok(self.settings.working())
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn replace_staff(&mut self, staff: Vec<Staff>) {
        tracing::info!("Staff roster replaced with {} entries", staff.len());
        self.staff = staff;
    }

    // Catalog

    pub fn catalog(&self) -> &Catalog {
        self.catalog.working()
    }

    pub fn upsert_service(&mut self, service: Service) {
        self.catalog.working_mut().upsert_service(service);
    }

    /// Remove a service; plans keep their lines for it and simply skip them
    pub fn remove_service(&mut self, service_id: &str) -> CostingResult<Service> {
        self.catalog
            .working_mut()
            .remove_service(service_id)
            .ok_or_else(|| CostingError::ServiceNotFound(service_id.to_string()))
    }

    pub fn upsert_plan(&mut self, plan: SubscriptionPlan) {
        self.catalog.working_mut().upsert_plan(plan);
    }

    /// Remove a plan together with its increase schedule
    pub fn remove_plan(&mut self, plan_id: &str) -> CostingResult<SubscriptionPlan> {
        let plan = self
            .catalog
            .working_mut()
            .remove_plan(plan_id)
            .ok_or_else(|| CostingError::PlanNotFound(plan_id.to_string()))?;
        self.schedule.working_mut().reset(plan_id);
        Ok(plan)
    }

    // Analysis

    pub fn analyze(&self) -> AnalysisResult {
        self.engine.analyze(self.settings.working(), &self.staff, self.catalog.working())
    }

    // Adjustments

    /// Apply the suggested minimum price to a plan
    ///
    /// A plan scheduled for an increase goes back to normal.
    pub fn apply_suggested_plan_price(&mut self, plan_id: &str) -> CostingResult<PriceChange> {
        let analysis = self.analyze();
        let change = PriceAdjuster::apply_suggested_plan_price(self.catalog.working_mut(), &analysis, plan_id)?;
        self.schedule.working_mut().reset(plan_id);
        self.engine.metrics().record_adjustment();
        Ok(change)
    }

    pub fn apply_suggested_service_price(&mut self, service_id: &str) -> CostingResult<PriceChange> {
        let analysis = self.analyze();
        let change =
            PriceAdjuster::apply_suggested_service_price(self.catalog.working_mut(), &analysis, service_id)?;
        self.engine.metrics().record_adjustment();
        Ok(change)
    }

    /// Fixed cost increase not yet reflected in the working catalog
    ///
    /// Measured against the committed settings, or against the fixed cost of
    /// the last economy-wide repricing when one is pending in the draft.
    pub fn economy_wide_increase_percentage(&self) -> Option<Decimal> {
        let working = FixedCostAggregator::total_fixed_cost(self.settings.working(), &self.staff);
        let baseline = self
            .repriced_for_fixed_cost
            .unwrap_or_else(|| FixedCostAggregator::total_fixed_cost(self.settings.committed(), &self.staff));
        PriceAdjuster::economy_wide_increase_percentage(working, baseline)
    }

    /// Reprice the catalog by the current fixed cost increase, if there is one
    ///
    /// Repeating it without a further cost change is a no-op.
    pub fn apply_economy_wide_increase(&mut self) -> EconomyWideOutcome {
        let percentage = self.economy_wide_increase_percentage().unwrap_or(Decimal::ZERO);
        let outcome = PriceAdjuster::apply_economy_wide_increase(self.catalog.working_mut(), percentage);
        if outcome.applied {
            self.repriced_for_fixed_cost =
                Some(FixedCostAggregator::total_fixed_cost(self.settings.working(), &self.staff));
            self.engine.metrics().record_adjustment();
        }
        outcome
    }

    pub fn derive_promotional_price(&mut self, plan_id: &str) -> CostingResult<Option<Decimal>> {
        let plan = self
            .catalog
            .working_mut()
            .plan_mut(plan_id)
            .ok_or_else(|| CostingError::PlanNotFound(plan_id.to_string()))?;
        Ok(PriceAdjuster::derive_promotional_price(plan))
    }

    // Scheduled increases

    pub fn increase_state(&self, plan_id: &str) -> IncreaseState {
        self.schedule.working().state(plan_id)
    }

    pub fn schedule_increase(&mut self, plan_id: &str) -> CostingResult<IncreaseState> {
        self.change_increase_state(plan_id, IncreaseAction::Schedule)
    }

    pub fn cancel_increase(&mut self, plan_id: &str) -> CostingResult<IncreaseState> {
        self.change_increase_state(plan_id, IncreaseAction::Cancel)
    }

    fn change_increase_state(&mut self, plan_id: &str, action: IncreaseAction) -> CostingResult<IncreaseState> {
        if self.catalog.working().plan(plan_id).is_none() {
            return Err(CostingError::PlanNotFound(plan_id.to_string()));
        }
        // Schedule and Cancel are accepted from both states
        let state = self
            .schedule
            .working_mut()
            .apply(plan_id, action)
            .map_err(CostingError::InvalidPolicy)?;
        tracing::info!("Plan {} increase state is now {}", plan_id, state);
        Ok(state)
    }

    pub fn policy(&self) -> AutoIncreasePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: AutoIncreasePolicy) -> CostingResult<()> {
        policy.ensure_valid()?;
        tracing::info!(
            "Auto-increase policy set: enabled={}, trigger_day={}",
            policy.enabled,
            policy.trigger_day
        );
        self.policy = policy;
        Ok(())
    }

    pub fn scheduled_plans(&self) -> Vec<String> {
        self.schedule.working().scheduled()
    }

    /// Evaluate scheduled plans for `today` and notify every applied increase
    pub fn run_due_increases(&mut self, today: NaiveDate, notifier: &dyn PriceIncreaseNotifier) -> Vec<IncreaseRunEntry> {
        let analysis = self.analyze();
        let entries = AutoIncreaseRunner::run_due_increases(
            &self.policy,
            self.schedule.working_mut(),
            self.catalog.working_mut(),
            &analysis,
            today,
        );

        for event in entries.iter().filter_map(|entry| entry.event.as_ref()) {
            self.engine.metrics().record_adjustment();
            notifier.notify(event);
        }

        entries
    }

    // Draft lifecycle

    pub fn draft_status(&self) -> DraftStatus {
        DraftStatus {
            settings: self.settings.state(),
            catalog: self.catalog.state(),
            schedule: self.schedule.state(),
        }
    }

    /// Persist the working state once
    ///
    /// On success every draft is committed. On failure all of them are
    /// reverted and the store error is returned.
    pub fn save(&mut self, store: &dyn WorkspaceStore) -> CostingResult<()> {
        let snapshot = self.snapshot();
        let result = self.catalog.save_with(|_| store.persist(&snapshot));
        self.repriced_for_fixed_cost = None;

        match result {
            Ok(()) => {
                self.settings.commit();
                self.schedule.commit();
                self.engine.metrics().record_save(true);
                tracing::info!("Workspace saved");
                Ok(())
            }
            Err(e) => {
                self.settings.revert();
                self.schedule.revert();
                self.engine.metrics().record_save(false);
                tracing::warn!("Workspace save failed, draft discarded: {}", e);
                Err(e)
            }
        }
    }

    /// Discard every unsaved edit to settings, catalog and schedule
    pub fn revert(&mut self) {
        self.settings.revert();
        self.catalog.revert();
        self.schedule.revert();
        self.repriced_for_fixed_cost = None;
        tracing::info!("Workspace draft reverted");
    }
}
