// Scheduled price increases
//
// Plans move Normal -> ScheduledForIncrease -> Normal. On the policy's trigger
// day a scheduled plan either gets its suggested price applied automatically
// or, with the policy disabled, asks the operator to apply it.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::costing::analysis::AnalysisResult;
use crate::costing::error::{CostingError, CostingResult};
use crate::costing::models::Catalog;
use crate::costing::notification::PriceIncreaseEvent;
use crate::costing::types::IncreaseState;

pub const DEFAULT_TRIGGER_DAY: u32 = 25;

/// Global auto-increase toggle and the day of the month it fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AutoIncreasePolicy {
    pub enabled: bool,
    #[validate(range(min = 1, max = 31))]
    #[schema(example = 25)]
    pub trigger_day: u32,
}

impl Default for AutoIncreasePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_day: DEFAULT_TRIGGER_DAY,
        }
    }
}

impl AutoIncreasePolicy {
    pub fn ensure_valid(&self) -> CostingResult<()> {
        self.validate().map_err(|_| {
            CostingError::InvalidPolicy(format!("trigger day must be 1-31, got {}", self.trigger_day))
        })
    }

    /// Day of `today`'s month the trigger fires on
    ///
    /// A trigger day past the end of a short month fires on its last day.
    pub fn effective_trigger_day(&self, today: NaiveDate) -> u32 {
        self.trigger_day.min(last_day_of_month(today))
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        today.day() == self.effective_trigger_day(today)
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Operator or scheduler action on a plan's increase state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncreaseAction {
    Schedule,
    Apply,
    Cancel,
}

impl fmt::Display for IncreaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncreaseAction::Schedule => write!(f, "schedule"),
            IncreaseAction::Apply => write!(f, "apply"),
            IncreaseAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Transitions of the per-plan increase state
pub struct IncreaseStateMachine;

impl IncreaseStateMachine {
    /// Check whether `action` is allowed in state `from`
    ///
    /// # Valid Transitions
    /// - Normal + Schedule → ScheduledForIncrease
    /// - ScheduledForIncrease + Schedule → ScheduledForIncrease (idempotent)
    /// - ScheduledForIncrease + Apply → Normal
    /// - ScheduledForIncrease + Cancel → Normal
    /// - Normal + Cancel → Normal (idempotent)
    pub fn is_valid_transition(from: IncreaseState, action: IncreaseAction) -> bool {
        !matches!((from, action), (IncreaseState::Normal, IncreaseAction::Apply))
    }

    pub fn transition(from: IncreaseState, action: IncreaseAction) -> Result<IncreaseState, String> {
        if !Self::is_valid_transition(from, action) {
            return Err(format!("Invalid increase transition: cannot {} a plan in state {}", action, from));
        }

        Ok(match action {
            IncreaseAction::Schedule => IncreaseState::ScheduledForIncrease,
            IncreaseAction::Apply | IncreaseAction::Cancel => IncreaseState::Normal,
        })
    }
}

/// Increase state of every plan that is not `Normal`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IncreaseSchedule {
    #[serde(default)]
    plans: BTreeMap<String, IncreaseState>,
}

impl IncreaseSchedule {
    pub fn state(&self, plan_id: &str) -> IncreaseState {
        self.plans.get(plan_id).copied().unwrap_or_default()
    }

    /// Apply an action to a plan, returning its new state
    pub fn apply(&mut self, plan_id: &str, action: IncreaseAction) -> Result<IncreaseState, String> {
        let next = IncreaseStateMachine::transition(self.state(plan_id), action)?;
        match next {
            IncreaseState::Normal => {
                self.plans.remove(plan_id);
            }
            IncreaseState::ScheduledForIncrease => {
                self.plans.insert(plan_id.to_string(), next);
            }
        }
        Ok(next)
    }

    /// Return a plan to `Normal` whatever its state
    pub fn reset(&mut self, plan_id: &str) {
        self.plans.remove(plan_id);
    }

    /// Scheduled plan ids in ascending order
    pub fn scheduled(&self) -> Vec<String> {
        self.plans
            .iter()
            .filter(|(_, state)| **state == IncreaseState::ScheduledForIncrease)
            .map(|(plan_id, _)| plan_id.clone())
            .collect()
    }
}

/// What happened to one scheduled plan during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncreaseOutcome {
    /// Suggested price applied and an event emitted
    Applied,
    /// Due, but the policy is disabled; the plan stays scheduled
    ManualActionRequired,
    NotDue,
    /// Current price already meets the suggestion; the plan returns to normal
    NoLongerNeeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IncreaseRunEntry {
    pub plan_id: String,
    pub outcome: IncreaseOutcome,
    pub current_price: Decimal,
    pub suggested_price: Decimal,
    pub event: Option<PriceIncreaseEvent>,
}

/// Evaluates scheduled plans against the policy
pub struct AutoIncreaseRunner;

impl AutoIncreaseRunner {
    /// Evaluate every scheduled plan for `today`
    ///
    /// 1. Plans missing from the catalog or the analysis are unscheduled
    /// 2. Off the trigger day nothing changes (`NotDue`)
    /// 3. A price already at or above the suggestion needs nothing (`NoLongerNeeded`)
    /// 4. With the policy disabled the operator is prompted (`ManualActionRequired`)
    /// 5. Otherwise the suggested price is applied (`Applied`)
    pub fn run_due_increases(
        policy: &AutoIncreasePolicy,
        schedule: &mut IncreaseSchedule,
        catalog: &mut Catalog,
        analysis: &AnalysisResult,
        today: NaiveDate,
    ) -> Vec<IncreaseRunEntry> {
        let due = policy.is_due(today);
        let mut entries = Vec::new();

        for plan_id in schedule.scheduled() {
            let suggested_price = analysis.plan(&plan_id).map(|plan| plan.suggested_minimum_price);
            let (Some(plan), Some(suggested_price)) = (catalog.plan_mut(&plan_id), suggested_price) else {
                tracing::debug!("Scheduled plan {} no longer exists, unscheduling", plan_id);
                schedule.reset(&plan_id);
                continue;
            };

            let current_price = plan.price;
            let mut entry = IncreaseRunEntry {
                plan_id: plan_id.clone(),
                outcome: IncreaseOutcome::NotDue,
                current_price,
                suggested_price,
                event: None,
            };

            if !due {
                entries.push(entry);
                continue;
            }

            if suggested_price <= current_price {
                schedule.reset(&plan_id);
                entry.outcome = IncreaseOutcome::NoLongerNeeded;
            } else if !policy.enabled {
                tracing::info!("Plan {} is due for a price increase, manual action required", plan_id);
                entry.outcome = IncreaseOutcome::ManualActionRequired;
            } else {
                plan.price = suggested_price;
                schedule.reset(&plan_id);
                entry.outcome = IncreaseOutcome::Applied;
                entry.event = Some(PriceIncreaseEvent::new(
                    plan.id.clone(),
                    plan.name.clone(),
                    current_price,
                    suggested_price,
                    today,
                ));
                tracing::info!(
                    "Auto-increase applied to plan {}: {} -> {}",
                    plan_id,
                    current_price,
                    suggested_price
                );
            }

            entries.push(entry);
        }

        entries
    }
}
