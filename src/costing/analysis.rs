// Analysis result
//
// One computation over settings, roster and catalog, read through three views:
// services, plans by profitability and plans by perceived discount.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::costing::allocation::PerMinuteAllocator;
use crate::costing::fixed_costs::{FixedCostAggregator, FixedCostBreakdown};
use crate::costing::models::{Catalog, FinancialSettings, Staff};
use crate::costing::plan_analysis::{PlanAnalysis, PlanDiscountView, PlanProfitabilityCalculator};
use crate::costing::service_analysis::{CostRates, ServiceAnalysis, ServiceProfitabilityCalculator};

/// Every derived figure for one set of inputs
///
/// Records are kept in catalog order; the sorted views copy references only.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalysisResult {
    pub fixed_costs: FixedCostBreakdown,
    pub cost_per_minute: Decimal,
    pub services: Vec<ServiceAnalysis>,
    pub plans: Vec<PlanAnalysis>,
    pub discounts: Vec<PlanDiscountView>,
}

impl AnalysisResult {
    /// Run Components A-D in dependency order
    pub fn compute(settings: &FinancialSettings, staff: &[Staff], catalog: &Catalog) -> Self {
        let fixed_costs = FixedCostAggregator::aggregate(settings, staff);
        let cost_per_minute =
            PerMinuteAllocator::cost_per_minute(fixed_costs.total_fixed_cost, settings.work_days_in_month);
        let rates = CostRates::from_settings(settings);

        let services: Vec<ServiceAnalysis> = catalog
            .services
            .iter()
            .map(|service| ServiceProfitabilityCalculator::analyze(service, cost_per_minute, &rates))
            .collect();

        let by_id: HashMap<&str, &ServiceAnalysis> = services
            .iter()
            .map(|analysis| (analysis.service_id.as_str(), analysis))
            .collect();

        let (plans, discounts): (Vec<PlanAnalysis>, Vec<PlanDiscountView>) = catalog
            .plans
            .iter()
            .map(|plan| PlanProfitabilityCalculator::analyze(plan, &by_id, &rates))
            .unzip();

        Self {
            fixed_costs,
            cost_per_minute,
            services,
            plans,
            discounts,
        }
    }

    /// Services in catalog order
    pub fn services(&self) -> &[ServiceAnalysis] {
        &self.services
    }

    /// Plans with the worst value per minute first
    pub fn plans_by_profitability(&self) -> Vec<&PlanAnalysis> {
        let mut plans: Vec<&PlanAnalysis> = self.plans.iter().collect();
        plans.sort_by(|a, b| a.vpm.cmp(&b.vpm));
        plans
    }

    /// Plans with the best perceived discount first
    pub fn plans_by_discount(&self) -> Vec<&PlanDiscountView> {
        let mut discounts: Vec<&PlanDiscountView> = self.discounts.iter().collect();
        discounts.sort_by(|a, b| b.real_discount_percentage.cmp(&a.real_discount_percentage));
        discounts
    }

    pub fn service(&self, service_id: &str) -> Option<&ServiceAnalysis> {
        self.services.iter().find(|analysis| analysis.service_id == service_id)
    }

    pub fn plan(&self, plan_id: &str) -> Option<&PlanAnalysis> {
        self.plans.iter().find(|analysis| analysis.plan_id == plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::models::{IncludedService, Service, SubscriptionPlan};
    use crate::costing::types::{AccessLevel, HealthStatus};
    use rust_decimal_macros::dec;

    fn settings() -> FinancialSettings {
        FinancialSettings {
            work_days_in_month: 20,
            default_commission: dec!(10),
            plan_safety_margin: dec!(30),
            card_fee_percentage: dec!(3),
            tax_on_services_percentage: dec!(6),
            salary_per_employee: dec!(5000),
            ..FinancialSettings::default()
        }
    }

    fn staff() -> Vec<Staff> {
        vec![
            Staff {
                id: "owner".to_string(),
                name: "Owner".to_string(),
                access_level: AccessLevel::SuperAdmin,
            },
            Staff {
                id: "pro".to_string(),
                name: "Pro".to_string(),
                access_level: AccessLevel::Professional,
            },
        ]
    }

    fn plan(id: &str, price: Decimal, lines: &[(&str, u32)]) -> SubscriptionPlan {
        SubscriptionPlan {
            id: id.to_string(),
            name: id.to_string(),
            price,
            original_price: None,
            discount_percentage: None,
            included_services: lines
                .iter()
                .map(|(service_id, quantity)| IncludedService {
                    service_id: service_id.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            services: vec![
                Service {
                    id: "cut".to_string(),
                    name: "Corte".to_string(),
                    price: "R$ 50,00".to_string(),
                    duration: "30".to_string(),
                    product_cost: dec!(5),
                },
                Service {
                    id: "color".to_string(),
                    name: "Coloracao".to_string(),
                    price: "R$ 180,00".to_string(),
                    duration: "1h30".to_string(),
                    product_cost: dec!(40),
                },
            ],
            plans: vec![
                plan("loss", dec!(80), &[("cut", 2)]),
                plan("premium", dec!(400), &[("cut", 2), ("color", 1)]),
                plan("deal", dec!(90), &[("cut", 2)]),
            ],
        }
    }

    #[test]
    fn test_reference_scenario() {
        let result = AnalysisResult::compute(&settings(), &staff(), &catalog());

        assert_eq!(result.fixed_costs.total_fixed_cost, dec!(10000));
        assert_eq!(result.cost_per_minute.round_dp(4), dec!(1.0417));

        let cut = result.service("cut").unwrap();
        assert_eq!(cut.total_operational_cost.round_dp(2), dec!(45.75));
        assert_eq!(cut.profit.round_dp(2), dec!(4.25));

        let loss = result.plan("loss").unwrap();
        assert_eq!(loss.total_operational_cost.round_dp(2), dec!(91.50));
        assert_eq!(loss.health_status, HealthStatus::Danger);
    }

    #[test]
    fn test_services_keep_catalog_order() {
        let result = AnalysisResult::compute(&settings(), &staff(), &catalog());
        let ids: Vec<&str> = result.services().iter().map(|s| s.service_id.as_str()).collect();
        assert_eq!(ids, vec!["cut", "color"]);
    }

    #[test]
    fn test_plans_by_profitability_ascending_vpm() {
        let result = AnalysisResult::compute(&settings(), &staff(), &catalog());
        let ids: Vec<&str> = result
            .plans_by_profitability()
            .iter()
            .map(|p| p.plan_id.as_str())
            .collect();

        assert_eq!(ids, vec!["loss", "deal", "premium"]);
        // the stored records are untouched
        assert_eq!(result.plans[0].plan_id, "loss");
        assert_eq!(result.plans[1].plan_id, "premium");
    }

    #[test]
    fn test_plans_by_discount_descending() {
        let result = AnalysisResult::compute(&settings(), &staff(), &catalog());
        let ids: Vec<&str> = result
            .plans_by_discount()
            .iter()
            .map(|d| d.plan_id.as_str())
            .collect();

        // loss: 20%, deal: 10%, premium: 280 -> 400 is -42.8%
        assert_eq!(ids, vec!["loss", "deal", "premium"]);
    }

    #[test]
    fn test_same_inputs_same_result() {
        let first = AnalysisResult::compute(&settings(), &staff(), &catalog());
        let second = AnalysisResult::compute(&settings(), &staff(), &catalog());
        assert_eq!(first, second);
    }
}
