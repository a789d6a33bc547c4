// Plan Profitability & Discount Calculator
//
// Aggregates the operational cost of each plan's included services, classifies
// its health and compares it with buying the same services one by one.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::costing::models::SubscriptionPlan;
use crate::costing::rounding::round_up_to_990;
use crate::costing::service_analysis::{CostRates, ServiceAnalysis};
use crate::costing::types::HealthStatus;

/// Profitability figures for one plan
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanAnalysis {
    pub plan_id: String,
    pub name: String,
    pub price: Decimal,
    pub total_operational_cost: Decimal,
    pub total_duration_minutes: u32,
    pub current_profit_or_loss: Decimal,
    pub vpm: Decimal,
    /// Operational cost with the safety margin applied
    pub cost_based_suggested_price: Decimal,
    /// Cost-based price lifted by the promotional discount, ending in .90
    pub suggested_minimum_price: Decimal,
    pub health_status: HealthStatus,
}

/// How a plan compares with buying its services separately
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanDiscountView {
    pub plan_id: String,
    pub name: String,
    pub price: Decimal,
    /// Sum of the included services at their catalog price
    pub a_la_carte_value: Decimal,
    pub savings: Decimal,
    /// Savings as a percentage of the a-la-carte value
    pub real_discount_percentage: Decimal,
}

/// Calculator for plan profitability and perceived discount
pub struct PlanProfitabilityCalculator;

impl PlanProfitabilityCalculator {
    /// Analyze a plan against the per-service analyses
    ///
    /// Included services missing from `services` are skipped and contribute nothing.
    pub fn analyze(
        plan: &SubscriptionPlan,
        services: &HashMap<&str, &ServiceAnalysis>,
        rates: &CostRates,
    ) -> (PlanAnalysis, PlanDiscountView) {
        let mut total_operational_cost = Decimal::ZERO;
        let mut total_duration_minutes: u32 = 0;
        let mut a_la_carte_value = Decimal::ZERO;

        for line in &plan.included_services {
            let Some(service) = services.get(line.service_id.as_str()) else {
                tracing::debug!(
                    "Plan {} references unknown service {}, skipping",
                    plan.id,
                    line.service_id
                );
                continue;
            };

            let quantity = Decimal::from(line.quantity);
            total_operational_cost =
                total_operational_cost.saturating_add(service.total_operational_cost.saturating_mul(quantity));
            total_duration_minutes =
                total_duration_minutes.saturating_add(service.duration_minutes.saturating_mul(line.quantity));
            a_la_carte_value = a_la_carte_value.saturating_add(service.price.saturating_mul(quantity));
        }

        let current_profit_or_loss = plan.price.saturating_sub(total_operational_cost);
        let vpm = current_profit_or_loss
            .checked_div(Decimal::from(total_duration_minutes))
            .unwrap_or(Decimal::ZERO);

        let cost_based_suggested_price = total_operational_cost.saturating_mul(rates.margin_multiplier());
        let discount_multiplier =
            Decimal::ONE.saturating_add(plan.discount_or_zero().checked_div(Decimal::ONE_HUNDRED).unwrap_or(Decimal::ZERO));
        let suggested_minimum_price = round_up_to_990(cost_based_suggested_price.saturating_mul(discount_multiplier));

        let health_status = Self::classify(plan.price, current_profit_or_loss, suggested_minimum_price);

        let savings = a_la_carte_value.saturating_sub(plan.price);
        let real_discount_percentage = if a_la_carte_value > Decimal::ZERO {
            savings
                .checked_div(a_la_carte_value)
                .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        let analysis = PlanAnalysis {
            plan_id: plan.id.clone(),
            name: plan.name.clone(),
            price: plan.price,
            total_operational_cost,
            total_duration_minutes,
            current_profit_or_loss,
            vpm,
            cost_based_suggested_price,
            suggested_minimum_price,
            health_status,
        };
        let discount = PlanDiscountView {
            plan_id: plan.id.clone(),
            name: plan.name.clone(),
            price: plan.price,
            a_la_carte_value,
            savings,
            real_discount_percentage,
        };

        (analysis, discount)
    }

    /// Health classification: a loss is always `Danger`
    pub fn classify(price: Decimal, profit_or_loss: Decimal, suggested_minimum_price: Decimal) -> HealthStatus {
        if profit_or_loss < Decimal::ZERO {
            HealthStatus::Danger
        } else if price < suggested_minimum_price {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::allocation::PerMinuteAllocator;
    use crate::costing::models::{IncludedService, Service};
    use crate::costing::service_analysis::ServiceProfitabilityCalculator;
    use rust_decimal_macros::dec;

    fn rates() -> CostRates {
        CostRates {
            commission: dec!(0.10),
            card_fee: dec!(0.03),
            tax: dec!(0.06),
            safety_margin: dec!(0.30),
        }
    }

    fn reference_service() -> ServiceAnalysis {
        let service = Service {
            id: "svc-cut".to_string(),
            name: "Corte".to_string(),
            price: "R$ 50,00".to_string(),
            duration: "30".to_string(),
            product_cost: dec!(5),
        };
        let cost_per_minute = PerMinuteAllocator::cost_per_minute(dec!(10000), 20);
        ServiceProfitabilityCalculator::analyze(&service, cost_per_minute, &rates())
    }

    fn plan(price: Decimal, lines: &[(&str, u32)]) -> SubscriptionPlan {
        SubscriptionPlan {
            id: "plan-basic".to_string(),
            name: "Basico".to_string(),
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

    #[test]
    fn test_plan_with_loss_is_danger() {
        let service = reference_service();
        let services = HashMap::from([(service.service_id.as_str(), &service)]);

        let (analysis, discount) =
            PlanProfitabilityCalculator::analyze(&plan(dec!(80), &[("svc-cut", 2)]), &services, &rates());

        assert_eq!(analysis.total_operational_cost.round_dp(2), dec!(91.50));
        assert_eq!(analysis.total_duration_minutes, 60);
        assert_eq!(analysis.current_profit_or_loss.round_dp(2), dec!(-11.50));
        assert_eq!(analysis.health_status, HealthStatus::Danger);
        assert_eq!(analysis.suggested_minimum_price, dec!(119.90));

        assert_eq!(discount.a_la_carte_value, dec!(100));
        assert_eq!(discount.savings, dec!(20));
        assert_eq!(discount.real_discount_percentage, dec!(20));
    }

    #[test]
    fn test_profitable_plan_under_suggested_price_is_warning() {
        let service = reference_service();
        let services = HashMap::from([(service.service_id.as_str(), &service)]);

        let (analysis, _) =
            PlanProfitabilityCalculator::analyze(&plan(dec!(100), &[("svc-cut", 2)]), &services, &rates());

        assert!(analysis.current_profit_or_loss > Decimal::ZERO);
        assert_eq!(analysis.health_status, HealthStatus::Warning);
    }

    #[test]
    fn test_plan_at_suggested_price_is_healthy() {
        let service = reference_service();
        let services = HashMap::from([(service.service_id.as_str(), &service)]);

        let (analysis, discount) =
            PlanProfitabilityCalculator::analyze(&plan(dec!(119.90), &[("svc-cut", 2)]), &services, &rates());

        assert_eq!(analysis.health_status, HealthStatus::Healthy);
        assert!(discount.real_discount_percentage < Decimal::ZERO);
    }

    #[test]
    fn test_discount_lifts_suggested_minimum_price() {
        let service = reference_service();
        let services = HashMap::from([(service.service_id.as_str(), &service)]);
        let mut promotional = plan(dec!(80), &[("svc-cut", 2)]);
        promotional.discount_percentage = Some(dec!(20));

        let (analysis, _) = PlanProfitabilityCalculator::analyze(&promotional, &services, &rates());

        // 91.5 * 1.3 * 1.2 = 142.74
        assert_eq!(analysis.suggested_minimum_price, dec!(149.90));
    }

    #[test]
    fn test_dangling_reference_is_skipped() {
        let service = reference_service();
        let services = HashMap::from([(service.service_id.as_str(), &service)]);

        let (with_dangling, _) = PlanProfitabilityCalculator::analyze(
            &plan(dec!(80), &[("svc-cut", 2), ("svc-deleted", 3)]),
            &services,
            &rates(),
        );
        let (without, _) =
            PlanProfitabilityCalculator::analyze(&plan(dec!(80), &[("svc-cut", 2)]), &services, &rates());

        assert_eq!(with_dangling, without);
    }

    #[test]
    fn test_empty_plan() {
        let services = HashMap::new();
        let (analysis, discount) =
            PlanProfitabilityCalculator::analyze(&plan(dec!(50), &[]), &services, &rates());

        assert_eq!(analysis.total_operational_cost, Decimal::ZERO);
        assert_eq!(analysis.vpm, Decimal::ZERO);
        assert_eq!(discount.real_discount_percentage, Decimal::ZERO);
        assert_eq!(analysis.health_status, HealthStatus::Healthy);
    }

    #[test]
    fn test_classify_priority() {
        // loss wins even when the price is above the suggestion
        assert_eq!(
            PlanProfitabilityCalculator::classify(dec!(200), dec!(-1), dec!(109.90)),
            HealthStatus::Danger
        );
        assert_eq!(
            PlanProfitabilityCalculator::classify(dec!(100), dec!(0), dec!(109.90)),
            HealthStatus::Warning
        );
        assert_eq!(
            PlanProfitabilityCalculator::classify(dec!(109.90), dec!(10), dec!(109.90)),
            HealthStatus::Healthy
        );
    }
}
