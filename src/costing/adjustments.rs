// Price-Adjustment Operations
//
// Operator-triggered edits to the working catalog: applying a suggested price,
// repricing everything after a fixed-cost increase and deriving the
// promotional "from" price of a plan.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::costing::analysis::AnalysisResult;
use crate::costing::error::{CostingError, CostingResult};
use crate::costing::models::{Catalog, SubscriptionPlan};
use crate::costing::parsing::{format_currency, parse_currency};
use crate::costing::rounding::{round_currency, round_up_to_990};

/// Price change made to a single service or plan
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceChange {
    pub id: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
}

impl PriceChange {
    pub fn changed(&self) -> bool {
        self.previous_price != self.new_price
    }
}

/// Result of an economy-wide repricing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EconomyWideOutcome {
    /// False when the percentage did not allow a repricing
    pub applied: bool,
    pub percentage: Decimal,
    pub services_updated: usize,
    pub plans_updated: usize,
}

/// Price adjustments over a catalog draft
pub struct PriceAdjuster;

impl PriceAdjuster {
    /// Set a plan's price to its suggested minimum (already ending in .90)
    pub fn apply_suggested_plan_price(
        catalog: &mut Catalog,
        analysis: &AnalysisResult,
        plan_id: &str,
    ) -> CostingResult<PriceChange> {
        let suggested = analysis
            .plan(plan_id)
            .map(|plan| plan.suggested_minimum_price)
            .ok_or_else(|| CostingError::PlanNotFound(plan_id.to_string()))?;
        let plan = catalog
            .plan_mut(plan_id)
            .ok_or_else(|| CostingError::PlanNotFound(plan_id.to_string()))?;

        let change = PriceChange {
            id: plan.id.clone(),
            previous_price: plan.price,
            new_price: suggested,
        };
        plan.price = suggested;

        tracing::info!(
            "Applied suggested price to plan {}: {} -> {}",
            change.id,
            change.previous_price,
            change.new_price
        );
        Ok(change)
    }

    /// Set a service's price to its suggested price, rounded to cents only
    pub fn apply_suggested_service_price(
        catalog: &mut Catalog,
        analysis: &AnalysisResult,
        service_id: &str,
    ) -> CostingResult<PriceChange> {
        let suggested = analysis
            .service(service_id)
            .map(|service| round_currency(service.suggested_price))
            .ok_or_else(|| CostingError::ServiceNotFound(service_id.to_string()))?;
        let service = catalog
            .service_mut(service_id)
            .ok_or_else(|| CostingError::ServiceNotFound(service_id.to_string()))?;

        let change = PriceChange {
            id: service.id.clone(),
            previous_price: parse_currency(&service.price),
            new_price: suggested,
        };
        service.price = format_currency(suggested);

        tracing::info!(
            "Applied suggested price to service {}: {} -> {}",
            change.id,
            change.previous_price,
            change.new_price
        );
        Ok(change)
    }

    /// Percentage by which the working fixed cost exceeds the committed one
    ///
    /// `None` unless fixed costs actually rose from a positive base.
    pub fn economy_wide_increase_percentage(working_fixed_cost: Decimal, committed_fixed_cost: Decimal) -> Option<Decimal> {
        if committed_fixed_cost <= Decimal::ZERO || working_fixed_cost <= committed_fixed_cost {
            return None;
        }
        (working_fixed_cost - committed_fixed_cost)
            .checked_div(committed_fixed_cost)
            .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
    }

    /// Multiply every service and plan price by `1 + percentage/100`
    ///
    /// Service prices are rounded to cents; plan prices and promotional
    /// prices follow the .90 ending rule. A non-positive percentage changes
    /// nothing.
    pub fn apply_economy_wide_increase(catalog: &mut Catalog, percentage: Decimal) -> EconomyWideOutcome {
        if percentage <= Decimal::ZERO {
            tracing::debug!("Economy-wide increase of {}% skipped", percentage);
            return EconomyWideOutcome {
                applied: false,
                percentage,
                services_updated: 0,
                plans_updated: 0,
            };
        }

        let multiplier = Decimal::ONE.saturating_add(percentage / Decimal::ONE_HUNDRED);

        for service in catalog.services.iter_mut() {
            let new_price = round_currency(parse_currency(&service.price).saturating_mul(multiplier));
            service.price = format_currency(new_price);
        }

        for plan in catalog.plans.iter_mut() {
            plan.price = round_up_to_990(plan.price.saturating_mul(multiplier));
            plan.original_price = plan
                .original_price
                .map(|original| round_up_to_990(original.saturating_mul(multiplier)));
        }

        tracing::info!(
            "Applied economy-wide increase of {}% to {} services and {} plans",
            percentage.round_dp(2),
            catalog.services.len(),
            catalog.plans.len()
        );

        EconomyWideOutcome {
            applied: true,
            percentage,
            services_updated: catalog.services.len(),
            plans_updated: catalog.plans.len(),
        }
    }

    /// Derive the "from" price shown next to a discounted plan price
    ///
    /// Returns the new original price, or `None` when the plan has no positive
    /// discount (the plan is left as it is).
    pub fn derive_promotional_price(plan: &mut SubscriptionPlan) -> Option<Decimal> {
        let discount = plan.discount_or_zero();
        if discount <= Decimal::ZERO {
            return None;
        }

        let multiplier = Decimal::ONE.saturating_add(discount / Decimal::ONE_HUNDRED);
        let original = round_up_to_990(plan.price.saturating_mul(multiplier));
        plan.original_price = Some(original);
        Some(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::models::{FinancialSettings, IncludedService, Service, Staff};
    use crate::costing::types::AccessLevel;
    use rust_decimal_macros::dec;

    fn settings() -> FinancialSettings {
        FinancialSettings {
            work_days_in_month: 20,
            default_commission: dec!(10),
            plan_safety_margin: dec!(30),
            card_fee_percentage: dec!(3),
            tax_on_services_percentage: dec!(6),
            salary_per_employee: dec!(10000),
            ..FinancialSettings::default()
        }
    }

    fn staff() -> Vec<Staff> {
        vec![Staff {
            id: "pro".to_string(),
            name: "Pro".to_string(),
            access_level: AccessLevel::Professional,
        }]
    }

    fn service(id: &str, price: &str) -> Service {
        Service {
            id: id.to_string(),
            name: id.to_string(),
            price: price.to_string(),
            duration: "30".to_string(),
            product_cost: dec!(5),
        }
    }

    fn plan(id: &str, price: Decimal) -> SubscriptionPlan {
        SubscriptionPlan {
            id: id.to_string(),
            name: id.to_string(),
            price,
            original_price: None,
            discount_percentage: None,
            included_services: vec![IncludedService {
                service_id: "cut".to_string(),
                quantity: 2,
            }],
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            services: vec![service("cut", "R$ 50,00")],
            plans: vec![plan("duo", dec!(80))],
        }
    }

    #[test]
    fn test_apply_suggested_plan_price() {
        let mut catalog = catalog();
        let analysis = AnalysisResult::compute(&settings(), &staff(), &catalog);

        let change = PriceAdjuster::apply_suggested_plan_price(&mut catalog, &analysis, "duo").unwrap();

        assert_eq!(change.previous_price, dec!(80));
        assert_eq!(change.new_price, dec!(119.90));
        assert!(change.changed());
        assert_eq!(catalog.plan("duo").unwrap().price, dec!(119.90));
    }

    #[test]
    fn test_apply_suggested_plan_price_twice_is_stable() {
        let mut catalog = catalog();
        let analysis = AnalysisResult::compute(&settings(), &staff(), &catalog);
        PriceAdjuster::apply_suggested_plan_price(&mut catalog, &analysis, "duo").unwrap();

        let analysis = AnalysisResult::compute(&settings(), &staff(), &catalog);
        let change = PriceAdjuster::apply_suggested_plan_price(&mut catalog, &analysis, "duo").unwrap();

        assert!(!change.changed());
    }

    #[test]
    fn test_apply_suggested_service_price_keeps_cents() {
        let mut catalog = catalog();
        let analysis = AnalysisResult::compute(&settings(), &staff(), &catalog);

        let change = PriceAdjuster::apply_suggested_service_price(&mut catalog, &analysis, "cut").unwrap();

        // 45.75 * 1.3 = 59.475, no .90 rule for services
        assert_eq!(change.new_price, dec!(59.48));
        assert_eq!(catalog.service("cut").unwrap().price, "R$ 59,48");
    }

    #[test]
    fn test_apply_suggested_unknown_ids() {
        let mut catalog = catalog();
        let analysis = AnalysisResult::compute(&settings(), &staff(), &catalog);

        let result = PriceAdjuster::apply_suggested_plan_price(&mut catalog, &analysis, "missing");
        assert!(matches!(result, Err(CostingError::PlanNotFound(id)) if id == "missing"));

        let result = PriceAdjuster::apply_suggested_service_price(&mut catalog, &analysis, "missing");
        assert!(matches!(result, Err(CostingError::ServiceNotFound(_))));
    }

    #[test]
    fn test_increase_percentage_only_when_costs_rise() {
        assert_eq!(
            PriceAdjuster::economy_wide_increase_percentage(dec!(10500), dec!(10000)),
            Some(dec!(5))
        );
        assert_eq!(PriceAdjuster::economy_wide_increase_percentage(dec!(10000), dec!(10000)), None);
        assert_eq!(PriceAdjuster::economy_wide_increase_percentage(dec!(9000), dec!(10000)), None);
        assert_eq!(PriceAdjuster::economy_wide_increase_percentage(dec!(500), Decimal::ZERO), None);
    }

    #[test]
    fn test_economy_wide_increase_on_service() {
        let mut catalog = Catalog {
            services: vec![service("s", "100")],
            plans: vec![],
        };

        let outcome = PriceAdjuster::apply_economy_wide_increase(&mut catalog, dec!(5));

        assert!(outcome.applied);
        assert_eq!(outcome.services_updated, 1);
        assert_eq!(catalog.services[0].price, "R$ 105,00");
    }

    #[test]
    fn test_economy_wide_increase_on_plans_uses_990_rule() {
        let mut catalog = catalog();
        catalog.plans[0].price = dec!(100);
        catalog.plans[0].original_price = Some(dec!(129.90));

        PriceAdjuster::apply_economy_wide_increase(&mut catalog, dec!(5));

        // 105.00 -> 109.90, 136.395 -> 139.90
        assert_eq!(catalog.plans[0].price, dec!(109.90));
        assert_eq!(catalog.plans[0].original_price, Some(dec!(139.90)));
        assert_eq!(catalog.services[0].price, "R$ 52,50");
    }

    #[test]
    fn test_economy_wide_increase_non_positive_is_noop() {
        let mut catalog = catalog();
        let before = catalog.clone();

        let outcome = PriceAdjuster::apply_economy_wide_increase(&mut catalog, Decimal::ZERO);
        assert!(!outcome.applied);
        let outcome = PriceAdjuster::apply_economy_wide_increase(&mut catalog, dec!(-3));
        assert!(!outcome.applied);

        assert_eq!(catalog, before);
    }

    #[test]
    fn test_derive_promotional_price() {
        let mut plan = plan("promo", dec!(99.90));
        plan.discount_percentage = Some(dec!(20));

        let original = PriceAdjuster::derive_promotional_price(&mut plan);

        // 99.90 * 1.2 = 119.88
        assert_eq!(original, Some(dec!(119.90)));
        assert_eq!(plan.original_price, Some(dec!(119.90)));
    }

    #[test]
    fn test_derive_promotional_price_without_discount() {
        let mut plan = plan("plain", dec!(99.90));
        plan.original_price = Some(dec!(150));

        assert_eq!(PriceAdjuster::derive_promotional_price(&mut plan), None);
        assert_eq!(plan.original_price, Some(dec!(150)));
    }
}
