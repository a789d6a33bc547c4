// Service Profitability Calculator
//
// Per catalog service: variable costs charged on the price, the share of fixed
// cost carried by its duration, profit, value per minute and a suggested price.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::costing::models::{FinancialSettings, Service};
use crate::costing::parsing::{parse_currency, parse_duration};

/// Rates taken from the settings, already divided by 100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRates {
    pub commission: Decimal,
    pub card_fee: Decimal,
    pub tax: Decimal,
    pub safety_margin: Decimal,
}

impl CostRates {
    pub fn from_settings(settings: &FinancialSettings) -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        Self {
            commission: settings.default_commission / hundred,
            card_fee: settings.card_fee_percentage / hundred,
            tax: settings.tax_on_services_percentage / hundred,
            safety_margin: settings.plan_safety_margin / hundred,
        }
    }

    /// Multiplier applied to a cost to reach its suggested price
    pub fn margin_multiplier(&self) -> Decimal {
        Decimal::ONE + self.safety_margin
    }
}

/// Profitability figures for one service
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ServiceAnalysis {
    pub service_id: String,
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: u32,
    pub product_cost: Decimal,
    pub commission_cost: Decimal,
    pub card_fee_cost: Decimal,
    pub tax_cost: Decimal,
    /// Product cost plus commission, card fee and tax on the price
    pub variable_costs: Decimal,
    /// Fixed cost per minute times the service duration
    pub prorated_fixed_cost: Decimal,
    pub total_operational_cost: Decimal,
    pub contribution_margin: Decimal,
    pub profit: Decimal,
    /// Profit per minute of chair time
    pub vpm: Decimal,
    pub suggested_price: Decimal,
    pub is_danger: bool,
    pub is_warning: bool,
}

/// Calculator for per-service profitability
pub struct ServiceProfitabilityCalculator;

impl ServiceProfitabilityCalculator {
    /// Analyze a single service
    ///
    /// Never fails: an unparseable price or duration counts as zero, and a
    /// negative price simply shows up as a loss.
    pub fn analyze(service: &Service, cost_per_minute: Decimal, rates: &CostRates) -> ServiceAnalysis {
        let price = parse_currency(&service.price);
        let duration_minutes = parse_duration(&service.duration);
        let minutes = Decimal::from(duration_minutes);

        // Arithmetic saturates at the bounds of Decimal
        let commission_cost = price.saturating_mul(rates.commission);
        let card_fee_cost = price.saturating_mul(rates.card_fee);
        let tax_cost = price.saturating_mul(rates.tax);
        let variable_costs = service
            .product_cost
            .saturating_add(commission_cost)
            .saturating_add(card_fee_cost)
            .saturating_add(tax_cost);

        let prorated_fixed_cost = cost_per_minute.saturating_mul(minutes);
        let total_operational_cost = variable_costs.saturating_add(prorated_fixed_cost);
        let contribution_margin = price.saturating_sub(variable_costs);
        let profit = price.saturating_sub(total_operational_cost);

        let vpm = profit.checked_div(minutes).unwrap_or(Decimal::ZERO);

        let suggested_price = total_operational_cost.saturating_mul(rates.margin_multiplier());
        let is_danger = profit <= Decimal::ZERO;
        let is_warning = price < suggested_price && profit > Decimal::ZERO;

        ServiceAnalysis {
            service_id: service.id.clone(),
            name: service.name.clone(),
            price,
            duration_minutes,
            product_cost: service.product_cost,
            commission_cost,
            card_fee_cost,
            tax_cost,
            variable_costs,
            prorated_fixed_cost,
            total_operational_cost,
            contribution_margin,
            profit,
            vpm,
            suggested_price,
            is_danger,
            is_warning,
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// profit = price - total cost and total cost = variable + prorated fixed
    #[test]
    fn prop_profit_consistency() {
        proptest!(|(
            price_cents in -10_000i64..=1_000_000,
            minutes in 0u32..=480,
            product_cents in 0u32..=50_000,
            rate_millis in 0u64..=5_000,
            commission in 0u32..=100,
            margin in 0u32..=200
        )| {
            let service = Service {
                id: "s".to_string(),
                name: "s".to_string(),
                price: (Decimal::from(price_cents) / Decimal::from(100)).to_string(),
                duration: minutes.to_string(),
                product_cost: Decimal::from(product_cents) / Decimal::from(100),
            };
            let rates = CostRates {
                commission: Decimal::from(commission) / Decimal::ONE_HUNDRED,
                card_fee: Decimal::new(3, 2),
                tax: Decimal::new(6, 2),
                safety_margin: Decimal::from(margin) / Decimal::ONE_HUNDRED,
            };
            let cost_per_minute = Decimal::from(rate_millis) / Decimal::from(1000);

            let analysis = ServiceProfitabilityCalculator::analyze(&service, cost_per_minute, &rates);

            prop_assert_eq!(analysis.profit, analysis.price - analysis.total_operational_cost);
            prop_assert_eq!(
                analysis.total_operational_cost,
                analysis.variable_costs + analysis.prorated_fixed_cost
            );
            prop_assert_eq!(analysis.is_danger, analysis.profit <= Decimal::ZERO);
        });
    }
}
