// Fixed Cost Aggregator
//
// Turns the salary configuration, the staff roster and the fixed expense lines
// into the salon's total monthly fixed cost.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::costing::models::{FinancialSettings, Staff, PRO_LABORE_KEY};

/// Breakdown of the monthly fixed cost
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FixedCostBreakdown {
    /// Number of roster entries included in the salary base
    pub counted_staff: usize,
    /// Salaries of counted staff plus the owner's compensation
    pub total_salaries: Decimal,
    /// Salaries with social charges applied
    pub total_personnel_cost: Decimal,
    /// Every fixed cost line except the owner's compensation
    pub total_other_fixed_costs: Decimal,
    pub total_fixed_cost: Decimal,
}

/// Aggregates personnel and other fixed costs
pub struct FixedCostAggregator;

impl FixedCostAggregator {
    /// Calculate the monthly fixed cost breakdown
    ///
    /// 1. Keep staff whose access level counts toward personnel cost
    /// 2. Sum their individual salary (or the default salary) plus pro-labore
    /// 3. Apply social charges to that salary base
    /// 4. Add every other fixed cost line
    pub fn aggregate(settings: &FinancialSettings, staff: &[Staff]) -> FixedCostBreakdown {
        let counted: Vec<&Staff> = staff
            .iter()
            .filter(|member| member.access_level.counts_toward_personnel_cost())
            .collect();

        let salaries: Decimal = counted
            .iter()
            .map(|member| {
                settings
                    .individual_salaries
                    .get(&member.id)
                    .copied()
                    .unwrap_or(settings.salary_per_employee)
            })
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let total_salaries = salaries.saturating_add(settings.pro_labore());

        let social_charges = Decimal::ONE.saturating_add(settings.social_charges_percentage / Decimal::ONE_HUNDRED);
        let total_personnel_cost = total_salaries.saturating_mul(social_charges);

        let total_other_fixed_costs: Decimal = settings
            .fixed_costs
            .iter()
            .filter(|(category, _)| category.as_str() != PRO_LABORE_KEY)
            .map(|(_, amount)| *amount)
            .fold(Decimal::ZERO, Decimal::saturating_add);

        FixedCostBreakdown {
            counted_staff: counted.len(),
            total_salaries,
            total_personnel_cost,
            total_other_fixed_costs,
            total_fixed_cost: total_personnel_cost.saturating_add(total_other_fixed_costs),
        }
    }

    /// Total monthly fixed cost only
    pub fn total_fixed_cost(settings: &FinancialSettings, staff: &[Staff]) -> Decimal {
        Self::aggregate(settings, staff).total_fixed_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::types::AccessLevel;
    use rust_decimal_macros::dec;

    fn member(id: &str, access_level: AccessLevel) -> Staff {
        Staff {
            id: id.to_string(),
            name: id.to_string(),
            access_level,
        }
    }

    #[test]
    fn test_salaries_without_charges() {
        let settings = FinancialSettings {
            work_days_in_month: 20,
            salary_per_employee: dec!(2500),
            ..FinancialSettings::default()
        };
        let staff = vec![
            member("a", AccessLevel::Admin),
            member("b", AccessLevel::Professional),
            member("c", AccessLevel::Professional),
            member("d", AccessLevel::SuperAdmin),
        ];

        let breakdown = FixedCostAggregator::aggregate(&settings, &staff);

        assert_eq!(breakdown.counted_staff, 4);
        assert_eq!(breakdown.total_salaries, dec!(10000));
        assert_eq!(breakdown.total_fixed_cost, dec!(10000));
    }

    #[test]
    fn test_individual_salary_overrides_default() {
        let mut settings = FinancialSettings {
            salary_per_employee: dec!(2000),
            ..FinancialSettings::default()
        };
        settings.individual_salaries.insert("b".to_string(), dec!(3500));
        let staff = vec![member("a", AccessLevel::Professional), member("b", AccessLevel::Professional)];

        let breakdown = FixedCostAggregator::aggregate(&settings, &staff);

        assert_eq!(breakdown.total_salaries, dec!(5500));
    }

    #[test]
    fn test_other_access_levels_are_excluded() {
        let settings = FinancialSettings {
            salary_per_employee: dec!(2000),
            ..FinancialSettings::default()
        };
        let staff = vec![member("a", AccessLevel::Professional), member("r", AccessLevel::Other)];

        let breakdown = FixedCostAggregator::aggregate(&settings, &staff);

        assert_eq!(breakdown.counted_staff, 1);
        assert_eq!(breakdown.total_salaries, dec!(2000));
    }

    #[test]
    fn test_pro_labore_joins_salary_base_and_gets_charges() {
        let mut settings = FinancialSettings {
            salary_per_employee: dec!(2000),
            social_charges_percentage: dec!(10),
            ..FinancialSettings::default()
        };
        settings.fixed_costs.insert(PRO_LABORE_KEY.to_string(), dec!(3000));
        settings.fixed_costs.insert("rent".to_string(), dec!(1500));
        settings.fixed_costs.insert("software".to_string(), dec!(200));
        let staff = vec![member("a", AccessLevel::Professional)];

        let breakdown = FixedCostAggregator::aggregate(&settings, &staff);

        assert_eq!(breakdown.total_salaries, dec!(5000));
        assert_eq!(breakdown.total_personnel_cost, dec!(5500));
        assert_eq!(breakdown.total_other_fixed_costs, dec!(1700));
        assert_eq!(breakdown.total_fixed_cost, dec!(7200));
    }

    #[test]
    fn test_empty_roster_still_counts_fixed_lines() {
        let mut settings = FinancialSettings::default();
        settings.fixed_costs.insert("rent".to_string(), dec!(1200));

        assert_eq!(FixedCostAggregator::total_fixed_cost(&settings, &[]), dec!(1200));
    }
}
