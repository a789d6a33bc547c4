use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

use crate::costing::types::AccessLevel;

/// Fixed-cost category holding the owner's compensation.
/// It joins the salary base instead of the other fixed costs.
pub const PRO_LABORE_KEY: &str = "proLabore";

/// Global financial settings of the salon
///
/// Percentages are plain numbers (`10` means 10%) and are turned into
/// multipliers by dividing by 100 where they are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct FinancialSettings {
    #[validate(range(min = 1))]
    #[schema(example = 22)]
    pub work_days_in_month: u32,
    /// Professional commission on the service price
    #[schema(example = 40)]
    pub default_commission: Decimal,
    /// Minimum margin over cost when suggesting prices
    #[schema(example = 30)]
    pub plan_safety_margin: Decimal,
    #[schema(example = 3)]
    pub card_fee_percentage: Decimal,
    #[schema(example = 6)]
    pub tax_on_services_percentage: Decimal,
    /// Salary used for staff without an individual override
    #[schema(example = 2500)]
    pub salary_per_employee: Decimal,
    #[serde(default)]
    pub individual_salaries: HashMap<String, Decimal>,
    #[schema(example = 20)]
    pub social_charges_percentage: Decimal,
    #[serde(default)]
    pub fixed_costs: HashMap<String, Decimal>,
}

impl Default for FinancialSettings {
    fn default() -> Self {
        Self {
            work_days_in_month: 22,
            default_commission: Decimal::ZERO,
            plan_safety_margin: Decimal::ZERO,
            card_fee_percentage: Decimal::ZERO,
            tax_on_services_percentage: Decimal::ZERO,
            salary_per_employee: Decimal::ZERO,
            individual_salaries: HashMap::new(),
            social_charges_percentage: Decimal::ZERO,
            fixed_costs: HashMap::new(),
        }
    }
}

impl FinancialSettings {
    /// Clamp every value into its accepted range
    ///
    /// Rates applied to the price stay within 0-100; margins, charges and
    /// currency amounts are only floored at zero.
    pub fn clamped(mut self) -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        let rate = |value: Decimal| value.max(Decimal::ZERO).min(hundred);
        let floor = |value: Decimal| value.max(Decimal::ZERO);

        self.default_commission = rate(self.default_commission);
        self.card_fee_percentage = rate(self.card_fee_percentage);
        self.tax_on_services_percentage = rate(self.tax_on_services_percentage);
        self.plan_safety_margin = floor(self.plan_safety_margin);
        self.social_charges_percentage = floor(self.social_charges_percentage);
        self.salary_per_employee = floor(self.salary_per_employee);
        for salary in self.individual_salaries.values_mut() {
            *salary = floor(*salary);
        }
        for cost in self.fixed_costs.values_mut() {
            *cost = floor(*cost);
        }
        self
    }

    /// Owner's compensation line, zero when not configured
    pub fn pro_labore(&self) -> Decimal {
        self.fixed_costs
            .get(PRO_LABORE_KEY)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Staff {
    #[schema(example = "staff-1")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(value_type = String, example = "professional")]
    pub access_level: AccessLevel,
}

/// Catalog service
///
/// Price and duration keep the display format the catalog stores them in;
/// they are parsed leniently whenever a number is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Service {
    #[schema(example = "svc-cut")]
    pub id: String,
    #[schema(example = "Corte feminino")]
    pub name: String,
    #[schema(example = "R$ 50,00")]
    pub price: String,
    #[schema(example = "30")]
    pub duration: String,
    #[serde(default)]
    #[schema(example = 5)]
    pub product_cost: Decimal,
}

/// One line of a plan: a service and how many times it is included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct IncludedService {
    #[schema(example = "svc-cut")]
    pub service_id: String,
    #[validate(range(min = 1, max = 1000))]
    #[schema(example = 2)]
    pub quantity: u32,
}

/// Subscription plan bundling services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionPlan {
    #[schema(example = "plan-gold")]
    pub id: String,
    #[schema(example = "Plano Ouro")]
    pub name: String,
    #[schema(example = 129.9)]
    pub price: Decimal,
    /// Promotional "from" price
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub included_services: Vec<IncludedService>,
}

impl SubscriptionPlan {
    pub fn discount_or_zero(&self) -> Decimal {
        self.discount_percentage.unwrap_or(Decimal::ZERO)
    }
}

/// Services and plans edited together as one draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub plans: Vec<SubscriptionPlan>,
}

impl Catalog {
    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.id == id)
    }

    pub fn service_mut(&mut self, id: &str) -> Option<&mut Service> {
        self.services.iter_mut().find(|service| service.id == id)
    }

    pub fn plan(&self, id: &str) -> Option<&SubscriptionPlan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn plan_mut(&mut self, id: &str) -> Option<&mut SubscriptionPlan> {
        self.plans.iter_mut().find(|plan| plan.id == id)
    }

    /// Replace the service with the same id, or append it
    pub fn upsert_service(&mut self, service: Service) {
        match self.service_mut(&service.id) {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
    }

    /// Insert or replace a plan, keeping catalog order
    pub fn upsert_plan(&mut self, plan: SubscriptionPlan) {
        match self.plan_mut(&plan.id) {
            Some(existing) => *existing = plan,
            None => self.plans.push(plan),
        }
    }

    /// Remove a service; plans referencing it are left untouched
    pub fn remove_service(&mut self, id: &str) -> Option<Service> {
        let index = self.services.iter().position(|service| service.id == id)?;
        Some(self.services.remove(index))
    }

    pub fn remove_plan(&mut self, id: &str) -> Option<SubscriptionPlan> {
        let index = self.plans.iter().position(|plan| plan.id == id)?;
        Some(self.plans.remove(index))
    }
}
