// Built-in demo salon used when no seed file is configured

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::costing::auto_increase::{AutoIncreasePolicy, IncreaseSchedule};
use crate::costing::models::{
    Catalog, FinancialSettings, IncludedService, Service, Staff, SubscriptionPlan, PRO_LABORE_KEY,
};
use crate::costing::store::WorkspaceSnapshot;
use crate::costing::types::AccessLevel;

fn money(units: i64, cents: u32) -> Decimal {
    Decimal::new(units * 100 + i64::from(cents), 2)
}

fn staff(id: &str, name: &str, access_level: AccessLevel) -> Staff {
    Staff {
        id: id.to_string(),
        name: name.to_string(),
        access_level,
    }
}

fn service(id: &str, name: &str, price: &str, duration: &str, product_cost: Decimal) -> Service {
    Service {
        id: id.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        duration: duration.to_string(),
        product_cost,
    }
}

fn line(service_id: &str, quantity: u32) -> IncludedService {
    IncludedService {
        service_id: service_id.to_string(),
        quantity,
    }
}

pub fn demo_snapshot() -> WorkspaceSnapshot {
    let fixed_costs = HashMap::from([
        (PRO_LABORE_KEY.to_string(), money(4000, 0)),
        ("aluguel".to_string(), money(3500, 0)),
        ("energia".to_string(), money(650, 0)),
        ("software".to_string(), money(189, 90)),
    ]);
    let individual_salaries = HashMap::from([("staff-ana".to_string(), money(3200, 0))]);

    let settings = FinancialSettings {
        work_days_in_month: 22,
        default_commission: Decimal::from(40),
        plan_safety_margin: Decimal::from(30),
        card_fee_percentage: Decimal::new(35, 1),
        tax_on_services_percentage: Decimal::from(6),
        salary_per_employee: money(1800, 0),
        individual_salaries,
        social_charges_percentage: Decimal::from(20),
        fixed_costs,
    };

    let staff = vec![
        staff("staff-owner", "Carla", AccessLevel::SuperAdmin),
        staff("staff-ana", "Ana", AccessLevel::Admin),
        staff("staff-bia", "Bia", AccessLevel::Professional),
        staff("staff-rec", "Recepcao", AccessLevel::Other),
    ];

    let catalog = Catalog {
        services: vec![
            service("svc-corte", "Corte feminino", "R$ 90,00", "1h", money(6, 0)),
            service("svc-escova", "Escova", "R$ 60,00", "45min", money(4, 50)),
            service("svc-manicure", "Manicure", "R$ 35,00", "40", money(3, 0)),
            service("svc-coloracao", "Coloracao", "R$ 220,00", "2h30", money(55, 0)),
        ],
        plans: vec![
            SubscriptionPlan {
                id: "plan-escova".to_string(),
                name: "Escova ilimitada".to_string(),
                price: money(199, 90),
                original_price: None,
                discount_percentage: Some(Decimal::from(15)),
                included_services: vec![line("svc-escova", 4)],
            },
            SubscriptionPlan {
                id: "plan-mao".to_string(),
                name: "Maos sempre prontas".to_string(),
                price: money(99, 90),
                original_price: Some(money(139, 90)),
                discount_percentage: Some(Decimal::from(20)),
                included_services: vec![line("svc-manicure", 4)],
            },
            SubscriptionPlan {
                id: "plan-completo".to_string(),
                name: "Completo".to_string(),
                price: money(379, 90),
                original_price: None,
                discount_percentage: None,
                included_services: vec![line("svc-corte", 1), line("svc-escova", 2), line("svc-coloracao", 1)],
            },
        ],
    };

    WorkspaceSnapshot {
        settings,
        staff,
        catalog,
        policy: AutoIncreasePolicy::default(),
        schedule: IncreaseSchedule::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_demo_snapshot_is_consistent() {
        let snapshot = demo_snapshot();

        assert!(snapshot.settings.validate().is_ok());
        for plan in &snapshot.catalog.plans {
            for included in &plan.included_services {
                assert!(snapshot.catalog.service(&included.service_id).is_some());
            }
        }
    }
}
