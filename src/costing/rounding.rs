// Price rounding rules
//
// Cents rounding for every currency value written back to the catalog, and the
// ".90 ending" rule used for any plan price the engine generates on its own.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to cents, half away from zero
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Smallest price of the form `k * 10 + 9.90` that is not below `price`
///
/// The input is rounded to cents first, so `109.90` stays `109.90` while
/// `109.91` moves to `119.90`.
pub fn round_up_to_990(price: Decimal) -> Decimal {
    let ten = Decimal::TEN;
    let ending = Decimal::new(990, 2);
    let price = round_currency(price);

    // Saturates at the top of the Decimal range instead of overflowing
    let mut candidate = (price / ten).floor().saturating_mul(ten).saturating_add(ending);
    if candidate < price {
        candidate = candidate.saturating_add(ten);
    }

    round_currency(candidate)
}
