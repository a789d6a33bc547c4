use rust_decimal::Decimal;

/// Operating hours assumed for every working day
pub const HOURS_PER_WORKDAY: u32 = 8;

const MINUTES_PER_HOUR: u32 = 60;

/// Spreads the monthly fixed cost over the salon's working minutes
pub struct PerMinuteAllocator;

impl PerMinuteAllocator {
    /// Fixed cost carried by each working minute
    ///
    /// `total_fixed_cost / (work_days * 8h * 60min)`, or zero when there are
    /// no working minutes.
    pub fn cost_per_minute(total_fixed_cost: Decimal, work_days_in_month: u32) -> Decimal {
        let minutes = work_days_in_month
            .saturating_mul(HOURS_PER_WORKDAY)
            .saturating_mul(MINUTES_PER_HOUR);

        total_fixed_cost
            .checked_div(Decimal::from(minutes))
            .unwrap_or_else(|| {
                tracing::debug!("No working minutes configured, cost per minute is 0");
                Decimal::ZERO
            })
    }
}
