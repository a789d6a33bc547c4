// Lenient parsing of currency and duration strings
//
// Catalog values arrive formatted for display ("R$ 45,00", "1h30"). These are the
// only places that turn them into numbers; both functions are total and fall back to zero.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::costing::rounding::round_currency;

/// Characters that can be part of a number once symbols are removed
static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9,.\-]").unwrap());

/// Hours and/or minutes, e.g. "1h", "1h30", "1,5 h", "45min", "90"
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(\d+(?:[.,]\d+)?)\s*h(?:oras?|rs?)?)?\s*(?:(\d+)\s*(?:m|min|mins|minutos?)?)?$")
        .unwrap()
});

/// Parse a formatted currency string into a decimal amount
///
/// When a comma is present it is the decimal mark and dots group thousands
/// ("R$ 1.234,56"). Without a comma a single dot is the decimal mark and
/// several dots group thousands, except that an "R$" amount reads a single
/// dot followed by exactly three digits as grouping ("R$ 1.234").
/// Anything unparseable yields zero.
pub fn parse_currency(raw: &str) -> Decimal {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    let negative = cleaned.starts_with('-');
    let unsigned = cleaned.replace('-', "");

    let normalized = if unsigned.contains(',') {
        unsigned.replace('.', "").replace(',', ".")
    } else if unsigned.matches('.').count() > 1 || (raw.contains("R$") && groups_thousands(&unsigned)) {
        unsigned.replace('.', "")
    } else {
        unsigned
    };

    match Decimal::from_str(&normalized) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => {
            if !raw.trim().is_empty() {
                tracing::debug!("Unparseable currency value '{}', using 0", raw);
            }
            Decimal::ZERO
        }
    }
}

/// A single dot followed by exactly three digits
fn groups_thousands(number: &str) -> bool {
    match number.split_once('.') {
        Some((integer, group)) => !integer.is_empty() && group.len() == 3 && !group.contains('.'),
        None => false,
    }
}

/// Parse a duration string into whole minutes
///
/// Plain numbers are minutes. Fractional hours are rounded to the nearest minute.
/// Empty, negative or malformed input yields zero.
pub fn parse_duration(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let Some(captures) = DURATION.captures(trimmed) else {
        tracing::debug!("Unparseable duration '{}', using 0 minutes", raw);
        return 0;
    };

    let hours = captures
        .get(1)
        .and_then(|m| Decimal::from_str(&m.as_str().replace(',', ".")).ok())
        .unwrap_or(Decimal::ZERO);
    let minutes = captures
        .get(2)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);

    let from_hours = hours
        .checked_mul(Decimal::from(60))
        .and_then(|total| total.round().to_u32())
        .unwrap_or(0);
    from_hours.saturating_add(minutes)
}

/// Render an amount the way the catalog stores prices ("R$ 1.234,56")
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}R$ {},{}", sign, grouped, cents)
}
