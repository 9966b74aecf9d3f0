use rust_decimal::Decimal;

use super::types::{CardConfig, WaivedYearSet};

/// Annual fee the card charges in `year` (0-based); waived years cost nothing
pub fn annual_fee(card: &CardConfig, year: usize, waived_years: &WaivedYearSet) -> Decimal {
    if waived_years.contains(&year) {
        Decimal::ZERO
    } else {
        card.annual_fee
    }
}
