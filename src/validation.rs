// Input-collection boundary: the engine trusts its input, so anything that
// reaches it from a form, a file or an edit goes through `validate` first.
// Magnitude bounds keep every engine sum, product and quotient inside
// `Decimal` range.
use std::collections::HashSet;

use rust_decimal::prelude::*;
use thiserror::Error;

use crate::projection::types::{CardConfig, ProjectionInput, SpendRow, WelcomeBonus};

pub const MAX_YEARS: usize = 100;
/// Upper bound on any dollar amount: spend per category, fee, bonus cash or threshold, bonus points
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000);
/// Upper bound on points or cash earned per dollar
pub const MAX_RATE: Decimal = dec!(1000);
pub const MAX_DOLLAR_PER_POINT: Decimal = dec!(1000);
/// Spend is entered in cents
pub const SPEND_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("projection must cover at least one year")]
    ZeroYears,
    #[error("projection covers {years} years, at most {max} are supported")]
    TooManyYears { years: usize, max: usize },
    #[error("spend row for year index {year} is outside a {years}-year projection")]
    SpendRowOutOfRange { year: usize, years: usize },
    #[error("more than one spend row for year index {year}")]
    DuplicateSpendRow { year: usize },
    #[error("negative spend {amount} for {category} in year index {year}")]
    NegativeSpend { year: usize, category: String, amount: Decimal },
    #[error("spend {amount} for {category} in year index {year} has more than {SPEND_DECIMAL_PLACES} decimal places")]
    SpendTooPrecise { year: usize, category: String, amount: Decimal },
    #[error("waived year index {year} is outside a {years}-year projection")]
    WaivedYearOutOfRange { year: usize, years: usize },
    #[error("dollar per point must be positive, got {0}")]
    NonPositivePointValue(Decimal),
    #[error("{field} is {value}, above the supported maximum {max}")]
    AmountTooLarge { field: String, value: Decimal, max: Decimal },
    #[error("card name must not be empty")]
    EmptyCardName,
    #[error("card {0} is configured more than once")]
    DuplicateCard(String),
    #[error("no card named {0}")]
    UnknownCard(String),
    #[error("card {card} has negative rate {rate} for {category}")]
    NegativeRate { card: String, category: String, rate: Decimal },
    #[error("card {card} has negative annual fee {fee}")]
    NegativeFee { card: String, fee: Decimal },
    #[error("card {card} has a welcome bonus with a negative amount")]
    NegativeBonus { card: String },
}

/// Checks every invariant the engine relies on
pub fn validate(input: &ProjectionInput) -> Result<(), ValidationError> {
    check_years(input.years)?;
    check_dollar_per_point(input.dollar_per_point)?;

    let mut seen_years = HashSet::new();
    for row in &input.spend_rows {
        validate_spend_row(row, input.years)?;
        if !seen_years.insert(row.year) {
            return Err(ValidationError::DuplicateSpendRow { year: row.year });
        }
    }

    if let Some(&year) = input.waived_years.iter().find(|&&year| year >= input.years) {
        return Err(ValidationError::WaivedYearOutOfRange { year, years: input.years });
    }

    let mut seen_cards = HashSet::new();
    for card in &input.cards {
        validate_card(card)?;
        if !seen_cards.insert(card.name.as_str()) {
            return Err(ValidationError::DuplicateCard(card.name.clone()));
        }
    }

    Ok(())
}

pub fn validate_spend_row(row: &SpendRow, years: usize) -> Result<(), ValidationError> {
    if row.year >= years {
        return Err(ValidationError::SpendRowOutOfRange { year: row.year, years });
    }
    for (category, amount) in &row.spend_by_category {
        check_spend(row.year, category, *amount)?;
    }
    Ok(())
}

pub fn validate_card(card: &CardConfig) -> Result<(), ValidationError> {
    if card.name.trim().is_empty() {
        return Err(ValidationError::EmptyCardName);
    }
    check_fee(&card.name, card.annual_fee)?;
    for (category, rate) in &card.rates_by_category {
        check_rate(&card.name, category, *rate)?;
    }
    for bonus in &card.welcome_bonuses {
        check_bonus(&card.name, bonus)?;
    }
    Ok(())
}

fn check_max(field: impl FnOnce() -> String, value: Decimal, max: Decimal) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::AmountTooLarge { field: field(), value, max });
    }
    Ok(())
}

pub fn check_years(years: usize) -> Result<(), ValidationError> {
    match years {
        0 => Err(ValidationError::ZeroYears),
        years if years > MAX_YEARS => Err(ValidationError::TooManyYears { years, max: MAX_YEARS }),
        _ => Ok(()),
    }
}

pub fn check_dollar_per_point(dollar_per_point: Decimal) -> Result<(), ValidationError> {
    if dollar_per_point <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePointValue(dollar_per_point));
    }
    check_max(|| "dollar per point".to_string(), dollar_per_point, MAX_DOLLAR_PER_POINT)
}

pub fn check_spend(year: usize, category: &str, amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeSpend { year, category: category.to_string(), amount });
    }
    if amount.normalize().scale() > SPEND_DECIMAL_PLACES {
        return Err(ValidationError::SpendTooPrecise { year, category: category.to_string(), amount });
    }
    check_max(|| format!("spend for {category} in year index {year}"), amount, MAX_AMOUNT)
}

pub fn check_rate(card: &str, category: &str, rate: Decimal) -> Result<(), ValidationError> {
    if rate < Decimal::ZERO {
        return Err(ValidationError::NegativeRate {
            card: card.to_string(),
            category: category.to_string(),
            rate,
        });
    }
    check_max(|| format!("card {card} rate for {category}"), rate, MAX_RATE)
}

pub fn check_fee(card: &str, fee: Decimal) -> Result<(), ValidationError> {
    if fee < Decimal::ZERO {
        return Err(ValidationError::NegativeFee { card: card.to_string(), fee });
    }
    check_max(|| format!("card {card} annual fee"), fee, MAX_AMOUNT)
}

pub fn check_bonus(card: &str, bonus: &WelcomeBonus) -> Result<(), ValidationError> {
    let amounts = [
        ("spend threshold", bonus.spend_threshold),
        ("bonus points", bonus.bonus_points),
        ("bonus cash", bonus.bonus_cash),
    ];
    if amounts.iter().any(|(_, value)| *value < Decimal::ZERO) {
        return Err(ValidationError::NegativeBonus { card: card.to_string() });
    }
    for (field, value) in amounts {
        check_max(|| format!("card {card} welcome bonus {field}"), value, MAX_AMOUNT)?;
    }
    Ok(())
}
