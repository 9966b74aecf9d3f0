use rust_decimal::Decimal;

use super::types::{CardConfig, SpendRow, WelcomeBonus};

/// Rewards one card earns on one year's spend, before bonuses and fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryRewards {
    pub points: Decimal,
    pub points_value: Decimal, // points converted to dollars
    pub cashback: Decimal,
}

/// Accumulates points and cashback over every category in the spend row.
/// Categories the card has no rate for earn nothing.
pub fn category_rewards(card: &CardConfig, row: Option<&SpendRow>, dollar_per_point: Decimal) -> CategoryRewards {
    let Some(row) = row else {
        return CategoryRewards::default();
    };

    let mut points = Decimal::ZERO;
    let mut cashback = Decimal::ZERO;
    for (category, amount) in &row.spend_by_category {
        points += card.point_rate(category) * *amount;
        cashback += card.cash_rate(category) * *amount;
    }

    CategoryRewards {
        points,
        points_value: points * dollar_per_point,
        cashback,
    }
}

/// True when cumulative spend crosses the bonus threshold during this year:
/// `prior_spend < threshold <= cumulative_spend`
pub fn bonus_fires(bonus: &WelcomeBonus, prior_spend: Decimal, cumulative_spend: Decimal) -> bool {
    prior_spend < bonus.spend_threshold && bonus.spend_threshold <= cumulative_spend
}

/// Dollar value of every bonus whose threshold is crossed this year
pub fn welcome_bonus_value(
    bonuses: &[WelcomeBonus],
    prior_spend: Decimal,
    cumulative_spend: Decimal,
    dollar_per_point: Decimal,
) -> Decimal {
    bonuses
        .iter()
        .filter(|bonus| bonus_fires(bonus, prior_spend, cumulative_spend))
        .map(|bonus| bonus.value(dollar_per_point))
        .sum()
}
