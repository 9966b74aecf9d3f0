use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use tracing::{debug, instrument};

use super::{
    fee_model, reward_model,
    projection_constants::{PERCENT, ROI_DECIMAL_PLACES},
    types::{
        CardConfig, CardYearBreakdown, PortfolioPoint, ProjectionInput, ProjectionPoint, SpendRow,
    },
};

/// Spend totals shared by every card for one year
#[derive(Debug, Clone, Copy)]
struct YearSpend {
    year: usize,            // 0-based
    spend: Decimal,         // this year only
    prior_spend: Decimal,   // cumulative before this year
    cumulative: Decimal,    // cumulative including this year
}

/// Entry point for the projection: per-year ROI of every configured card.
/// Returns exactly `input.years` points, each with one entry per card.
pub fn project(input: &ProjectionInput) -> Vec<ProjectionPoint> {
    project_breakdown(input)
        .into_iter()
        .enumerate()
        .map(|(year, cards)| ProjectionPoint {
            year: year + 1,
            roi_by_card: cards.into_iter().map(|b| (b.card, b.roi)).collect::<BTreeMap<_, _>>(),
        })
        .collect()
}

/// Per-year, per-card components of the projection, cards in configuration order
#[instrument(skip_all, fields(years = input.years, cards = input.cards.len(), on_close = true))]
pub fn project_breakdown(input: &ProjectionInput) -> Vec<Vec<CardYearBreakdown>> {
    spend_series(input)
        .into_iter()
        .map(|year_spend| {
            let row = input.spend_row(year_spend.year);
            input
                .cards
                .iter()
                .map(|card| evaluate_card_year(card, row, &year_spend, input))
                .collect()
        })
        .collect()
}

/// Combined series: net value of all cards summed per year over that year's spend
#[instrument(skip_all, fields(years = input.years, cards = input.cards.len(), on_close = true))]
pub fn project_portfolio(input: &ProjectionInput) -> Vec<PortfolioPoint> {
    let breakdown = project_breakdown(input);
    spend_series(input)
        .into_iter()
        .zip(breakdown)
        .map(|(year_spend, cards)| {
            let net: Decimal = cards.iter().map(|b| b.net).sum();
            PortfolioPoint {
                year: year_spend.year + 1,
                spend: year_spend.spend,
                net,
                roi: roi_percent(net, year_spend.spend),
            }
        })
        .collect()
}

/// Walks the horizon once, accumulating spend. Years without a row spend nothing.
fn spend_series(input: &ProjectionInput) -> Vec<YearSpend> {
    let mut cumulative = Decimal::ZERO;
    let mut series = Vec::with_capacity(input.years);
    for year in 0..input.years {
        let spend = input.spend_row(year).map_or(Decimal::ZERO, SpendRow::total);
        let prior_spend = cumulative;
        cumulative += spend;
        series.push(YearSpend {
            year,
            spend,
            prior_spend,
            cumulative,
        });
    }
    series
}

fn evaluate_card_year(
    card: &CardConfig,
    row: Option<&SpendRow>,
    year_spend: &YearSpend,
    input: &ProjectionInput,
) -> CardYearBreakdown {
    let rewards = reward_model::category_rewards(card, row, input.dollar_per_point);
    let bonus_value = reward_model::welcome_bonus_value(
        &card.welcome_bonuses,
        year_spend.prior_spend,
        year_spend.cumulative,
        input.dollar_per_point,
    );
    let fee = fee_model::annual_fee(card, year_spend.year, &input.waived_years);

    let net = rewards.points_value + rewards.cashback + bonus_value - fee;
    let roi = roi_percent(net, year_spend.spend);

    debug!(
        year = year_spend.year + 1,
        card = %card.name,
        spend = %year_spend.spend,
        cumulative_spend = %year_spend.cumulative,
        points_value = %rewards.points_value,
        cashback = %rewards.cashback,
        bonus_value = %bonus_value,
        fee = %fee,
        net = %net,
        roi = %roi,
        "Card year evaluated"
    );

    CardYearBreakdown {
        card: card.name.clone(),
        points_value: rewards.points_value,
        cashback: rewards.cashback,
        bonus_value,
        fee,
        net,
        roi,
    }
}

/// `net / spend` as a percentage, rounded half away from zero. Zero-spend years report 0.
pub fn roi_percent(net: Decimal, spend: Decimal) -> Decimal {
    if spend <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (net / spend * Decimal::from(PERCENT))
        .round_dp_with_strategy(ROI_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::types::{RewardType, WaivedYearSet, WelcomeBonus};
    use pretty_assertions::assert_eq;

    fn dining_input() -> ProjectionInput {
        ProjectionInput {
            years: 2,
            spend_rows: vec![
                SpendRow::new(0).with_spend("Dining", dec!(1000)),
                SpendRow::new(1).with_spend("Dining", dec!(2000)),
            ],
            cards: vec![
                CardConfig::new("Dining Cash", RewardType::Cash, dec!(95))
                    .with_rate("Dining", dec!(0.03))
                    .with_bonus(WelcomeBonus::new(dec!(2500), Decimal::ZERO, dec!(200))),
            ],
            waived_years: WaivedYearSet::new(),
            dollar_per_point: dec!(0.017),
        }
    }

    #[test]
    fn cash_card_with_bonus_crossing_in_second_year() {
        let points = project(&dining_input());

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].year, 1);
        assert_eq!(points[0].roi_by_card["Dining Cash"], dec!(-6.50));
        assert_eq!(points[1].year, 2);
        assert_eq!(points[1].roi_by_card["Dining Cash"], dec!(8.25));
    }

    #[test]
    fn breakdown_exposes_components() {
        let breakdown = project_breakdown(&dining_input());
        let second = &breakdown[1][0];

        assert_eq!(second.cashback, dec!(60));
        assert_eq!(second.bonus_value, dec!(200));
        assert_eq!(second.fee, dec!(95));
        assert_eq!(second.net, dec!(165));
        assert_eq!(breakdown[0][0].bonus_value, Decimal::ZERO);
    }

    #[test]
    fn waived_year_drops_fee() {
        let mut input = dining_input();
        input.waived_years.insert(0);

        let points = project(&input);
        // 30 / 1000
        assert_eq!(points[0].roi_by_card["Dining Cash"], dec!(3.00));
        assert_eq!(points[1].roi_by_card["Dining Cash"], dec!(8.25));
    }

    #[test]
    fn years_beyond_rows_spend_nothing() {
        let mut input = dining_input();
        input.years = 4;

        let points = project(&input);
        assert_eq!(points.len(), 4);
        assert_eq!(points[2].roi_by_card["Dining Cash"], Decimal::ZERO);
        assert_eq!(points[3].roi_by_card["Dining Cash"], Decimal::ZERO);

        let breakdown = project_breakdown(&input);
        assert_eq!(breakdown[2][0].net, dec!(-95));
    }

    #[test]
    fn rows_are_matched_by_year_not_position() {
        let mut input = dining_input();
        input.spend_rows.reverse();

        assert_eq!(project(&input), project(&dining_input()));
    }

    #[test]
    fn no_cards_yields_empty_entries() {
        let mut input = dining_input();
        input.cards.clear();

        let points = project(&input);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.roi_by_card.is_empty()));
    }

    #[test]
    fn portfolio_sums_net_across_cards() {
        let mut input = dining_input();
        input.cards.push(
            CardConfig::new("Travel Points", RewardType::Points, Decimal::ZERO).with_rate("Dining", dec!(2)),
        );

        let portfolio = project_portfolio(&input);
        // year 1: (30 - 95) + 2000 * 0.017 = -31
        assert_eq!(portfolio[0].net, dec!(-31));
        assert_eq!(portfolio[0].roi, dec!(-3.10));
        // year 2: 165 + 4000 * 0.017 = 233
        assert_eq!(portfolio[1].net, dec!(233));
        assert_eq!(portfolio[1].roi, dec!(11.65));
        assert_eq!(portfolio[1].spend, dec!(2000));
    }

    #[test]
    fn input_methods_delegate_to_engine() {
        let input = dining_input();
        assert_eq!(input.project(), project(&input));
        assert_eq!(input.portfolio(), project_portfolio(&input));
        assert_eq!(input.portfolio()[1].roi, dec!(8.25));
    }

    #[test]
    fn roi_rounds_half_away_from_zero() {
        assert_eq!(roi_percent(dec!(1.005), dec!(100)), dec!(1.01));
        assert_eq!(roi_percent(dec!(-1.005), dec!(100)), dec!(-1.01));
        assert_eq!(roi_percent(dec!(1), dec!(3)), dec!(33.33));
    }

    #[test]
    fn roi_is_zero_without_spend() {
        assert_eq!(roi_percent(dec!(-95), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(roi_percent(dec!(500), Decimal::ZERO), Decimal::ZERO);
    }
}
